//! The `RecordStore` trait and the typed `Repository` built on top of it.
//!
//! The trait is implemented by storage backends (e.g. `carelog-store-sqlite`)
//! and is deliberately untyped: it moves [`Row`]s in and out of the table a
//! [`Table`] describes. Higher layers (`carelog-api`, `carelog-media`) go
//! through [`Repository`], which validates payloads and converts rows to
//! [`Stored`] records.

use std::{future::Future, marker::PhantomData};

use crate::{
  Error, Result,
  page::{ListQuery, Page},
  record::{Resource, Row, Stored, to_row},
  table::Table,
};

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a relational storage backend.
///
/// Rows passed to `insert`/`update` may carry keys that are not columns of
/// the table; backends ignore them. Child arrays named by [`Table::children`]
/// are written in the same transaction as the parent.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Into<Error> + Send + Sync + 'static;

  /// Insert a row and return it as read back, including `id`, timestamps
  /// and children.
  fn insert(
    &self,
    table: &'static Table,
    row: Row,
  ) -> impl Future<Output = Result<Row, Self::Error>> + Send + '_;

  /// Overwrite the fillable columns of row `id`. If the row carries a child
  /// array, the stored children are replaced by it. Returns `None` when the
  /// row does not exist (or is soft-deleted).
  fn update(
    &self,
    table: &'static Table,
    id: i64,
    row: Row,
  ) -> impl Future<Output = Result<Option<Row>, Self::Error>> + Send + '_;

  /// Fetch row `id` with its children. Soft-deleted rows are not returned.
  fn find(
    &self,
    table: &'static Table,
    id: i64,
  ) -> impl Future<Output = Result<Option<Row>, Self::Error>> + Send + '_;

  /// One page of rows matching `query`.
  fn list(
    &self,
    table: &'static Table,
    query: ListQuery,
  ) -> impl Future<Output = Result<Page<Row>, Self::Error>> + Send + '_;

  /// Every live row whose `column` equals `value`, in the table's order.
  fn all_where(
    &self,
    table: &'static Table,
    column: &'static str,
    value: i64,
  ) -> impl Future<Output = Result<Vec<Row>, Self::Error>> + Send + '_;

  /// Delete row `id`. Soft-delete tables are stamped instead of removed.
  /// Returns `false` when there was nothing to delete.
  fn delete(
    &self,
    table: &'static Table,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Repository ──────────────────────────────────────────────────────────────

/// Typed CRUD over one [`Resource`].
pub struct Repository<'a, S, R> {
  store:    &'a S,
  resource: PhantomData<fn() -> R>,
}

impl<'a, S: RecordStore, R: Resource> Repository<'a, S, R> {
  pub fn new(store: &'a S) -> Self { Self { store, resource: PhantomData } }

  fn not_found(id: i64) -> Error { Error::NotFound { resource: R::TABLE.resource, id } }

  pub async fn index(&self, query: ListQuery) -> Result<Page<Stored<R>>> {
    let page = self.store.list(R::TABLE, query).await.map_err(Into::<Error>::into)?;
    page.try_map(Stored::from_row)
  }

  pub async fn show(&self, id: i64) -> Result<Stored<R>> {
    let row = self
      .store
      .find(R::TABLE, id)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or_else(|| Self::not_found(id))?;
    Stored::from_row(row)
  }

  pub async fn store(&self, input: &R) -> Result<Stored<R>> {
    input.validate()?;
    let row = self.store.insert(R::TABLE, to_row(input)?).await.map_err(Into::<Error>::into)?;
    Stored::from_row(row)
  }

  pub async fn update(&self, id: i64, input: &R) -> Result<Stored<R>> {
    input.validate()?;
    let row = self
      .store
      .update(R::TABLE, id, to_row(input)?)
      .await
      .map_err(Into::<Error>::into)?
      .ok_or_else(|| Self::not_found(id))?;
    Stored::from_row(row)
  }

  pub async fn destroy(&self, id: i64) -> Result<()> {
    if self.store.delete(R::TABLE, id).await.map_err(Into::<Error>::into)? {
      Ok(())
    } else {
      Err(Self::not_found(id))
    }
  }

  /// Every live record whose `column` equals `value`.
  pub async fn all_where(&self, column: &'static str, value: i64) -> Result<Vec<Stored<R>>> {
    self
      .store
      .all_where(R::TABLE, column, value)
      .await
      .map_err(Into::<Error>::into)?
      .into_iter()
      .map(Stored::from_row)
      .collect()
  }
}
