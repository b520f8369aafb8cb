//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use carelog_core::{ListQuery, Page, RecordStore, Row, Table};
use chrono::Utc;
use rusqlite::{OptionalExtension as _, params_from_iter, types::Value as SqlValue};

use crate::{
  Error, Result,
  encode::{
    EncodedRow, RawRecord, RawValues, decode_record, encode_children, encode_dt, encode_row,
    ident, select_list, select_width,
  },
  schema::{PRAGMAS, SCHEMA, SCHEMA_VERSION},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A carelog record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Apply connection pragmas, then the schema if `user_version` says the
  /// database is fresh. Returns the version found before initialisation.
  pub(crate) async fn init_schema(&self) -> Result<i64> {
    let found = self
      .conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
        if version == 0 {
          let tx = conn.transaction()?;
          tx.execute_batch(SCHEMA)?;
          tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
          tx.commit()?;
        }
        Ok(version)
      })
      .await?;

    if found > SCHEMA_VERSION {
      return Err(Error::SchemaVersion { found, supported: SCHEMA_VERSION });
    }
    if found == 0 {
      tracing::info!(version = SCHEMA_VERSION, "initialised schema");
    }
    Ok(found)
  }
}

// ─── SQL helpers ─────────────────────────────────────────────────────────────
//
// These run inside `Connection::call` on the database thread and only deal in
// already-encoded values.

/// `AND deleted_at IS NULL` for soft-delete tables, empty otherwise.
fn live_clause(table: &Table) -> &'static str {
  if table.soft_deletes { " AND deleted_at IS NULL" } else { "" }
}

fn read_values(row: &rusqlite::Row<'_>, width: usize) -> rusqlite::Result<RawValues> {
  (0..width).map(|i| row.get::<_, SqlValue>(i)).collect()
}

fn insert_row(
  conn: &rusqlite::Connection,
  table: &Table,
  row: &EncodedRow,
  parent: Option<(&str, i64)>,
  now: &str,
) -> rusqlite::Result<i64> {
  let mut columns: Vec<String> = row.columns.iter().map(|c| ident(c)).collect();
  let mut values = row.values.clone();
  if let Some((foreign_key, id)) = parent {
    columns.push(ident(foreign_key));
    values.push(SqlValue::Integer(id));
  }
  columns.push("created_at".into());
  columns.push("updated_at".into());
  values.push(SqlValue::Text(now.to_owned()));
  values.push(SqlValue::Text(now.to_owned()));

  let placeholders = vec!["?"; columns.len()].join(", ");
  let sql = format!("INSERT INTO {} ({}) VALUES ({placeholders})", table.name, columns.join(", "));
  conn.execute(&sql, params_from_iter(values))?;
  Ok(conn.last_insert_rowid())
}

/// Insert every child row of a parent, table by table.
fn insert_children(
  conn: &rusqlite::Connection,
  table: &Table,
  parent_id: i64,
  children: &[Option<Vec<EncodedRow>>],
  now: &str,
) -> rusqlite::Result<()> {
  for (child, rows) in table.children.iter().zip(children) {
    for row in rows.iter().flatten() {
      insert_row(conn, child.table, row, Some((child.foreign_key, parent_id)), now)?;
    }
  }
  Ok(())
}

fn load_children(
  conn: &rusqlite::Connection,
  table: &Table,
  id: i64,
) -> rusqlite::Result<Vec<Vec<RawValues>>> {
  table
    .children
    .iter()
    .map(|child| {
      let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?1 ORDER BY {}",
        select_list(child.table),
        child.table.name,
        ident(child.foreign_key),
        child.table.order_by,
      );
      let width = select_width(child.table);
      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt.query_map([id], |r| read_values(r, width))?;
      rows.collect()
    })
    .collect()
}

/// Attach children to rows already read from the parent table.
fn with_children(
  conn: &rusqlite::Connection,
  table: &Table,
  rows: Vec<RawValues>,
) -> rusqlite::Result<Vec<RawRecord>> {
  rows
    .into_iter()
    .map(|values| {
      let id = match values.first() {
        Some(SqlValue::Integer(id)) => *id,
        _ => {
          return Err(rusqlite::Error::InvalidColumnType(
            0,
            "id".into(),
            rusqlite::types::Type::Null,
          ));
        }
      };
      let children = load_children(conn, table, id)?;
      Ok(RawRecord { values, children })
    })
    .collect()
}

fn select_record(
  conn: &rusqlite::Connection,
  table: &Table,
  id: i64,
) -> rusqlite::Result<Option<RawRecord>> {
  let sql = format!(
    "SELECT {} FROM {} WHERE id = ?1{}",
    select_list(table),
    table.name,
    live_clause(table),
  );
  let width = select_width(table);
  let Some(values) = conn.query_row(&sql, [id], |r| read_values(r, width)).optional()? else {
    return Ok(None);
  };
  let children = load_children(conn, table, id)?;
  Ok(Some(RawRecord { values, children }))
}

fn exists(conn: &rusqlite::Connection, table: &Table, id: i64) -> rusqlite::Result<bool> {
  let sql = format!("SELECT 1 FROM {} WHERE id = ?1{}", table.name, live_clause(table));
  Ok(conn.query_row(&sql, [id], |_| Ok(())).optional()?.is_some())
}

/// Escape `%`, `_` and the escape character itself for `LIKE ... ESCAPE '\'`.
fn escape_like(term: &str) -> String {
  let mut out = String::with_capacity(term.len());
  for c in term.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out
}

/// `WHERE` clause and bound parameters for a list query.
fn list_filter(table: &Table, query: &ListQuery) -> (String, Vec<SqlValue>) {
  let mut clauses = Vec::new();
  let mut params = Vec::new();

  if table.soft_deletes {
    clauses.push("deleted_at IS NULL".to_owned());
  }
  if let (Some(column), Some(scope)) = (table.scope, query.scope) {
    clauses.push(format!("{} = ?", ident(column)));
    params.push(SqlValue::Integer(scope));
  }
  if let (Some(column), Some(year)) = (table.year_column, query.year) {
    clauses.push(format!("substr({}, 1, 4) = ?", ident(column)));
    params.push(SqlValue::Text(format!("{year:04}")));
  }
  if let Some(term) = query.search_term().filter(|_| !table.search_columns.is_empty()) {
    let pattern = format!("%{}%", escape_like(term));
    let any = table
      .search_columns
      .iter()
      .map(|c| format!("{} LIKE ? ESCAPE '\\'", ident(c)))
      .collect::<Vec<_>>()
      .join(" OR ");
    clauses.push(format!("({any})"));
    params.extend(table.search_columns.iter().map(|_| SqlValue::Text(pattern.clone())));
  }

  if clauses.is_empty() {
    (String::new(), params)
  } else {
    (format!(" WHERE {}", clauses.join(" AND ")), params)
  }
}

/// Turn constraint failures into their domain-level errors.
fn classify(e: tokio_rusqlite::Error) -> Error {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, message)) = &e {
    let message = message.clone().unwrap_or_else(|| code.to_string());
    match code.extended_code {
      rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
        return Error::Conflict(message);
      }
      rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Error::InvalidReference(message),
      _ => {}
    }
  }
  Error::Database(e)
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, table: &'static Table, row: Row) -> Result<Row> {
    let encoded = encode_row(table, &row, None)?;
    let children = encode_children(table, &row)?;
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let id = insert_row(&tx, table, &encoded, None, &now)?;
        insert_children(&tx, table, id, &children, &now)?;
        let raw = select_record(&tx, table, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await
      .map_err(classify)?
      .ok_or_else(|| Error::Decode(format!("{}: inserted row vanished", table.name)))?;

    tracing::debug!(table = table.name, "inserted row");
    decode_record(table, raw)
  }

  async fn update(&self, table: &'static Table, id: i64, row: Row) -> Result<Option<Row>> {
    let encoded = encode_row(table, &row, None)?;
    let children = encode_children(table, &row)?;
    let now = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, table, id)? {
          return Ok(None);
        }

        let mut assignments: Vec<String> =
          encoded.columns.iter().map(|c| format!("{} = ?", ident(c))).collect();
        assignments.push("updated_at = ?".into());
        let mut values = encoded.values.clone();
        values.push(SqlValue::Text(now.clone()));
        values.push(SqlValue::Integer(id));
        tx.execute(
          &format!("UPDATE {} SET {} WHERE id = ?", table.name, assignments.join(", ")),
          params_from_iter(values),
        )?;

        for (child, rows) in table.children.iter().zip(&children) {
          if rows.is_some() {
            tx.execute(
              &format!("DELETE FROM {} WHERE {} = ?1", child.table.name, ident(child.foreign_key)),
              [id],
            )?;
          }
        }
        insert_children(&tx, table, id, &children, &now)?;

        let raw = select_record(&tx, table, id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await
      .map_err(classify)?;

    tracing::debug!(table = table.name, id, found = raw.is_some(), "updated row");
    raw.map(|raw| decode_record(table, raw)).transpose()
  }

  async fn find(&self, table: &'static Table, id: i64) -> Result<Option<Row>> {
    let raw = self.conn.call(move |conn| Ok(select_record(conn, table, id)?)).await?;
    raw.map(|raw| decode_record(table, raw)).transpose()
  }

  async fn list(&self, table: &'static Table, query: ListQuery) -> Result<Page<Row>> {
    let (filter, params) = list_filter(table, &query);
    let limit = i64::from(query.per_page());
    let offset = i64::try_from(query.offset()).unwrap_or(i64::MAX);

    let (total, raws) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM {}{filter}", table.name),
          params_from_iter(params.iter()),
          |r| r.get(0),
        )?;

        let sql = format!(
          "SELECT {} FROM {}{filter} ORDER BY {} LIMIT ? OFFSET ?",
          select_list(table),
          table.name,
          table.order_by,
        );
        let width = select_width(table);
        let mut bound = params;
        bound.push(SqlValue::Integer(limit));
        bound.push(SqlValue::Integer(offset));
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(bound), |r| read_values(r, width))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        let raws = with_children(conn, table, rows)?;
        Ok((total, raws))
      })
      .await?;

    let rows = raws.into_iter().map(|raw| decode_record(table, raw)).collect::<Result<_>>()?;
    Ok(Page::new(rows, u64::try_from(total).unwrap_or(0), &query))
  }

  async fn all_where(
    &self,
    table: &'static Table,
    column: &'static str,
    value: i64,
  ) -> Result<Vec<Row>> {
    if column != "id" && table.column(column).is_none() {
      return Err(Error::UnknownColumn { table: table.name, column });
    }

    let raws = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {} FROM {} WHERE {} = ?1{} ORDER BY {}",
          select_list(table),
          table.name,
          ident(column),
          live_clause(table),
          table.order_by,
        );
        let width = select_width(table);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([value], |r| read_values(r, width))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(with_children(conn, table, rows)?)
      })
      .await?;

    raws.into_iter().map(|raw| decode_record(table, raw)).collect()
  }

  async fn delete(&self, table: &'static Table, id: i64) -> Result<bool> {
    let now = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        let changed = if table.soft_deletes {
          conn.execute(
            &format!(
              "UPDATE {} SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
              table.name
            ),
            rusqlite::params![now, id],
          )?
        } else {
          conn.execute(&format!("DELETE FROM {} WHERE id = ?1", table.name), [id])?
        };
        Ok(changed)
      })
      .await
      .map_err(classify)?;

    tracing::debug!(table = table.name, id, deleted = changed > 0, "deleted row");
    Ok(changed > 0)
  }
}
