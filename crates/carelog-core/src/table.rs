//! Static table metadata.
//!
//! Every persisted resource is described by a [`Table`]. Storage backends read
//! these descriptions to map JSON rows onto real columns, so the column list
//! here must match the backend's DDL exactly.

/// How a column's value is represented in JSON and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
  /// Strings, dates (`YYYY-MM-DD`), date-times and `HH:MM` times.
  Text,
  Integer,
  Real,
  /// Stored as `0`/`1`, surfaced as JSON `true`/`false`.
  Bool,
  /// Arbitrary JSON, stored as its compact text encoding.
  Json,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
  pub name: &'static str,
  pub kind: ColumnKind,
}

pub const fn text(name: &'static str) -> Column { Column { name, kind: ColumnKind::Text } }

pub const fn int(name: &'static str) -> Column { Column { name, kind: ColumnKind::Integer } }

pub const fn real(name: &'static str) -> Column { Column { name, kind: ColumnKind::Real } }

pub const fn boolean(name: &'static str) -> Column { Column { name, kind: ColumnKind::Bool } }

pub const fn json(name: &'static str) -> Column { Column { name, kind: ColumnKind::Json } }

/// A one-to-many child table written and read together with its parent.
#[derive(Debug)]
pub struct Child {
  /// Name of the array field on the parent payload, e.g. `family_members`.
  pub field:       &'static str,
  pub table:       &'static Table,
  /// Column on the child table referencing the parent's `id`.
  pub foreign_key: &'static str,
}

#[derive(Debug)]
pub struct Table {
  pub name:           &'static str,
  /// Singular, human-readable name used in error messages.
  pub resource:       &'static str,
  /// Fillable columns. `id`, `created_at`, `updated_at` and `deleted_at` are
  /// implicit and managed by the store.
  pub columns:        &'static [Column],
  pub children:       &'static [Child],
  /// Column matched against the `{id}` of `index/{id}` routes.
  pub scope:          Option<&'static str>,
  /// Date column whose leading `YYYY` is matched by the `year` filter.
  pub year_column:    Option<&'static str>,
  pub search_columns: &'static [&'static str],
  pub soft_deletes:   bool,
  /// SQL `ORDER BY` expression over this table's columns.
  pub order_by:       &'static str,
}

impl Table {
  pub fn column(&self, name: &str) -> Option<&Column> {
    self.columns.iter().find(|c| c.name == name)
  }
}
