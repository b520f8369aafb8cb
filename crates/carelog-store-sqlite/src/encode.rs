//! Encoding and decoding between JSON rows and SQLite column values.
//!
//! Timestamps are stored as RFC 3339 strings. Dates and `HH:MM` times are
//! already strings in the JSON row and are stored verbatim, which keeps
//! `substr(col, 1, 4)` usable as a year filter. Booleans are stored as
//! `0`/`1` and JSON columns as their compact text encoding.

use chrono::{DateTime, Utc};
use carelog_core::{Column, ColumnKind, Row, Table};
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Single values ───────────────────────────────────────────────────────────

pub fn encode_value(column: &Column, value: &Value) -> Result<SqlValue> {
  let mismatch = || Error::Encode { column: column.name, found: value.to_string() };

  Ok(match (column.kind, value) {
    (_, Value::Null) => SqlValue::Null,

    (ColumnKind::Text, Value::String(s)) => SqlValue::Text(s.clone()),
    (ColumnKind::Text, Value::Number(n)) => SqlValue::Text(n.to_string()),

    (ColumnKind::Integer | ColumnKind::Bool, Value::Bool(b)) => SqlValue::Integer(i64::from(*b)),
    (ColumnKind::Integer | ColumnKind::Bool, Value::Number(n)) => {
      SqlValue::Integer(n.as_i64().ok_or_else(mismatch)?)
    }
    (ColumnKind::Integer, Value::String(s)) => {
      SqlValue::Integer(s.trim().parse().map_err(|_| mismatch())?)
    }

    (ColumnKind::Real, Value::Number(n)) => SqlValue::Real(n.as_f64().ok_or_else(mismatch)?),

    (ColumnKind::Json, v) => SqlValue::Text(serde_json::to_string(v)?),

    _ => return Err(mismatch()),
  })
}

pub fn decode_value(column: &str, kind: ColumnKind, value: SqlValue) -> Result<Value> {
  Ok(match (kind, value) {
    (_, SqlValue::Null) => Value::Null,
    (ColumnKind::Bool, SqlValue::Integer(i)) => Value::Bool(i != 0),
    (ColumnKind::Json, SqlValue::Text(s)) => serde_json::from_str(&s)?,
    (_, SqlValue::Integer(i)) => Value::from(i),
    (_, SqlValue::Real(f)) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
    (_, SqlValue::Text(s)) => Value::String(s),
    (_, SqlValue::Blob(_)) => {
      return Err(Error::Decode(format!("unexpected blob in column {column}")));
    }
  })
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// The fillable columns present on a payload, ready to bind.
#[derive(Debug, Clone, Default)]
pub struct EncodedRow {
  pub columns: Vec<&'static str>,
  pub values:  Vec<SqlValue>,
}

/// Encode the keys of `row` that are columns of `table`, skipping `skip`.
pub fn encode_row(table: &Table, row: &Row, skip: Option<&str>) -> Result<EncodedRow> {
  let mut out = EncodedRow::default();
  for column in table.columns {
    if Some(column.name) == skip {
      continue;
    }
    if let Some(value) = row.get(column.name) {
      out.columns.push(column.name);
      out.values.push(encode_value(column, value)?);
    }
  }
  Ok(out)
}

/// Encode the child arrays of `row`, one entry per [`Table::children`].
///
/// `None` means the payload did not mention that child field at all, which
/// leaves stored children untouched on update.
pub fn encode_children(table: &Table, row: &Row) -> Result<Vec<Option<Vec<EncodedRow>>>> {
  table
    .children
    .iter()
    .map(|child| match row.get(child.field) {
      None | Some(Value::Null) => Ok(None),
      Some(Value::Array(items)) => items
        .iter()
        .map(|item| match item {
          Value::Object(map) => encode_row(child.table, map, Some(child.foreign_key)),
          other => Err(Error::Encode { column: child.field, found: other.to_string() }),
        })
        .collect::<Result<Vec<_>>>()
        .map(Some),
      Some(other) => Err(Error::Encode { column: child.field, found: other.to_string() }),
    })
    .collect()
}

// ─── Select lists ────────────────────────────────────────────────────────────

/// Quote an identifier for interpolation into SQL.
pub fn ident(name: &str) -> String { format!("\"{name}\"") }

/// Column list read back for every row: `id`, the fillable columns, then
/// the timestamps. [`decode_row`] expects values in this order.
pub fn select_list(table: &Table) -> String {
  let mut names = vec!["id".to_owned()];
  names.extend(table.columns.iter().map(|c| ident(c.name)));
  names.push("created_at".into());
  names.push("updated_at".into());
  if table.soft_deletes {
    names.push("deleted_at".into());
  }
  names.join(", ")
}

pub fn select_width(table: &Table) -> usize {
  table.columns.len() + 3 + usize::from(table.soft_deletes)
}

/// Values of one row as read from SQLite, in [`select_list`] order.
pub type RawValues = Vec<SqlValue>;

/// A parent row with the raw rows of each of its child tables.
#[derive(Debug)]
pub struct RawRecord {
  pub values:   RawValues,
  pub children: Vec<Vec<RawValues>>,
}

fn decode_row(table: &Table, values: RawValues) -> Result<Row> {
  if values.len() != select_width(table) {
    return Err(Error::Decode(format!(
      "{}: expected {} values, got {}",
      table.name,
      select_width(table),
      values.len()
    )));
  }

  let mut values = values.into_iter();
  let mut row = Row::new();
  let mut take = |name: &str, kind: ColumnKind, row: &mut Row| -> Result<()> {
    let value = values.next().unwrap_or(SqlValue::Null);
    row.insert(name.to_owned(), decode_value(name, kind, value)?);
    Ok(())
  };

  take("id", ColumnKind::Integer, &mut row)?;
  for column in table.columns {
    take(column.name, column.kind, &mut row)?;
  }
  take("created_at", ColumnKind::Text, &mut row)?;
  take("updated_at", ColumnKind::Text, &mut row)?;
  if table.soft_deletes {
    take("deleted_at", ColumnKind::Text, &mut row)?;
  }
  Ok(row)
}

pub fn decode_record(table: &Table, raw: RawRecord) -> Result<Row> {
  let mut row = decode_row(table, raw.values)?;
  for (child, rows) in table.children.iter().zip(raw.children) {
    let items = rows
      .into_iter()
      .map(|values| decode_row(child.table, values).map(Value::Object))
      .collect::<Result<Vec<_>>>()?;
    row.insert(child.field.to_owned(), Value::Array(items));
  }
  Ok(row)
}
