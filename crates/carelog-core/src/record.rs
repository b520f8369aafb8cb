//! Typed records and their untyped row form.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Result, table::Table, validate::Validate};

/// A row as it crosses the [`RecordStore`](crate::store::RecordStore)
/// boundary: column name to JSON value, child arrays keyed by field name.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A create/update payload bound to the table that persists it.
///
/// The same type is used for the request body and for the data half of a
/// [`Stored`] record.
pub trait Resource:
  Serialize + DeserializeOwned + Validate + Send + Sync + 'static
{
  const TABLE: &'static Table;
}

/// A persisted resource with its store-managed envelope fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stored<T> {
  pub id:         i64,
  #[serde(flatten)]
  pub data:       T,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub deleted_at: Option<DateTime<Utc>>,
}

impl<T: DeserializeOwned> Stored<T> {
  pub fn from_row(row: Row) -> Result<Self> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
  }
}

/// Serialise a payload into the row form expected by the store.
pub fn to_row<T: Serialize>(value: &T) -> Result<Row> {
  match serde_json::to_value(value)? {
    serde_json::Value::Object(map) => Ok(map),
    other => Err(crate::Error::Serialization(serde::ser::Error::custom(
      format!("expected a JSON object, got {other}"),
    ))),
  }
}
