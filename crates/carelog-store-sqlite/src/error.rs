//! Error type for `carelog-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A payload value does not fit the column's declared kind.
  #[error("column {column}: cannot store {found}")]
  Encode { column: &'static str, found: String },

  #[error("decode error: {0}")]
  Decode(String),

  #[error("{table} has no column {column}")]
  UnknownColumn { table: &'static str, column: &'static str },

  /// The file was written by a newer carelog.
  #[error("database schema version {found} is newer than supported version {supported}")]
  SchemaVersion { found: i64, supported: i64 },

  /// A UNIQUE constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A FOREIGN KEY constraint rejected the write.
  #[error("invalid reference: {0}")]
  InvalidReference(String),
}

impl From<Error> for carelog_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Conflict(m) => Self::Conflict(m),
      Error::InvalidReference(m) => Self::InvalidReference(m),
      Error::Json(e) => Self::Serialization(e),
      other => Self::Store(Box::new(other)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
