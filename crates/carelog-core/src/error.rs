//! Error types for `carelog-core`.

use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum Error {
  #[error("{resource} not found: {id}")]
  NotFound { resource: &'static str, id: i64 },

  #[error("the given data was invalid")]
  Validation(ValidationErrors),

  /// A UNIQUE constraint rejected the write.
  #[error("conflict: {0}")]
  Conflict(String),

  /// A FOREIGN KEY constraint rejected the write.
  #[error("invalid reference: {0}")]
  InvalidReference(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<ValidationErrors> for Error {
  fn from(errors: ValidationErrors) -> Self { Self::Validation(errors) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
