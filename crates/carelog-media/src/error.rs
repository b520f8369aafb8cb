//! Error type for `carelog-media`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unsupported media type: {0}")]
  UnsupportedMediaType(String),

  #[error("the uploaded file is empty")]
  EmptyFile,

  /// The upload asked for S3 but no bucket is configured.
  #[error("s3 storage is not configured")]
  S3NotConfigured,

  #[error("storage error: {0}")]
  Storage(String),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Core(#[from] carelog_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
