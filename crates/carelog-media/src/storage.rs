//! Object storage backends for uploaded media.
//!
//! A backend owns the meaning of the `path` recorded on a media row: the
//! value returned by [`ObjectStorage::put`] is stored verbatim and handed
//! back to [`ObjectStorage::url`] and [`ObjectStorage::delete`].

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  time::Duration,
};

use async_trait::async_trait;
use aws_sdk_s3::{
  Client as S3Client, error::DisplayErrorContext, presigning::PresigningConfig,
  primitives::ByteStream,
};
use bytes::Bytes;

use crate::{Error, Result};

#[async_trait]
pub trait ObjectStorage: Send + Sync {
  /// Store `bytes` under `key` and return the path to record.
  async fn put(&self, key: &str, bytes: Bytes, mime_type: &str) -> Result<String>;

  /// A URL a browser can fetch the object from.
  async fn url(&self, path: &str) -> Result<String>;

  /// Remove the object. Missing objects are not an error.
  async fn delete(&self, path: &str) -> Result<()>;
}

// ─── Local disk ──────────────────────────────────────────────────────────────

/// Files under a directory the server exposes publicly.
///
/// Recorded paths are public URL paths (`{public_base}/{key}`) and are
/// returned as-is by [`ObjectStorage::url`].
#[derive(Debug, Clone)]
pub struct LocalDisk {
  root:        PathBuf,
  public_base: String,
}

impl LocalDisk {
  pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
    let public_base = public_base.into().trim_end_matches('/').to_owned();
    Self { root: root.into(), public_base }
  }

  pub fn root(&self) -> &Path { &self.root }

  /// Map a recorded path back onto the filesystem, refusing anything that
  /// does not live under `public_base` or tries to climb out of `root`.
  fn file_for(&self, path: &str) -> Result<PathBuf> {
    let key = path
      .strip_prefix(&self.public_base)
      .and_then(|rest| rest.strip_prefix('/'))
      .filter(|key| !key.split('/').any(|seg| seg.is_empty() || seg == ".."))
      .ok_or_else(|| Error::Storage(format!("not a local media path: {path}")))?;
    Ok(self.root.join(key))
  }
}

#[async_trait]
impl ObjectStorage for LocalDisk {
  async fn put(&self, key: &str, bytes: Bytes, _mime_type: &str) -> Result<String> {
    let path = format!("{}/{key}", self.public_base);
    let file = self.file_for(&path)?;
    if let Some(dir) = file.parent() {
      tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(&file, &bytes).await?;
    tracing::debug!(file = %file.display(), size = bytes.len(), "wrote local media");
    Ok(path)
  }

  async fn url(&self, path: &str) -> Result<String> { Ok(path.to_owned()) }

  async fn delete(&self, path: &str) -> Result<()> {
    let file = self.file_for(path)?;
    match tokio::fs::remove_file(&file).await {
      Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
      _ => Ok(()),
    }
  }
}

// ─── S3 ──────────────────────────────────────────────────────────────────────

/// A private bucket. Recorded paths are object keys; URLs are presigned on
/// every call and expire after `url_expiry`.
#[derive(Debug, Clone)]
pub struct S3Storage {
  client:     S3Client,
  bucket:     String,
  url_expiry: Duration,
}

impl S3Storage {
  pub fn new(client: S3Client, bucket: impl Into<String>, url_expiry: Duration) -> Self {
    Self { client, bucket: bucket.into(), url_expiry }
  }
}

fn s3_error(e: impl std::error::Error) -> Error {
  Error::Storage(DisplayErrorContext(e).to_string())
}

#[async_trait]
impl ObjectStorage for S3Storage {
  async fn put(&self, key: &str, bytes: Bytes, mime_type: &str) -> Result<String> {
    self
      .client
      .put_object()
      .bucket(&self.bucket)
      .key(key)
      .content_type(mime_type)
      .body(ByteStream::from(bytes))
      .send()
      .await
      .map_err(s3_error)?;
    tracing::debug!(bucket = %self.bucket, key, "uploaded media to s3");
    Ok(key.to_owned())
  }

  async fn url(&self, path: &str) -> Result<String> {
    let config = PresigningConfig::expires_in(self.url_expiry).map_err(s3_error)?;
    let request = self
      .client
      .get_object()
      .bucket(&self.bucket)
      .key(path)
      .presigned(config)
      .await
      .map_err(s3_error)?;
    Ok(request.uri().to_string())
  }

  async fn delete(&self, path: &str) -> Result<()> {
    self
      .client
      .delete_object()
      .bucket(&self.bucket)
      .key(path)
      .send()
      .await
      .map_err(s3_error)?;
    Ok(())
  }
}
