//! Uploaded media: validation, object storage and the `medias` table.
//!
//! [`MediaRepository`] writes the bytes to the backend chosen per upload
//! ([`Vendor::Local`] or [`Vendor::S3`]) and records a [`Media`] row through
//! any [`RecordStore`]. Reads return a [`MediaView`] carrying a URL that is
//! resolved on every call, so S3 links are always freshly signed while the
//! stored row keeps the bare key.

pub mod error;
pub mod mime;
pub mod storage;

use std::sync::Arc;

use bytes::Bytes;
use carelog_core::{
  RecordStore, Repository, Stored,
  models::media::{Media, Vendor},
};
use serde::Serialize;
use sha2::{Digest, Sha256};

pub use error::{Error, Result};
pub use storage::{LocalDisk, ObjectStorage, S3Storage};

/// A file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
  pub file_name:    String,
  /// Content type declared by the client, if any.
  pub content_type: Option<String>,
  pub bytes:        Bytes,
  pub vendor:       Vendor,
}

/// A media record with a URL the client can fetch it from.
#[derive(Debug, Clone, Serialize)]
pub struct MediaView {
  #[serde(flatten)]
  pub media: Stored<Media>,
  pub url:   String,
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String { hex::encode(Sha256::digest(bytes)) }

pub struct MediaRepository<S> {
  store: Arc<S>,
  local: Arc<dyn ObjectStorage>,
  s3:    Option<Arc<dyn ObjectStorage>>,
}

impl<S> Clone for MediaRepository<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), local: self.local.clone(), s3: self.s3.clone() }
  }
}

impl<S: RecordStore> MediaRepository<S> {
  pub fn new(
    store: Arc<S>,
    local: Arc<dyn ObjectStorage>,
    s3: Option<Arc<dyn ObjectStorage>>,
  ) -> Self {
    Self { store, local, s3 }
  }

  fn storage(&self, vendor: Vendor) -> Result<&dyn ObjectStorage> {
    match vendor {
      Vendor::Local => Ok(self.local.as_ref()),
      Vendor::S3 => self.s3.as_deref().ok_or(Error::S3NotConfigured),
    }
  }

  async fn view(&self, media: Stored<Media>) -> Result<MediaView> {
    let url = self.storage(media.data.vendor)?.url(&media.data.path).await?;
    Ok(MediaView { media, url })
  }

  /// Validate, store and record an upload.
  pub async fn upload(&self, upload: Upload) -> Result<MediaView> {
    if upload.bytes.is_empty() {
      return Err(Error::EmptyFile);
    }
    let mime_type = mime::resolve(upload.content_type.as_deref(), &upload.file_name);
    let Some(ext) = mime::extension(&mime_type) else {
      return Err(Error::UnsupportedMediaType(mime_type));
    };
    let storage = self.storage(upload.vendor)?;

    let key = format!("uploads/{}.{ext}", uuid::Uuid::new_v4());
    let size = i64::try_from(upload.bytes.len()).unwrap_or(i64::MAX);
    let hash = content_hash(&upload.bytes);
    let path = storage.put(&key, upload.bytes, &mime_type).await?;

    let media = Media {
      file_name: upload.file_name,
      mime_type,
      size,
      vendor: upload.vendor,
      path,
      content_hash: hash,
    };
    let stored = match Repository::new(self.store.as_ref()).store(&media).await {
      Ok(stored) => stored,
      Err(e) => {
        if let Err(cleanup) = storage.delete(&media.path).await {
          tracing::warn!(path = %media.path, error = %cleanup, "failed to remove orphaned upload");
        }
        return Err(e.into());
      }
    };

    tracing::info!(id = stored.id, vendor = stored.data.vendor.as_ref(), "stored media");
    self.view(stored).await
  }

  /// Fetch a media record and resolve its URL. The stored row is not
  /// modified.
  pub async fn find(&self, id: i64) -> Result<MediaView> {
    let media = Repository::<S, Media>::new(self.store.as_ref()).show(id).await?;
    self.view(media).await
  }

  /// Remove the object, then the row. Rows referencing the media have their
  /// reference cleared by the store.
  pub async fn destroy(&self, id: i64) -> Result<()> {
    let repo = Repository::<S, Media>::new(self.store.as_ref());
    let media = repo.show(id).await?;
    self.storage(media.data.vendor)?.delete(&media.data.path).await?;
    repo.destroy(id).await?;
    tracing::info!(id, "deleted media");
    Ok(())
  }
}

#[cfg(test)]
mod tests;
