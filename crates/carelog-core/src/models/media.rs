//! Uploaded file metadata. The bytes live on local disk or in S3.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  record::Resource,
  table::{Table, int, text},
  validate::{Validate, ValidationErrors, Validator},
};

pub static MEDIAS: Table = Table {
  name:           "medias",
  resource:       "media",
  columns:        &[
    text("file_name"),
    text("mime_type"),
    int("size"),
    text("vendor"),
    text("path"),
    text("content_hash"),
  ],
  children:       &[],
  scope:          None,
  year_column:    None,
  search_columns: &["file_name"],
  soft_deletes:   false,
  order_by:       "id DESC",
};

/// Where a media object is stored.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Vendor {
  /// Public local disk; `path` is a URL path served by the application.
  #[default]
  Local,
  /// Private bucket; `path` is the object key and is signed on every read.
  S3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
  /// Original client-side file name.
  pub file_name:    String,
  pub mime_type:    String,
  pub size:         i64,
  pub vendor:       Vendor,
  pub path:         String,
  /// SHA-256 hex digest of the content.
  pub content_hash: String,
}

impl Resource for Media {
  const TABLE: &'static Table = &MEDIAS;
}

impl Validate for Media {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("file_name", &self.file_name)
      .required("mime_type", &self.mime_type)
      .required("path", &self.path)
      .check("size", self.size > 0, "The file must not be empty.")
      .finish()
  }
}
