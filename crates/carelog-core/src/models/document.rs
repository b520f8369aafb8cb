//! Documents attached to a service user, and their signatures.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
  record::Resource,
  table::{Table, int, text},
  validate::{Validate, ValidationErrors, Validator},
};

pub static DOCUMENTS: Table = Table {
  name:           "documents",
  resource:       "document",
  columns:        &[
    int("service_user_id"),
    text("title"),
    text("category"),
    int("file"),
    text("issued_on"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("service_user_id"),
  year_column:    Some("issued_on"),
  search_columns: &["title", "category"],
  soft_deletes:   false,
  order_by:       "id DESC",
};

pub static SIGNATURES: Table = Table {
  name:           "signatures",
  resource:       "signature",
  columns:        &[
    int("document_id"),
    text("signer_name"),
    text("signer_role"),
    text("signed_at"),
    int("media_id"),
  ],
  children:       &[],
  scope:          Some("document_id"),
  year_column:    None,
  search_columns: &["signer_name"],
  soft_deletes:   false,
  order_by:       "id ASC",
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
  pub service_user_id: Option<i64>,
  #[serde(default)]
  pub title:           String,
  /// e.g. contract, important-matters explanation, consent.
  pub category:        Option<String>,
  /// Id of the uploaded media row; cleared when that media is deleted.
  pub file:            Option<i64>,
  pub issued_on:       Option<NaiveDate>,
  pub notes:           Option<String>,
}

impl Resource for Document {
  const TABLE: &'static Table = &DOCUMENTS;
}

impl Validate for Document {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("service_user_id", &self.service_user_id)
      .required("title", &self.title)
      .max_len("title", Some(self.title.as_str()), 255)
      .finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signature {
  pub document_id: Option<i64>,
  #[serde(default)]
  pub signer_name: String,
  /// e.g. the service user, a family member, a guardian.
  pub signer_role: Option<String>,
  pub signed_at:   Option<NaiveDateTime>,
  /// Image of the handwritten signature.
  pub media_id:    Option<i64>,
}

impl Resource for Signature {
  const TABLE: &'static Table = &SIGNATURES;
}

impl Validate for Signature {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("document_id", &self.document_id)
      .required("signer_name", &self.signer_name)
      .required("signed_at", &self.signed_at)
      .finish()
  }
}
