//! Staff accounts and personal profiles.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Gender;
use crate::{
  record::Resource,
  table::{Table, int, text},
  validate::{EMAIL, KATAKANA, PHONE, POSTAL_CODE, Validate, ValidationErrors, Validator},
};

pub static USERS: Table = Table {
  name:           "users",
  resource:       "user",
  columns:        &[text("name"), text("email")],
  children:       &[],
  scope:          None,
  year_column:    None,
  search_columns: &["name", "email"],
  soft_deletes:   false,
  order_by:       "id DESC",
};

pub static PROFILES: Table = Table {
  name:           "profiles",
  resource:       "profile",
  columns:        &[
    int("user_id"),
    text("furigana"),
    text("full_name"),
    text("gender"),
    text("birthday"),
    text("postal_code"),
    text("address"),
    text("telephone"),
    text("email"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("user_id"),
  year_column:    None,
  search_columns: &["furigana", "full_name"],
  soft_deletes:   true,
  order_by:       "furigana ASC, id ASC",
};

/// A staff member who signs in to the admin UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
  #[serde(default)]
  pub name:  String,
  #[serde(default)]
  pub email: String,
}

impl Resource for User {
  const TABLE: &'static Table = &USERS;
}

impl Validate for User {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("name", &self.name)
      .max_len("name", Some(self.name.as_str()), 255)
      .required("email", &self.email)
      .pattern("email", Some(self.email.as_str()), &EMAIL)
      .finish()
  }
}

/// Identity and demographics, optionally tied to a staff [`User`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
  pub user_id:     Option<i64>,
  #[serde(default)]
  pub furigana:    String,
  #[serde(default)]
  pub full_name:   String,
  pub gender:      Option<Gender>,
  pub birthday:    Option<NaiveDate>,
  pub postal_code: Option<String>,
  pub address:     Option<String>,
  pub telephone:   Option<String>,
  pub email:       Option<String>,
  pub notes:       Option<String>,
}

impl Resource for Profile {
  const TABLE: &'static Table = &PROFILES;
}

impl Validate for Profile {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("furigana", &self.furigana)
      .pattern("furigana", Some(self.furigana.as_str()), &KATAKANA)
      .required("full_name", &self.full_name)
      .max_len("full_name", Some(self.full_name.as_str()), 255)
      .pattern("postal_code", self.postal_code.as_deref(), &POSTAL_CODE)
      .pattern("telephone", self.telephone.as_deref(), &PHONE)
      .pattern("email", self.email.as_deref(), &EMAIL)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn user_requires_a_well_formed_email() {
    let user = User { name: "Sato".into(), email: "not-an-email".into() };
    let errors = user.validate().unwrap_err();
    assert!(errors.contains("email"));
    assert!(!errors.contains("name"));
  }

  #[test]
  fn profile_furigana_must_be_katakana() {
    let profile = Profile {
      furigana: "さとう".into(),
      full_name: "佐藤".into(),
      ..Default::default()
    };
    assert!(profile.validate().unwrap_err().contains("furigana"));
  }
}
