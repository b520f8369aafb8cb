//! Service users: the residents and clients whose records are managed.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::Gender;
use crate::{
  record::Resource,
  table::{Table, int, text},
  validate::{KATAKANA, PHONE, TEN_DIGITS, Validate, ValidationErrors, Validator},
};

pub static SERVICE_USERS: Table = Table {
  name:           "service_users",
  resource:       "service user",
  columns:        &[
    int("facility_id"),
    int("consultation_id"),
    text("furigana"),
    text("full_name"),
    text("gender"),
    text("birthday"),
    text("recipient_number"),
    int("support_category"),
    text("move_in_date"),
    text("move_out_date"),
    text("room_number"),
    text("emergency_contact_name"),
    text("emergency_contact_telephone"),
    text("status"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("facility_id"),
  year_column:    Some("move_in_date"),
  search_columns: &["furigana", "full_name", "recipient_number"],
  soft_deletes:   true,
  order_by:       "furigana ASC, id ASC",
};

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceUserStatus {
  #[default]
  Active,
  Hospitalized,
  Left,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceUser {
  pub facility_id:                 Option<i64>,
  /// The intake consultation this user came through, if any.
  pub consultation_id:             Option<i64>,
  #[serde(default)]
  pub furigana:                    String,
  #[serde(default)]
  pub full_name:                   String,
  pub gender:                      Option<Gender>,
  pub birthday:                    Option<NaiveDate>,
  /// Number on the disability welfare service recipient certificate.
  pub recipient_number:            Option<String>,
  /// Disability support category, 1 (lightest) to 6.
  pub support_category:            Option<i64>,
  pub move_in_date:                Option<NaiveDate>,
  pub move_out_date:               Option<NaiveDate>,
  pub room_number:                 Option<String>,
  pub emergency_contact_name:      Option<String>,
  pub emergency_contact_telephone: Option<String>,
  #[serde(default)]
  pub status:                      ServiceUserStatus,
  pub notes:                       Option<String>,
}

impl Resource for ServiceUser {
  const TABLE: &'static Table = &SERVICE_USERS;
}

impl Validate for ServiceUser {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let moved_out_after_in = match (self.move_in_date, self.move_out_date) {
      (Some(start), Some(end)) => end >= start,
      _ => true,
    };

    Validator::new()
      .required("facility_id", &self.facility_id)
      .required("furigana", &self.furigana)
      .pattern("furigana", Some(self.furigana.as_str()), &KATAKANA)
      .required("full_name", &self.full_name)
      .pattern("recipient_number", self.recipient_number.as_deref(), &TEN_DIGITS)
      .check(
        "support_category",
        self.support_category.is_none_or(|c| (1..=6).contains(&c)),
        "The support category field must be between 1 and 6.",
      )
      .pattern(
        "emergency_contact_telephone",
        self.emergency_contact_telephone.as_deref(),
        &PHONE,
      )
      .required_if(
        "move_out_date",
        &self.move_out_date,
        self.status == ServiceUserStatus::Left,
        "status is left",
      )
      .check(
        "move_out_date",
        moved_out_after_in,
        "The move out date field must be a date after or equal to move in date.",
      )
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn service_user() -> ServiceUser {
    ServiceUser {
      facility_id: Some(1),
      furigana: "スズキ イチロウ".into(),
      full_name: "鈴木 一郎".into(),
      ..Default::default()
    }
  }

  #[test]
  fn leaving_requires_move_out_date() {
    let u = ServiceUser { status: ServiceUserStatus::Left, ..service_user() };
    assert!(u.validate().unwrap_err().contains("move_out_date"));
  }

  #[test]
  fn move_out_cannot_precede_move_in() {
    let u = ServiceUser {
      move_in_date: NaiveDate::from_ymd_opt(2024, 4, 1),
      move_out_date: NaiveDate::from_ymd_opt(2024, 3, 31),
      ..service_user()
    };
    assert!(u.validate().unwrap_err().contains("move_out_date"));
  }

  #[test]
  fn support_category_is_bounded() {
    let u = ServiceUser { support_category: Some(7), ..service_user() };
    assert!(u.validate().unwrap_err().contains("support_category"));
    let u = ServiceUser { support_category: Some(6), ..service_user() };
    assert!(u.validate().is_ok());
  }
}
