//! Intake consultations and the family members recorded with them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::Gender;
use crate::{
  record::Resource,
  table::{Child, Table, boolean, int, text},
  validate::{KATAKANA, PHONE, POSTAL_CODE, Validate, ValidationErrors, Validator},
};

pub static FAMILY_MEMBERS: Table = Table {
  name:           "family_members",
  resource:       "family member",
  columns:        &[
    int("consultation_id"),
    text("name"),
    text("relationship"),
    int("age"),
    boolean("living_together"),
    text("telephone"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("consultation_id"),
  year_column:    None,
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "id ASC",
};

pub static CONSULTATIONS: Table = Table {
  name:           "consultations",
  resource:       "consultation",
  columns:        &[
    int("facility_id"),
    text("consultation_date"),
    text("furigana"),
    text("full_name"),
    text("gender"),
    text("birthday"),
    text("telephone"),
    text("postal_code"),
    text("address"),
    text("consultation_route"),
    text("content"),
    text("response_status"),
    int("referral_facility_id"),
    int("staff_user_id"),
    text("notes"),
  ],
  children:       &[Child {
    field:       "family_members",
    table:       &FAMILY_MEMBERS,
    foreign_key: "consultation_id",
  }],
  scope:          Some("facility_id"),
  year_column:    Some("consultation_date"),
  search_columns: &["furigana", "full_name", "content"],
  soft_deletes:   false,
  order_by:       "consultation_date DESC, id DESC",
};

/// How an intake consultation was answered. Serialised as the single-digit
/// codes the intake form submits.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
pub enum ResponseStatus {
  #[default]
  #[serde(rename = "0")]
  #[strum(serialize = "0")]
  Pending,
  /// Referred to another facility; `referral_facility_id` is mandatory.
  #[serde(rename = "1")]
  #[strum(serialize = "1")]
  Referred,
  #[serde(rename = "2")]
  #[strum(serialize = "2")]
  Accepted,
  #[serde(rename = "3")]
  #[strum(serialize = "3")]
  Declined,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyMember {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:              Option<i64>,
  #[serde(default)]
  pub name:            String,
  pub relationship:    Option<String>,
  pub age:             Option<i64>,
  #[serde(default)]
  pub living_together: bool,
  pub telephone:       Option<String>,
  pub notes:           Option<String>,
}

impl Validate for FamilyMember {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("name", &self.name)
      .pattern("telephone", self.telephone.as_deref(), &PHONE)
      .check(
        "age",
        self.age.is_none_or(|a| (0..=130).contains(&a)),
        "The age field must be between 0 and 130.",
      )
      .finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Consultation {
  pub facility_id:          Option<i64>,
  pub consultation_date:    Option<NaiveDate>,
  #[serde(default)]
  pub furigana:             String,
  #[serde(default)]
  pub full_name:            String,
  pub gender:               Option<Gender>,
  pub birthday:             Option<NaiveDate>,
  #[serde(default)]
  pub telephone:            String,
  pub postal_code:          Option<String>,
  pub address:              Option<String>,
  /// How the enquiry reached the facility (family, hospital, agency, ...).
  pub consultation_route:   Option<String>,
  pub content:              Option<String>,
  #[serde(default)]
  pub response_status:      ResponseStatus,
  pub referral_facility_id: Option<i64>,
  pub staff_user_id:        Option<i64>,
  pub notes:                Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub family_members:       Option<Vec<FamilyMember>>,
}

impl Resource for Consultation {
  const TABLE: &'static Table = &CONSULTATIONS;
}

impl Validate for Consultation {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("facility_id", &self.facility_id)
      .required("consultation_date", &self.consultation_date)
      .required("furigana", &self.furigana)
      .pattern("furigana", Some(self.furigana.as_str()), &KATAKANA)
      .required("full_name", &self.full_name)
      .required("telephone", &self.telephone)
      .pattern("telephone", Some(self.telephone.as_str()), &PHONE)
      .pattern("postal_code", self.postal_code.as_deref(), &POSTAL_CODE)
      .required_if(
        "referral_facility_id",
        &self.referral_facility_id,
        self.response_status == ResponseStatus::Referred,
        "response status is 1",
      )
      .each("family_members", self.family_members.as_deref().unwrap_or_default())
      .finish()
  }
}
