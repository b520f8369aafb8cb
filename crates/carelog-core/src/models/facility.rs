//! Facilities and staff-role assignments.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  record::Resource,
  table::{Table, int, text},
  validate::{
    EMAIL, KATAKANA, PHONE, POSTAL_CODE, TEN_DIGITS, Validate, ValidationErrors, Validator,
  },
};

pub static FACILITIES: Table = Table {
  name:           "facilities",
  resource:       "facility",
  columns:        &[
    text("name"),
    text("furigana"),
    text("facility_number"),
    text("service_type"),
    text("postal_code"),
    text("address"),
    text("telephone"),
    text("fax"),
    text("email"),
    int("capacity"),
  ],
  children:       &[],
  scope:          None,
  year_column:    None,
  search_columns: &["name", "furigana", "address"],
  soft_deletes:   false,
  order_by:       "id ASC",
};

pub static FACILITY_USER: Table = Table {
  name:           "facility_user",
  resource:       "facility user",
  columns:        &[int("user_id"), int("facility_id"), text("role")],
  children:       &[],
  scope:          Some("facility_id"),
  year_column:    None,
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "id ASC",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ServiceType {
  GroupHome,
  LifeCare,
  EmploymentSupportB,
  ShortStay,
}

crate::impl_presence!(ServiceType);

/// An organisational unit (e.g. a group home) that staff and service users
/// belong to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Facility {
  #[serde(default)]
  pub name:            String,
  pub furigana:        Option<String>,
  /// Ten-digit number assigned by the prefecture.
  pub facility_number: Option<String>,
  pub service_type:    Option<ServiceType>,
  pub postal_code:     Option<String>,
  pub address:         Option<String>,
  #[serde(default)]
  pub telephone:       String,
  pub fax:             Option<String>,
  pub email:           Option<String>,
  pub capacity:        Option<i64>,
}

impl Resource for Facility {
  const TABLE: &'static Table = &FACILITIES;
}

impl Validate for Facility {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("name", &self.name)
      .max_len("name", Some(self.name.as_str()), 255)
      .pattern("furigana", self.furigana.as_deref(), &KATAKANA)
      .pattern("facility_number", self.facility_number.as_deref(), &TEN_DIGITS)
      .required("service_type", &self.service_type)
      .pattern("postal_code", self.postal_code.as_deref(), &POSTAL_CODE)
      .required("telephone", &self.telephone)
      .pattern("telephone", Some(self.telephone.as_str()), &PHONE)
      .pattern("fax", self.fax.as_deref(), &PHONE)
      .pattern("email", self.email.as_deref(), &EMAIL)
      .check(
        "capacity",
        self.capacity.is_none_or(|c| c >= 1),
        "The capacity field must be at least 1.",
      )
      .finish()
  }
}

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StaffRole {
  Admin,
  /// Service manager responsible for support plans.
  Manager,
  #[default]
  Staff,
}

/// Assignment of a staff user to a facility. Unique per `(user_id,
/// facility_id)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityUser {
  pub user_id:     Option<i64>,
  pub facility_id: Option<i64>,
  #[serde(default)]
  pub role:        StaffRole,
}

impl Resource for FacilityUser {
  const TABLE: &'static Table = &FACILITY_USER;
}

impl Validate for FacilityUser {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("user_id", &self.user_id)
      .required("facility_id", &self.facility_id)
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn facility() -> Facility {
    Facility {
      name: "ひまわりホーム".into(),
      service_type: Some(ServiceType::GroupHome),
      telephone: "0312345678".into(),
      ..Default::default()
    }
  }

  #[test]
  fn minimal_facility_is_valid() {
    assert!(facility().validate().is_ok());
  }

  #[test]
  fn fax_and_facility_number_formats_are_enforced() {
    let f = Facility {
      fax: Some("03-1234-5678".into()),
      facility_number: Some("12345".into()),
      ..facility()
    };
    let errors = f.validate().unwrap_err();
    assert!(errors.contains("fax"));
    assert!(errors.contains("facility_number"));
  }

  #[test]
  fn assignment_requires_both_ids() {
    let errors = FacilityUser::default().validate().unwrap_err();
    assert!(errors.contains("user_id"));
    assert!(errors.contains("facility_id"));
  }
}
