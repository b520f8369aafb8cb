//! Daily shift reports: who worked and how each service user was.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  record::Resource,
  table::{Child, Table, boolean, int, real, text},
  validate::{TIME_OF_DAY, Validate, ValidationErrors, Validator},
};

pub static DAILY_REPORT_STAFFS: Table = Table {
  name:           "daily_report_staffs",
  resource:       "daily report staff",
  columns:        &[
    int("daily_report_id"),
    int("user_id"),
    text("role"),
    text("shift_start"),
    text("shift_end"),
  ],
  children:       &[],
  scope:          Some("daily_report_id"),
  year_column:    None,
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "id ASC",
};

pub static DAILY_REPORT_SERVICE_USERS: Table = Table {
  name:           "daily_report_service_users",
  resource:       "daily report service user",
  columns:        &[
    int("daily_report_id"),
    int("service_user_id"),
    text("condition"),
    real("body_temperature"),
    boolean("breakfast"),
    boolean("lunch"),
    boolean("dinner"),
    boolean("bathing"),
    boolean("medication_taken"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("daily_report_id"),
  year_column:    None,
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "id ASC",
};

pub static DAILY_REPORTS: Table = Table {
  name:           "daily_reports",
  resource:       "daily report",
  columns:        &[
    int("facility_id"),
    text("report_date"),
    text("shift"),
    text("weather"),
    text("summary"),
    text("handover"),
    int("created_by"),
  ],
  children:       &[
    Child { field: "staffs", table: &DAILY_REPORT_STAFFS, foreign_key: "daily_report_id" },
    Child {
      field:       "service_users",
      table:       &DAILY_REPORT_SERVICE_USERS,
      foreign_key: "daily_report_id",
    },
  ],
  scope:          Some("facility_id"),
  year_column:    Some("report_date"),
  search_columns: &["summary", "handover"],
  soft_deletes:   false,
  order_by:       "report_date DESC, id DESC",
};

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Shift {
  #[default]
  Day,
  Night,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:          Option<i64>,
  pub user_id:     Option<i64>,
  pub role:        Option<String>,
  /// `HH:MM`; a night shift may end before it starts.
  pub shift_start: Option<String>,
  pub shift_end:   Option<String>,
}

impl Validate for StaffEntry {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("user_id", &self.user_id)
      .pattern("shift_start", self.shift_start.as_deref(), &TIME_OF_DAY)
      .pattern("shift_end", self.shift_end.as_deref(), &TIME_OF_DAY)
      .finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceUserEntry {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:               Option<i64>,
  pub service_user_id:  Option<i64>,
  pub condition:        Option<String>,
  pub body_temperature: Option<f64>,
  #[serde(default)]
  pub breakfast:        bool,
  #[serde(default)]
  pub lunch:            bool,
  #[serde(default)]
  pub dinner:           bool,
  #[serde(default)]
  pub bathing:          bool,
  #[serde(default)]
  pub medication_taken: bool,
  pub notes:            Option<String>,
}

impl Validate for ServiceUserEntry {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("service_user_id", &self.service_user_id)
      .check(
        "body_temperature",
        self.body_temperature.is_none_or(|t| (34.0..=42.0).contains(&t)),
        "The body temperature field must be between 34 and 42.",
      )
      .finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyReport {
  pub facility_id:   Option<i64>,
  pub report_date:   Option<NaiveDate>,
  #[serde(default)]
  pub shift:         Shift,
  pub weather:       Option<String>,
  pub summary:       Option<String>,
  /// Notes passed to the next shift.
  pub handover:      Option<String>,
  pub created_by:    Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub staffs:        Option<Vec<StaffEntry>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub service_users: Option<Vec<ServiceUserEntry>>,
}

impl Resource for DailyReport {
  const TABLE: &'static Table = &DAILY_REPORTS;
}

impl Validate for DailyReport {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let mut seen = std::collections::HashSet::new();
    let unique_users = self
      .service_users
      .iter()
      .flatten()
      .filter_map(|e| e.service_user_id)
      .all(|id| seen.insert(id));

    Validator::new()
      .required("facility_id", &self.facility_id)
      .required("report_date", &self.report_date)
      .each("staffs", self.staffs.as_deref().unwrap_or_default())
      .each("service_users", self.service_users.as_deref().unwrap_or_default())
      .check(
        "service_users",
        unique_users,
        "Each service user may appear only once per report.",
      )
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn report() -> DailyReport {
    DailyReport {
      facility_id: Some(1),
      report_date: NaiveDate::from_ymd_opt(2024, 6, 1),
      ..Default::default()
    }
  }

  #[test]
  fn staff_times_must_be_hh_mm() {
    let r = DailyReport {
      staffs: Some(vec![StaffEntry {
        user_id: Some(1),
        shift_start: Some("9:00".into()),
        shift_end: Some("18:00".into()),
        ..Default::default()
      }]),
      ..report()
    };
    let errors = r.validate().unwrap_err();
    assert!(errors.contains("staffs.0.shift_start"));
    assert!(!errors.contains("staffs.0.shift_end"));
  }

  #[test]
  fn duplicate_service_user_rows_are_rejected() {
    let entry = ServiceUserEntry { service_user_id: Some(3), ..Default::default() };
    let r = DailyReport { service_users: Some(vec![entry.clone(), entry]), ..report() };
    assert!(r.validate().unwrap_err().contains("service_users"));
  }

  #[test]
  fn implausible_temperature_is_rejected() {
    let entry = ServiceUserEntry {
      service_user_id: Some(3),
      body_temperature: Some(46.0),
      ..Default::default()
    };
    let r = DailyReport { service_users: Some(vec![entry]), ..report() };
    assert!(r.validate().unwrap_err().contains("service_users.0.body_temperature"));
  }
}
