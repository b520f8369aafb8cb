//! Per-visit service provision records, the basis for billing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  record::Resource,
  table::{Table, boolean, int, text},
  validate::{TIME_OF_DAY, Validate, ValidationErrors, Validator},
};

pub static SERVICE_PROVISION_LOGS: Table = Table {
  name:           "service_provision_logs",
  resource:       "service provision log",
  columns:        &[
    int("facility_id"),
    int("service_user_id"),
    text("provision_date"),
    text("service_type"),
    text("start_time"),
    text("end_time"),
    boolean("pickup"),
    boolean("meal_provided"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("service_user_id"),
  year_column:    Some("provision_date"),
  search_columns: &["service_type", "notes"],
  soft_deletes:   false,
  order_by:       "provision_date DESC, start_time DESC, id DESC",
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceProvisionLog {
  pub facility_id:     Option<i64>,
  pub service_user_id: Option<i64>,
  pub provision_date:  Option<NaiveDate>,
  pub service_type:    Option<String>,
  /// `HH:MM`
  #[serde(default)]
  pub start_time:      String,
  /// `HH:MM`, strictly after `start_time`.
  #[serde(default)]
  pub end_time:        String,
  #[serde(default)]
  pub pickup:          bool,
  #[serde(default)]
  pub meal_provided:   bool,
  pub notes:           Option<String>,
}

impl Resource for ServiceProvisionLog {
  const TABLE: &'static Table = &SERVICE_PROVISION_LOGS;
}

impl Validate for ServiceProvisionLog {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let well_formed =
      TIME_OF_DAY.is_match(&self.start_time) && TIME_OF_DAY.is_match(&self.end_time);

    Validator::new()
      .required("facility_id", &self.facility_id)
      .required("service_user_id", &self.service_user_id)
      .required("provision_date", &self.provision_date)
      .required("start_time", &self.start_time)
      .pattern("start_time", Some(self.start_time.as_str()), &TIME_OF_DAY)
      .required("end_time", &self.end_time)
      .pattern("end_time", Some(self.end_time.as_str()), &TIME_OF_DAY)
      // Zero-padded HH:MM compares correctly as text.
      .check(
        "end_time",
        !well_formed || self.end_time > self.start_time,
        "The end time field must be a time after start time.",
      )
      .finish()
  }
}
