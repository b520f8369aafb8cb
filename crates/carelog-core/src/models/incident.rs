//! Accident, near-miss and complaint reports.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  record::Resource,
  table::{Table, boolean, int, text},
  validate::{Validate, ValidationErrors, Validator},
};

pub static INCIDENTS: Table = Table {
  name:           "incidents",
  resource:       "incident",
  columns:        &[
    int("facility_id"),
    int("service_user_id"),
    text("occurred_at"),
    text("location"),
    text("category"),
    text("description"),
    text("response"),
    text("prevention"),
    int("reporter_user_id"),
    boolean("family_notified"),
  ],
  children:       &[],
  scope:          Some("facility_id"),
  year_column:    Some("occurred_at"),
  search_columns: &["location", "description"],
  soft_deletes:   false,
  order_by:       "occurred_at DESC, id DESC",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentCategory {
  Accident,
  NearMiss,
  Complaint,
  Other,
}

crate::impl_presence!(IncidentCategory);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Incident {
  pub facility_id:      Option<i64>,
  pub service_user_id:  Option<i64>,
  pub occurred_at:      Option<NaiveDateTime>,
  pub location:         Option<String>,
  pub category:         Option<IncidentCategory>,
  #[serde(default)]
  pub description:      String,
  /// What staff did at the time.
  pub response:         Option<String>,
  /// Measures to prevent recurrence.
  pub prevention:       Option<String>,
  pub reporter_user_id: Option<i64>,
  #[serde(default)]
  pub family_notified:  bool,
}

impl Resource for Incident {
  const TABLE: &'static Table = &INCIDENTS;
}

impl Validate for Incident {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("facility_id", &self.facility_id)
      .required("occurred_at", &self.occurred_at)
      .required("category", &self.category)
      .required("description", &self.description)
      .finish()
  }
}
