//! Individual support plans with goals, scheduled support and reviews.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  record::Resource,
  table::{Child, Table, int, text},
  validate::{Validate, ValidationErrors, Validator},
};

pub static SUPPORT_PLAN_GOALS: Table = Table {
  name:           "support_plan_goals",
  resource:       "support plan goal",
  columns:        &[int("support_plan_id"), text("domain"), text("goal"), int("priority")],
  children:       &[],
  scope:          Some("support_plan_id"),
  year_column:    None,
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "priority ASC, id ASC",
};

pub static SUPPORT_PLAN_DETAILS: Table = Table {
  name:           "support_plan_details",
  resource:       "support plan detail",
  columns:        &[
    int("support_plan_id"),
    text("support_content"),
    text("frequency"),
    text("person_in_charge"),
    text("period"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("support_plan_id"),
  year_column:    None,
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "id ASC",
};

pub static SUPPORT_PLAN_REVIEWS: Table = Table {
  name:           "support_plan_reviews",
  resource:       "support plan review",
  columns:        &[
    int("support_plan_id"),
    text("review_date"),
    int("reviewer_user_id"),
    text("achievement"),
    text("evaluation"),
    text("next_action"),
  ],
  children:       &[],
  scope:          Some("support_plan_id"),
  year_column:    Some("review_date"),
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "review_date ASC, id ASC",
};

pub static SUPPORT_PLANS: Table = Table {
  name:           "support_plans",
  resource:       "support plan",
  columns:        &[
    int("service_user_id"),
    int("facility_id"),
    text("plan_start_date"),
    text("plan_end_date"),
    int("created_by"),
    text("long_term_goal"),
    text("short_term_goal"),
    text("hopes_of_person"),
    text("hopes_of_family"),
    text("status"),
    text("agreed_on"),
  ],
  children:       &[
    Child { field: "goals", table: &SUPPORT_PLAN_GOALS, foreign_key: "support_plan_id" },
    Child { field: "details", table: &SUPPORT_PLAN_DETAILS, foreign_key: "support_plan_id" },
    Child { field: "reviews", table: &SUPPORT_PLAN_REVIEWS, foreign_key: "support_plan_id" },
  ],
  scope:          Some("service_user_id"),
  year_column:    Some("plan_start_date"),
  search_columns: &["long_term_goal", "short_term_goal"],
  soft_deletes:   false,
  order_by:       "plan_start_date DESC, id DESC",
};

#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PlanStatus {
  #[default]
  Draft,
  /// Explained to and agreed by the service user; `agreed_on` is mandatory.
  Agreed,
  Finished,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Goal {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:       Option<i64>,
  pub domain:   Option<String>,
  #[serde(default)]
  pub goal:     String,
  pub priority: Option<i64>,
}

impl Validate for Goal {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("goal", &self.goal)
      .check(
        "priority",
        self.priority.is_none_or(|p| p >= 1),
        "The priority field must be at least 1.",
      )
      .finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Detail {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:               Option<i64>,
  #[serde(default)]
  pub support_content:  String,
  pub frequency:        Option<String>,
  pub person_in_charge: Option<String>,
  pub period:           Option<String>,
  pub notes:            Option<String>,
}

impl Validate for Detail {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new().required("support_content", &self.support_content).finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Review {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:               Option<i64>,
  pub review_date:      Option<NaiveDate>,
  pub reviewer_user_id: Option<i64>,
  pub achievement:      Option<String>,
  pub evaluation:       Option<String>,
  pub next_action:      Option<String>,
}

impl Validate for Review {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new().required("review_date", &self.review_date).finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportPlan {
  pub service_user_id: Option<i64>,
  pub facility_id:     Option<i64>,
  pub plan_start_date: Option<NaiveDate>,
  pub plan_end_date:   Option<NaiveDate>,
  pub created_by:      Option<i64>,
  pub long_term_goal:  Option<String>,
  pub short_term_goal: Option<String>,
  pub hopes_of_person: Option<String>,
  pub hopes_of_family: Option<String>,
  #[serde(default)]
  pub status:          PlanStatus,
  pub agreed_on:       Option<NaiveDate>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub goals:           Option<Vec<Goal>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub details:         Option<Vec<Detail>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub reviews:         Option<Vec<Review>>,
}

impl Resource for SupportPlan {
  const TABLE: &'static Table = &SUPPORT_PLANS;
}

impl Validate for SupportPlan {
  fn validate(&self) -> Result<(), ValidationErrors> {
    let period_ordered = match (self.plan_start_date, self.plan_end_date) {
      (Some(start), Some(end)) => end >= start,
      _ => true,
    };

    Validator::new()
      .required("service_user_id", &self.service_user_id)
      .required("facility_id", &self.facility_id)
      .required("plan_start_date", &self.plan_start_date)
      .required("plan_end_date", &self.plan_end_date)
      .check(
        "plan_end_date",
        period_ordered,
        "The plan end date field must be a date after or equal to plan start date.",
      )
      .required_if(
        "agreed_on",
        &self.agreed_on,
        self.status == PlanStatus::Agreed,
        "status is agreed",
      )
      .each("goals", self.goals.as_deref().unwrap_or_default())
      .each("details", self.details.as_deref().unwrap_or_default())
      .each("reviews", self.reviews.as_deref().unwrap_or_default())
      .finish()
  }
}
