//! Intake assessments with per-domain evaluations and medical history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  record::Resource,
  table::{Child, Table, int, text},
  validate::{Validate, ValidationErrors, Validator},
};

pub static LIVING_DOMAIN_ASSESSMENTS: Table = Table {
  name:           "living_domain_assessments",
  resource:       "living domain assessment",
  columns:        &[
    int("assessment_id"),
    text("domain"),
    text("level"),
    text("current_status"),
    text("support_needed"),
  ],
  children:       &[],
  scope:          Some("assessment_id"),
  year_column:    None,
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "id ASC",
};

pub static MEDICAL_DISABILITY_HISTORY: Table = Table {
  name:           "medical_disability_history",
  resource:       "medical history",
  columns:        &[
    int("assessment_id"),
    text("disease_name"),
    text("onset_date"),
    text("hospital_name"),
    text("doctor_name"),
    text("medication"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("assessment_id"),
  year_column:    None,
  search_columns: &[],
  soft_deletes:   false,
  order_by:       "id ASC",
};

pub static ASSESSMENTS: Table = Table {
  name:           "assessments",
  resource:       "assessment",
  columns:        &[
    int("service_user_id"),
    text("assessment_date"),
    int("assessor_user_id"),
    text("living_situation"),
    text("hopes_of_person"),
    text("hopes_of_family"),
    text("physical_disability_type"),
    int("physical_disability_grade"),
    text("intellectual_disability_grade"),
    int("mental_disability_grade"),
    text("notes"),
  ],
  children:       &[
    Child {
      field:       "living_domains",
      table:       &LIVING_DOMAIN_ASSESSMENTS,
      foreign_key: "assessment_id",
    },
    Child {
      field:       "medical_histories",
      table:       &MEDICAL_DISABILITY_HISTORY,
      foreign_key: "assessment_id",
    },
  ],
  scope:          Some("service_user_id"),
  year_column:    Some("assessment_date"),
  search_columns: &["living_situation", "notes"],
  soft_deletes:   false,
  order_by:       "assessment_date DESC, id DESC",
};

/// How much help a service user needs in one living domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AssistanceLevel {
  Independent,
  Supervision,
  PartialAssistance,
  FullAssistance,
}

crate::impl_presence!(AssistanceLevel);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LivingDomainAssessment {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:             Option<i64>,
  /// e.g. meals, bathing, toileting, money management, medication.
  #[serde(default)]
  pub domain:         String,
  pub level:          Option<AssistanceLevel>,
  pub current_status: Option<String>,
  pub support_needed: Option<String>,
}

impl Validate for LivingDomainAssessment {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("domain", &self.domain)
      .required("level", &self.level)
      .finish()
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicalHistory {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id:            Option<i64>,
  #[serde(default)]
  pub disease_name:  String,
  pub onset_date:    Option<NaiveDate>,
  pub hospital_name: Option<String>,
  pub doctor_name:   Option<String>,
  pub medication:    Option<String>,
  pub notes:         Option<String>,
}

impl Validate for MedicalHistory {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new().required("disease_name", &self.disease_name).finish()
  }
}

/// Intellectual disability certificate grades.
const INTELLECTUAL_GRADES: [&str; 4] = ["A1", "A2", "B1", "B2"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Assessment {
  pub service_user_id:               Option<i64>,
  pub assessment_date:               Option<NaiveDate>,
  pub assessor_user_id:              Option<i64>,
  pub living_situation:              Option<String>,
  pub hopes_of_person:               Option<String>,
  pub hopes_of_family:               Option<String>,
  /// e.g. visual, hearing, limb, internal.
  pub physical_disability_type:      Option<String>,
  /// Physical disability certificate grade, 1 to 6.
  pub physical_disability_grade:     Option<i64>,
  pub intellectual_disability_grade: Option<String>,
  /// Mental health certificate grade, 1 to 3.
  pub mental_disability_grade:       Option<i64>,
  pub notes:                         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub living_domains:                Option<Vec<LivingDomainAssessment>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub medical_histories:             Option<Vec<MedicalHistory>>,
}

impl Resource for Assessment {
  const TABLE: &'static Table = &ASSESSMENTS;
}

impl Validate for Assessment {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("service_user_id", &self.service_user_id)
      .required("assessment_date", &self.assessment_date)
      .required_if(
        "physical_disability_grade",
        &self.physical_disability_grade,
        self.physical_disability_type.as_deref().is_some_and(|t| !t.trim().is_empty()),
        "physical disability type is present",
      )
      .check(
        "physical_disability_grade",
        self.physical_disability_grade.is_none_or(|g| (1..=6).contains(&g)),
        "The physical disability grade field must be between 1 and 6.",
      )
      .check(
        "intellectual_disability_grade",
        self
          .intellectual_disability_grade
          .as_deref()
          .is_none_or(|g| g.is_empty() || INTELLECTUAL_GRADES.contains(&g)),
        "The selected intellectual disability grade is invalid.",
      )
      .check(
        "mental_disability_grade",
        self.mental_disability_grade.is_none_or(|g| (1..=3).contains(&g)),
        "The mental disability grade field must be between 1 and 3.",
      )
      .each("living_domains", self.living_domains.as_deref().unwrap_or_default())
      .each("medical_histories", self.medical_histories.as_deref().unwrap_or_default())
      .finish()
  }
}
