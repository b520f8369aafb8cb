//! Domain payloads, one module per resource group.
//!
//! Each payload is both the create/update body and the data half of its
//! [`Stored`](crate::record::Stored) record. Its [`Table`](crate::table::Table)
//! lives next to it.

pub mod assessment;
pub mod consultation;
pub mod daily_report;
pub mod deposit;
pub mod document;
pub mod facility;
pub mod incident;
pub mod media;
pub mod service_provision_log;
pub mod service_user;
pub mod support_plan;
pub mod user;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Gender {
  Male,
  Female,
  Other,
}

crate::impl_presence!(Gender);
