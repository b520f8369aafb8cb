//! Money held on behalf of service users, and its running balance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  record::{Resource, Stored},
  table::{Table, int, text},
  validate::{Validate, ValidationErrors, Validator},
};

pub static DEPOSITS: Table = Table {
  name:           "deposits",
  resource:       "deposit",
  columns:        &[
    int("service_user_id"),
    text("transaction_date"),
    text("transaction_type"),
    int("amount"),
    text("item"),
    int("handled_by"),
    int("receipt_media_id"),
    text("notes"),
  ],
  children:       &[],
  scope:          Some("service_user_id"),
  year_column:    Some("transaction_date"),
  search_columns: &["item", "notes"],
  soft_deletes:   false,
  order_by:       "transaction_date DESC, id DESC",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionType {
  Deposit,
  Withdrawal,
}

crate::impl_presence!(TransactionType);

/// Largest single transaction accepted, in yen.
pub const MAX_AMOUNT: i64 = 999_999_999_999;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Deposit {
  pub service_user_id:  Option<i64>,
  pub transaction_date: Option<NaiveDate>,
  pub transaction_type: Option<TransactionType>,
  /// Whole yen; always positive, the direction comes from the type.
  pub amount:           Option<i64>,
  pub item:             Option<String>,
  pub handled_by:       Option<i64>,
  /// Uploaded receipt scan.
  pub receipt_media_id: Option<i64>,
  pub notes:            Option<String>,
}

impl Resource for Deposit {
  const TABLE: &'static Table = &DEPOSITS;
}

impl Validate for Deposit {
  fn validate(&self) -> Result<(), ValidationErrors> {
    Validator::new()
      .required("service_user_id", &self.service_user_id)
      .required("transaction_date", &self.transaction_date)
      .required("transaction_type", &self.transaction_type)
      .required("amount", &self.amount)
      .check(
        "amount",
        self.amount.is_none_or(|a| a > 0),
        "The amount field must be greater than 0.",
      )
      .check(
        "amount",
        self.amount.is_none_or(|a| a <= MAX_AMOUNT),
        format!("The amount field must not be greater than {MAX_AMOUNT}."),
      )
      .finish()
  }
}

/// Totals over every deposit record of one service user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
  pub service_user_id:   i64,
  pub deposits_total:    i64,
  pub withdrawals_total: i64,
  pub balance:           i64,
}

impl Balance {
  pub fn from_entries(service_user_id: i64, entries: &[Stored<Deposit>]) -> Self {
    let mut balance = Self { service_user_id, ..Self::default() };
    for entry in entries {
      let amount = entry.data.amount.unwrap_or(0);
      let total = match entry.data.transaction_type {
        Some(TransactionType::Deposit) => &mut balance.deposits_total,
        Some(TransactionType::Withdrawal) => &mut balance.withdrawals_total,
        None => continue,
      };
      *total = total.saturating_add(amount);
    }
    balance.balance = balance.deposits_total.saturating_sub(balance.withdrawals_total);
    balance
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn entry(kind: TransactionType, amount: i64) -> Stored<Deposit> {
    Stored {
      id:         1,
      data:       Deposit {
        service_user_id: Some(7),
        transaction_type: Some(kind),
        amount: Some(amount),
        ..Default::default()
      },
      created_at: Utc::now(),
      updated_at: Utc::now(),
      deleted_at: None,
    }
  }

  #[test]
  fn balance_nets_withdrawals_against_deposits() {
    let entries = [
      entry(TransactionType::Deposit, 10_000),
      entry(TransactionType::Withdrawal, 2_500),
      entry(TransactionType::Withdrawal, 1_200),
    ];
    let balance = Balance::from_entries(7, &entries);
    assert_eq!(balance.deposits_total, 10_000);
    assert_eq!(balance.withdrawals_total, 3_700);
    assert_eq!(balance.balance, 6_300);
  }

  #[test]
  fn non_positive_amount_is_rejected() {
    let d = Deposit { amount: Some(0), ..entry(TransactionType::Deposit, 1).data };
    assert!(d.validate().unwrap_err().contains("amount"));
  }

  #[test]
  fn amount_is_capped() {
    let ok = Deposit { amount: Some(MAX_AMOUNT), ..entry(TransactionType::Deposit, 1).data };
    assert!(ok.validate().is_ok());
    let over = Deposit { amount: Some(MAX_AMOUNT + 1), ..ok };
    assert!(over.validate().unwrap_err().contains("amount"));
  }

  #[test]
  fn huge_totals_saturate() {
    let entries = [
      entry(TransactionType::Deposit, i64::MAX),
      entry(TransactionType::Deposit, i64::MAX),
      entry(TransactionType::Withdrawal, 1),
    ];
    let balance = Balance::from_entries(7, &entries);
    assert_eq!(balance.deposits_total, i64::MAX);
    assert_eq!(balance.balance, i64::MAX - 1);
  }
}
