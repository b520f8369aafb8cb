//! Field-level validation for create/update payloads.
//!
//! Failures are collected per field rather than returned on the first error,
//! so a form can highlight every invalid input at once. Field names use the
//! payload's JSON keys; rows of child arrays are addressed as
//! `family_members.0.name`.

use std::{collections::BTreeMap, sync::LazyLock};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;

// ─── Patterns ────────────────────────────────────────────────────────────────

/// Domestic phone and fax numbers: digits only, 10 or 11 of them.
pub static PHONE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{10,11}$").expect("valid regex"));

pub static POSTAL_CODE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{3}-?\d{4}$").expect("valid regex"));

pub static EMAIL: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex"));

/// Full-width katakana with long-vowel marks and spaces.
pub static KATAKANA: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[ァ-ヶー・　 ]+$").expect("valid regex"));

pub static TIME_OF_DAY: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid regex"));

/// Facility numbers and recipient certificate numbers.
pub static TEN_DIGITS: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Messages keyed by field, serialised as `{"field": ["message", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
    self.0.entry(field.into()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn fields(&self) -> impl Iterator<Item = &str> { self.0.keys().map(String::as_str) }

  /// The first message, used for toast-style summaries.
  pub fn first_message(&self) -> Option<&str> {
    self.0.values().flatten().next().map(String::as_str)
  }
}

/// Implemented by every payload accepted by a store or update endpoint.
pub trait Validate {
  fn validate(&self) -> Result<(), ValidationErrors>;
}

// ─── Presence ────────────────────────────────────────────────────────────────

/// Whether a value counts as filled in for a `required` rule.
pub trait Presence {
  fn is_present(&self) -> bool;
}

impl Presence for String {
  fn is_present(&self) -> bool { !self.trim().is_empty() }
}

impl Presence for str {
  fn is_present(&self) -> bool { !self.trim().is_empty() }
}

impl<T> Presence for Vec<T> {
  fn is_present(&self) -> bool { !self.is_empty() }
}

impl<T: Presence> Presence for Option<T> {
  fn is_present(&self) -> bool { self.as_ref().is_some_and(Presence::is_present) }
}

/// Mark types as always present when set, e.g. numbers and enums.
#[macro_export]
macro_rules! impl_presence {
  ($($ty:ty),* $(,)?) => {
    $(impl $crate::validate::Presence for $ty {
      fn is_present(&self) -> bool { true }
    })*
  };
}

impl_presence!(i64, i32, u32, u8, f64, bool, NaiveDate, NaiveDateTime);

// ─── Validator ───────────────────────────────────────────────────────────────

fn label(field: &str) -> String {
  let last = field.rsplit('.').next().unwrap_or(field);
  last.replace('_', " ")
}

/// Accumulates rule failures for one payload.
#[derive(Debug, Default)]
pub struct Validator {
  errors: ValidationErrors,
}

impl Validator {
  pub fn new() -> Self { Self::default() }

  pub fn required<T: Presence + ?Sized>(&mut self, field: &str, value: &T) -> &mut Self {
    if !value.is_present() {
      self.errors.add(field, format!("The {} field is required.", label(field)));
    }
    self
  }

  /// `field` is required when `condition` holds; `when` describes the
  /// condition for the message, e.g. `"response status is 1"`.
  pub fn required_if<T: Presence + ?Sized>(
    &mut self,
    field: &str,
    value: &T,
    condition: bool,
    when: &str,
  ) -> &mut Self {
    if condition && !value.is_present() {
      self
        .errors
        .add(field, format!("The {} field is required when {when}.", label(field)));
    }
    self
  }

  /// Match `value` against `pattern`. Blank or absent values are skipped;
  /// pair with [`required`](Self::required) when the field is mandatory.
  pub fn pattern(&mut self, field: &str, value: Option<&str>, pattern: &Regex) -> &mut Self {
    if let Some(v) = value.filter(|v| !v.is_empty())
      && !pattern.is_match(v)
    {
      self.errors.add(field, format!("The {} field format is invalid.", label(field)));
    }
    self
  }

  pub fn max_len(&mut self, field: &str, value: Option<&str>, max: usize) -> &mut Self {
    if let Some(v) = value
      && v.chars().count() > max
    {
      self.errors.add(
        field,
        format!("The {} field must not be greater than {max} characters.", label(field)),
      );
    }
    self
  }

  /// Record `message` against `field` unless `ok` holds.
  pub fn check(&mut self, field: &str, ok: bool, message: impl Into<String>) -> &mut Self {
    if !ok {
      self.errors.add(field, message);
    }
    self
  }

  /// Validate each row of a child array, prefixing its errors with
  /// `field.<index>.`.
  pub fn each<T: Validate>(&mut self, field: &str, rows: &[T]) -> &mut Self {
    for (i, row) in rows.iter().enumerate() {
      if let Err(errors) = row.validate() {
        for (name, messages) in errors.0 {
          for message in messages {
            self.errors.add(format!("{field}.{i}.{name}"), message);
          }
        }
      }
    }
    self
  }

  pub fn finish(&mut self) -> Result<(), ValidationErrors> {
    let errors = std::mem::take(&mut self.errors);
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }
}
