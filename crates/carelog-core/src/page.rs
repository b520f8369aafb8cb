//! Pagination query and envelope.
//!
//! The envelope mirrors the paginator shape the admin frontend already reads:
//! `data`, `total`, `per_page`, `current_page`, `last_page`, `from`, `to`.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, de};

pub const DEFAULT_PER_PAGE: u32 = 15;
pub const MAX_PER_PAGE: u32 = 100;

/// Parameters for [`RecordStore::list`](crate::store::RecordStore::list).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
  #[serde(default, deserialize_with = "blank_as_none")]
  pub page:     Option<u32>,
  #[serde(default, deserialize_with = "blank_as_none")]
  pub per_page: Option<u32>,
  /// Restrict to rows whose year column starts with this year.
  #[serde(default, deserialize_with = "blank_as_none")]
  pub year:     Option<i32>,
  /// Substring matched against the table's search columns.
  pub search:   Option<String>,
  /// Parent id matched against the table's scope column.
  #[serde(skip)]
  pub scope:    Option<i64>,
}

/// Query strings arrive as text, and the admin UI sends `year=` when no year
/// is selected.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: FromStr,
  T::Err: Display,
{
  match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
    None | Some("") => Ok(None),
    Some(s) => s.parse().map(Some).map_err(de::Error::custom),
  }
}

impl ListQuery {
  pub fn page(&self) -> u32 { self.page.unwrap_or(1).max(1) }

  pub fn per_page(&self) -> u32 {
    self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
  }

  pub fn offset(&self) -> u64 { u64::from(self.page() - 1) * u64::from(self.per_page()) }

  /// The search term, ignoring blank input.
  pub fn search_term(&self) -> Option<&str> {
    self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
  pub data:         Vec<T>,
  pub total:        u64,
  pub per_page:     u32,
  pub current_page: u32,
  pub last_page:    u32,
  pub from:         Option<u64>,
  pub to:           Option<u64>,
}

impl<T> Page<T> {
  /// Build the envelope for one page of `data` out of `total` matching rows.
  pub fn new(data: Vec<T>, total: u64, query: &ListQuery) -> Self {
    let per_page = query.per_page();
    let current_page = query.page();
    let last_page = total.div_ceil(u64::from(per_page)).max(1);
    let (from, to) = if data.is_empty() {
      (None, None)
    } else {
      let from = query.offset() + 1;
      (Some(from), Some(from + data.len() as u64 - 1))
    };

    Self {
      data,
      total,
      per_page,
      current_page,
      last_page: u32::try_from(last_page).unwrap_or(u32::MAX),
      from,
      to,
    }
  }

  pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
    Ok(Page {
      data:         self.data.into_iter().map(f).collect::<Result<_, _>>()?,
      total:        self.total,
      per_page:     self.per_page,
      current_page: self.current_page,
      last_page:    self.last_page,
      from:         self.from,
      to:           self.to,
    })
  }
}
