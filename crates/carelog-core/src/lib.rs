//! Core types and trait definitions for the carelog case-management backend.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::RecordStore`]; the API layer drives
//! them through the typed [`store::Repository`].

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod models;
pub mod page;
pub mod record;
pub mod store;
pub mod table;
pub mod validate;

pub use error::{Error, Result};
pub use page::{ListQuery, Page};
pub use record::{Resource, Row, Stored};
pub use store::{RecordStore, Repository};
pub use table::{Child, Column, ColumnKind, Table};
pub use validate::{Validate, ValidationErrors, Validator};
