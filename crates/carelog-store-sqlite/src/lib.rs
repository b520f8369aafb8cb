//! SQLite backend for the carelog record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Tables are driven entirely by the
//! [`Table`](carelog_core::Table) metadata in `carelog_core::models`.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
