//! SQLite backend for WhatsOrder form documents.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every storage tier lives in one
//! `documents` table; the `id → owner` and `slug → form` indexes are kept in
//! step with user-scoped writes inside the same transaction.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
