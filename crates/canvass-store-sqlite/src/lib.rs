//! SQLite backend for the Canvass contact directory.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every mutation primitive runs inside a
//! rusqlite transaction that covers the entity write, the `updated_at` bump,
//! and the audit insert.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteRoster;

#[cfg(test)]
mod tests;
