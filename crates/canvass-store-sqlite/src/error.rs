//! Error type for `canvass-store-sqlite`.
//!
//! These are mostly the backend's internal failures (database, encoding),
//! which cross the [`canvass_core::store::RosterStore`] boundary wrapped in
//! [`canvass_core::Error::Store`]. Domain failures raised inside transaction
//! bodies travel in [`Error::Domain`] and pass through unwrapped.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A domain failure (not-found, conflict, ...) detected inside a
  /// transaction body; surfaces as-is at the trait boundary.
  #[error(transparent)]
  Domain(canvass_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("database error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("decode error: {0}")]
  Decode(String),
}

impl From<Error> for canvass_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Domain(domain) => domain,
      other => canvass_core::Error::store(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
