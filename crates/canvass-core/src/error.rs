//! Error taxonomy for `canvass-core`.
//!
//! Every fallible operation in the directory core surfaces one of these
//! variants. Backends wrap their internal failures in [`Error::Store`]; the
//! HTTP layer maps each variant onto a status code.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or out-of-range input; names the offending field.
  #[error("invalid {field}: {message}")]
  Validation {
    field:   &'static str,
    message: String,
  },

  /// The acting user's role is insufficient, or the target field is locked.
  #[error("permission denied: {0}")]
  Permission(String),

  #[error("contact not found: {0}")]
  ContactNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),

  #[error("phone not found: {0}")]
  PhoneNotFound(Uuid),

  #[error("email not found: {0}")]
  EmailNotFound(Uuid),

  #[error("alias not found: {0}")]
  AliasNotFound(Uuid),

  #[error("audit entry not found: {0}")]
  EntryNotFound(Uuid),

  /// A stale undo or a primary-flag violation; the caller should refresh.
  #[error("conflict: {0}")]
  Conflict(String),

  /// Underlying persistence failure. Any half-completed transaction has
  /// already been rolled back by the time this surfaces.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
    Self::Validation { field, message: message.into() }
  }

  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
