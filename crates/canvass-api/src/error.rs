//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Maps the core error taxonomy onto HTTP status codes. Store failures are
//! logged and surfaced as a generic 500 — by the time they reach here any
//! half-completed transaction has been rolled back, and the body must not
//! describe internal state.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use canvass_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
      ApiError::Core(e) => match e {
        CoreError::Validation { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
        CoreError::Permission(_) => (StatusCode::FORBIDDEN, e.to_string()),
        CoreError::ContactNotFound(_)
        | CoreError::UserNotFound(_)
        | CoreError::PhoneNotFound(_)
        | CoreError::EmailNotFound(_)
        | CoreError::AliasNotFound(_)
        | CoreError::EntryNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, e.to_string()),
        CoreError::Store(inner) => {
          tracing::error!(error = %inner, "store failure");
          (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string())
        }
      },
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
