//! Acting-user resolution.
//!
//! Session handling is an external collaborator: requests arrive with an
//! `X-User-Id` header carrying the already-authenticated user's UUID. Every
//! mutation handler resolves it to a [`User`] here; role enforcement happens
//! in the gateway.

use axum::http::HeaderMap;
use canvass_core::{store::RosterStore, user::User};
use uuid::Uuid;

use crate::error::ApiError;

pub const USER_HEADER: &str = "x-user-id";

/// Resolve the acting user from the request headers, or fail with 401.
pub async fn require_user<S: RosterStore>(
  store: &S,
  headers: &HeaderMap,
) -> Result<User, ApiError> {
  let raw = headers
    .get(USER_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or_else(|| ApiError::Unauthorized("missing x-user-id header".into()))?;

  let id = Uuid::parse_str(raw.trim())
    .map_err(|_| ApiError::Unauthorized("malformed x-user-id header".into()))?;

  store
    .get_user(id)
    .await?
    .ok_or_else(|| ApiError::Unauthorized(format!("unknown user {id}")))
}
