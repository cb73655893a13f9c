//! Handlers for the audit-trail endpoints.
//!
//! | Method | Path                   | Notes |
//! |--------|------------------------|-------|
//! | `GET`  | `/contacts/:id/audit`  | Newest first, with the acting user's name |
//! | `POST` | `/audit/:id/undo`      | Admin only; returns the compensating entry |

use axum::{
  Json,
  extract::{Path, State},
  http::HeaderMap,
};
use canvass_core::{
  audit::{AuditEntryWithUser, AuditLogEntry},
  store::RosterStore,
};
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::require_user};

/// `GET /contacts/:id/audit`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<AuditEntryWithUser>>, ApiError>
where
  S: RosterStore,
{
  let entries = state.recorder.list_for_contact(id).await?;
  Ok(Json(entries))
}

/// `POST /audit/:id/undo`
pub async fn undo<S>(
  State(state): State<AppState<S>>,
  Path(entry_id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Json<AuditLogEntry>, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let entry = state.recorder.undo(entry_id, user.user_id).await?;
  Ok(Json(entry))
}
