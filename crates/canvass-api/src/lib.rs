//! JSON REST API for the Canvass contact directory.
//!
//! Exposes an axum [`Router`] backed by any [`RosterStore`]. Session
//! establishment, TLS, and transport concerns are the caller's
//! responsibility; requests carry the acting user's UUID in the `X-User-Id`
//! header (see [`identity`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! let state = AppState::new(Arc::new(store));
//! let app = canvass_api::api_router(state);
//! ```

pub mod audit;
pub mod contacts;
pub mod error;
pub mod identity;
pub mod search;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use canvass_core::{
  audit::AuditRecorder, gateway::MutationGateway, matcher::NicknameTable,
  store::RosterStore,
};

pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:     Arc<S>,
  pub gateway:   MutationGateway<S>,
  pub recorder:  AuditRecorder<S>,
  pub nicknames: Arc<NicknameTable>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     self.store.clone(),
      gateway:   self.gateway.clone(),
      recorder:  self.recorder.clone(),
      nicknames: self.nicknames.clone(),
    }
  }
}

impl<S: RosterStore> AppState<S> {
  /// Build state over `store` with the default nickname table.
  pub fn new(store: Arc<S>) -> Self {
    Self {
      gateway:   MutationGateway::new(store.clone()),
      recorder:  AuditRecorder::new(store.clone()),
      nicknames: Arc::new(NicknameTable::with_defaults()),
      store,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: RosterStore + 'static,
{
  Router::new()
    // Search
    .route("/contacts/search", get(search::handler::<S>))
    // Contacts
    .route(
      "/contacts/{id}",
      get(contacts::get_one::<S>).patch(contacts::update::<S>),
    )
    // Phones
    .route("/contacts/{id}/phones", post(contacts::add_phone::<S>))
    .route(
      "/contacts/{id}/phones/{pid}",
      axum::routing::patch(contacts::update_phone::<S>)
        .delete(contacts::delete_phone::<S>),
    )
    // Emails
    .route("/contacts/{id}/emails", post(contacts::add_email::<S>))
    .route(
      "/contacts/{id}/emails/{eid}",
      axum::routing::patch(contacts::update_email::<S>)
        .delete(contacts::delete_email::<S>),
    )
    // Aliases
    .route("/contacts/{id}/aliases", post(contacts::add_alias::<S>))
    .route(
      "/contacts/{id}/aliases/{aid}",
      axum::routing::delete(contacts::delete_alias::<S>),
    )
    // Audit
    .route("/contacts/{id}/audit", get(audit::list::<S>))
    .route("/audit/{id}/undo", post(audit::undo::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
