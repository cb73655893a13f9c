//! Handler for `GET /contacts/search`.
//!
//! Query params map directly to [`SearchRequest`] fields (camelCase);
//! `supporterStatus` and `quickFilters` are accepted as comma-separated
//! strings. The `limit` param is accepted but the page size is fixed.

use axum::{
  Json,
  extract::{Query, State},
};
use canvass_core::{
  filter::{ContactFilter, SearchRequest},
  store::{RosterStore, SearchPage},
};

use crate::{AppState, error::ApiError};

/// `GET /contacts/search[?page=...][&firstName=...][&lastName=...][&city=...]
/// [&zipCode=...][&party=...][&supporterStatus=...][&quickFilters=...]
/// [&minAge=...][&maxAge=...]`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(req): Query<SearchRequest>,
) -> Result<Json<SearchPage>, ApiError>
where
  S: RosterStore,
{
  let page = req.page.unwrap_or(1).max(1);
  let filter = ContactFilter::compile(&req, &state.nicknames);

  let results = state.store.search(&filter, page).await?;
  Ok(Json(results))
}
