//! Handlers for `/contacts` endpoints.
//!
//! | Method   | Path                          | Notes |
//! |----------|-------------------------------|-------|
//! | `GET`    | `/contacts/:id`               | Full profile; 404 if unknown |
//! | `PATCH`  | `/contacts/:id`               | Partial object of editable fields |
//! | `POST`   | `/contacts/:id/phones`        | `{phoneNumber, phoneType, isPrimary?}` |
//! | `PATCH`  | `/contacts/:id/phones/:pid`   | Any of number/type/isPrimary |
//! | `DELETE` | `/contacts/:id/phones/:pid`   | Returns the removed phone |
//! | `POST`   | `/contacts/:id/emails`        | `{email, emailType, isPrimary?}` |
//! | `PATCH`  | `/contacts/:id/emails/:eid`   | |
//! | `DELETE` | `/contacts/:id/emails/:eid`   | |
//! | `POST`   | `/contacts/:id/aliases`       | `{alias}` |
//! | `DELETE` | `/contacts/:id/aliases/:aid`  | |
//!
//! All mutations require an `X-User-Id` header; writes are always recorded
//! with manual provenance. On a PATCH, an empty string clears an optional
//! text field.

use axum::{
  Json,
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use canvass_core::{
  Error as CoreError,
  contact::{
    Contact, ContactAlias, ContactEmail, ContactField, ContactPhone,
    ContactProfile, EmailChanges, EmailKind, NewEmail, NewPhone, PhoneChanges,
    PhoneKind, Provenance,
  },
  store::RosterStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError, identity::require_user};

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /contacts/:id`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<ContactProfile>, ApiError>
where
  S: RosterStore,
{
  let profile = state
    .store
    .get_profile(id)
    .await?
    .ok_or(CoreError::ContactNotFound(id))?;
  Ok(Json(profile))
}

// ─── Field update ─────────────────────────────────────────────────────────────

/// Partial object of editable fields. Absent fields are untouched; each
/// present field is one gateway mutation (and one audit entry).
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactBody {
  pub precinct:         Option<String>,
  pub district:         Option<String>,
  pub party:            Option<String>,
  pub supporter_status: Option<String>,
  pub volunteer_status: Option<String>,
  pub notes:            Option<String>,
}

/// `PATCH /contacts/:id`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<UpdateContactBody>,
) -> Result<Json<Contact>, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;

  let fields = [
    (ContactField::Precinct, body.precinct),
    (ContactField::District, body.district),
    (ContactField::Party, body.party),
    (ContactField::SupporterStatus, body.supporter_status),
    (ContactField::VolunteerStatus, body.volunteer_status),
    (ContactField::Notes, body.notes),
  ];

  let mut updated = None;
  for (field, value) in fields {
    if let Some(value) = value {
      updated = Some(
        state
          .gateway
          .set_field(id, field, Some(value), user.user_id)
          .await?,
      );
    }
  }

  match updated {
    Some(contact) => Ok(Json(contact)),
    None => {
      let contact = state
        .store
        .get_contact(id)
        .await?
        .ok_or(CoreError::ContactNotFound(id))?;
      Ok(Json(contact))
    }
  }
}

// ─── Phones ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPhoneBody {
  pub phone_number: String,
  pub phone_type:   String,
  #[serde(default)]
  pub is_primary:   bool,
}

fn phone_kind(raw: &str) -> Result<PhoneKind, ApiError> {
  PhoneKind::parse(raw.trim()).ok_or_else(|| {
    CoreError::validation("phoneType", format!("unknown phone type {raw:?}"))
      .into()
  })
}

/// `POST /contacts/:id/phones` — returns 201 + the stored phone.
pub async fn add_phone<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<NewPhoneBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let input = NewPhone {
    number:     body.phone_number,
    kind:       phone_kind(&body.phone_type)?,
    is_primary: body.is_primary,
    provenance: Provenance::Manual,
  };

  let phone = state.gateway.add_phone(id, input, user.user_id).await?;
  Ok((StatusCode::CREATED, Json(phone)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhoneBody {
  pub phone_number: Option<String>,
  pub phone_type:   Option<String>,
  pub is_primary:   Option<bool>,
}

/// `PATCH /contacts/:id/phones/:pid`
pub async fn update_phone<S>(
  State(state): State<AppState<S>>,
  Path((id, phone_id)): Path<(Uuid, Uuid)>,
  headers: HeaderMap,
  Json(body): Json<UpdatePhoneBody>,
) -> Result<Json<ContactPhone>, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let changes = PhoneChanges {
    number:     body.phone_number,
    kind:       body.phone_type.as_deref().map(phone_kind).transpose()?,
    is_primary: body.is_primary,
  };

  let phone = state
    .gateway
    .update_phone(id, phone_id, changes, user.user_id)
    .await?;
  Ok(Json(phone))
}

/// `DELETE /contacts/:id/phones/:pid` — returns the removed phone.
pub async fn delete_phone<S>(
  State(state): State<AppState<S>>,
  Path((id, phone_id)): Path<(Uuid, Uuid)>,
  headers: HeaderMap,
) -> Result<Json<ContactPhone>, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let phone = state
    .gateway
    .delete_phone(id, phone_id, user.user_id)
    .await?;
  Ok(Json(phone))
}

// ─── Emails ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEmailBody {
  pub email:      String,
  pub email_type: String,
  #[serde(default)]
  pub is_primary: bool,
}

fn email_kind(raw: &str) -> Result<EmailKind, ApiError> {
  EmailKind::parse(raw.trim()).ok_or_else(|| {
    CoreError::validation("emailType", format!("unknown email type {raw:?}"))
      .into()
  })
}

/// `POST /contacts/:id/emails` — returns 201 + the stored email.
pub async fn add_email<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<NewEmailBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let input = NewEmail {
    address:    body.email,
    kind:       email_kind(&body.email_type)?,
    is_primary: body.is_primary,
    provenance: Provenance::Manual,
  };

  let email = state.gateway.add_email(id, input, user.user_id).await?;
  Ok((StatusCode::CREATED, Json(email)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmailBody {
  pub email:      Option<String>,
  pub email_type: Option<String>,
  pub is_primary: Option<bool>,
}

/// `PATCH /contacts/:id/emails/:eid`
pub async fn update_email<S>(
  State(state): State<AppState<S>>,
  Path((id, email_id)): Path<(Uuid, Uuid)>,
  headers: HeaderMap,
  Json(body): Json<UpdateEmailBody>,
) -> Result<Json<ContactEmail>, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let changes = EmailChanges {
    address:    body.email,
    kind:       body.email_type.as_deref().map(email_kind).transpose()?,
    is_primary: body.is_primary,
  };

  let email = state
    .gateway
    .update_email(id, email_id, changes, user.user_id)
    .await?;
  Ok(Json(email))
}

/// `DELETE /contacts/:id/emails/:eid` — returns the removed email.
pub async fn delete_email<S>(
  State(state): State<AppState<S>>,
  Path((id, email_id)): Path<(Uuid, Uuid)>,
  headers: HeaderMap,
) -> Result<Json<ContactEmail>, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let email = state
    .gateway
    .delete_email(id, email_id, user.user_id)
    .await?;
  Ok(Json(email))
}

// ─── Aliases ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AliasBody {
  pub alias: String,
}

/// `POST /contacts/:id/aliases` — returns 201 + the stored alias.
pub async fn add_alias<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
  Json(body): Json<AliasBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let alias = state
    .gateway
    .add_alias(id, body.alias, user.user_id)
    .await?;
  Ok((StatusCode::CREATED, Json(alias)))
}

/// `DELETE /contacts/:id/aliases/:aid` — returns the removed alias.
pub async fn delete_alias<S>(
  State(state): State<AppState<S>>,
  Path((id, alias_id)): Path<(Uuid, Uuid)>,
  headers: HeaderMap,
) -> Result<Json<ContactAlias>, ApiError>
where
  S: RosterStore,
{
  let user = require_user(state.store.as_ref(), &headers).await?;
  let alias = state
    .gateway
    .delete_alias(id, alias_id, user.user_id)
    .await?;
  Ok(Json(alias))
}
