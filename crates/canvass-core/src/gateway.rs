//! The mutation gateway — the only path by which contact fields, phones,
//! emails, and aliases change.
//!
//! Each call checks the acting user's role, rejects locked fields, validates
//! the input, and then issues exactly one transactional store primitive, so
//! the field/child write and its audit entry commit as one unit. On any
//! failure nothing is visible: no partial audit entries, no orphaned child
//! rows.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{
    Contact, ContactAlias, ContactEmail, ContactField, ContactPhone,
    EmailChanges, NewEmail, NewPhone, PhoneChanges, SupporterStatus,
    VolunteerStatus,
  },
  store::RosterStore,
  user::User,
};

/// Maximum stored length of the free-text notes field.
pub const NOTES_MAX_LEN: usize = 2_000;

pub struct MutationGateway<S> {
  store: Arc<S>,
}

impl<S> Clone for MutationGateway<S> {
  fn clone(&self) -> Self { Self { store: self.store.clone() } }
}

impl<S: RosterStore> MutationGateway<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Resolve the acting user and require a writing role.
  async fn require_editor(&self, acting_user: Uuid) -> Result<User> {
    let user = self
      .store
      .get_user(acting_user)
      .await?
      .ok_or(Error::UserNotFound(acting_user))?;
    if !user.role.can_edit() {
      return Err(Error::Permission(format!(
        "role {} cannot modify contacts",
        user.role.as_str()
      )));
    }
    Ok(user)
  }

  // ── Scalar fields ─────────────────────────────────────────────────────

  /// Set one editable scalar field. Locked fields are rejected for every
  /// role, including admin.
  pub async fn set_field(
    &self,
    contact_id: Uuid,
    field: ContactField,
    value: Option<String>,
    acting_user: Uuid,
  ) -> Result<Contact> {
    self.require_editor(acting_user).await?;

    if field.is_locked() {
      return Err(Error::Permission(format!(
        "field {} is locked",
        field.as_str()
      )));
    }

    let value = validate_field_value(field, value)?;
    self.store.write_field(contact_id, acting_user, field, value).await
  }

  // ── Phones ────────────────────────────────────────────────────────────

  pub async fn add_phone(
    &self,
    contact_id: Uuid,
    input: NewPhone,
    acting_user: Uuid,
  ) -> Result<ContactPhone> {
    self.require_editor(acting_user).await?;

    let number = required("phoneNumber", &input.number)?;
    let input = NewPhone { number, ..input };
    self.store.insert_phone(contact_id, acting_user, input).await
  }

  pub async fn update_phone(
    &self,
    contact_id: Uuid,
    phone_id: Uuid,
    changes: PhoneChanges,
    acting_user: Uuid,
  ) -> Result<ContactPhone> {
    self.require_editor(acting_user).await?;

    let changes = PhoneChanges {
      number:     match changes.number {
        Some(n) => Some(required("phoneNumber", &n)?),
        None => None,
      },
      kind:       changes.kind,
      is_primary: changes.is_primary,
    };
    self
      .store
      .modify_phone(contact_id, phone_id, acting_user, changes)
      .await
  }

  pub async fn delete_phone(
    &self,
    contact_id: Uuid,
    phone_id: Uuid,
    acting_user: Uuid,
  ) -> Result<ContactPhone> {
    self.require_editor(acting_user).await?;
    self.store.remove_phone(contact_id, phone_id, acting_user).await
  }

  // ── Emails ────────────────────────────────────────────────────────────

  pub async fn add_email(
    &self,
    contact_id: Uuid,
    input: NewEmail,
    acting_user: Uuid,
  ) -> Result<ContactEmail> {
    self.require_editor(acting_user).await?;

    let address = email_address(&input.address)?;
    let input = NewEmail { address, ..input };
    self.store.insert_email(contact_id, acting_user, input).await
  }

  pub async fn update_email(
    &self,
    contact_id: Uuid,
    email_id: Uuid,
    changes: EmailChanges,
    acting_user: Uuid,
  ) -> Result<ContactEmail> {
    self.require_editor(acting_user).await?;

    let changes = EmailChanges {
      address:    match changes.address {
        Some(a) => Some(email_address(&a)?),
        None => None,
      },
      kind:       changes.kind,
      is_primary: changes.is_primary,
    };
    self
      .store
      .modify_email(contact_id, email_id, acting_user, changes)
      .await
  }

  pub async fn delete_email(
    &self,
    contact_id: Uuid,
    email_id: Uuid,
    acting_user: Uuid,
  ) -> Result<ContactEmail> {
    self.require_editor(acting_user).await?;
    self.store.remove_email(contact_id, email_id, acting_user).await
  }

  // ── Aliases ───────────────────────────────────────────────────────────

  pub async fn add_alias(
    &self,
    contact_id: Uuid,
    alias: String,
    acting_user: Uuid,
  ) -> Result<ContactAlias> {
    self.require_editor(acting_user).await?;

    let alias = required("alias", &alias)?;
    self.store.insert_alias(contact_id, acting_user, alias).await
  }

  pub async fn delete_alias(
    &self,
    contact_id: Uuid,
    alias_id: Uuid,
    acting_user: Uuid,
  ) -> Result<ContactAlias> {
    self.require_editor(acting_user).await?;
    self.store.remove_alias(contact_id, alias_id, acting_user).await
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn required(field: &'static str, value: &str) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::validation(field, "must not be empty"));
  }
  Ok(trimmed.to_owned())
}

fn email_address(value: &str) -> Result<String> {
  let trimmed = required("email", value)?;
  if !trimmed.contains('@') {
    return Err(Error::validation("email", "must contain '@'"));
  }
  Ok(trimmed)
}

/// Normalize and validate one scalar field value before it reaches the
/// store. Status fields must parse; optional text fields treat empty input
/// as a clear.
fn validate_field_value(
  field: ContactField,
  value: Option<String>,
) -> Result<Option<String>> {
  let trimmed = value.as_deref().map(str::trim).filter(|v| !v.is_empty());

  match field {
    ContactField::SupporterStatus => {
      let raw = trimmed
        .ok_or_else(|| Error::validation("supporterStatus", "is required"))?;
      let status = SupporterStatus::parse(raw).ok_or_else(|| {
        Error::validation("supporterStatus", format!("unknown status {raw:?}"))
      })?;
      Ok(Some(status.as_str().to_owned()))
    }
    ContactField::VolunteerStatus => {
      let raw = trimmed
        .ok_or_else(|| Error::validation("volunteerStatus", "is required"))?;
      let status = VolunteerStatus::parse(raw).ok_or_else(|| {
        Error::validation("volunteerStatus", format!("unknown status {raw:?}"))
      })?;
      Ok(Some(status.as_str().to_owned()))
    }
    ContactField::Party => Ok(trimmed.map(str::to_uppercase)),
    ContactField::Notes => {
      if let Some(notes) = trimmed {
        if notes.chars().count() > NOTES_MAX_LEN {
          return Err(Error::validation(
            "notes",
            format!("exceeds {NOTES_MAX_LEN} characters"),
          ));
        }
      }
      Ok(trimmed.map(str::to_owned))
    }
    ContactField::Precinct | ContactField::District => {
      Ok(trimmed.map(str::to_owned))
    }
    // Locked fields never get here; set_field rejects them first.
    _ => Err(Error::Permission(format!(
      "field {} is locked",
      field.as_str()
    ))),
  }
}
