//! The audit trail — every accepted mutation, attributable and reversible.
//!
//! Entries are append-only: written by the store inside the same transaction
//! as the write they describe, never updated, never deleted. Reversal is a
//! compensating mutation issued through the gateway, which appends its own
//! entry; history keeps both.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  contact::{
    ContactAlias, ContactEmail, ContactField, ContactPhone, EmailChanges,
    NewEmail, NewPhone, PhoneChanges,
  },
  gateway::MutationGateway,
  store::RosterStore,
  user::Role,
};

// ─── Field tokens ────────────────────────────────────────────────────────────

/// Audit field names for child-row mutations. Scalar mutations use
/// [`ContactField::as_str`].
pub const FIELD_PHONE: &str = "phone";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_ALIAS: &str = "alias";

// ─── Entry types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
  Create,
  Update,
  Delete,
}

impl AuditAction {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Create => "create",
      Self::Update => "update",
      Self::Delete => "delete",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "create" => Some(Self::Create),
      "update" => Some(Self::Update),
      "delete" => Some(Self::Delete),
      _ => None,
    }
  }
}

/// One immutable audit record. Scalar field values are stored as plain
/// strings; child rows (phone/email/alias) as their JSON serialization, ids
/// included, so a reversal can address the exact row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
  #[serde(rename = "id")]
  pub entry_id:   Uuid,
  pub contact_id: Uuid,
  pub user_id:    Uuid,
  pub field:      String,
  pub action:     AuditAction,
  pub old_value:  Option<String>,
  pub new_value:  Option<String>,
  pub created_at: DateTime<Utc>,
}

/// The acting user's display name, joined in for the activity timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditUser {
  pub first_name: String,
  pub last_name:  String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntryWithUser {
  #[serde(flatten)]
  pub entry: AuditLogEntry,
  pub user:  AuditUser,
}

// ─── Recorder ────────────────────────────────────────────────────────────────

/// Read side of the audit trail, plus the admin-only undo operation.
///
/// Recording itself happens inside the store's mutation transactions; there
/// is no separate fallible "record" call to forget.
pub struct AuditRecorder<S> {
  store:   Arc<S>,
  gateway: MutationGateway<S>,
}

impl<S> Clone for AuditRecorder<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), gateway: self.gateway.clone() }
  }
}

impl<S: RosterStore> AuditRecorder<S> {
  pub fn new(store: Arc<S>) -> Self {
    let gateway = MutationGateway::new(store.clone());
    Self { store, gateway }
  }

  /// The contact's activity timeline, newest first.
  pub async fn list_for_contact(
    &self,
    contact_id: Uuid,
  ) -> Result<Vec<AuditEntryWithUser>> {
    self.store.list_audit(contact_id).await
  }

  /// Reverse the change recorded by `entry_id`.
  ///
  /// Admin only. Fails with [`Error::EntryNotFound`] if the entry is gone
  /// and [`Error::Conflict`] if a later entry exists for the same
  /// (contact, field) — reversing onto a stale state is rejected rather
  /// than silently overwritten. The reversal goes through the gateway, so
  /// it appends a compensating entry; the original is untouched.
  pub async fn undo(
    &self,
    entry_id: Uuid,
    acting_user: Uuid,
  ) -> Result<AuditLogEntry> {
    let user = self
      .store
      .get_user(acting_user)
      .await?
      .ok_or(Error::UserNotFound(acting_user))?;
    if user.role != Role::Admin {
      return Err(Error::Permission("undo requires the admin role".into()));
    }

    let entry = self
      .store
      .audit_entry(entry_id)
      .await?
      .ok_or(Error::EntryNotFound(entry_id))?;

    // Stale-undo check: only the newest change to a field may be reversed.
    let latest = self
      .store
      .latest_audit_for_field(entry.contact_id, &entry.field)
      .await?;
    if latest.map(|l| l.entry_id) != Some(entry.entry_id) {
      return Err(Error::Conflict(format!(
        "field {} has a later change; refresh and retry",
        entry.field
      )));
    }

    self.apply_reversal(&entry, acting_user).await?;

    // The compensating entry the gateway just appended.
    self
      .store
      .latest_audit_for_field(entry.contact_id, &entry.field)
      .await?
      .ok_or(Error::EntryNotFound(entry_id))
  }

  async fn apply_reversal(
    &self,
    entry: &AuditLogEntry,
    acting_user: Uuid,
  ) -> Result<()> {
    match entry.field.as_str() {
      FIELD_PHONE => self.reverse_phone(entry, acting_user).await,
      FIELD_EMAIL => self.reverse_email(entry, acting_user).await,
      FIELD_ALIAS => self.reverse_alias(entry, acting_user).await,
      field => {
        let field = ContactField::parse(field).ok_or_else(|| {
          Error::Conflict(format!("entry {} cannot be reversed", entry.entry_id))
        })?;
        self
          .gateway
          .set_field(entry.contact_id, field, entry.old_value.clone(), acting_user)
          .await?;
        Ok(())
      }
    }
  }

  async fn reverse_phone(
    &self,
    entry: &AuditLogEntry,
    acting_user: Uuid,
  ) -> Result<()> {
    match entry.action {
      AuditAction::Create => {
        let phone: ContactPhone = decode_value(entry.new_value.as_deref())?;
        self
          .gateway
          .delete_phone(entry.contact_id, phone.phone_id, acting_user)
          .await?;
      }
      AuditAction::Update => {
        let old: ContactPhone = decode_value(entry.old_value.as_deref())?;
        let changes = PhoneChanges {
          number:     Some(old.number),
          kind:       Some(old.kind),
          is_primary: Some(old.is_primary),
        };
        self
          .gateway
          .update_phone(entry.contact_id, old.phone_id, changes, acting_user)
          .await?;
      }
      AuditAction::Delete => {
        let old: ContactPhone = decode_value(entry.old_value.as_deref())?;
        let input = NewPhone {
          number:     old.number,
          kind:       old.kind,
          is_primary: old.is_primary,
          provenance: old.provenance,
        };
        self.gateway.add_phone(entry.contact_id, input, acting_user).await?;
      }
    }
    Ok(())
  }

  async fn reverse_email(
    &self,
    entry: &AuditLogEntry,
    acting_user: Uuid,
  ) -> Result<()> {
    match entry.action {
      AuditAction::Create => {
        let email: ContactEmail = decode_value(entry.new_value.as_deref())?;
        self
          .gateway
          .delete_email(entry.contact_id, email.email_id, acting_user)
          .await?;
      }
      AuditAction::Update => {
        let old: ContactEmail = decode_value(entry.old_value.as_deref())?;
        let changes = EmailChanges {
          address:    Some(old.address),
          kind:       Some(old.kind),
          is_primary: Some(old.is_primary),
        };
        self
          .gateway
          .update_email(entry.contact_id, old.email_id, changes, acting_user)
          .await?;
      }
      AuditAction::Delete => {
        let old: ContactEmail = decode_value(entry.old_value.as_deref())?;
        let input = NewEmail {
          address:    old.address,
          kind:       old.kind,
          is_primary: old.is_primary,
          provenance: old.provenance,
        };
        self.gateway.add_email(entry.contact_id, input, acting_user).await?;
      }
    }
    Ok(())
  }

  async fn reverse_alias(
    &self,
    entry: &AuditLogEntry,
    acting_user: Uuid,
  ) -> Result<()> {
    match entry.action {
      AuditAction::Create => {
        let alias: ContactAlias = decode_value(entry.new_value.as_deref())?;
        self
          .gateway
          .delete_alias(entry.contact_id, alias.alias_id, acting_user)
          .await?;
      }
      AuditAction::Delete => {
        let old: ContactAlias = decode_value(entry.old_value.as_deref())?;
        self
          .gateway
          .add_alias(entry.contact_id, old.alias, acting_user)
          .await?;
      }
      AuditAction::Update => {
        return Err(Error::Conflict(format!(
          "entry {} cannot be reversed",
          entry.entry_id
        )));
      }
    }
    Ok(())
  }
}

fn decode_value<T: serde::de::DeserializeOwned>(
  value: Option<&str>,
) -> Result<T> {
  let raw = value.ok_or_else(|| {
    Error::Conflict("audit entry has no value to reverse".into())
  })?;
  serde_json::from_str(raw).map_err(Error::store)
}
