//! The `RosterStore` trait and the search result types.
//!
//! The trait is implemented by storage backends (e.g.
//! `canvass-store-sqlite`). Higher layers (the gateway, the audit recorder,
//! `canvass-api`) depend on this abstraction, not on any concrete backend.
//!
//! The mutation primitives are transactional: the entity write, the
//! `updated_at` bump, and the audit insert commit together or not at all.
//! They perform no permission or validation checks — that is the
//! [`MutationGateway`](crate::gateway::MutationGateway)'s job, and nothing
//! outside the gateway (and the audit recorder's undo, which goes through
//! the gateway) should call them.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  audit::{AuditEntryWithUser, AuditLogEntry},
  contact::{
    Contact, ContactAlias, ContactEmail, ContactField, ContactPhone,
    ContactProfile, EmailChanges, NewContact, NewEmail, NewPhone, PhoneChanges,
  },
  filter::ContactFilter,
  matcher::MatchTier,
  user::{NewUser, User},
};

// ─── Search results ──────────────────────────────────────────────────────────

/// Fixed result-page size.
pub const PAGE_SIZE: usize = 20;

/// One search result row: the contact plus its ordering tier and the
/// provenance-partitioned contact-method counts. The counts are the core's
/// whole output contract for the three-tier signal — presentation maps them
/// to colors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedContact {
  pub contact:              Contact,
  /// Present only when the filter carried name fragments.
  pub match_tier:           Option<MatchTier>,
  pub manual_phone_count:   u32,
  pub baseline_phone_count: u32,
  pub manual_email_count:   u32,
  pub baseline_email_count: u32,
}

/// One page of search results. `total` counts all matching rows, not just
/// the returned page, and comes from the same predicate evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
  pub contacts: Vec<EnrichedContact>,
  pub total:    u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Canvass contact-store backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`). Backend-internal
/// failures surface as [`crate::Error::Store`]; domain failures use their
/// specific variants.
pub trait RosterStore: Send + Sync {
  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a user. `user_id` is assigned by the store.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User>> + Send + '_;

  /// Retrieve a user by UUID. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>>> + Send + '_;

  // ── Contacts ──────────────────────────────────────────────────────────

  /// Create a contact with its baseline child rows — the import/seed path.
  /// Assigns `contact_id` and the next `display_id`. Not audited per-field.
  fn create_contact(
    &self,
    input: NewContact,
  ) -> impl Future<Output = Result<Contact>> + Send + '_;

  /// Retrieve a contact row by UUID. Returns `None` if not found.
  fn get_contact(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Contact>>> + Send + '_;

  /// The full read model: contact plus phones, emails, and aliases.
  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ContactProfile>>> + Send + '_;

  // ── Search ────────────────────────────────────────────────────────────

  /// Evaluate `filter` and return page `page` (1-based, [`PAGE_SIZE`] rows).
  ///
  /// The whole evaluation — candidate narrowing, name/age matching,
  /// ordering, the page window, and enrichment counts — happens against a
  /// single point-in-time view, so `total` and the page rows always agree.
  /// Pages past the end return empty rows with the correct `total`.
  fn search<'a>(
    &'a self,
    filter: &'a ContactFilter,
    page: u32,
  ) -> impl Future<Output = Result<SearchPage>> + Send + 'a;

  // ── Transactional mutation primitives ─────────────────────────────────

  /// Write one scalar field and its audit entry in one transaction.
  /// The audit entry's old value is captured inside the transaction.
  fn write_field(
    &self,
    contact_id: Uuid,
    acting_user: Uuid,
    field: ContactField,
    new_value: Option<String>,
  ) -> impl Future<Output = Result<Contact>> + Send + '_;

  /// Insert a phone (demoting any existing primary of the contact if the
  /// new one is primary) and its audit entry in one transaction.
  fn insert_phone(
    &self,
    contact_id: Uuid,
    acting_user: Uuid,
    input: NewPhone,
  ) -> impl Future<Output = Result<ContactPhone>> + Send + '_;

  fn modify_phone(
    &self,
    contact_id: Uuid,
    phone_id: Uuid,
    acting_user: Uuid,
    changes: PhoneChanges,
  ) -> impl Future<Output = Result<ContactPhone>> + Send + '_;

  fn remove_phone(
    &self,
    contact_id: Uuid,
    phone_id: Uuid,
    acting_user: Uuid,
  ) -> impl Future<Output = Result<ContactPhone>> + Send + '_;

  fn insert_email(
    &self,
    contact_id: Uuid,
    acting_user: Uuid,
    input: NewEmail,
  ) -> impl Future<Output = Result<ContactEmail>> + Send + '_;

  fn modify_email(
    &self,
    contact_id: Uuid,
    email_id: Uuid,
    acting_user: Uuid,
    changes: EmailChanges,
  ) -> impl Future<Output = Result<ContactEmail>> + Send + '_;

  fn remove_email(
    &self,
    contact_id: Uuid,
    email_id: Uuid,
    acting_user: Uuid,
  ) -> impl Future<Output = Result<ContactEmail>> + Send + '_;

  fn insert_alias(
    &self,
    contact_id: Uuid,
    acting_user: Uuid,
    alias: String,
  ) -> impl Future<Output = Result<ContactAlias>> + Send + '_;

  fn remove_alias(
    &self,
    contact_id: Uuid,
    alias_id: Uuid,
    acting_user: Uuid,
  ) -> impl Future<Output = Result<ContactAlias>> + Send + '_;

  // ── Audit reads ───────────────────────────────────────────────────────

  /// Retrieve one audit entry. Returns `None` if not found.
  fn audit_entry(
    &self,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<Option<AuditLogEntry>>> + Send + '_;

  /// All audit entries for a contact, newest first, each joined with the
  /// acting user's name.
  fn list_audit(
    &self,
    contact_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AuditEntryWithUser>>> + Send + '_;

  /// The newest audit entry for one (contact, field), if any. Used by the
  /// audit recorder's stale-undo check.
  fn latest_audit_for_field<'a>(
    &'a self,
    contact_id: Uuid,
    field: &'a str,
  ) -> impl Future<Output = Result<Option<AuditLogEntry>>> + Send + 'a;
}
