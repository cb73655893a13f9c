//! Contact records — the voter-roll rows the directory searches and edits.
//!
//! A [`Contact`] is owned by the store and mutated only through the
//! [`MutationGateway`](crate::gateway::MutationGateway). Its locked fields
//! come from authoritative import data and are display-only; child rows
//! (phones, emails, aliases) carry a provenance flag separating
//! volunteer-entered data from the bulk-imported baseline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Status enums ────────────────────────────────────────────────────────────

/// Where a contact stands on the campaign, as recorded by volunteers.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SupporterStatus {
  ConfirmedSupporter,
  LikelySupporter,
  Opposition,
  #[default]
  Unknown,
}

impl SupporterStatus {
  /// The discriminant string stored in the `supporter_status` column.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::ConfirmedSupporter => "confirmed-supporter",
      Self::LikelySupporter => "likely-supporter",
      Self::Opposition => "opposition",
      Self::Unknown => "unknown",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "confirmed-supporter" => Some(Self::ConfirmedSupporter),
      "likely-supporter" => Some(Self::LikelySupporter),
      "opposition" => Some(Self::Opposition),
      "unknown" => Some(Self::Unknown),
      _ => None,
    }
  }
}

/// Whether the contact volunteers for the campaign themselves.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VolunteerStatus {
  Active,
  Inactive,
  Prospect,
  #[default]
  None,
}

impl VolunteerStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Inactive => "inactive",
      Self::Prospect => "prospect",
      Self::None => "none",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "active" => Some(Self::Active),
      "inactive" => Some(Self::Inactive),
      "prospect" => Some(Self::Prospect),
      "none" => Some(Self::None),
      _ => None,
    }
  }
}

// ─── Provenance ──────────────────────────────────────────────────────────────

/// How a phone/email entered the store. Drives the three-tier contact signal
/// (volunteer-added > baseline-only > none) computed by search enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
  /// Entered directly by a volunteer through the UI.
  Manual,
  /// Populated from bulk import.
  Baseline,
}

impl Provenance {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Manual => "manual",
      Self::Baseline => "baseline",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "manual" => Some(Self::Manual),
      "baseline" => Some(Self::Baseline),
      _ => None,
    }
  }
}

// ─── Child-row kinds ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneKind {
  Mobile,
  Home,
  Work,
  Other,
}

impl PhoneKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Mobile => "mobile",
      Self::Home => "home",
      Self::Work => "work",
      Self::Other => "other",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "mobile" => Some(Self::Mobile),
      "home" => Some(Self::Home),
      "work" => Some(Self::Work),
      "other" => Some(Self::Other),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailKind {
  Personal,
  Work,
  Other,
}

impl EmailKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Personal => "personal",
      Self::Work => "work",
      Self::Other => "other",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "personal" => Some(Self::Personal),
      "work" => Some(Self::Work),
      "other" => Some(Self::Other),
      _ => None,
    }
  }
}

// ─── Contact ─────────────────────────────────────────────────────────────────

/// A person record on the voter roll.
///
/// The name, date-of-birth, and address fields are locked: they are sourced
/// from import data and never change through the gateway. `updated_at` is
/// bumped inside every accepting mutation transaction and doubles as the
/// freshness key for search ordering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub contact_id:       Uuid,
  /// System-assigned, unique, monotonically increasing. Never reused.
  pub display_id:       i64,
  pub first_name:       String,
  pub middle_name:      Option<String>,
  pub last_name:        String,
  pub full_name:        String,
  pub date_of_birth:    Option<NaiveDate>,
  pub street:           Option<String>,
  pub city:             Option<String>,
  pub state:            Option<String>,
  pub zip:              Option<String>,
  pub precinct:         Option<String>,
  pub district:         Option<String>,
  /// Party affiliation code, e.g. "D", "R", "I".
  pub party:            Option<String>,
  pub supporter_status: SupporterStatus,
  pub volunteer_status: VolunteerStatus,
  pub notes:            Option<String>,
  pub updated_at:       DateTime<Utc>,
}

/// A nickname or alternate-name string bound to one contact.
/// Additional match surface for the name matcher; nothing else reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactAlias {
  pub alias_id:   Uuid,
  pub contact_id: Uuid,
  pub alias:      String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPhone {
  pub phone_id:   Uuid,
  pub contact_id: Uuid,
  pub number:     String,
  pub kind:       PhoneKind,
  /// At most one primary phone per contact.
  pub is_primary: bool,
  pub provenance: Provenance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactEmail {
  pub email_id:   Uuid,
  pub contact_id: Uuid,
  pub address:    String,
  pub kind:       EmailKind,
  /// At most one primary email per contact.
  pub is_primary: bool,
  pub provenance: Provenance,
}

/// The full read model for one contact: the row plus all child rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactProfile {
  pub contact: Contact,
  pub phones:  Vec<ContactPhone>,
  pub emails:  Vec<ContactEmail>,
  pub aliases: Vec<ContactAlias>,
}

// ─── Fields ──────────────────────────────────────────────────────────────────

/// Every named contact attribute the audit log can refer to.
///
/// Locked fields are sourced from import data; the gateway rejects writes to
/// them for every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
  FirstName,
  MiddleName,
  LastName,
  FullName,
  DateOfBirth,
  Street,
  City,
  State,
  Zip,
  Precinct,
  District,
  Party,
  SupporterStatus,
  VolunteerStatus,
  Notes,
}

impl ContactField {
  /// The field name recorded in audit entries; matches the column name.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::FirstName => "first_name",
      Self::MiddleName => "middle_name",
      Self::LastName => "last_name",
      Self::FullName => "full_name",
      Self::DateOfBirth => "date_of_birth",
      Self::Street => "street",
      Self::City => "city",
      Self::State => "state",
      Self::Zip => "zip",
      Self::Precinct => "precinct",
      Self::District => "district",
      Self::Party => "party",
      Self::SupporterStatus => "supporter_status",
      Self::VolunteerStatus => "volunteer_status",
      Self::Notes => "notes",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "first_name" => Some(Self::FirstName),
      "middle_name" => Some(Self::MiddleName),
      "last_name" => Some(Self::LastName),
      "full_name" => Some(Self::FullName),
      "date_of_birth" => Some(Self::DateOfBirth),
      "street" => Some(Self::Street),
      "city" => Some(Self::City),
      "state" => Some(Self::State),
      "zip" => Some(Self::Zip),
      "precinct" => Some(Self::Precinct),
      "district" => Some(Self::District),
      "party" => Some(Self::Party),
      "supporter_status" => Some(Self::SupporterStatus),
      "volunteer_status" => Some(Self::VolunteerStatus),
      "notes" => Some(Self::Notes),
      _ => None,
    }
  }

  pub fn is_locked(&self) -> bool {
    matches!(
      self,
      Self::FirstName
        | Self::MiddleName
        | Self::LastName
        | Self::FullName
        | Self::DateOfBirth
        | Self::Street
        | Self::City
        | Self::State
        | Self::Zip
    )
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::RosterStore::insert_phone`].
#[derive(Debug, Clone)]
pub struct NewPhone {
  pub number:     String,
  pub kind:       PhoneKind,
  pub is_primary: bool,
  pub provenance: Provenance,
}

/// Input to [`crate::store::RosterStore::insert_email`].
#[derive(Debug, Clone)]
pub struct NewEmail {
  pub address:    String,
  pub kind:       EmailKind,
  pub is_primary: bool,
  pub provenance: Provenance,
}

/// Partial update applied by [`crate::store::RosterStore::modify_phone`].
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct PhoneChanges {
  pub number:     Option<String>,
  pub kind:       Option<PhoneKind>,
  pub is_primary: Option<bool>,
}

/// Partial update applied by [`crate::store::RosterStore::modify_email`].
#[derive(Debug, Clone, Default)]
pub struct EmailChanges {
  pub address:    Option<String>,
  pub kind:       Option<EmailKind>,
  pub is_primary: Option<bool>,
}

/// Input to [`crate::store::RosterStore::create_contact`] — the baseline
/// import/seed path. `contact_id`, `display_id`, and `updated_at` are
/// assigned by the store; child rows are created with the given provenance
/// and are not audited per-field (they predate volunteer activity).
#[derive(Debug, Clone, Default)]
pub struct NewContact {
  pub first_name:       String,
  pub middle_name:      Option<String>,
  pub last_name:        String,
  /// Display name; derived from the name parts when absent.
  pub full_name:        Option<String>,
  pub date_of_birth:    Option<NaiveDate>,
  pub street:           Option<String>,
  pub city:             Option<String>,
  pub state:            Option<String>,
  pub zip:              Option<String>,
  pub precinct:         Option<String>,
  pub district:         Option<String>,
  pub party:            Option<String>,
  pub supporter_status: SupporterStatus,
  pub volunteer_status: VolunteerStatus,
  pub notes:            Option<String>,
  pub phones:           Vec<NewPhone>,
  pub emails:           Vec<NewEmail>,
  pub aliases:          Vec<String>,
}

impl NewContact {
  /// Resolve the display name: explicit override, else the joined parts.
  pub fn display_name(&self) -> String {
    if let Some(full) = &self.full_name {
      return full.clone();
    }
    match &self.middle_name {
      Some(m) => format!("{} {} {}", self.first_name, m, self.last_name),
      None => format!("{} {}", self.first_name, self.last_name),
    }
  }
}
