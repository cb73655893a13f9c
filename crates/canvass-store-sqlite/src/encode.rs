//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings (which sort chronologically as
//! text), dates of birth as ISO 8601 dates, UUIDs as hyphenated lowercase
//! strings, and enums as their discriminant strings.

use canvass_core::{
  audit::{AuditAction, AuditEntryWithUser, AuditLogEntry, AuditUser},
  contact::{
    Contact, ContactAlias, ContactEmail, ContactPhone, EmailKind, PhoneKind,
    Provenance, SupporterStatus, VolunteerStatus,
  },
  user::{Role, User},
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub const DATE_FMT: &str = "%Y-%m-%d";

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FMT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FMT)
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_enum<T>(
  what: &'static str,
  s: &str,
  parse: impl Fn(&str) -> Option<T>,
) -> Result<T> {
  parse(s).ok_or_else(|| Error::Decode(format!("unknown {what}: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_id, first_name, last_name, role";

pub struct RawUser {
  pub user_id:    String,
  pub first_name: String,
  pub last_name:  String,
  pub role:       String,
}

pub fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:    row.get(0)?,
    first_name: row.get(1)?,
    last_name:  row.get(2)?,
    role:       row.get(3)?,
  })
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      first_name: self.first_name,
      last_name:  self.last_name,
      role:       decode_enum("role", &self.role, Role::parse)?,
    })
  }
}

pub const CONTACT_COLUMNS: &str = "contact_id, display_id, first_name, \
   middle_name, last_name, full_name, date_of_birth, street, city, state, \
   zip, precinct, district, party, supporter_status, volunteer_status, \
   notes, updated_at";

pub struct RawContact {
  pub contact_id:       String,
  pub display_id:       i64,
  pub first_name:       String,
  pub middle_name:      Option<String>,
  pub last_name:        String,
  pub full_name:        String,
  pub date_of_birth:    Option<String>,
  pub street:           Option<String>,
  pub city:             Option<String>,
  pub state:            Option<String>,
  pub zip:              Option<String>,
  pub precinct:         Option<String>,
  pub district:         Option<String>,
  pub party:            Option<String>,
  pub supporter_status: String,
  pub volunteer_status: String,
  pub notes:            Option<String>,
  pub updated_at:       String,
}

pub fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawContact> {
  Ok(RawContact {
    contact_id:       row.get(0)?,
    display_id:       row.get(1)?,
    first_name:       row.get(2)?,
    middle_name:      row.get(3)?,
    last_name:        row.get(4)?,
    full_name:        row.get(5)?,
    date_of_birth:    row.get(6)?,
    street:           row.get(7)?,
    city:             row.get(8)?,
    state:            row.get(9)?,
    zip:              row.get(10)?,
    precinct:         row.get(11)?,
    district:         row.get(12)?,
    party:            row.get(13)?,
    supporter_status: row.get(14)?,
    volunteer_status: row.get(15)?,
    notes:            row.get(16)?,
    updated_at:       row.get(17)?,
  })
}

impl RawContact {
  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      contact_id:       decode_uuid(&self.contact_id)?,
      display_id:       self.display_id,
      first_name:       self.first_name,
      middle_name:      self.middle_name,
      last_name:        self.last_name,
      full_name:        self.full_name,
      date_of_birth:    self
        .date_of_birth
        .as_deref()
        .map(decode_date)
        .transpose()?,
      street:           self.street,
      city:             self.city,
      state:            self.state,
      zip:              self.zip,
      precinct:         self.precinct,
      district:         self.district,
      party:            self.party,
      supporter_status: decode_enum(
        "supporter status",
        &self.supporter_status,
        SupporterStatus::parse,
      )?,
      volunteer_status: decode_enum(
        "volunteer status",
        &self.volunteer_status,
        VolunteerStatus::parse,
      )?,
      notes:            self.notes,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

pub const PHONE_COLUMNS: &str =
  "phone_id, contact_id, number, kind, is_primary, provenance";

pub struct RawPhone {
  pub phone_id:   String,
  pub contact_id: String,
  pub number:     String,
  pub kind:       String,
  pub is_primary: bool,
  pub provenance: String,
}

pub fn phone_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPhone> {
  Ok(RawPhone {
    phone_id:   row.get(0)?,
    contact_id: row.get(1)?,
    number:     row.get(2)?,
    kind:       row.get(3)?,
    is_primary: row.get(4)?,
    provenance: row.get(5)?,
  })
}

impl RawPhone {
  pub fn into_phone(self) -> Result<ContactPhone> {
    Ok(ContactPhone {
      phone_id:   decode_uuid(&self.phone_id)?,
      contact_id: decode_uuid(&self.contact_id)?,
      number:     self.number,
      kind:       decode_enum("phone kind", &self.kind, PhoneKind::parse)?,
      is_primary: self.is_primary,
      provenance: decode_enum(
        "provenance",
        &self.provenance,
        Provenance::parse,
      )?,
    })
  }
}

pub const EMAIL_COLUMNS: &str =
  "email_id, contact_id, address, kind, is_primary, provenance";

pub struct RawEmail {
  pub email_id:   String,
  pub contact_id: String,
  pub address:    String,
  pub kind:       String,
  pub is_primary: bool,
  pub provenance: String,
}

pub fn email_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEmail> {
  Ok(RawEmail {
    email_id:   row.get(0)?,
    contact_id: row.get(1)?,
    address:    row.get(2)?,
    kind:       row.get(3)?,
    is_primary: row.get(4)?,
    provenance: row.get(5)?,
  })
}

impl RawEmail {
  pub fn into_email(self) -> Result<ContactEmail> {
    Ok(ContactEmail {
      email_id:   decode_uuid(&self.email_id)?,
      contact_id: decode_uuid(&self.contact_id)?,
      address:    self.address,
      kind:       decode_enum("email kind", &self.kind, EmailKind::parse)?,
      is_primary: self.is_primary,
      provenance: decode_enum(
        "provenance",
        &self.provenance,
        Provenance::parse,
      )?,
    })
  }
}

pub const ALIAS_COLUMNS: &str = "alias_id, contact_id, alias";

pub struct RawAlias {
  pub alias_id:   String,
  pub contact_id: String,
  pub alias:      String,
}

pub fn alias_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAlias> {
  Ok(RawAlias {
    alias_id:   row.get(0)?,
    contact_id: row.get(1)?,
    alias:      row.get(2)?,
  })
}

impl RawAlias {
  pub fn into_alias(self) -> Result<ContactAlias> {
    Ok(ContactAlias {
      alias_id:   decode_uuid(&self.alias_id)?,
      contact_id: decode_uuid(&self.contact_id)?,
      alias:      self.alias,
    })
  }
}

pub const AUDIT_COLUMNS: &str = "entry_id, contact_id, user_id, field, \
   action, old_value, new_value, created_at";

pub struct RawAudit {
  pub entry_id:   String,
  pub contact_id: String,
  pub user_id:    String,
  pub field:      String,
  pub action:     String,
  pub old_value:  Option<String>,
  pub new_value:  Option<String>,
  pub created_at: String,
}

pub fn audit_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawAudit> {
  Ok(RawAudit {
    entry_id:   row.get(0)?,
    contact_id: row.get(1)?,
    user_id:    row.get(2)?,
    field:      row.get(3)?,
    action:     row.get(4)?,
    old_value:  row.get(5)?,
    new_value:  row.get(6)?,
    created_at: row.get(7)?,
  })
}

impl RawAudit {
  pub fn into_entry(self) -> Result<AuditLogEntry> {
    Ok(AuditLogEntry {
      entry_id:   decode_uuid(&self.entry_id)?,
      contact_id: decode_uuid(&self.contact_id)?,
      user_id:    decode_uuid(&self.user_id)?,
      field:      self.field,
      action:     decode_enum("audit action", &self.action, AuditAction::parse)?,
      old_value:  self.old_value,
      new_value:  self.new_value,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// An audit row joined with the acting user's name columns.
pub struct RawAuditWithUser {
  pub audit:           RawAudit,
  pub user_first_name: String,
  pub user_last_name:  String,
}

impl RawAuditWithUser {
  pub fn into_entry(self) -> Result<AuditEntryWithUser> {
    Ok(AuditEntryWithUser {
      entry: self.audit.into_entry()?,
      user:  AuditUser {
        first_name: self.user_first_name,
        last_name:  self.user_last_name,
      },
    })
  }
}
