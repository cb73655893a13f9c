//! [`SqliteRoster`] — the SQLite implementation of [`RosterStore`].
//!
//! Every mutation primitive runs one rusqlite transaction covering the
//! entity write, the primary-flag demotion, the `updated_at` bump, and the
//! audit insert. Search evaluates its whole predicate inside a single
//! connection call, so the page rows and `total` always come from one
//! point-in-time view.

use std::{collections::HashMap, path::Path};

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use canvass_core::{
  Error as CoreError, Result as CoreResult,
  audit::{
    AuditEntryWithUser, AuditLogEntry, FIELD_ALIAS, FIELD_EMAIL, FIELD_PHONE,
  },
  contact::{
    Contact, ContactAlias, ContactEmail, ContactField, ContactPhone,
    ContactProfile, EmailChanges, NewContact, NewEmail, NewPhone, PhoneChanges,
  },
  filter::ContactFilter,
  matcher::{MatchTier, NameTarget, match_name},
  store::{EnrichedContact, PAGE_SIZE, RosterStore, SearchPage},
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    ALIAS_COLUMNS, AUDIT_COLUMNS, CONTACT_COLUMNS, EMAIL_COLUMNS,
    PHONE_COLUMNS, RawAlias, RawAuditWithUser, RawContact, USER_COLUMNS,
    alias_from_row, audit_from_row, contact_from_row, email_from_row,
    encode_date, encode_dt, encode_uuid, phone_from_row, user_from_row,
  },
  schema::SCHEMA,
};

fn db_err(e: tokio_rusqlite::Error) -> CoreError {
  CoreError::store(Error::Database(e))
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Canvass contact store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteRoster {
  conn: tokio_rusqlite::Connection,
}

impl SqliteRoster {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteRoster {
  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> CoreResult<User> {
    let user = User {
      user_id:    Uuid::new_v4(),
      first_name: input.first_name,
      last_name:  input.last_name,
      role:       input.role,
    };

    let row = user.clone();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, first_name, last_name, role)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![
            encode_uuid(row.user_id),
            row.first_name,
            row.last_name,
            row.role.as_str(),
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(db_err)?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> CoreResult<Option<User>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
              rusqlite::params![id_str],
              user_from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(db_err)?;

    raw
      .map(|r| r.into_user())
      .transpose()
      .map_err(CoreError::from)
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  async fn create_contact(&self, input: NewContact) -> CoreResult<Contact> {
    let contact = Contact {
      contact_id:       Uuid::new_v4(),
      display_id:       0, // assigned inside the transaction
      full_name:        input.display_name(),
      first_name:       input.first_name,
      middle_name:      input.middle_name,
      last_name:        input.last_name,
      date_of_birth:    input.date_of_birth,
      street:           input.street,
      city:             input.city,
      state:            input.state,
      zip:              input.zip,
      precinct:         input.precinct,
      district:         input.district,
      party:            input.party,
      supporter_status: input.supporter_status,
      volunteer_status: input.volunteer_status,
      notes:            input.notes,
      updated_at:       Utc::now(),
    };

    let phones = input.phones;
    let emails = input.emails;
    let aliases = input.aliases;

    let out = self
      .conn
      .call(move |conn| Ok(tx_create_contact(conn, contact, phones, emails, aliases)))
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn get_contact(&self, id: Uuid) -> CoreResult<Option<Contact>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(fetch_contact_row(conn, &id_str)?))
      .await
      .map_err(db_err)?;

    raw
      .map(RawContact::into_contact)
      .transpose()
      .map_err(CoreError::from)
  }

  async fn get_profile(&self, id: Uuid) -> CoreResult<Option<ContactProfile>> {
    let id_str = encode_uuid(id);

    let out = self
      .conn
      .call(move |conn| Ok(read_profile(conn, &id_str)))
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  // ── Search ────────────────────────────────────────────────────────────────

  async fn search(
    &self,
    filter: &ContactFilter,
    page: u32,
  ) -> CoreResult<SearchPage> {
    let filter = filter.clone();
    let page = page.max(1);
    let today = Utc::now().date_naive();

    let out = self
      .conn
      .call(move |conn| Ok(run_search(conn, &filter, page, today)))
      .await
      .map_err(db_err)?;

    let (contacts, total) = out.map_err(CoreError::from)?;
    Ok(SearchPage { contacts, total })
  }

  // ── Transactional mutation primitives ─────────────────────────────────────

  async fn write_field(
    &self,
    contact_id: Uuid,
    acting_user: Uuid,
    field: ContactField,
    new_value: Option<String>,
  ) -> CoreResult<Contact> {
    let now = encode_dt(Utc::now());
    let out = self
      .conn
      .call(move |conn| {
        Ok(tx_write_field(conn, contact_id, acting_user, field, new_value, &now))
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn insert_phone(
    &self,
    contact_id: Uuid,
    acting_user: Uuid,
    input: NewPhone,
  ) -> CoreResult<ContactPhone> {
    let phone = ContactPhone {
      phone_id: Uuid::new_v4(),
      contact_id,
      number: input.number,
      kind: input.kind,
      is_primary: input.is_primary,
      provenance: input.provenance,
    };
    let now = encode_dt(Utc::now());

    let out = self
      .conn
      .call(move |conn| Ok(tx_insert_phone(conn, acting_user, phone, &now)))
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn modify_phone(
    &self,
    contact_id: Uuid,
    phone_id: Uuid,
    acting_user: Uuid,
    changes: PhoneChanges,
  ) -> CoreResult<ContactPhone> {
    let now = encode_dt(Utc::now());
    let out = self
      .conn
      .call(move |conn| {
        Ok(tx_modify_phone(conn, contact_id, phone_id, acting_user, changes, &now))
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn remove_phone(
    &self,
    contact_id: Uuid,
    phone_id: Uuid,
    acting_user: Uuid,
  ) -> CoreResult<ContactPhone> {
    let now = encode_dt(Utc::now());
    let out = self
      .conn
      .call(move |conn| {
        Ok(tx_remove_phone(conn, contact_id, phone_id, acting_user, &now))
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn insert_email(
    &self,
    contact_id: Uuid,
    acting_user: Uuid,
    input: NewEmail,
  ) -> CoreResult<ContactEmail> {
    let email = ContactEmail {
      email_id: Uuid::new_v4(),
      contact_id,
      address: input.address,
      kind: input.kind,
      is_primary: input.is_primary,
      provenance: input.provenance,
    };
    let now = encode_dt(Utc::now());

    let out = self
      .conn
      .call(move |conn| Ok(tx_insert_email(conn, acting_user, email, &now)))
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn modify_email(
    &self,
    contact_id: Uuid,
    email_id: Uuid,
    acting_user: Uuid,
    changes: EmailChanges,
  ) -> CoreResult<ContactEmail> {
    let now = encode_dt(Utc::now());
    let out = self
      .conn
      .call(move |conn| {
        Ok(tx_modify_email(conn, contact_id, email_id, acting_user, changes, &now))
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn remove_email(
    &self,
    contact_id: Uuid,
    email_id: Uuid,
    acting_user: Uuid,
  ) -> CoreResult<ContactEmail> {
    let now = encode_dt(Utc::now());
    let out = self
      .conn
      .call(move |conn| {
        Ok(tx_remove_email(conn, contact_id, email_id, acting_user, &now))
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn insert_alias(
    &self,
    contact_id: Uuid,
    acting_user: Uuid,
    alias: String,
  ) -> CoreResult<ContactAlias> {
    let alias = ContactAlias {
      alias_id: Uuid::new_v4(),
      contact_id,
      alias,
    };
    let now = encode_dt(Utc::now());

    let out = self
      .conn
      .call(move |conn| Ok(tx_insert_alias(conn, acting_user, alias, &now)))
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn remove_alias(
    &self,
    contact_id: Uuid,
    alias_id: Uuid,
    acting_user: Uuid,
  ) -> CoreResult<ContactAlias> {
    let now = encode_dt(Utc::now());
    let out = self
      .conn
      .call(move |conn| {
        Ok(tx_remove_alias(conn, contact_id, alias_id, acting_user, &now))
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  // ── Audit reads ───────────────────────────────────────────────────────────

  async fn audit_entry(
    &self,
    entry_id: Uuid,
  ) -> CoreResult<Option<AuditLogEntry>> {
    let id_str = encode_uuid(entry_id);

    let out = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!("SELECT {AUDIT_COLUMNS} FROM audit_log WHERE entry_id = ?1"),
            rusqlite::params![id_str],
            audit_from_row,
          )
          .optional()?;
        Ok(raw.map(|r| r.into_entry()).transpose())
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn list_audit(
    &self,
    contact_id: Uuid,
  ) -> CoreResult<Vec<AuditEntryWithUser>> {
    let id_str = encode_uuid(contact_id);

    let out = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             a.entry_id, a.contact_id, a.user_id, a.field, a.action,
             a.old_value, a.new_value, a.created_at,
             u.first_name, u.last_name
           FROM audit_log a
           JOIN users u ON u.user_id = a.user_id
           WHERE a.contact_id = ?1
           ORDER BY a.created_at DESC, a.rowid DESC",
        )?;
        let raws = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawAuditWithUser {
              audit:           audit_from_row(row)?,
              user_first_name: row.get(8)?,
              user_last_name:  row.get(9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(
          raws
            .into_iter()
            .map(RawAuditWithUser::into_entry)
            .collect::<Result<Vec<_>>>(),
        )
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }

  async fn latest_audit_for_field(
    &self,
    contact_id: Uuid,
    field: &str,
  ) -> CoreResult<Option<AuditLogEntry>> {
    let id_str = encode_uuid(contact_id);
    let field = field.to_owned();

    let out = self
      .conn
      .call(move |conn| {
        let raw = conn
          .query_row(
            &format!(
              "SELECT {AUDIT_COLUMNS} FROM audit_log
               WHERE contact_id = ?1 AND field = ?2
               ORDER BY created_at DESC, rowid DESC
               LIMIT 1"
            ),
            rusqlite::params![id_str, field],
            audit_from_row,
          )
          .optional()?;
        Ok(raw.map(|r| r.into_entry()).transpose())
      })
      .await
      .map_err(db_err)?;
    out.map_err(CoreError::from)
  }
}

// ─── Search execution ────────────────────────────────────────────────────────

/// Ordering rank for a page row; `None` only occurs on fragment-free
/// filters, where every row ranks equal and freshness decides.
fn tier_rank(tier: Option<MatchTier>) -> u8 {
  match tier {
    None | Some(MatchTier::Exact) => 0,
    Some(MatchTier::Alias) => 1,
    Some(MatchTier::Nickname) => 2,
    Some(MatchTier::Prefix) => 3,
  }
}

fn provenance_counts(
  conn: &rusqlite::Connection,
  table: &str,
  contact_id: &str,
) -> rusqlite::Result<(u32, u32)> {
  let mut stmt = conn.prepare(&format!(
    "SELECT provenance, COUNT(*) FROM {table}
     WHERE contact_id = ?1 GROUP BY provenance"
  ))?;
  let rows = stmt.query_map(rusqlite::params![contact_id], |row| {
    Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
  })?;

  let (mut manual, mut baseline) = (0, 0);
  for row in rows {
    let (provenance, count) = row?;
    match provenance.as_str() {
      "manual" => manual = count,
      "baseline" => baseline = count,
      _ => {}
    }
  }
  Ok((manual, baseline))
}

fn run_search(
  conn: &rusqlite::Connection,
  filter: &ContactFilter,
  page: u32,
  today: NaiveDate,
) -> Result<(Vec<EnrichedContact>, u64)> {
  // 1. Narrow candidates in SQL on the simple equality filters.
  let mut conds: Vec<String> = Vec::new();
  let mut args: Vec<String> = Vec::new();

  if let Some(city) = &filter.city {
    conds.push("LOWER(city) = ?".into());
    args.push(city.clone());
  }
  if let Some(zip) = &filter.zip {
    conds.push("zip = ?".into());
    args.push(zip.clone());
  }
  if let Some(party) = &filter.party {
    conds.push("UPPER(party) = ?".into());
    args.push(party.clone());
  }
  if let Some(statuses) = &filter.statuses {
    let placeholders = vec!["?"; statuses.len()].join(", ");
    conds.push(format!("supporter_status IN ({placeholders})"));
    args.extend(statuses.iter().map(|s| s.as_str().to_owned()));
  }

  let where_clause = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };

  let candidates: Vec<RawContact> = {
    let mut stmt = conn
      .prepare(&format!("SELECT {CONTACT_COLUMNS} FROM contacts {where_clause}"))?;
    stmt
      .query_map(rusqlite::params_from_iter(args.iter()), contact_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  // 2. Alias strings, keyed by contact — only needed for name matching.
  let alias_map: HashMap<String, Vec<String>> = if filter.name.is_empty() {
    HashMap::new()
  } else {
    let mut stmt =
      conn.prepare("SELECT contact_id, alias FROM contact_aliases")?;
    let rows = stmt
      .query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for (contact_id, alias) in rows {
      map.entry(contact_id).or_default().push(alias);
    }
    map
  };

  // 3. The name and age predicates run over the candidates.
  let no_aliases: Vec<String> = Vec::new();
  let mut matched: Vec<(RawContact, Option<MatchTier>)> = Vec::new();
  for raw in candidates {
    let dob = raw
      .date_of_birth
      .as_deref()
      .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok());
    if !filter.matches_age(dob, today) {
      continue;
    }

    let tier = if filter.name.is_empty() {
      None
    } else {
      let aliases = alias_map.get(&raw.contact_id).unwrap_or(&no_aliases);
      let target = NameTarget {
        first:   &raw.first_name,
        middle:  raw.middle_name.as_deref(),
        last:    &raw.last_name,
        aliases,
      };
      match match_name(&filter.name, &target) {
        Some(tier) => Some(tier),
        None => continue,
      }
    };

    matched.push((raw, tier));
  }

  // 4. Total ordering: tier, then freshness, then display id as the
  //    deterministic tie-breaker. RFC 3339 text sorts chronologically.
  matched.sort_by(|a, b| {
    tier_rank(a.1)
      .cmp(&tier_rank(b.1))
      .then_with(|| b.0.updated_at.cmp(&a.0.updated_at))
      .then_with(|| a.0.display_id.cmp(&b.0.display_id))
  });

  let total = matched.len() as u64;
  let start = (page as usize - 1).saturating_mul(PAGE_SIZE);

  // 5. Enrichment counts for the page rows only.
  let mut contacts = Vec::new();
  for (raw, tier) in matched.into_iter().skip(start).take(PAGE_SIZE) {
    let (manual_phone_count, baseline_phone_count) =
      provenance_counts(conn, "contact_phones", &raw.contact_id)?;
    let (manual_email_count, baseline_email_count) =
      provenance_counts(conn, "contact_emails", &raw.contact_id)?;

    contacts.push(EnrichedContact {
      contact: raw.into_contact()?,
      match_tier: tier,
      manual_phone_count,
      baseline_phone_count,
      manual_email_count,
      baseline_email_count,
    });
  }

  Ok((contacts, total))
}

// ─── Read helpers ────────────────────────────────────────────────────────────

fn fetch_contact_row(
  conn: &rusqlite::Connection,
  contact_id: &str,
) -> rusqlite::Result<Option<RawContact>> {
  conn
    .query_row(
      &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE contact_id = ?1"),
      rusqlite::params![contact_id],
      contact_from_row,
    )
    .optional()
}

fn read_profile(
  conn: &rusqlite::Connection,
  contact_id: &str,
) -> Result<Option<ContactProfile>> {
  let Some(raw) = fetch_contact_row(conn, contact_id)? else {
    return Ok(None);
  };

  let phones = {
    let mut stmt = conn.prepare(&format!(
      "SELECT {PHONE_COLUMNS} FROM contact_phones
       WHERE contact_id = ?1 ORDER BY rowid"
    ))?;
    stmt
      .query_map(rusqlite::params![contact_id], phone_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
      .into_iter()
      .map(|r| r.into_phone())
      .collect::<Result<Vec<_>>>()?
  };

  let emails = {
    let mut stmt = conn.prepare(&format!(
      "SELECT {EMAIL_COLUMNS} FROM contact_emails
       WHERE contact_id = ?1 ORDER BY rowid"
    ))?;
    stmt
      .query_map(rusqlite::params![contact_id], email_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
      .into_iter()
      .map(|r| r.into_email())
      .collect::<Result<Vec<_>>>()?
  };

  let aliases = {
    let mut stmt = conn.prepare(&format!(
      "SELECT {ALIAS_COLUMNS} FROM contact_aliases
       WHERE contact_id = ?1 ORDER BY rowid"
    ))?;
    stmt
      .query_map(rusqlite::params![contact_id], alias_from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?
      .into_iter()
      .map(|r| r.into_alias())
      .collect::<Result<Vec<_>>>()?
  };

  Ok(Some(ContactProfile {
    contact: raw.into_contact()?,
    phones,
    emails,
    aliases,
  }))
}

// ─── Transaction bodies ──────────────────────────────────────────────────────

fn contact_exists(
  conn: &rusqlite::Connection,
  contact_id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM contacts WHERE contact_id = ?1",
        rusqlite::params![contact_id],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn touch_contact(
  conn: &rusqlite::Connection,
  contact_id: &str,
  now: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE contacts SET updated_at = ?1 WHERE contact_id = ?2",
    rusqlite::params![now, contact_id],
  )?;
  Ok(())
}

#[allow(clippy::too_many_arguments)]
fn insert_audit_row(
  conn: &rusqlite::Connection,
  contact_id: &str,
  user_id: &str,
  field: &str,
  action: &str,
  old_value: Option<&str>,
  new_value: Option<&str>,
  created_at: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO audit_log (
       entry_id, contact_id, user_id, field, action,
       old_value, new_value, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    rusqlite::params![
      encode_uuid(Uuid::new_v4()),
      contact_id,
      user_id,
      field,
      action,
      old_value,
      new_value,
      created_at,
    ],
  )?;
  Ok(())
}

fn demote_primaries(
  conn: &rusqlite::Connection,
  table: &str,
  contact_id: &str,
) -> rusqlite::Result<()> {
  conn.execute(
    &format!("UPDATE {table} SET is_primary = 0 WHERE contact_id = ?1 AND is_primary = 1"),
    rusqlite::params![contact_id],
  )?;
  Ok(())
}

fn next_display_id(conn: &rusqlite::Connection) -> rusqlite::Result<i64> {
  conn.query_row(
    "SELECT COALESCE(MAX(display_id), 0) + 1 FROM contacts",
    [],
    |row| row.get(0),
  )
}

fn tx_create_contact(
  conn: &mut rusqlite::Connection,
  contact: Contact,
  phones: Vec<NewPhone>,
  emails: Vec<NewEmail>,
  aliases: Vec<String>,
) -> Result<Contact> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(contact.contact_id);
  let display_id = next_display_id(&tx)?;

  tx.execute(
    &format!(
      "INSERT INTO contacts ({CONTACT_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
    ),
    rusqlite::params![
      cid,
      display_id,
      contact.first_name,
      contact.middle_name,
      contact.last_name,
      contact.full_name,
      contact.date_of_birth.map(encode_date),
      contact.street,
      contact.city,
      contact.state,
      contact.zip,
      contact.precinct,
      contact.district,
      contact.party,
      contact.supporter_status.as_str(),
      contact.volunteer_status.as_str(),
      contact.notes,
      encode_dt(contact.updated_at),
    ],
  )?;

  let mut has_primary_phone = false;
  for phone in phones {
    let is_primary = phone.is_primary && !has_primary_phone;
    has_primary_phone |= is_primary;
    tx.execute(
      &format!("INSERT INTO contact_phones ({PHONE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
      rusqlite::params![
        encode_uuid(Uuid::new_v4()),
        cid,
        phone.number,
        phone.kind.as_str(),
        is_primary,
        phone.provenance.as_str(),
      ],
    )?;
  }

  let mut has_primary_email = false;
  for email in emails {
    let is_primary = email.is_primary && !has_primary_email;
    has_primary_email |= is_primary;
    tx.execute(
      &format!("INSERT INTO contact_emails ({EMAIL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
      rusqlite::params![
        encode_uuid(Uuid::new_v4()),
        cid,
        email.address,
        email.kind.as_str(),
        is_primary,
        email.provenance.as_str(),
      ],
    )?;
  }

  for alias in aliases {
    let alias = alias.trim();
    if alias.is_empty() {
      continue;
    }
    tx.execute(
      &format!("INSERT INTO contact_aliases ({ALIAS_COLUMNS}) VALUES (?1, ?2, ?3)"),
      rusqlite::params![encode_uuid(Uuid::new_v4()), cid, alias],
    )?;
  }

  tx.commit()?;
  Ok(Contact { display_id, ..contact })
}

fn tx_write_field(
  conn: &mut rusqlite::Connection,
  contact_id: Uuid,
  acting_user: Uuid,
  field: ContactField,
  new_value: Option<String>,
  now: &str,
) -> Result<Contact> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(contact_id);
  let uid = encode_uuid(acting_user);
  let column = field.as_str();

  let row: Option<Option<String>> = tx
    .query_row(
      &format!("SELECT {column} FROM contacts WHERE contact_id = ?1"),
      rusqlite::params![cid],
      |r| r.get(0),
    )
    .optional()?;
  let Some(old_value) = row else {
    return Err(Error::Domain(CoreError::ContactNotFound(contact_id)));
  };

  tx.execute(
    &format!("UPDATE contacts SET {column} = ?1, updated_at = ?2 WHERE contact_id = ?3"),
    rusqlite::params![new_value, now, cid],
  )?;

  insert_audit_row(
    &tx,
    &cid,
    &uid,
    column,
    "update",
    old_value.as_deref(),
    new_value.as_deref(),
    now,
  )?;

  let raw = fetch_contact_row(&tx, &cid)?
    .ok_or(Error::Domain(CoreError::ContactNotFound(contact_id)))?;
  tx.commit()?;

  raw.into_contact()
}

fn tx_insert_phone(
  conn: &mut rusqlite::Connection,
  acting_user: Uuid,
  phone: ContactPhone,
  now: &str,
) -> Result<ContactPhone> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(phone.contact_id);

  if !contact_exists(&tx, &cid)? {
    return Err(Error::Domain(CoreError::ContactNotFound(phone.contact_id)));
  }
  if phone.is_primary {
    demote_primaries(&tx, "contact_phones", &cid)?;
  }

  tx.execute(
    &format!("INSERT INTO contact_phones ({PHONE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
    rusqlite::params![
      encode_uuid(phone.phone_id),
      cid,
      phone.number,
      phone.kind.as_str(),
      phone.is_primary,
      phone.provenance.as_str(),
    ],
  )?;

  let new_json = serde_json::to_string(&phone)?;
  insert_audit_row(
    &tx,
    &cid,
    &encode_uuid(acting_user),
    FIELD_PHONE,
    "create",
    None,
    Some(&new_json),
    now,
  )?;
  touch_contact(&tx, &cid, now)?;
  tx.commit()?;

  Ok(phone)
}

fn get_phone_row(
  conn: &rusqlite::Connection,
  contact_id: &str,
  phone_id: &str,
) -> rusqlite::Result<Option<crate::encode::RawPhone>> {
  conn
    .query_row(
      &format!(
        "SELECT {PHONE_COLUMNS} FROM contact_phones
         WHERE phone_id = ?1 AND contact_id = ?2"
      ),
      rusqlite::params![phone_id, contact_id],
      phone_from_row,
    )
    .optional()
}

fn tx_modify_phone(
  conn: &mut rusqlite::Connection,
  contact_id: Uuid,
  phone_id: Uuid,
  acting_user: Uuid,
  changes: PhoneChanges,
  now: &str,
) -> Result<ContactPhone> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(contact_id);
  let pid = encode_uuid(phone_id);

  let raw = get_phone_row(&tx, &cid, &pid)?
    .ok_or(Error::Domain(CoreError::PhoneNotFound(phone_id)))?;
  let old = raw.into_phone()?;

  let new = ContactPhone {
    number:     changes.number.unwrap_or_else(|| old.number.clone()),
    kind:       changes.kind.unwrap_or(old.kind),
    is_primary: changes.is_primary.unwrap_or(old.is_primary),
    ..old.clone()
  };

  if new.is_primary && !old.is_primary {
    demote_primaries(&tx, "contact_phones", &cid)?;
  }

  tx.execute(
    "UPDATE contact_phones SET number = ?1, kind = ?2, is_primary = ?3
     WHERE phone_id = ?4",
    rusqlite::params![new.number, new.kind.as_str(), new.is_primary, pid],
  )?;

  let old_json = serde_json::to_string(&old)?;
  let new_json = serde_json::to_string(&new)?;
  insert_audit_row(
    &tx,
    &cid,
    &encode_uuid(acting_user),
    FIELD_PHONE,
    "update",
    Some(&old_json),
    Some(&new_json),
    now,
  )?;
  touch_contact(&tx, &cid, now)?;
  tx.commit()?;

  Ok(new)
}

fn tx_remove_phone(
  conn: &mut rusqlite::Connection,
  contact_id: Uuid,
  phone_id: Uuid,
  acting_user: Uuid,
  now: &str,
) -> Result<ContactPhone> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(contact_id);
  let pid = encode_uuid(phone_id);

  let raw = get_phone_row(&tx, &cid, &pid)?
    .ok_or(Error::Domain(CoreError::PhoneNotFound(phone_id)))?;
  let old = raw.into_phone()?;

  tx.execute(
    "DELETE FROM contact_phones WHERE phone_id = ?1",
    rusqlite::params![pid],
  )?;

  let old_json = serde_json::to_string(&old)?;
  insert_audit_row(
    &tx,
    &cid,
    &encode_uuid(acting_user),
    FIELD_PHONE,
    "delete",
    Some(&old_json),
    None,
    now,
  )?;
  touch_contact(&tx, &cid, now)?;
  tx.commit()?;

  Ok(old)
}

fn tx_insert_email(
  conn: &mut rusqlite::Connection,
  acting_user: Uuid,
  email: ContactEmail,
  now: &str,
) -> Result<ContactEmail> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(email.contact_id);

  if !contact_exists(&tx, &cid)? {
    return Err(Error::Domain(CoreError::ContactNotFound(email.contact_id)));
  }
  if email.is_primary {
    demote_primaries(&tx, "contact_emails", &cid)?;
  }

  tx.execute(
    &format!("INSERT INTO contact_emails ({EMAIL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
    rusqlite::params![
      encode_uuid(email.email_id),
      cid,
      email.address,
      email.kind.as_str(),
      email.is_primary,
      email.provenance.as_str(),
    ],
  )?;

  let new_json = serde_json::to_string(&email)?;
  insert_audit_row(
    &tx,
    &cid,
    &encode_uuid(acting_user),
    FIELD_EMAIL,
    "create",
    None,
    Some(&new_json),
    now,
  )?;
  touch_contact(&tx, &cid, now)?;
  tx.commit()?;

  Ok(email)
}

fn get_email_row(
  conn: &rusqlite::Connection,
  contact_id: &str,
  email_id: &str,
) -> rusqlite::Result<Option<crate::encode::RawEmail>> {
  conn
    .query_row(
      &format!(
        "SELECT {EMAIL_COLUMNS} FROM contact_emails
         WHERE email_id = ?1 AND contact_id = ?2"
      ),
      rusqlite::params![email_id, contact_id],
      email_from_row,
    )
    .optional()
}

fn tx_modify_email(
  conn: &mut rusqlite::Connection,
  contact_id: Uuid,
  email_id: Uuid,
  acting_user: Uuid,
  changes: EmailChanges,
  now: &str,
) -> Result<ContactEmail> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(contact_id);
  let eid = encode_uuid(email_id);

  let raw = get_email_row(&tx, &cid, &eid)?
    .ok_or(Error::Domain(CoreError::EmailNotFound(email_id)))?;
  let old = raw.into_email()?;

  let new = ContactEmail {
    address:    changes.address.unwrap_or_else(|| old.address.clone()),
    kind:       changes.kind.unwrap_or(old.kind),
    is_primary: changes.is_primary.unwrap_or(old.is_primary),
    ..old.clone()
  };

  if new.is_primary && !old.is_primary {
    demote_primaries(&tx, "contact_emails", &cid)?;
  }

  tx.execute(
    "UPDATE contact_emails SET address = ?1, kind = ?2, is_primary = ?3
     WHERE email_id = ?4",
    rusqlite::params![new.address, new.kind.as_str(), new.is_primary, eid],
  )?;

  let old_json = serde_json::to_string(&old)?;
  let new_json = serde_json::to_string(&new)?;
  insert_audit_row(
    &tx,
    &cid,
    &encode_uuid(acting_user),
    FIELD_EMAIL,
    "update",
    Some(&old_json),
    Some(&new_json),
    now,
  )?;
  touch_contact(&tx, &cid, now)?;
  tx.commit()?;

  Ok(new)
}

fn tx_remove_email(
  conn: &mut rusqlite::Connection,
  contact_id: Uuid,
  email_id: Uuid,
  acting_user: Uuid,
  now: &str,
) -> Result<ContactEmail> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(contact_id);
  let eid = encode_uuid(email_id);

  let raw = get_email_row(&tx, &cid, &eid)?
    .ok_or(Error::Domain(CoreError::EmailNotFound(email_id)))?;
  let old = raw.into_email()?;

  tx.execute(
    "DELETE FROM contact_emails WHERE email_id = ?1",
    rusqlite::params![eid],
  )?;

  let old_json = serde_json::to_string(&old)?;
  insert_audit_row(
    &tx,
    &cid,
    &encode_uuid(acting_user),
    FIELD_EMAIL,
    "delete",
    Some(&old_json),
    None,
    now,
  )?;
  touch_contact(&tx, &cid, now)?;
  tx.commit()?;

  Ok(old)
}

fn tx_insert_alias(
  conn: &mut rusqlite::Connection,
  acting_user: Uuid,
  alias: ContactAlias,
  now: &str,
) -> Result<ContactAlias> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(alias.contact_id);

  if !contact_exists(&tx, &cid)? {
    return Err(Error::Domain(CoreError::ContactNotFound(alias.contact_id)));
  }

  tx.execute(
    &format!("INSERT INTO contact_aliases ({ALIAS_COLUMNS}) VALUES (?1, ?2, ?3)"),
    rusqlite::params![encode_uuid(alias.alias_id), cid, alias.alias],
  )?;

  let new_json = serde_json::to_string(&alias)?;
  insert_audit_row(
    &tx,
    &cid,
    &encode_uuid(acting_user),
    FIELD_ALIAS,
    "create",
    None,
    Some(&new_json),
    now,
  )?;
  touch_contact(&tx, &cid, now)?;
  tx.commit()?;

  Ok(alias)
}

fn tx_remove_alias(
  conn: &mut rusqlite::Connection,
  contact_id: Uuid,
  alias_id: Uuid,
  acting_user: Uuid,
  now: &str,
) -> Result<ContactAlias> {
  let tx = conn.transaction()?;
  let cid = encode_uuid(contact_id);
  let aid = encode_uuid(alias_id);

  let raw: Option<RawAlias> = tx
    .query_row(
      &format!(
        "SELECT {ALIAS_COLUMNS} FROM contact_aliases
         WHERE alias_id = ?1 AND contact_id = ?2"
      ),
      rusqlite::params![aid, cid],
      alias_from_row,
    )
    .optional()?;
  let old = raw
    .ok_or(Error::Domain(CoreError::AliasNotFound(alias_id)))?
    .into_alias()?;

  tx.execute(
    "DELETE FROM contact_aliases WHERE alias_id = ?1",
    rusqlite::params![aid],
  )?;

  let old_json = serde_json::to_string(&old)?;
  insert_audit_row(
    &tx,
    &cid,
    &encode_uuid(acting_user),
    FIELD_ALIAS,
    "delete",
    Some(&old_json),
    None,
    now,
  )?;
  touch_contact(&tx, &cid, now)?;
  tx.commit()?;

  Ok(old)
}
