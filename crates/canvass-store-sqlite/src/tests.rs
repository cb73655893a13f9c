//! Integration tests for `SqliteRoster` against an in-memory database.

use std::{collections::HashSet, sync::Arc};

use canvass_core::{
  Error,
  audit::{AuditAction, AuditRecorder},
  contact::{
    ContactField, NewContact, NewEmail, NewPhone, EmailKind, PhoneKind,
    Provenance, SupporterStatus,
  },
  filter::{ContactFilter, SearchRequest},
  gateway::MutationGateway,
  matcher::{MatchTier, NicknameTable},
  store::{PAGE_SIZE, RosterStore},
  user::{NewUser, Role, User},
};
use chrono::{Days, Months, Utc};
use uuid::Uuid;

use crate::SqliteRoster;

async fn store() -> SqliteRoster {
  SqliteRoster::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteRoster, role: Role) -> User {
  s.add_user(NewUser {
    first_name: "Pat".into(),
    last_name:  "Organizer".into(),
    role,
  })
  .await
  .unwrap()
}

fn gateway(s: &SqliteRoster) -> MutationGateway<SqliteRoster> {
  MutationGateway::new(Arc::new(s.clone()))
}

fn recorder(s: &SqliteRoster) -> AuditRecorder<SqliteRoster> {
  AuditRecorder::new(Arc::new(s.clone()))
}

fn person(first: &str, middle: Option<&str>, last: &str) -> NewContact {
  NewContact {
    first_name: first.into(),
    middle_name: middle.map(Into::into),
    last_name: last.into(),
    ..Default::default()
  }
}

fn compile(req: SearchRequest) -> ContactFilter {
  ContactFilter::compile(&req, &NicknameTable::with_defaults())
}

fn manual_phone(number: &str) -> NewPhone {
  NewPhone {
    number:     number.into(),
    kind:       PhoneKind::Mobile,
    is_primary: false,
    provenance: Provenance::Manual,
  }
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_sequential_display_ids() {
  let s = store().await;

  let a = s.create_contact(person("Ada", None, "Lovelace")).await.unwrap();
  let b = s.create_contact(person("Grace", None, "Hopper")).await.unwrap();

  assert_eq!(a.display_id, 1);
  assert_eq!(b.display_id, 2);

  let fetched = s.get_contact(a.contact_id).await.unwrap().unwrap();
  assert_eq!(fetched.first_name, "Ada");
  assert_eq!(fetched.full_name, "Ada Lovelace");
}

#[tokio::test]
async fn get_contact_missing_returns_none() {
  let s = store().await;
  assert!(s.get_contact(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn profile_includes_children() {
  let s = store().await;

  let mut input = person("Jane", Some("Q"), "Smith");
  input.aliases = vec!["Janie".into()];
  input.phones = vec![NewPhone {
    number:     "555-0199".into(),
    kind:       PhoneKind::Home,
    is_primary: true,
    provenance: Provenance::Baseline,
  }];
  input.emails = vec![NewEmail {
    address:    "jane@example.com".into(),
    kind:       EmailKind::Personal,
    is_primary: true,
    provenance: Provenance::Baseline,
  }];

  let contact = s.create_contact(input).await.unwrap();
  let profile = s.get_profile(contact.contact_id).await.unwrap().unwrap();

  assert_eq!(profile.phones.len(), 1);
  assert_eq!(profile.emails.len(), 1);
  assert_eq!(profile.aliases.len(), 1);
  assert_eq!(profile.aliases[0].alias, "Janie");
}

// ─── Search: predicates ──────────────────────────────────────────────────────

#[tokio::test]
async fn wildcard_first_name_matches_last_name_and_alias() {
  let s = store().await;

  s.create_contact(person("Jane", None, "Smith")).await.unwrap();
  let mut aliased = person("Robert", None, "Jones");
  aliased.aliases = vec!["Smith".into()];
  s.create_contact(aliased).await.unwrap();
  s.create_contact(person("Carol", None, "Nguyen")).await.unwrap();

  let filter = compile(SearchRequest {
    last_name: Some("Smith".into()),
    ..Default::default()
  });
  let page = s.search(&filter, 1).await.unwrap();

  assert_eq!(page.total, 2);
  let names: Vec<_> =
    page.contacts.iter().map(|c| c.contact.last_name.as_str()).collect();
  assert!(names.contains(&"Smith"));
  assert!(names.contains(&"Jones"));
}

#[tokio::test]
async fn name_fragments_are_and_combined_and_fail_closed() {
  let s = store().await;

  s.create_contact(person("Jane", Some("Quinn"), "Smith")).await.unwrap();
  s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  let filter = compile(SearchRequest {
    first_name:  Some("Jane".into()),
    middle_name: Some("Quinn".into()),
    last_name:   Some("Smith".into()),
    ..Default::default()
  });
  let page = s.search(&filter, 1).await.unwrap();

  // The contact without a middle name cannot satisfy the middle fragment.
  assert_eq!(page.total, 1);
  assert_eq!(page.contacts[0].contact.middle_name.as_deref(), Some("Quinn"));
}

#[tokio::test]
async fn match_tiers_order_exact_alias_nickname_prefix() {
  let s = store().await;

  s.create_contact(person("Billie", None, "Yates")).await.unwrap();
  s.create_contact(person("William", None, "Yates")).await.unwrap();
  let mut aliased = person("Robert", None, "Yates");
  aliased.aliases = vec!["Bill".into()];
  s.create_contact(aliased).await.unwrap();
  s.create_contact(person("Bill", None, "Yates")).await.unwrap();

  let filter = compile(SearchRequest {
    first_name: Some("Bill".into()),
    ..Default::default()
  });
  let page = s.search(&filter, 1).await.unwrap();

  assert_eq!(page.total, 4);
  let firsts: Vec<_> =
    page.contacts.iter().map(|c| c.contact.first_name.as_str()).collect();
  assert_eq!(firsts, ["Bill", "Robert", "William", "Billie"]);

  let tiers: Vec<_> = page.contacts.iter().map(|c| c.match_tier).collect();
  assert_eq!(
    tiers,
    [
      Some(MatchTier::Exact),
      Some(MatchTier::Alias),
      Some(MatchTier::Nickname),
      Some(MatchTier::Prefix),
    ]
  );
}

#[tokio::test]
async fn party_filter_is_exact_code_not_prefix() {
  let s = store().await;

  let mut d = person("Dana", None, "Ortiz");
  d.party = Some("D".into());
  s.create_contact(d).await.unwrap();

  let mut dem = person("Devon", None, "Reyes");
  dem.party = Some("DEM".into());
  s.create_contact(dem).await.unwrap();

  let filter = compile(SearchRequest {
    party: Some("d".into()),
    ..Default::default()
  });
  let page = s.search(&filter, 1).await.unwrap();

  assert_eq!(page.total, 1);
  assert_eq!(page.contacts[0].contact.party.as_deref(), Some("D"));
}

#[tokio::test]
async fn supporters_quick_filter_matches_confirmed_and_likely() {
  let s = store().await;

  for status in [
    SupporterStatus::ConfirmedSupporter,
    SupporterStatus::LikelySupporter,
    SupporterStatus::Opposition,
  ] {
    let mut input = person("Sam", None, "Voter");
    input.supporter_status = status;
    s.create_contact(input).await.unwrap();
  }

  let filter = compile(SearchRequest {
    quick_filters: Some("supporters".into()),
    ..Default::default()
  });
  let page = s.search(&filter, 1).await.unwrap();

  assert_eq!(page.total, 2);
  assert!(page.contacts.iter().all(|c| {
    matches!(
      c.contact.supporter_status,
      SupporterStatus::ConfirmedSupporter | SupporterStatus::LikelySupporter
    )
  }));
}

#[tokio::test]
async fn age_boundary_is_calendar_aware() {
  let s = store().await;
  let today = Utc::now().date_naive();

  // Born exactly 18 years and 0 days before today.
  let mut adult = person("Avery", None, "Boundary");
  adult.date_of_birth = today.checked_sub_months(Months::new(216));
  s.create_contact(adult).await.unwrap();

  // Born 17 years and 364 days before today.
  let mut minor = person("Blake", None, "Boundary");
  minor.date_of_birth = today
    .checked_sub_months(Months::new(216))
    .and_then(|d| d.checked_add_days(Days::new(1)));
  s.create_contact(minor).await.unwrap();

  let filter = compile(SearchRequest {
    min_age: Some("18".into()),
    ..Default::default()
  });
  let page = s.search(&filter, 1).await.unwrap();

  assert_eq!(page.total, 1);
  assert_eq!(page.contacts[0].contact.first_name, "Avery");
}

// ─── Search: pagination ──────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_reads_are_idempotent() {
  let s = store().await;
  for i in 0..5 {
    s.create_contact(person(&format!("Voter{i}"), None, "Roll"))
      .await
      .unwrap();
  }

  let filter = compile(SearchRequest::default());
  let first = s.search(&filter, 1).await.unwrap();
  let second = s.search(&filter, 1).await.unwrap();

  assert_eq!(first.total, second.total);
  let ids = |page: &canvass_core::store::SearchPage| {
    page.contacts.iter().map(|c| c.contact.contact_id).collect::<Vec<_>>()
  };
  assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn concatenated_pages_cover_every_contact_exactly_once() {
  let s = store().await;
  let count = 45;
  for i in 0..count {
    s.create_contact(person(&format!("Voter{i}"), None, "Roll"))
      .await
      .unwrap();
  }

  let filter = compile(SearchRequest::default());
  let mut seen = HashSet::new();
  let mut page_no = 1;
  loop {
    let page = s.search(&filter, page_no).await.unwrap();
    assert_eq!(page.total, count as u64);
    if page.contacts.is_empty() {
      break;
    }
    assert!(page.contacts.len() <= PAGE_SIZE);
    for row in &page.contacts {
      assert!(seen.insert(row.contact.contact_id), "row appeared twice");
    }
    page_no += 1;
  }

  assert_eq!(seen.len(), count);
}

#[tokio::test]
async fn page_beyond_the_end_is_empty_with_correct_total() {
  let s = store().await;
  for i in 0..3 {
    s.create_contact(person(&format!("Voter{i}"), None, "Roll"))
      .await
      .unwrap();
  }

  let filter = compile(SearchRequest::default());
  let page = s.search(&filter, 9).await.unwrap();
  assert!(page.contacts.is_empty());
  assert_eq!(page.total, 3);
}

#[tokio::test]
async fn without_name_fragments_freshest_contact_sorts_first() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let gw = gateway(&s);

  let first = s.create_contact(person("Old", None, "News")).await.unwrap();
  let second = s.create_contact(person("Stale", None, "Entry")).await.unwrap();
  // Touch the first contact so it becomes the most recently updated.
  gw.set_field(
    first.contact_id,
    ContactField::Notes,
    Some("spoke at the door".into()),
    editor.user_id,
  )
  .await
  .unwrap();

  let filter = compile(SearchRequest::default());
  let page = s.search(&filter, 1).await.unwrap();

  assert_eq!(page.contacts[0].contact.contact_id, first.contact_id);
  assert_eq!(page.contacts[1].contact.contact_id, second.contact_id);
  assert!(page.contacts.iter().all(|c| c.match_tier.is_none()));
}

// ─── Search: enrichment ──────────────────────────────────────────────────────

#[tokio::test]
async fn enrichment_counts_partition_by_provenance() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let gw = gateway(&s);

  let mut input = person("Jane", None, "Smith");
  input.phones = vec![NewPhone {
    number:     "555-0000".into(),
    kind:       PhoneKind::Home,
    is_primary: true,
    provenance: Provenance::Baseline,
  }];
  let contact = s.create_contact(input).await.unwrap();

  gw.add_phone(contact.contact_id, manual_phone("555-0100"), editor.user_id)
    .await
    .unwrap();

  let filter = compile(SearchRequest {
    last_name: Some("Smith".into()),
    ..Default::default()
  });
  let page = s.search(&filter, 1).await.unwrap();
  let row = &page.contacts[0];

  assert_eq!(row.manual_phone_count, 1);
  assert_eq!(row.baseline_phone_count, 1);
  assert_eq!(row.manual_email_count, 0);
  assert_eq!(row.baseline_email_count, 0);
}

// ─── Gateway: permissions and validation ─────────────────────────────────────

#[tokio::test]
async fn viewer_role_cannot_mutate() {
  let s = store().await;
  let viewer = user(&s, Role::Viewer).await;
  let gw = gateway(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  let err = gw
    .set_field(
      contact.contact_id,
      ContactField::Notes,
      Some("nope".into()),
      viewer.user_id,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Permission(_)));
}

#[tokio::test]
async fn locked_fields_are_rejected_even_for_admin() {
  let s = store().await;
  let admin = user(&s, Role::Admin).await;
  let gw = gateway(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  for field in [
    ContactField::DateOfBirth,
    ContactField::FirstName,
    ContactField::Street,
    ContactField::Zip,
  ] {
    let err = gw
      .set_field(contact.contact_id, field, Some("tampered".into()), admin.user_id)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Permission(_)), "{field:?} must be locked");
  }
}

#[tokio::test]
async fn unknown_acting_user_is_rejected() {
  let s = store().await;
  let gw = gateway(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  let err = gw
    .set_field(
      contact.contact_id,
      ContactField::Notes,
      Some("hi".into()),
      Uuid::new_v4(),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(_)));
}

#[tokio::test]
async fn malformed_inputs_fail_validation() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let gw = gateway(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  let err = gw
    .add_alias(contact.contact_id, "   ".into(), editor.user_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation { field: "alias", .. }));

  let err = gw
    .add_email(
      contact.contact_id,
      NewEmail {
        address:    "not-an-email".into(),
        kind:       EmailKind::Personal,
        is_primary: false,
        provenance: Provenance::Manual,
      },
      editor.user_id,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation { field: "email", .. }));

  let err = gw
    .set_field(
      contact.contact_id,
      ContactField::Notes,
      Some("x".repeat(2_001)),
      editor.user_id,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation { field: "notes", .. }));

  let err = gw
    .set_field(
      contact.contact_id,
      ContactField::SupporterStatus,
      Some("sympathizer".into()),
      editor.user_id,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation { field: "supporterStatus", .. }));
}

#[tokio::test]
async fn mutating_a_missing_contact_is_not_found() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let gw = gateway(&s);

  let err = gw
    .set_field(
      Uuid::new_v4(),
      ContactField::Notes,
      Some("hi".into()),
      editor.user_id,
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ContactNotFound(_)));
}

// ─── Gateway: primary uniqueness ─────────────────────────────────────────────

#[tokio::test]
async fn second_primary_phone_demotes_the_first() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let gw = gateway(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  let first = gw
    .add_phone(
      contact.contact_id,
      NewPhone { is_primary: true, ..manual_phone("555-0001") },
      editor.user_id,
    )
    .await
    .unwrap();
  let second = gw
    .add_phone(
      contact.contact_id,
      NewPhone { is_primary: true, ..manual_phone("555-0002") },
      editor.user_id,
    )
    .await
    .unwrap();

  let profile = s.get_profile(contact.contact_id).await.unwrap().unwrap();
  let primaries: Vec<_> =
    profile.phones.iter().filter(|p| p.is_primary).collect();
  assert_eq!(primaries.len(), 1);
  assert_eq!(primaries[0].phone_id, second.phone_id);
  assert_ne!(primaries[0].phone_id, first.phone_id);
}

// ─── Audit: recording and atomicity ──────────────────────────────────────────

#[tokio::test]
async fn set_field_writes_one_attributed_entry() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let gw = gateway(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  gw.set_field(
    contact.contact_id,
    ContactField::SupporterStatus,
    Some("likely-supporter".into()),
    editor.user_id,
  )
  .await
  .unwrap();

  let log = s.list_audit(contact.contact_id).await.unwrap();
  assert_eq!(log.len(), 1);
  let entry = &log[0];
  assert_eq!(entry.entry.field, "supporter_status");
  assert_eq!(entry.entry.action, AuditAction::Update);
  assert_eq!(entry.entry.old_value.as_deref(), Some("unknown"));
  assert_eq!(entry.entry.new_value.as_deref(), Some("likely-supporter"));
  assert_eq!(entry.user.first_name, "Pat");
}

#[tokio::test]
async fn failed_audit_write_rolls_back_the_field_write() {
  let s = store().await;
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  // Bypass the gateway with an acting user that does not exist: the audit
  // insert hits the users foreign key and the transaction rolls back.
  let err = s
    .write_field(
      contact.contact_id,
      Uuid::new_v4(),
      ContactField::SupporterStatus,
      Some("opposition".into()),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Store(_)));

  let after = s.get_contact(contact.contact_id).await.unwrap().unwrap();
  assert_eq!(after.supporter_status, SupporterStatus::Unknown);
  assert_eq!(after.updated_at, contact.updated_at);
  assert!(s.list_audit(contact.contact_id).await.unwrap().is_empty());
}

// ─── Audit: undo ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn undo_restores_the_previous_value_and_appends_an_entry() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let admin = user(&s, Role::Admin).await;
  let gw = gateway(&s);
  let rec = recorder(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  gw.set_field(
    contact.contact_id,
    ContactField::Party,
    Some("D".into()),
    editor.user_id,
  )
  .await
  .unwrap();

  let entry_id = s.list_audit(contact.contact_id).await.unwrap()[0].entry.entry_id;
  let reversal = rec.undo(entry_id, admin.user_id).await.unwrap();

  assert_eq!(reversal.new_value, None);
  assert_eq!(reversal.old_value.as_deref(), Some("D"));

  let after = s.get_contact(contact.contact_id).await.unwrap().unwrap();
  assert_eq!(after.party, None);

  // History keeps both: the original entry and the compensating one.
  let log = s.list_audit(contact.contact_id).await.unwrap();
  assert_eq!(log.len(), 2);
}

#[tokio::test]
async fn undo_requires_admin() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let gw = gateway(&s);
  let rec = recorder(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  gw.set_field(
    contact.contact_id,
    ContactField::Party,
    Some("D".into()),
    editor.user_id,
  )
  .await
  .unwrap();
  let entry_id = s.list_audit(contact.contact_id).await.unwrap()[0].entry.entry_id;

  let err = rec.undo(entry_id, editor.user_id).await.unwrap_err();
  assert!(matches!(err, Error::Permission(_)));
}

#[tokio::test]
async fn undo_of_a_missing_entry_is_not_found() {
  let s = store().await;
  let admin = user(&s, Role::Admin).await;
  let rec = recorder(&s);

  let err = rec.undo(Uuid::new_v4(), admin.user_id).await.unwrap_err();
  assert!(matches!(err, Error::EntryNotFound(_)));
}

#[tokio::test]
async fn stale_undo_is_a_conflict() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let admin = user(&s, Role::Admin).await;
  let gw = gateway(&s);
  let rec = recorder(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  gw.set_field(
    contact.contact_id,
    ContactField::Party,
    Some("D".into()),
    editor.user_id,
  )
  .await
  .unwrap();
  let stale_entry =
    s.list_audit(contact.contact_id).await.unwrap()[0].entry.entry_id;

  // A later entry for the same field makes the first one stale.
  gw.set_field(
    contact.contact_id,
    ContactField::Party,
    Some("I".into()),
    editor.user_id,
  )
  .await
  .unwrap();

  let err = rec.undo(stale_entry, admin.user_id).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn undoing_an_undo_of_the_same_entry_conflicts() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let admin = user(&s, Role::Admin).await;
  let gw = gateway(&s);
  let rec = recorder(&s);
  let contact = s.create_contact(person("Jane", None, "Smith")).await.unwrap();

  gw.set_field(
    contact.contact_id,
    ContactField::Party,
    Some("D".into()),
    editor.user_id,
  )
  .await
  .unwrap();
  let entry_id = s.list_audit(contact.contact_id).await.unwrap()[0].entry.entry_id;

  rec.undo(entry_id, admin.user_id).await.unwrap();
  // The compensating entry is now the newest for the field.
  let err = rec.undo(entry_id, admin.user_id).await.unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

// ─── End-to-end: the Jane Q. Smith scenario ──────────────────────────────────

#[tokio::test]
async fn phone_add_search_enrichment_and_undo_round_trip() {
  let s = store().await;
  let editor = user(&s, Role::Editor).await;
  let admin = user(&s, Role::Admin).await;
  let gw = gateway(&s);
  let rec = recorder(&s);

  let mut input = person("Jane", Some("Q"), "Smith");
  input.aliases = vec!["Janie".into()];
  let contact = s.create_contact(input).await.unwrap();

  // Editor adds a manual mobile phone.
  gw.add_phone(contact.contact_id, manual_phone("555-0100"), editor.user_id)
    .await
    .unwrap();

  let log = s.list_audit(contact.contact_id).await.unwrap();
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].entry.field, "phone");
  assert_eq!(log[0].entry.action, AuditAction::Create);

  // Search by first name sees the manual count.
  let filter = compile(SearchRequest {
    first_name: Some("Jane".into()),
    ..Default::default()
  });
  let page = s.search(&filter, 1).await.unwrap();
  assert_eq!(page.total, 1);
  assert_eq!(page.contacts[0].manual_phone_count, 1);
  assert_eq!(page.contacts[0].baseline_phone_count, 0);

  // Searching by the alias finds her too.
  let alias_filter = compile(SearchRequest {
    first_name: Some("Janie".into()),
    ..Default::default()
  });
  let alias_page = s.search(&alias_filter, 1).await.unwrap();
  assert_eq!(alias_page.total, 1);

  // Admin reverses the phone add.
  rec
    .undo(log[0].entry.entry_id, admin.user_id)
    .await
    .unwrap();

  let profile = s.get_profile(contact.contact_id).await.unwrap().unwrap();
  assert!(profile.phones.is_empty());

  let log = s.list_audit(contact.contact_id).await.unwrap();
  assert_eq!(log.len(), 2);
  assert_eq!(log[0].entry.action, AuditAction::Delete);

  let page = s.search(&filter, 1).await.unwrap();
  assert_eq!(page.contacts[0].manual_phone_count, 0);
}
