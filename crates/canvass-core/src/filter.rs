//! Filter compilation — a structured search request becomes one
//! self-contained, re-evaluable predicate.
//!
//! Numeric and enum inputs arrive from free-text UI fields, so unparsable
//! values compile to wildcards rather than errors. Nickname-equivalence
//! classes are expanded into the compiled filter here, so evaluating it later
//! (on any page) needs nothing but the filter and the page number.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  contact::SupporterStatus,
  matcher::{NameFragment, NameQuery, NicknameTable},
};

// ─── Request ─────────────────────────────────────────────────────────────────

/// The wire shape of a search request. Everything optional; ages arrive as
/// free text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
  /// 1-based page number; defaults to 1.
  pub page:             Option<u32>,
  /// Accepted for interface compatibility; the page size is fixed at
  /// [`crate::store::PAGE_SIZE`].
  pub limit:            Option<u32>,
  pub first_name:       Option<String>,
  pub middle_name:      Option<String>,
  pub last_name:        Option<String>,
  pub city:             Option<String>,
  pub zip_code:         Option<String>,
  pub party:            Option<String>,
  /// Comma-joined supporter-status names, e.g.
  /// `confirmed-supporter,likely-supporter`.
  pub supporter_status: Option<String>,
  /// Comma-joined quick-filter names, e.g. `supporters`.
  pub quick_filters:    Option<String>,
  pub min_age:          Option<String>,
  pub max_age:          Option<String>,
}

// ─── Quick filters ───────────────────────────────────────────────────────────

/// A named, predefined filter toggle expanding to a supporter-status set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickFilter {
  /// Canonically: confirmed **and** likely supporters.
  Supporters,
  Opposition,
  Unknown,
}

impl QuickFilter {
  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "supporters" => Some(Self::Supporters),
      "opposition" => Some(Self::Opposition),
      "unknown" => Some(Self::Unknown),
      _ => None,
    }
  }

  /// The statuses this toggle expands to (OR-combined within the set).
  pub fn expansion(&self) -> &'static [SupporterStatus] {
    match self {
      Self::Supporters => {
        &[SupporterStatus::ConfirmedSupporter, SupporterStatus::LikelySupporter]
      }
      Self::Opposition => &[SupporterStatus::Opposition],
      Self::Unknown => &[SupporterStatus::Unknown],
    }
  }
}

// ─── Compiled filter ─────────────────────────────────────────────────────────

/// The compiled predicate. AND across categories; OR within the status set.
///
/// Fully self-contained: re-running `search(filter, page)` for any page needs
/// nothing but this value and the page number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactFilter {
  pub name:     NameQuery,
  /// Normalized lowercase; matched against `LOWER(city)`.
  pub city:     Option<String>,
  pub zip:      Option<String>,
  /// Normalized uppercase; exact-code match, never prefix.
  pub party:    Option<String>,
  /// `None` is a wildcard; a set is OR-combined.
  pub statuses: Option<BTreeSet<SupporterStatus>>,
  pub min_age:  Option<u32>,
  pub max_age:  Option<u32>,
}

fn non_empty(raw: &Option<String>) -> Option<&str> {
  raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Lenient numeric parse: unparsable input is a wildcard, not an error.
fn parse_age(raw: &Option<String>) -> Option<u32> {
  non_empty(raw)?.parse().ok()
}

impl ContactFilter {
  /// Compile a request. Never fails: malformed numerics and unknown status
  /// or quick-filter names degrade to wildcards / are ignored.
  pub fn compile(req: &SearchRequest, nicknames: &NicknameTable) -> Self {
    let fragment = |raw: &Option<String>| {
      raw.as_deref().and_then(|s| NameFragment::compile(s, nicknames))
    };

    let name = NameQuery {
      first:  fragment(&req.first_name),
      middle: fragment(&req.middle_name),
      last:   fragment(&req.last_name),
    };

    // Party is exact-code; empty or "all" is a wildcard.
    let party = non_empty(&req.party)
      .map(str::to_uppercase)
      .filter(|p| p != "ALL");

    // Explicit status list and quick-filter expansions union into one set.
    let mut statuses: BTreeSet<SupporterStatus> = BTreeSet::new();
    if let Some(list) = non_empty(&req.supporter_status) {
      statuses.extend(
        list.split(',').filter_map(|s| SupporterStatus::parse(s.trim())),
      );
    }
    if let Some(list) = non_empty(&req.quick_filters) {
      for qf in list.split(',').filter_map(|s| QuickFilter::parse(s.trim())) {
        statuses.extend(qf.expansion().iter().copied());
      }
    }

    Self {
      name,
      city: non_empty(&req.city).map(str::to_lowercase),
      zip: non_empty(&req.zip_code).map(str::to_owned),
      party,
      statuses: (!statuses.is_empty()).then_some(statuses),
      min_age: parse_age(&req.min_age),
      max_age: parse_age(&req.max_age),
    }
  }

  /// Whether a contact's date of birth satisfies the age bounds on `today`.
  ///
  /// Contacts without a date of birth never satisfy a present bound.
  pub fn matches_age(&self, dob: Option<NaiveDate>, today: NaiveDate) -> bool {
    if self.min_age.is_none() && self.max_age.is_none() {
      return true;
    }
    let Some(dob) = dob else { return false };
    let age = age_on(dob, today);
    if age < 0 {
      return false;
    }
    let age = age as u32;
    self.min_age.is_none_or(|min| age >= min)
      && self.max_age.is_none_or(|max| age <= max)
  }
}

/// Calendar-aware age: year difference, minus one if the birthday has not yet
/// occurred this year. Not elapsed-days division.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
  use chrono::Datelike;
  let mut age = today.year() - dob.year();
  if (today.month(), today.day()) < (dob.month(), dob.day()) {
    age -= 1;
  }
  age
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn compile(req: SearchRequest) -> ContactFilter {
    ContactFilter::compile(&req, &NicknameTable::with_defaults())
  }

  #[test]
  fn age_on_the_exact_birthday() {
    let today = ymd(2026, 8, 6);
    assert_eq!(age_on(ymd(2008, 8, 6), today), 18);
    assert_eq!(age_on(ymd(2008, 8, 7), today), 17);
    assert_eq!(age_on(ymd(2008, 12, 31), today), 17);
    assert_eq!(age_on(ymd(2008, 1, 1), today), 18);
  }

  #[test]
  fn min_age_includes_the_boundary_day() {
    let filter = compile(SearchRequest {
      min_age: Some("18".into()),
      ..Default::default()
    });
    let today = ymd(2026, 8, 6);

    // Born exactly 18 years and 0 days ago: included.
    assert!(filter.matches_age(Some(ymd(2008, 8, 6)), today));
    // Born 17 years 364 days ago: excluded.
    assert!(!filter.matches_age(Some(ymd(2008, 8, 7)), today));
  }

  #[test]
  fn missing_dob_fails_a_present_bound_only() {
    let bounded = compile(SearchRequest {
      max_age: Some("65".into()),
      ..Default::default()
    });
    assert!(!bounded.matches_age(None, ymd(2026, 8, 6)));

    let unbounded = compile(SearchRequest::default());
    assert!(unbounded.matches_age(None, ymd(2026, 8, 6)));
  }

  #[test]
  fn non_numeric_ages_compile_to_wildcards() {
    let filter = compile(SearchRequest {
      min_age: Some("abc".into()),
      max_age: Some(" ".into()),
      ..Default::default()
    });
    assert_eq!(filter.min_age, None);
    assert_eq!(filter.max_age, None);
  }

  #[test]
  fn party_is_exact_code_with_all_as_wildcard() {
    let filter = compile(SearchRequest {
      party: Some("d".into()),
      ..Default::default()
    });
    assert_eq!(filter.party.as_deref(), Some("D"));

    let wildcard = compile(SearchRequest {
      party: Some("all".into()),
      ..Default::default()
    });
    assert_eq!(wildcard.party, None);
  }

  #[test]
  fn supporters_quick_filter_expands_to_both_supporter_statuses() {
    let filter = compile(SearchRequest {
      quick_filters: Some("supporters".into()),
      ..Default::default()
    });
    let statuses = filter.statuses.unwrap();
    assert!(statuses.contains(&SupporterStatus::ConfirmedSupporter));
    assert!(statuses.contains(&SupporterStatus::LikelySupporter));
    assert_eq!(statuses.len(), 2);
  }

  #[test]
  fn explicit_statuses_and_quick_filters_union() {
    let filter = compile(SearchRequest {
      supporter_status: Some("opposition".into()),
      quick_filters: Some("supporters".into()),
      ..Default::default()
    });
    assert_eq!(filter.statuses.unwrap().len(), 3);
  }

  #[test]
  fn unknown_status_and_quick_filter_names_are_ignored() {
    let filter = compile(SearchRequest {
      supporter_status: Some("sympathizer,opposition".into()),
      quick_filters: Some("bogus".into()),
      ..Default::default()
    });
    let statuses = filter.statuses.unwrap();
    assert_eq!(statuses.len(), 1);
    assert!(statuses.contains(&SupporterStatus::Opposition));
  }

  #[test]
  fn name_fragments_carry_their_equivalence_class() {
    let filter = compile(SearchRequest {
      first_name: Some("Bill".into()),
      ..Default::default()
    });
    let frag = filter.name.first.unwrap();
    assert_eq!(frag.fragment, "bill");
    assert!(frag.equivalents.iter().any(|e| e == "william"));
  }
}
