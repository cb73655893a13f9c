//! Name matching — fuzzy, multi-field comparison of query fragments against
//! a contact's canonical name and alias set.
//!
//! Matching is field-independent and AND-combined: every non-empty fragment
//! must find a hit on its own field, or the contact is out. Each hit carries
//! a [`MatchTier`]; the contact's overall tier is the weakest of its fields,
//! so a contact matching every fragment exactly outranks one carried by a
//! prefix.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ─── Normalization ───────────────────────────────────────────────────────────

/// Canonical comparison form: trimmed, Unicode-lowercased.
pub fn normalize(s: &str) -> String { s.trim().to_lowercase() }

// ─── Match tier ──────────────────────────────────────────────────────────────

/// Ranked matching strength. Smaller sorts first (strongest).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchTier {
  /// Exact case-insensitive equality on the canonical name field.
  Exact,
  /// Exact match against one of the contact's aliases.
  Alias,
  /// The fragment and the canonical name share a nickname-equivalence class.
  Nickname,
  /// The canonical name starts with the fragment.
  Prefix,
}

// ─── Nickname table ──────────────────────────────────────────────────────────

/// Bidirectional nickname-equivalence lookup ("bill" ↔ "william").
///
/// Built from pairs; pairs sharing a member merge into one class, so
/// ("liz", "elizabeth") + ("beth", "elizabeth") puts all three names in a
/// single class. Injected into the filter compiler rather than baked into
/// match logic, so the table can grow without touching the matcher.
#[derive(Debug, Clone, Default)]
pub struct NicknameTable {
  classes: Vec<Vec<String>>,
  index:   HashMap<String, usize>,
}

impl NicknameTable {
  pub fn new() -> Self { Self::default() }

  /// Build a table from bidirectional pairs.
  pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
    let mut table = Self::new();
    for (a, b) in pairs {
      table.link(a, b);
    }
    table
  }

  /// A modest built-in table covering common American given names.
  pub fn with_defaults() -> Self {
    Self::from_pairs([
      ("bill", "william"),
      ("will", "william"),
      ("billy", "william"),
      ("bob", "robert"),
      ("rob", "robert"),
      ("bobby", "robert"),
      ("dick", "richard"),
      ("rick", "richard"),
      ("rich", "richard"),
      ("jim", "james"),
      ("jimmy", "james"),
      ("jamie", "james"),
      ("jack", "john"),
      ("johnny", "john"),
      ("jon", "jonathan"),
      ("mike", "michael"),
      ("tom", "thomas"),
      ("tommy", "thomas"),
      ("tony", "anthony"),
      ("dan", "daniel"),
      ("danny", "daniel"),
      ("dave", "david"),
      ("steve", "steven"),
      ("steve", "stephen"),
      ("chris", "christopher"),
      ("chris", "christine"),
      ("chris", "christina"),
      ("matt", "matthew"),
      ("joe", "joseph"),
      ("joey", "joseph"),
      ("chuck", "charles"),
      ("charlie", "charles"),
      ("ed", "edward"),
      ("eddie", "edward"),
      ("ted", "theodore"),
      ("ken", "kenneth"),
      ("kenny", "kenneth"),
      ("ron", "ronald"),
      ("ronnie", "ronald"),
      ("larry", "lawrence"),
      ("jerry", "gerald"),
      ("greg", "gregory"),
      ("sam", "samuel"),
      ("sam", "samantha"),
      ("ben", "benjamin"),
      ("alex", "alexander"),
      ("alex", "alexandra"),
      ("andy", "andrew"),
      ("drew", "andrew"),
      ("nick", "nicholas"),
      ("pat", "patrick"),
      ("pat", "patricia"),
      ("patty", "patricia"),
      ("trish", "patricia"),
      ("liz", "elizabeth"),
      ("beth", "elizabeth"),
      ("betty", "elizabeth"),
      ("eliza", "elizabeth"),
      ("peggy", "margaret"),
      ("meg", "margaret"),
      ("maggie", "margaret"),
      ("kate", "katherine"),
      ("katie", "katherine"),
      ("kathy", "katherine"),
      ("kate", "kathleen"),
      ("sue", "susan"),
      ("susie", "susan"),
      ("barb", "barbara"),
      ("debbie", "deborah"),
      ("deb", "deborah"),
      ("jen", "jennifer"),
      ("jenny", "jennifer"),
      ("jess", "jessica"),
      ("becky", "rebecca"),
      ("vicky", "victoria"),
      ("sandy", "sandra"),
      ("mandy", "amanda"),
      ("abby", "abigail"),
      ("nan", "nancy"),
      ("janie", "jane"),
      ("fred", "frederick"),
      ("frank", "francis"),
      ("hank", "henry"),
      ("harry", "harold"),
      ("ray", "raymond"),
      ("don", "donald"),
      ("donny", "donald"),
      ("walt", "walter"),
      ("gus", "augustus"),
      ("abe", "abraham"),
    ])
  }

  /// Merge `a` and `b` (normalized) into one equivalence class.
  pub fn link(&mut self, a: &str, b: &str) {
    let a = normalize(a);
    let b = normalize(b);
    if a.is_empty() || b.is_empty() {
      return;
    }

    match (self.index.get(&a).copied(), self.index.get(&b).copied()) {
      (Some(ca), Some(cb)) if ca == cb => {}
      (Some(ca), Some(cb)) => {
        // Merge the smaller-indexed class into the larger-indexed one's slot.
        let moved = std::mem::take(&mut self.classes[cb]);
        for name in &moved {
          self.index.insert(name.clone(), ca);
        }
        self.classes[ca].extend(moved);
      }
      (Some(ca), None) => {
        self.classes[ca].push(b.clone());
        self.index.insert(b, ca);
      }
      (None, Some(cb)) => {
        self.classes[cb].push(a.clone());
        self.index.insert(a, cb);
      }
      (None, None) => {
        let idx = self.classes.len();
        self.classes.push(vec![a.clone(), b.clone()]);
        self.index.insert(a, idx);
        self.index.insert(b, idx);
      }
    }
  }

  /// The full equivalence class containing `name`, including `name` itself.
  /// Empty if the name has no known nicknames.
  pub fn equivalents(&self, name: &str) -> &[String] {
    match self.index.get(&normalize(name)) {
      Some(&idx) => &self.classes[idx],
      None => &[],
    }
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// One compiled name-field fragment: the normalized query text plus its
/// nickname-equivalence class, expanded at compile time so evaluation needs
/// no table access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameFragment {
  pub fragment:    String,
  pub equivalents: Vec<String>,
}

impl NameFragment {
  /// Compile a raw query field. Returns `None` (wildcard) for empty or
  /// whitespace-only input.
  pub fn compile(raw: &str, nicknames: &NicknameTable) -> Option<Self> {
    let fragment = normalize(raw);
    if fragment.is_empty() {
      return None;
    }
    let equivalents = nicknames.equivalents(&fragment).to_vec();
    Some(Self { fragment, equivalents })
  }
}

/// The compiled per-field name query. `None` fields are wildcards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameQuery {
  pub first:  Option<NameFragment>,
  pub middle: Option<NameFragment>,
  pub last:   Option<NameFragment>,
}

impl NameQuery {
  /// True when every field is a wildcard (no name filtering at all).
  pub fn is_empty(&self) -> bool {
    self.first.is_none() && self.middle.is_none() && self.last.is_none()
  }
}

/// The candidate side of a match: one contact's canonical name fields plus
/// its alias strings (raw, un-normalized).
#[derive(Debug, Clone, Copy)]
pub struct NameTarget<'a> {
  pub first:   &'a str,
  pub middle:  Option<&'a str>,
  pub last:    &'a str,
  pub aliases: &'a [String],
}

// ─── Matching ────────────────────────────────────────────────────────────────

/// Match one fragment against one canonical field and the alias set.
///
/// `None` means the fragment matched nothing on this field — which fails the
/// whole contact, regardless of the other fields.
fn field_tier(
  frag: &NameFragment,
  canonical: Option<&str>,
  aliases: &[String],
) -> Option<MatchTier> {
  let canonical = canonical.map(normalize);

  if canonical.as_deref() == Some(frag.fragment.as_str()) {
    return Some(MatchTier::Exact);
  }
  if aliases.iter().any(|a| normalize(a) == frag.fragment) {
    return Some(MatchTier::Alias);
  }
  if let Some(c) = &canonical {
    if c != &frag.fragment && frag.equivalents.iter().any(|e| e == c) {
      return Some(MatchTier::Nickname);
    }
    if c.starts_with(&frag.fragment) {
      return Some(MatchTier::Prefix);
    }
  }
  None
}

/// Decide MATCH/NO-MATCH for a contact and return the ordering tier.
///
/// Returns `None` when any non-wildcard fragment finds no hit on its field.
/// An all-wildcard query matches everything at [`MatchTier::Exact`]; callers
/// normally skip matching entirely in that case.
pub fn match_name(query: &NameQuery, target: &NameTarget<'_>) -> Option<MatchTier> {
  let mut weakest = MatchTier::Exact;

  let fields = [
    (&query.first, Some(target.first)),
    (&query.middle, target.middle),
    (&query.last, Some(target.last)),
  ];

  for (frag, canonical) in fields {
    if let Some(frag) = frag {
      let tier = field_tier(frag, canonical, target.aliases)?;
      weakest = weakest.max(tier);
    }
  }

  Some(weakest)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn table() -> NicknameTable { NicknameTable::with_defaults() }

  fn query(
    first: &str,
    middle: &str,
    last: &str,
    nicknames: &NicknameTable,
  ) -> NameQuery {
    NameQuery {
      first:  NameFragment::compile(first, nicknames),
      middle: NameFragment::compile(middle, nicknames),
      last:   NameFragment::compile(last, nicknames),
    }
  }

  fn target<'a>(
    first: &'a str,
    middle: Option<&'a str>,
    last: &'a str,
    aliases: &'a [String],
  ) -> NameTarget<'a> {
    NameTarget { first, middle, last, aliases }
  }

  #[test]
  fn tier_ordering_strongest_first() {
    assert!(MatchTier::Exact < MatchTier::Alias);
    assert!(MatchTier::Alias < MatchTier::Nickname);
    assert!(MatchTier::Nickname < MatchTier::Prefix);
  }

  #[test]
  fn exact_match_is_case_insensitive() {
    let t = table();
    let q = query("JANE", "", "smith", &t);
    let tier = match_name(&q, &target("Jane", None, "Smith", &[]));
    assert_eq!(tier, Some(MatchTier::Exact));
  }

  #[test]
  fn empty_fragments_are_wildcards() {
    let t = table();
    let q = query("", "  ", "smith", &t);
    let tier = match_name(&q, &target("Anyone", Some("Q"), "Smith", &[]));
    assert_eq!(tier, Some(MatchTier::Exact));
  }

  #[test]
  fn alias_match_when_canonical_differs() {
    let t = table();
    let q = query("janie", "", "", &t);
    let aliases = vec!["Janie".to_string()];
    let tier = match_name(&q, &target("Jane", None, "Smith", &aliases));
    // "janie" ↔ "jane" is also in the default nickname table, but the alias
    // hit is the stronger tier and must win.
    assert_eq!(tier, Some(MatchTier::Alias));
  }

  #[test]
  fn nickname_equivalence_matches_both_directions() {
    let t = table();

    let q = query("bill", "", "", &t);
    let tier = match_name(&q, &target("William", None, "Yates", &[]));
    assert_eq!(tier, Some(MatchTier::Nickname));

    let q = query("william", "", "", &t);
    let tier = match_name(&q, &target("Bill", None, "Yates", &[]));
    assert_eq!(tier, Some(MatchTier::Nickname));
  }

  #[test]
  fn pairs_sharing_a_member_merge_into_one_class() {
    let t = NicknameTable::from_pairs([("liz", "elizabeth"), ("beth", "elizabeth")]);
    let class = t.equivalents("liz");
    assert!(class.iter().any(|n| n == "beth"));
    assert!(class.iter().any(|n| n == "elizabeth"));
  }

  #[test]
  fn prefix_match_is_the_weakest_tier() {
    let t = table();
    let q = query("smi", "", "", &t);
    let tier = match_name(&q, &target("Smith", None, "Jones", &[]));
    assert_eq!(tier, Some(MatchTier::Prefix));
  }

  #[test]
  fn fails_closed_when_one_field_misses() {
    let t = table();
    // First name matches exactly, but the middle fragment has nothing to
    // match against: the whole contact is out.
    let q = query("jane", "q", "", &t);
    let tier = match_name(&q, &target("Jane", None, "Smith", &[]));
    assert_eq!(tier, None);
  }

  #[test]
  fn overall_tier_is_the_weakest_field() {
    let t = table();
    let q = query("jane", "", "smi", &t);
    let tier = match_name(&q, &target("Jane", None, "Smith", &[]));
    assert_eq!(tier, Some(MatchTier::Prefix));
  }

  #[test]
  fn unknown_name_has_no_equivalents() {
    let t = table();
    assert!(t.equivalents("zorblatt").is_empty());
  }
}
