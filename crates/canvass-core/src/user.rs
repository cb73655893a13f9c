//! Volunteer accounts — the acting identity behind every mutation.
//!
//! Session establishment is an external collaborator; this crate only needs
//! a user's role for permission checks and their name for audit attribution.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Editor,
  Viewer,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Editor => "editor",
      Self::Viewer => "viewer",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "admin" => Some(Self::Admin),
      "editor" => Some(Self::Editor),
      "viewer" => Some(Self::Viewer),
      _ => None,
    }
  }

  /// Whether this role may write through the mutation gateway.
  pub fn can_edit(&self) -> bool { matches!(self, Self::Admin | Self::Editor) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub user_id:    Uuid,
  pub first_name: String,
  pub last_name:  String,
  pub role:       Role,
}

/// Input to [`crate::store::RosterStore::add_user`].
/// `user_id` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub first_name: String,
  pub last_name:  String,
  pub role:       Role,
}
