//! Identity: the resolved caller of a request.
//!
//! Produced once per request by the authentication layer and treated as an
//! immutable value from then on. Nothing below the HTTP boundary inspects how
//! the credential was presented.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access tier of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  User,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::User => "user",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "admin" => Some(Self::Admin),
      "user" => Some(Self::User),
      _ => None,
    }
  }
}

/// The authenticated subject of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  pub subject_id: Uuid,
  pub role:       Role,
}

impl Identity {
  pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}
