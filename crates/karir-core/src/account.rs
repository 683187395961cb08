//! User accounts and login sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{Identity, Role};

/// A login account. The password hash never leaves the store through this
/// type; see [`UserCredentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub username:   String,
  pub email:      String,
  pub role:       Role,
  pub created_at: DateTime<Utc>,
}

impl User {
  pub fn identity(&self) -> Identity {
    Identity { subject_id: self.user_id, role: self.role }
  }
}

/// Input to [`crate::store::CareerStore::add_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub role:          Role,
}

/// A user together with the stored password hash, used only for login.
#[derive(Debug, Clone)]
pub struct UserCredentials {
  pub user:          User,
  pub password_hash: String,
}

/// An issued bearer session. Only the SHA-256 digest of the token is kept.
#[derive(Debug, Clone)]
pub struct Session {
  /// Lowercase hex SHA-256 of the raw bearer token.
  pub token_hash: String,
  pub user_id:    Uuid,
  pub issued_at:  DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}
