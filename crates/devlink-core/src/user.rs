//! User accounts.
//!
//! A user is created at signup and read at login and profile fetch. The
//! password hash never leaves the server: it is skipped on serialisation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub name:          String,
  /// Unique across all users; stored lowercased.
  pub email:         String,
  /// Argon2 PHC string, e.g. `$argon2id$v=19$…`
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub avatar:        String,
  pub created_at:    DateTime<Utc>,
}

impl User {
  pub fn summary(&self) -> UserSummary {
    UserSummary {
      user_id:    self.user_id,
      name:       self.name.clone(),
      avatar:     self.avatar.clone(),
      created_at: self.created_at,
    }
  }
}

/// Input for [`DevlinkStore::insert_user`](crate::store::DevlinkStore::insert_user).
/// The id and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub avatar:        String,
}

/// The public face of a user, safe to show to anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
  pub user_id:    Uuid,
  pub name:       String,
  pub avatar:     String,
  pub created_at: DateTime<Utc>,
}
