//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings so that they sort
//! lexically. Documents are stored as compact JSON. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use devlink_core::{
  profile::{Profile, ProfileView},
  user::{User, UserSummary},
};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Documents ────────────────────────────────────────────────────────────────

pub fn encode_doc<T: Serialize>(doc: &T) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

pub fn decode_doc<T: DeserializeOwned>(s: &str) -> Result<T> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub name:          String,
  pub email:         String,
  pub password_hash: String,
  pub avatar:        String,
  pub created_at:    String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      name:          row.get(1)?,
      email:         row.get(2)?,
      password_hash: row.get(3)?,
      avatar:        row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      name:          self.name,
      email:         self.email,
      password_hash: self.password_hash,
      avatar:        self.avatar,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// A profile document joined with the owning `users` row.
pub struct RawProfileView {
  pub doc:        String,
  pub user_id:    String,
  pub name:       String,
  pub avatar:     String,
  pub created_at: String,
}

impl RawProfileView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      doc:        row.get(0)?,
      user_id:    row.get(1)?,
      name:       row.get(2)?,
      avatar:     row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_view(self) -> Result<ProfileView> {
    let profile: Profile = decode_doc(&self.doc)?;
    Ok(ProfileView {
      profile,
      user: UserSummary {
        user_id:    decode_uuid(&self.user_id)?,
        name:       self.name,
        avatar:     self.avatar,
        created_at: decode_dt(&self.created_at)?,
      },
    })
  }
}
