//! [`SqliteStore`], the SQLite implementation of [`DevlinkStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{ErrorCode, OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use devlink_core::{
  post::{NewPost, Post},
  profile::{Profile, ProfileView},
  store::DevlinkStore,
  user::{NewUser, User},
};

use crate::{
  encode::{RawProfileView, RawUser, decode_doc, encode_doc, encode_dt, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

const USER_COLUMNS: &str =
  "user_id, name, email, password_hash, avatar, created_at";

const PROFILE_VIEW_SELECT: &str =
  "SELECT p.doc, u.user_id, u.name, u.avatar, u.created_at
   FROM profiles p
   JOIN users u ON u.user_id = p.user_id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Devlink store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
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
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  async fn query_user(&self, column: &'static str, value: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1"),
            rusqlite::params![value],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

/// Carry a store error out of a `conn.call` closure.
fn call_error(e: Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}

fn is_constraint_violation(e: &tokio_rusqlite::Error) -> bool {
  matches!(
    e,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
      if f.code == ErrorCode::ConstraintViolation
  )
}

// ─── DevlinkStore impl ───────────────────────────────────────────────────────

impl DevlinkStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      name:          input.name,
      email:         input.email.trim().to_lowercase(),
      password_hash: input.password_hash,
      avatar:        input.avatar,
      created_at:    Utc::now(),
    };

    let id_str    = encode_uuid(user.user_id);
    let at_str    = encode_dt(user.created_at);
    let name      = user.name.clone();
    let email     = user.email.clone();
    let hash      = user.password_hash.clone();
    let avatar    = user.avatar.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, email, password_hash, avatar, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, email, hash, avatar, at_str],
        )?;
        Ok(())
      })
      .await;

    match inserted {
      Ok(()) => Ok(user),
      Err(e) if is_constraint_violation(&e) => Err(Error::EmailTaken(user.email)),
      Err(e) => Err(e.into()),
    }
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.query_user("user_id", encode_uuid(id)).await
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    self.query_user("email", email.trim().to_lowercase()).await
  }

  async fn delete_account(&self, user_id: Uuid) -> Result<usize> {
    let id_str = encode_uuid(user_id);
    let posts = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let posts = tx.execute(
          "DELETE FROM posts WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM profiles WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.execute(
          "DELETE FROM users WHERE user_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(posts)
      })
      .await?;
    Ok(posts)
  }

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(user_id);
    let doc: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT doc FROM profiles WHERE user_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    doc.as_deref().map(decode_doc).transpose()
  }

  async fn get_profile_view(&self, user_id: Uuid) -> Result<Option<ProfileView>> {
    let id_str = encode_uuid(user_id);
    let raw: Option<RawProfileView> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("{PROFILE_VIEW_SELECT} WHERE p.user_id = ?1"),
            rusqlite::params![id_str],
            RawProfileView::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProfileView::into_view).transpose()
  }

  async fn list_profile_views(&self) -> Result<Vec<ProfileView>> {
    let raws: Vec<RawProfileView> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("{PROFILE_VIEW_SELECT} ORDER BY u.name"))?;
        let rows = stmt
          .query_map([], RawProfileView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProfileView::into_view).collect()
  }

  async fn insert_profile(&self, profile: &Profile) -> Result<bool> {
    let id_str = encode_uuid(profile.user_id);
    let at_str = encode_dt(profile.updated_at);
    let doc    = encode_doc(profile)?;

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO profiles (user_id, doc, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(user_id) DO NOTHING",
          rusqlite::params![id_str, doc, at_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn update_profile<F>(
    &self,
    user_id: Uuid,
    apply: F,
  ) -> Result<Option<devlink_core::Result<Profile>>>
  where
    F: FnOnce(&mut Profile) -> devlink_core::Result<()> + Send + 'static,
  {
    let id_str = encode_uuid(user_id);
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let doc: Option<String> = tx
          .query_row(
            "SELECT doc FROM profiles WHERE user_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(doc) = doc else { return Ok(None) };

        let mut profile: Profile = decode_doc(&doc).map_err(call_error)?;
        if let Err(e) = apply(&mut profile) {
          return Ok(Some(Err(e)));
        }

        tx.execute(
          "UPDATE profiles SET doc = ?2, updated_at = ?3 WHERE user_id = ?1",
          rusqlite::params![
            id_str,
            encode_doc(&profile).map_err(call_error)?,
            encode_dt(profile.updated_at)
          ],
        )?;
        tx.commit()?;
        Ok(Some(Ok(profile)))
      })
      .await?;
    Ok(outcome)
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn insert_post(&self, input: NewPost) -> Result<Post> {
    let post = Post {
      post_id:    Uuid::new_v4(),
      user_id:    input.user_id,
      text:       input.text,
      name:       input.name,
      avatar:     input.avatar,
      likes:      Vec::new(),
      comments:   Vec::new(),
      created_at: Utc::now(),
    };

    let post_id_str = encode_uuid(post.post_id);
    let user_id_str = encode_uuid(post.user_id);
    let at_str      = encode_dt(post.created_at);
    let doc         = encode_doc(&post)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (post_id, user_id, created_at, doc) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![post_id_str, user_id_str, at_str, doc],
        )?;
        Ok(())
      })
      .await?;

    Ok(post)
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);
    let doc: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT doc FROM posts WHERE post_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    doc.as_deref().map(decode_doc).transpose()
  }

  async fn list_posts(&self) -> Result<Vec<Post>> {
    let docs: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare("SELECT doc FROM posts ORDER BY created_at DESC, rowid DESC")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;

    docs.iter().map(|d| decode_doc(d)).collect()
  }

  async fn update_post<F>(
    &self,
    id: Uuid,
    apply: F,
  ) -> Result<Option<devlink_core::Result<Post>>>
  where
    F: FnOnce(&mut Post) -> devlink_core::Result<()> + Send + 'static,
  {
    let id_str = encode_uuid(id);
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let doc: Option<String> = tx
          .query_row(
            "SELECT doc FROM posts WHERE post_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(doc) = doc else { return Ok(None) };

        let mut post: Post = decode_doc(&doc).map_err(call_error)?;
        if let Err(e) = apply(&mut post) {
          return Ok(Some(Err(e)));
        }

        tx.execute(
          "UPDATE posts SET doc = ?2 WHERE post_id = ?1",
          rusqlite::params![id_str, encode_doc(&post).map_err(call_error)?],
        )?;
        tx.commit()?;
        Ok(Some(Ok(post)))
      })
      .await?;
    Ok(outcome)
  }

  async fn delete_post(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM posts WHERE post_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }
}
