//! The `DevlinkStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `devlink-store-sqlite`).
//! Higher layers (`devlink-api`) depend on this abstraction, not on any
//! concrete backend. Every method is a single-document lookup or mutation.
//! Read-modify-write goes through the `update_*` methods so the backend can
//! serialise conflicting writes to one record.

use std::future::Future;

use uuid::Uuid;

use crate::{
  post::{NewPost, Post},
  profile::{Profile, ProfileView},
  user::{NewUser, User},
};

/// Abstraction over a Devlink storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DevlinkStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. Fails if the email is already taken.
  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look a user up by email (case-insensitive).
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Remove a user together with their posts and profile, atomically.
  /// Returns how many posts went with them.
  fn delete_account(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Profiles ──────────────────────────────────────────────────────────

  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// The profile joined with its owner's name and avatar.
  fn get_profile_view(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<ProfileView>, Self::Error>> + Send + '_;

  fn list_profile_views(
    &self,
  ) -> impl Future<Output = Result<Vec<ProfileView>, Self::Error>> + Send + '_;

  /// Store a new profile. Returns `false`, leaving the stored one alone, if
  /// the user already has a profile.
  fn insert_profile<'a>(
    &'a self,
    profile: &'a Profile,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Load, change and write back one profile as a single atomic step.
  ///
  /// `Ok(None)` if there is no profile. A domain error from `apply` leaves
  /// the stored profile untouched and is handed back as `Some(Err(_))`.
  fn update_profile<F>(
    &self,
    user_id: Uuid,
    apply: F,
  ) -> impl Future<Output = Result<Option<crate::Result<Profile>>, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut Profile) -> crate::Result<()> + Send + 'static;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a new post. The id and `created_at` are set by the store.
  fn insert_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// All posts, newest first.
  fn list_posts(
    &self,
  ) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  /// Splice a post's likes or comments atomically. Same contract as
  /// [`update_profile`](Self::update_profile).
  fn update_post<F>(
    &self,
    id: Uuid,
    apply: F,
  ) -> impl Future<Output = Result<Option<crate::Result<Post>>, Self::Error>> + Send + '_
  where
    F: FnOnce(&mut Post) -> crate::Result<()> + Send + 'static;

  fn delete_post(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
