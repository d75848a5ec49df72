//! JSON REST API for Devlink.
//!
//! Exposes an axum [`Router`] backed by any [`DevlinkStore`]. Everything is
//! mounted under `/api/v1`; protected routes sit behind
//! [`auth::require_auth`].
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = devlink_api::router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod accounts;
pub mod auth;
pub mod error;
pub mod extract;
pub mod github;
pub mod password;
pub mod posts;
pub mod profiles;
pub mod settings;
pub mod validate;

pub use error::ApiError;
pub use settings::ServerConfig;

use std::sync::Arc;

use axum::{
  Router, middleware,
  routing::{delete, get, post, put},
};
use devlink_core::{store::DevlinkStore, token::TokenCodec};

use github::GithubClient;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers. Read-only apart from
/// whatever the store itself does.
pub struct AppState<S: DevlinkStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenCodec>,
  pub github: Arc<GithubClient>,
}

impl<S: DevlinkStore> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tokens: Arc::clone(&self.tokens),
      github: Arc::clone(&self.github),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full `/api/v1` router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: DevlinkStore + 'static,
{
  let public = Router::new()
    .route("/auth/signup", post(accounts::signup::<S>))
    .route("/auth/login", post(accounts::login::<S>))
    .route("/users/{id}", get(accounts::get_one::<S>))
    .route("/profile", get(profiles::list::<S>))
    .route("/profile/user/{user_id}", get(profiles::get_by_user::<S>))
    .route("/profile/github/{username}", get(github::repos::<S>));

  let protected = Router::new()
    // Auth
    .route("/auth", get(accounts::me::<S>))
    // Profiles
    .route("/profile/me", get(profiles::me::<S>))
    .route(
      "/profile",
      post(profiles::upsert::<S>).delete(profiles::delete_account::<S>),
    )
    .route("/profile/experience", put(profiles::add_experience::<S>))
    .route("/profile/experience/{exp_id}", delete(profiles::remove_experience::<S>))
    .route("/profile/education", put(profiles::add_education::<S>))
    .route("/profile/education/{edu_id}", delete(profiles::remove_education::<S>))
    // Posts
    .route("/posts", get(posts::list::<S>).post(posts::create::<S>))
    .route("/posts/{id}", get(posts::get_one::<S>).delete(posts::delete_one::<S>))
    .route("/posts/like/{id}", put(posts::like::<S>))
    .route("/posts/unlike/{id}", put(posts::unlike::<S>))
    .route("/posts/comment/{id}", post(posts::comment::<S>))
    .route("/posts/comment/{id}/{comment_id}", delete(posts::uncomment::<S>))
    .route_layer(middleware::from_fn_with_state(
      Arc::clone(&state.tokens),
      auth::require_auth,
    ));

  Router::new()
    .nest("/api/v1", public.merge(protected))
    .with_state(state)
}
