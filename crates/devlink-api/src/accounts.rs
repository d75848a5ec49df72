//! Handlers for `/auth` and `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | Body: [`SignupBody`]; returns the new user and a token |
//! | `POST` | `/auth/login`  | Body: [`LoginBody`]; returns a token |
//! | `GET`  | `/auth`        | Protected; the authenticated user |
//! | `GET`  | `/users/{id}`  | Public summary; 404 if not found |

use axum::{Json, extract::State};
use devlink_core::{
  store::DevlinkStore,
  user::{NewUser, UserSummary},
};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  extract::{JsonBody, Path, parse_id},
  password,
  validate::validated,
};

const INVALID_CREDENTIALS: &str = "Invalid Credentials";
const USER_NOT_FOUND: &str = "User not found";

/// Gravatar URL for `email`: 200px, PG-rated, mystery-person fallback.
pub fn gravatar_url(email: &str) -> String {
  let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
  format!(
    "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
    hex::encode(digest)
  )
}

// ─── Signup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct SignupBody {
  #[serde(default)]
  #[validate(length(min = 1, message = "Name is required"))]
  pub name:     String,
  #[serde(default)]
  #[validate(email(message = "Please include a valid email"))]
  pub email:    String,
  #[serde(default)]
  #[validate(length(min = 6, message = "Please enter a password with 6 or more characters"))]
  pub password: String,
}

/// `POST /auth/signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<SignupBody>,
) -> Result<Json<Value>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let body = validated(body)?;

  let existing = state
    .store
    .find_user_by_email(&body.email)
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    return Err(ApiError::BadRequest("User already exists".into()));
  }

  let password_hash = password::hash_password_blocking(body.password).await?;
  let user = state
    .store
    .insert_user(NewUser {
      avatar: gravatar_url(&body.email),
      name: body.name,
      email: body.email,
      password_hash,
    })
    .await
    .map_err(ApiError::store)?;

  let token = state
    .tokens
    .issue(&user.user_id.to_string())
    .map_err(ApiError::internal)?;

  tracing::info!(user_id = %user.user_id, "user registered");
  Ok(Json(json!({
    "success": true,
    "data": { "name": user.name, "email": user.email, "avatar": user.avatar },
    "token": token,
  })))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct LoginBody {
  #[serde(default)]
  #[validate(email(message = "Please include a valid email"))]
  pub email:    String,
  #[serde(default)]
  #[validate(length(min = 1, message = "Password is required"))]
  pub password: String,
}

/// `POST /auth/login`
///
/// Unknown email and wrong password produce the same answer.
pub async fn login<S>(
  State(state): State<AppState<S>>,
  JsonBody(body): JsonBody<LoginBody>,
) -> Result<Json<Value>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let body = validated(body)?;

  let user = state
    .store
    .find_user_by_email(&body.email)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::BadRequest(INVALID_CREDENTIALS.into()))?;

  let matches =
    password::verify_password_blocking(body.password, user.password_hash.clone())
      .await?;
  if !matches {
    tracing::info!(user_id = %user.user_id, "failed login");
    return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
  }

  let token = state
    .tokens
    .issue(&user.user_id.to_string())
    .map_err(ApiError::internal)?;

  Ok(Json(json!({
    "success": true,
    "msg": "User successfully logged in",
    "token": token,
  })))
}

// ─── Current user ─────────────────────────────────────────────────────────────

/// `GET /auth`
pub async fn me<S>(
  State(state): State<AppState<S>>,
  auth: AuthUser,
) -> Result<Json<Value>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let id = auth.user_id()?;
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.into()))?;
  Ok(Json(json!({ "success": true, "user": user })))
}

// ─── Public lookup ────────────────────────────────────────────────────────────

/// `GET /users/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Json<UserSummary>, ApiError>
where
  S: DevlinkStore + 'static,
{
  let id = parse_id(&id, USER_NOT_FOUND)?;
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.into()))?;
  Ok(Json(user.summary()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn gravatar_normalises_email() {
    let a = gravatar_url("Ada@Example.com ");
    let b = gravatar_url("ada@example.com");
    assert_eq!(a, b);
    assert!(a.starts_with("https://www.gravatar.com/avatar/"));
    assert!(a.ends_with("?s=200&r=pg&d=mm"));
  }
}
