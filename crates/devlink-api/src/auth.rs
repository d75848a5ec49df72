//! Token authentication: a route-layer middleware and the [`AuthUser`]
//! extractor that reads what it leaves behind.
//!
//! Protected routes are wrapped with [`require_auth`]. It reads the token
//! from the `x-auth-token` header, verifies it with the shared
//! [`TokenCodec`], and either short-circuits with a 401 or attaches the
//! authenticated subject to the request's extensions. It never touches
//! shared state, so concurrent requests cannot observe each other.

use std::sync::Arc;

use axum::{
  extract::{FromRequestParts, Request, State},
  http::{HeaderMap, request::Parts},
  middleware::Next,
  response::{IntoResponse, Response},
};
use devlink_core::token::TokenCodec;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the identity token.
pub const TOKEN_HEADER: &str = "x-auth-token";

pub const NO_TOKEN: &str = "No token, authorization denied";
pub const TOKEN_INVALID: &str = "Token is not valid";

/// The subject of a verified token, valid for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
  pub subject: String,
}

impl AuthUser {
  /// The subject as a user id. A token naming something else is treated as
  /// invalid.
  pub fn user_id(&self) -> Result<Uuid, ApiError> {
    Uuid::parse_str(&self.subject)
      .map_err(|_| ApiError::Unauthorized(TOKEN_INVALID.into()))
  }
}

/// Verify the token in `headers`. Usable without the middleware.
pub fn authenticate(
  headers: &HeaderMap,
  tokens: &TokenCodec,
) -> Result<AuthUser, ApiError> {
  let token = headers
    .get(TOKEN_HEADER)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .ok_or_else(|| ApiError::Unauthorized(NO_TOKEN.into()))?;

  let subject = tokens.verify(token).map_err(|e| {
    tracing::debug!(error = %e, "rejected token");
    ApiError::Unauthorized(TOKEN_INVALID.into())
  })?;

  Ok(AuthUser { subject })
}

/// Route-layer middleware: 401 unless the request carries a valid token.
pub async fn require_auth(
  State(tokens): State<Arc<TokenCodec>>,
  mut req: Request,
  next: Next,
) -> Response {
  match authenticate(req.headers(), &tokens) {
    Ok(user) => {
      req.extensions_mut().insert(user);
      next.run(req).await
    }
    Err(e) => e.into_response(),
  }
}

impl<S> FromRequestParts<S> for AuthUser
where
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<AuthUser>()
      .cloned()
      .ok_or_else(|| ApiError::Unauthorized(NO_TOKEN.into()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
  };

  use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware,
    routing::get,
  };
  use chrono::{TimeDelta, Utc};
  use serde_json::Value;
  use tower::ServiceExt;

  const SECRET: &str = "test-secret";

  fn codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(SECRET, Duration::from_secs(3600)))
  }

  /// A protected router whose only handler counts its invocations and
  /// echoes the subject it was given.
  fn app(tokens: Arc<TokenCodec>, calls: Arc<AtomicUsize>) -> Router {
    Router::new()
      .route(
        "/protected",
        get(move |user: AuthUser| {
          let calls = calls.clone();
          async move {
            calls.fetch_add(1, Ordering::SeqCst);
            user.subject
          }
        }),
      )
      .route_layer(middleware::from_fn_with_state(tokens, require_auth))
  }

  async fn call(app: Router, token: Option<&str>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().uri("/protected");
    if let Some(t) = token {
      builder = builder.header(TOKEN_HEADER, t);
    }
    let resp = app
      .oneshot(builder.body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    (status, bytes.to_vec())
  }

  fn msg(body: &[u8]) -> String {
    let v: Value = serde_json::from_slice(body).unwrap();
    v["msg"].as_str().unwrap().to_owned()
  }

  #[tokio::test]
  async fn missing_token_short_circuits() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (status, body) = call(app(codec(), calls.clone()), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(msg(&body), NO_TOKEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn blank_token_counts_as_missing() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (status, body) = call(app(codec(), calls.clone()), Some("   ")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(msg(&body), NO_TOKEN);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn malformed_token_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let (status, body) =
      call(app(codec(), calls.clone()), Some("definitely-not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(msg(&body), TOKEN_INVALID);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn foreign_secret_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let foreign = TokenCodec::new("other-secret", Duration::from_secs(3600))
      .issue("u1")
      .unwrap();
    let (status, body) = call(app(codec(), calls.clone()), Some(&foreign)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(msg(&body), TOKEN_INVALID);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn expired_token_rejected() {
    let calls = Arc::new(AtomicUsize::new(0));
    let tokens = codec();
    let stale = tokens
      .issue_at("u1", Utc::now() - TimeDelta::seconds(3601))
      .unwrap();
    let (status, body) = call(app(tokens, calls.clone()), Some(&stale)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(msg(&body), TOKEN_INVALID);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn valid_token_reaches_handler_with_subject() {
    let calls = Arc::new(AtomicUsize::new(0));
    let tokens = codec();
    let token = tokens.issue("u1").unwrap();
    let (status, body) = call(app(tokens, calls.clone()), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"u1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn concurrent_requests_keep_their_own_subject() {
    let calls = Arc::new(AtomicUsize::new(0));
    let tokens = codec();
    let router = app(tokens.clone(), calls.clone());

    let mut handles = Vec::new();
    for i in 0..16 {
      let subject = format!("user-{i}");
      let token = tokens.issue(&subject).unwrap();
      let router = router.clone();
      handles.push(tokio::spawn(async move {
        let (status, body) = call(router, Some(&token)).await;
        (subject, status, body)
      }));
    }

    for h in handles {
      let (subject, status, body) = h.await.unwrap();
      assert_eq!(status, StatusCode::OK);
      assert_eq!(body, subject.as_bytes());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 16);
  }

  #[tokio::test]
  async fn extractor_without_middleware_rejects() {
    let app = Router::new().route("/open", get(|_: AuthUser| async { "hi" }));
    let resp = app
      .oneshot(Request::builder().uri("/open").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[test]
  fn non_uuid_subject_is_invalid() {
    let user = AuthUser { subject: "u1".into() };
    assert!(matches!(user.user_id(), Err(ApiError::Unauthorized(m)) if m == TOKEN_INVALID));
    let id = Uuid::new_v4();
    let user = AuthUser { subject: id.to_string() };
    assert_eq!(user.user_id().unwrap(), id);
  }
}
