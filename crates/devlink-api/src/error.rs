//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure a client can see is rendered as JSON. Internal failures are
//! logged in full and answered with a generic message.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// One failed input field, shaped like `{"param":"email","msg":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub param: String,
  pub msg:   String,
}

impl FieldError {
  pub fn new(param: impl Into<String>, msg: impl Into<String>) -> Self {
    Self { param: param.into(), msg: msg.into() }
  }
}

/// An error returned by an API handler or the auth middleware.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("validation failed on {} field(s)", .0.len())]
  Validation(Vec<FieldError>),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  pub fn internal(e: impl std::fmt::Display) -> Self {
    Self::Internal(e.to_string())
  }
}

impl From<devlink_core::Error> for ApiError {
  fn from(e: devlink_core::Error) -> Self {
    use devlink_core::Error as Core;
    match e {
      Core::AlreadyLiked(_) => Self::BadRequest("Post already liked".into()),
      Core::NotLiked(_) => Self::BadRequest("Post has not yet been liked".into()),
      Core::CommentNotFound(_) => Self::NotFound("Comment does not exist".into()),
      Core::ExperienceNotFound(_) => Self::NotFound("Experience not found".into()),
      Core::EducationNotFound(_) => Self::NotFound("Education not found".into()),
      Core::NotOwner(_) => Self::Unauthorized("User not authorized".into()),
      Core::Serialization(e) => Self::internal(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match self {
      ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "msg": msg })),
      ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "msg": msg })),
      ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "msg": msg })),
      ApiError::Validation(errors) => {
        (StatusCode::BAD_REQUEST, json!({ "errors": errors }))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "msg": "Server Error" }))
      }
      ApiError::Internal(msg) => {
        tracing::error!(error = %msg, "internal failure");
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "msg": "Server Error" }))
      }
    };
    (status, Json(body)).into_response()
  }
}
