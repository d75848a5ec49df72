//! Request extractors that reject with [`ApiError`] bodies instead of
//! axum's plain-text rejections.
//!
//! [`JsonBody`] wraps `axum::Json`. A body of the wrong shape becomes a
//! field error, a missing content type or broken JSON becomes
//! `{"msg": ...}`. [`Path`] wraps `axum::extract::Path`; ids are taken as
//! strings and parsed with [`parse_id`], so an id that is not a UUID reads
//! as "not found" for whatever resource the handler serves.

use axum::{
  extract::{
    FromRequest, FromRequestParts, Request,
    rejection::{JsonRejection, PathRejection},
  },
  http::request::Parts,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ApiError, FieldError};

const DATA_ERROR_PREFIX: &str = "Failed to deserialize the JSON body into the target type: ";

/// A JSON request body.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
  T: DeserializeOwned,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
    Ok(Self(value))
  }
}

/// Path parameters.
#[derive(Debug)]
pub struct Path<T>(pub T);

impl<S, T> FromRequestParts<S> for Path<T>
where
  T: DeserializeOwned + Send,
  S: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &S,
  ) -> Result<Self, Self::Rejection> {
    let axum::extract::Path(value) =
      axum::extract::Path::<T>::from_request_parts(parts, state).await?;
    Ok(Self(value))
  }
}

/// Parse a path id; anything that is not a UUID names nothing.
pub fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
  Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(not_found.to_owned()))
}

/// Split axum's data-error text into the offending field and the reason.
fn data_error(text: &str) -> FieldError {
  let detail = text.strip_prefix(DATA_ERROR_PREFIX).unwrap_or(text);
  match detail.split_once(": ") {
    Some((path, msg)) if !path.is_empty() && !path.contains(' ') => {
      FieldError::new(path, msg)
    }
    _ => FieldError::new("body", detail),
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    match rejection {
      JsonRejection::JsonDataError(e) => {
        ApiError::Validation(vec![data_error(&e.body_text())])
      }
      JsonRejection::JsonSyntaxError(_) => {
        ApiError::BadRequest("Request body is not valid JSON".into())
      }
      JsonRejection::MissingJsonContentType(_) => {
        ApiError::BadRequest("Expected request with `Content-Type: application/json`".into())
      }
      other => ApiError::BadRequest(other.body_text()),
    }
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    tracing::debug!(error = %rejection.body_text(), "rejected path");
    ApiError::NotFound("Not found".into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn data_error_names_the_field() {
    let text = format!("{DATA_ERROR_PREFIX}from: input contains invalid characters at line 1 column 9");
    assert_eq!(
      data_error(&text),
      FieldError::new("from", "input contains invalid characters at line 1 column 9")
    );
  }

  #[test]
  fn data_error_without_path_blames_body() {
    let text = format!("{DATA_ERROR_PREFIX}invalid type: string \"x\", expected a map");
    let err = data_error(&text);
    assert_eq!(err.param, "body");
    assert!(err.msg.starts_with("invalid type"));
  }

  #[test]
  fn non_uuid_id_is_not_found() {
    assert!(matches!(
      parse_id("not-a-uuid", "Post not found"),
      Err(ApiError::NotFound(m)) if m == "Post not found"
    ));
    let id = Uuid::new_v4();
    assert_eq!(parse_id(&id.to_string(), "Post not found").unwrap(), id);
  }
}
