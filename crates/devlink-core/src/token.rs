//! Identity tokens: signed, time-limited credentials naming a subject.
//!
//! Tokens are HS256 JWTs carrying `{sub, iat, exp}`. They are stateless: the
//! server keeps no session and has no revocation list, so expiry is the only
//! way a token dies.
//!
//! Expiry is checked here against an explicit `now` rather than inside
//! `jsonwebtoken`, so the `*_at` variants are pure functions of their inputs.

use std::{collections::HashSet, fmt, time::Duration};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode,
  decode_header, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  /// The subject (user id) the token speaks for.
  pub sub: String,
  /// Issued-at, UTC Unix seconds.
  pub iat: i64,
  /// Expiry, UTC Unix seconds. Invalid from this instant onwards.
  pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
  /// Not a structurally valid token.
  #[error("malformed token")]
  Malformed,

  /// Well-formed, but not signed with our secret.
  #[error("invalid token signature")]
  InvalidSignature,

  #[error("token expired")]
  Expired,

  #[error("failed to sign token: {0}")]
  Signing(#[source] jsonwebtoken::errors::Error),
}

/// Issues and verifies identity tokens with one shared secret.
pub struct TokenCodec {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
  ttl:        Duration,
}

impl fmt::Debug for TokenCodec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TokenCodec")
      .field("ttl", &self.ttl)
      .finish_non_exhaustive()
  }
}

impl TokenCodec {
  pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
    let secret = secret.as_ref();

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.required_spec_claims =
      HashSet::from(["exp".to_owned(), "sub".to_owned()]);

    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
      ttl,
    }
  }

  pub fn ttl(&self) -> Duration { self.ttl }

  /// Issue a token for `subject` valid from now for the configured TTL.
  pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
    self.issue_at(subject, Utc::now())
  }

  /// Issue a token as though the current time were `now`.
  pub fn issue_at(
    &self,
    subject: &str,
    now: DateTime<Utc>,
  ) -> Result<String, TokenError> {
    let iat = now.timestamp();
    let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
    let claims = Claims {
      sub: subject.to_owned(),
      iat,
      exp: iat.saturating_add(ttl),
    };

    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(TokenError::Signing)
  }

  /// Verify `token` and return the subject it names.
  pub fn verify(&self, token: &str) -> Result<String, TokenError> {
    self.verify_at(token, Utc::now())
  }

  /// Verify `token` as though the current time were `now`.
  ///
  /// Structure is checked first, then the signature, then expiry. A forged
  /// token is reported as [`TokenError::InvalidSignature`] even when it is
  /// also stale.
  pub fn verify_at(
    &self,
    token: &str,
    now: DateTime<Utc>,
  ) -> Result<String, TokenError> {
    check_structure(token)?;

    let data = decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|e| match e.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
          TokenError::InvalidSignature
        }
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
      })?;

    if now.timestamp() >= data.claims.exp {
      return Err(TokenError::Expired);
    }

    Ok(data.claims.sub)
  }
}

/// Reject anything that is not `header.claims.signature` with a parseable
/// header and a claims segment that decodes to [`Claims`].
///
/// `jsonwebtoken` checks the signature before it looks at the claims, so
/// without this a readable header over an unreadable payload would surface
/// as a signature failure.
fn check_structure(token: &str) -> Result<(), TokenError> {
  let mut parts = token.split('.');
  let (Some(_), Some(payload), Some(_), None) =
    (parts.next(), parts.next(), parts.next(), parts.next())
  else {
    return Err(TokenError::Malformed);
  };

  decode_header(token).map_err(|_| TokenError::Malformed)?;
  let bytes = URL_SAFE_NO_PAD
    .decode(payload)
    .map_err(|_| TokenError::Malformed)?;
  serde_json::from_slice::<Claims>(&bytes).map_err(|_| TokenError::Malformed)?;
  Ok(())
}
