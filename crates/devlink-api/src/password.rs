//! Argon2id password hashing and verification.
//!
//! Hashes are PHC strings (`$argon2id$v=19$…`) so parameters and salt travel
//! with the hash. Both operations are deliberately slow, so the async
//! wrappers move them onto the blocking pool.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::error::ApiError;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)?
      .to_string(),
  )
}

/// `Ok(false)` on a wrong password; `Err` only if `hash` is not a PHC string.
pub fn verify_password(
  password: &str,
  hash: &str,
) -> Result<bool, argon2::password_hash::Error> {
  let parsed = PasswordHash::new(hash)?;
  match Argon2::default().verify_password(password.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(e) => Err(e),
  }
}

pub async fn hash_password_blocking(password: String) -> Result<String, ApiError> {
  tokio::task::spawn_blocking(move || hash_password(&password))
    .await
    .map_err(ApiError::internal)?
    .map_err(ApiError::internal)
}

pub async fn verify_password_blocking(
  password: String,
  hash: String,
) -> Result<bool, ApiError> {
  tokio::task::spawn_blocking(move || verify_password(&password, &hash))
    .await
    .map_err(ApiError::internal)?
    .map_err(ApiError::internal)
}
