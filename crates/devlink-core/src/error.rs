//! Error types for `devlink-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("post {0} already liked")]
  AlreadyLiked(Uuid),

  #[error("post {0} has not yet been liked")]
  NotLiked(Uuid),

  #[error("comment not found: {0}")]
  CommentNotFound(Uuid),

  #[error("experience not found: {0}")]
  ExperienceNotFound(Uuid),

  #[error("education not found: {0}")]
  EducationNotFound(Uuid),

  /// The caller is not the owner of the record it tried to change.
  #[error("user {0} does not own this record")]
  NotOwner(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
