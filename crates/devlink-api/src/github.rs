//! GitHub repository lookup for profile pages.
//!
//! A thin async client over the GitHub REST API plus the public handler
//! `GET /profile/github/{username}`.

use std::time::Duration;

use axum::{Json, extract::State};
use devlink_core::store::DevlinkStore;
use reqwest::{Client, StatusCode, header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{AppState, error::ApiError, extract::Path};

/// How many repos a profile page shows.
const REPO_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum GithubError {
  #[error("github request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("github returned {0}")]
  Status(StatusCode),
}

/// The subset of a GitHub repository shown on a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repo {
  pub name:             String,
  pub html_url:         String,
  pub description:      Option<String>,
  pub language:         Option<String>,
  #[serde(default)]
  pub stargazers_count: u64,
  #[serde(default)]
  pub watchers_count:   u64,
  #[serde(default)]
  pub forks_count:      u64,
}

/// Async client for the GitHub REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct GithubClient {
  client:   Client,
  base_url: String,
  token:    Option<String>,
}

impl GithubClient {
  pub fn new(
    base_url: impl Into<String>,
    token: Option<String>,
  ) -> Result<Self, GithubError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .user_agent(concat!("devlink/", env!("CARGO_PKG_VERSION")))
      .build()?;
    Ok(Self { client, base_url: base_url.into(), token })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url.trim_end_matches('/'), path)
  }

  /// The user's most recently created public repos, or `None` if GitHub
  /// has no such user.
  pub async fn recent_repos(
    &self,
    username: &str,
  ) -> Result<Option<Vec<Repo>>, GithubError> {
    let mut req = self
      .client
      .get(self.url(&format!("/users/{username}/repos")))
      .query(&[
        ("per_page", REPO_LIMIT.to_string()),
        ("sort", "created".to_owned()),
        ("direction", "desc".to_owned()),
      ])
      .header(header::ACCEPT, "application/vnd.github+json");
    if let Some(token) = &self.token {
      req = req.header(header::AUTHORIZATION, format!("token {token}"));
    }

    let resp = req.send().await?;
    match resp.status() {
      StatusCode::NOT_FOUND => Ok(None),
      s if s.is_success() => {
        let mut repos: Vec<Repo> = resp.json().await?;
        repos.truncate(REPO_LIMIT);
        Ok(Some(repos))
      }
      s => Err(GithubError::Status(s)),
    }
  }
}

/// GitHub logins are alphanumerics and single hyphens, at most 39 chars.
fn is_valid_username(name: &str) -> bool {
  !name.is_empty()
    && name.len() <= 39
    && !name.starts_with('-')
    && !name.ends_with('-')
    && !name.contains("--")
    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

const NO_GITHUB_PROFILE: &str = "No Github profile found";

/// `GET /profile/github/{username}`
pub async fn repos<S>(
  State(state): State<AppState<S>>,
  Path(username): Path<String>,
) -> Result<Json<Vec<Repo>>, ApiError>
where
  S: DevlinkStore + 'static,
{
  if !is_valid_username(&username) {
    return Err(ApiError::NotFound(NO_GITHUB_PROFILE.into()));
  }

  let repos = state
    .github
    .recent_repos(&username)
    .await
    .map_err(ApiError::internal)?
    .ok_or_else(|| ApiError::NotFound(NO_GITHUB_PROFILE.into()))?;
  Ok(Json(repos))
}
