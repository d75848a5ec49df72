//! Runtime server configuration.
//!
//! Read from an optional TOML file, then overlaid with `DEVLINK_*`
//! environment variables (e.g. `DEVLINK_JWT_SECRET`, `DEVLINK_PORT`).

use std::{path::{Path, PathBuf}, time::Duration};

use serde::Deserialize;

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  /// HMAC key for identity tokens. Required; never logged.
  pub jwt_secret:     String,
  #[serde(default = "default_token_ttl_secs")]
  pub token_ttl_secs: u64,
  #[serde(default = "default_github_api_url")]
  pub github_api_url: String,
  /// Optional personal access token to lift GitHub's anonymous rate limit.
  #[serde(default)]
  pub github_token:   Option<String>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("devlink.db") }

fn default_token_ttl_secs() -> u64 { 60 * 60 * 24 * 30 }

fn default_github_api_url() -> String { "https://api.github.com".to_owned() }

impl ServerConfig {
  /// Load from `path` (if it exists) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("DEVLINK"))
      .build()?
      .try_deserialize()
  }

  pub fn token_ttl(&self) -> Duration { Duration::from_secs(self.token_ttl_secs) }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

impl std::fmt::Debug for ServerConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ServerConfig")
      .field("host", &self.host)
      .field("port", &self.port)
      .field("store_path", &self.store_path)
      .field("token_ttl_secs", &self.token_ttl_secs)
      .field("github_api_url", &self.github_api_url)
      .finish_non_exhaustive()
  }
}
