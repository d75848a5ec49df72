//! devlink server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid with
//! `DEVLINK_*` environment variables, opens the SQLite store, and serves the
//! REST API over HTTP.

use std::{path::{Path, PathBuf}, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use devlink_api::{AppState, ServerConfig, github::GithubClient};
use devlink_core::token::TokenCodec;
use devlink_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Devlink API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;
  anyhow::ensure!(
    !server_cfg.jwt_secret.trim().is_empty(),
    "jwt_secret must be set (config file or DEVLINK_JWT_SECRET)"
  );
  tracing::debug!(config = ?server_cfg, "configuration loaded");

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  tracing::info!(path = ?store_path, "store opened");

  let github = GithubClient::new(
    server_cfg.github_api_url.clone(),
    server_cfg.github_token.clone(),
  )
  .context("failed to build GitHub client")?;

  // Build application state.
  let state = AppState {
    store:  Arc::new(store),
    tokens: Arc::new(TokenCodec::new(
      server_cfg.jwt_secret.as_bytes(),
      server_cfg.token_ttl(),
    )),
    github: Arc::new(github),
  };

  let app = devlink_api::router(state).layer(TraceLayer::new_for_http());
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
