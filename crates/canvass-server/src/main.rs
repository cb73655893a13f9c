//! canvass-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens an
//! in-process SQLite store, and serves the contact-directory API over HTTP.
//!
//! # User bootstrap
//!
//! Every mutation is attributed to a user, so a fresh deployment needs at
//! least one. To create one and print its UUID:
//!
//! ```text
//! canvass-server --add-user "Pat Organizer" --role admin
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use canvass_api::AppState;
use canvass_core::{
  store::RosterStore as _,
  user::{NewUser, Role},
};
use canvass_store_sqlite::SqliteRoster;
use clap::Parser;
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Runtime server configuration, deserialised from `config.toml` and the
/// `CANVASS_*` environment.
#[derive(Deserialize, Clone)]
struct ServerConfig {
  host:       String,
  port:       u16,
  store_path: PathBuf,
}

#[derive(Parser)]
#[command(author, version, about = "Canvass contact-directory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Create a user ("First Last"), print their UUID, and exit.
  #[arg(long, value_name = "NAME")]
  add_user: Option<String>,

  /// Role for `--add-user`: admin, editor, or viewer.
  #[arg(long, default_value = "editor")]
  role: String,
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
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("CANVASS"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path and open the SQLite store.
  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteRoster::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  // Helper mode: create a user and exit.
  if let Some(name) = cli.add_user {
    let (first_name, last_name) = split_name(&name)?;
    let role = Role::parse(cli.role.trim())
      .with_context(|| format!("unknown role {:?}", cli.role))?;

    let user = store
      .add_user(NewUser { first_name, last_name, role })
      .await
      .context("failed to create user")?;
    println!("{}", user.user_id);
    return Ok(());
  }

  // Build application state and serve.
  let state = AppState::new(Arc::new(store));
  let app = canvass_api::api_router(state).layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Split a `"First Last"` name argument; the last word is the last name.
fn split_name(name: &str) -> anyhow::Result<(String, String)> {
  let mut parts: Vec<&str> = name.split_whitespace().collect();
  if parts.len() < 2 {
    anyhow::bail!("--add-user expects \"First Last\", got {name:?}");
  }
  let last = parts.pop().unwrap_or_default().to_string();
  Ok((parts.join(" "), last))
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
