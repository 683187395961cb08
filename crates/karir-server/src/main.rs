//! karir server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store and serves the JSON API over HTTP.
//!
//! # Bootstrapping an admin
//!
//! ```text
//! echo 's3cret' | cargo run -p karir-server -- create-user \
//!   --username admin --email admin@example.ac.id --role admin
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use clap::{Parser, Subcommand, ValueEnum};
use karir_api::{AppState, AuthConfig};
use karir_core::{account::NewUser, identity::Role, store::CareerStore};
use karir_store_sqlite::SqliteStore;
use rand_core::OsRng;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Karir alumni employment server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Print the argon2 hash for a password entered on stdin and exit.
  HashPassword,
  /// Create a login account. The password is read from stdin.
  CreateUser {
    #[arg(long)]
    username: String,
    #[arg(long)]
    email:    String,
    #[arg(long, value_enum, default_value_t = RoleArg::User)]
    role:     RoleArg,
  },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
  Admin,
  User,
}

impl From<RoleArg> for Role {
  fn from(arg: RoleArg) -> Self {
    match arg {
      RoleArg::Admin => Role::Admin,
      RoleArg::User => Role::User,
    }
  }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(ServerConfig::load(&cli.config)?).await,
    Command::HashPassword => {
      println!("{}", hash_password(&read_password()?)?);
      Ok(())
    }
    Command::CreateUser { username, email, role } => {
      let cfg = ServerConfig::load(&cli.config)?;
      let store = open_store(&cfg).await?;
      let password_hash = hash_password(&read_password()?)?;
      let user = store
        .add_user(NewUser { username, email, password_hash, role: role.into() })
        .await
        .context("failed to create user")?;
      tracing::info!(user_id = %user.user_id, role = user.role.as_str(), "user created");
      println!("{}", user.user_id);
      Ok(())
    }
  }
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let store = open_store(&cfg).await?;
  let state = AppState::new(
    Arc::new(store),
    AuthConfig { session_ttl: cfg.session_ttl() },
    cfg.store_timeout(),
  );

  let app = karir_api::api_router(state);
  let address = cfg.address();

  tracing::info!(
    timeout = ?cfg.store_timeout(),
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn open_store(cfg: &ServerConfig) -> anyhow::Result<SqliteStore> {
  let path = cfg.resolved_store_path();
  SqliteStore::open(&path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

fn hash_password(password: &str) -> anyhow::Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| anyhow::anyhow!("argon2 error: {e}"))?
      .to_string(),
  )
}

/// Read a password from stdin (no echo).
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  eprint!("Password: ");
  io::stderr().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  let password = line.trim_end_matches(['\n', '\r']).to_string();
  anyhow::ensure!(!password.is_empty(), "password must not be empty");
  Ok(password)
}
