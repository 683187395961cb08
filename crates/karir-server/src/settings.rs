//! Runtime configuration, layered from an optional TOML file and `KARIR_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:               String,
  #[serde(default = "default_port")]
  pub port:               u16,
  /// SQLite database file. A leading `~/` expands to `$HOME`.
  #[serde(default = "default_store_path")]
  pub store_path:         PathBuf,
  #[serde(default = "default_session_ttl_hours")]
  pub session_ttl_hours:  u32,
  /// Ceiling on every store-backed operation.
  #[serde(default = "default_store_timeout_secs")]
  pub store_timeout_secs: u64,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("karir.db") }
fn default_session_ttl_hours() -> u32 { 24 }
fn default_store_timeout_secs() -> u64 { 10 }

impl ServerConfig {
  /// Read `path` (if it exists) and overlay `KARIR_`-prefixed environment
  /// variables.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("KARIR"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn session_ttl(&self) -> chrono::Duration {
    chrono::Duration::hours(i64::from(self.session_ttl_hours))
  }

  pub fn store_timeout(&self) -> Duration { Duration::from_secs(self.store_timeout_secs) }

  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/karir.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_timeout(), Duration::from_secs(10));
    assert_eq!(cfg.session_ttl(), chrono::Duration::hours(24));
  }

  #[test]
  fn relative_paths_are_left_alone() {
    assert_eq!(expand_tilde(Path::new("data/karir.db")), PathBuf::from("data/karir.db"));
  }
}
