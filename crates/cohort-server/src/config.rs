//! Runtime configuration: an optional TOML file under `COHORT_*` variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use serde::Deserialize;

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/cohort/roster.db") }

fn default_llm_endpoint() -> String {
  "https://api.openai.com/v1/chat/completions".into()
}

fn default_llm_model() -> String { "gpt-4o-mini".into() }

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:             String,
  #[serde(default = "default_port")]
  pub port:             u16,
  #[serde(default = "default_store_path")]
  pub store_path:       PathBuf,
  /// OpenAI-compatible chat-completions URL.
  #[serde(default = "default_llm_endpoint")]
  pub llm_endpoint:     String,
  #[serde(default = "default_llm_model")]
  pub llm_model:        String,
  pub llm_api_key:      Option<String>,
  /// Store time allowed per question, in milliseconds.
  pub query_timeout_ms: Option<u64>,
}

impl ServerConfig {
  /// Read `file` (if it exists), then let `COHORT_*` variables override it.
  pub fn load(file: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("COHORT"))
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn query_timeout(&self) -> Option<Duration> {
    self.query_timeout_ms.map(Duration::from_millis)
  }

  /// The store path with a leading `~` expanded.
  pub fn store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
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
