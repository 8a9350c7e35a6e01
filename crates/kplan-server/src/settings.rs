//! Runtime server configuration.
//!
//! Layered from an optional TOML file and `KPLAN_`-prefixed environment
//! variables, with `__` separating nested keys
//! (`KPLAN_COMPLETION__API_KEY`, `KPLAN_QUEUE__CONCURRENCY`).

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use kplan_llm::CompletionConfig;
use kplan_queue::QueueConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  pub completion: CompletionConfig,
  #[serde(default)]
  pub queue:      QueueConfig,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 3000 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/kplan/items.db") }

impl ServerConfig {
  /// Read `path` (if it exists) overlaid with the process environment.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    Self::from_sources(File::from(path).required(false), environment())
  }

  fn from_sources<F>(file: F, env: Environment) -> Result<Self, ConfigError>
  where
    F: config::Source + Send + Sync + 'static,
  {
    Config::builder()
      .add_source(file)
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

fn environment() -> Environment {
  Environment::with_prefix("KPLAN")
    .prefix_separator("_")
    .separator("__")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
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
  use config::{FileFormat, Map};

  use super::*;

  fn env(vars: &[(&str, &str)]) -> Environment {
    let map: Map<String, String> = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    environment().source(Some(map))
  }

  fn toml(s: &'static str) -> impl config::Source + Send + Sync + 'static {
    File::from_str(s, FileFormat::Toml)
  }

  #[test]
  fn defaults_fill_everything_but_the_api_key() {
    let cfg = ServerConfig::from_sources(
      toml("[completion]\napi_key = \"sk-test\"\n"),
      env(&[]),
    )
    .unwrap();

    assert_eq!(cfg.address(), "127.0.0.1:3000");
    assert_eq!(cfg.completion.api_key, "sk-test");
    assert_eq!(cfg.completion.model, "gpt-4o-mini");
    assert_eq!(cfg.completion.timeout_secs, 60);
    assert_eq!(cfg.queue.concurrency, 5);
    assert_eq!(cfg.queue.capacity, None);
    assert!(!cfg.queue.serialize_per_item);
  }

  #[test]
  fn missing_api_key_is_an_error() {
    assert!(ServerConfig::from_sources(toml(""), env(&[])).is_err());
  }

  #[test]
  fn environment_overrides_file() {
    let cfg = ServerConfig::from_sources(
      toml(
        "port = 8080\n\
         [completion]\napi_key = \"from-file\"\n\
         [queue]\nconcurrency = 2\n",
      ),
      env(&[
        ("KPLAN_COMPLETION__API_KEY", "from-env"),
        ("KPLAN_QUEUE__SERIALIZE_PER_ITEM", "true"),
      ]),
    )
    .unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.completion.api_key, "from-env");
    assert_eq!(cfg.queue.concurrency, 2);
    assert!(cfg.queue.serialize_per_item);
  }

  #[test]
  fn expand_tilde_leaves_absolute_paths_alone() {
    let path = Path::new("/var/lib/kplan/items.db");
    assert_eq!(expand_tilde(path), path);
  }
}
