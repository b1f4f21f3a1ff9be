use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metadata::providers::omdb::{OMDB_BASE_URL, REQUEST_TIMEOUT};
use crate::metadata::retry::{RetryPolicy, DEFAULT_INITIAL_DELAY, DEFAULT_MAX_ATTEMPTS};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub omdb: OmdbConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite database file. See [`ServerConfig::database_path`] for how
    /// relative paths resolve.
    #[serde(default = "default_database")]
    pub database: PathBuf,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5002
}
fn default_database() -> PathBuf {
    PathBuf::from("cinelog.sqlite")
}

impl ServerConfig {
    /// Database file with `~` expanded. A relative path is joined onto
    /// `config_dir` (the directory of the loaded config file); without one it
    /// stays relative to the working directory.
    pub fn database_path(&self, config_dir: Option<&Path>) -> PathBuf {
        let expanded = PathBuf::from(
            shellexpand::tilde(&self.database.to_string_lossy()).into_owned(),
        );
        match config_dir {
            Some(dir) if expanded.is_relative() => dir.join(expanded),
            _ => expanded,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. When unset, `OMDB_API_KEY` is read at lookup time.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Total attempts per lookup when the service answers HTTP 500.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay after the first failed attempt; doubles after each further one.
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: f64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    OMDB_BASE_URL.to_string()
}
fn default_max_retries() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}
fn default_initial_delay_secs() -> f64 {
    DEFAULT_INITIAL_DELAY.as_secs_f64()
}
fn default_timeout_secs() -> u64 {
    REQUEST_TIMEOUT.as_secs()
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            max_retries: default_max_retries(),
            initial_delay_secs: default_initial_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OmdbConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        let initial_delay =
            Duration::try_from_secs_f64(self.initial_delay_secs).unwrap_or(DEFAULT_INITIAL_DELAY);
        RetryPolicy::new(self.max_retries, initial_delay)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
