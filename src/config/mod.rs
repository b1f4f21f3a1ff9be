mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Config file to use: `custom_path` when given, otherwise the first
/// default location that exists.
pub fn find_config_path(custom_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = custom_path {
        return Some(path.to_path_buf());
    }

    let default_paths = [
        "./config.toml",
        "./cinelog.toml",
        "~/.config/cinelog/config.toml",
    ];

    default_paths
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).into_owned()))
        .find(|p| p.exists())
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    match find_config_path(custom_path) {
        Some(path) => {
            tracing::debug!("Using config file {:?}", path);
            load_config(&path)
        }
        None => Ok(Config::default()),
    }
}

/// Load config like [`load_config_or_default`], resolving the database path
/// against the directory of whichever config file was used.
pub fn load_server_config(custom_path: Option<&Path>) -> Result<Config> {
    let path = find_config_path(custom_path);
    let mut config = match &path {
        Some(path) => {
            tracing::debug!("Using config file {:?}", path);
            load_config(path)?
        }
        None => Config::default(),
    };

    let config_dir = path.as_deref().and_then(Path::parent);
    config.server.database = config.server.database_path(config_dir);

    Ok(config)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.omdb.max_retries == 0 {
        anyhow::bail!("omdb.max_retries must be at least 1");
    }

    if !config.omdb.initial_delay_secs.is_finite() || config.omdb.initial_delay_secs < 0.0 {
        anyhow::bail!(
            "omdb.initial_delay_secs must be a non-negative number, got {}",
            config.omdb.initial_delay_secs
        );
    }

    if config.omdb.timeout_secs == 0 {
        anyhow::bail!("omdb.timeout_secs cannot be 0");
    }

    if !config.omdb.base_url.starts_with("http://") && !config.omdb.base_url.starts_with("https://")
    {
        anyhow::bail!("omdb.base_url must be an http(s) URL: {}", config.omdb.base_url);
    }

    if config.omdb.api_key.as_deref().map_or(true, str::is_empty) {
        tracing::warn!("No OMDb API key configured; falling back to the OMDB_API_KEY environment variable");
    }

    Ok(())
}
