use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

pub const CONFIG_FILE: &str = "treetable.toml";

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Where the config for a task file lives: `explicit` if given, otherwise
/// `treetable.toml` next to the task file.
pub fn config_path(explicit: Option<&Path>, task_file: &Path) -> PathBuf {
    match explicit {
        Some(p) => p.to_path_buf(),
        None => {
            let dir = task_file.parent().unwrap_or(Path::new(""));
            dir.join(CONFIG_FILE)
        }
    }
}

/// Load the config. An explicit path must exist; the implicit sibling file is
/// optional and falls back to defaults.
pub fn load_config(explicit: Option<&Path>, task_file: &Path) -> Result<Config, ConfigError> {
    let path = config_path(explicit, task_file);
    if explicit.is_none() && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file; using defaults");
        return Ok(Config::default());
    }
    let text = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), ?config, "loaded config");
    Ok(config)
}
