//! Configuration loading and root folder resolution
//!
//! Resolution order for the config file:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Platform config directory (`<config_dir>/showcase/showcase.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is never fatal: the service logs a warning and
//! starts with defaults.

use crate::db::models::NewVideo;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SHOWCASE_CONFIG";

/// Config file name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "showcase.toml";

/// Default HTTP port for the view counter service
pub const DEFAULT_PORT: u16 = 5780;

/// Minimum contiguous watch time before a session counts as a view
pub const DEFAULT_MIN_WATCH_SECONDS: u64 = 3;

/// TOML configuration file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Folder holding `showcase.db`
    pub root_folder: Option<PathBuf>,
    pub bind_address: String,
    pub port: u16,
    /// Server-side floor on reported watch duration
    pub min_watch_seconds: u64,
    pub log_level: String,
    /// Catalog entries upserted at startup
    pub videos: Vec<NewVideo>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            bind_address: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            min_watch_seconds: DEFAULT_MIN_WATCH_SECONDS,
            log_level: "info".to_string(),
            videos: Vec::new(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject catalog entries that cannot be served
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for video in &self.videos {
            if video.id.trim().is_empty() {
                return Err(Error::Config("video id must not be empty".to_string()));
            }
            if !seen.insert(video.id.as_str()) {
                return Err(Error::Config(format!("duplicate video id: {}", video.id)));
            }
            if video.duration_seconds < 0 {
                return Err(Error::Config(format!(
                    "video {} has negative duration",
                    video.id
                )));
            }
        }
        Ok(())
    }

    /// Root folder from the config, or the platform default
    pub fn root_folder_or_default(&self) -> PathBuf {
        self.root_folder
            .clone()
            .unwrap_or_else(default_root_folder)
    }
}

/// Locate the config file following the priority order in the module docs
///
/// Returns `None` when no candidate exists.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3: Platform config directory
    dirs::config_dir()
        .map(|d| d.join("showcase").join(CONFIG_FILE_NAME))
        .filter(|p| p.exists())
}

/// Load configuration with graceful degradation
///
/// An explicitly named file that fails to parse is an error; a file that is
/// simply absent yields defaults.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = resolve_config_path(cli_arg) else {
        info!("No config file found, using compiled defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!("Config file {} not found, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let config = TomlConfig::load(&path)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("showcase"))
        .unwrap_or_else(|| PathBuf::from("./showcase_data"))
}
