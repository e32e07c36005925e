//! Configuration loading and root folder resolution
//!
//! Bootstrap settings come from an optional TOML file. Every lookup follows
//! the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or broken TOML file never aborts startup: a warning is logged and
//! the compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "APPLEVERSE_ROOT_FOLDER";

/// File name of the TOML bootstrap config
pub const CONFIG_FILE_NAME: &str = "appleverse.toml";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding data, images and the database
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Directory searched for dataset files
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// SQLite database file
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Number of concurrent inserts per batch
    #[serde(default)]
    pub batch_size: Option<usize>,

    /// Image directories and the URL prefix they are served under
    #[serde(default)]
    pub image_sources: Vec<ImageSourceConfig>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// One image directory and its serving prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSourceConfig {
    pub dir: PathBuf,
    pub url_prefix: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-user location of the TOML config (`<config_dir>/appleverse/appleverse.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("appleverse").join(CONFIG_FILE_NAME))
}

/// Read and parse a TOML config file
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))
}

/// Load the TOML config with graceful degradation
///
/// Uses `explicit` when given, otherwise [`default_config_path`]. Missing or
/// unparsable files fall back to `TomlConfig::default()`.
pub fn load_toml_config(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            debug!("No config directory available, using compiled defaults");
            return TomlConfig::default();
        }
    };

    if !path.exists() {
        if explicit.is_some() {
            warn!("Config file not found: {}, using defaults", path.display());
        } else {
            debug!("No config file at {}, using defaults", path.display());
        }
        return TomlConfig::default();
    }

    match read_toml_config(&path) {
        Ok(config) => {
            debug!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{}; using defaults", e);
            TomlConfig::default()
        }
    }
}

/// Resolve the root folder: CLI → ENV → TOML → compiled default
pub fn resolve_root_folder(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    toml_config: &TomlConfig,
) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
///
/// - Linux: `~/.local/share/appleverse`
/// - macOS: `~/Library/Application Support/appleverse`
/// - Windows: `%LOCALAPPDATA%\appleverse`
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("appleverse"))
        .unwrap_or_else(|| PathBuf::from("./appleverse_data"))
}
