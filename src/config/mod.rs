//! Configuration file loading and parsing.
//!
//! This module handles loading the configuration file from disk and parsing
//! it into validated, type-safe structures.
//!
//! # Configuration File Locations
//!
//! The configuration file is searched in the following order:
//!
//! 1. Path given as the first CLI argument (must exist)
//! 2. Default location, if present:
//!    - **Linux/macOS:** `~/.mcp-beproduct/config.json`
//!    - **Windows:** `%USERPROFILE%\.mcp-beproduct\config.json`
//! 3. Built-in defaults
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "catalog": { "data_file": "/srv/catalog.json", "low_stock_threshold": 25 },
//!   "logging": { "level": "info" }
//! }
//! ```
//!
//! A relative `data_file` is resolved against the config file's directory,
//! not the working directory.

mod settings;

pub use settings::{CatalogConfig, Config, LoggingConfig, LOG_LEVELS};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.mcp-beproduct/`
/// - **Windows:** `%USERPROFILE%\.mcp-beproduct\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".mcp-beproduct"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, the default location is tried and built-in defaults
/// are returned when no file exists there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given configuration file cannot be found
/// - The file cannot be read
/// - The JSON is malformed
/// - Required fields are missing or invalid
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ConfigError::NotFound {
                    path: p.to_path_buf(),
                });
            }
            p.to_path_buf()
        }
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => return Ok(Config::default()),
        },
    };

    load_config_file(&config_path)
}

fn load_config_file(config_path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    let mut config: Config =
        serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: config_path.to_path_buf(),
            source: e,
        })?;

    if let Some(dir) = config_path.parent() {
        config.catalog.resolve_data_file(dir);
    }

    // Validate the configuration
    config.validate()?;

    Ok(config)
}
