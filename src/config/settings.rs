//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Log levels accepted in `logging.level`.
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Catalog data settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            });
        }

        if let Some(ref data_file) = self.catalog.data_file {
            if !data_file.is_file() {
                return Err(ConfigError::ValidationError {
                    message: format!("Catalog data file '{}' does not exist", data_file.display()),
                });
            }
        }

        Ok(())
    }
}

/// Catalog data configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// JSON file to seed the catalog from. The bundled sample catalog is used
    /// when unset. A relative path is taken relative to the config file.
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    /// Products with fewer available units are flagged in inventory reports.
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,
}

impl CatalogConfig {
    /// Resolves a relative `data_file` against `base`, the directory of the
    /// config file it was read from.
    pub fn resolve_data_file(&mut self, base: &Path) {
        if let Some(ref mut path) = self.data_file {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            low_stock_threshold: default_low_stock_threshold(),
        }
    }
}

const fn default_low_stock_threshold() -> u32 {
    25
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
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
    "warn".to_string()
}
