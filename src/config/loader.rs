use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::{ExemptionConfig, Settings};

/// Environment variable naming the settings file.
pub const CONFIG_ENV_VAR: &str = "IMMUTABLE_FLUX_CONFIG";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Settings {
    /// Returns the settings path from `IMMUTABLE_FLUX_CONFIG`, if set.
    pub fn config_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from)
    }

    /// Loads settings from the file named by `IMMUTABLE_FLUX_CONFIG`.
    ///
    /// Without the variable, returns `Settings::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Settings::default()),
        }
    }

    /// Loads settings from a TOML file.
    ///
    /// - If the file doesn't exist, returns `Settings::default()`.
    /// - If the file exists, parses it as TOML and validates.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let settings: Settings = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        settings.validate()?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    /// Parses and validates settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::from("<inline>"),
            source: e,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates the settings.
    ///
    /// Checks that no exemption is declared for an empty key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(exemptions) = &self.mixin.ignore_immutable_check {
            validate_exemptions(exemptions)?;
        }
        Ok(())
    }
}

fn validate_exemptions(exemptions: &ExemptionConfig) -> Result<(), ConfigError> {
    let partitions = [
        ("props", &exemptions.props),
        ("state", &exemptions.state),
        ("shared", &exemptions.shared),
    ];
    for (name, partition) in partitions {
        if partition.keys().any(|key| key.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                message: format!("Empty key in '{}' exemptions", name),
            });
        }
    }
    Ok(())
}
