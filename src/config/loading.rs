use std::{fs, io::ErrorKind, path::Path};

use schemars::schema_for;
use tracing::{debug, info, instrument};

use super::{Config, ConfigPaths};
use crate::{MusicControlError, Result};

impl Config {
    /// Loads configuration from `path`.
    ///
    /// # Errors
    /// Returns error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    #[instrument]
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| MusicControlError::io_at(e, path))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| MusicControlError::toml_parse(e, Some(path)))?;
        config.validate()?;

        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Loads the main configuration file, or defaults if it does not exist.
    ///
    /// # Errors
    /// Returns error if the config directory cannot be resolved or an
    /// existing file is invalid.
    pub fn load_or_default() -> Result<Config> {
        let path = ConfigPaths::main_config()?;
        match Self::load(&path) {
            Err(MusicControlError::IoError { .. }) if !path.exists() => {
                debug!(path = %path.display(), "No configuration file, using defaults");
                Ok(Config::default())
            }
            other => other,
        }
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    /// Returns error if the string is not valid TOML or fails validation.
    pub fn from_toml(content: &str) -> Result<Config> {
        let config: Config =
            toml::from_str(content).map_err(|e| MusicControlError::toml_parse(e, None))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values serde cannot.
    ///
    /// # Errors
    /// Returns `MusicControlError::InvalidConfigField` for the first bad field.
    pub fn validate(&self) -> Result<()> {
        let bridge = &self.bridge;

        if !bridge.skip_interval.is_finite() || bridge.skip_interval <= 0.0 {
            return Err(invalid(
                "bridge.skip_interval",
                format!("must be a positive number, got {}", bridge.skip_interval),
            ));
        }

        if bridge.event_capacity == 0 {
            return Err(invalid("bridge.event_capacity", "must be at least 1".to_string()));
        }

        let name_ok = !bridge.player_name.is_empty()
            && !bridge.player_name.starts_with(|c: char| c.is_ascii_digit())
            && bridge
                .player_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !name_ok {
            return Err(invalid(
                "bridge.player_name",
                format!(
                    "'{}' is not a valid bus name element (letters, digits, underscores)",
                    bridge.player_name
                ),
            ));
        }

        Ok(())
    }

    /// JSON schema of the configuration file, pretty-printed.
    ///
    /// # Errors
    /// Returns error if the schema cannot be serialized.
    pub fn json_schema() -> Result<String> {
        serde_json::to_string_pretty(&schema_for!(Config)).map_err(|e| {
            MusicControlError::Io(std::io::Error::new(ErrorKind::InvalidData, e))
        })
    }
}

fn invalid(field: &str, reason: String) -> MusicControlError {
    MusicControlError::InvalidConfigField {
        field: field.to_string(),
        reason,
    }
}
