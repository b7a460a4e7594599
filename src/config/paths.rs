use std::{env, path::PathBuf};

use crate::{MusicControlError, Result};

const APP_DIR: &str = "music-control";

/// Utility struct for managing configuration file paths
///
/// Provides methods to locate configuration and data directories following
/// the XDG Base Directory specification
pub struct ConfigPaths;

impl ConfigPaths {
    /// Returns the configuration directory path for the application
    ///
    /// - First checks `XDG_CONFIG_HOME`
    /// - Falls back to `$HOME/.config`
    /// - Appends "music-control" to the base config directory
    ///
    /// # Errors
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` environment variables are set
    pub fn config_dir() -> Result<PathBuf> {
        let config_home = env::var("XDG_CONFIG_HOME")
            .or_else(|_| env::var("HOME").map(|home| format!("{home}/.config")))
            .map_err(|_| MusicControlError::MissingHome("config"))?;

        Ok(PathBuf::from(config_home).join(APP_DIR))
    }

    /// Returns the application data directory path
    ///
    /// Uses `XDG_DATA_HOME`, falling back to `$HOME/.local/share`.
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if no base directory resolves or it cannot be created
    pub fn data_dir() -> Result<PathBuf> {
        let data_home = env::var("XDG_DATA_HOME")
            .or_else(|_| env::var("HOME").map(|home| format!("{home}/.local/share")))
            .map_err(|_| MusicControlError::MissingHome("data"))?;

        let app_dir = PathBuf::from(data_home).join(APP_DIR);
        if !app_dir.exists() {
            std::fs::create_dir_all(&app_dir).map_err(|e| MusicControlError::io_at(e, &app_dir))?;
        }

        Ok(app_dir)
    }

    /// Get the application log directory
    ///
    /// # Errors
    /// Returns error if directory cannot be created
    pub fn log_dir() -> Result<PathBuf> {
        let log_dir = Self::data_dir()?.join("logs");

        if !log_dir.exists() {
            std::fs::create_dir_all(&log_dir).map_err(|e| MusicControlError::io_at(e, &log_dir))?;
        }

        Ok(log_dir)
    }

    /// Returns the path to the main configuration file
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be resolved
    pub fn main_config() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}
