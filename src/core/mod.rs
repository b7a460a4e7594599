use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error types for the music-control application.
///
/// Covers configuration loading and the filesystem work around it. Bridge
/// runtime failures live in
/// [`MediaControlError`](crate::services::media_control::MediaControlError)
/// and are delivered as events instead.
#[derive(Error, Debug)]
pub enum MusicControlError {
    /// Configuration field missing or invalid
    #[error("invalid config field '{field}': {reason}")]
    InvalidConfigField {
        /// The field that is invalid
        field: String,
        /// Reason why the field is invalid
        reason: String,
    },

    /// Neither `XDG_CONFIG_HOME` nor `HOME` could be resolved
    #[error("cannot resolve {0} directory: neither XDG nor HOME variables are set")]
    MissingHome(&'static str),

    /// I/O operation error with path context
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// Standard I/O operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error with location context
    #[error("failed to parse TOML at '{location}': {details}")]
    TomlParseError {
        /// Location of TOML being parsed (file path or "string")
        location: String,
        /// Parse error details
        details: String,
    },
}

/// A specialized `Result` type for music-control operations.
pub type Result<T> = std::result::Result<T, MusicControlError>;

impl MusicControlError {
    /// Creates a TOML parsing error with optional file path context.
    pub fn toml_parse(error: impl std::fmt::Display, path: Option<&Path>) -> Self {
        let location = match path {
            Some(p) => {
                let clean_path = p.canonicalize().unwrap_or_else(|_| p.to_path_buf());
                clean_path.to_string_lossy().to_string()
            }
            None => "string".to_string(),
        };

        MusicControlError::TomlParseError {
            location,
            details: error.to_string(),
        }
    }

    /// Wraps an I/O failure with the path it happened on.
    pub fn io_at(error: std::io::Error, path: &Path) -> Self {
        MusicControlError::IoError {
            path: path.to_path_buf(),
            details: error.to_string(),
        }
    }
}
