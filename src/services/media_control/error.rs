use serde::Serialize;

use super::Command;

/// Errors that can occur while bridging media controls
#[derive(thiserror::Error, Debug)]
pub enum MediaControlError {
    /// The OS media framework is absent or unreachable
    #[error("media control framework unavailable: {0}")]
    UnsupportedPlatform(String),

    /// The OS refused to register a command handler
    #[error("registration of '{command}' refused: {reason}")]
    RegistrationFailed {
        /// Command whose handler was refused
        command: Command,
        /// Reason reported by the platform
        reason: String,
    },

    /// Malformed fields passed to a metadata or playback update
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Unknown method, control name or argument shape
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// D-Bus communication error
    #[error("D-Bus operation failed: {0}")]
    DbusError(#[from] zbus::Error),
}

/// Distinguishable error kinds delivered in `error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// See [`MediaControlError::UnsupportedPlatform`]
    UnsupportedPlatform,
    /// See [`MediaControlError::RegistrationFailed`]
    RegistrationFailed,
    /// See [`MediaControlError::InvalidMetadata`]
    InvalidMetadata,
    /// See [`MediaControlError::InvalidArgument`]
    InvalidArgument,
    /// Transport failure talking to the OS surface
    Platform,
}

impl MediaControlError {
    /// Kind reported to the application layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MediaControlError::UnsupportedPlatform(_) => ErrorKind::UnsupportedPlatform,
            MediaControlError::RegistrationFailed { .. } => ErrorKind::RegistrationFailed,
            MediaControlError::InvalidMetadata(_) => ErrorKind::InvalidMetadata,
            MediaControlError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            MediaControlError::DbusError(_) => ErrorKind::Platform,
        }
    }
}
