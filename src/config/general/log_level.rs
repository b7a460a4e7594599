use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Logging level for the bridge host.
///
/// Used as the filter directive when `RUST_LOG` is not set.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only failures that stop the bridge from working.
    Error,

    /// Refused registrations, unavailable surfaces and other recoverable problems.
    Warn,

    /// Enable/disable transitions and configuration (default level).
    #[default]
    Info,

    /// Every command and metadata push.
    Debug,

    /// Dispatcher internals.
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}
