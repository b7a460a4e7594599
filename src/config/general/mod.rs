mod log_level;

pub use log_level::LogLevel;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// General settings that are not specific to the bridge itself.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
pub struct GeneralConfig {
    /// Logging level for the application.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Write logs to a rolling file in the data directory as well as stderr.
    #[serde(default)]
    pub log_to_file: bool,
}
