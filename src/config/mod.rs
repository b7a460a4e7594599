//! Configuration schema definitions and loading.
//!
//! All configuration is TOML with defaults for every field; a missing file
//! means the defaults.

mod bridge;
mod general;
mod loading;
mod paths;

#[cfg(test)]
mod tests;

pub use bridge::{BridgeConfig, PlatformKind};
pub use general::{GeneralConfig, LogLevel};
pub use paths::ConfigPaths;

use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema, Default, PartialEq)]
pub struct Config {
    /// General application settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Media control bridge settings.
    #[serde(default)]
    pub bridge: BridgeConfig,
}
