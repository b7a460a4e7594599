use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::services::media_control::{
    BridgeOptions, Command,
    bridge::{DEFAULT_CONTROLS, DEFAULT_SKIP_INTERVAL},
};

/// Which OS media surface the bridge talks to.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    /// MPRIS on the D-Bus session bus
    #[default]
    Mpris,
    /// In-process surface, nothing is shown to the user
    Memory,
    /// No surface; enabling reports an unsupported platform
    None,
}

/// Media control bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct BridgeConfig {
    /// Media surface to publish on.
    pub platform: PlatformKind,

    /// Bus name suffix, `org.mpris.MediaPlayer2.<player_name>`.
    pub player_name: String,

    /// Human-readable player name shown by desktop widgets.
    pub identity: String,

    /// Controls registered when the bridge is enabled.
    pub controls: Vec<Command>,

    /// Default skip-forward/skip-backward interval in seconds.
    pub skip_interval: f64,

    /// Turn audio interruptions into pause/play events.
    pub observe_interruptions: bool,

    /// Ask the OS to keep audio running in the background.
    pub background_mode: bool,

    /// Events buffered per subscriber before the oldest are dropped.
    pub event_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            platform: PlatformKind::default(),
            player_name: "music_control".to_string(),
            identity: "Music Control".to_string(),
            controls: DEFAULT_CONTROLS.to_vec(),
            skip_interval: DEFAULT_SKIP_INTERVAL,
            observe_interruptions: false,
            background_mode: false,
            event_capacity: 64,
        }
    }
}

impl From<&BridgeConfig> for BridgeOptions {
    fn from(config: &BridgeConfig) -> Self {
        Self {
            controls: config.controls.clone(),
            skip_interval: config.skip_interval,
            observe_interruptions: config.observe_interruptions,
            event_capacity: config.event_capacity,
        }
    }
}
