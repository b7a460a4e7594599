//! Media control bridge.
//!
//! Mirrors now-playing info to the OS media surface and turns OS
//! remote-control commands (media keys, lock screen, desktop widgets) into
//! named events for the application layer.

/// Bridge core: enable/disable, now-playing mirror, event dispatch
pub mod bridge;
/// Media control error types
pub mod error;
/// Events delivered to the application layer
pub mod events;
/// Now-playing record and partial updates
pub mod metadata;
/// OS media framework seam and its implementations
pub mod platform;
/// The interface transports adapt
pub mod service;
/// Host-runtime transport adapters
pub mod transport;
/// Commands, controls and playback types
pub mod types;

#[cfg(test)]
mod tests;

pub use bridge::{BridgeOptions, MediaControlBridge};
pub use error::*;
pub use events::*;
pub use metadata::*;
pub use platform::{MediaPlatform, MemoryPlatform, MprisPlatform, UnavailablePlatform};
pub use service::*;
pub use types::*;
