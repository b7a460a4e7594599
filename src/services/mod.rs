/// Shared building blocks for services
pub mod common;
/// System media controls bridge
pub mod media_control;

pub use media_control::{MediaControlBridge, MusicControl};
