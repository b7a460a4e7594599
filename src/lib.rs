//! music-control - system media controls for application runtimes.
//!
//! Publishes now-playing information to the operating system's media
//! surface and delivers remote-control commands (media keys, lock screen,
//! desktop widgets) back to the application as named events.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use futures::StreamExt;
//! use music_control::services::media_control::{
//!     BridgeOptions, MediaControlBridge, MemoryPlatform, MetadataUpdate, MusicControl,
//! };
//!
//! # async fn run() {
//! let bridge = MediaControlBridge::new(Arc::new(MemoryPlatform::new()), BridgeOptions::default());
//! let mut events = bridge.events();
//!
//! bridge.enable().await;
//! bridge
//!     .update_metadata(MetadataUpdate {
//!         title: Some("Souvlaki Space Station".to_string()),
//!         ..Default::default()
//!     })
//!     .await;
//!
//! while let Some(event) = events.next().await {
//!     println!("{}", event.name());
//! }
//! # }
//! ```

/// Configuration schema definitions and loading.
pub mod config;

/// Core error types and result aliases.
pub mod core;

/// Media control services.
pub mod services;

/// Logging initialisation.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use core::{MusicControlError, Result};
