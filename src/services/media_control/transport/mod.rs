//! Host-runtime transports.
//!
//! Each adapter is a thin layer over [`MusicControl`](super::MusicControl)
//! and is compiled in by its cargo feature.

/// Direct-invocation module with typed arguments
#[cfg(feature = "direct-module")]
pub mod direct;
/// Event-emitter bridge taking key/value maps
#[cfg(feature = "legacy-bridge")]
pub mod legacy;

#[cfg(feature = "direct-module")]
pub use direct::{DirectModule, Subscription};
#[cfg(feature = "legacy-bridge")]
pub use legacy::{EVENT_CHANNEL, EventEmitter, LegacyBridge};
