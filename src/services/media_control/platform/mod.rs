//! The OS media framework, seen as a capability.
//!
//! A platform accepts command handlers and a now-playing record. Handlers
//! may be invoked from any thread or task; they only enqueue, the bridge's
//! dispatcher does the rest.

/// In-process surface for tests and headless hosts
pub mod memory;
/// MPRIS surface on the D-Bus session bus
pub mod mpris;

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::{RwLock, mpsc};
use tracing::trace;

pub use memory::MemoryPlatform;
pub use mpris::MprisPlatform;

use super::{Command, EventValue, MediaControlError, NowPlayingInfo};

/// Handle for one registered command handler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Audio session interruption reported by the OS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interruption {
    /// Another audio source took over
    Began,
    /// The interruption is over
    Ended {
        /// Whether the OS suggests resuming playback
        should_resume: bool,
    },
}

/// Something the OS told the bridge
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformSignal {
    /// A remote-control command
    Command {
        /// Delivered command
        command: Command,
        /// Payload, if the OS supplied one
        value: Option<EventValue>,
    },
    /// An audio session interruption
    Interruption(Interruption),
}

/// Fire-and-forget channel from OS callback context to the bridge.
///
/// Carries the enable session it was created for; signals sent once that
/// session is no longer active are dropped here, before they are queued.
#[derive(Debug, Clone)]
pub struct SignalSink {
    session: u64,
    active: Arc<AtomicU64>,
    tx: mpsc::UnboundedSender<PlatformSignal>,
}

impl SignalSink {
    pub(crate) fn new(
        session: u64,
        active: Arc<AtomicU64>,
        tx: mpsc::UnboundedSender<PlatformSignal>,
    ) -> Self {
        Self { session, active, tx }
    }

    /// Whether this sink's enable session is the active one.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire) == self.session
    }

    /// Enqueues a signal. Returns false if the session has ended or the
    /// bridge is gone.
    pub fn send(&self, signal: PlatformSignal) -> bool {
        if !self.is_active() {
            trace!(session = self.session, "dropping signal from inactive session");
            return false;
        }
        self.tx.send(signal).is_ok()
    }

    /// Enqueues an interruption.
    pub fn interruption(&self, interruption: Interruption) -> bool {
        self.send(PlatformSignal::Interruption(interruption))
    }
}

/// Callback registered for one command
#[derive(Debug, Clone)]
pub struct CommandHandler {
    command: Command,
    default_value: Option<EventValue>,
    sink: SignalSink,
}

impl CommandHandler {
    /// Creates a handler. `default_value` is used when the OS delivers the
    /// command without a payload (skip intervals).
    pub fn new(command: Command, default_value: Option<EventValue>, sink: SignalSink) -> Self {
        Self {
            command,
            default_value,
            sink,
        }
    }

    /// Command this handler answers.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Called by the platform when the OS delivers the command.
    pub fn invoke(&self, value: Option<EventValue>) -> bool {
        self.sink.send(PlatformSignal::Command {
            command: self.command,
            value: value.or(self.default_value),
        })
    }
}

/// Operating-system media framework capability.
///
/// Mirrors the two collaborator calls a media framework offers: register a
/// handler per remote command, and set the now-playing record.
#[async_trait]
pub trait MediaPlatform: Send + Sync {
    /// Short platform name for logs.
    fn name(&self) -> &str;

    /// Checks the framework is reachable before any registration.
    ///
    /// # Errors
    /// `UnsupportedPlatform` if the framework is absent.
    async fn activate(&self) -> Result<(), MediaControlError> {
        Ok(())
    }

    /// Registers a handler for the handler's command.
    ///
    /// # Errors
    /// `UnsupportedPlatform` if the framework is absent,
    /// `RegistrationFailed` if the OS refuses this command.
    async fn register_command_handler(
        &self,
        handler: CommandHandler,
    ) -> Result<RegistrationId, MediaControlError>;

    /// Releases a registration. Unknown ids are ignored.
    ///
    /// # Errors
    /// `UnsupportedPlatform` if the framework is absent.
    async fn unregister_command_handler(&self, id: RegistrationId)
    -> Result<(), MediaControlError>;

    /// Replaces the displayed now-playing record.
    ///
    /// # Errors
    /// `UnsupportedPlatform` if the surface is unavailable.
    async fn set_now_playing_info(&self, info: &NowPlayingInfo) -> Result<(), MediaControlError>;

    /// Removes the now-playing record from the surface.
    ///
    /// # Errors
    /// `UnsupportedPlatform` if the surface is unavailable.
    async fn clear_now_playing_info(&self) -> Result<(), MediaControlError>;

    /// Asks the OS to keep audio running in the background.
    ///
    /// # Errors
    /// Platform specific.
    async fn set_background_mode(&self, _enabled: bool) -> Result<(), MediaControlError> {
        Ok(())
    }

    /// Starts (`Some`) or stops (`None`) forwarding audio interruptions.
    ///
    /// # Errors
    /// Platform specific.
    async fn observe_interruptions(
        &self,
        _sink: Option<SignalSink>,
    ) -> Result<(), MediaControlError> {
        Ok(())
    }
}

/// Stand-in used when no media framework is reachable.
#[derive(Debug, Clone)]
pub struct UnavailablePlatform {
    reason: String,
}

impl UnavailablePlatform {
    /// Creates a platform that fails every call with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> MediaControlError {
        MediaControlError::UnsupportedPlatform(self.reason.clone())
    }
}

#[async_trait]
impl MediaPlatform for UnavailablePlatform {
    fn name(&self) -> &str {
        "unavailable"
    }

    async fn activate(&self) -> Result<(), MediaControlError> {
        Err(self.error())
    }

    async fn register_command_handler(
        &self,
        _handler: CommandHandler,
    ) -> Result<RegistrationId, MediaControlError> {
        Err(self.error())
    }

    async fn unregister_command_handler(
        &self,
        _id: RegistrationId,
    ) -> Result<(), MediaControlError> {
        Err(self.error())
    }

    async fn set_now_playing_info(&self, _info: &NowPlayingInfo) -> Result<(), MediaControlError> {
        Err(self.error())
    }

    async fn clear_now_playing_info(&self) -> Result<(), MediaControlError> {
        Err(self.error())
    }
}

/// Registered handlers, shared between a platform and its OS callbacks.
#[derive(Debug, Clone, Default)]
pub(crate) struct HandlerTable {
    handlers: Arc<RwLock<HashMap<RegistrationId, CommandHandler>>>,
    next_id: Arc<AtomicU64>,
}

impl HandlerTable {
    pub(crate) async fn insert(&self, handler: CommandHandler) -> RegistrationId {
        let id = RegistrationId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.handlers.write().await.insert(id, handler);
        id
    }

    pub(crate) async fn remove(&self, id: RegistrationId) -> Option<CommandHandler> {
        self.handlers.write().await.remove(&id)
    }

    /// Invokes every handler registered for `command`; returns how many ran.
    pub(crate) async fn dispatch(&self, command: Command, value: Option<EventValue>) -> usize {
        let handlers = self.handlers.read().await;
        let mut invoked = 0;
        for handler in handlers.values().filter(|h| h.command == command) {
            if handler.invoke(value) {
                invoked += 1;
            }
        }
        trace!(%command, invoked, "dispatched OS command");
        invoked
    }

    pub(crate) async fn count(&self, command: Command) -> usize {
        self.handlers
            .read()
            .await
            .values()
            .filter(|h| h.command == command)
            .count()
    }

    pub(crate) async fn len(&self) -> usize {
        self.handlers.read().await.len()
    }
}
