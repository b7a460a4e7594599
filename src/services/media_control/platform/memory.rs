use std::{collections::HashSet, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    CommandHandler, HandlerTable, Interruption, MediaPlatform, RegistrationId, SignalSink,
};
use crate::services::media_control::{Command, EventValue, MediaControlError, NowPlayingInfo};

#[derive(Debug, Default)]
struct SurfaceState {
    now_playing: Option<NowPlayingInfo>,
    background_mode: bool,
    interruption_sink: Option<SignalSink>,
    refused: HashSet<Command>,
}

/// Media surface that lives in process memory.
///
/// Behaves like an OS framework that accepts every registration unless told
/// otherwise. Commands and interruptions are injected with [`deliver`] and
/// [`interrupt`], as if a user pressed a hardware key.
///
/// [`deliver`]: MemoryPlatform::deliver
/// [`interrupt`]: MemoryPlatform::interrupt
#[derive(Debug, Clone, Default)]
pub struct MemoryPlatform {
    handlers: HandlerTable,
    surface: Arc<RwLock<SurfaceState>>,
}

impl MemoryPlatform {
    /// Creates an empty surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the OS delivering `command`. Returns how many handlers ran.
    pub async fn deliver(&self, command: Command, value: Option<EventValue>) -> usize {
        self.handlers.dispatch(command, value).await
    }

    /// Simulates an audio interruption. Returns false if nobody observes them.
    pub async fn interrupt(&self, interruption: Interruption) -> bool {
        let surface = self.surface.read().await;
        match &surface.interruption_sink {
            Some(sink) => sink.interruption(interruption),
            None => false,
        }
    }

    /// Makes future registrations of `command` fail.
    pub async fn refuse(&self, command: Command) {
        self.surface.write().await.refused.insert(command);
    }

    /// Number of live registrations.
    pub async fn registrations(&self) -> usize {
        self.handlers.len().await
    }

    /// Number of live registrations for `command`.
    pub async fn registrations_for(&self, command: Command) -> usize {
        self.handlers.count(command).await
    }

    /// Record currently displayed, if any.
    pub async fn now_playing(&self) -> Option<NowPlayingInfo> {
        self.surface.read().await.now_playing.clone()
    }

    /// Whether background mode was requested.
    pub async fn background_mode(&self) -> bool {
        self.surface.read().await.background_mode
    }

    /// Whether interruptions are currently observed.
    pub async fn observing_interruptions(&self) -> bool {
        self.surface.read().await.interruption_sink.is_some()
    }
}

#[async_trait]
impl MediaPlatform for MemoryPlatform {
    fn name(&self) -> &str {
        "memory"
    }

    async fn register_command_handler(
        &self,
        handler: CommandHandler,
    ) -> Result<RegistrationId, MediaControlError> {
        let command = handler.command();
        if self.surface.read().await.refused.contains(&command) {
            return Err(MediaControlError::RegistrationFailed {
                command,
                reason: "refused by surface".to_string(),
            });
        }

        let id = self.handlers.insert(handler).await;
        debug!(%command, %id, "registered handler");
        Ok(id)
    }

    async fn unregister_command_handler(
        &self,
        id: RegistrationId,
    ) -> Result<(), MediaControlError> {
        if let Some(handler) = self.handlers.remove(id).await {
            debug!(command = %handler.command(), %id, "unregistered handler");
        }
        Ok(())
    }

    async fn set_now_playing_info(&self, info: &NowPlayingInfo) -> Result<(), MediaControlError> {
        self.surface.write().await.now_playing = Some(info.clone());
        Ok(())
    }

    async fn clear_now_playing_info(&self) -> Result<(), MediaControlError> {
        self.surface.write().await.now_playing = None;
        Ok(())
    }

    async fn set_background_mode(&self, enabled: bool) -> Result<(), MediaControlError> {
        self.surface.write().await.background_mode = enabled;
        Ok(())
    }

    async fn observe_interruptions(
        &self,
        sink: Option<SignalSink>,
    ) -> Result<(), MediaControlError> {
        self.surface.write().await.interruption_sink = sink;
        Ok(())
    }
}
