use std::{
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{Stream, StreamExt, stream::BoxStream};

use crate::services::media_control::{
    BridgeEvent, Command, ControlOptions, MetadataUpdate, MusicControl, NowPlayingInfo,
    PlaybackUpdate,
};

/// Direct-invocation module.
///
/// Arguments are already typed by the host's code generator, so nothing is
/// parsed here. Listeners are counted for as long as a [`Subscription`]
/// lives.
pub struct DirectModule<M: MusicControl + 'static> {
    module: Arc<M>,
}

impl<M: MusicControl + 'static> Clone for DirectModule<M> {
    fn clone(&self) -> Self {
        Self {
            module: Arc::clone(&self.module),
        }
    }
}

impl<M: MusicControl + 'static> DirectModule<M> {
    /// Module name the host registers this under.
    pub const NAME: &'static str = "MusicControlManager";

    /// Wrap `module`.
    pub fn new(module: Arc<M>) -> Self {
        Self { module }
    }

    /// See [`MusicControl::enable`].
    pub async fn enable(&self) {
        self.module.enable().await;
    }

    /// See [`MusicControl::disable`].
    pub async fn disable(&self) {
        self.module.disable().await;
    }

    /// See [`MusicControl::is_enabled`].
    pub fn is_enabled(&self) -> bool {
        self.module.is_enabled()
    }

    /// See [`MusicControl::update_metadata`].
    pub async fn set_now_playing(&self, info: MetadataUpdate) {
        self.module.update_metadata(info).await;
    }

    /// See [`MusicControl::update_playback`].
    pub async fn update_playback(&self, info: PlaybackUpdate) {
        self.module.update_playback(info).await;
    }

    /// See [`MusicControl::reset_now_playing`].
    pub async fn reset_now_playing(&self) {
        self.module.reset_now_playing().await;
    }

    /// See [`MusicControl::stop_control`].
    pub async fn stop_control(&self) {
        self.module.stop_control().await;
    }

    /// See [`MusicControl::enable_control`].
    pub async fn enable_control(&self, command: Command, enable: bool, options: ControlOptions) {
        self.module.enable_control(command, enable, options).await;
    }

    /// See [`MusicControl::enable_background_mode`].
    pub async fn enable_background_mode(&self, enable: bool) {
        self.module.enable_background_mode(enable).await;
    }

    /// See [`MusicControl::observe_audio_interruptions`].
    pub async fn observe_audio_interruptions(&self, enable: bool) {
        self.module.observe_audio_interruptions(enable).await;
    }

    /// See [`MusicControl::now_playing`].
    pub fn now_playing(&self) -> NowPlayingInfo {
        self.module.now_playing()
    }

    /// Subscribe to events; counts as one listener until dropped.
    pub fn subscribe(&self) -> Subscription {
        self.module.add_listener(Self::NAME);
        let module: Arc<dyn MusicControl> = self.module.clone();
        Subscription {
            events: self.module.events(),
            module,
        }
    }
}

/// Event stream tied to one listener registration.
pub struct Subscription {
    events: BoxStream<'static, BridgeEvent>,
    module: Arc<dyn MusicControl>,
}

impl Stream for Subscription {
    type Item = BridgeEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().events.poll_next_unpin(cx)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.module.remove_listeners(1);
    }
}
