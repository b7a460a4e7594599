use async_trait::async_trait;
use futures::stream::BoxStream;

use super::{
    BridgeEvent, Command, ControlOptions, MediaControlError, MetadataUpdate, NowPlayingInfo,
    PlaybackUpdate,
};

/// Media control operations offered to the application layer.
///
/// This is the one interface both transports adapt: the legacy event
/// emitter and the direct-invocation module call through it and never reach
/// the platform themselves. None of the operations return errors; failures
/// are delivered as `error` events on [`events`](MusicControl::events).
#[async_trait]
pub trait MusicControl: Send + Sync {
    /// Start listening for remote-control commands. Idempotent.
    async fn enable(&self);

    /// Stop listening and release every OS registration. Idempotent.
    async fn disable(&self);

    /// Whether remote-control commands are currently delivered.
    fn is_enabled(&self) -> bool;

    /// Merge a metadata update into the now-playing record and push it.
    async fn update_metadata(&self, update: MetadataUpdate);

    /// Merge a playback update into the now-playing record and push it.
    async fn update_playback(&self, update: PlaybackUpdate);

    /// Clear the now-playing record and the OS surface.
    async fn reset_now_playing(&self);

    /// Disable, clear now-playing and forget listeners.
    async fn stop_control(&self);

    /// Turn a single control on or off.
    async fn enable_control(&self, command: Command, enabled: bool, options: ControlOptions);

    /// Ask the OS to keep audio alive in the background.
    async fn enable_background_mode(&self, enabled: bool);

    /// Translate audio interruptions into `pause`/`play` events.
    async fn observe_audio_interruptions(&self, enabled: bool);

    /// Current now-playing mirror.
    fn now_playing(&self) -> NowPlayingInfo;

    /// Subscribe to bridge events from this point on.
    fn events(&self) -> BoxStream<'static, BridgeEvent>;

    /// Count a listener for `event_name`.
    fn add_listener(&self, event_name: &str);

    /// Forget `count` listeners, never going below zero.
    fn remove_listeners(&self, count: usize);

    /// Number of registered listeners.
    fn listener_count(&self) -> usize;

    /// Deliver an error event to listeners.
    fn report(&self, error: MediaControlError);
}
