use std::{collections::HashMap, time::Instant};

use async_trait::async_trait;
use tracing::{debug, info, instrument};
use zbus::{
    Connection, connection, interface,
    object_server::{InterfaceRef, SignalEmitter},
    zvariant::{self, ObjectPath, OwnedValue, Value},
};

use super::{CommandHandler, HandlerTable, MediaPlatform, RegistrationId};
use crate::services::media_control::{
    Command, EventValue, MediaControlError, NowPlayingInfo, PlaybackState,
};

const MPRIS_PATH: &str = "/org/mpris/MediaPlayer2";
const MPRIS_PREFIX: &str = "org.mpris.MediaPlayer2.";
const CURRENT_TRACK: &str = "/org/mpris/MediaPlayer2/Track/Current";
const NO_TRACK: &str = "/org/mpris/MediaPlayer2/TrackList/NoTrack";
const MICROS_PER_SECOND: f64 = 1_000_000.0;
/// Seconds the position may stray from the extrapolated playhead before it counts as a seek
const SEEK_TOLERANCE: f64 = 1.0;

/// Commands that have an MPRIS method or property behind them
const SUPPORTED: [Command; 10] = [
    Command::Play,
    Command::Pause,
    Command::Stop,
    Command::TogglePlayPause,
    Command::NextTrack,
    Command::PreviousTrack,
    Command::Seek,
    Command::SkipForward,
    Command::SkipBackward,
    Command::Volume,
];

/// Desktop media surface published on the D-Bus session bus.
///
/// Owns `org.mpris.MediaPlayer2.<player_name>` and serves the root and
/// player interfaces at `/org/mpris/MediaPlayer2`. Media keys, desktop
/// widgets and `playerctl` call into it; calls become command deliveries.
pub struct MprisPlatform {
    connection: Connection,
    handlers: HandlerTable,
}

impl MprisPlatform {
    /// Connects to the session bus and publishes the player.
    ///
    /// # Errors
    /// Returns `MediaControlError::UnsupportedPlatform` if there is no session
    /// bus or the name is already taken.
    #[instrument(skip(identity))]
    pub async fn connect(player_name: &str, identity: &str) -> Result<Self, MediaControlError> {
        let handlers = HandlerTable::default();
        let bus_name = format!("{MPRIS_PREFIX}{player_name}");

        let root = RootInterface {
            identity: identity.to_string(),
        };
        let player = PlayerInterface {
            handlers: handlers.clone(),
            now_playing: NowPlayingInfo::default(),
            updated_at: Instant::now(),
        };

        let connection: zbus::Result<Connection> = async {
            connection::Builder::session()?
                .name(bus_name.clone())?
                .serve_at(MPRIS_PATH, root)?
                .serve_at(MPRIS_PATH, player)?
                .build()
                .await
        }
        .await;

        let connection = connection.map_err(|e| {
            MediaControlError::UnsupportedPlatform(format!("D-Bus session unavailable: {e}"))
        })?;

        info!(bus_name, "Published MPRIS player");

        Ok(Self {
            connection,
            handlers,
        })
    }

    async fn player_interface(&self) -> Result<InterfaceRef<PlayerInterface>, MediaControlError> {
        Ok(self
            .connection
            .object_server()
            .interface::<_, PlayerInterface>(MPRIS_PATH)
            .await?)
    }

    async fn notify_capabilities(&self) -> Result<(), MediaControlError> {
        let iface_ref = self.player_interface().await?;
        let iface = iface_ref.get().await;
        let emitter = iface_ref.signal_emitter();

        iface.can_play_changed(emitter).await?;
        iface.can_pause_changed(emitter).await?;
        iface.can_go_next_changed(emitter).await?;
        iface.can_go_previous_changed(emitter).await?;
        iface.can_seek_changed(emitter).await?;
        Ok(())
    }
}

#[async_trait]
impl MediaPlatform for MprisPlatform {
    fn name(&self) -> &str {
        "mpris"
    }

    async fn register_command_handler(
        &self,
        handler: CommandHandler,
    ) -> Result<RegistrationId, MediaControlError> {
        let command = handler.command();
        if !SUPPORTED.contains(&command) {
            return Err(MediaControlError::RegistrationFailed {
                command,
                reason: "no MPRIS counterpart".to_string(),
            });
        }

        let id = self.handlers.insert(handler).await;
        self.notify_capabilities().await?;
        debug!(%command, %id, "registered MPRIS handler");
        Ok(id)
    }

    async fn unregister_command_handler(
        &self,
        id: RegistrationId,
    ) -> Result<(), MediaControlError> {
        if self.handlers.remove(id).await.is_some() {
            self.notify_capabilities().await?;
        }
        Ok(())
    }

    async fn set_now_playing_info(&self, info: &NowPlayingInfo) -> Result<(), MediaControlError> {
        let iface_ref = self.player_interface().await?;
        let mut iface = iface_ref.get_mut().await;
        let since_update = iface.updated_at.elapsed().as_secs_f64();
        let seeked = seeked_position(&iface.now_playing, info, since_update);
        iface.now_playing = info.clone();
        iface.updated_at = Instant::now();

        let emitter = iface_ref.signal_emitter();
        iface.metadata_changed(emitter).await?;
        iface.playback_status_changed(emitter).await?;
        iface.rate_changed(emitter).await?;
        iface.volume_changed(emitter).await?;

        if let Some(position) = seeked {
            debug!(position, "position jumped, emitting Seeked");
            PlayerInterface::seeked(emitter, position).await?;
        }
        Ok(())
    }

    async fn clear_now_playing_info(&self) -> Result<(), MediaControlError> {
        self.set_now_playing_info(&NowPlayingInfo::default()).await
    }
}

struct RootInterface {
    identity: String,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootInterface {
    fn raise(&self) {}

    fn quit(&self) {}

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> String {
        self.identity.clone()
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        Vec::new()
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        Vec::new()
    }
}

struct PlayerInterface {
    handlers: HandlerTable,
    now_playing: NowPlayingInfo,
    /// When `now_playing` was last replaced
    updated_at: Instant,
}

impl PlayerInterface {
    async fn supports_any(&self, commands: &[Command]) -> bool {
        for command in commands {
            if self.handlers.count(*command).await > 0 {
                return true;
            }
        }
        false
    }
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerInterface {
    async fn play(&self) {
        self.handlers.dispatch(Command::Play, None).await;
    }

    async fn pause(&self) {
        self.handlers.dispatch(Command::Pause, None).await;
    }

    async fn play_pause(&self) {
        if self.handlers.dispatch(Command::TogglePlayPause, None).await > 0 {
            return;
        }
        self.handlers
            .dispatch(toggle_target(self.now_playing.state), None)
            .await;
    }

    async fn stop(&self) {
        self.handlers.dispatch(Command::Stop, None).await;
    }

    async fn next(&self) {
        self.handlers.dispatch(Command::NextTrack, None).await;
    }

    async fn previous(&self) {
        self.handlers.dispatch(Command::PreviousTrack, None).await;
    }

    /// Relative seek; offset in microseconds.
    async fn seek(&self, offset: i64) {
        let (command, interval) = seek_command(offset);
        self.handlers
            .dispatch(command, Some(EventValue::Number(interval)))
            .await;
    }

    async fn set_position(&self, _track_id: ObjectPath<'_>, position: i64) {
        if let Some(seconds) = position_seconds(position) {
            self.handlers
                .dispatch(Command::Seek, Some(EventValue::Number(seconds)))
                .await;
        }
    }

    /// Position changed discontinuously; new position in microseconds.
    #[zbus(signal)]
    async fn seeked(emitter: &SignalEmitter<'_>, position: i64) -> zbus::Result<()>;

    fn open_uri(&self, _uri: &str) -> zbus::fdo::Result<()> {
        Err(zbus::fdo::Error::NotSupported(
            "OpenUri is not supported".to_string(),
        ))
    }

    #[zbus(property)]
    fn playback_status(&self) -> String {
        match self.now_playing.state.unwrap_or_default() {
            PlaybackState::Playing => "Playing",
            PlaybackState::Paused | PlaybackState::Buffering => "Paused",
            PlaybackState::Stopped | PlaybackState::Error => "Stopped",
        }
        .to_string()
    }

    #[zbus(property)]
    fn rate(&self) -> f64 {
        self.now_playing.speed.unwrap_or(1.0)
    }

    #[zbus(property)]
    fn minimum_rate(&self) -> f64 {
        0.25
    }

    #[zbus(property)]
    fn maximum_rate(&self) -> f64 {
        4.0
    }

    #[zbus(property)]
    fn metadata(&self) -> zbus::fdo::Result<HashMap<String, OwnedValue>> {
        mpris_metadata(&self.now_playing).map_err(|e| zbus::fdo::Error::Failed(e.to_string()))
    }

    #[zbus(property)]
    fn volume(&self) -> f64 {
        match (self.now_playing.volume, self.now_playing.max_volume) {
            (Some(volume), Some(max)) if max > 0.0 => (volume / max).clamp(0.0, 1.0),
            (Some(volume), None) => (volume / 100.0).clamp(0.0, 1.0),
            _ => 1.0,
        }
    }

    #[zbus(property)]
    async fn set_volume(&mut self, volume: f64) {
        let level = volume_level(volume, self.now_playing.max_volume);
        self.handlers
            .dispatch(Command::Volume, Some(EventValue::Number(level)))
            .await;
    }

    #[zbus(property(emits_changed_signal = "false"))]
    fn position(&self) -> i64 {
        seconds_to_micros(self.now_playing.elapsed_time.unwrap_or(0.0))
    }

    #[zbus(property)]
    async fn can_play(&self) -> bool {
        self.supports_any(&[Command::Play, Command::TogglePlayPause])
            .await
    }

    #[zbus(property)]
    async fn can_pause(&self) -> bool {
        self.supports_any(&[Command::Pause, Command::TogglePlayPause])
            .await
    }

    #[zbus(property)]
    async fn can_go_next(&self) -> bool {
        self.supports_any(&[Command::NextTrack]).await
    }

    #[zbus(property)]
    async fn can_go_previous(&self) -> bool {
        self.supports_any(&[Command::PreviousTrack]).await
    }

    #[zbus(property)]
    async fn can_seek(&self) -> bool {
        self.supports_any(&[Command::Seek, Command::SkipForward, Command::SkipBackward])
            .await
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }
}

fn seconds_to_micros(seconds: f64) -> i64 {
    (seconds * MICROS_PER_SECOND) as i64
}

/// `PlayPause` without a toggle handler: pause while playing, play otherwise.
fn toggle_target(state: Option<PlaybackState>) -> Command {
    match state {
        Some(PlaybackState::Playing) => Command::Pause,
        _ => Command::Play,
    }
}

/// Relative `Seek` offset in microseconds to a skip command and seconds.
fn seek_command(offset: i64) -> (Command, f64) {
    let interval = offset.unsigned_abs() as f64 / MICROS_PER_SECOND;
    let command = if offset >= 0 {
        Command::SkipForward
    } else {
        Command::SkipBackward
    };
    (command, interval)
}

/// Absolute `SetPosition` in microseconds to seconds; negative positions are ignored.
fn position_seconds(position: i64) -> Option<f64> {
    (position >= 0).then(|| position as f64 / MICROS_PER_SECOND)
}

/// MPRIS volume (0.0 to 1.0) to the application's scale, 100 if unset.
fn volume_level(volume: f64, max_volume: Option<f64>) -> f64 {
    volume.clamp(0.0, 1.0) * max_volume.unwrap_or(100.0)
}

/// New position in microseconds if `next` is not where `previous` would have
/// played to after `elapsed` seconds.
fn seeked_position(
    previous: &NowPlayingInfo,
    next: &NowPlayingInfo,
    elapsed: f64,
) -> Option<i64> {
    let position = next.elapsed_time?;
    let last = previous.elapsed_time?;
    let expected = if previous.state == Some(PlaybackState::Playing) {
        last + elapsed * previous.speed.unwrap_or(1.0)
    } else {
        last
    };

    ((position - expected).abs() > SEEK_TOLERANCE).then(|| seconds_to_micros(position))
}

fn owned<'a>(value: impl Into<Value<'a>>) -> zvariant::Result<OwnedValue> {
    OwnedValue::try_from(value.into())
}

/// Builds the `Metadata` property from the now-playing record.
fn mpris_metadata(info: &NowPlayingInfo) -> zvariant::Result<HashMap<String, OwnedValue>> {
    let mut metadata = HashMap::new();

    let track_id = if info.is_empty() {
        NO_TRACK
    } else {
        CURRENT_TRACK
    };
    metadata.insert(
        "mpris:trackid".to_string(),
        owned(ObjectPath::try_from(track_id)?)?,
    );

    if let Some(title) = &info.title {
        metadata.insert("xesam:title".to_string(), owned(title.as_str())?);
    }
    if let Some(artist) = &info.artist {
        metadata.insert("xesam:artist".to_string(), owned(vec![artist.as_str()])?);
    }
    if let Some(album) = &info.album {
        metadata.insert("xesam:album".to_string(), owned(album.as_str())?);
    }
    if let Some(genre) = &info.genre {
        metadata.insert("xesam:genre".to_string(), owned(vec![genre.as_str()])?);
    }
    if let Some(description) = &info.description {
        metadata.insert(
            "xesam:comment".to_string(),
            owned(vec![description.as_str()])?,
        );
    }
    if let Some(date) = &info.date {
        metadata.insert("xesam:contentCreated".to_string(), owned(date.as_str())?);
    }
    if let Some(duration) = info.duration {
        metadata.insert(
            "mpris:length".to_string(),
            owned(seconds_to_micros(duration))?,
        );
    }
    if let Some(artwork) = &info.artwork {
        let url = if artwork.contains("://") {
            artwork.clone()
        } else {
            format!("file://{artwork}")
        };
        metadata.insert("mpris:artUrl".to_string(), owned(url)?);
    }

    Ok(metadata)
}
