use std::sync::Arc;

use futures::StreamExt;
use serde_json::{Map, Value};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, trace, warn};

use crate::services::media_control::{
    Command, ControlOptions, MediaControlError, MetadataUpdate, MusicControl, PlaybackUpdate,
};

/// Channel name events are emitted under.
pub const EVENT_CHANNEL: &str = "RNMusicControlEvent";

/// The host runtime's event emitter.
pub trait EventEmitter: Send + Sync + 'static {
    /// Deliver `body` to application listeners subscribed to `channel`.
    fn emit(&self, channel: &str, body: Value);
}

impl<F> EventEmitter for F
where
    F: Fn(&str, Value) + Send + Sync + 'static,
{
    fn emit(&self, channel: &str, body: Value) {
        self(channel, body)
    }
}

/// Event-emitter style bridge.
///
/// Arguments arrive as untyped key/value maps and are validated here;
/// malformed maps become `error` events rather than failures. Events leave
/// as `{"name": ..., "value": ...}` bodies on [`EVENT_CHANNEL`], and only
/// while at least one listener is registered.
pub struct LegacyBridge<M: MusicControl + 'static> {
    module: Arc<M>,
    forwarder: JoinHandle<()>,
}

impl<M: MusicControl + 'static> LegacyBridge<M> {
    /// Wrap `module` and start forwarding its events to `emitter`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(module: Arc<M>, emitter: impl EventEmitter) -> Self {
        let mut events = module.events();
        let source = Arc::clone(&module);

        let forwarder = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if source.listener_count() == 0 {
                    trace!(event = event.name(), "no listeners, event not emitted");
                    continue;
                }
                emitter.emit(EVENT_CHANNEL, Value::Object(event.to_payload()));
            }
        });

        Self { module, forwarder }
    }

    /// The wrapped module.
    pub fn module(&self) -> &Arc<M> {
        &self.module
    }

    /// See [`MusicControl::enable`].
    pub async fn enable(&self) {
        self.module.enable().await;
    }

    /// See [`MusicControl::disable`].
    pub async fn disable(&self) {
        self.module.disable().await;
    }

    /// Merge a metadata map (`title`, `artist`, `album`, `duration`, `artwork`, ...).
    pub async fn set_now_playing(&self, info: Map<String, Value>) {
        match parse::<MetadataUpdate>(info) {
            Ok(update) => self.module.update_metadata(update).await,
            Err(error) => self
                .module
                .report(MediaControlError::InvalidMetadata(error.to_string())),
        }
    }

    /// Merge a playback map (`state`, `elapsedTime`, `speed`, `volume`, ...).
    pub async fn update_playback(&self, info: Map<String, Value>) {
        match parse::<PlaybackUpdate>(info) {
            Ok(update) => self.module.update_playback(update).await,
            Err(error) => self
                .module
                .report(MediaControlError::InvalidMetadata(error.to_string())),
        }
    }

    /// See [`MusicControl::reset_now_playing`].
    pub async fn reset_now_playing(&self) {
        self.module.reset_now_playing().await;
    }

    /// See [`MusicControl::stop_control`].
    pub async fn stop_control(&self) {
        self.module.stop_control().await;
    }

    /// Toggle a control by name; `options` may carry `interval` and `when`.
    pub async fn enable_control(&self, name: &str, enable: bool, options: Map<String, Value>) {
        let command = match name.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                warn!(name, "ignoring unknown control");
                self.module.report(error);
                return;
            }
        };

        match parse::<ControlOptions>(options) {
            Ok(options) => self.module.enable_control(command, enable, options).await,
            Err(error) => self.module.report(MediaControlError::InvalidArgument(format!(
                "options for '{name}': {error}"
            ))),
        }
    }

    /// See [`MusicControl::enable_background_mode`].
    pub async fn enable_background_mode(&self, enable: bool) {
        self.module.enable_background_mode(enable).await;
    }

    /// See [`MusicControl::observe_audio_interruptions`].
    pub async fn observe_audio_interruptions(&self, enable: bool) {
        self.module.observe_audio_interruptions(enable).await;
    }

    /// See [`MusicControl::add_listener`].
    pub fn add_listener(&self, event_name: &str) {
        self.module.add_listener(event_name);
    }

    /// See [`MusicControl::remove_listeners`].
    pub fn remove_listeners(&self, count: usize) {
        self.module.remove_listeners(count);
    }

    /// Invoke a method by its host-side name.
    ///
    /// # Errors
    /// Returns `MediaControlError::InvalidArgument` for unknown methods or
    /// arguments of the wrong shape. Invalid metadata is reported as an
    /// event instead.
    #[instrument(skip(self, args))]
    pub async fn call(&self, method: &str, args: &[Value]) -> Result<(), MediaControlError> {
        debug!(arity = args.len(), "bridge call");

        match method {
            "enable" => self.enable().await,
            "disable" => self.disable().await,
            "enableBackgroundMode" => {
                self.enable_background_mode(bool_arg(method, args, 0)?)
                    .await
            }
            "setNowPlaying" => self.set_now_playing(map_arg(method, args, 0)?).await,
            "updatePlayback" | "setPlayback" => {
                self.update_playback(map_arg(method, args, 0)?).await
            }
            "resetNowPlaying" => self.reset_now_playing().await,
            "stopControl" => self.stop_control().await,
            "enableControl" => {
                let name = str_arg(method, args, 0)?;
                let enable = bool_arg(method, args, 1)?;
                let options = match args.get(2) {
                    None | Some(Value::Null) => Map::new(),
                    Some(_) => map_arg(method, args, 2)?,
                };
                self.enable_control(name, enable, options).await
            }
            "observeAudioInterruptions" => {
                self.observe_audio_interruptions(bool_arg(method, args, 0)?)
                    .await
            }
            "addListener" => self.add_listener(str_arg(method, args, 0)?),
            "removeListeners" => self.remove_listeners(count_arg(method, args, 0)?),
            other => {
                return Err(MediaControlError::InvalidArgument(format!(
                    "unknown method '{other}'"
                )));
            }
        }

        Ok(())
    }
}

impl<M: MusicControl + 'static> Drop for LegacyBridge<M> {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

fn parse<T: serde::de::DeserializeOwned>(map: Map<String, Value>) -> serde_json::Result<T> {
    serde_json::from_value(Value::Object(map))
}

fn bad_arg(method: &str, index: usize, expected: &str) -> MediaControlError {
    MediaControlError::InvalidArgument(format!(
        "{method}: argument {index} must be {expected}"
    ))
}

fn bool_arg(method: &str, args: &[Value], index: usize) -> Result<bool, MediaControlError> {
    args.get(index)
        .and_then(Value::as_bool)
        .ok_or_else(|| bad_arg(method, index, "a boolean"))
}

fn str_arg<'a>(method: &str, args: &'a [Value], index: usize) -> Result<&'a str, MediaControlError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| bad_arg(method, index, "a string"))
}

fn map_arg(
    method: &str,
    args: &[Value],
    index: usize,
) -> Result<Map<String, Value>, MediaControlError> {
    args.get(index)
        .and_then(Value::as_object)
        .cloned()
        .ok_or_else(|| bad_arg(method, index, "an object"))
}

fn count_arg(method: &str, args: &[Value], index: usize) -> Result<usize, MediaControlError> {
    let value = args
        .get(index)
        .ok_or_else(|| bad_arg(method, index, "a count"))?;

    // Hosts send whole numbers as floats (`1.0`); fractions are rejected.
    value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|n| *n >= 0.0 && n.fract() == 0.0)
                .map(|n| n as u64)
        })
        .map(|n| n as usize)
        .ok_or_else(|| bad_arg(method, index, "a non-negative whole count"))
}
