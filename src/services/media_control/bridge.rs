use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use futures::{
    Stream, StreamExt,
    stream::BoxStream,
};
use tokio::{
    sync::{Mutex, broadcast, mpsc},
    task::JoinHandle,
};
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use tracing::{debug, info, instrument, trace, warn};

use super::{
    BridgeEvent, Command, ControlOptions, ErrorEvent, EventValue, MediaControlError,
    MetadataUpdate, MusicControl, NowPlayingInfo, PlaybackUpdate,
    platform::{
        CommandHandler, Interruption, MediaPlatform, PlatformSignal, RegistrationId,
        SignalSink,
    },
};
use crate::services::common::Property;

/// Default skip interval in seconds
pub const DEFAULT_SKIP_INTERVAL: f64 = 15.0;

/// Controls enabled when nothing else is configured
pub const DEFAULT_CONTROLS: [Command; 7] = [
    Command::Play,
    Command::Pause,
    Command::Stop,
    Command::TogglePlayPause,
    Command::NextTrack,
    Command::PreviousTrack,
    Command::Seek,
];

/// Startup options for [`MediaControlBridge`]
#[derive(Debug, Clone)]
pub struct BridgeOptions {
    /// Controls registered on `enable()`
    pub controls: Vec<Command>,
    /// Interval used for skip controls enabled without one
    pub skip_interval: f64,
    /// Translate audio interruptions from the start
    pub observe_interruptions: bool,
    /// Broadcast capacity; slower subscribers skip ahead
    pub event_capacity: usize,
}

impl Default for BridgeOptions {
    fn default() -> Self {
        Self {
            controls: DEFAULT_CONTROLS.to_vec(),
            skip_interval: DEFAULT_SKIP_INTERVAL,
            observe_interruptions: false,
            event_capacity: 64,
        }
    }
}

#[derive(Debug, Default)]
struct ControlState {
    controls: HashMap<Command, ControlOptions>,
    registrations: HashMap<Command, RegistrationId>,
    /// Present while enabled
    sink: Option<SignalSink>,
    observe_interruptions: bool,
}

/// Bridge between an OS media framework and application listeners.
///
/// OS callbacks enqueue into a single channel; one dispatcher task drains it
/// in order and publishes to every subscriber. Each enable starts a session;
/// a signal is accepted or dropped when the OS hands it over, depending on
/// whether its session is still the active one. Accepted signals are always
/// delivered, even if the bridge is disabled before the dispatcher runs.
pub struct MediaControlBridge {
    platform: Arc<dyn MediaPlatform>,
    skip_interval: f64,
    enabled: Property<bool>,
    now_playing: Property<NowPlayingInfo>,
    events_tx: broadcast::Sender<BridgeEvent>,
    signals_tx: mpsc::UnboundedSender<PlatformSignal>,
    active_session: Arc<AtomicU64>,
    next_session: AtomicU64,
    state: Mutex<ControlState>,
    surface: Mutex<()>,
    listeners: AtomicUsize,
    unsupported_reported: AtomicBool,
    dispatcher: JoinHandle<()>,
}

impl MediaControlBridge {
    /// Create a bridge over `platform`. Starts disabled.
    ///
    /// Must be called from within a Tokio runtime; the dispatcher task is
    /// spawned here and aborted on drop.
    pub fn new(platform: Arc<dyn MediaPlatform>, options: BridgeOptions) -> Self {
        let (events_tx, _) = broadcast::channel(options.event_capacity.max(1));
        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let active_session = Arc::new(AtomicU64::new(0));

        let dispatcher = tokio::spawn(dispatch(signals_rx, events_tx.clone()));

        let skip_interval = options.skip_interval;
        let controls = options
            .controls
            .iter()
            .map(|command| (*command, default_options(*command, skip_interval)))
            .collect();

        Self {
            platform,
            skip_interval,
            enabled: Property::new(false),
            now_playing: Property::new(NowPlayingInfo::default()),
            events_tx,
            signals_tx,
            active_session,
            next_session: AtomicU64::new(0),
            state: Mutex::new(ControlState {
                controls,
                observe_interruptions: options.observe_interruptions,
                ..Default::default()
            }),
            surface: Mutex::new(()),
            listeners: AtomicUsize::new(0),
            unsupported_reported: AtomicBool::new(false),
            dispatcher,
        }
    }

    /// Name of the underlying platform.
    pub fn platform_name(&self) -> &str {
        self.platform.name()
    }

    /// Stream of enabled/disabled transitions, starting with the current state.
    pub fn enabled_monitored(&self) -> impl Stream<Item = bool> + Send + 'static {
        self.enabled.watch()
    }

    /// Stream of now-playing records, starting with the current one.
    pub fn now_playing_monitored(&self) -> impl Stream<Item = NowPlayingInfo> + Send + 'static {
        self.now_playing.watch()
    }

    /// Controls that will be (or are) registered while enabled.
    pub async fn enabled_controls(&self) -> Vec<Command> {
        let state = self.state.lock().await;
        Command::ALL
            .into_iter()
            .filter(|command| state.controls.contains_key(command))
            .collect()
    }

    async fn register(
        &self,
        command: Command,
        options: ControlOptions,
        sink: &SignalSink,
    ) -> Result<RegistrationId, MediaControlError> {
        let default_value = if command.uses_interval() {
            options.interval.map(EventValue::Number)
        } else {
            None
        };
        let handler = CommandHandler::new(command, default_value, sink.clone());
        self.platform.register_command_handler(handler).await
    }

    async fn release(&self, state: &mut ControlState) {
        for (command, id) in state.registrations.drain() {
            if let Err(error) = self.platform.unregister_command_handler(id).await {
                warn!(%command, %id, %error, "failed to release registration");
            }
        }
    }

    async fn push_now_playing(&self, info: &NowPlayingInfo) {
        match self.platform.set_now_playing_info(info).await {
            Ok(()) => debug!(title = ?info.title, state = ?info.state, "pushed now-playing"),
            Err(error) => warn!(%error, "now-playing surface unavailable, keeping local record"),
        }
    }

    fn with_default_interval(&self, command: Command, mut options: ControlOptions) -> ControlOptions {
        if command.uses_interval() && options.interval.is_none() {
            options.interval = Some(self.skip_interval);
        }
        options
    }
}

fn default_options(command: Command, skip_interval: f64) -> ControlOptions {
    if command.uses_interval() {
        ControlOptions::with_interval(skip_interval)
    } else {
        ControlOptions::default()
    }
}

#[async_trait]
impl MusicControl for MediaControlBridge {
    #[instrument(skip(self), fields(platform = self.platform.name()))]
    async fn enable(&self) {
        let mut state = self.state.lock().await;
        if state.sink.is_some() {
            debug!("already enabled");
            return;
        }

        if let Err(error) = self.platform.activate().await {
            self.report(error);
            return;
        }

        let session = self.next_session.fetch_add(1, Ordering::Relaxed) + 1;
        let sink = SignalSink::new(
            session,
            Arc::clone(&self.active_session),
            self.signals_tx.clone(),
        );
        self.active_session.store(session, Ordering::Release);

        let controls: Vec<(Command, ControlOptions)> =
            state.controls.iter().map(|(c, o)| (*c, *o)).collect();

        for (command, options) in controls {
            match self.register(command, options, &sink).await {
                Ok(id) => {
                    state.registrations.insert(command, id);
                }
                Err(error @ MediaControlError::UnsupportedPlatform(_)) => {
                    self.active_session.store(0, Ordering::Release);
                    self.release(&mut state).await;
                    self.report(error);
                    return;
                }
                Err(error) => self.report(error),
            }
        }

        if state.observe_interruptions {
            if let Err(error) = self.platform.observe_interruptions(Some(sink.clone())).await {
                self.report(error);
            }
        }

        let registrations = state.registrations.len();
        state.sink = Some(sink);
        self.enabled.set(true);
        info!(session, registrations, "Media controls enabled");
    }

    #[instrument(skip(self), fields(platform = self.platform.name()))]
    async fn disable(&self) {
        let mut state = self.state.lock().await;
        if state.sink.take().is_none() {
            debug!("already disabled");
            return;
        }

        self.active_session.store(0, Ordering::Release);
        self.release(&mut state).await;

        if state.observe_interruptions {
            if let Err(error) = self.platform.observe_interruptions(None).await {
                warn!(%error, "failed to stop observing interruptions");
            }
        }

        self.enabled.set(false);
        info!("Media controls disabled");
    }

    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    async fn update_metadata(&self, update: MetadataUpdate) {
        if let Err(error) = update.validate() {
            self.report(error);
            return;
        }

        let _surface = self.surface.lock().await;
        let info = self.now_playing.update(|info| info.apply_metadata(&update));
        self.push_now_playing(&info).await;
    }

    async fn update_playback(&self, update: PlaybackUpdate) {
        if let Err(error) = update.validate() {
            self.report(error);
            return;
        }

        let _surface = self.surface.lock().await;
        let info = self.now_playing.update(|info| info.apply_playback(&update));
        self.push_now_playing(&info).await;
    }

    async fn reset_now_playing(&self) {
        let _surface = self.surface.lock().await;
        self.now_playing.set(NowPlayingInfo::default());
        if let Err(error) = self.platform.clear_now_playing_info().await {
            warn!(%error, "failed to clear now-playing surface");
        }
    }

    #[instrument(skip(self))]
    async fn stop_control(&self) {
        self.disable().await;
        self.reset_now_playing().await;
        self.listeners.store(0, Ordering::Release);
        info!("Media controls stopped");
    }

    #[instrument(skip(self, options))]
    async fn enable_control(&self, command: Command, enabled: bool, options: ControlOptions) {
        let options = self.with_default_interval(command, options);
        let mut state = self.state.lock().await;

        if enabled {
            state.controls.insert(command, options);
        } else {
            state.controls.remove(&command);
        }

        let Some(sink) = state.sink.clone() else {
            debug!("bridge disabled, control applies on next enable");
            return;
        };

        if let Some(id) = state.registrations.remove(&command) {
            if let Err(error) = self.platform.unregister_command_handler(id).await {
                warn!(%command, %id, %error, "failed to release registration");
            }
        }

        if enabled {
            match self.register(command, options, &sink).await {
                Ok(id) => {
                    state.registrations.insert(command, id);
                }
                Err(error) => self.report(error),
            }
        }
    }

    async fn enable_background_mode(&self, enabled: bool) {
        if let Err(error) = self.platform.set_background_mode(enabled).await {
            self.report(error);
        }
    }

    async fn observe_audio_interruptions(&self, enabled: bool) {
        let mut state = self.state.lock().await;
        if state.observe_interruptions == enabled {
            return;
        }
        state.observe_interruptions = enabled;

        if let Some(sink) = &state.sink {
            let sink = enabled.then(|| sink.clone());
            if let Err(error) = self.platform.observe_interruptions(sink).await {
                self.report(error);
            }
        }
    }

    fn now_playing(&self) -> NowPlayingInfo {
        self.now_playing.get()
    }

    fn events(&self) -> BoxStream<'static, BridgeEvent> {
        BroadcastStream::new(self.events_tx.subscribe())
            .filter_map(|item| async move {
                match item {
                    Ok(event) => Some(event),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                        warn!(skipped, "event subscriber lagged, events dropped");
                        None
                    }
                }
            })
            .boxed()
    }

    fn add_listener(&self, event_name: &str) {
        let count = self.listeners.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(event_name, count, "listener added");
    }

    fn remove_listeners(&self, count: usize) {
        let _ = self
            .listeners
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_sub(count))
            });
    }

    fn listener_count(&self) -> usize {
        self.listeners.load(Ordering::Acquire)
    }

    fn report(&self, error: MediaControlError) {
        if matches!(error, MediaControlError::UnsupportedPlatform(_))
            && self.unsupported_reported.swap(true, Ordering::AcqRel)
        {
            debug!(%error, "unsupported platform already reported");
            return;
        }

        warn!(%error, kind = ?error.kind(), "media control error");
        let _ = self.events_tx.send(BridgeEvent::Error(ErrorEvent::from(&error)));
    }
}

impl Drop for MediaControlBridge {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}

/// Drains accepted OS signals in arrival order and publishes them as events.
async fn dispatch(
    mut signals: mpsc::UnboundedReceiver<PlatformSignal>,
    events_tx: broadcast::Sender<BridgeEvent>,
) {
    while let Some(signal) = signals.recv().await {
        let event = match signal {
            PlatformSignal::Command { command, value } => BridgeEvent::command(command, value),
            PlatformSignal::Interruption(Interruption::Began) => {
                BridgeEvent::command(Command::Pause, None)
            }
            PlatformSignal::Interruption(Interruption::Ended {
                should_resume: true,
            }) => BridgeEvent::command(Command::Play, None),
            PlatformSignal::Interruption(Interruption::Ended {
                should_resume: false,
            }) => {
                trace!("interruption ended without resume");
                continue;
            }
        };

        debug!(event = event.name(), "delivering remote command");
        let _ = events_tx.send(event);
    }
}
