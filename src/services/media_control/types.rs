use std::{fmt, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::MediaControlError;

/// A remote-control command the OS can deliver and the application can opt in to.
///
/// The same set names both the controls passed to `enable_control` and the
/// events emitted to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Command {
    /// Start playback
    Play,
    /// Pause playback
    Pause,
    /// Stop playback
    Stop,
    /// Toggle between playing and paused
    TogglePlayPause,
    /// Skip to the next track
    NextTrack,
    /// Go back to the previous track
    PreviousTrack,
    /// Jump to an absolute position, in seconds
    Seek,
    /// Skip forward by an interval, in seconds
    SkipForward,
    /// Skip backward by an interval, in seconds
    SkipBackward,
    /// Begin fast-forwarding
    SeekForward,
    /// Begin rewinding
    SeekBackward,
    /// Rate the current track
    SetRating,
    /// Change the output volume
    Volume,
    /// Turn on a language option (subtitles, audio track)
    EnableLanguageOption,
    /// Turn off a language option
    DisableLanguageOption,
    /// Dismiss the now-playing surface
    CloseNotification,
}

impl Command {
    /// Every command, in declaration order.
    pub const ALL: [Command; 16] = [
        Command::Play,
        Command::Pause,
        Command::Stop,
        Command::TogglePlayPause,
        Command::NextTrack,
        Command::PreviousTrack,
        Command::Seek,
        Command::SkipForward,
        Command::SkipBackward,
        Command::SeekForward,
        Command::SeekBackward,
        Command::SetRating,
        Command::Volume,
        Command::EnableLanguageOption,
        Command::DisableLanguageOption,
        Command::CloseNotification,
    ];

    /// Event name emitted to listeners.
    pub fn name(self) -> &'static str {
        match self {
            Command::Play => "play",
            Command::Pause => "pause",
            Command::Stop => "stop",
            Command::TogglePlayPause => "toggle-play-pause",
            Command::NextTrack => "next-track",
            Command::PreviousTrack => "previous-track",
            Command::Seek => "seek",
            Command::SkipForward => "skip-forward",
            Command::SkipBackward => "skip-backward",
            Command::SeekForward => "seek-forward",
            Command::SeekBackward => "seek-backward",
            Command::SetRating => "set-rating",
            Command::Volume => "volume",
            Command::EnableLanguageOption => "enable-language-option",
            Command::DisableLanguageOption => "disable-language-option",
            Command::CloseNotification => "close-notification",
        }
    }

    /// Whether the command carries an interval taken from its control options.
    pub fn uses_interval(self) -> bool {
        matches!(self, Command::SkipForward | Command::SkipBackward)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = MediaControlError;

    /// Accepts the kebab-case event names as well as the camelCase control
    /// names used by mobile hosts (`nextTrack`, `changePlaybackPosition`,
    /// `remoteVolume`).
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let command = match name {
            "play" => Command::Play,
            "pause" => Command::Pause,
            "stop" => Command::Stop,
            "toggle-play-pause" | "togglePlayPause" => Command::TogglePlayPause,
            "next-track" | "nextTrack" => Command::NextTrack,
            "previous-track" | "previousTrack" => Command::PreviousTrack,
            "seek" | "changePlaybackPosition" => Command::Seek,
            "skip-forward" | "skipForward" => Command::SkipForward,
            "skip-backward" | "skipBackward" => Command::SkipBackward,
            "seek-forward" | "seekForward" => Command::SeekForward,
            "seek-backward" | "seekBackward" => Command::SeekBackward,
            "set-rating" | "setRating" => Command::SetRating,
            "volume" | "remoteVolume" => Command::Volume,
            "enable-language-option" | "enableLanguageOption" => Command::EnableLanguageOption,
            "disable-language-option" | "disableLanguageOption" => Command::DisableLanguageOption,
            "close-notification" | "closeNotification" => Command::CloseNotification,
            other => {
                return Err(MediaControlError::InvalidArgument(format!(
                    "unknown control '{other}'"
                )));
            }
        };

        Ok(command)
    }
}

/// When the now-playing surface may be dismissed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CloseWhen {
    /// Always dismissible
    Always,
    /// Dismissible only while paused
    #[default]
    Paused,
    /// Never dismissible
    Never,
}

/// Per-control options passed along with `enable_control`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ControlOptions {
    /// Skip interval in seconds, for `skip-forward`/`skip-backward`
    pub interval: Option<f64>,

    /// Dismissal policy, for `close-notification`
    pub when: Option<CloseWhen>,
}

impl ControlOptions {
    /// Options carrying a skip interval.
    pub fn with_interval(interval: f64) -> Self {
        Self {
            interval: Some(interval),
            when: None,
        }
    }
}

/// Playback state mirrored to the OS surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Media is playing
    Playing,
    /// Media is paused
    Paused,
    /// Nothing is playing
    #[default]
    Stopped,
    /// Waiting on data
    Buffering,
    /// Playback failed
    Error,
}

impl PlaybackState {
    /// Maps the numeric state codes used by Android hosts
    /// (`PlaybackStateCompat`): 1 stopped, 2 paused, 3 playing, 6 buffering, 7 error.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Stopped),
            2 => Some(Self::Paused),
            3 => Some(Self::Playing),
            6 => Some(Self::Buffering),
            7 => Some(Self::Error),
            _ => None,
        }
    }
}

/// A rating value: heart/thumbs style or a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    /// Heart or thumbs-up/down
    Liked(bool),
    /// Stars or percentage
    Score(f64),
}
