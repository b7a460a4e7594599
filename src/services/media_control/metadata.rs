use serde::{Deserialize, Deserializer, Serialize};

use super::{MediaControlError, PlaybackState, Rating};

/// The now-playing record as last handed to the OS surface.
///
/// Every field is optional; an empty record means nothing is displayed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NowPlayingInfo {
    /// Track title
    pub title: Option<String>,
    /// Track artist
    pub artist: Option<String>,
    /// Album title
    pub album: Option<String>,
    /// Genre
    pub genre: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Release date as provided by the application
    pub date: Option<String>,
    /// Track length in seconds
    pub duration: Option<f64>,
    /// Playback position in seconds
    pub elapsed_time: Option<f64>,
    /// Artwork URL or local path
    pub artwork: Option<String>,
    /// Rating of the current track
    pub rating: Option<Rating>,
    /// Playback state
    pub state: Option<PlaybackState>,
    /// Playback rate, 1.0 is normal speed
    pub speed: Option<f64>,
    /// Seconds buffered ahead
    pub buffered_time: Option<f64>,
    /// Output volume, out of `max_volume`
    pub volume: Option<f64>,
    /// Upper bound of `volume`
    pub max_volume: Option<f64>,
}

/// Partial metadata update; absent fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataUpdate {
    /// Track title
    pub title: Option<String>,
    /// Track artist
    pub artist: Option<String>,
    /// Album title
    #[serde(alias = "albumTitle")]
    pub album: Option<String>,
    /// Genre
    pub genre: Option<String>,
    /// Free-form description
    pub description: Option<String>,
    /// Release date
    pub date: Option<String>,
    /// Track length in seconds
    pub duration: Option<f64>,
    /// Playback position in seconds
    pub elapsed_time: Option<f64>,
    /// Artwork reference, either a string or `{ "uri": ... }`
    #[serde(alias = "artworkUrl", deserialize_with = "deserialize_artwork")]
    pub artwork: Option<String>,
    /// Rating of the current track
    pub rating: Option<Rating>,
}

/// Partial playback update; absent fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackUpdate {
    /// Playback state, by name or numeric code
    #[serde(deserialize_with = "deserialize_state")]
    pub state: Option<PlaybackState>,
    /// Playback position in seconds
    pub elapsed_time: Option<f64>,
    /// Playback rate
    pub speed: Option<f64>,
    /// Seconds buffered ahead
    pub buffered_time: Option<f64>,
    /// Output volume
    pub volume: Option<f64>,
    /// Upper bound of `volume`
    pub max_volume: Option<f64>,
    /// Rating of the current track
    pub rating: Option<Rating>,
}

impl NowPlayingInfo {
    /// Whether nothing is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges a metadata update into the record.
    pub fn apply_metadata(&mut self, update: &MetadataUpdate) {
        merge(&mut self.title, &update.title);
        merge(&mut self.artist, &update.artist);
        merge(&mut self.album, &update.album);
        merge(&mut self.genre, &update.genre);
        merge(&mut self.description, &update.description);
        merge(&mut self.date, &update.date);
        merge(&mut self.duration, &update.duration);
        merge(&mut self.elapsed_time, &update.elapsed_time);
        merge(&mut self.artwork, &update.artwork);
        merge(&mut self.rating, &update.rating);
    }

    /// Merges a playback update into the record.
    pub fn apply_playback(&mut self, update: &PlaybackUpdate) {
        merge(&mut self.state, &update.state);
        merge(&mut self.elapsed_time, &update.elapsed_time);
        merge(&mut self.speed, &update.speed);
        merge(&mut self.buffered_time, &update.buffered_time);
        merge(&mut self.volume, &update.volume);
        merge(&mut self.max_volume, &update.max_volume);
        merge(&mut self.rating, &update.rating);
    }
}

impl MetadataUpdate {
    /// Rejects values no OS surface can display.
    ///
    /// # Errors
    /// Returns `MediaControlError::InvalidMetadata` naming the first bad field.
    pub fn validate(&self) -> Result<(), MediaControlError> {
        non_negative("duration", self.duration)?;
        non_negative("elapsedTime", self.elapsed_time)?;
        valid_rating(self.rating)?;

        if let Some(artwork) = &self.artwork {
            if artwork.trim().is_empty() {
                return Err(MediaControlError::InvalidMetadata(
                    "artwork must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl PlaybackUpdate {
    /// Rejects values no OS surface can display.
    ///
    /// # Errors
    /// Returns `MediaControlError::InvalidMetadata` naming the first bad field.
    pub fn validate(&self) -> Result<(), MediaControlError> {
        non_negative("elapsedTime", self.elapsed_time)?;
        non_negative("bufferedTime", self.buffered_time)?;
        non_negative("volume", self.volume)?;
        valid_rating(self.rating)?;

        if let Some(speed) = self.speed {
            if !speed.is_finite() {
                return Err(MediaControlError::InvalidMetadata(format!(
                    "speed must be finite, got {speed}"
                )));
            }
        }

        if let Some(max) = self.max_volume {
            if !max.is_finite() || max <= 0.0 {
                return Err(MediaControlError::InvalidMetadata(format!(
                    "maxVolume must be positive, got {max}"
                )));
            }
            if let Some(volume) = self.volume {
                if volume > max {
                    return Err(MediaControlError::InvalidMetadata(format!(
                        "volume {volume} exceeds maxVolume {max}"
                    )));
                }
            }
        }

        Ok(())
    }
}

fn merge<T: Clone>(slot: &mut Option<T>, update: &Option<T>) {
    if let Some(value) = update {
        *slot = Some(value.clone());
    }
}

fn non_negative(field: &str, value: Option<f64>) -> Result<(), MediaControlError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(MediaControlError::InvalidMetadata(format!(
            "{field} must be a non-negative number, got {v}"
        ))),
        _ => Ok(()),
    }
}

fn valid_rating(rating: Option<Rating>) -> Result<(), MediaControlError> {
    match rating {
        Some(Rating::Score(score)) => non_negative("rating", Some(score)),
        _ => Ok(()),
    }
}

fn deserialize_artwork<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Artwork {
        Url(String),
        Asset { uri: String },
    }

    Ok(
        Option::<Artwork>::deserialize(deserializer)?.map(|artwork| match artwork {
            Artwork::Url(url) => url,
            Artwork::Asset { uri } => uri,
        }),
    )
}

fn deserialize_state<'de, D>(deserializer: D) -> Result<Option<PlaybackState>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum State {
        Named(PlaybackState),
        Code(i64),
    }

    match Option::<State>::deserialize(deserializer)? {
        None => Ok(None),
        Some(State::Named(state)) => Ok(Some(state)),
        Some(State::Code(code)) => PlaybackState::from_code(code).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown playback state code {code}"))
        }),
    }
}
