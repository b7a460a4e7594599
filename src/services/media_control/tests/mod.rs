//! Unit tests for the media control module
//!
//! Tests command naming, now-playing merges, update validation and event
//! payloads. No platform or runtime involved.

#![allow(clippy::unwrap_used)]

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::services::media_control::{
    BridgeEvent, Command, ControlOptions, ErrorEvent, ErrorKind, EventValue, MediaControlError,
    MetadataUpdate, NowPlayingInfo, PlaybackState, PlaybackUpdate, Rating,
    platform::{Interruption, PlatformSignal, SignalSink},
};

#[test]
fn command_names_round_trip_through_from_str() {
    for command in Command::ALL {
        assert_eq!(command.name().parse::<Command>().unwrap(), command);
    }
}

#[test]
fn command_accepts_host_control_names() {
    assert_eq!("nextTrack".parse::<Command>().unwrap(), Command::NextTrack);
    assert_eq!(
        "changePlaybackPosition".parse::<Command>().unwrap(),
        Command::Seek
    );
    assert_eq!("remoteVolume".parse::<Command>().unwrap(), Command::Volume);
    assert_eq!(
        "closeNotification".parse::<Command>().unwrap(),
        Command::CloseNotification
    );
}

#[test]
fn command_rejects_unknown_name() {
    let result = "rewind".parse::<Command>();

    assert!(matches!(result, Err(MediaControlError::InvalidArgument(_))));
}

#[test]
fn command_serializes_as_event_name() {
    assert_eq!(
        serde_json::to_value(Command::TogglePlayPause).unwrap(),
        json!("toggle-play-pause")
    );
    assert_eq!(Command::SkipBackward.to_string(), "skip-backward");
}

#[test]
fn only_skip_commands_use_interval() {
    let with_interval: Vec<Command> = Command::ALL
        .into_iter()
        .filter(|c| c.uses_interval())
        .collect();

    assert_eq!(with_interval, vec![Command::SkipForward, Command::SkipBackward]);
}

#[test]
fn playback_state_from_code() {
    assert_eq!(PlaybackState::from_code(3), Some(PlaybackState::Playing));
    assert_eq!(PlaybackState::from_code(2), Some(PlaybackState::Paused));
    assert_eq!(PlaybackState::from_code(1), Some(PlaybackState::Stopped));
    assert_eq!(PlaybackState::from_code(6), Some(PlaybackState::Buffering));
    assert_eq!(PlaybackState::from_code(7), Some(PlaybackState::Error));
    assert_eq!(PlaybackState::from_code(42), None);
}

#[test]
fn merge_keeps_fields_absent_from_update() {
    let mut info = NowPlayingInfo::default();

    info.apply_metadata(&MetadataUpdate {
        title: Some("A".to_string()),
        duration: Some(180.0),
        ..Default::default()
    });
    info.apply_metadata(&MetadataUpdate {
        artist: Some("B".to_string()),
        ..Default::default()
    });

    assert_eq!(info.title.as_deref(), Some("A"));
    assert_eq!(info.artist.as_deref(), Some("B"));
    assert_eq!(info.duration, Some(180.0));
}

#[test]
fn merge_overwrites_present_fields() {
    let mut info = NowPlayingInfo::default();
    info.apply_metadata(&MetadataUpdate {
        title: Some("First".to_string()),
        ..Default::default()
    });

    info.apply_metadata(&MetadataUpdate {
        title: Some("Second".to_string()),
        ..Default::default()
    });

    assert_eq!(info.title.as_deref(), Some("Second"));
}

#[test]
fn playback_merge_shares_elapsed_time_with_metadata() {
    let mut info = NowPlayingInfo::default();
    info.apply_metadata(&MetadataUpdate {
        title: Some("Track".to_string()),
        elapsed_time: Some(10.0),
        ..Default::default()
    });

    info.apply_playback(&PlaybackUpdate {
        state: Some(PlaybackState::Playing),
        elapsed_time: Some(42.5),
        ..Default::default()
    });

    assert_eq!(info.elapsed_time, Some(42.5));
    assert_eq!(info.state, Some(PlaybackState::Playing));
    assert_eq!(info.title.as_deref(), Some("Track"));
}

#[test]
fn empty_update_leaves_record_empty() {
    let mut info = NowPlayingInfo::default();

    info.apply_metadata(&MetadataUpdate::default());
    info.apply_playback(&PlaybackUpdate::default());

    assert!(info.is_empty());
}

#[test]
fn metadata_accepts_aliases_and_artwork_object() {
    let update: MetadataUpdate = serde_json::from_value(json!({
        "title": "Song",
        "albumTitle": "Record",
        "elapsedTime": 3,
        "artwork": { "uri": "https://example.com/cover.png" },
    }))
    .unwrap();

    assert_eq!(update.album.as_deref(), Some("Record"));
    assert_eq!(update.elapsed_time, Some(3.0));
    assert_eq!(
        update.artwork.as_deref(),
        Some("https://example.com/cover.png")
    );
}

#[test]
fn metadata_accepts_artwork_string_and_rating_kinds() {
    let liked: MetadataUpdate = serde_json::from_value(json!({
        "artworkUrl": "/tmp/cover.jpg",
        "rating": true,
    }))
    .unwrap();
    let scored: MetadataUpdate = serde_json::from_value(json!({ "rating": 4.5 })).unwrap();

    assert_eq!(liked.artwork.as_deref(), Some("/tmp/cover.jpg"));
    assert_eq!(liked.rating, Some(Rating::Liked(true)));
    assert_eq!(scored.rating, Some(Rating::Score(4.5)));
}

#[test]
fn metadata_rejects_wrong_field_type() {
    let result = serde_json::from_value::<MetadataUpdate>(json!({ "duration": "long" }));

    assert!(result.is_err());
}

#[test]
fn playback_state_accepts_name_or_code() {
    let named: PlaybackUpdate = serde_json::from_value(json!({ "state": "paused" })).unwrap();
    let coded: PlaybackUpdate = serde_json::from_value(json!({ "state": 3 })).unwrap();
    let unknown = serde_json::from_value::<PlaybackUpdate>(json!({ "state": 99 }));

    assert_eq!(named.state, Some(PlaybackState::Paused));
    assert_eq!(coded.state, Some(PlaybackState::Playing));
    assert!(unknown.is_err());
}

#[test]
fn metadata_validation_rejects_negative_duration() {
    let update = MetadataUpdate {
        duration: Some(-1.0),
        ..Default::default()
    };

    let result = update.validate();

    assert!(matches!(result, Err(MediaControlError::InvalidMetadata(_))));
}

#[test]
fn metadata_validation_rejects_blank_artwork() {
    let update = MetadataUpdate {
        artwork: Some("  ".to_string()),
        ..Default::default()
    };

    assert!(update.validate().is_err());
}

#[test]
fn metadata_validation_accepts_typical_track() {
    let update = MetadataUpdate {
        title: Some("Song".to_string()),
        artist: Some("Band".to_string()),
        duration: Some(215.3),
        elapsed_time: Some(0.0),
        rating: Some(Rating::Liked(false)),
        ..Default::default()
    };

    assert!(update.validate().is_ok());
}

#[test]
fn playback_validation_checks_volume_bounds() {
    let over = PlaybackUpdate {
        volume: Some(120.0),
        max_volume: Some(100.0),
        ..Default::default()
    };
    let zero_max = PlaybackUpdate {
        max_volume: Some(0.0),
        ..Default::default()
    };
    let fine = PlaybackUpdate {
        volume: Some(30.0),
        max_volume: Some(100.0),
        ..Default::default()
    };

    assert!(over.validate().is_err());
    assert!(zero_max.validate().is_err());
    assert!(fine.validate().is_ok());
}

#[test]
fn playback_validation_rejects_non_finite_speed() {
    let update = PlaybackUpdate {
        speed: Some(f64::NAN),
        ..Default::default()
    };

    assert!(update.validate().is_err());
}

#[test]
fn control_options_deserialize_partially() {
    let options: ControlOptions = serde_json::from_value(json!({ "interval": 30 })).unwrap();
    let empty: ControlOptions = serde_json::from_value(json!({})).unwrap();

    assert_eq!(options, ControlOptions::with_interval(30.0));
    assert_eq!(empty, ControlOptions::default());
}

#[test]
fn command_event_payload_carries_name_and_value() {
    let event = BridgeEvent::command(Command::SkipForward, Some(EventValue::Number(15.0)));

    let payload = event.to_payload();

    assert_eq!(payload["name"], json!("skip-forward"));
    assert_eq!(payload["value"], json!(15.0));
}

#[test]
fn command_event_without_value_has_no_value_key() {
    let event = BridgeEvent::command(Command::Pause, None);

    let payload = event.to_payload();

    assert_eq!(event.name(), "pause");
    assert!(!payload.contains_key("value"));
}

#[test]
fn rating_event_carries_flag() {
    let event = BridgeEvent::command(Command::SetRating, Some(EventValue::Flag(true)));

    assert_eq!(event.to_payload()["value"], Value::Bool(true));
}

#[test]
fn error_event_payload_names_kind() {
    let error = MediaControlError::RegistrationFailed {
        command: Command::Seek,
        reason: "not supported".to_string(),
    };
    let event = BridgeEvent::Error(ErrorEvent::from(&error));

    let payload = event.to_payload();

    assert_eq!(event.name(), "error");
    assert_eq!(payload["kind"], json!("registration-failed"));
    assert!(
        payload["message"]
            .as_str()
            .unwrap()
            .contains("seek")
    );
}

#[test]
fn error_kinds_are_distinguishable() {
    assert_eq!(
        MediaControlError::UnsupportedPlatform("none".to_string()).kind(),
        ErrorKind::UnsupportedPlatform
    );
    assert_eq!(
        MediaControlError::InvalidMetadata("x".to_string()).kind(),
        ErrorKind::InvalidMetadata
    );
    assert_eq!(
        MediaControlError::InvalidArgument("x".to_string()).kind(),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn sink_drops_signals_once_its_session_ends() {
    let active = Arc::new(AtomicU64::new(1));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let sink = SignalSink::new(1, Arc::clone(&active), tx);

    assert!(sink.is_active());
    assert!(sink.interruption(Interruption::Began));

    active.store(2, Ordering::Release);

    assert!(!sink.is_active());
    assert!(!sink.interruption(Interruption::Began));
    assert_eq!(
        rx.try_recv().unwrap(),
        PlatformSignal::Interruption(Interruption::Began)
    );
    assert!(rx.try_recv().is_err());
}
