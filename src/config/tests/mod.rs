//! Unit tests for config module
//!
//! Tests configuration types, defaults, validation and serialization.

#![allow(clippy::panic)]
#![allow(clippy::unwrap_used)]

use std::fs;

use crate::{
    MusicControlError,
    config::{Config, LogLevel, PlatformKind},
    services::media_control::{BridgeOptions, Command},
};

#[test]
fn config_default() {
    let config = Config::default();

    assert_eq!(config.general.log_level, LogLevel::Info);
    assert_eq!(config.bridge.platform, PlatformKind::Mpris);
    assert!(config.bridge.controls.contains(&Command::Pause));
    assert!(config.validate().is_ok());
}

#[test]
fn config_serialize_toml() {
    let toml_str = toml::to_string(&Config::default()).unwrap();

    assert!(toml_str.contains("[general]"));
    assert!(toml_str.contains("[bridge]"));
    assert!(toml_str.contains("\"next-track\""));
}

#[test]
fn config_empty_toml() {
    let config = Config::from_toml("").unwrap();

    assert_eq!(config, Config::default());
}

#[test]
fn config_partial_bridge_section_keeps_defaults() {
    let config = Config::from_toml(
        r#"
        [general]
        log_level = "debug"

        [bridge]
        platform = "memory"
        controls = ["play", "pause", "skip-forward"]
        skip_interval = 30.0
    "#,
    )
    .unwrap();

    assert_eq!(config.general.log_level, LogLevel::Debug);
    assert_eq!(config.bridge.platform, PlatformKind::Memory);
    assert_eq!(
        config.bridge.controls,
        vec![Command::Play, Command::Pause, Command::SkipForward]
    );
    assert_eq!(config.bridge.skip_interval, 30.0);
    assert_eq!(config.bridge.player_name, "music_control");
}

#[test]
fn config_rejects_unknown_control() {
    let result = Config::from_toml(
        r#"
        [bridge]
        controls = ["rewind-time"]
    "#,
    );

    assert!(matches!(result, Err(MusicControlError::TomlParseError { .. })));
}

#[test]
fn config_rejects_non_positive_skip_interval() {
    let result = Config::from_toml(
        r#"
        [bridge]
        skip_interval = 0.0
    "#,
    );

    match result {
        Err(MusicControlError::InvalidConfigField { field, .. }) => {
            assert_eq!(field, "bridge.skip_interval");
        }
        other => panic!("expected invalid field, got {other:?}"),
    }
}

#[test]
fn config_rejects_bad_player_name() {
    let result = Config::from_toml(
        r#"
        [bridge]
        player_name = "my.player"
    "#,
    );

    assert!(matches!(
        result,
        Err(MusicControlError::InvalidConfigField { .. })
    ));
}

#[test]
fn config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
        [bridge]
        identity = "Jukebox"
        observe_interruptions = true
    "#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.bridge.identity, "Jukebox");
    assert!(config.bridge.observe_interruptions);
}

#[test]
fn config_load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = Config::load(&dir.path().join("absent.toml"));

    assert!(matches!(result, Err(MusicControlError::IoError { .. })));
}

#[test]
fn bridge_options_follow_config() {
    let config = Config::from_toml(
        r#"
        [bridge]
        controls = ["seek"]
        event_capacity = 8
    "#,
    )
    .unwrap();

    let options = BridgeOptions::from(&config.bridge);

    assert_eq!(options.controls, vec![Command::Seek]);
    assert_eq!(options.event_capacity, 8);
}

#[test]
fn json_schema_names_bridge_fields() {
    let schema = Config::json_schema().unwrap();

    assert!(schema.contains("skip_interval"));
    assert!(schema.contains("player_name"));
}
