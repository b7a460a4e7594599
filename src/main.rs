//! music-control host - runs the media control bridge over stdio
//!
//! Reads one JSON request per line on stdin (`{"method": "...", "args": [...]}`)
//! and writes emitted events as JSON lines on stdout. Logs go to stderr.

use std::{error::Error, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{Level, debug, info, span, warn};
use music_control::{
    config::{BridgeConfig, Config, LogLevel, PlatformKind},
    services::media_control::{
        BridgeOptions, ErrorKind, MediaControlBridge, MediaPlatform, MemoryPlatform,
        MprisPlatform, UnavailablePlatform,
        transport::{EVENT_CHANNEL, LegacyBridge},
    },
    tracing_config,
};

#[derive(Parser)]
#[command(name = "music-control", version)]
#[command(about = "Bridge system media controls to a line-oriented JSON host")]
struct Cli {
    /// Configuration file; defaults to the XDG config location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Media surface to publish on, overriding the config file
    #[arg(short, long, value_enum)]
    platform: Option<PlatformKind>,

    /// Log level, overriding the config file
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Also write logs to a rolling file in the data directory
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bridge (default)
    Run,
    /// Print the configuration JSON schema
    Schema,
}

/// One host call read from stdin.
#[derive(Debug, Deserialize)]
struct Request {
    method: String,
    #[serde(default)]
    args: Vec<Value>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Schema)) {
        println!("{}", Config::json_schema()?);
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_or_default()?,
    };
    if let Some(platform) = cli.platform {
        config.bridge.platform = platform;
    }
    let log_level = cli.log_level.unwrap_or(config.general.log_level);

    let _guard = if cli.log_file || config.general.log_to_file {
        Some(tracing_config::init_with_file(log_level)?)
    } else {
        tracing_config::init(log_level)?;
        None
    };

    let _span = span!(Level::INFO, "music_control").entered();
    info!(platform = ?config.bridge.platform, "Starting media control bridge");

    run(config).await
}

/// Serves host calls until stdin closes or the process is interrupted.
///
/// # Errors
/// Returns error if stdin cannot be read.
async fn run(config: Config) -> Result<(), Box<dyn Error>> {
    let platform = build_platform(&config.bridge).await;
    let bridge = Arc::new(MediaControlBridge::new(
        platform,
        BridgeOptions::from(&config.bridge),
    ));
    let legacy = LegacyBridge::new(bridge, emit_line);

    legacy.add_listener(EVENT_CHANNEL);
    if config.bridge.background_mode {
        legacy.enable_background_mode(true).await;
    }
    legacy.enable().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => handle_line(&legacy, &line).await,
                None => {
                    debug!("stdin closed");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    legacy.stop_control().await;
    info!("Media control bridge stopped");
    Ok(())
}

async fn build_platform(config: &BridgeConfig) -> Arc<dyn MediaPlatform> {
    match config.platform {
        PlatformKind::Mpris => {
            match MprisPlatform::connect(&config.player_name, &config.identity).await {
                Ok(platform) => Arc::new(platform),
                Err(error) => {
                    warn!(%error, "MPRIS surface unavailable, remote controls disabled");
                    Arc::new(UnavailablePlatform::new(error.to_string()))
                }
            }
        }
        PlatformKind::Memory => Arc::new(MemoryPlatform::new()),
        PlatformKind::None => Arc::new(UnavailablePlatform::new("no media surface configured")),
    }
}

async fn handle_line(legacy: &LegacyBridge<MediaControlBridge>, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    let request: Request = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(error) => {
            reply_error(ErrorKind::InvalidArgument, &format!("malformed request: {error}"));
            return;
        }
    };

    if let Err(error) = legacy.call(&request.method, &request.args).await {
        reply_error(error.kind(), &error.to_string());
    }
}

fn emit_line(channel: &str, body: Value) {
    println!("{}", json!({ "channel": channel, "body": body }));
}

fn reply_error(kind: ErrorKind, message: &str) {
    println!(
        "{}",
        json!({ "error": { "kind": kind, "message": message } })
    );
}
