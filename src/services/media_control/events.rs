use serde_json::{Map, Value, json};

use super::{Command, ErrorKind, MediaControlError};

/// Value attached to a command event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventValue {
    /// Position, interval, volume or numeric rating
    Number(f64),
    /// Heart/thumbs rating
    Flag(bool),
}

impl From<EventValue> for Value {
    fn from(value: EventValue) -> Self {
        match value {
            EventValue::Number(n) => json!(n),
            EventValue::Flag(b) => Value::Bool(b),
        }
    }
}

/// A remote-control command translated for the application layer
#[derive(Debug, Clone, PartialEq)]
pub struct ControlEvent {
    /// Which command the OS delivered
    pub command: Command,
    /// Optional payload: seek position, skip interval, rating, volume
    pub value: Option<EventValue>,
}

/// A bridge failure delivered to the application layer
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEvent {
    /// Distinguishable failure kind
    pub kind: ErrorKind,
    /// Human-readable details
    pub message: String,
}

impl From<&MediaControlError> for ErrorEvent {
    fn from(error: &MediaControlError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Events emitted by the media control bridge
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// An OS remote-control command
    Command(ControlEvent),

    /// A failure the application should know about
    Error(ErrorEvent),
}

impl BridgeEvent {
    /// Shorthand for a command event.
    pub fn command(command: Command, value: Option<EventValue>) -> Self {
        Self::Command(ControlEvent { command, value })
    }

    /// Event name as seen by listeners.
    pub fn name(&self) -> &'static str {
        match self {
            BridgeEvent::Command(event) => event.command.name(),
            BridgeEvent::Error(_) => "error",
        }
    }

    /// Plain key/value payload: `{"name": ..., "value": ...}` for commands,
    /// `{"name": "error", "kind": ..., "message": ...}` for errors.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("name".to_string(), Value::from(self.name()));

        match self {
            BridgeEvent::Command(event) => {
                if let Some(value) = event.value {
                    payload.insert("value".to_string(), value.into());
                }
            }
            BridgeEvent::Error(error) => {
                payload.insert("kind".to_string(), json!(error.kind));
                payload.insert("message".to_string(), Value::from(error.message.as_str()));
            }
        }

        payload
    }
}
