//! Wire-level vocabulary: transport frames, outer envelopes and message codes.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::warn;

use crate::decoder::{self, Value};

mod codes;

pub use codes::CodeTable;

static NIL: Value = Value::Nil;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePayload {
    Binary(Vec<u8>),
    Text(String),
}

/// One unit handed over by the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub direction: Direction,
    pub payload: FramePayload,
}

impl Frame {
    pub fn incoming(bytes: Vec<u8>) -> Self {
        Self {
            direction: Direction::Incoming,
            payload: FramePayload::Binary(bytes),
        }
    }

    pub fn incoming_text(text: impl Into<String>) -> Self {
        Self {
            direction: Direction::Incoming,
            payload: FramePayload::Text(text.into()),
        }
    }

    pub fn byte_size(&self) -> usize {
        match &self.payload {
            FramePayload::Binary(bytes) => bytes.len(),
            FramePayload::Text(text) => text.len(),
        }
    }

    /// Binary frames go through the MessagePack decoder, text frames through JSON.
    pub fn decode(&self) -> Option<Value> {
        match &self.payload {
            FramePayload::Binary(bytes) => decoder::decode(bytes),
            FramePayload::Text(text) => match serde_json::from_str::<serde_json::Value>(text) {
                Ok(json) => Some(Value::from(json)),
                Err(err) => {
                    warn!(size = text.len(), "text frame is not json: {err}");
                    None
                }
            },
        }
    }
}

/// Numeric `type` codes of typed messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    FullSnapshot,
    Diff,
    ResourceDistribution,
    LegalSettlements,
    LegalRoads,
    LegalCities,
    LegalRobberTiles,
    Pause,
    Ready,
    GameActive,
    TurnEnd,
    Other(i64),
}

impl MessageKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            4 => MessageKind::FullSnapshot,
            91 => MessageKind::Diff,
            28 => MessageKind::ResourceDistribution,
            30 => MessageKind::LegalSettlements,
            31 => MessageKind::LegalRoads,
            32 => MessageKind::LegalCities,
            33 => MessageKind::LegalRobberTiles,
            5 => MessageKind::Pause,
            6 => MessageKind::Ready,
            78 => MessageKind::GameActive,
            80 => MessageKind::TurnEnd,
            other => MessageKind::Other(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            MessageKind::FullSnapshot => 4,
            MessageKind::Diff => 91,
            MessageKind::ResourceDistribution => 28,
            MessageKind::LegalSettlements => 30,
            MessageKind::LegalRoads => 31,
            MessageKind::LegalCities => 32,
            MessageKind::LegalRobberTiles => 33,
            MessageKind::Pause => 5,
            MessageKind::Ready => 6,
            MessageKind::GameActive => 78,
            MessageKind::TurnEnd => 80,
            MessageKind::Other(code) => code,
        }
    }
}

/// A `{ type, payload }` message, either at the top level or inside an id envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypedMessage<'a> {
    pub kind: MessageKind,
    /// Nil when the message carries no payload.
    pub payload: &'a Value,
}

impl<'a> TypedMessage<'a> {
    fn from_value(value: &'a Value) -> Option<Self> {
        let code = value.field("type")?.as_i64()?;
        Some(Self {
            kind: MessageKind::from_code(code),
            payload: value.get("payload").unwrap_or(&NIL),
        })
    }

    pub fn diff(&self) -> Option<&'a Value> {
        self.payload.field("diff")
    }
}

/// Outer shape of a decoded frame, resolved once before any dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Envelope<'a> {
    Typed(TypedMessage<'a>),
    Id { id: &'a Value, data: &'a Value },
    /// Id envelope whose data is exactly `{ timestamp }`.
    Heartbeat { timestamp: Option<i64> },
    /// Session-level frames with a string `type`, e.g. handshakes.
    Control { name: &'a str },
    Unrecognized,
}

impl<'a> Envelope<'a> {
    pub fn classify(value: &'a Value) -> Self {
        if !value.is_map() {
            return Envelope::Unrecognized;
        }
        if let Some(name) = value.field("type").and_then(Value::as_str) {
            return Envelope::Control { name };
        }
        if let Some(message) = TypedMessage::from_value(value) {
            return Envelope::Typed(message);
        }
        if let Some(id) = value.field("id") {
            let data = value.get("data").unwrap_or(&NIL);
            if is_heartbeat_data(data) {
                return Envelope::Heartbeat {
                    timestamp: data.i64_field("timestamp"),
                };
            }
            return Envelope::Id { id, data };
        }
        Envelope::Unrecognized
    }

    /// The typed message carried by this envelope, if any.
    pub fn message(&self) -> Option<TypedMessage<'a>> {
        match self {
            Envelope::Typed(message) => Some(*message),
            Envelope::Id { data, .. } => TypedMessage::from_value(data),
            _ => None,
        }
    }

    pub fn is_heartbeat(&self) -> bool {
        matches!(self, Envelope::Heartbeat { .. })
    }
}

fn is_heartbeat_data(data: &Value) -> bool {
    match data.as_map() {
        Some([(key, _)]) => key.as_str() == Some("timestamp"),
        _ => false,
    }
}
