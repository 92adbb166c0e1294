use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message types the gateway understands. Recognized tags outside this set
/// are rejected as [`ProtocolError::UnknownType`] so the caller can drop the
/// frame without tearing the connection down.
const KNOWN_TYPES: [&str; 5] = ["subscribe", "unsubscribe", "publish", "ping", "pong"];

/// One signaling frame: UTF-8 JSON discriminated by its `type` field.
///
/// `data` payloads are opaque to the gateway; they are carried as raw JSON
/// values and never inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalMessage {
    /// Join every room named in `topics`, creating rooms as needed.
    Subscribe {
        #[serde(default)]
        topics: Vec<String>,
    },
    /// Leave every room named in `topics`; emptied rooms are deleted.
    Unsubscribe {
        #[serde(default)]
        topics: Vec<String>,
    },
    /// Relay `data` to every other member of the room named `topic`.
    Publish {
        topic: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    /// Keepalive probe; answered with a `pong` echoing `data`.
    Ping {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    /// Keepalive reply. Inbound pongs carry no state effect.
    Pong {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
}

impl SignalMessage {
    /// Decode one raw binary frame.
    ///
    /// The `type` discriminant is read before the full shape is parsed, so
    /// an unrecognized tag surfaces as [`ProtocolError::UnknownType`] rather
    /// than a generic parse failure.
    pub fn decode(frame: &[u8]) -> Result<Self, ProtocolError> {
        if frame.is_empty() {
            return Err(ProtocolError::EmptyFrame);
        }

        let value: Value = serde_json::from_slice(frame)?;
        let Some(tag) = value.get("type").and_then(Value::as_str) else {
            return Err(ProtocolError::MissingType);
        };
        if !KNOWN_TYPES.contains(&tag) {
            return Err(ProtocolError::UnknownType(tag.to_owned()));
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Serialize into the binary frame sent over the socket.
    pub fn encode(&self) -> Result<Bytes, ProtocolError> {
        Ok(serde_json::to_vec(self)?.into())
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty frame")]
    EmptyFrame,

    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message has no type field")]
    MissingType,

    #[error("unknown message type: {0}")]
    UnknownType(String),
}
