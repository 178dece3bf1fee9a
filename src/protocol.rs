//! WebSocket wire messages.
//!
//! Inbound: `{"type": "frame", "data": "<base64 image>"}`.
//! Outbound: `{"type": "status", "status": "<label>"}` or
//! `{"type": "error", "message": "<text>"}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::detection::StatusLabel;

pub const INVALID_JSON: &str = "Invalid JSON";
pub const INVALID_FRAME: &str = "Invalid frame";
pub const UNKNOWN_MESSAGE_TYPE: &str = "Unknown message type";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// `data` 缺失、为 null 或空串时为 `None`
    Frame { data: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Status { status: StatusLabel },
    Error { message: String },
}

impl ServerMessage {
    pub fn status(status: StatusLabel) -> Self {
        ServerMessage::Status { status }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("{}", INVALID_JSON)]
    InvalidJson,
    #[error("{}", UNKNOWN_MESSAGE_TYPE)]
    UnknownType,
    #[error("{}", INVALID_FRAME)]
    InvalidFrame,
}

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text).map_err(|_| ProtocolError::InvalidJson)?;

        match value.get("type").and_then(Value::as_str) {
            Some("frame") => {}
            _ => return Err(ProtocolError::UnknownType),
        }

        let data = match value.get("data") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.trim().is_empty() => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(ProtocolError::InvalidFrame),
        };

        Ok(ClientMessage::Frame { data })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_frame_message() {
        let msg = ClientMessage::parse(r#"{"type":"frame","data":"aGVsbG8="}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Frame {
                data: Some("aGVsbG8=".to_string())
            }
        );
    }

    #[test]
    fn empty_or_missing_data_is_none() {
        for text in [
            r#"{"type":"frame"}"#,
            r#"{"type":"frame","data":null}"#,
            r#"{"type":"frame","data":"  "}"#,
        ] {
            assert_eq!(
                ClientMessage::parse(text).unwrap(),
                ClientMessage::Frame { data: None }
            );
        }
    }

    #[test]
    fn rejects_malformed_json() {
        assert_eq!(
            ClientMessage::parse("not json"),
            Err(ProtocolError::InvalidJson)
        );
    }

    #[test]
    fn rejects_unknown_or_missing_type() {
        assert_eq!(
            ClientMessage::parse(r#"{"type":"ping"}"#),
            Err(ProtocolError::UnknownType)
        );
        assert_eq!(
            ClientMessage::parse(r#"{"data":"abc"}"#),
            Err(ProtocolError::UnknownType)
        );
        assert_eq!(ClientMessage::parse("42"), Err(ProtocolError::UnknownType));
    }

    #[test]
    fn non_string_data_is_invalid_frame() {
        assert_eq!(
            ClientMessage::parse(r#"{"type":"frame","data":123}"#),
            Err(ProtocolError::InvalidFrame)
        );
    }

    #[test]
    fn server_messages_match_wire_shape() {
        assert_eq!(
            serde_json::to_value(ServerMessage::status(StatusLabel::NoFaceDetected)).unwrap(),
            json!({"type": "status", "status": "no-face-detected"})
        );
        assert_eq!(
            serde_json::to_value(ServerMessage::error(INVALID_JSON)).unwrap(),
            json!({"type": "error", "message": "Invalid JSON"})
        );
    }

    #[test]
    fn protocol_errors_display_wire_text() {
        assert_eq!(ProtocolError::InvalidJson.to_string(), "Invalid JSON");
        assert_eq!(ProtocolError::UnknownType.to_string(), "Unknown message type");
        assert_eq!(ProtocolError::InvalidFrame.to_string(), "Invalid frame");
    }
}
