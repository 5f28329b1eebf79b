//! Messages posted by guest code to the host

use super::events::{DiagnosticKind, EventDraft};
use crate::utils::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A raw message as it arrives from the isolated surface
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingMessage {
    /// Origin reported by the transport
    pub origin: String,
    pub data: Value,
}

impl IncomingMessage {
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }

    /// Build from JSON text; text that is not JSON becomes a string value
    /// and is rejected later as malformed.
    pub fn from_json(origin: impl Into<String>, text: &str) -> Self {
        let data = serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()));
        Self::new(origin, data)
    }
}

/// Shapes the guest is allowed to send
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GuestMessage {
    Diagnostic(DiagnosticPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticPayload {
    pub channel: String,
    pub generation: u64,
    pub level: DiagnosticKind,
    pub message: String,
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
    #[serde(default)]
    pub uncaught: bool,
    #[serde(default)]
    pub timestamp: Option<f64>,
}

impl DiagnosticPayload {
    /// Key used to deduplicate uncaught errors
    pub fn dedup_key(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.source.as_deref().unwrap_or(""),
            self.line.unwrap_or(0),
            self.column.unwrap_or(0),
            self.message
        )
    }

    pub fn into_draft(self) -> EventDraft {
        EventDraft {
            kind: self.level,
            message: self.message,
            timestamp_ms: self
                .timestamp
                .filter(|t| t.is_finite() && *t >= 0.0)
                .map(|t| t as u64),
            args: self.args,
            source: self.source,
            line: self.line,
            column: self.column,
            generation: self.generation,
        }
    }
}

/// Validate the shape of a message payload
pub fn parse(data: &Value) -> Result<DiagnosticPayload, BridgeError> {
    match serde_json::from_value::<GuestMessage>(data.clone()) {
        Ok(GuestMessage::Diagnostic(payload)) => Ok(payload),
        Err(e) => Err(BridgeError::Malformed(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_diagnostic() {
        let payload = parse(&json!({
            "kind": "diagnostic",
            "channel": "livepane",
            "generation": 2,
            "level": "warn",
            "message": "careful",
            "args": ["careful", {"a": 1}],
            "timestamp": 1700.0
        }))
        .unwrap();

        assert_eq!(payload.level, DiagnosticKind::Warn);
        assert_eq!(payload.generation, 2);
        assert_eq!(payload.args.len(), 2);
        assert!(!payload.uncaught);
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = parse(&json!({"kind": "navigate", "url": "x"})).unwrap_err();
        assert!(matches!(err, BridgeError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let err = parse(&json!({"kind": "diagnostic", "channel": "livepane"})).unwrap_err();
        assert!(matches!(err, BridgeError::Malformed(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(parse(&json!("hello")).is_err());
        assert!(parse(&Value::Null).is_err());
    }

    #[test]
    fn test_from_json_non_json_text() {
        let msg = IncomingMessage::from_json("null", "not json");
        assert_eq!(msg.data, Value::String("not json".into()));
    }

    #[test]
    fn test_dedup_key() {
        let payload = parse(&json!({
            "kind": "diagnostic",
            "channel": "livepane",
            "generation": 1,
            "level": "error",
            "message": "x is not defined",
            "source": "about:srcdoc",
            "line": 4,
            "column": 12,
            "uncaught": true
        }))
        .unwrap();
        assert_eq!(payload.dedup_key(), "about:srcdoc:4:12:x is not defined");
    }

    #[test]
    fn test_into_draft_drops_bad_timestamp() {
        let mut payload = parse(&json!({
            "kind": "diagnostic",
            "channel": "livepane",
            "generation": 1,
            "level": "log",
            "message": "m",
            "timestamp": -5.0
        }))
        .unwrap();
        assert_eq!(payload.clone().into_draft().timestamp_ms, None);
        payload.timestamp = Some(42.9);
        assert_eq!(payload.into_draft().timestamp_ms, Some(42));
    }
}
