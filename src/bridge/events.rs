//! Host-side diagnostic log

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Kind of a diagnostic event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    Log,
    Info,
    Warn,
    Error,
    Debug,
    Table,
}

impl DiagnosticKind {
    /// Get the display string for the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::Log => "LOG",
            DiagnosticKind::Info => "INFO",
            DiagnosticKind::Warn => "WARN",
            DiagnosticKind::Error => "ERROR",
            DiagnosticKind::Debug => "DEBUG",
            DiagnosticKind::Table => "TABLE",
        }
    }
}

/// Unique id of an event within one log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId {
    pub seq: u64,
    pub timestamp_ms: u64,
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.timestamp_ms, self.seq)
    }
}

/// A diagnostic reported by guest code
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticEvent {
    pub id: EventId,
    pub kind: DiagnosticKind,
    pub message: String,
    pub timestamp_ms: u64,
    pub args: Vec<Value>,
    pub source: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub generation: u64,
}

/// Fields of an event before it gets an id
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub kind: DiagnosticKind,
    pub message: String,
    pub timestamp_ms: Option<u64>,
    pub args: Vec<Value>,
    pub source: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub generation: u64,
}

impl EventDraft {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp_ms: None,
            args: Vec::new(),
            source: None,
            line: None,
            column: None,
            generation: 0,
        }
    }

    /// Set source location
    pub fn with_source(mut self, source: &str, line: u32, column: u32) -> Self {
        self.source = Some(source.to_string());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Ordered, append-only record of diagnostics. Only [`DiagnosticLog::clear`]
/// removes events; there is no expiry.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    events: Vec<DiagnosticEvent>,
    next_seq: u64,
    filter: Option<DiagnosticKind>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, returning its id
    pub fn append(&mut self, draft: EventDraft) -> EventId {
        let timestamp_ms = draft.timestamp_ms.unwrap_or_else(now_ms);
        let id = EventId {
            seq: self.next_seq,
            timestamp_ms,
        };
        self.next_seq += 1;

        self.events.push(DiagnosticEvent {
            id,
            kind: draft.kind,
            message: draft.message,
            timestamp_ms,
            args: draft.args,
            source: draft.source,
            line: draft.line,
            column: draft.column,
            generation: draft.generation,
        });
        id
    }

    /// Remove all events. Ids keep increasing afterwards.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Events in arrival order, honoring the kind filter
    pub fn events(&self) -> impl Iterator<Item = &DiagnosticEvent> {
        self.events
            .iter()
            .filter(|e| self.filter.map(|f| e.kind == f).unwrap_or(true))
    }

    pub fn get(&self, id: EventId) -> Option<&DiagnosticEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    pub fn last(&self) -> Option<&DiagnosticEvent> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Set filter kind
    pub fn set_filter(&mut self, kind: Option<DiagnosticKind>) {
        self.filter = kind;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(kind: DiagnosticKind, message: &str) -> EventDraft {
        EventDraft {
            timestamp_ms: Some(1000),
            ..EventDraft::new(kind, message)
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut log = DiagnosticLog::new();
        log.append(draft(DiagnosticKind::Log, "one"));
        log.append(draft(DiagnosticKind::Error, "two"));
        log.append(draft(DiagnosticKind::Warn, "three"));

        let messages: Vec<_> = log.events().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_ids_are_unique_across_clear() {
        let mut log = DiagnosticLog::new();
        let first = log.append(draft(DiagnosticKind::Log, "a"));
        log.clear();
        assert!(log.is_empty());
        let second = log.append(draft(DiagnosticKind::Log, "a"));
        assert_ne!(first, second);
        assert_eq!(second.seq, 1);
    }

    #[test]
    fn test_event_id_display() {
        let id = EventId { seq: 7, timestamp_ms: 1700 };
        assert_eq!(id.to_string(), "1700-7");
    }

    #[test]
    fn test_filter() {
        let mut log = DiagnosticLog::new();
        log.append(draft(DiagnosticKind::Log, "a"));
        log.append(draft(DiagnosticKind::Error, "b"));
        log.set_filter(Some(DiagnosticKind::Error));
        assert_eq!(log.events().count(), 1);
        assert_eq!(log.len(), 2);
        log.set_filter(None);
        assert_eq!(log.events().count(), 2);
    }

    #[test]
    fn test_missing_timestamp_uses_clock() {
        let mut log = DiagnosticLog::new();
        let id = log.append(EventDraft::new(DiagnosticKind::Info, "now"));
        assert!(id.timestamp_ms > 0);
    }

    #[test]
    fn test_with_source() {
        let mut log = DiagnosticLog::new();
        let id = log.append(draft(DiagnosticKind::Error, "boom").with_source("app.js", 3, 9));
        let event = log.get(id).unwrap();
        assert_eq!(event.source.as_deref(), Some("app.js"));
        assert_eq!((event.line, event.column), (Some(3), Some(9)));
    }

    #[test]
    fn test_kind_str() {
        assert_eq!(DiagnosticKind::Error.as_str(), "ERROR");
        assert_eq!(DiagnosticKind::Table.as_str(), "TABLE");
    }
}
