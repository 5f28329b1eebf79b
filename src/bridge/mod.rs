//! Diagnostics bridge
//!
//! Carries console output and uncaught errors from guest code in the
//! isolated surface back to the host. The guest half is a script
//! ([`capture_script`]) injected into every document; the host half is
//! [`DiagnosticsBridge`], which validates each posted message and appends
//! accepted ones to the [`DiagnosticLog`].

mod capture;
pub mod format;
mod events;
mod message;
mod noise;

pub use capture::capture_script;
pub use events::{DiagnosticEvent, DiagnosticKind, DiagnosticLog, EventDraft, EventId};
pub use message::{parse, DiagnosticPayload, GuestMessage, IncomingMessage};
pub use noise::{NoiseFilter, DEFAULT_NOISE_PATTERNS};

use crate::sandbox::SandboxPolicy;
use crate::utils::BridgeError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default message channel tag
pub const DEFAULT_CHANNEL: &str = "livepane";

/// Bridge settings shared by the guest script and the host receiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub channel: String,
    pub noise_patterns: Vec<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_string(),
            noise_patterns: DEFAULT_NOISE_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Lifecycle of the bridge for the current surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    /// A document of this generation was applied; nothing received yet
    Installed(u64),
    /// At least one message of this generation was accepted
    Active(u64),
    TornDown,
}

impl BridgeState {
    pub fn generation(&self) -> Option<u64> {
        match self {
            BridgeState::Installed(g) | BridgeState::Active(g) => Some(*g),
            _ => None,
        }
    }
}

/// Outcome of handing one message to the bridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receipt {
    Accepted(EventId),
    Dropped(BridgeError),
}

impl Receipt {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Receipt::Accepted(_))
    }

    pub fn event_id(&self) -> Option<EventId> {
        match self {
            Receipt::Accepted(id) => Some(*id),
            Receipt::Dropped(_) => None,
        }
    }
}

/// Host-side receiver
pub struct DiagnosticsBridge {
    channel: String,
    policy: SandboxPolicy,
    noise: NoiseFilter,
    state: BridgeState,
    reported: HashSet<String>,
    log: DiagnosticLog,
}

impl DiagnosticsBridge {
    pub fn new(config: &BridgeConfig, policy: &SandboxPolicy) -> Self {
        Self {
            channel: config.channel.clone(),
            policy: policy.clone(),
            noise: NoiseFilter::new(config.noise_patterns.iter().cloned()),
            state: BridgeState::Uninitialized,
            reported: HashSet::new(),
            log: DiagnosticLog::new(),
        }
    }

    /// A new document generation was applied to the surface
    pub fn begin_generation(&mut self, generation: u64) {
        self.state = BridgeState::Installed(generation);
        self.reported.clear();
        log::debug!("diagnostics bridge installed for generation {}", generation);
    }

    /// The surface is gone; every later message is dropped
    pub fn tear_down(&mut self) {
        self.state = BridgeState::TornDown;
        self.reported.clear();
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Validate a message and append it to the log.
    ///
    /// Never fails: rejected messages come back as [`Receipt::Dropped`].
    pub fn receive(&mut self, message: &IncomingMessage) -> Receipt {
        match self.accept(message) {
            Ok(id) => Receipt::Accepted(id),
            Err(reason) => {
                log::debug!("dropped guest message from {:?}: {}", message.origin, reason);
                Receipt::Dropped(reason)
            }
        }
    }

    fn accept(&mut self, message: &IncomingMessage) -> Result<EventId, BridgeError> {
        let current = self.state.generation().ok_or(BridgeError::NotInstalled)?;

        if !self.policy.is_origin_trusted(&message.origin) {
            return Err(BridgeError::UntrustedOrigin(message.origin.clone()));
        }

        let payload = parse(&message.data)?;
        if payload.channel != self.channel {
            return Err(BridgeError::UnknownChannel(payload.channel));
        }
        if payload.generation != current {
            return Err(BridgeError::StaleGeneration {
                received: payload.generation,
                current,
            });
        }
        if self.noise.is_noise(&payload.message) {
            return Err(BridgeError::Noise);
        }
        if payload.uncaught {
            let key = payload.dedup_key();
            if !self.reported.insert(key.clone()) {
                return Err(BridgeError::Duplicate(key));
            }
        }

        let id = self.log.append(payload.into_draft());
        self.state = BridgeState::Active(current);
        Ok(id)
    }

    pub fn log(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut DiagnosticLog {
        &mut self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }

    pub fn noise(&self) -> &NoiseFilter {
        &self.noise
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn diagnostic(generation: u64, level: &str, message: &str) -> Value {
        json!({
            "kind": "diagnostic",
            "channel": "livepane",
            "generation": generation,
            "level": level,
            "message": message,
            "args": [message],
            "timestamp": 1000.0
        })
    }

    fn uncaught(generation: u64, message: &str) -> Value {
        json!({
            "kind": "diagnostic",
            "channel": "livepane",
            "generation": generation,
            "level": "error",
            "message": message,
            "source": "about:srcdoc",
            "line": 3,
            "column": 7,
            "uncaught": true
        })
    }

    fn bridge() -> DiagnosticsBridge {
        let mut bridge = DiagnosticsBridge::new(&BridgeConfig::default(), &SandboxPolicy::default());
        bridge.begin_generation(1);
        bridge
    }

    fn msg(data: Value) -> IncomingMessage {
        IncomingMessage::new("null", data)
    }

    #[test]
    fn test_state_transitions() {
        let mut bridge = DiagnosticsBridge::new(&BridgeConfig::default(), &SandboxPolicy::default());
        assert_eq!(bridge.state(), BridgeState::Uninitialized);
        bridge.begin_generation(1);
        assert_eq!(bridge.state(), BridgeState::Installed(1));
        assert!(bridge.receive(&msg(diagnostic(1, "log", "hi"))).is_accepted());
        assert_eq!(bridge.state(), BridgeState::Active(1));
        bridge.begin_generation(2);
        assert_eq!(bridge.state(), BridgeState::Installed(2));
        bridge.tear_down();
        assert_eq!(bridge.state(), BridgeState::TornDown);
    }

    #[test]
    fn test_drop_before_install_and_after_teardown() {
        let mut bridge = DiagnosticsBridge::new(&BridgeConfig::default(), &SandboxPolicy::default());
        assert_eq!(
            bridge.receive(&msg(diagnostic(0, "log", "early"))),
            Receipt::Dropped(BridgeError::NotInstalled)
        );
        bridge.begin_generation(1);
        bridge.tear_down();
        assert_eq!(
            bridge.receive(&msg(diagnostic(1, "log", "late"))),
            Receipt::Dropped(BridgeError::NotInstalled)
        );
        assert!(bridge.log().is_empty());
    }

    #[test]
    fn test_accepts_in_order() {
        let mut bridge = bridge();
        bridge.receive(&msg(diagnostic(1, "log", "a")));
        bridge.receive(&msg(diagnostic(1, "warn", "b")));
        bridge.receive(&msg(diagnostic(1, "info", "c")));
        let kinds: Vec<_> = bridge.log().events().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![DiagnosticKind::Log, DiagnosticKind::Warn, DiagnosticKind::Info]);
    }

    #[test]
    fn test_malformed_dropped() {
        let mut bridge = bridge();
        let receipt = bridge.receive(&msg(json!({"hello": "world"})));
        assert!(matches!(receipt, Receipt::Dropped(BridgeError::Malformed(_))));
        let receipt = bridge.receive(&IncomingMessage::from_json("null", "{oops"));
        assert!(matches!(receipt, Receipt::Dropped(BridgeError::Malformed(_))));
        assert!(bridge.log().is_empty());
    }

    #[test]
    fn test_wrong_channel_dropped() {
        let mut bridge = bridge();
        let mut data = diagnostic(1, "log", "x");
        data["channel"] = json!("devtools");
        assert_eq!(
            bridge.receive(&msg(data)),
            Receipt::Dropped(BridgeError::UnknownChannel("devtools".into()))
        );
    }

    #[test]
    fn test_stale_generation_dropped() {
        let mut bridge = bridge();
        bridge.begin_generation(2);
        assert_eq!(
            bridge.receive(&msg(diagnostic(1, "log", "old"))),
            Receipt::Dropped(BridgeError::StaleGeneration { received: 1, current: 2 })
        );
        assert!(bridge.receive(&msg(diagnostic(2, "log", "new"))).is_accepted());
        assert_eq!(bridge.log().len(), 1);
    }

    #[test]
    fn test_untrusted_origin_dropped() {
        let policy = SandboxPolicy {
            expected_origin: Some("https://preview.example".into()),
            ..SandboxPolicy::default()
        };
        let mut bridge = DiagnosticsBridge::new(&BridgeConfig::default(), &policy);
        bridge.begin_generation(1);

        let receipt = bridge.receive(&IncomingMessage::new("https://evil.example", diagnostic(1, "log", "x")));
        assert_eq!(
            receipt,
            Receipt::Dropped(BridgeError::UntrustedOrigin("https://evil.example".into()))
        );
        let receipt = bridge.receive(&IncomingMessage::new(
            "https://preview.example",
            diagnostic(1, "log", "x"),
        ));
        assert!(receipt.is_accepted());
    }

    #[test]
    fn test_noise_dropped() {
        let mut bridge = bridge();
        let receipt = bridge.receive(&msg(diagnostic(
            1,
            "warn",
            "cdn.tailwindcss.com should not be used in production",
        )));
        assert_eq!(receipt, Receipt::Dropped(BridgeError::Noise));
    }

    #[test]
    fn test_uncaught_deduplicated_per_generation() {
        let mut bridge = bridge();
        assert!(bridge.receive(&msg(uncaught(1, "x is not defined"))).is_accepted());
        assert!(matches!(
            bridge.receive(&msg(uncaught(1, "x is not defined"))),
            Receipt::Dropped(BridgeError::Duplicate(_))
        ));
        bridge.begin_generation(2);
        assert!(bridge.receive(&msg(uncaught(2, "x is not defined"))).is_accepted());
        assert_eq!(bridge.log().len(), 2);
    }

    #[test]
    fn test_console_errors_not_deduplicated() {
        let mut bridge = bridge();
        bridge.receive(&msg(diagnostic(1, "error", "same")));
        bridge.receive(&msg(diagnostic(1, "error", "same")));
        assert_eq!(bridge.log().len(), 2);
    }

    #[test]
    fn test_log_survives_generations_until_cleared() {
        let mut bridge = bridge();
        bridge.receive(&msg(diagnostic(1, "log", "a")));
        bridge.begin_generation(2);
        assert_eq!(bridge.log().len(), 1);
        bridge.clear();
        assert!(bridge.log().is_empty());
    }

    #[test]
    fn test_event_carries_payload() {
        let mut bridge = bridge();
        let id = bridge.receive(&msg(diagnostic(1, "table", "rows"))).event_id().unwrap();
        let event = bridge.log().get(id).unwrap();
        assert_eq!(event.kind, DiagnosticKind::Table);
        assert_eq!(event.timestamp_ms, 1000);
        assert_eq!(event.generation, 1);
        assert_eq!(event.args, vec![json!("rows")]);
    }
}
