//! Preview configuration
//!
//! Loaded from JSON; every field is optional.
//!
//! ```json
//! {
//!   "live": false,
//!   "quiet_period_ms": 500,
//!   "policy": { "allow_forms": true },
//!   "bridge": { "channel": "livepane" },
//!   "capabilities": [
//!     { "name": "tailwind", "kind": "script",
//!       "source": { "type": "external", "value": "https://cdn.tailwindcss.com" } }
//!   ]
//! }
//! ```

use crate::bridge::BridgeConfig;
use crate::sandbox::SandboxPolicy;
use crate::scheduler::PreviewMode;
use crate::synth::Capability;
use crate::utils::{LivepaneError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Start in live mode
    pub live: bool,
    /// Debounce quiet period in live mode
    pub quiet_period_ms: u64,
    pub policy: SandboxPolicy,
    pub bridge: BridgeConfig,
    pub capabilities: Vec<Capability>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            live: true,
            quiet_period_ms: 300,
            policy: SandboxPolicy::default(),
            bridge: BridgeConfig::default(),
            capabilities: Vec::new(),
        }
    }
}

impl PreviewConfig {
    /// Parse and validate JSON configuration
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.bridge.channel.trim().is_empty() {
            return Err(LivepaneError::Config("bridge channel must not be empty".to_string()));
        }

        let mut seen = HashSet::new();
        for capability in &self.capabilities {
            if capability.name.trim().is_empty() {
                return Err(LivepaneError::Config("capability name must not be empty".to_string()));
            }
            // Names that sanitize to the same marker id would collide
            if !seen.insert(capability.marker().id()) {
                return Err(LivepaneError::Config(format!(
                    "duplicate capability: {}",
                    capability.name
                )));
            }
        }

        if self.quiet_period_ms == 0 {
            log::warn!("quiet_period_ms is 0, every live change renders immediately");
        }

        self.policy.validate()?;
        Ok(())
    }

    pub fn mode(&self) -> PreviewMode {
        PreviewMode::from_live(self.live)
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::{CapabilityKind, CapabilitySource};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = PreviewConfig::from_json("{}").unwrap();
        assert_eq!(config, PreviewConfig::default());
        assert_eq!(config.mode(), PreviewMode::Live);
        assert_eq!(config.quiet_period(), Duration::from_millis(300));
    }

    #[test]
    fn test_full_config() {
        let config = PreviewConfig::from_json(
            r#"{
                "live": false,
                "quiet_period_ms": 500,
                "policy": {"expected_origin": "https://editor.example"},
                "bridge": {"channel": "preview"},
                "capabilities": [
                    {"name": "tailwind", "kind": "script",
                     "source": {"type": "external", "value": "https://cdn.tailwindcss.com"}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(config.mode(), PreviewMode::Manual);
        assert_eq!(config.bridge.channel, "preview");
        // Noise patterns keep their defaults when omitted
        assert_eq!(config.bridge.noise_patterns.len(), 2);
        assert_eq!(config.capabilities[0].kind, CapabilityKind::Script);
        assert_eq!(
            config.capabilities[0].source,
            CapabilitySource::External("https://cdn.tailwindcss.com".into())
        );
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(PreviewConfig::from_json("{"), Err(LivepaneError::Json(_))));
    }

    #[test]
    fn test_duplicate_capability() {
        let mut config = PreviewConfig::default();
        config.capabilities.push(Capability::inline_style("a b", "p{}"));
        config.capabilities.push(Capability::inline_style("a-b", "p{}"));
        assert!(matches!(config.validate(), Err(LivepaneError::Config(_))));
    }

    #[test]
    fn test_empty_channel() {
        let result = PreviewConfig::from_json(r#"{"bridge": {"channel": " "}}"#);
        assert!(matches!(result, Err(LivepaneError::Config(_))));
    }

    #[test]
    fn test_policy_violation() {
        let result = PreviewConfig::from_json(r#"{"policy": {"allow_scripts": false}}"#);
        assert!(matches!(result, Err(LivepaneError::Sandbox(_))));
    }

    #[test]
    fn test_load() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"quiet_period_ms": 50}}"#).unwrap();
        let config = PreviewConfig::load(file.path()).unwrap();
        assert_eq!(config.quiet_period_ms, 50);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            PreviewConfig::load("/nonexistent/livepane.json"),
            Err(LivepaneError::Io(_))
        ));
    }
}
