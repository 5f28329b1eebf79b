//! Sandbox policy for the isolated surface

use crate::utils::SandboxError;
use serde::{Deserialize, Serialize};
use url::Url;

/// Capabilities granted to guest code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxPolicy {
    pub allow_scripts: bool,
    /// Needed for guest scripts to use storage and post with a real origin
    pub allow_same_origin: bool,
    pub allow_top_navigation: bool,
    pub allow_popups: bool,
    pub allow_forms: bool,
    pub allow_modals: bool,
    /// Only messages from this origin reach the bridge; `None` trusts all
    pub expected_origin: Option<String>,
}

impl SandboxPolicy {
    /// Scripts only, opaque origin
    pub fn strict() -> Self {
        Self {
            allow_same_origin: false,
            ..Self::default()
        }
    }

    /// Trust messages from a single origin
    pub fn with_expected_origin(mut self, origin: impl Into<String>) -> Self {
        self.expected_origin = Some(origin.into());
        self
    }

    /// Token list for an iframe `sandbox` attribute
    pub fn sandbox_attribute(&self) -> String {
        let tokens = [
            (self.allow_scripts, "allow-scripts"),
            (self.allow_same_origin, "allow-same-origin"),
            (self.allow_top_navigation, "allow-top-navigation"),
            (self.allow_popups, "allow-popups"),
            (self.allow_forms, "allow-forms"),
            (self.allow_modals, "allow-modals"),
        ];

        tokens
            .iter()
            .filter(|(enabled, _)| *enabled)
            .map(|(_, token)| *token)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Reject policies the preview cannot run under
    pub fn validate(&self) -> Result<(), SandboxError> {
        if !self.allow_scripts {
            return Err(SandboxError::PolicyViolation(
                "scripts must be allowed for the preview to run".to_string(),
            ));
        }
        if self.allow_top_navigation {
            return Err(SandboxError::PolicyViolation(
                "guest code may not navigate the host".to_string(),
            ));
        }
        if let Some(origin) = &self.expected_origin {
            if origin.trim().is_empty() {
                return Err(SandboxError::PolicyViolation("expected origin is empty".to_string()));
            }
        }
        Ok(())
    }

    /// Check a message origin against the expected one
    pub fn is_origin_trusted(&self, origin: &str) -> bool {
        match &self.expected_origin {
            None => true,
            Some(expected) => normalize_origin(expected) == normalize_origin(origin),
        }
    }
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            allow_scripts: true,
            allow_same_origin: true,
            allow_top_navigation: false,
            allow_popups: false,
            allow_forms: false,
            allow_modals: false,
            expected_origin: None,
        }
    }
}

/// Scheme, host and port of a URL; anything unparseable compares as-is
pub fn normalize_origin(origin: &str) -> String {
    let origin = origin.trim();
    match Url::parse(origin) {
        Ok(url) => url.origin().ascii_serialization(),
        Err(_) => origin.to_string(),
    }
}
