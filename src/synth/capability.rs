//! Third-party capabilities injected into every preview (CSS frameworks,
//! helper libraries)

use super::markers::{escape_attr, script_block, style_block, Marker};
use serde::{Deserialize, Serialize};

/// Where a capability is injected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    /// Goes into `<head>` with the styles
    Style,
    /// Goes before `</body>` ahead of user scripts
    Script,
}

/// Inline content or an external URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CapabilitySource {
    Inline(String),
    External(String),
}

/// A third-party style or script block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub kind: CapabilityKind,
    pub source: CapabilitySource,
}

impl Capability {
    pub fn inline_style(name: impl Into<String>, css: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CapabilityKind::Style,
            source: CapabilitySource::Inline(css.into()),
        }
    }

    pub fn external_script(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: CapabilityKind::Script,
            source: CapabilitySource::External(url.into()),
        }
    }

    pub fn marker(&self) -> Marker {
        Marker::Capability(self.name.clone())
    }

    /// Render the marked block
    pub fn render(&self) -> String {
        let marker = self.marker();
        match (&self.kind, &self.source) {
            (CapabilityKind::Style, CapabilitySource::Inline(css)) => style_block(&marker, css),
            (CapabilityKind::Style, CapabilitySource::External(url)) => format!(
                "<link id=\"{}\" rel=\"stylesheet\" href=\"{}\">",
                marker.id(),
                escape_attr(url)
            ),
            (CapabilityKind::Script, CapabilitySource::Inline(js)) => script_block(&marker, js),
            (CapabilityKind::Script, CapabilitySource::External(url)) => format!(
                "<script id=\"{}\" src=\"{}\"></script>",
                marker.id(),
                escape_attr(url)
            ),
        }
    }
}
