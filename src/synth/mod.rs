//! Document synthesis
//!
//! Merges the project's markup, styles, scripts and assets into one
//! self-contained HTML document:
//! 1. Pick the markup artifact (active one, else the first)
//! 2. Strip blocks injected by a previous pass
//! 3. Normalize structure (doctype, html/head/body)
//! 4. Rewrite asset references to data URIs
//! 5. Inject diagnostics, styles and scripts at their anchors
//!
//! Synthesis is a pure function of its inputs.

mod assets;
mod capability;
pub mod markers;
mod outline;

pub use assets::{rewrite_css, rewrite_markup};
pub use capability::{Capability, CapabilityKind, CapabilitySource};
pub use markers::Marker;
pub use outline::DocumentOutline;

use crate::bridge::{capture_script, BridgeConfig};
use crate::project::{basename, ArtifactKind, ArtifactSource, SourceArtifact};

/// Document produced when the project has no markup artifact
pub const NO_MARKUP_DOCUMENT: &str =
    "<!DOCTYPE html><html><head></head><body><p>No HTML file found</p></body></html>";

/// Separator between concatenated style or script artifacts
const SOURCE_SEPARATOR: &str = "\n\n";

/// Resolve an asset reference: literal first, then by basename
pub fn resolve_reference<S: ArtifactSource + ?Sized>(source: &S, reference: &str) -> Option<String> {
    source.resolve_asset(reference).or_else(|| {
        let name = basename(reference);
        if name != reference {
            source.resolve_asset(name)
        } else {
            None
        }
    })
}

/// Pick the markup artifact to preview
pub fn select_markup<'a>(artifacts: &'a [SourceArtifact], active_id: Option<&str>) -> Option<&'a SourceArtifact> {
    active_id
        .and_then(|id| artifacts.iter().find(|a| a.id == id))
        .filter(|a| a.kind == ArtifactKind::Markup)
        .or_else(|| artifacts.iter().find(|a| a.kind == ArtifactKind::Markup))
}

/// Concatenate every artifact of one kind, in list order
pub fn aggregate(artifacts: &[SourceArtifact], kind: ArtifactKind) -> String {
    artifacts
        .iter()
        .filter(|a| a.kind == kind)
        .map(|a| a.content.as_str())
        .collect::<Vec<_>>()
        .join(SOURCE_SEPARATOR)
}

/// Builds preview documents
#[derive(Debug, Clone)]
pub struct Synthesizer {
    capture_script: String,
    capabilities: Vec<Capability>,
}

impl Synthesizer {
    /// Create a synthesizer with the given bridge settings and capabilities
    pub fn new(bridge: &BridgeConfig, capabilities: Vec<Capability>) -> Self {
        Self {
            capture_script: capture_script(bridge),
            capabilities,
        }
    }

    /// Synthesize from a snapshot of the project
    pub fn synthesize<S: ArtifactSource + ?Sized>(&self, source: &S) -> String {
        let artifacts = source.artifacts();
        let active = source.active_artifact_id();
        let markup = select_markup(&artifacts, active.as_deref());
        let css = aggregate(&artifacts, ArtifactKind::Style);
        let js = aggregate(&artifacts, ArtifactKind::Script);

        self.compose(
            markup.map(|a| a.content.as_str()),
            &css,
            &js,
            &|reference: &str| resolve_reference(source, reference),
        )
    }

    /// Synthesize from already-selected inputs
    pub fn compose(
        &self,
        markup: Option<&str>,
        css: &str,
        js: &str,
        resolve: &dyn Fn(&str) -> Option<String>,
    ) -> String {
        let Some(markup) = markup else {
            return NO_MARKUP_DOCUMENT.to_string();
        };

        let html = markers::strip_all(markup);
        let html = markers::ensure_structure(&html);
        let html = rewrite_markup(&html, resolve);

        let mut head = markers::diagnostics_block(&self.capture_script);
        for capability in self.capabilities_of(CapabilityKind::Style) {
            head.push_str(&capability.render());
        }
        if !css.is_empty() {
            head.push_str(&markers::style_block(&Marker::Styles, &rewrite_css(css, resolve)));
        }

        let mut body = String::new();
        for capability in self.capabilities_of(CapabilityKind::Script) {
            body.push_str(&capability.render());
        }
        if !js.is_empty() {
            body.push_str(&markers::script_block(&Marker::Scripts, js));
        }

        let html = markers::insert_after_head_open(&html, &head);
        markers::insert_before_body_close(&html, &body)
    }

    fn capabilities_of(&self, kind: CapabilityKind) -> impl Iterator<Item = &Capability> {
        self.capabilities.iter().filter(move |c| c.kind == kind)
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(&BridgeConfig::default(), Vec::new())
    }
}
