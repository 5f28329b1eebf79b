//! Source artifacts and the file-management boundary
//!
//! The preview core never owns project files. It reads a snapshot through
//! [`ArtifactSource`] on every synthesis pass:
//! - artifacts: the editable markup/style/script units
//! - assets: binary resources addressable by path, as data URIs
//! - active artifact: which file currently has focus

mod assets;
mod loader;

pub use assets::{data_uri, is_image_path, mime_for_path, AssetRecord, AssetStore};
pub use loader::load_dir;

use std::sync::{Arc, RwLock};

/// Kind of an editable source unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Markup,
    Style,
    Script,
    Other,
}

impl ArtifactKind {
    /// Classify a path by its extension
    pub fn from_path(path: &str) -> Self {
        let ext = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            // SVG documents preview as markup
            "html" | "htm" | "svg" => ArtifactKind::Markup,
            "css" => ArtifactKind::Style,
            "js" | "javascript" => ArtifactKind::Script,
            _ => ArtifactKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Markup => "html",
            ArtifactKind::Style => "css",
            ArtifactKind::Script => "js",
            ArtifactKind::Other => "other",
        }
    }
}

/// One editable unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    pub id: String,
    pub name: String,
    pub path: String,
    pub content: String,
    pub kind: ArtifactKind,
}

impl SourceArtifact {
    /// Create an artifact with an explicit kind
    pub fn new(
        id: impl Into<String>,
        path: impl Into<String>,
        content: impl Into<String>,
        kind: ArtifactKind,
    ) -> Self {
        let path = path.into();
        Self {
            id: id.into(),
            name: basename(&path).to_string(),
            path,
            content: content.into(),
            kind,
        }
    }

    /// Create an artifact whose kind is derived from the path extension
    pub fn from_path(id: impl Into<String>, path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let kind = ArtifactKind::from_path(&path);
        Self::new(id, path, content, kind)
    }
}

/// Last `/`-separated segment of a path or reference
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Read-only view of the project owned by the file-management collaborator
pub trait ArtifactSource {
    /// Snapshot of all artifacts, in tab order
    fn artifacts(&self) -> Vec<SourceArtifact>;

    /// Data URI for an asset reference, if one is known
    fn resolve_asset(&self, reference: &str) -> Option<String>;

    /// Identifier of the artifact that currently has focus
    fn active_artifact_id(&self) -> Option<String>;
}

/// In-memory project
#[derive(Debug, Clone, Default)]
pub struct Project {
    artifacts: Vec<SourceArtifact>,
    assets: AssetStore,
    active: Option<String>,
}

impl Project {
    /// Create an empty project
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact (replacing one with the same id in place)
    pub fn add_artifact(&mut self, artifact: SourceArtifact) {
        if let Some(existing) = self.artifacts.iter_mut().find(|a| a.id == artifact.id) {
            *existing = artifact;
        } else {
            self.artifacts.push(artifact);
        }
    }

    /// Replace the content of an artifact. Returns false for unknown ids.
    pub fn update_content(&mut self, id: &str, content: impl Into<String>) -> bool {
        match self.artifacts.iter_mut().find(|a| a.id == id) {
            Some(artifact) => {
                artifact.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Focus an artifact
    pub fn set_active(&mut self, id: Option<&str>) {
        self.active = id.map(str::to_string);
    }

    /// Register an asset
    pub fn add_asset(&mut self, path: impl Into<String>, data_uri: impl Into<String>) {
        self.assets.insert(path, data_uri);
    }

    /// Get an artifact by id
    pub fn artifact(&self, id: &str) -> Option<&SourceArtifact> {
        self.artifacts.iter().find(|a| a.id == id)
    }

    /// Asset store
    pub fn assets(&self) -> &AssetStore {
        &self.assets
    }

    /// Number of artifacts
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ArtifactSource for Project {
    fn artifacts(&self) -> Vec<SourceArtifact> {
        self.artifacts.clone()
    }

    fn resolve_asset(&self, reference: &str) -> Option<String> {
        self.assets.lookup(reference).map(str::to_string)
    }

    fn active_artifact_id(&self) -> Option<String> {
        self.active.clone()
    }
}

impl<T: ArtifactSource> ArtifactSource for Arc<RwLock<T>> {
    fn artifacts(&self) -> Vec<SourceArtifact> {
        self.read().map(|source| source.artifacts()).unwrap_or_default()
    }

    fn resolve_asset(&self, reference: &str) -> Option<String> {
        self.read().ok()?.resolve_asset(reference)
    }

    fn active_artifact_id(&self) -> Option<String> {
        self.read().ok()?.active_artifact_id()
    }
}
