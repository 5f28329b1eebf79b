//! Load a project from a directory on disk

use super::{ArtifactKind, Project, SourceArtifact, data_uri, is_image_path};
use crate::utils::Result;
use std::fs;
use std::path::Path;

/// Walk `root` recursively and build a project from it.
///
/// Markup, style and script files become artifacts; images become
/// assets; everything else is ignored. The first markup artifact is
/// made active.
pub fn load_dir(root: impl AsRef<Path>) -> Result<Project> {
    let root = root.as_ref();
    let mut entries = Vec::new();
    collect_files(root, root, &mut entries)?;
    entries.sort();

    let mut project = Project::new();
    let mut first_markup: Option<String> = None;

    for (index, relative) in entries.iter().enumerate() {
        let full = root.join(relative);
        let kind = ArtifactKind::from_path(relative);

        // SVG files are images here, never the page to preview
        if is_image_path(relative) {
            let bytes = fs::read(&full)?;
            project.add_asset(relative.clone(), data_uri(relative, &bytes));
        } else if kind != ArtifactKind::Other {
            let content = fs::read_to_string(&full)?;
            let id = format!("file-{}", index);
            if kind == ArtifactKind::Markup && first_markup.is_none() {
                first_markup = Some(id.clone());
            }
            project.add_artifact(SourceArtifact::new(id, relative.clone(), content, kind));
        } else {
            log::debug!("Skipping unsupported file {}", relative);
        }
    }

    project.set_active(first_markup.as_deref());
    log::info!(
        "Loaded {} artifacts and {} assets from {}",
        project.len(),
        project.assets().len(),
        root.display()
    );
    Ok(project)
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(root, &path, out)?;
        } else if let Ok(relative) = path.strip_prefix(root) {
            let relative: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            out.push(relative.join("/"));
        }
    }
    Ok(())
}
