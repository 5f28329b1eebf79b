//! Binary assets addressed by path

use super::basename;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use std::collections::BTreeMap;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "ico"];

/// A binary resource represented as a data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub path: String,
    pub data_uri: String,
}

/// Assets keyed by their original path
#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    by_path: BTreeMap<String, AssetRecord>,
    /// basename -> path of the first asset registered under that basename
    by_name: BTreeMap<String, String>,
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace an asset
    pub fn insert(&mut self, path: impl Into<String>, data_uri: impl Into<String>) {
        let path = path.into();
        self.by_name
            .entry(basename(&path).to_string())
            .or_insert_with(|| path.clone());
        self.by_path.insert(
            path.clone(),
            AssetRecord {
                path,
                data_uri: data_uri.into(),
            },
        );
    }

    /// Resolve a reference as written in markup or CSS.
    ///
    /// Tries the literal reference, then its basename against stored
    /// paths, then its basename against the basenames of stored paths.
    pub fn lookup(&self, reference: &str) -> Option<&str> {
        if let Some(record) = self.by_path.get(reference) {
            return Some(&record.data_uri);
        }

        let name = basename(reference);
        if let Some(record) = self.by_path.get(name) {
            return Some(&record.data_uri);
        }

        self.by_name
            .get(name)
            .and_then(|path| self.by_path.get(path))
            .map(|record| record.data_uri.as_str())
    }

    pub fn get(&self, path: &str) -> Option<&AssetRecord> {
        self.by_path.get(path)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetRecord> {
        self.by_path.values()
    }
}

fn extension(path: &str) -> String {
    path.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Check if a path names an image the preview can inline
pub fn is_image_path(path: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&extension(path).as_str())
}

/// MIME type for an image path (PNG when unknown)
pub fn mime_for_path(path: &str) -> &'static str {
    match extension(path).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        _ => "image/png",
    }
}

/// Encode bytes as a base64 data URI
pub fn data_uri(path: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_for_path(path), STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_exact_path() {
        let mut store = AssetStore::new();
        store.insert("images/logo.png", "data:image/png;base64,AAA");
        assert_eq!(store.lookup("images/logo.png"), Some("data:image/png;base64,AAA"));
    }

    #[test]
    fn test_lookup_by_key_basename() {
        let mut store = AssetStore::new();
        store.insert("images/logo.png", "data:image/png;base64,AAA");

        assert_eq!(store.lookup("logo.png"), Some("data:image/png;base64,AAA"));
        assert_eq!(store.lookup("../img/logo.png"), Some("data:image/png;base64,AAA"));
    }

    #[test]
    fn test_lookup_by_reference_basename() {
        let mut store = AssetStore::new();
        store.insert("bg.jpg", "data:image/jpeg;base64,BBB");
        assert_eq!(store.lookup("assets/bg.jpg"), Some("data:image/jpeg;base64,BBB"));
    }

    #[test]
    fn test_lookup_miss() {
        let mut store = AssetStore::new();
        store.insert("images/logo.png", "data:image/png;base64,AAA");
        assert_eq!(store.lookup("missing.png"), None);
    }

    #[test]
    fn test_first_basename_wins() {
        let mut store = AssetStore::new();
        store.insert("a/icon.png", "data:first");
        store.insert("b/icon.png", "data:second");

        assert_eq!(store.lookup("icon.png"), Some("data:first"));
        assert_eq!(store.lookup("b/icon.png"), Some("data:second"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_image_detection() {
        assert!(is_image_path("photo.JPG"));
        assert!(is_image_path("dir/icon.ico"));
        assert!(!is_image_path("style.css"));
        assert!(!is_image_path("Makefile"));
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_for_path("a.svg"), "image/svg+xml");
        assert_eq!(mime_for_path("a.jpeg"), "image/jpeg");
        assert_eq!(mime_for_path("a.unknown"), "image/png");
    }

    #[test]
    fn test_data_uri() {
        assert_eq!(data_uri("x.gif", b"hi"), "data:image/gif;base64,aGk=");
    }
}
