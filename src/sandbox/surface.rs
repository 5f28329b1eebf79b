//! Execution surfaces

use super::{ExecutionContext, SandboxPolicy};
use crate::synth::markers::escape_attr;
use crate::utils::SandboxError;
use std::fs;
use std::path::{Path, PathBuf};

/// In-memory surface that records every document it receives
#[derive(Debug, Clone)]
pub struct MemorySurface {
    ready: bool,
    released: bool,
    sandbox: Option<String>,
    documents: Vec<String>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self {
            ready: true,
            released: false,
            sandbox: None,
            documents: Vec::new(),
        }
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Every document written so far, oldest first
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// The document currently running
    pub fn current(&self) -> Option<&str> {
        self.documents.last().map(String::as_str)
    }

    pub fn sandbox_attribute(&self) -> Option<&str> {
        self.sandbox.as_deref()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext for MemorySurface {
    fn is_ready(&self) -> bool {
        self.ready && !self.released
    }

    fn configure(&mut self, policy: &SandboxPolicy) -> Result<(), SandboxError> {
        self.sandbox = Some(policy.sandbox_attribute());
        Ok(())
    }

    fn replace_document(&mut self, html: &str) -> Result<(), SandboxError> {
        if !self.is_ready() {
            return Err(SandboxError::NotReady);
        }
        self.documents.push(html.to_string());
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

/// Writes a standalone host page embedding the document in a sandboxed
/// iframe
#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
    sandbox: String,
    released: bool,
}

impl FileSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sandbox: String::new(),
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The host page wrapping `html`
    pub fn host_page(&self, html: &str) -> String {
        format!(
            concat!(
                "<!DOCTYPE html>\n",
                "<html><head><meta charset=\"utf-8\"><title>livepane preview</title>",
                "<style>html,body,iframe{{margin:0;border:0;width:100%;height:100%;display:block}}</style>",
                "</head><body><iframe sandbox=\"{}\" srcdoc=\"{}\"></iframe></body></html>\n"
            ),
            escape_attr(&self.sandbox),
            escape_attr(html)
        )
    }
}

impl ExecutionContext for FileSurface {
    fn is_ready(&self) -> bool {
        !self.released
    }

    fn configure(&mut self, policy: &SandboxPolicy) -> Result<(), SandboxError> {
        self.sandbox = policy.sandbox_attribute();
        Ok(())
    }

    fn replace_document(&mut self, html: &str) -> Result<(), SandboxError> {
        fs::write(&self.path, self.host_page(html))
            .map_err(|e| SandboxError::Surface(format!("{}: {}", self.path.display(), e)))
    }

    fn release(&mut self) {
        self.released = true;
    }
}
