//! Sandbox host
//!
//! Owns the isolated execution surface the preview runs in and replaces
//! its whole document on every update. Nothing from a previous document
//! survives a replacement.

mod host;
mod policy;
mod surface;

pub use host::{ApplyOutcome, HostState, SandboxHost};
pub use policy::{normalize_origin, SandboxPolicy};
pub use surface::{FileSurface, MemorySurface};

use crate::utils::SandboxError;

/// An isolated surface able to run one HTML document at a time
pub trait ExecutionContext {
    /// Whether the surface can accept a document right now
    fn is_ready(&self) -> bool;

    /// Apply the capability policy before the first document
    fn configure(&mut self, policy: &SandboxPolicy) -> Result<(), SandboxError>;

    /// Discard the current document and run `html` in a fresh one
    fn replace_document(&mut self, html: &str) -> Result<(), SandboxError>;

    /// Tear the surface down
    fn release(&mut self);
}
