//! # livepane - sandboxed live preview for HTML/CSS/JavaScript editors
//!
//! Turns a set of editable source files into one self-contained document,
//! runs it in an isolated surface, and carries the guest's console output
//! and uncaught errors back to the host.
//!
//! ## Architecture
//!
//! - **project**: source artifacts, assets and the file-management boundary
//! - **synth**: document synthesis (injection, normalization, asset inlining)
//! - **sandbox**: sandbox policy, execution contexts and the host driving them
//! - **bridge**: diagnostics capture script, message validation, event log
//! - **scheduler**: live/manual update timing with debouncing
//! - **engine**: the preview engine and its async driver
//! - **config**: JSON configuration
//! - **utils**: shared error types

pub mod bridge;
pub mod config;
pub mod engine;
pub mod project;
pub mod sandbox;
pub mod scheduler;
pub mod synth;
pub mod utils;

// Re-export main types for convenience
pub use config::PreviewConfig;
pub use engine::{drive, PreviewEngine, PreviewInput, UpdateOutcome};
pub use project::{ArtifactKind, ArtifactSource, Project, SourceArtifact};
pub use synth::Synthesizer;
pub use utils::error::{LivepaneError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "livepane";
