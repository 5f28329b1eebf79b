//! Error types for livepane

use thiserror::Error;

/// Main error type for livepane operations
#[derive(Debug, Error)]
pub enum LivepaneError {
    /// Sandbox host errors
    #[error("sandbox error: {0}")]
    Sandbox(#[from] SandboxError),
    /// Diagnostics bridge errors
    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),
    /// Invalid configuration
    #[error("config error: {0}")]
    Config(String),
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sandbox-specific errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SandboxError {
    /// The execution context cannot accept a document yet
    #[error("execution context not ready")]
    NotReady,
    /// The host is not mounted (never mounted, or already released)
    #[error("sandbox host is not mounted")]
    Unmounted,
    /// The policy would grant a capability the sandbox must never have
    #[error("sandbox policy violation: {0}")]
    PolicyViolation(String),
    /// Writing into the surface failed
    #[error("surface write failed: {0}")]
    Surface(String),
}

/// Reasons a cross-context message is not turned into a diagnostic event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Payload does not match the diagnostic message shape
    #[error("malformed message: {0}")]
    Malformed(String),
    /// Sender origin is not the trusted one
    #[error("untrusted origin: {0}")]
    UntrustedOrigin(String),
    /// Message tagged for another channel
    #[error("unknown channel: {0}")]
    UnknownChannel(String),
    /// Message emitted by a document that has since been replaced
    #[error("stale generation {received} (current {current})")]
    StaleGeneration { received: u64, current: u64 },
    /// No guest document is installed
    #[error("bridge not installed")]
    NotInstalled,
    /// Known non-actionable noise
    #[error("filtered as noise")]
    Noise,
    /// Same uncaught error already reported for this document
    #[error("duplicate error: {0}")]
    Duplicate(String),
}

/// Convenience Result type for livepane operations
pub type Result<T> = std::result::Result<T, LivepaneError>;
