//! Error types for mirrorcast

use thiserror::Error;

use crate::types::SessionState;

/// Result type alias using MirrorError
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Main error type for mirrorcast operations
#[derive(Debug, Error)]
pub enum MirrorError {
    /// Bad or missing configuration input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation invoked outside its required session state
    #[error("Invalid state for {operation}: session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// Hardware encoder or virtual-display capability could not be acquired
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    /// Recoverable per-frame codec error reported via the encoder callback
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Sink write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<MirrorError>,
    },
}

impl MirrorError {
    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invalid-state error
    pub fn invalid_state(operation: &'static str, state: SessionState) -> Self {
        Self::InvalidState { operation, state }
    }

    /// Create a resource-unavailable error
    pub fn resource(msg: impl Into<String>) -> Self {
        Self::ResourceUnavailable(msg.into())
    }

    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Whether the fault is recovered locally (frame dropped, session keeps
    /// running) rather than surfaced to the caller
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Encoding(_) | Self::Io(_) => true,
            Self::WithContext { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}
