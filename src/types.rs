//! Core types for mirrorcast
//!
//! These types represent the fundamental data structures shared between the
//! capture session, the encoder callback path, and the frame relay.

use bytes::Bytes;

/// Lifecycle state of a [`CaptureSession`](crate::session::CaptureSession)
///
/// Transitions are driven only by the session's public operations, never
/// implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Session created but not configured
    Uninitialized,
    /// Configured with platform, sink, and parameters
    Initialized,
    /// Encoder and virtual display active, frames flowing
    Started,
    /// Teardown in progress
    ShuttingDown,
    /// Torn down; requires a fresh configure to be reused
    Stopped,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "Uninitialized"),
            SessionState::Initialized => write!(f, "Initialized"),
            SessionState::Started => write!(f, "Started"),
            SessionState::ShuttingDown => write!(f, "ShuttingDown"),
            SessionState::Stopped => write!(f, "Stopped"),
        }
    }
}

/// Opaque handle identifying a live virtual display
///
/// Exported so a caller can attach renderable content to the display while
/// the session is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayHandle(u64);

impl DisplayHandle {
    /// Create a handle from the platform's raw display id
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw handle value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Display({})", self.0)
    }
}

/// One encoded video frame, copied out of an encoder-owned buffer
///
/// Owned by exactly one holder at a time: it moves into the relay slot on
/// push and out of it on drain.
#[derive(Debug, Clone)]
pub struct EncodedFrame {
    /// Encoded payload; exactly the valid byte range of the source buffer
    pub payload: Bytes,
    /// Presentation timestamp in microseconds
    pub pts_micros: i64,
}

impl EncodedFrame {
    /// Create a frame from an owned payload
    pub fn new(payload: Bytes, pts_micros: i64) -> Self {
        Self {
            payload,
            pts_micros,
        }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
