//! Mirrorcast Core Library
//!
//! Screen-mirroring video streaming session: capture the pixel content of an
//! off-screen virtual display, feed it through an asynchronous hardware
//! encoder, and deliver encoded frames to a downstream transport sink with
//! bounded latency until explicitly stopped.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌────────────────┐
//! │ Virtual Display │───▶│ Hardware Encoder │───▶│  Frame Relay   │───▶ FrameSink
//! │ (input surface) │    │ (async callback) │    │ (latest-wins)  │
//! └─────────────────┘    └──────────────────┘    └────────────────┘
//! ```
//!
//! Three independently clocked actors meet here: the rendering producer
//! drawing into the encoder's input surface, the encoder emitting compressed
//! frames from its own execution context, and the relay's writer thread
//! draining them to the sink. [`CaptureSession`] owns the lifecycle and the
//! scarce platform resources; [`FrameRelay`] bounds memory with a
//! single-slot, latest-wins handoff, trading frame completeness for
//! liveness.

pub mod display;
pub mod encoder;
pub mod error;
pub mod params;
pub mod relay;
pub mod session;
pub mod sink;
pub mod types;

pub use display::{InputSurface, PlatformContext, VirtualDisplay};
pub use encoder::{EncoderOutput, HardwareEncoder, OutputRouter};
pub use error::{MirrorError, Result};
pub use params::{PixelFormat, StreamingParameters};
pub use relay::{FrameRelay, RelayStats};
pub use session::{CaptureSession, SessionStats};
pub use sink::FrameSink;
pub use types::{DisplayHandle, EncodedFrame, SessionState};
