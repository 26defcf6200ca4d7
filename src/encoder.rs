//! Hardware encoder capability and output-callback routing
//!
//! The encoder is an opaque capability: it accepts a drawable input surface
//! and asynchronously produces compressed frames on its own execution
//! context. [`OutputRouter`] is this crate's completion callback: it copies
//! each ready buffer's valid range into an owned [`EncodedFrame`] and hands
//! it to the relay, without ever blocking on sink I/O.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tracing::{trace, warn};

use crate::display::InputSurface;
use crate::error::{MirrorError, Result};
use crate::params::StreamingParameters;
use crate::relay::FrameRelay;
use crate::types::EncodedFrame;

/// Asynchronous completion callback registered with the encoder
///
/// Invoked by the encoder's own execution context whenever a compressed
/// frame is ready; any thread may call it at any time, concurrently with the
/// caller's thread and with shutdown.
pub trait EncoderOutput: Send + Sync {
    /// A compressed frame is ready
    ///
    /// `data[offset..offset + len]` is the valid byte range of an
    /// encoder-owned buffer, reclaimed as soon as this call returns; the
    /// implementation must copy anything it keeps.
    fn on_frame(&self, data: &[u8], offset: usize, len: usize, pts_micros: i64);

    /// The encoder signaled a codec error
    ///
    /// Recoverable: the current frame is degraded or lost, future
    /// invocations keep arriving.
    fn on_error(&self, error: MirrorError);
}

/// Hardware/software video encoder capability
///
/// Configured once from an immutable [`StreamingParameters`] snapshot;
/// changing parameters requires releasing the encoder and starting over.
pub trait HardwareEncoder: Send {
    /// Build the encoder job description and register the output callback
    ///
    /// Returns the writable input surface a producer renders into. The job
    /// description is derived entirely from `params`: surface-backed pixel
    /// format, bitrate, frame rate, keyframe interval.
    fn configure(
        &mut self,
        params: &StreamingParameters,
        output: Arc<dyn EncoderOutput>,
    ) -> Result<Box<dyn InputSurface>>;

    /// Start producing frames
    fn start(&mut self) -> Result<()>;

    /// Stop producing frames
    fn stop(&mut self) -> Result<()>;

    /// Release the encoder instance back to the platform
    fn release(&mut self) -> Result<()>;
}

/// Routes encoder completions into the frame relay
///
/// Lives for the duration of one started session; the encoder holds it as an
/// `Arc` and may keep invoking it concurrently with shutdown (pushes after
/// the relay halts are ignored there).
pub struct OutputRouter {
    relay: FrameRelay,
    /// Codec errors reported via the callback
    faults: AtomicU64,
}

impl OutputRouter {
    /// Create a router feeding the given relay
    pub fn new(relay: FrameRelay) -> Self {
        Self {
            relay,
            faults: AtomicU64::new(0),
        }
    }

    /// Number of codec faults reported so far
    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}

impl EncoderOutput for OutputRouter {
    fn on_frame(&self, data: &[u8], offset: usize, len: usize, pts_micros: i64) {
        // Zero-length completions carry no payload (format-change markers);
        // they must not reach the sink.
        if len == 0 {
            trace!("skipping zero-length encoder completion");
            return;
        }

        let Some(valid) = offset
            .checked_add(len)
            .and_then(|end| data.get(offset..end))
        else {
            self.faults.fetch_add(1, Ordering::Relaxed);
            warn!(
                offset,
                len,
                buffer_len = data.len(),
                "encoder reported out-of-range buffer, frame dropped"
            );
            return;
        };

        // Mandatory copy: the source buffer is encoder-owned and reclaimed
        // the moment this callback returns.
        let frame = EncodedFrame::new(Bytes::copy_from_slice(valid), pts_micros);
        trace!(pts_micros, size = frame.len(), "encoded frame ready");
        self.relay.push(frame);
    }

    fn on_error(&self, error: MirrorError) {
        let faults = self.faults.fetch_add(1, Ordering::Relaxed) + 1;
        warn!("encoder fault (total {}): {}", faults, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_length_completion_not_pushed() {
        let relay = FrameRelay::new();
        let router = OutputRouter::new(relay.clone());

        router.on_frame(&[], 0, 0, 1000);
        assert_eq!(relay.stats().frames_pushed, 0);
    }

    #[test]
    fn test_valid_range_copied() {
        let relay = FrameRelay::new();
        let router = OutputRouter::new(relay.clone());

        router.on_frame(&[0xAA, 0x01, 0x02, 0x03, 0xBB], 1, 3, 42);
        assert_eq!(relay.stats().frames_pushed, 1);
        let frame = relay.take_pending().expect("frame in slot");
        assert_eq!(&frame.payload[..], &[0x01, 0x02, 0x03]);
        assert_eq!(frame.pts_micros, 42);
    }

    #[test]
    fn test_out_of_range_buffer_dropped() {
        let relay = FrameRelay::new();
        let router = OutputRouter::new(relay.clone());

        router.on_frame(&[0x01, 0x02], 1, 4, 0);
        assert_eq!(relay.stats().frames_pushed, 0);
        assert_eq!(router.faults(), 1);
    }

    #[test]
    fn test_on_error_counts_and_continues() {
        let relay = FrameRelay::new();
        let router = OutputRouter::new(relay.clone());

        router.on_error(MirrorError::encoding("codec hiccup"));
        router.on_frame(&[0x01], 0, 1, 7);

        assert_eq!(router.faults(), 1);
        assert_eq!(relay.stats().frames_pushed, 1);
    }
}
