//! Mock infrastructure for testing
//!
//! Fake platform capabilities (encoder, virtual display, input surface) and
//! sinks, with probes the tests use to observe resource lifecycles from the
//! outside.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use mirrorcast::{
    DisplayHandle, EncoderOutput, FrameSink, HardwareEncoder, InputSurface, MirrorError,
    PlatformContext, StreamingParameters, VirtualDisplay,
};

/// Observable state of a mock encoder, shared with the test
#[derive(Default)]
pub struct EncoderControl {
    output: Mutex<Option<Arc<dyn EncoderOutput>>>,
    pub configured: AtomicBool,
    pub started: AtomicBool,
    pub stopped: AtomicBool,
    pub released: AtomicBool,
}

impl EncoderControl {
    /// Invoke the registered output callback the way a codec thread would
    pub fn emit(&self, data: &[u8], offset: usize, len: usize, pts_micros: i64) {
        let output = self.output.lock().unwrap().clone();
        if let Some(output) = output {
            output.on_frame(data, offset, len, pts_micros);
        }
    }

    /// Report a codec error through the callback
    pub fn raise(&self, error: MirrorError) {
        let output = self.output.lock().unwrap().clone();
        if let Some(output) = output {
            output.on_error(error);
        }
    }
}

struct MockEncoder {
    control: Arc<EncoderControl>,
    fail_configure: bool,
    surface_released: Arc<AtomicBool>,
}

impl HardwareEncoder for MockEncoder {
    fn configure(
        &mut self,
        _params: &StreamingParameters,
        output: Arc<dyn EncoderOutput>,
    ) -> mirrorcast::Result<Box<dyn InputSurface>> {
        if self.fail_configure {
            return Err(MirrorError::resource("mock encoder refused configuration"));
        }
        *self.control.output.lock().unwrap() = Some(output);
        self.control.configured.store(true, Ordering::SeqCst);
        Ok(Box::new(MockSurface {
            released: self.surface_released.clone(),
        }))
    }

    fn start(&mut self) -> mirrorcast::Result<()> {
        self.control.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&mut self) -> mirrorcast::Result<()> {
        self.control.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release(&mut self) -> mirrorcast::Result<()> {
        self.control.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MockSurface {
    released: Arc<AtomicBool>,
}

impl InputSurface for MockSurface {
    fn release(&mut self) -> mirrorcast::Result<()> {
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MockDisplay {
    handle: DisplayHandle,
    released: Arc<AtomicBool>,
}

impl VirtualDisplay for MockDisplay {
    fn handle(&self) -> DisplayHandle {
        self.handle
    }

    fn release(&mut self) -> mirrorcast::Result<()> {
        self.released.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Handles the test keeps after the platform is boxed into the session
#[derive(Clone)]
pub struct PlatformProbe {
    pub encoder: Arc<EncoderControl>,
    pub surface_released: Arc<AtomicBool>,
    pub display_released: Arc<AtomicBool>,
}

/// Mock platform capability
pub struct MockPlatform {
    pub supported: bool,
    pub fail_encoder: bool,
    pub fail_encoder_configure: bool,
    pub fail_display: bool,
    probe: PlatformProbe,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            supported: true,
            fail_encoder: false,
            fail_encoder_configure: false,
            fail_display: false,
            probe: PlatformProbe {
                encoder: Arc::new(EncoderControl::default()),
                surface_released: Arc::new(AtomicBool::new(false)),
                display_released: Arc::new(AtomicBool::new(false)),
            },
        }
    }

    /// Observation handles that outlive the boxed platform
    pub fn probe(&self) -> PlatformProbe {
        self.probe.clone()
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformContext for MockPlatform {
    fn virtual_display_supported(&self) -> bool {
        self.supported
    }

    fn create_encoder(&self) -> mirrorcast::Result<Box<dyn HardwareEncoder>> {
        if self.fail_encoder {
            return Err(MirrorError::resource("mock encoder unavailable"));
        }
        Ok(Box::new(MockEncoder {
            control: self.probe.encoder.clone(),
            fail_configure: self.fail_encoder_configure,
            surface_released: self.probe.surface_released.clone(),
        }))
    }

    fn create_virtual_display(
        &self,
        _name: &str,
        _params: &StreamingParameters,
        _surface: &dyn InputSurface,
    ) -> mirrorcast::Result<Box<dyn VirtualDisplay>> {
        if self.fail_display {
            return Err(MirrorError::resource("mock virtual display unavailable"));
        }
        Ok(Box::new(MockDisplay {
            handle: DisplayHandle::new(7),
            released: self.probe.display_released.clone(),
        }))
    }
}

/// Sink that records every delivered frame
#[derive(Default)]
pub struct RecordingSink {
    written: Mutex<Vec<(Vec<u8>, i64)>>,
    fail: AtomicBool,
    pub closed: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make subsequent writes fail with an I/O error
    pub fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    pub fn frames(&self) -> Vec<(Vec<u8>, i64)> {
        self.written.lock().unwrap().clone()
    }

    pub fn frame_count(&self) -> usize {
        self.written.lock().unwrap().len()
    }
}

impl FrameSink for RecordingSink {
    fn write(&self, data: &[u8], offset: usize, len: usize, pts_micros: i64) -> io::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock sink down"));
        }
        self.written
            .lock()
            .unwrap()
            .push((data[offset..offset + len].to_vec(), pts_micros));
        Ok(())
    }

    fn close(&self) -> io::Result<()> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Poll `condition` until it holds or the timeout expires
pub fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_records_valid_range() {
        let sink = RecordingSink::new();
        sink.write(&[9, 1, 2, 3, 9], 1, 3, 55).unwrap();
        assert_eq!(sink.frames(), vec![(vec![1, 2, 3], 55)]);
    }

    #[test]
    fn test_failing_sink_reports_io_error() {
        let sink = RecordingSink::new();
        sink.set_failing(true);
        assert!(sink.write(&[1], 0, 1, 0).is_err());
        assert_eq!(sink.frame_count(), 0);
    }

    #[test]
    fn test_encoder_control_emit_without_callback_is_noop() {
        let control = EncoderControl::default();
        control.emit(&[1, 2, 3], 0, 3, 0);
    }
}
