//! Capture session lifecycle
//!
//! [`CaptureSession`] owns the scarce hardware resources of one mirroring
//! session: the encoder instance, the virtual display bound to its input
//! surface, and the relay that carries encoded frames to the sink. It is the
//! state machine configure -> start -> shutdown; a session that has been
//! shut down needs a fresh configure before it can start again.
//!
//! All operations take `&self` and serialize on one session-wide lock, so a
//! shutdown racing a start can never observe partially constructed handles.
//! The relay's slot lock is separate; the encoder callback never contends
//! with lifecycle operations.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::display::{InputSurface, PlatformContext, VirtualDisplay};
use crate::encoder::{HardwareEncoder, OutputRouter};
use crate::error::{MirrorError, Result, ResultExt};
use crate::params::StreamingParameters;
use crate::relay::{FrameRelay, RelayStats};
use crate::sink::FrameSink;
use crate::types::{DisplayHandle, SessionState};

/// Name the virtual display is registered under
const DISPLAY_NAME: &str = "mirrorcast";

/// Session statistics snapshot
#[derive(Debug, Clone, Copy)]
pub struct SessionStats {
    /// Current lifecycle state
    pub state: SessionState,
    /// Relay throughput counters
    pub relay: RelayStats,
    /// Codec faults reported via the encoder callback
    pub encoder_faults: u64,
}

struct SessionInner {
    state: SessionState,
    params: Option<StreamingParameters>,
    platform: Option<Box<dyn PlatformContext>>,
    relay: Option<FrameRelay>,
    router: Option<Arc<OutputRouter>>,
    encoder: Option<Box<dyn HardwareEncoder>>,
    display: Option<Box<dyn VirtualDisplay>>,
    surface: Option<Box<dyn InputSurface>>,
}

/// Screen-mirroring capture session
///
/// One session is live per process at a time; running several concurrently
/// is outside the supported contract.
pub struct CaptureSession {
    inner: Mutex<SessionInner>,
}

impl CaptureSession {
    /// Create an unconfigured session
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(SessionInner {
                state: SessionState::Uninitialized,
                params: None,
                platform: None,
                relay: None,
                router: None,
                encoder: None,
                display: None,
                surface: None,
            }),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Statistics snapshot
    pub fn stats(&self) -> SessionStats {
        let inner = self.inner.lock();
        SessionStats {
            state: inner.state,
            relay: inner
                .relay
                .as_ref()
                .map(|r| r.stats())
                .unwrap_or_default(),
            encoder_faults: inner.router.as_ref().map(|r| r.faults()).unwrap_or(0),
        }
    }

    /// Configure the session with platform services, a sink, and parameters
    ///
    /// Allowed from `Uninitialized` or `Stopped` (a stopped session needs a
    /// fresh configure to be reused); configuring twice without a shutdown
    /// in between fails with `InvalidState`. Fails with `InvalidArgument` if
    /// the parameters are invalid or the platform lacks the virtual-display
    /// capability. On success the relay writer is running and the session is
    /// `Initialized`.
    pub fn configure(
        &self,
        platform: Box<dyn PlatformContext>,
        sink: Arc<dyn FrameSink>,
        params: StreamingParameters,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.state {
            SessionState::Uninitialized | SessionState::Stopped => {}
            state => return Err(MirrorError::invalid_state("configure", state)),
        }

        params.validate()?;
        if !platform.virtual_display_supported() {
            return Err(MirrorError::invalid_argument(
                "virtual-display capture is not supported by this platform",
            ));
        }

        let relay = FrameRelay::new();
        relay.set_sink(sink);
        relay
            .start()
            .map_err(|e| MirrorError::resource(format!("failed to spawn relay writer: {}", e)))?;

        inner.platform = Some(platform);
        inner.params = Some(params);
        inner.relay = Some(relay);
        inner.state = SessionState::Initialized;
        info!("session configured: {}", params);
        Ok(())
    }

    /// Allocate the encoder and virtual display and begin streaming
    ///
    /// Fails with `InvalidState` unless the session is `Initialized` and
    /// with `ResourceUnavailable` if the encoder or display cannot be
    /// acquired. A failure after the encoder has been acquired releases it
    /// (and the input surface) before returning: no leaked encoder on a
    /// partial start.
    pub fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Initialized {
            return Err(MirrorError::invalid_state("start", inner.state));
        }

        let (Some(params), Some(platform), Some(relay)) =
            (inner.params, inner.platform.as_ref(), inner.relay.as_ref())
        else {
            return Err(MirrorError::invalid_state("start", inner.state));
        };
        params.validate()?;

        let mut encoder = platform
            .create_encoder()
            .context("acquiring hardware encoder")?;
        let router = Arc::new(OutputRouter::new(relay.clone()));

        let mut surface = match encoder.configure(&params, router.clone()) {
            Ok(surface) => surface,
            Err(e) => {
                release_encoder(&mut encoder, false);
                return Err(e.with_context("configuring hardware encoder"));
            }
        };

        let display =
            match platform.create_virtual_display(DISPLAY_NAME, &params, surface.as_ref()) {
                Ok(display) => display,
                Err(e) => {
                    // The encoder must not leak when display creation fails.
                    release_encoder(&mut encoder, false);
                    release_surface(&mut surface);
                    return Err(e.with_context("creating virtual display"));
                }
            };

        if let Err(e) = encoder.start() {
            let mut display = display;
            release_display(&mut display);
            release_encoder(&mut encoder, false);
            release_surface(&mut surface);
            return Err(e.with_context("starting hardware encoder"));
        }

        inner.router = Some(router);
        inner.encoder = Some(encoder);
        inner.display = Some(display);
        inner.surface = Some(surface);
        inner.state = SessionState::Started;
        info!("session started: {}", params);
        Ok(())
    }

    /// Tear the session down
    ///
    /// Always safe to call, from any state, any number of times; never
    /// returns an error. Internal release failures are logged and swallowed.
    /// Release order: relay writer and buffer state, then encoder, then
    /// virtual display, then input surface (the display may reference the
    /// surface, so the surface is always last). Leaves the session
    /// `Stopped`; a fresh configure is required to reuse it.
    pub fn shutdown(&self) {
        let mut inner = self.inner.lock();
        if inner.state == SessionState::Stopped {
            return;
        }
        inner.state = SessionState::ShuttingDown;
        info!("session shutting down");

        // Each step is guarded on its own so one failure cannot skip the
        // rest.
        if let Some(relay) = inner.relay.take() {
            relay.halt();
            relay.clear();
        }
        inner.router = None;

        if let Some(mut encoder) = inner.encoder.take() {
            release_encoder(&mut encoder, true);
        }

        if let Some(mut display) = inner.display.take() {
            release_display(&mut display);
        }

        if let Some(mut surface) = inner.surface.take() {
            release_surface(&mut surface);
        }

        inner.platform = None;
        inner.params = None;
        inner.state = SessionState::Stopped;
        info!("session stopped");
    }

    /// Handle of the live virtual display
    ///
    /// Valid only while the session is `Started`; safe to call concurrently
    /// with start and shutdown.
    pub fn display_handle(&self) -> Result<DisplayHandle> {
        let inner = self.inner.lock();
        match (&inner.display, inner.state) {
            (Some(display), SessionState::Started) => Ok(display.handle()),
            _ => Err(MirrorError::invalid_state("display_handle", inner.state)),
        }
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Stop (if started) and release an encoder, swallowing failures
fn release_encoder(encoder: &mut Box<dyn HardwareEncoder>, stop_first: bool) {
    if stop_first {
        if let Err(e) = encoder.stop() {
            warn!("encoder stop failed: {}", e);
        }
    }
    if let Err(e) = encoder.release() {
        warn!("encoder release failed: {}", e);
    }
}

fn release_display(display: &mut Box<dyn VirtualDisplay>) {
    if let Err(e) = display.release() {
        warn!("virtual display release failed: {}", e);
    }
}

fn release_surface(surface: &mut Box<dyn InputSurface>) {
    if let Err(e) = surface.release() {
        warn!("input surface release failed: {}", e);
    }
}
