//! Platform capability seam: virtual display, input surface, encoder factory
//!
//! The platform service renders arbitrary on-screen content into an
//! off-screen surface of a given resolution and density. Everything here is
//! a trait so the session can run against real hardware backends or the test
//! mocks interchangeably.

use crate::encoder::HardwareEncoder;
use crate::error::Result;
use crate::params::StreamingParameters;
use crate::types::DisplayHandle;

/// The drawable target an encoder exposes for a producer to render into
///
/// Raw pixels never pass through user space; the virtual display draws
/// straight into this surface. Released by the session strictly after the
/// virtual display that references it.
pub trait InputSurface: Send {
    /// Release the surface back to the platform
    fn release(&mut self) -> Result<()>;
}

/// An off-screen rendering target bound to an encoder's input surface
pub trait VirtualDisplay: Send {
    /// Handle callers use to attach renderable content to this display
    fn handle(&self) -> DisplayHandle;

    /// Release the display
    ///
    /// The display may reference the encoder's input surface; the session
    /// always releases the display before the surface.
    fn release(&mut self) -> Result<()>;
}

/// Platform services the session acquires scarce resources from
pub trait PlatformContext: Send {
    /// Whether the platform supports virtual-display capture at all
    ///
    /// Checked at configure time; a platform without the capability fails
    /// configure before any resource is acquired.
    fn virtual_display_supported(&self) -> bool;

    /// Acquire a hardware encoder instance
    fn create_encoder(&self) -> Result<Box<dyn HardwareEncoder>>;

    /// Create a virtual display bound to the given input surface
    ///
    /// The display is created at the parameters' resolution and density,
    /// flagged so its content is rendered even without a physical
    /// presentation attached.
    fn create_virtual_display(
        &self,
        name: &str,
        params: &StreamingParameters,
        surface: &dyn InputSurface,
    ) -> Result<Box<dyn VirtualDisplay>>;
}
