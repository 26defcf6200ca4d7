//! Streaming parameter configuration
//!
//! [`StreamingParameters`] is the immutable snapshot used to configure one
//! encoder instance. Replacing it requires restarting the session.

use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};

/// Pixel format of the encoder input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Surface-backed format: the producer renders directly into the
    /// encoder's input surface, no user-space pixel copy
    #[default]
    Surface,
    /// Planar YUV 4:2:0 with interleaved chroma
    Nv12,
    /// Planar YUV 4:2:0
    Yuv420,
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelFormat::Surface => write!(f, "surface"),
            PixelFormat::Nv12 => write!(f, "nv12"),
            PixelFormat::Yuv420 => write!(f, "yuv420"),
        }
    }
}

/// Encoder configuration snapshot
///
/// Defaults match the conservative baseline a head-unit link negotiates from:
/// 800x480 @ 30fps, 512 kbit/s, a keyframe every 5 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamingParameters {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Display density (dpi) of the virtual display
    pub density: u32,
    /// Target frame rate in frames per second
    pub frame_rate: u32,
    /// Target bitrate in bits per second
    pub bitrate: u32,
    /// Seconds between keyframes
    pub keyframe_interval_secs: u32,
    /// Encoder input pixel format
    pub pixel_format: PixelFormat,
}

impl Default for StreamingParameters {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            density: 240,
            frame_rate: 30,
            bitrate: 512_000,
            keyframe_interval_secs: 5,
            pixel_format: PixelFormat::Surface,
        }
    }
}

impl StreamingParameters {
    /// Create parameters with the given resolution and defaults elsewhere
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Set the resolution
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the display density
    pub fn with_density(mut self, density: u32) -> Self {
        self.density = density;
        self
    }

    /// Set the frame rate
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Set the bitrate in bits per second
    pub fn with_bitrate(mut self, bitrate: u32) -> Self {
        self.bitrate = bitrate;
        self
    }

    /// Set the keyframe interval in seconds
    pub fn with_keyframe_interval(mut self, secs: u32) -> Self {
        self.keyframe_interval_secs = secs;
        self
    }

    /// Set the pixel format
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.pixel_format = format;
        self
    }

    /// Validate the parameter set
    ///
    /// Returns `InvalidArgument` for any zero dimension or rate; a session
    /// refuses to configure or start with invalid parameters.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MirrorError::invalid_argument(format!(
                "resolution must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.density == 0 {
            return Err(MirrorError::invalid_argument("display density must be non-zero"));
        }
        if self.frame_rate == 0 {
            return Err(MirrorError::invalid_argument("frame rate must be non-zero"));
        }
        if self.bitrate == 0 {
            return Err(MirrorError::invalid_argument("bitrate must be non-zero"));
        }
        if self.keyframe_interval_secs == 0 {
            return Err(MirrorError::invalid_argument(
                "keyframe interval must be non-zero",
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for StreamingParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} @ {}fps, {}bps, keyframe every {}s, {} ({} dpi)",
            self.width,
            self.height,
            self.frame_rate,
            self.bitrate,
            self.keyframe_interval_secs,
            self.pixel_format,
            self.density
        )
    }
}
