//! Capture options and configuration.

use super::region::Region;
use image::Rgb;

/// Viewports narrower than this (logical px) use the conservative scale.
pub const NARROW_VIEWPORT_PX: u32 = 640;

/// Capture scale on narrow viewports; keeps raster memory bounded.
pub const NARROW_VIEWPORT_SCALE: f32 = 1.25;

/// Upper bound for the automatically derived capture scale.
pub const MAX_AUTO_SCALE: f32 = 2.0;

/// Pixel ratio assumed when the display reports none.
pub const FALLBACK_PIXEL_RATIO: f32 = 1.5;

/// How the capture scale is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScaleMode {
    /// Derive the scale from the display: the device pixel ratio capped at
    /// [`MAX_AUTO_SCALE`], or [`NARROW_VIEWPORT_SCALE`] on narrow viewports.
    #[default]
    Auto,
    /// Use the given multiplier as-is.
    Fixed(f32),
}

/// Options for rasterizing a region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    /// Fill composited behind transparent pixels. The output format has no
    /// alpha channel, so captures are always flattened onto this color.
    pub background: Rgb<u8>,

    /// Capture scale selection
    pub scale: ScaleMode,
}

impl CaptureOptions {
    /// Create capture options with defaults (opaque white, auto scale).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the background fill color.
    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.background = background;
        self
    }

    /// Use a fixed capture scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = ScaleMode::Fixed(scale);
        self
    }

    /// Derive the capture scale from the display.
    pub fn auto_scale(mut self) -> Self {
        self.scale = ScaleMode::Auto;
        self
    }

    /// Resolve the effective capture scale for a region.
    pub fn resolve_scale<R: Region + ?Sized>(&self, region: &R) -> f32 {
        match self.scale {
            ScaleMode::Fixed(scale) => scale,
            ScaleMode::Auto => {
                if region.viewport_width() < NARROW_VIEWPORT_PX {
                    NARROW_VIEWPORT_SCALE
                } else {
                    let ratio = region.device_pixel_ratio();
                    let ratio = if ratio > 0.0 {
                        ratio
                    } else {
                        FALLBACK_PIXEL_RATIO
                    };
                    ratio.min(MAX_AUTO_SCALE)
                }
            }
        }
    }
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            background: Rgb([255, 255, 255]),
            scale: ScaleMode::Auto,
        }
    }
}

/// A fully resolved snapshot request handed to [`Region::rasterize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureRequest {
    /// Multiplier applied to the region's pixel dimensions
    pub scale: f32,

    /// Background fill for transparent pixels
    pub background: Rgb<u8>,

    /// The host's vertical scroll offset, negated, so the snapshot starts
    /// at the top of the region regardless of the caller's scroll position.
    pub scroll_y: f32,
}
