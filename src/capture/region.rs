//! Region abstraction layer.
//!
//! Provides a trait-based interface for the rendered surface being
//! exported, isolating the concrete rendering host from the pipeline
//! logic. The pipeline never learns how a region was constructed; it only
//! requires that the region is attached and visible when capture starts.

use super::options::CaptureRequest;
use super::raster::RasterImage;
use crate::error::{Error, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use std::ops::{Deref, DerefMut};

/// Abstract interface to a rendered visual subtree.
///
/// Implementations provide the display facts the scale heuristic needs,
/// the capture-style override hooks, and rasterization — without exposing
/// any concrete rendering host types.
pub trait Region {
    /// Whether the region is currently attached to a live visual tree.
    fn is_attached(&self) -> bool;

    /// Logical width of the hosting viewport, in CSS-style pixels.
    fn viewport_width(&self) -> u32;

    /// Physical-to-logical pixel ratio of the hosting display.
    fn device_pixel_ratio(&self) -> f32;

    /// Current vertical scroll offset of the hosting surface.
    fn scroll_offset(&self) -> f32;

    /// Apply the clean-capture style override.
    ///
    /// Suppresses presentation effects that would pollute the snapshot —
    /// blur filters, paywall overlays and similar decoration. Always paired
    /// with [`clear_capture_style`](Self::clear_capture_style); the
    /// pipeline drives the pair through [`CaptureStyleGuard`].
    fn apply_capture_style(&mut self);

    /// Remove the clean-capture style override.
    fn clear_capture_style(&mut self);

    /// Let pending style changes take effect before the snapshot is taken.
    fn settle(&mut self) {}

    /// Rasterize the region into a pixel buffer.
    ///
    /// The returned raster is already composited onto the request's
    /// background color. Fails with [`Error::CaptureFailed`] when the
    /// region is detached or the rendering host cannot produce a snapshot.
    fn rasterize(&mut self, request: &CaptureRequest) -> Result<RasterImage>;
}

/// Scoped capture-style override.
///
/// Applies the override on construction and removes it on drop, so the
/// region's presentation state is restored on success, error and unwind
/// paths alike. Dereferences to the underlying region.
pub struct CaptureStyleGuard<'a, R: Region + ?Sized> {
    region: &'a mut R,
}

impl<'a, R: Region + ?Sized> CaptureStyleGuard<'a, R> {
    /// Apply the capture style override to `region` for the guard's lifetime.
    pub fn new(region: &'a mut R) -> Self {
        region.apply_capture_style();
        Self { region }
    }
}

impl<R: Region + ?Sized> Deref for CaptureStyleGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.region
    }
}

impl<R: Region + ?Sized> DerefMut for CaptureStyleGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.region
    }
}

impl<R: Region + ?Sized> Drop for CaptureStyleGuard<'_, R> {
    fn drop(&mut self) {
        self.region.clear_capture_style();
    }
}

/// A [`Region`] backed by an in-memory RGBA frame buffer.
///
/// For hosts that already own a rendered framebuffer, and for tests. The
/// buffer holds the region's full content, so the scroll offset has no
/// effect on what is captured.
#[derive(Debug, Clone)]
pub struct BufferRegion {
    frame: RgbaImage,
    viewport_width: u32,
    device_pixel_ratio: f32,
    scroll_offset: f32,
    attached: bool,
    capture_style: bool,
}

impl BufferRegion {
    /// Wrap a rendered frame. The viewport defaults to the frame width and
    /// the pixel ratio to 1.0.
    pub fn new(frame: RgbaImage) -> Self {
        let viewport_width = frame.width();
        Self {
            frame,
            viewport_width,
            device_pixel_ratio: 1.0,
            scroll_offset: 0.0,
            attached: true,
            capture_style: false,
        }
    }

    /// Set the logical viewport width.
    pub fn with_viewport_width(mut self, width: u32) -> Self {
        self.viewport_width = width;
        self
    }

    /// Set the display pixel ratio.
    pub fn with_device_pixel_ratio(mut self, ratio: f32) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }

    /// Set the host's current vertical scroll offset.
    pub fn with_scroll_offset(mut self, offset: f32) -> Self {
        self.scroll_offset = offset;
        self
    }

    /// Mark the region as detached from its visual tree.
    pub fn detached(mut self) -> Self {
        self.attached = false;
        self
    }

    /// Whether the capture style override is currently applied.
    pub fn capture_style_active(&self) -> bool {
        self.capture_style
    }
}

impl Region for BufferRegion {
    fn is_attached(&self) -> bool {
        self.attached
    }

    fn viewport_width(&self) -> u32 {
        self.viewport_width
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio
    }

    fn scroll_offset(&self) -> f32 {
        self.scroll_offset
    }

    fn apply_capture_style(&mut self) {
        self.capture_style = true;
    }

    fn clear_capture_style(&mut self) {
        self.capture_style = false;
    }

    fn rasterize(&mut self, request: &CaptureRequest) -> Result<RasterImage> {
        if !self.attached {
            return Err(Error::CaptureFailed("region is not attached".into()));
        }
        if !(request.scale.is_finite() && request.scale > 0.0) {
            return Err(Error::CaptureFailed(format!(
                "invalid capture scale {}",
                request.scale
            )));
        }

        let scaled = if (request.scale - 1.0).abs() < f32::EPSILON {
            self.frame.clone()
        } else {
            let width = ((self.frame.width() as f32 * request.scale).round() as u32).max(1);
            let height = ((self.frame.height() as f32 * request.scale).round() as u32).max(1);
            imageops::resize(&self.frame, width, height, FilterType::Triangle)
        };

        Ok(RasterImage::new(scaled, request.scale).composited_onto(request.background))
    }
}
