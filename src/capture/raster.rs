//! Raster snapshot of a captured region.

use crate::error::{Error, Result};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgb, RgbaImage};

/// An in-memory pixel buffer produced by rasterizing a region.
///
/// Dimensions are in device pixels; `scale_factor` records the multiplier
/// used at capture time. A raster is immutable once produced and owned
/// exclusively by the export operation for its duration.
#[derive(Debug, Clone)]
pub struct RasterImage {
    buffer: RgbaImage,
    scale_factor: f32,
}

impl RasterImage {
    /// Wrap a captured RGBA buffer.
    pub fn new(buffer: RgbaImage, scale_factor: f32) -> Self {
        Self {
            buffer,
            scale_factor,
        }
    }

    /// Width in device pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Height in device pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get raster dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (u32, u32) {
        self.buffer.dimensions()
    }

    /// The multiplier used at capture time.
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    /// Check if the raster has no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Borrow the underlying RGBA buffer.
    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    /// Alpha-composite the raster onto an opaque background color.
    ///
    /// The result is fully opaque; transparent pixels take on the
    /// background. Needed because the PDF output has no alpha channel.
    pub fn composited_onto(&self, background: Rgb<u8>) -> RasterImage {
        let mut buffer = self.buffer.clone();
        for pixel in buffer.pixels_mut() {
            let alpha = pixel[3] as u16;
            if alpha < 255 {
                for channel in 0..3 {
                    let src = pixel[channel] as u16;
                    let bg = background[channel] as u16;
                    pixel[channel] = ((src * alpha + bg * (255 - alpha) + 127) / 255) as u8;
                }
            }
            pixel[3] = 255;
        }
        RasterImage {
            buffer,
            scale_factor: self.scale_factor,
        }
    }

    /// Packed RGB8 rows, top to bottom, with the alpha channel dropped.
    ///
    /// Callers composite onto a background first; otherwise transparency is
    /// simply discarded.
    pub fn to_rgb8(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.width() as usize * self.height() as usize * 3);
        for pixel in self.buffer.pixels() {
            rgb.extend_from_slice(&[pixel[0], pixel[1], pixel[2]]);
        }
        rgb
    }

    /// Encode the raster as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut encoded = Vec::new();
        PngEncoder::new(&mut encoded)
            .write_image(
                self.buffer.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| Error::CaptureFailed(format!("PNG encoding: {e}")))?;
        Ok(encoded)
    }
}
