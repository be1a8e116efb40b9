//! # pagesnap
//!
//! Rasterize a rendered region and paginate it into a multi-page PDF
//! report.
//!
//! The pipeline takes a handle to a rendered visual subtree (a [`Region`]),
//! captures it into a single raster snapshot, scales the snapshot to fit
//! the page width, and emits one PDF page per vertical band. Every page
//! carries the full image at a growing negative vertical offset — the page
//! clip exposes exactly one band, so no per-page cropping or re-capture is
//! needed.
//!
//! ## Quick Start
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use pagesnap::{BufferRegion, Exporter, ExportStatus};
//!
//! fn main() -> pagesnap::Result<()> {
//!     // A rendered frame, 1000x2400 device pixels.
//!     let frame = RgbaImage::from_pixel(1000, 2400, Rgba([255, 255, 255, 255]));
//!     let mut region = BufferRegion::new(frame);
//!
//!     let status = Exporter::new("Device 1").export(&mut region)?;
//!     if let ExportStatus::Completed(artifact) = status {
//!         // Two A4 pages: 297 mm + 207 mm bands.
//!         assert_eq!(artifact.page_count, 2);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Scale-to-width pagination**: page count and band heights derived
//!   from the raster aspect ratio, with at most one partial final page
//! - **Clean capture**: a scoped style override suppresses blur and
//!   overlay effects for the duration of the snapshot, restored on every
//!   exit path
//! - **Single-flight**: starting an export while one is in flight is a
//!   no-op, never an error
//! - **Display-aware scaling**: capture scale derived from the device
//!   pixel ratio, capped at 2.0 and reduced on narrow viewports
//! - **Async front-end**: optional `async` feature runs the pipeline as a
//!   cooperative task

pub mod capture;
pub mod error;
pub mod export;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use capture::{
    BufferRegion, CaptureOptions, CaptureRequest, CaptureStyleGuard, RasterImage, Region,
    ScaleMode,
};
pub use error::{Error, Result};
pub use export::{
    export_file_name, ExportArtifact, ExportController, ExportOptions, ExportState, ExportStatus,
    DEFAULT_LABEL,
};
pub use model::{ExportDocument, PageFormat, Placement};

use image::Rgb;
use std::path::{Path, PathBuf};

/// Export a region as a paginated PDF and return the artifact in memory.
///
/// One-shot convenience around [`Exporter`]. The label becomes the file
/// name stem and the PDF title.
///
/// # Example
///
/// ```
/// use image::RgbaImage;
/// use pagesnap::{export_region, BufferRegion};
///
/// let mut region = BufferRegion::new(RgbaImage::new(800, 600));
/// let artifact = export_region(&mut region, "Device 1").unwrap();
/// assert!(artifact.bytes.starts_with(b"%PDF"));
/// ```
pub fn export_region<R: Region + ?Sized>(region: &mut R, label: &str) -> Result<ExportArtifact> {
    into_artifact(Exporter::new(label).export(region)?)
}

/// Export a region and write the named file into `dir`.
pub fn export_region_to_dir<R: Region + ?Sized>(
    region: &mut R,
    label: &str,
    dir: impl AsRef<Path>,
) -> Result<ExportArtifact> {
    into_artifact(
        Exporter::new(label)
            .with_output_dir(dir.as_ref())
            .export(region)?,
    )
}

fn into_artifact(status: ExportStatus) -> Result<ExportArtifact> {
    match status {
        ExportStatus::Completed(artifact) => Ok(artifact),
        ExportStatus::Skipped => Err(Error::CaptureFailed(
            "another export is already in flight".into(),
        )),
    }
}

/// Builder for configuring and running exports.
///
/// Owns an [`ExportController`], so a long-lived `Exporter` also carries
/// the single-flight latch for its region.
///
/// # Example
///
/// ```no_run
/// use image::RgbaImage;
/// use pagesnap::{BufferRegion, Exporter, PageFormat};
///
/// let mut region = BufferRegion::new(RgbaImage::new(1000, 2400));
/// let status = Exporter::new("Fleet Station 7")
///     .with_page_format(PageFormat::letter())
///     .with_scale(1.0)
///     .with_output_dir("./reports")
///     .export(&mut region)?;
/// # Ok::<(), pagesnap::Error>(())
/// ```
pub struct Exporter {
    controller: ExportController,
    options: ExportOptions,
}

impl Exporter {
    /// Create an exporter for the given artifact label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            controller: ExportController::new(),
            options: ExportOptions::new(label),
        }
    }

    /// Set the output page format.
    pub fn with_page_format(mut self, page: PageFormat) -> Self {
        self.options.page = page;
        self
    }

    /// Set the background fill for transparent pixels.
    pub fn with_background(mut self, background: Rgb<u8>) -> Self {
        self.options.capture = self.options.capture.with_background(background);
        self
    }

    /// Use a fixed capture scale instead of the display heuristic.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.options.capture = self.options.capture.with_scale(scale);
        self
    }

    /// Write the exported file into the given directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.output_dir = Some(dir.into());
        self
    }

    /// Borrow the configured options.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Current state of the underlying controller.
    pub fn state(&self) -> ExportState {
        self.controller.state()
    }

    /// Run the export pipeline on `region`.
    pub fn export<R: Region + ?Sized>(&self, region: &mut R) -> Result<ExportStatus> {
        self.controller.export(region, &self.options)
    }

    /// Run the export pipeline as a cooperative async task.
    #[cfg(feature = "async")]
    pub async fn export_async<R: Region + ?Sized>(&self, region: &mut R) -> Result<ExportStatus> {
        self.controller.export_async(region, &self.options).await
    }
}
