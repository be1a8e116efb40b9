//! The export pipeline: capture, paginate, serialize, save.
//!
//! [`ExportController`] owns the single-flight latch and drives one export
//! operation end to end. The capture-style override is applied strictly
//! before rasterization begins and released strictly after document
//! assembly completes or fails; the latch resets on every exit path.

use crate::capture::{CaptureOptions, CaptureRequest, CaptureStyleGuard, RasterImage, Region};
use crate::error::{Error, Result};
use crate::model::{ExportDocument, PageFormat};
use crate::render;
use chrono::{NaiveDate, Utc};
use log::{debug, error, info};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// Artifact label used when the caller supplies an empty one.
pub const DEFAULT_LABEL: &str = "Battery";

/// Options for one export operation.
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Artifact label, e.g. a device or report name. Appears in the file
    /// name and the PDF title.
    pub label: String,

    /// Rasterization options
    pub capture: CaptureOptions,

    /// Output page geometry
    pub page: PageFormat,

    /// Directory the named file is written to. When `None` the artifact is
    /// only produced in memory.
    pub output_dir: Option<PathBuf>,
}

impl ExportOptions {
    /// Create export options for the given artifact label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set the capture options.
    pub fn with_capture(mut self, capture: CaptureOptions) -> Self {
        self.capture = capture;
        self
    }

    /// Set the output page format.
    pub fn with_page_format(mut self, page: PageFormat) -> Self {
        self.page = page;
        self
    }

    /// Write the exported file into the given directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

/// Observable state of an [`ExportController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    /// No export in flight
    Idle,
    /// An export is running; new requests are ignored
    Exporting,
}

/// Outcome of an export request.
#[derive(Debug, Clone)]
pub enum ExportStatus {
    /// The document was produced.
    Completed(ExportArtifact),

    /// Another export was already in flight; nothing was produced and no
    /// error was raised.
    Skipped,
}

impl ExportStatus {
    /// Whether the request was dropped by the single-flight latch.
    pub fn is_skipped(&self) -> bool {
        matches!(self, ExportStatus::Skipped)
    }

    /// The produced artifact, if any.
    pub fn artifact(&self) -> Option<&ExportArtifact> {
        match self {
            ExportStatus::Completed(artifact) => Some(artifact),
            ExportStatus::Skipped => None,
        }
    }
}

/// A finished export: the named PDF and where it went.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    /// Generated file name, `<Label>_Report_<date>.pdf`
    pub file_name: String,

    /// Number of pages in the document
    pub page_count: usize,

    /// The serialized PDF
    pub bytes: Vec<u8>,

    /// Where the file was written, when an output directory was configured
    pub path: Option<PathBuf>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its generated file name.
    ///
    /// Creates the directory if needed and records the path on the
    /// artifact.
    pub fn write_to_dir(&mut self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        self.path = Some(path.clone());
        Ok(path)
    }
}

/// Drives export operations and guards against concurrent re-entry.
///
/// The controller holds an explicit `Idle | Exporting` state. Starting an
/// export while one is in flight is a no-op ([`ExportStatus::Skipped`]);
/// requests are never queued and a running export is never cancelled.
#[derive(Debug, Default)]
pub struct ExportController {
    in_flight: AtomicBool,
}

/// Resets the latch when the operation leaves scope.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportController {
    /// Create an idle controller.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current controller state.
    pub fn state(&self) -> ExportState {
        if self.in_flight.load(Ordering::Acquire) {
            ExportState::Exporting
        } else {
            ExportState::Idle
        }
    }

    fn begin(&self) -> Option<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard(&self.in_flight))
    }

    /// Export `region` as a paginated PDF.
    ///
    /// Runs the full pipeline: capture-style override, rasterization with
    /// the caller's scroll negated, scale-to-width pagination, PDF
    /// serialization, and (when an output directory is configured) the
    /// file save. Failures are logged with diagnostic detail before being
    /// returned; the style override and the latch are released regardless
    /// of the outcome.
    pub fn export<R: Region + ?Sized>(
        &self,
        region: &mut R,
        options: &ExportOptions,
    ) -> Result<ExportStatus> {
        let Some(_latch) = self.begin() else {
            debug!("export already in flight, ignoring request for {:?}", options.label);
            return Ok(ExportStatus::Skipped);
        };

        let outcome = self.run(region, options);
        if let Err(err) = &outcome {
            error!("PDF export failed: {err}");
        }
        outcome
    }

    fn run<R: Region + ?Sized>(
        &self,
        region: &mut R,
        options: &ExportOptions,
    ) -> Result<ExportStatus> {
        if !region.is_attached() {
            return Err(Error::CaptureFailed("region is not attached".into()));
        }

        let scale = options.capture.resolve_scale(region);
        debug!("exporting {:?} at scale {scale:.2}", options.label);

        let mut region = CaptureStyleGuard::new(region);
        region.settle();
        let raster = capture(&mut region, scale, &options.capture)?;
        let mut artifact = assemble(&raster, options)?;
        if let Some(dir) = &options.output_dir {
            artifact.write_to_dir(dir)?;
        }

        info!(
            "exported {} ({} pages, {} bytes)",
            artifact.file_name,
            artifact.page_count,
            artifact.bytes.len()
        );
        Ok(ExportStatus::Completed(artifact))
    }
}

#[cfg(feature = "async")]
impl ExportController {
    /// Asynchronous variant of [`export`](Self::export).
    ///
    /// Runs the same pipeline as one cooperative task, yielding to the
    /// executor once after the capture-style override is applied so the
    /// override can take effect before the snapshot is taken. The latch is
    /// shared with the synchronous path.
    pub async fn export_async<R: Region + ?Sized>(
        &self,
        region: &mut R,
        options: &ExportOptions,
    ) -> Result<ExportStatus> {
        let Some(_latch) = self.begin() else {
            debug!("export already in flight, ignoring request for {:?}", options.label);
            return Ok(ExportStatus::Skipped);
        };

        let outcome = self.run_async(region, options).await;
        if let Err(err) = &outcome {
            error!("PDF export failed: {err}");
        }
        outcome
    }

    async fn run_async<R: Region + ?Sized>(
        &self,
        region: &mut R,
        options: &ExportOptions,
    ) -> Result<ExportStatus> {
        if !region.is_attached() {
            return Err(Error::CaptureFailed("region is not attached".into()));
        }

        let scale = options.capture.resolve_scale(region);
        debug!("exporting {:?} at scale {scale:.2}", options.label);

        let mut region = CaptureStyleGuard::new(region);
        region.settle();
        tokio::task::yield_now().await;
        let raster = capture(&mut region, scale, &options.capture)?;
        let mut artifact = assemble(&raster, options)?;
        if let Some(dir) = &options.output_dir {
            artifact.write_to_dir(dir)?;
        }

        info!(
            "exported {} ({} pages, {} bytes)",
            artifact.file_name,
            artifact.page_count,
            artifact.bytes.len()
        );
        Ok(ExportStatus::Completed(artifact))
    }
}

fn capture<R: Region + ?Sized>(
    region: &mut CaptureStyleGuard<'_, R>,
    scale: f32,
    options: &CaptureOptions,
) -> Result<RasterImage> {
    let request = CaptureRequest {
        scale,
        background: options.background,
        scroll_y: -region.scroll_offset(),
    };
    region.rasterize(&request)
}

fn assemble(raster: &RasterImage, options: &ExportOptions) -> Result<ExportArtifact> {
    let document = ExportDocument::paginate(raster.width(), raster.height(), options.page)?;
    let label = artifact_label(&options.label);
    let bytes = render::to_pdf(&document, raster, &format!("{label} Report"))?;
    Ok(ExportArtifact {
        file_name: export_file_name(&options.label, Utc::now().date_naive()),
        page_count: document.page_count(),
        bytes,
        path: None,
    })
}

fn artifact_label(label: &str) -> &str {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        DEFAULT_LABEL
    } else {
        trimmed
    }
}

/// Build the artifact file name: `<Label>_Report_<YYYY-MM-DD>.pdf`.
///
/// Whitespace runs in the label collapse to single underscores; an empty
/// label falls back to [`DEFAULT_LABEL`].
pub fn export_file_name(label: &str, date: NaiveDate) -> String {
    let whitespace = Regex::new(r"\s+").unwrap();
    let normalized = whitespace.replace_all(artifact_label(label), "_");
    format!("{}_Report_{}.pdf", normalized, date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::BufferRegion;
    use image::RgbaImage;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    #[test]
    fn test_file_name_normalizes_whitespace() {
        assert_eq!(
            export_file_name("Device 1", date()),
            "Device_1_Report_2025-01-05.pdf"
        );
        assert_eq!(
            export_file_name("  Fleet \t Station  7 ", date()),
            "Fleet_Station_7_Report_2025-01-05.pdf"
        );
    }

    #[test]
    fn test_file_name_falls_back_on_empty_label() {
        assert_eq!(export_file_name("", date()), "Battery_Report_2025-01-05.pdf");
        assert_eq!(
            export_file_name("   ", date()),
            "Battery_Report_2025-01-05.pdf"
        );
    }

    #[test]
    fn test_options_builder() {
        let options = ExportOptions::new("Device 1")
            .with_page_format(PageFormat::letter())
            .with_output_dir("/tmp/reports");

        assert_eq!(options.label, "Device 1");
        assert_eq!(options.page, PageFormat::letter());
        assert_eq!(options.output_dir.as_deref(), Some(Path::new("/tmp/reports")));
    }

    #[test]
    fn test_controller_starts_idle() {
        let controller = ExportController::new();
        assert_eq!(controller.state(), ExportState::Idle);
    }

    #[test]
    fn test_controller_is_idle_after_export() {
        let controller = ExportController::new();
        let mut region = BufferRegion::new(RgbaImage::new(50, 60));
        let status = controller
            .export(&mut region, &ExportOptions::new("Device 1"))
            .unwrap();
        assert!(!status.is_skipped());
        assert_eq!(controller.state(), ExportState::Idle);
    }

    #[test]
    fn test_detached_region_is_capture_failed() {
        let controller = ExportController::new();
        let mut region = BufferRegion::new(RgbaImage::new(50, 60)).detached();
        let err = controller
            .export(&mut region, &ExportOptions::new("Device 1"))
            .unwrap_err();
        assert!(matches!(err, Error::CaptureFailed(_)));
        assert_eq!(controller.state(), ExportState::Idle);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_async_export_completes() {
        let controller = ExportController::new();
        let mut region = BufferRegion::new(RgbaImage::new(50, 60));
        let status = controller
            .export_async(&mut region, &ExportOptions::new("Device 1"))
            .await
            .unwrap();
        assert!(status.artifact().is_some());
        assert_eq!(controller.state(), ExportState::Idle);
    }
}
