//! The paginated export document.

use super::PageFormat;
use crate::error::{Error, Result};
use serde::Serialize;

/// Placement directive for a single output page.
///
/// Every page carries the *full* raster image at a vertical offset; the
/// page bounds clip it so only one band is visible. Coordinates are in
/// millimeters, measured from the top-left corner of the page, so `y` is
/// zero on the first page and negative on every following page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    /// Page number (1-indexed)
    pub page: u32,

    /// Horizontal offset of the image on the page
    pub x: f32,

    /// Vertical offset of the image top relative to the page top
    pub y: f32,

    /// Drawn image width
    pub width: f32,

    /// Drawn image height
    pub height: f32,
}

/// An ordered sequence of page placements derived from one raster snapshot.
///
/// Built once by [`ExportDocument::paginate`], append-only during
/// construction, then handed to the PDF renderer and discarded. The
/// per-page visible bands always sum to [`draw_height`](Self::draw_height),
/// with at most one partial final page.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    format: PageFormat,
    draw_width: f32,
    draw_height: f32,
    placements: Vec<Placement>,
}

impl ExportDocument {
    /// Split a raster of `raster_width` x `raster_height` device pixels into
    /// page placements for the given format.
    ///
    /// The image is scaled uniformly to fit the page width; the scaled
    /// height determines how many pages are emitted. Each page after the
    /// first shifts the image up by one page height so its viewport exposes
    /// the next vertical band.
    ///
    /// Returns [`Error::CaptureFailed`] for an empty raster or a
    /// non-positive page format.
    pub fn paginate(raster_width: u32, raster_height: u32, format: PageFormat) -> Result<Self> {
        if raster_width == 0 || raster_height == 0 {
            return Err(Error::CaptureFailed(format!(
                "cannot paginate an empty raster ({raster_width}x{raster_height})"
            )));
        }
        if !format.is_valid() {
            return Err(Error::CaptureFailed(format!(
                "page format must have positive dimensions ({}x{} mm)",
                format.width, format.height
            )));
        }

        let draw_width = format.width;
        let draw_height = draw_width * raster_height as f32 / raster_width as f32;

        let mut placements = vec![Placement {
            page: 1,
            x: 0.0,
            y: 0.0,
            width: draw_width,
            height: draw_height,
        }];

        // Remaining image height below the first page's viewport. Each extra
        // page re-places the full image shifted up by one page height.
        let mut remaining = draw_height - format.height;
        while remaining > 0.0 {
            placements.push(Placement {
                page: placements.len() as u32 + 1,
                x: 0.0,
                y: remaining - draw_height,
                width: draw_width,
                height: draw_height,
            });
            remaining -= format.height;
        }

        Ok(Self {
            format,
            draw_width,
            draw_height,
            placements,
        })
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.placements.len()
    }

    /// Get the page placements in top-to-bottom order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Get the page format used for every page.
    pub fn format(&self) -> PageFormat {
        self.format
    }

    /// Drawn image width in millimeters (equal to the page width).
    pub fn draw_width(&self) -> f32 {
        self.draw_width
    }

    /// Drawn image height in millimeters after scale-to-fit-width.
    pub fn draw_height(&self) -> f32 {
        self.draw_height
    }

    /// Height of the image band visible on the given page (0-indexed).
    ///
    /// Full page height everywhere except possibly the last page.
    pub fn visible_band(&self, index: usize) -> Option<f32> {
        if index >= self.placements.len() {
            return None;
        }
        let exposed = self.draw_height - index as f32 * self.format.height;
        Some(exposed.min(self.format.height))
    }

    /// Serialize the placement manifest to pretty-printed JSON.
    ///
    /// Intended for diagnostics: the manifest records the page format, the
    /// scaled draw size, and every per-page placement.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::CaptureFailed(format!("placement manifest serialization: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_when_image_is_short() {
        let doc = ExportDocument::paginate(1000, 500, PageFormat::a4()).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.draw_width(), 210.0);
        assert_eq!(doc.draw_height(), 105.0);
        assert_eq!(doc.placements()[0].y, 0.0);
        assert_eq!(doc.visible_band(0), Some(105.0));
    }

    #[test]
    fn test_two_pages_with_partial_last_band() {
        // 1000x2400 px on A4: draw height 210 * 2400 / 1000 = 504 mm.
        let doc = ExportDocument::paginate(1000, 2400, PageFormat::a4()).unwrap();
        assert_eq!(doc.draw_height(), 504.0);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.visible_band(0), Some(297.0));
        assert_eq!(doc.visible_band(1), Some(207.0));
        assert_eq!(doc.visible_band(2), None);
    }

    #[test]
    fn test_offsets_step_by_one_page_height() {
        let doc = ExportDocument::paginate(1000, 5000, PageFormat::a4()).unwrap();
        // draw height 1050 mm over 297 mm pages -> 4 pages.
        assert_eq!(doc.page_count(), 4);
        for (index, placement) in doc.placements().iter().enumerate() {
            assert_eq!(placement.page, index as u32 + 1);
            assert_eq!(placement.x, 0.0);
            assert_eq!(placement.y, -(index as f32) * 297.0);
            assert_eq!(placement.width, doc.draw_width());
            assert_eq!(placement.height, doc.draw_height());
        }
    }

    #[test]
    fn test_page_count_matches_ceil_of_band_division() {
        for raster_height in [1, 100, 1413, 2400, 9999, 50_000] {
            let doc = ExportDocument::paginate(1000, raster_height, PageFormat::a4()).unwrap();
            let expected = (doc.draw_height() / 297.0).ceil().max(1.0) as usize;
            assert_eq!(doc.page_count(), expected, "height {raster_height}");
        }
    }

    #[test]
    fn test_bands_sum_to_draw_height() {
        let doc = ExportDocument::paginate(640, 7300, PageFormat::a4()).unwrap();
        let total: f32 = (0..doc.page_count())
            .map(|i| doc.visible_band(i).unwrap())
            .sum();
        assert!((total - doc.draw_height()).abs() < 1e-3);
    }

    #[test]
    fn test_evenly_divisible_height_has_no_partial_page() {
        // Draw height is exactly two page heights: 210 * h / w = 594.
        let format = PageFormat::a4();
        let doc = ExportDocument::paginate(210, 594, format).unwrap();
        assert_eq!(doc.draw_height(), 594.0);
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.visible_band(1), Some(297.0));
    }

    #[test]
    fn test_pagination_is_deterministic() {
        let first = ExportDocument::paginate(1080, 4321, PageFormat::a4()).unwrap();
        let second = ExportDocument::paginate(1080, 4321, PageFormat::a4()).unwrap();
        assert_eq!(first.placements(), second.placements());
    }

    #[test]
    fn test_empty_raster_is_rejected() {
        assert!(ExportDocument::paginate(0, 100, PageFormat::a4()).is_err());
        assert!(ExportDocument::paginate(100, 0, PageFormat::a4()).is_err());
    }

    #[test]
    fn test_degenerate_format_is_rejected() {
        let err = ExportDocument::paginate(100, 100, PageFormat::new(210.0, 0.0)).unwrap_err();
        assert!(matches!(err, Error::CaptureFailed(_)));
    }

    #[test]
    fn test_manifest_records_placements() {
        let doc = ExportDocument::paginate(1000, 2400, PageFormat::a4()).unwrap();
        let json = doc.to_json().unwrap();
        assert!(json.contains("\"placements\""));
        assert!(json.contains("\"draw_height\": 504.0"));
    }
}
