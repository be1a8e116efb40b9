//! PDF serialization of a paginated export document.

use crate::capture::RasterImage;
use crate::error::{Error, Result};
use crate::model::ExportDocument;
use printpdf::{
    ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, Mm, PdfDocument, Px,
};

/// Nominal resolution the raster is embedded at. The actual drawn size is
/// controlled by the per-page scale factors, not by this value.
pub const EMBED_DPI: f32 = 300.0;

const MM_PER_INCH: f32 = 25.4;

/// Serialize the document into PDF bytes.
///
/// One output page per placement. Every page embeds the *full* raster,
/// shifted vertically per the placement; the page clip region exposes only
/// that page's band. Placement coordinates are top-based, so the vertical
/// offset is flipped into PDF's bottom-left coordinate space here.
pub fn to_pdf(document: &ExportDocument, raster: &RasterImage, title: &str) -> Result<Vec<u8>> {
    if raster.is_empty() {
        return Err(Error::CaptureFailed("cannot embed an empty raster".into()));
    }

    let format = document.format();
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(format.width), Mm(format.height), "Layer 1");

    let rgb = raster.to_rgb8();
    let natural_width = raster.width() as f32 * MM_PER_INCH / EMBED_DPI;
    let natural_height = raster.height() as f32 * MM_PER_INCH / EMBED_DPI;

    for (index, placement) in document.placements().iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(Mm(format.width), Mm(format.height), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let image = Image::from(ImageXObject {
            width: Px(raster.width() as usize),
            height: Px(raster.height() as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: false,
            image_data: rgb.clone(),
            image_filter: None,
            clipping_bbox: None,
            smask: None,
        });

        // Placement `y` locates the image top relative to the page top;
        // printpdf translates the image's bottom-left corner.
        let translate_y = format.height - (placement.y + placement.height);
        image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(placement.x)),
                translate_y: Some(Mm(translate_y)),
                scale_x: Some(placement.width / natural_width),
                scale_y: Some(placement.height / natural_height),
                dpi: Some(EMBED_DPI),
                ..Default::default()
            },
        );
    }

    doc.save_to_bytes()
        .map_err(|e| Error::CaptureFailed(format!("PDF serialization: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageFormat;
    use image::RgbaImage;

    fn raster(width: u32, height: u32) -> RasterImage {
        RasterImage::new(RgbaImage::new(width, height), 1.0)
    }

    #[test]
    fn test_output_is_a_pdf() {
        let raster = raster(100, 120);
        let document = ExportDocument::paginate(100, 120, PageFormat::a4()).unwrap();
        let bytes = to_pdf(&document, &raster, "Snapshot").unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"));
    }

    #[test]
    fn test_multi_page_output_grows() {
        let short_raster = raster(100, 100);
        let tall_raster = raster(100, 350);
        let one_page = ExportDocument::paginate(100, 100, PageFormat::a4()).unwrap();
        let three_pages = ExportDocument::paginate(100, 350, PageFormat::a4()).unwrap();
        assert_eq!(three_pages.page_count(), 3);

        let small = to_pdf(&one_page, &short_raster, "Snapshot").unwrap();
        let large = to_pdf(&three_pages, &tall_raster, "Snapshot").unwrap();
        assert!(large.len() > small.len());
    }

    #[test]
    fn test_empty_raster_is_rejected() {
        let document = ExportDocument::paginate(100, 100, PageFormat::a4()).unwrap();
        let empty = RasterImage::new(RgbaImage::new(0, 0), 1.0);
        assert!(to_pdf(&document, &empty, "Snapshot").is_err());
    }
}
