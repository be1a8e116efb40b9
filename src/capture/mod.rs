//! Region capture: turning a rendered visual subtree into a raster snapshot.
//!
//! The pipeline only sees the [`Region`] trait; how the underlying surface
//! is rendered is the host's concern. The capture configuration mirrors the
//! knobs of the export operation: background fill, capture scale, and the
//! scroll-compensated snapshot request.

mod options;
mod raster;
mod region;

pub use options::{
    CaptureOptions, CaptureRequest, ScaleMode, FALLBACK_PIXEL_RATIO, MAX_AUTO_SCALE,
    NARROW_VIEWPORT_PX, NARROW_VIEWPORT_SCALE,
};
pub use raster::RasterImage;
pub use region::{BufferRegion, CaptureStyleGuard, Region};
