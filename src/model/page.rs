//! Page geometry types.

use serde::{Deserialize, Serialize};

/// Paper geometry of one output page, in millimeters.
///
/// Fixed for the duration of an export operation; every emitted page uses
/// the same format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageFormat {
    /// Page width in millimeters
    pub width: f32,

    /// Page height in millimeters
    pub height: f32,
}

impl PageFormat {
    /// Create a page format with the given dimensions in millimeters.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Standard A4 portrait (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(210.0, 297.0)
    }

    /// Standard Letter portrait (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::new(215.9, 279.4)
    }

    /// Return the same format rotated to landscape orientation.
    pub fn landscape(self) -> Self {
        if self.is_landscape() {
            self
        } else {
            Self::new(self.height, self.width)
        }
    }

    /// Check if the format is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    /// Get page dimensions as (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    /// Whether both dimensions are positive and finite.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::a4()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_portrait() {
        let a4 = PageFormat::a4();
        assert_eq!(a4.dimensions(), (210.0, 297.0));
        assert!(!a4.is_landscape());
        assert!(a4.is_valid());
    }

    #[test]
    fn test_landscape_swaps_once() {
        let landscape = PageFormat::a4().landscape();
        assert_eq!(landscape.dimensions(), (297.0, 210.0));
        assert!(landscape.is_landscape());
        assert_eq!(landscape.landscape(), landscape);
    }

    #[test]
    fn test_default_is_a4() {
        assert_eq!(PageFormat::default(), PageFormat::a4());
    }

    #[test]
    fn test_degenerate_formats_are_invalid() {
        assert!(!PageFormat::new(0.0, 297.0).is_valid());
        assert!(!PageFormat::new(210.0, -1.0).is_valid());
        assert!(!PageFormat::new(f32::NAN, 297.0).is_valid());
    }
}
