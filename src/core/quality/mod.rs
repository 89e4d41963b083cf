//! # Quality Module
//!
//! Reads image dimensions for resolution ranking and low-quality flagging.
//!
//! Only the image header is decoded. Any failure (unknown format, truncated
//! file, unsupported codec) maps to [`Inspection::Unreadable`], which ranks as
//! the `(0, 0)` sentinel and is always flagged for review.

use image::ImageReader;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Sentinel for images that could not be read
    pub const UNREADABLE: Resolution = Resolution {
        width: 0,
        height: 0,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Pixel area, the ranking key between same-named images
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Outcome of inspecting an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inspection {
    Readable(Resolution),
    Unreadable { reason: String },
}

impl Inspection {
    /// Resolution used for ranking; unreadable images rank lowest
    pub fn resolution(&self) -> Resolution {
        match self {
            Inspection::Readable(resolution) => *resolution,
            Inspection::Unreadable { .. } => Resolution::UNREADABLE,
        }
    }
}

/// Reads image dimensions and applies the low-quality threshold
#[derive(Debug, Clone, Copy)]
pub struct QualityInspector {
    min_width: u32,
    min_height: u32,
}

impl Default for QualityInspector {
    fn default() -> Self {
        Self {
            min_width: 100,
            min_height: 100,
        }
    }
}

impl QualityInspector {
    /// Create an inspector with a minimum acceptable size
    pub fn new(min_width: u32, min_height: u32) -> Self {
        Self {
            min_width,
            min_height,
        }
    }

    /// Read the dimensions of an image file. Never fails.
    pub fn inspect(&self, path: &Path) -> Inspection {
        let dimensions = ImageReader::open(path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|e| e.to_string())
            .and_then(|reader| reader.into_dimensions().map_err(|e| e.to_string()));

        match dimensions {
            Ok((width, height)) => Inspection::Readable(Resolution::new(width, height)),
            Err(reason) => Inspection::Unreadable { reason },
        }
    }

    /// Below the configured minimum width or height
    pub fn is_low_quality(&self, resolution: Resolution) -> bool {
        resolution.width < self.min_width || resolution.height < self.min_height
    }

    /// Unreadable, or readable but too small
    pub fn needs_review(&self, inspection: &Inspection) -> bool {
        match inspection {
            Inspection::Readable(resolution) => self.is_low_quality(*resolution),
            Inspection::Unreadable { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::fs;
    use tempfile::TempDir;

    fn write_png(dir: &TempDir, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_fn(width, height, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 0]));
        buffer.save(&path).unwrap();
        path
    }

    #[test]
    fn reads_dimensions_from_header() {
        let temp = TempDir::new().unwrap();
        let path = write_png(&temp, "IMG_1.png", 400, 300);

        let inspection = QualityInspector::default().inspect(&path);
        assert_eq!(inspection, Inspection::Readable(Resolution::new(400, 300)));
        assert_eq!(inspection.resolution().area(), 120_000);
    }

    #[test]
    fn format_is_sniffed_not_taken_from_extension() {
        let temp = TempDir::new().unwrap();
        let png = write_png(&temp, "real.png", 120, 80);
        let mislabeled = temp.path().join("mislabeled.jpg");
        fs::copy(&png, &mislabeled).unwrap();

        let inspection = QualityInspector::default().inspect(&mislabeled);
        assert_eq!(inspection.resolution(), Resolution::new(120, 80));
    }

    #[test]
    fn garbage_is_unreadable_and_ranks_lowest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corrupt.jpg");
        fs::write(&path, b"this is not a valid image file").unwrap();

        let inspector = QualityInspector::default();
        let inspection = inspector.inspect(&path);
        assert!(matches!(inspection, Inspection::Unreadable { .. }));
        assert_eq!(inspection.resolution(), Resolution::UNREADABLE);
        assert!(inspector.needs_review(&inspection));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let inspection = QualityInspector::default().inspect(Path::new("/nonexistent/a.png"));
        assert!(matches!(inspection, Inspection::Unreadable { .. }));
    }

    #[test]
    fn threshold_applies_to_either_side() {
        let inspector = QualityInspector::new(100, 100);
        assert!(inspector.is_low_quality(Resolution::new(99, 1000)));
        assert!(inspector.is_low_quality(Resolution::new(1000, 99)));
        assert!(!inspector.is_low_quality(Resolution::new(100, 100)));
        assert!(!inspector.needs_review(&Inspection::Readable(Resolution::new(640, 480))));
    }
}
