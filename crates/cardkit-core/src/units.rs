//! Unit conversion utilities
//!
//! Converts between millimeters and pixels at a given DPI and estimates
//! output file sizes for the export formats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Millimeters in one inch.
pub const MM_PER_INCH: f64 = 25.4;

/// DPI the live canvas is authored at.
pub const BASE_SCREEN_DPI: f64 = 72.0;

/// Default print resolution.
pub const DEFAULT_PRINT_DPI: f64 = 300.0;

/// Default bleed margin in millimeters.
pub const DEFAULT_BLEED_MM: f64 = 3.0;

/// Default safe-zone margin in millimeters.
pub const DEFAULT_SAFE_ZONE_MM: f64 = 3.0;

/// Bytes per pixel used when the format is not one of the export formats.
pub const DEFAULT_BYTES_PER_PIXEL: f64 = 3.0;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Convert millimeters to pixels at `dpi`.
///
/// Negative lengths are not rejected; callers own domain validity.
pub fn mm_to_pixels(mm: f64, dpi: f64) -> f64 {
    mm / MM_PER_INCH * dpi
}

/// Convert pixels at `dpi` to millimeters.
pub fn pixels_to_mm(px: f64, dpi: f64) -> f64 {
    px / dpi * MM_PER_INCH
}

/// Scale factor from the authoring DPI to the target DPI.
pub fn pixel_ratio(target_dpi: f64, base_dpi: f64) -> f64 {
    target_dpi / base_dpi
}

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless raster
    Png,
    /// Lossy raster
    Jpeg,
    /// Single-page document with an embedded raster
    Pdf,
}

impl ExportFormat {
    /// Rough encoded size per pixel, used for size estimates only.
    pub fn bytes_per_pixel(&self) -> f64 {
        match self {
            Self::Png => 3.5,
            Self::Jpeg => 1.0,
            Self::Pdf => 4.0,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
        }
    }
}

impl Default for ExportFormat {
    fn default() -> Self {
        Self::Png
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Png => write!(f, "PNG"),
            Self::Jpeg => write!(f, "JPEG"),
            Self::Pdf => write!(f, "PDF"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

/// Estimate the encoded size of a `width` x `height` pixel export.
///
/// `format` is matched case-insensitively; unknown formats use
/// [`DEFAULT_BYTES_PER_PIXEL`]. The DPI is accepted for call-site symmetry
/// with the export options but the estimate only depends on pixel count.
pub fn estimate_file_size(width: f64, height: f64, format: &str, _dpi: f64) -> String {
    let bytes_per_pixel = format
        .parse::<ExportFormat>()
        .map(|f| f.bytes_per_pixel())
        .unwrap_or(DEFAULT_BYTES_PER_PIXEL);
    format_file_size(width * height * bytes_per_pixel)
}

/// Format a byte count as `B`, `KB` or `MB`.
pub fn format_file_size(bytes: f64) -> String {
    if bytes < KIB {
        format!("{:.0} B", bytes)
    } else if bytes < MIB {
        format!("{:.1} KB", bytes / KIB)
    } else {
        format!("{:.1} MB", bytes / MIB)
    }
}
