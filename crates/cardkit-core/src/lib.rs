//! # CardKit Core
//!
//! Core types and pure functions shared by every CardKit crate:
//! - Unit conversion between millimeters, pixels and DPI-scaled pixels
//! - Print specifications (bleed, safe zone, target DPI)
//! - Axis-aligned rectangles used for print guides and clipping
//! - Strictly validated colors
//! - The error taxonomy used across the designer and export pipeline

pub mod color;
pub mod error;
pub mod geometry;
pub mod print;
pub mod units;

pub use color::Color;
pub use error::{DocumentError, Error, ExportError, Result, StoreError, ValidationError};
pub use geometry::Rect;
pub use print::PrintSpec;
pub use units::{
    estimate_file_size, format_file_size, mm_to_pixels, pixel_ratio, pixels_to_mm, ExportFormat,
};
