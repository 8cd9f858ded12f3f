//! Print specifications
//!
//! Bleed, safe zone and resolution used by the export pipeline and the
//! on-screen print guides. Bleed and safe rectangles are derived from these
//! values and the document size; they are never stored.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::units::{
    mm_to_pixels, pixel_ratio, BASE_SCREEN_DPI, DEFAULT_BLEED_MM, DEFAULT_PRINT_DPI,
    DEFAULT_SAFE_ZONE_MM,
};

/// Lowest accepted target DPI.
pub const MIN_DPI: f64 = 72.0;
/// Highest accepted target DPI.
pub const MAX_DPI: f64 = 1200.0;
/// Largest accepted bleed or safe-zone margin.
pub const MAX_MARGIN_MM: f64 = 25.0;

/// Where a print spec came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintAuthority {
    /// Built-in defaults
    System,
    /// Loaded from configuration
    Config,
    /// Supplied by the user (validated)
    User,
}

impl Default for PrintAuthority {
    fn default() -> Self {
        Self::System
    }
}

/// Print specifications for physical output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrintSpec {
    #[serde(default)]
    pub authority: PrintAuthority,
    /// Bleed margin beyond the trim edge, in millimeters
    pub bleed_mm: f64,
    /// Inset margin that content should stay inside, in millimeters
    pub safe_zone_mm: f64,
    /// Export resolution
    pub dpi: f64,
    /// Resolution the canvas is authored at
    pub base_dpi: f64,
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self {
            authority: PrintAuthority::System,
            bleed_mm: DEFAULT_BLEED_MM,
            safe_zone_mm: DEFAULT_SAFE_ZONE_MM,
            dpi: DEFAULT_PRINT_DPI,
            base_dpi: BASE_SCREEN_DPI,
        }
    }
}

impl PrintSpec {
    /// Create from user input with validation
    pub fn from_user(dpi: f64, bleed_mm: f64, safe_zone_mm: f64) -> Result<Self, ValidationError> {
        let spec = Self {
            authority: PrintAuthority::User,
            bleed_mm,
            safe_zone_mm,
            dpi,
            base_dpi: BASE_SCREEN_DPI,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_bleed_mm(mut self, bleed_mm: f64) -> Self {
        self.bleed_mm = bleed_mm;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.dpi.is_finite() || self.dpi < MIN_DPI || self.dpi > MAX_DPI {
            return Err(ValidationError::new(format!(
                "DPI must be between {} and {}, got {}",
                MIN_DPI, MAX_DPI, self.dpi
            )));
        }
        if !self.base_dpi.is_finite() || self.base_dpi <= 0.0 {
            return Err(ValidationError::new(format!(
                "Base DPI must be positive, got {}",
                self.base_dpi
            )));
        }
        for (name, value) in [("Bleed", self.bleed_mm), ("Safe zone", self.safe_zone_mm)] {
            if !value.is_finite() || !(0.0..=MAX_MARGIN_MM).contains(&value) {
                return Err(ValidationError::new(format!(
                    "{} must be between 0 and {} mm, got {}",
                    name, MAX_MARGIN_MM, value
                )));
            }
        }
        Ok(())
    }

    /// Scale from canvas pixels to export pixels.
    pub fn pixel_ratio(&self) -> f64 {
        pixel_ratio(self.dpi, self.base_dpi)
    }

    /// Bleed width in export pixels.
    pub fn bleed_px(&self) -> f64 {
        mm_to_pixels(self.bleed_mm, self.dpi)
    }

    /// Safe-zone width in export pixels.
    pub fn safe_zone_px(&self) -> f64 {
        mm_to_pixels(self.safe_zone_mm, self.dpi)
    }
}
