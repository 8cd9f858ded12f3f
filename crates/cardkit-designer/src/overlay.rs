//! Print-specs overlay.
//!
//! Bleed and safe-zone rectangles for on-screen guidance. They are always
//! derived at the base screen DPI, independent of the export target DPI, and
//! are never part of an exported image.

use cardkit_core::units::{mm_to_pixels, BASE_SCREEN_DPI};
use cardkit_core::{PrintSpec, Rect};
use serde::Serialize;

use crate::document::Document;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrintGuides {
    /// Trim box, `(0, 0, width, height)`.
    pub canvas: Rect,
    /// Trim box grown by the bleed margin.
    pub bleed: Rect,
    /// Trim box shrunk by the safe-zone margin.
    pub safe: Rect,
    pub bleed_px: f64,
    pub safe_px: f64,
}

impl PrintGuides {
    pub fn compute(width: f64, height: f64, spec: &PrintSpec) -> Self {
        let bleed_px = mm_to_pixels(spec.bleed_mm, BASE_SCREEN_DPI);
        let safe_px = mm_to_pixels(spec.safe_zone_mm, BASE_SCREEN_DPI);
        let canvas = Rect::from_size(width, height);
        Self {
            canvas,
            bleed: canvas.expand(bleed_px),
            safe: canvas.inset(safe_px),
            bleed_px,
            safe_px,
        }
    }

    pub fn for_document(doc: &Document, spec: &PrintSpec) -> Self {
        Self::compute(doc.width, doc.height, spec)
    }

    /// Ids of visible top-level layers that reach into the canvas but leave
    /// the safe zone. Layers entirely off canvas are not reported.
    pub fn layers_outside_safe_zone<'a>(&self, doc: &'a Document) -> Vec<&'a str> {
        doc.layers
            .iter()
            .filter(|l| l.visible)
            .filter(|l| {
                let b = l.bounds();
                b.intersects(&self.canvas) && !self.safe.contains_rect(&b)
            })
            .map(|l| l.id.as_str())
            .collect()
    }
}
