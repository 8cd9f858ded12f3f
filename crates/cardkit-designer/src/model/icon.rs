use cardkit_core::Color;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ICON_SIZE: f64 = 48.0;

/// One of the built-in fixed icon shapes (see [`crate::icons`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconLayer {
    pub icon: String,
    #[serde(default)]
    pub fill: Color,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(default)]
    pub stroke_width: f64,
}

impl IconLayer {
    pub fn new(icon: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            fill: Color::BLACK,
            stroke: None,
            stroke_width: 0.0,
        }
    }

    pub(crate) fn apply(&self, patch: &IconPatch) -> Self {
        let mut next = self.clone();
        if let Some(icon) = &patch.icon {
            next.icon = icon.clone();
        }
        if let Some(fill) = patch.fill {
            next.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            next.stroke = stroke;
        }
        if let Some(width) = patch.stroke_width {
            next.stroke_width = width;
        }
        next
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !crate::icons::is_known(&self.icon) {
            return Err(format!("unknown icon '{}'", self.icon));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width >= 0.0) {
            return Err(format!("invalid stroke width {}", self.stroke_width));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IconPatch {
    pub icon: Option<String>,
    pub fill: Option<Color>,
    /// `Some(None)` removes the stroke.
    pub stroke: Option<Option<Color>>,
    pub stroke_width: Option<f64>,
}
