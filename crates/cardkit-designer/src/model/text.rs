use cardkit_core::Color;
use serde::{Deserialize, Serialize};

/// Default family used when a text layer is created without one.
pub const DEFAULT_FONT_FAMILY: &str = "Sans";
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_LINE_HEIGHT: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    pub text: String,
    #[serde(default = "default_family")]
    pub font_family: String,
    #[serde(default = "default_size")]
    pub font_size: f64,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default = "default_line_height")]
    pub line_height: f64,
}

fn default_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

fn default_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn default_line_height() -> f64 {
    DEFAULT_LINE_HEIGHT
}

impl TextLayer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_family: default_family(),
            font_size: DEFAULT_FONT_SIZE,
            color: Color::BLACK,
            bold: false,
            italic: false,
            align: TextAlign::Left,
            line_height: DEFAULT_LINE_HEIGHT,
        }
    }

    /// Height of the laid-out block: one line per `\n`-separated segment.
    pub fn block_height(&self) -> f64 {
        let lines = self.text.split('\n').count().max(1) as f64;
        lines * self.font_size * self.line_height
    }

    pub(crate) fn apply(&self, patch: &TextPatch) -> Self {
        let mut next = self.clone();
        if let Some(text) = &patch.text {
            next.text = text.clone();
        }
        if let Some(family) = &patch.font_family {
            next.font_family = family.clone();
        }
        if let Some(size) = patch.font_size {
            next.font_size = size;
        }
        if let Some(color) = patch.color {
            next.color = color;
        }
        if let Some(bold) = patch.bold {
            next.bold = bold;
        }
        if let Some(italic) = patch.italic {
            next.italic = italic;
        }
        if let Some(align) = patch.align {
            next.align = align;
        }
        if let Some(lh) = patch.line_height {
            next.line_height = lh;
        }
        next
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(format!("font size must be positive, got {}", self.font_size));
        }
        if !(self.line_height.is_finite() && self.line_height > 0.0) {
            return Err(format!(
                "line height must be positive, got {}",
                self.line_height
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPatch {
    pub text: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub color: Option<Color>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub align: Option<TextAlign>,
    pub line_height: Option<f64>,
}

impl TextPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}
