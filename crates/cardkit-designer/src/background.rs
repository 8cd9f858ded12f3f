//! Document background: solid fill, linear gradient or tiled image pattern.

use cardkit_core::{Color, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackgroundKind {
    Solid {
        color: Color,
    },
    Gradient {
        colors: Vec<Color>,
        /// Degrees; 0 runs left to right, 90 top to bottom.
        #[serde(default)]
        rotation: f64,
    },
    Pattern {
        base_color: Color,
        /// Image reference tiled over the base color.
        image: String,
        #[serde(default = "default_scale")]
        scale: f64,
    },
}

fn default_scale() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    #[serde(flatten)]
    pub kind: BackgroundKind,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Default for Background {
    fn default() -> Self {
        Self::solid(Color::WHITE)
    }
}

impl Background {
    pub fn solid(color: Color) -> Self {
        Self {
            kind: BackgroundKind::Solid { color },
            opacity: 1.0,
        }
    }

    pub fn gradient(colors: Vec<Color>, rotation: f64) -> Self {
        Self {
            kind: BackgroundKind::Gradient { colors, rotation },
            opacity: 1.0,
        }
    }

    pub fn pattern(base_color: Color, image: impl Into<String>, scale: f64) -> Self {
        Self {
            kind: BackgroundKind::Pattern {
                base_color,
                image: image.into(),
                scale,
            },
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Image reference that must be decoded before rendering, if any.
    pub fn image_ref(&self) -> Option<&str> {
        match &self.kind {
            BackgroundKind::Pattern { image, .. } => Some(image.as_str()),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ValidationError::new(format!(
                "background opacity must be within 0..1, got {}",
                self.opacity
            )));
        }
        match &self.kind {
            BackgroundKind::Solid { .. } => Ok(()),
            BackgroundKind::Gradient { colors, rotation } => {
                if colors.len() < 2 {
                    return Err(ValidationError::new("gradient needs at least two colors"));
                }
                if !rotation.is_finite() {
                    return Err(ValidationError::new("gradient rotation must be finite"));
                }
                Ok(())
            }
            BackgroundKind::Pattern { image, scale, .. } => {
                if image.trim().is_empty() {
                    return Err(ValidationError::new("pattern image must not be empty"));
                }
                if !(scale.is_finite() && *scale > 0.0) {
                    return Err(ValidationError::new(format!(
                        "pattern scale must be positive, got {}",
                        scale
                    )));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_white() {
        assert_eq!(Background::default(), Background::solid(Color::WHITE));
        assert!(Background::default().validate().is_ok());
    }

    #[test]
    fn test_validation() {
        assert!(Background::gradient(vec![Color::BLACK], 0.0).validate().is_err());
        assert!(Background::gradient(vec![Color::BLACK, Color::WHITE], 45.0)
            .validate()
            .is_ok());
        assert!(Background::pattern(Color::WHITE, "", 1.0).validate().is_err());
        assert!(Background::pattern(Color::WHITE, "asset://x/y.png", 0.0)
            .validate()
            .is_err());
        assert!(Background::default().with_opacity(2.0).validate().is_err());
    }

    #[test]
    fn test_json_layout() {
        let bg = Background::gradient(vec![Color::BLACK, Color::WHITE], 90.0);
        let value = serde_json::to_value(&bg).unwrap();
        assert_eq!(value["kind"], "gradient");
        assert_eq!(value["colors"][1], "#ffffff");
        assert_eq!(serde_json::from_value::<Background>(value).unwrap(), bg);
    }
}
