use serde::{Deserialize, Serialize};

/// How an image is placed into its layer box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    #[default]
    Stretch,
    Contain,
    Cover,
}

impl ImageFit {
    /// Destination rect (x, y, w, h) inside a `box_w` x `box_h` box for an
    /// image of `img_w` x `img_h`.
    pub fn place(&self, box_w: f64, box_h: f64, img_w: f64, img_h: f64) -> (f64, f64, f64, f64) {
        if img_w <= 0.0 || img_h <= 0.0 {
            return (0.0, 0.0, box_w, box_h);
        }
        let sx = box_w / img_w;
        let sy = box_h / img_h;
        let scale = match self {
            ImageFit::Stretch => return (0.0, 0.0, box_w, box_h),
            ImageFit::Contain => sx.min(sy),
            ImageFit::Cover => sx.max(sy),
        };
        let w = img_w * scale;
        let h = img_h * scale;
        ((box_w - w) / 2.0, (box_h - h) / 2.0, w, h)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoLayer {
    /// Asset URL, `data:` URL or file path.
    pub source: String,
    #[serde(default)]
    pub fit: ImageFit,
}

impl LogoLayer {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            fit: ImageFit::default(),
        }
    }

    pub(crate) fn apply(&self, patch: &LogoPatch) -> Self {
        let mut next = self.clone();
        if let Some(source) = &patch.source {
            next.source = source.clone();
        }
        if let Some(fit) = patch.fit {
            next.fit = fit;
        }
        next
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.source.trim().is_empty() {
            return Err("logo source must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogoPatch {
    pub source: Option<String>,
    pub fit: Option<ImageFit>,
}
