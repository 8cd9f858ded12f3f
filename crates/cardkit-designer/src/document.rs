//! The design document: canvas size, ordered layers and one background.
//!
//! Edits are expressed as pure `with_*` operations returning a new
//! [`Document`]; the receiver is never modified. [`crate::DesignerState`]
//! commits the results into history.

use cardkit_core::units::{mm_to_pixels, pixels_to_mm, BASE_SCREEN_DPI};
use cardkit_core::{DocumentError, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::background::Background;
use crate::model::{LayerContent, LayerNode, LayerPatch};

/// Business card trim size in canvas pixels (3.5in x 2in at 72 DPI).
pub const BUSINESS_CARD_WIDTH: f64 = 252.0;
pub const BUSINESS_CARD_HEIGHT: f64 = 144.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    #[default]
    Landscape,
}

impl Orientation {
    pub fn for_size(width: f64, height: f64) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    /// Canvas width in pixels at the base screen DPI.
    pub width: f64,
    /// Canvas height in pixels at the base screen DPI.
    pub height: f64,
    pub orientation: Orientation,
    /// Bottom to top.
    #[serde(default)]
    pub layers: Vec<LayerNode>,
    #[serde(default)]
    pub background: Background,
}

impl Default for Document {
    fn default() -> Self {
        Self::business_card()
    }
}

fn check_dimensions(width: f64, height: f64) -> Result<(), DocumentError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(DocumentError::InvalidDimensions { width, height })
    }
}

impl Document {
    /// Blank document; rejects non-positive or non-finite sizes.
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Result<Self, DocumentError> {
        check_dimensions(width, height)?;
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            width,
            height,
            orientation: Orientation::for_size(width, height),
            layers: Vec::new(),
            background: Background::default(),
        })
    }

    /// Blank document sized in millimeters, laid out at `dpi`.
    pub fn from_mm(
        name: impl Into<String>,
        width_mm: f64,
        height_mm: f64,
        dpi: f64,
    ) -> Result<Self, DocumentError> {
        Self::new(name, mm_to_pixels(width_mm, dpi), mm_to_pixels(height_mm, dpi))
    }

    pub fn business_card() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            width: BUSINESS_CARD_WIDTH,
            height: BUSINESS_CARD_HEIGHT,
            orientation: Orientation::Landscape,
            layers: Vec::new(),
            background: Background::default(),
        }
    }

    pub fn canvas_rect(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Trim size in millimeters at the base screen DPI.
    pub fn size_mm(&self) -> (f64, f64) {
        (
            pixels_to_mm(self.width, BASE_SCREEN_DPI),
            pixels_to_mm(self.height, BASE_SCREEN_DPI),
        )
    }

    pub fn layer_index(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Top-level layer by id.
    pub fn layer(&self, id: &str) -> Option<&LayerNode> {
        self.layers.iter().find(|l| l.id == id)
    }

    /// Layer by id at any depth.
    pub fn find_layer(&self, id: &str) -> Option<&LayerNode> {
        let mut found = None;
        for layer in &self.layers {
            layer.walk(&mut |n| {
                if found.is_none() && n.id == id {
                    found = Some(n);
                }
            });
        }
        found
    }

    /// Every layer id in the document, including group children.
    pub fn layer_ids(&self) -> HashSet<&str> {
        let mut ids = HashSet::new();
        for layer in &self.layers {
            layer.walk(&mut |n| {
                ids.insert(n.id.as_str());
            });
        }
        ids
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Image references that must be decoded before export: the background
    /// pattern and logo sources of visible layers at any depth. Hidden
    /// layers and everything inside hidden groups are never drawn.
    pub fn image_refs(&self) -> Vec<String> {
        let mut refs: Vec<String> = Vec::new();
        if let Some(image) = self.background.image_ref() {
            refs.push(image.to_string());
        }
        for layer in &self.layers {
            collect_visible_images(layer, &mut refs);
        }
        refs
    }

    /// Check dimensions, background, layer fields and id uniqueness.
    pub fn validate(&self) -> Result<(), DocumentError> {
        check_dimensions(self.width, self.height)?;
        self.background.validate()?;

        let mut seen = HashSet::new();
        for layer in &self.layers {
            layer.validate()?;
            let mut dup = None;
            layer.walk(&mut |n| {
                if n.id.is_empty() {
                    dup.get_or_insert_with(|| "layer without id".to_string());
                } else if !seen.insert(n.id.clone()) {
                    dup.get_or_insert_with(|| format!("duplicate layer id '{}'", n.id));
                }
            });
            if let Some(msg) = dup {
                return Err(DocumentError::validation(msg));
            }
        }
        Ok(())
    }

    /// Append `node` on top. Missing ids are generated; ids already in use are
    /// rejected.
    pub fn with_layer_added(&self, mut node: LayerNode) -> Result<(Document, String), DocumentError> {
        node.assign_missing_ids();
        node.validate()?;

        let existing = self.layer_ids();
        let mut incoming = HashSet::new();
        let mut clash = None;
        node.walk(&mut |n| {
            if existing.contains(n.id.as_str()) || !incoming.insert(n.id.clone()) {
                clash.get_or_insert_with(|| n.id.clone());
            }
        });
        if let Some(id) = clash {
            return Err(DocumentError::validation(format!(
                "layer id '{}' is already in use",
                id
            )));
        }

        let id = node.id.clone();
        let mut next = self.clone();
        next.layers.push(node);
        Ok((next, id))
    }

    /// Replace the top-level layer `id` with its patched copy.
    pub fn with_layer_updated(&self, id: &str, patch: &LayerPatch) -> Result<Document, DocumentError> {
        let index = self
            .layer_index(id)
            .ok_or_else(|| DocumentError::not_found(id))?;
        let current = &self.layers[index];

        if current.locked && !patch.only_flags() {
            return Err(DocumentError::validation(format!("layer '{}' is locked", id)));
        }
        if !current.editable && patch.content.is_some() {
            return Err(DocumentError::validation(format!(
                "layer '{}' content is not editable",
                id
            )));
        }

        let mut updated = current.apply_patch(patch)?;
        if let LayerContent::Group(_) = &updated.content {
            // Replacement children may arrive without ids.
            updated.assign_missing_ids();
            let others: HashSet<&str> = self
                .layers
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .flat_map(|(_, l)| {
                    let mut ids = Vec::new();
                    l.walk(&mut |n| ids.push(n.id.as_str()));
                    ids
                })
                .collect();
            let mut seen = HashSet::new();
            let mut clash = None;
            updated.walk(&mut |n| {
                if others.contains(n.id.as_str()) || !seen.insert(n.id.clone()) {
                    clash.get_or_insert_with(|| n.id.clone());
                }
            });
            if let Some(id) = clash {
                return Err(DocumentError::validation(format!(
                    "layer id '{}' is already in use",
                    id
                )));
            }
        }

        let mut next = self.clone();
        next.layers[index] = updated;
        Ok(next)
    }

    pub fn with_layer_removed(&self, id: &str) -> Result<(Document, LayerNode), DocumentError> {
        let index = self
            .layer_index(id)
            .ok_or_else(|| DocumentError::not_found(id))?;
        let mut next = self.clone();
        let removed = next.layers.remove(index);
        Ok((next, removed))
    }

    /// Move layer `id` to `new_index`, clamped to the layer range. Returns the
    /// index actually used.
    pub fn with_layer_moved(&self, id: &str, new_index: usize) -> Result<(Document, usize), DocumentError> {
        let index = self
            .layer_index(id)
            .ok_or_else(|| DocumentError::not_found(id))?;
        let target = new_index.min(self.layers.len().saturating_sub(1));
        let mut next = self.clone();
        let node = next.layers.remove(index);
        next.layers.insert(target, node);
        Ok((next, target))
    }

    pub fn with_background(&self, background: Background) -> Result<Document, DocumentError> {
        background.validate()?;
        let mut next = self.clone();
        next.background = background;
        Ok(next)
    }

    /// Swap width and height when the orientation actually changes.
    pub fn with_orientation(&self, orientation: Orientation) -> Document {
        let mut next = self.clone();
        if next.orientation != orientation {
            std::mem::swap(&mut next.width, &mut next.height);
            next.orientation = orientation;
        }
        next
    }

    pub fn with_name(&self, name: impl Into<String>) -> Document {
        let mut next = self.clone();
        next.name = name.into();
        next
    }
}

fn collect_visible_images(node: &LayerNode, refs: &mut Vec<String>) {
    if !node.visible {
        return;
    }
    match &node.content {
        LayerContent::Logo(logo) => {
            if !refs.contains(&logo.source) {
                refs.push(logo.source.clone());
            }
        }
        LayerContent::Group(group) => {
            for child in &group.children {
                collect_visible_images(child, refs);
            }
        }
        _ => {}
    }
}
