//! Layer node model.
//!
//! A [`LayerNode`] carries the fields shared by every layer (id, transform,
//! opacity, flags) plus a tagged [`LayerContent`] payload. The payload kind is
//! fixed at creation: patches for a different kind are rejected rather than
//! retagging the node.

pub mod group;
pub mod icon;
pub mod logo;
pub mod shape;
pub mod text;

pub use group::{GroupLayer, GroupPatch};
pub use icon::{IconLayer, IconPatch, DEFAULT_ICON_SIZE};
pub use logo::{ImageFit, LogoLayer, LogoPatch};
pub use shape::{ShapeKind, ShapeLayer, ShapePatch};
pub use text::{TextAlign, TextLayer, TextPatch};

use cardkit_core::{DocumentError, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Layer kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerType {
    Text,
    Icon,
    Logo,
    Shape,
    Group,
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayerType::Text => "text",
            LayerType::Icon => "icon",
            LayerType::Logo => "logo",
            LayerType::Shape => "shape",
            LayerType::Group => "group",
        };
        f.write_str(name)
    }
}

/// Variant payload of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayerContent {
    Text(TextLayer),
    Icon(IconLayer),
    Logo(LogoLayer),
    Shape(ShapeLayer),
    Group(GroupLayer),
}

impl LayerContent {
    pub fn layer_type(&self) -> LayerType {
        match self {
            LayerContent::Text(_) => LayerType::Text,
            LayerContent::Icon(_) => LayerType::Icon,
            LayerContent::Logo(_) => LayerType::Logo,
            LayerContent::Shape(_) => LayerType::Shape,
            LayerContent::Group(_) => LayerType::Group,
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// One visual element of a design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerNode {
    /// Unique within a document. Empty until the document assigns one.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise, around the centre of the layer box.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub editable: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(flatten)]
    pub content: LayerContent,
}

impl LayerNode {
    pub fn new(content: LayerContent, x: f64, y: f64, width: f64, height: f64) -> Self {
        let name = match &content {
            LayerContent::Text(t) => t.text.lines().next().unwrap_or("Text").to_string(),
            LayerContent::Icon(i) => i.icon.clone(),
            other => {
                let mut name = other.layer_type().to_string();
                name[..1].make_ascii_uppercase();
                name
            }
        };
        Self {
            id: String::new(),
            name,
            x,
            y,
            width,
            height,
            rotation: 0.0,
            opacity: 1.0,
            visible: true,
            editable: true,
            locked: false,
            content,
        }
    }

    /// Text layer sized to its block: 200px wide, one line-height per line.
    pub fn text(text: impl Into<String>, x: f64, y: f64) -> Self {
        let layer = TextLayer::new(text);
        let height = layer.block_height();
        Self::new(LayerContent::Text(layer), x, y, 200.0, height)
    }

    /// Icon layer at the default 48x48 size.
    pub fn icon(icon: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(
            LayerContent::Icon(IconLayer::new(icon)),
            x,
            y,
            DEFAULT_ICON_SIZE,
            DEFAULT_ICON_SIZE,
        )
    }

    pub fn logo(source: impl Into<String>, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(LayerContent::Logo(LogoLayer::new(source)), x, y, width, height)
    }

    pub fn shape(kind: ShapeKind, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(LayerContent::Shape(ShapeLayer::new(kind)), x, y, width, height)
    }

    /// Group the given layers. The group box is the union of the children's
    /// bounds and the children are rebased into group-local coordinates.
    pub fn group(children: Vec<LayerNode>) -> Self {
        let bounds = children
            .iter()
            .map(|c| Rect::new(c.x, c.y, c.width, c.height))
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();

        let children = children
            .into_iter()
            .map(|mut c| {
                c.x -= bounds.x;
                c.y -= bounds.y;
                c
            })
            .collect();

        Self::new(
            LayerContent::Group(GroupLayer::new(children)),
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height,
        )
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn layer_type(&self) -> LayerType {
        self.content.layer_type()
    }

    /// Unrotated layer box in parent coordinates.
    pub fn frame(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// Axis-aligned bounding box of the rotated layer box.
    pub fn bounds(&self) -> Rect {
        let frame = self.frame();
        if self.rotation.rem_euclid(360.0).abs() < 1e-9 {
            return frame;
        }
        let (cx, cy) = frame.center();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        let ex = (hw * cos).abs() + (hh * sin).abs();
        let ey = (hw * sin).abs() + (hh * cos).abs();
        Rect::from_ltrb(cx - ex, cy - ey, cx + ex, cy + ey)
    }

    pub fn children(&self) -> &[LayerNode] {
        match &self.content {
            LayerContent::Group(g) => &g.children,
            _ => &[],
        }
    }

    /// Visit this node and all descendants, depth first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a LayerNode)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Give every node without an id (this one and descendants) a fresh UUID.
    pub fn assign_missing_ids(&mut self) {
        if self.id.trim().is_empty() {
            self.id = new_layer_id();
        }
        if let LayerContent::Group(g) = &mut self.content {
            for child in &mut g.children {
                child.assign_missing_ids();
            }
        }
    }

    /// Replace the id of this node and all descendants.
    pub fn regenerate_ids(&mut self) {
        self.id = new_layer_id();
        if let LayerContent::Group(g) = &mut self.content {
            for child in &mut g.children {
                child.regenerate_ids();
            }
        }
    }

    /// Check field ranges for this node and its children.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let fail = |msg: String| Err(DocumentError::validation(format!("layer '{}': {}", self.id, msg)));

        for (field, value) in [
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation),
        ] {
            if !value.is_finite() {
                return fail(format!("{} must be finite", field));
            }
        }
        if !(self.width.is_finite() && self.width >= 0.0 && self.height.is_finite() && self.height >= 0.0) {
            return fail(format!("invalid size {}x{}", self.width, self.height));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return fail(format!("opacity must be within 0..1, got {}", self.opacity));
        }

        let content = match &self.content {
            LayerContent::Text(t) => t.validate(),
            LayerContent::Icon(i) => i.validate(),
            LayerContent::Logo(l) => l.validate(),
            LayerContent::Shape(s) => s.validate(),
            LayerContent::Group(g) => {
                for child in &g.children {
                    child.validate()?;
                }
                Ok(())
            }
        };
        match content {
            Ok(()) => Ok(()),
            Err(msg) => fail(msg),
        }
    }

    /// Return a merged copy. The node itself is never touched.
    pub fn apply_patch(&self, patch: &LayerPatch) -> Result<LayerNode, DocumentError> {
        let mut next = self.clone();
        if let Some(name) = &patch.name {
            next.name = name.clone();
        }
        if let Some(x) = patch.x {
            next.x = x;
        }
        if let Some(y) = patch.y {
            next.y = y;
        }
        if let Some(width) = patch.width {
            next.width = width;
        }
        if let Some(height) = patch.height {
            next.height = height;
        }
        if let Some(rotation) = patch.rotation {
            next.rotation = rotation;
        }
        if let Some(opacity) = patch.opacity {
            next.opacity = opacity;
        }
        if let Some(visible) = patch.visible {
            next.visible = visible;
        }
        if let Some(editable) = patch.editable {
            next.editable = editable;
        }
        if let Some(locked) = patch.locked {
            next.locked = locked;
        }

        if let Some(content) = &patch.content {
            next.content = match (&self.content, content) {
                (LayerContent::Text(t), ContentPatch::Text(p)) => LayerContent::Text(t.apply(p)),
                (LayerContent::Icon(i), ContentPatch::Icon(p)) => LayerContent::Icon(i.apply(p)),
                (LayerContent::Logo(l), ContentPatch::Logo(p)) => LayerContent::Logo(l.apply(p)),
                (LayerContent::Shape(s), ContentPatch::Shape(p)) => LayerContent::Shape(s.apply(p)),
                (LayerContent::Group(g), ContentPatch::Group(p)) => LayerContent::Group(g.apply(p)),
                (actual, requested) => {
                    return Err(DocumentError::TypeMismatch {
                        id: self.id.clone(),
                        actual: actual.layer_type().to_string(),
                        requested: requested.layer_type().to_string(),
                    })
                }
            };
        }

        next.validate()?;
        Ok(next)
    }
}

/// Fresh layer id.
pub fn new_layer_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Content half of a [`LayerPatch`]; must match the node's kind.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPatch {
    Text(TextPatch),
    Icon(IconPatch),
    Logo(LogoPatch),
    Shape(ShapePatch),
    Group(GroupPatch),
}

impl ContentPatch {
    pub fn layer_type(&self) -> LayerType {
        match self {
            ContentPatch::Text(_) => LayerType::Text,
            ContentPatch::Icon(_) => LayerType::Icon,
            ContentPatch::Logo(_) => LayerType::Logo,
            ContentPatch::Shape(_) => LayerType::Shape,
            ContentPatch::Group(_) => LayerType::Group,
        }
    }
}

/// Partial update of a layer. `None` fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub visible: Option<bool>,
    pub editable: Option<bool>,
    pub locked: Option<bool>,
    pub content: Option<ContentPatch>,
}

impl LayerPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    pub fn size(width: f64, height: f64) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    pub fn content(content: ContentPatch) -> Self {
        Self {
            content: Some(content),
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the patch only toggles `locked` / `visible`, which is all
    /// a locked layer accepts.
    pub fn only_flags(&self) -> bool {
        Self {
            locked: None,
            visible: None,
            ..self.clone()
        }
        .is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardkit_core::Color;

    #[test]
    fn test_factory_defaults() {
        let icon = LayerNode::icon("phone", 10.0, 20.0);
        assert_eq!(icon.layer_type(), LayerType::Icon);
        assert_eq!((icon.width, icon.height), (48.0, 48.0));
        assert!(icon.id.is_empty());

        let text = LayerNode::text("Jane Doe\nDesigner", 0.0, 0.0);
        assert_eq!(text.name, "Jane Doe");
        assert!((text.height - 2.0 * 16.0 * 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_group_rebases_children() {
        let a = LayerNode::shape(ShapeKind::Ellipse, 10.0, 10.0, 20.0, 20.0);
        let b = LayerNode::shape(ShapeKind::Triangle, 40.0, 5.0, 10.0, 10.0);
        let group = LayerNode::group(vec![a, b]);
        assert_eq!(group.frame(), Rect::new(10.0, 5.0, 40.0, 25.0));
        assert_eq!((group.children()[0].x, group.children()[0].y), (0.0, 5.0));
        assert_eq!((group.children()[1].x, group.children()[1].y), (30.0, 0.0));
    }

    #[test]
    fn test_rotated_bounds() {
        let mut node = LayerNode::shape(ShapeKind::Ellipse, 0.0, 0.0, 100.0, 50.0);
        node.rotation = 90.0;
        let b = node.bounds();
        assert!((b.width - 50.0).abs() < 1e-9);
        assert!((b.height - 100.0).abs() < 1e-9);
        assert_eq!(b.center(), node.frame().center());
    }

    #[test]
    fn test_patch_merges_without_touching_original() {
        let node = LayerNode::text("Hello", 0.0, 0.0).with_id("t1");
        let patch = LayerPatch {
            x: Some(15.0),
            content: Some(ContentPatch::Text(TextPatch {
                color: Some(Color::rgb(255, 0, 0)),
                ..Default::default()
            })),
            ..Default::default()
        };
        let next = node.apply_patch(&patch).unwrap();
        assert_eq!(next.x, 15.0);
        assert_eq!(node.x, 0.0);
        match &next.content {
            LayerContent::Text(t) => {
                assert_eq!(t.color, Color::rgb(255, 0, 0));
                assert_eq!(t.text, "Hello");
            }
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn test_patch_kind_mismatch() {
        let node = LayerNode::icon("star", 0.0, 0.0).with_id("i1");
        let err = node
            .apply_patch(&LayerPatch::content(ContentPatch::Text(TextPatch::text("x"))))
            .unwrap_err();
        assert!(matches!(err, DocumentError::TypeMismatch { .. }));
    }

    #[test]
    fn test_patch_validation() {
        let node = LayerNode::icon("star", 0.0, 0.0).with_id("i1");
        assert!(node.apply_patch(&LayerPatch::new().with_opacity(1.5)).is_err());
        assert!(node.apply_patch(&LayerPatch::size(-1.0, 4.0)).is_err());
        let unknown = LayerPatch::content(ContentPatch::Icon(IconPatch {
            icon: Some("no-such-icon".into()),
            ..Default::default()
        }));
        assert!(node.apply_patch(&unknown).is_err());
    }

    #[test]
    fn test_ids_assigned_recursively() {
        let mut group = LayerNode::group(vec![
            LayerNode::icon("star", 0.0, 0.0),
            LayerNode::icon("heart", 50.0, 0.0).with_id("keep"),
        ]);
        group.assign_missing_ids();
        assert!(!group.id.is_empty());
        assert!(!group.children()[0].id.is_empty());
        assert_eq!(group.children()[1].id, "keep");

        let mut ids = Vec::new();
        group.walk(&mut |n| ids.push(n.id.clone()));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_json_shape() {
        let node = LayerNode::shape(ShapeKind::Star { points: 5, inner_ratio: 0.4 }, 1.0, 2.0, 3.0, 4.0)
            .with_id("s1");
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "shape");
        assert_eq!(value["geometry"]["kind"], "star");
        assert_eq!(value["fill"], "#cccccc");

        let back: LayerNode = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_only_flags() {
        assert!(LayerPatch::new().with_locked(false).only_flags());
        assert!(!LayerPatch::position(1.0, 1.0).with_locked(false).only_flags());
    }
}
