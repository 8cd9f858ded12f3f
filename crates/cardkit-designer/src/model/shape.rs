use cardkit_core::Color;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use tiny_skia::{Path, PathBuilder, Rect};

use crate::path_data;

/// Geometry of a shape layer, in layer-local coordinates (`0..width`, `0..height`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    Rectangle {
        #[serde(default)]
        corner_radius: f64,
    },
    Ellipse,
    Triangle,
    /// Horizontal rule through the middle of the box.
    Line,
    Polygon {
        sides: u32,
    },
    Star {
        points: u32,
        inner_ratio: f64,
    },
    Path {
        data: String,
    },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Triangle => "triangle",
            ShapeKind::Line => "line",
            ShapeKind::Polygon { .. } => "polygon",
            ShapeKind::Star { .. } => "star",
            ShapeKind::Path { .. } => "path",
        }
    }

    /// Whether the outline is open (stroke only).
    pub fn is_open(&self) -> bool {
        matches!(self, ShapeKind::Line)
    }

    /// Build the outline for a `width` x `height` box.
    pub fn to_path(&self, width: f64, height: f64) -> Option<Path> {
        let (w, h) = (width as f32, height as f32);
        match self {
            ShapeKind::Rectangle { corner_radius } => {
                let r = (*corner_radius as f32).min(w / 2.0).min(h / 2.0).max(0.0);
                if r <= f32::EPSILON {
                    Rect::from_xywh(0.0, 0.0, w, h).map(PathBuilder::from_rect)
                } else {
                    rounded_rect(w, h, r)
                }
            }
            ShapeKind::Ellipse => Rect::from_xywh(0.0, 0.0, w, h).and_then(PathBuilder::from_oval),
            ShapeKind::Triangle => {
                polyline(&[(w / 2.0, 0.0), (w, h), (0.0, h)], true)
            }
            ShapeKind::Line => polyline(&[(0.0, h / 2.0), (w, h / 2.0)], false),
            ShapeKind::Polygon { sides } => {
                let pts: Vec<_> = (0..*sides)
                    .map(|i| radial(w, h, i as f32 / *sides as f32, 1.0))
                    .collect();
                polyline(&pts, true)
            }
            ShapeKind::Star {
                points,
                inner_ratio,
            } => {
                let n = points * 2;
                let pts: Vec<_> = (0..n)
                    .map(|i| {
                        let r = if i % 2 == 0 { 1.0 } else { *inner_ratio as f32 };
                        radial(w, h, i as f32 / n as f32, r)
                    })
                    .collect();
                polyline(&pts, true)
            }
            ShapeKind::Path { data } => path_data::parse(data).ok(),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            ShapeKind::Rectangle { corner_radius } if !(corner_radius.is_finite() && *corner_radius >= 0.0) => {
                Err(format!("invalid corner radius {}", corner_radius))
            }
            ShapeKind::Polygon { sides } if *sides < 3 => {
                Err(format!("polygon needs at least 3 sides, got {}", sides))
            }
            ShapeKind::Star { points, .. } if *points < 3 => {
                Err(format!("star needs at least 3 points, got {}", points))
            }
            ShapeKind::Star { inner_ratio, .. } if !(*inner_ratio > 0.0 && *inner_ratio < 1.0) => {
                Err(format!("star inner ratio must be in (0, 1), got {}", inner_ratio))
            }
            ShapeKind::Path { data } => path_data::parse(data)
                .map(|_| ())
                .map_err(|e| format!("invalid path data: {}", e)),
            _ => Ok(()),
        }
    }
}

// Point on the ellipse inscribed in the box; `t` is the fraction of a turn
// starting at twelve o'clock.
fn radial(w: f32, h: f32, t: f32, r: f32) -> (f32, f32) {
    let angle = t * 2.0 * PI - PI / 2.0;
    (
        w / 2.0 + angle.cos() * w / 2.0 * r,
        h / 2.0 + angle.sin() * h / 2.0 * r,
    )
}

fn polyline(points: &[(f32, f32)], closed: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.0, first.1);
    for p in rest {
        pb.line_to(p.0, p.1);
    }
    if closed {
        pb.close();
    }
    pb.finish()
}

fn rounded_rect(w: f32, h: f32, r: f32) -> Option<Path> {
    // Cubic approximation of a quarter circle.
    let k = r * 0.552_284_8;
    let mut pb = PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(w - r, 0.0);
    pb.cubic_to(w - r + k, 0.0, w, r - k, w, r);
    pb.line_to(w, h - r);
    pb.cubic_to(w, h - r + k, w - r + k, h, w - r, h);
    pb.line_to(r, h);
    pb.cubic_to(r - k, h, 0.0, h - r + k, 0.0, h - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeLayer {
    pub geometry: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Color>,
    #[serde(default)]
    pub stroke_width: f64,
}

impl ShapeLayer {
    pub fn new(geometry: ShapeKind) -> Self {
        let (fill, stroke, stroke_width) = if geometry.is_open() {
            (None, Some(Color::BLACK), 2.0)
        } else {
            (Some(Color::rgb(0xcc, 0xcc, 0xcc)), None, 0.0)
        };
        Self {
            geometry,
            fill,
            stroke,
            stroke_width,
        }
    }

    pub(crate) fn apply(&self, patch: &ShapePatch) -> Self {
        let mut next = self.clone();
        if let Some(geometry) = &patch.geometry {
            next.geometry = geometry.clone();
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
        if !(self.stroke_width.is_finite() && self.stroke_width >= 0.0) {
            return Err(format!("invalid stroke width {}", self.stroke_width));
        }
        self.geometry.validate()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapePatch {
    pub geometry: Option<ShapeKind>,
    /// `Some(None)` clears the fill.
    pub fill: Option<Option<Color>>,
    /// `Some(None)` clears the stroke.
    pub stroke: Option<Option<Color>>,
    pub stroke_width: Option<f64>,
}
