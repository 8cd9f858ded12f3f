//! Document renderer
//! Rasterizes a [`Document`] with tiny-skia for export and on-screen preview.
//!
//! Features:
//! - Anti-aliased shape, icon and glyph outlines
//! - Solid, gradient and tiled-pattern backgrounds
//! - Per-layer rotation around the layer centre and opacity
//! - Print guides (bleed, trim, safe zone) on the preview only
//!
//! Every image a document references must already be decoded into the
//! [`ImageCache`]; a missing entry fails the render instead of drawing an
//! empty box.

use cardkit_core::{Color, ExportError, PrintSpec};
use rusttype::{point as rt_point, Font, OutlineBuilder, Scale};
use tiny_skia::{
    FillRule, FilterQuality, GradientStop, LinearGradient, Paint, PathBuilder, Pattern, Pixmap,
    Point, Rect, SpreadMode, Stroke, StrokeDash, Transform,
};

use crate::assets::ImageCache;
use crate::background::{Background, BackgroundKind};
use crate::document::Document;
use crate::font_manager;
use crate::icons;
use crate::model::{
    IconLayer, LayerContent, LayerNode, LogoLayer, ShapeLayer, TextAlign, TextLayer,
};
use crate::overlay::PrintGuides;

fn pasteboard_color() -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(224, 224, 224, 255)
}
fn bleed_guide_color() -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(231, 76, 60, 255)
}
fn trim_guide_color() -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(44, 62, 80, 255)
}
fn safe_guide_color() -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(52, 152, 219, 255)
}

fn skia_color(color: Color, opacity: f64) -> tiny_skia::Color {
    let c = color.with_opacity(opacity);
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn solid_paint(color: Color, opacity: f64) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(skia_color(color, opacity));
    paint.anti_alias = true;
    paint
}

/// Pixel size of a `width` x `height` canvas rendered at `scale`.
pub fn scaled_size(width: f64, height: f64, scale: f64) -> (u32, u32) {
    let w = (width * scale).round().max(1.0) as u32;
    let h = (height * scale).round().max(1.0) as u32;
    (w, h)
}

pub(crate) fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, ExportError> {
    Pixmap::new(width, height).ok_or(ExportError::RenderContextUnavailable { width, height })
}

/// Render the document canvas (no bleed, no guides) at `scale` pixels per
/// canvas pixel.
pub fn render_document(
    doc: &Document,
    scale: f64,
    images: &ImageCache,
) -> Result<Pixmap, ExportError> {
    let (width, height) = scaled_size(doc.width, doc.height, scale);
    let mut pixmap = new_pixmap(width, height)?;
    let transform = Transform::from_scale(scale as f32, scale as f32);
    draw_document(&mut pixmap, doc, transform, images)?;
    Ok(pixmap)
}

/// Render for on-screen display: the canvas on a pasteboard wide enough
/// for the bleed, with bleed/trim/safe guides drawn on top.
pub fn render_preview(
    doc: &Document,
    spec: &PrintSpec,
    scale: f64,
    images: &ImageCache,
) -> Result<Pixmap, ExportError> {
    let guides = PrintGuides::compute(doc.width, doc.height, spec);
    // Pasteboard margin: the bleed plus a little air.
    let margin = guides.bleed_px + 8.0;
    let (width, height) = scaled_size(doc.width + 2.0 * margin, doc.height + 2.0 * margin, scale);
    let mut pixmap = new_pixmap(width, height)?;
    pixmap.fill(pasteboard_color());

    let origin = Transform::from_scale(scale as f32, scale as f32)
        .pre_translate(margin as f32, margin as f32);

    // Clip artwork to the trim box like the export does.
    let (canvas_w, canvas_h) = scaled_size(doc.width, doc.height, scale);
    let mut canvas = new_pixmap(canvas_w, canvas_h)?;
    draw_document(
        &mut canvas,
        doc,
        Transform::from_scale(scale as f32, scale as f32),
        images,
    )?;
    let offset = (margin * scale).round() as i32;
    pixmap.draw_pixmap(
        offset,
        offset,
        canvas.as_ref(),
        &tiny_skia::PixmapPaint::default(),
        Transform::identity(),
        None,
    );

    let hairline = (1.0 / scale) as f32;
    let dashed = Stroke {
        width: hairline,
        dash: StrokeDash::new(vec![4.0 * hairline, 3.0 * hairline], 0.0),
        ..Default::default()
    };
    let solid = Stroke {
        width: hairline,
        ..Default::default()
    };
    for (rect, color, stroke) in [
        (guides.bleed, bleed_guide_color(), &dashed),
        (guides.canvas, trim_guide_color(), &solid),
        (guides.safe, safe_guide_color(), &dashed),
    ] {
        let Some(r) = Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ) else {
            continue;
        };
        let path = PathBuilder::from_rect(r);
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = true;
        pixmap.stroke_path(&path, &paint, stroke, origin, None);
    }

    Ok(pixmap)
}

fn draw_document(
    pixmap: &mut Pixmap,
    doc: &Document,
    transform: Transform,
    images: &ImageCache,
) -> Result<(), ExportError> {
    draw_background(pixmap, &doc.background, doc.width, doc.height, transform, images)?;
    for layer in &doc.layers {
        draw_layer(pixmap, layer, transform, 1.0, images)?;
    }
    Ok(())
}

fn draw_background(
    pixmap: &mut Pixmap,
    background: &Background,
    width: f64,
    height: f64,
    transform: Transform,
    images: &ImageCache,
) -> Result<(), ExportError> {
    let Some(rect) = Rect::from_xywh(0.0, 0.0, width as f32, height as f32) else {
        return Ok(());
    };
    let opacity = background.opacity;

    match &background.kind {
        BackgroundKind::Solid { color } => {
            pixmap.fill_rect(rect, &solid_paint(*color, opacity), transform, None);
        }
        BackgroundKind::Gradient { colors, rotation } => {
            let (sin, cos) = rotation.to_radians().sin_cos();
            let (cx, cy) = (width / 2.0, height / 2.0);
            // Half the extent of the box projected on the gradient direction.
            let half = (cx * cos).abs() + (cy * sin).abs();
            let start = Point::from_xy((cx - cos * half) as f32, (cy - sin * half) as f32);
            let end = Point::from_xy((cx + cos * half) as f32, (cy + sin * half) as f32);
            let last = (colors.len().max(2) - 1) as f32;
            let stops = colors
                .iter()
                .enumerate()
                .map(|(i, c)| GradientStop::new(i as f32 / last, skia_color(*c, opacity)))
                .collect();
            let shader = LinearGradient::new(start, end, stops, SpreadMode::Pad, Transform::identity());
            let mut paint = Paint::default();
            paint.anti_alias = true;
            match shader {
                Some(shader) => paint.shader = shader,
                // Degenerate (e.g. identical endpoints): fall back to the first color.
                None => paint.set_color(skia_color(colors.first().copied().unwrap_or_default(), opacity)),
            }
            pixmap.fill_rect(rect, &paint, transform, None);
        }
        BackgroundKind::Pattern {
            base_color,
            image,
            scale,
        } => {
            pixmap.fill_rect(rect, &solid_paint(*base_color, opacity), transform, None);
            let tile = images.get(image).ok_or_else(|| {
                ExportError::RasterizationFailed(format!("background image not decoded: {}", image))
            })?;
            let paint = Paint {
                shader: Pattern::new(
                    tile.pixmap().as_ref(),
                    SpreadMode::Repeat,
                    FilterQuality::Bicubic,
                    opacity as f32,
                    Transform::from_scale(*scale as f32, *scale as f32),
                ),
                anti_alias: true,
                ..Default::default()
            };
            pixmap.fill_rect(rect, &paint, transform, None);
        }
    }
    Ok(())
}

fn draw_layer(
    pixmap: &mut Pixmap,
    layer: &LayerNode,
    parent: Transform,
    parent_opacity: f64,
    images: &ImageCache,
) -> Result<(), ExportError> {
    if !layer.visible {
        return Ok(());
    }
    let opacity = parent_opacity * layer.opacity;
    let mut transform = parent.pre_translate(layer.x as f32, layer.y as f32);
    if layer.rotation != 0.0 {
        transform = transform.pre_concat(Transform::from_rotate_at(
            layer.rotation as f32,
            (layer.width / 2.0) as f32,
            (layer.height / 2.0) as f32,
        ));
    }

    match &layer.content {
        LayerContent::Shape(shape) => draw_shape(pixmap, layer, shape, transform, opacity),
        LayerContent::Icon(icon) => draw_icon(pixmap, layer, icon, transform, opacity),
        LayerContent::Logo(logo) => draw_logo(pixmap, layer, logo, transform, opacity, images)?,
        LayerContent::Text(text) => draw_text(pixmap, layer, text, transform, opacity)?,
        LayerContent::Group(group) => {
            for child in &group.children {
                draw_layer(pixmap, child, transform, opacity, images)?;
            }
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn fill_and_stroke(
    pixmap: &mut Pixmap,
    path: &tiny_skia::Path,
    fill: Option<Color>,
    stroke: Option<Color>,
    stroke_width: f64,
    rule: FillRule,
    transform: Transform,
    opacity: f64,
) {
    if let Some(fill) = fill {
        pixmap.fill_path(path, &solid_paint(fill, opacity), rule, transform, None);
    }
    if let Some(stroke) = stroke {
        if stroke_width > 0.0 {
            let style = Stroke {
                width: stroke_width as f32,
                ..Default::default()
            };
            pixmap.stroke_path(path, &solid_paint(stroke, opacity), &style, transform, None);
        }
    }
}

fn draw_shape(
    pixmap: &mut Pixmap,
    layer: &LayerNode,
    shape: &ShapeLayer,
    transform: Transform,
    opacity: f64,
) {
    let Some(path) = shape.geometry.to_path(layer.width, layer.height) else {
        return;
    };
    let fill = if shape.geometry.is_open() { None } else { shape.fill };
    fill_and_stroke(
        pixmap,
        &path,
        fill,
        shape.stroke,
        shape.stroke_width,
        FillRule::Winding,
        transform,
        opacity,
    );
}

fn draw_icon(
    pixmap: &mut Pixmap,
    layer: &LayerNode,
    icon: &IconLayer,
    transform: Transform,
    opacity: f64,
) {
    let Some(path) = icons::icon_path(&icon.icon, layer.width, layer.height) else {
        tracing::warn!("Skipping unknown icon '{}' on layer {}", icon.icon, layer.id);
        return;
    };
    fill_and_stroke(
        pixmap,
        &path,
        Some(icon.fill),
        icon.stroke,
        icon.stroke_width,
        FillRule::EvenOdd,
        transform,
        opacity,
    );
}

fn draw_logo(
    pixmap: &mut Pixmap,
    layer: &LayerNode,
    logo: &LogoLayer,
    transform: Transform,
    opacity: f64,
    images: &ImageCache,
) -> Result<(), ExportError> {
    let image = images.get(&logo.source).ok_or_else(|| {
        ExportError::RasterizationFailed(format!("image not decoded: {}", logo.source))
    })?;
    let (iw, ih) = (image.width() as f64, image.height() as f64);
    let (dx, dy, dw, dh) = logo.fit.place(layer.width, layer.height, iw, ih);

    // Visible part: the placed image clipped to the layer box.
    let left = dx.max(0.0);
    let top = dy.max(0.0);
    let right = (dx + dw).min(layer.width);
    let bottom = (dy + dh).min(layer.height);
    let Some(clip) = Rect::from_ltrb(left as f32, top as f32, right as f32, bottom as f32) else {
        return Ok(());
    };

    let placement = Transform::from_row(
        (dw / iw) as f32,
        0.0,
        0.0,
        (dh / ih) as f32,
        dx as f32,
        dy as f32,
    );
    let paint = Paint {
        shader: Pattern::new(
            image.pixmap().as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bicubic,
            opacity as f32,
            placement,
        ),
        anti_alias: true,
        ..Default::default()
    };
    pixmap.fill_rect(clip, &paint, transform, None);
    Ok(())
}

/// Collects rusttype glyph outlines into a tiny-skia path, offset to the
/// glyph's pen position.
struct GlyphPath<'a> {
    builder: &'a mut PathBuilder,
    dx: f32,
    dy: f32,
}

impl OutlineBuilder for GlyphPath<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x + self.dx, y + self.dy);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x + self.dx, y + self.dy);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(x1 + self.dx, y1 + self.dy, x + self.dx, y + self.dy);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            x1 + self.dx,
            y1 + self.dy,
            x2 + self.dx,
            y2 + self.dy,
            x + self.dx,
            y + self.dy,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn draw_text(
    pixmap: &mut Pixmap,
    layer: &LayerNode,
    text: &TextLayer,
    transform: Transform,
    opacity: f64,
) -> Result<(), ExportError> {
    if text.text.trim().is_empty() {
        return Ok(());
    }
    let font = require_font(
        font_manager::get_font_for(&text.font_family, text.bold, text.italic),
        layer,
        text,
    )?;

    let scale = Scale::uniform(text.font_size as f32);
    let ascent = font.v_metrics(scale).ascent;
    let line_advance = (text.font_size * text.line_height) as f32;

    let mut pb = PathBuilder::new();
    for (i, line) in text.text.split('\n').enumerate() {
        let baseline = ascent + i as f32 * line_advance;
        let glyphs: Vec<_> = font.layout(line, scale, rt_point(0.0, baseline)).collect();
        let line_width = glyphs
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);
        let offset = match text.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (layer.width as f32 - line_width) / 2.0,
            TextAlign::Right => layer.width as f32 - line_width,
        };
        for glyph in &glyphs {
            let pos = glyph.position();
            let mut outline = GlyphPath {
                builder: &mut pb,
                dx: pos.x + offset,
                dy: pos.y,
            };
            glyph.unpositioned().build_outline(&mut outline);
        }
    }

    if let Some(path) = pb.finish() {
        pixmap.fill_path(
            &path,
            &solid_paint(text.color, opacity),
            FillRule::Winding,
            transform,
            None,
        );
    }
    Ok(())
}

/// A visible text layer without a usable face fails the render rather than
/// producing output with the text missing.
fn require_font<'f>(
    font: Option<&'f Font<'static>>,
    layer: &LayerNode,
    text: &TextLayer,
) -> Result<&'f Font<'static>, ExportError> {
    font.ok_or_else(|| {
        tracing::warn!("No font for text layer {} ('{}')", layer.id, text.font_family);
        ExportError::RasterizationFailed(format!(
            "no font available for '{}' (layer {})",
            text.font_family, layer.id
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;

    fn pixel(pixmap: &Pixmap, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let c = pixmap
            .pixel(x, y)
            .unwrap_or_else(|| panic!("pixel {},{} out of range", x, y))
            .demultiply();
        (c.red(), c.green(), c.blue(), c.alpha())
    }

    #[test]
    fn test_background_and_shape() {
        let mut shape = LayerNode::shape(
            ShapeKind::Rectangle { corner_radius: 0.0 },
            10.0,
            10.0,
            20.0,
            20.0,
        );
        if let LayerContent::Shape(s) = &mut shape.content {
            s.fill = Some(Color::rgb(255, 0, 0));
        }
        let doc = Document::new("t", 100.0, 50.0)
            .unwrap()
            .with_layer_added(shape)
            .unwrap()
            .0;

        let pixmap = render_document(&doc, 2.0, &ImageCache::new()).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (200, 100));
        assert_eq!(pixel(&pixmap, 2, 2), (255, 255, 255, 255));
        assert_eq!(pixel(&pixmap, 40, 40), (255, 0, 0, 255));
    }

    #[test]
    fn test_hidden_layers_are_skipped() {
        let mut shape = LayerNode::shape(ShapeKind::Ellipse, 0.0, 0.0, 100.0, 50.0);
        shape.visible = false;
        let doc = Document::new("t", 100.0, 50.0)
            .unwrap()
            .with_layer_added(shape)
            .unwrap()
            .0;
        let pixmap = render_document(&doc, 1.0, &ImageCache::new()).unwrap();
        assert_eq!(pixel(&pixmap, 50, 25), (255, 255, 255, 255));
    }

    #[test]
    fn test_missing_image_fails() {
        let doc = Document::new("t", 100.0, 50.0)
            .unwrap()
            .with_layer_added(LayerNode::logo("asset://nope/x.png", 0.0, 0.0, 10.0, 10.0))
            .unwrap()
            .0;
        assert!(matches!(
            render_document(&doc, 1.0, &ImageCache::new()),
            Err(ExportError::RasterizationFailed(_))
        ));
    }

    #[test]
    fn test_text_without_font_fails() {
        let layer = LayerNode::text("Jane Doe", 0.0, 0.0).with_id("name");
        let LayerContent::Text(text) = &layer.content else {
            panic!("text factory built {:?}", layer.layer_type());
        };
        let err = require_font(None, &layer, text).unwrap_err();
        assert!(matches!(err, ExportError::RasterizationFailed(ref m) if m.contains("name")));
    }

    #[test]
    fn test_blank_text_needs_no_font() {
        let mut pixmap = new_pixmap(10, 10).unwrap();
        let layer = LayerNode::text("   ", 0.0, 0.0);
        let LayerContent::Text(text) = &layer.content else {
            panic!("text factory built {:?}", layer.layer_type());
        };
        assert!(draw_text(&mut pixmap, &layer, text, Transform::identity(), 1.0).is_ok());
    }

    #[test]
    fn test_gradient_runs_between_colors() {
        let doc = Document::new("t", 100.0, 10.0)
            .unwrap()
            .with_background(Background::gradient(
                vec![Color::rgb(0, 0, 0), Color::rgb(255, 255, 255)],
                0.0,
            ))
            .unwrap();
        let pixmap = render_document(&doc, 1.0, &ImageCache::new()).unwrap();
        let (left, ..) = pixel(&pixmap, 1, 5);
        let (right, ..) = pixel(&pixmap, 98, 5);
        assert!(left < 20 && right > 235, "left={} right={}", left, right);
    }

    #[test]
    fn test_preview_is_larger_than_canvas() {
        let doc = Document::business_card();
        let preview = render_preview(&doc, &PrintSpec::default(), 1.0, &ImageCache::new()).unwrap();
        assert!(preview.width() > 252 && preview.height() > 144);
        // Pasteboard corner.
        assert_eq!(pixel(&preview, 0, 0), (224, 224, 224, 255));
    }
}
