//! Print export pipeline.
//!
//! Produces PNG, JPEG or single-page PDF bytes for a document at a target
//! DPI with a bleed border:
//!
//! 1. `pixel_ratio = dpi / base_dpi`, `bleed_px = mm_to_pixels(bleed_mm, dpi)`
//! 2. output size `round(doc * ratio + 2 * bleed_px)` per axis
//! 3. every referenced image is fetched and decoded (the only await point)
//! 4. the artwork is rasterized at `pixel_ratio` and drawn at
//!    `round(bleed_px)` on a canvas filled with the bleed background
//! 5. the canvas is encoded
//!
//! Either a complete [`ExportOutput`] is returned or an [`ExportError`];
//! document state is never touched.

use cardkit_core::units::{mm_to_pixels, pixel_ratio};
use cardkit_core::{format_file_size, Color, ExportError, ExportFormat, PrintSpec, ValidationError};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tiny_skia::{Pixmap, PixmapPaint, Transform};

use crate::assets::{resolve_images, AssetSource, ImageCache};
use crate::designer_state::RevisionGuard;
use crate::document::Document;
use crate::renderer::{new_pixmap, render_document};

pub const DEFAULT_JPEG_QUALITY: u8 = 92;

/// What to export and how.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub print: PrintSpec,
    /// Fill for the bleed border behind the artwork.
    pub background: Color,
    /// 1..=100, JPEG only.
    pub jpeg_quality: u8,
    /// Overrides the file name derived from the document name.
    pub file_stem: Option<String>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Png,
            print: PrintSpec::default(),
            background: Color::WHITE,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            file_stem: None,
        }
    }
}

impl ExportOptions {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            ..Default::default()
        }
    }

    pub fn with_print_spec(mut self, print: PrintSpec) -> Self {
        self.print = print;
        self
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.print.validate()?;
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ValidationError::new(format!(
                "JPEG quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

/// Page orientation of a PDF export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrientation {
    Portrait,
    Landscape,
}

/// Pixel geometry of an export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportGeometry {
    pub pixel_ratio: f64,
    pub bleed_px: f64,
    /// Output width including bleed.
    pub width: u32,
    /// Output height including bleed.
    pub height: u32,
    /// Where the artwork's top-left corner lands, on both axes.
    pub artwork_offset: i32,
}

impl ExportGeometry {
    pub fn compute(doc_width: f64, doc_height: f64, spec: &PrintSpec) -> Self {
        let ratio = pixel_ratio(spec.dpi, spec.base_dpi);
        let bleed_px = mm_to_pixels(spec.bleed_mm, spec.dpi);
        Self {
            pixel_ratio: ratio,
            bleed_px,
            width: (doc_width * ratio + 2.0 * bleed_px).round().max(1.0) as u32,
            height: (doc_height * ratio + 2.0 * bleed_px).round().max(1.0) as u32,
            artwork_offset: bleed_px.round() as i32,
        }
    }

    pub fn orientation(&self) -> PageOrientation {
        if self.width > self.height {
            PageOrientation::Landscape
        } else {
            PageOrientation::Portrait
        }
    }
}

/// A finished export.
#[derive(Clone)]
pub struct ExportOutput {
    pub bytes: Vec<u8>,
    pub format: ExportFormat,
    pub width: u32,
    pub height: u32,
    pub mime_type: &'static str,
    /// Suggested download name, e.g. `untitled-300dpi.png`.
    pub filename: String,
}

impl std::fmt::Debug for ExportOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportOutput")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .field("filename", &self.filename)
            .finish()
    }
}

/// Lowercase, dash-separated file stem from a design name.
pub fn file_stem_for(name: &str) -> String {
    let mut stem = String::new();
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') && !stem.is_empty() {
            stem.push('-');
        }
    }
    let stem = stem.trim_end_matches('-');
    if stem.is_empty() {
        "design".to_string()
    } else {
        stem.to_string()
    }
}

/// Runs exports against an image source.
#[derive(Clone)]
pub struct ExportPipeline {
    assets: Arc<dyn AssetSource>,
}

impl ExportPipeline {
    pub fn new(assets: Arc<dyn AssetSource>) -> Self {
        Self { assets }
    }

    /// Export `doc`. When `guard` is given and the editor moved on while
    /// images were decoding, the result is discarded with
    /// [`ExportError::Superseded`].
    pub async fn export(
        &self,
        doc: &Document,
        options: &ExportOptions,
        guard: Option<&RevisionGuard>,
    ) -> Result<ExportOutput, ExportError> {
        options.validate()?;
        let started = Instant::now();

        let images = resolve_images(self.assets.as_ref(), &doc.image_refs()).await?;
        if guard.is_some_and(|g| !g.is_current()) {
            tracing::info!("Discarding export of '{}': document changed", doc.name);
            return Err(ExportError::Superseded);
        }

        let doc = doc.clone();
        let opts = options.clone();
        let output = tokio::task::spawn_blocking(move || export_with_images(&doc, &opts, &images))
            .await
            .map_err(|e| ExportError::RasterizationFailed(e.to_string()))??;

        tracing::info!(
            "Exported {}x{} {} ({}) in {:?}",
            output.width,
            output.height,
            output.format,
            format_file_size(output.bytes.len() as f64),
            started.elapsed()
        );
        Ok(output)
    }
}

/// Synchronous export with images already decoded.
pub fn export_with_images(
    doc: &Document,
    options: &ExportOptions,
    images: &ImageCache,
) -> Result<ExportOutput, ExportError> {
    options.validate()?;
    let geometry = ExportGeometry::compute(doc.width, doc.height, &options.print);
    let canvas = compose_with_bleed(doc, &geometry, options.background, images)?;

    let bytes = match options.format {
        ExportFormat::Png => encode_png(&canvas)?,
        ExportFormat::Jpeg => encode_jpeg(&canvas, options.jpeg_quality)?,
        ExportFormat::Pdf => encode_pdf(&canvas)?,
    };

    let stem = options
        .file_stem
        .clone()
        .unwrap_or_else(|| file_stem_for(&doc.name));
    Ok(ExportOutput {
        bytes,
        format: options.format,
        width: geometry.width,
        height: geometry.height,
        mime_type: options.format.mime_type(),
        filename: format!(
            "{}-{}dpi.{}",
            stem,
            options.print.dpi.round() as u32,
            options.format.extension()
        ),
    })
}

/// Rasterize the artwork and center it on a bleed canvas.
pub fn compose_with_bleed(
    doc: &Document,
    geometry: &ExportGeometry,
    background: Color,
    images: &ImageCache,
) -> Result<Pixmap, ExportError> {
    let mut canvas = new_pixmap(geometry.width, geometry.height)?;
    let c = background;
    canvas.fill(tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a));

    let artwork = render_document(doc, geometry.pixel_ratio, images)?;
    canvas.draw_pixmap(
        geometry.artwork_offset,
        geometry.artwork_offset,
        artwork.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(canvas)
}

fn encoding_error(format: ExportFormat, reason: impl ToString) -> ExportError {
    ExportError::Encoding {
        format: format.to_string(),
        reason: reason.to_string(),
    }
}

/// Straight-alpha RGBA bytes.
fn rgba_bytes(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

/// RGB bytes flattened over white.
fn rgb_bytes(pixmap: &Pixmap) -> Vec<u8> {
    let mut out = Vec::with_capacity(pixmap.width() as usize * pixmap.height() as usize * 3);
    for px in pixmap.pixels() {
        let under = 255 - px.alpha();
        out.extend_from_slice(&[px.red() + under, px.green() + under, px.blue() + under]);
    }
    out
}

pub fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            &rgba_bytes(pixmap),
            pixmap.width(),
            pixmap.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| encoding_error(ExportFormat::Png, e))?;
    Ok(out)
}

pub fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> Result<Vec<u8>, ExportError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .write_image(
            &rgb_bytes(pixmap),
            pixmap.width(),
            pixmap.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| encoding_error(ExportFormat::Jpeg, e))?;
    Ok(out)
}

/// Single page, MediaBox = pixel size, one full-bleed RGB image.
pub fn encode_pdf(pixmap: &Pixmap) -> Result<Vec<u8>, ExportError> {
    let err = |e: std::io::Error| encoding_error(ExportFormat::Pdf, e);
    let (width, height) = (pixmap.width(), pixmap.height());

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&rgb_bytes(pixmap)).map_err(err)?;
    let compressed = encoder.finish().map_err(err)?;

    let mut document = lopdf::Document::with_version("1.5");
    let pages_id = document.new_object_id();

    let image = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        compressed,
    );
    let image_id = document.add_object(image);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (width as i64).into(),
                    0.into(),
                    0.into(),
                    (height as i64).into(),
                    0.into(),
                    0.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let encoded = content
        .encode()
        .map_err(|e| encoding_error(ExportFormat::Pdf, e))?;
    let content_id = document.add_object(Stream::new(dictionary! {}, encoded));

    let page_id = document.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), (width as i64).into(), (height as i64).into()],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    document
        .save_to(&mut out)
        .map_err(|e| encoding_error(ExportFormat::Pdf, e))?;
    Ok(out)
}
