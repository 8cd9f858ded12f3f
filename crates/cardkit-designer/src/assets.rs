//! Image assets: ingestion, fetching and decoding.
//!
//! Layers refer to images by a reference string. [`AssetSource`] turns that
//! string into bytes, and [`resolve_images`] fetches and decodes every
//! reference a document needs before anything is drawn. Decoding runs on the
//! blocking pool.

use async_trait::async_trait;
use base64::Engine;
use cardkit_core::ExportError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tiny_skia::{ColorU8, Pixmap};
use tokio::task::JoinSet;

/// Scheme prefix of references handed out by [`AssetLibrary::ingest`].
pub const ASSET_SCHEME: &str = "asset://";

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid data URL: {0}")]
    InvalidDataUrl(String),

    #[error("Unsupported asset reference: {0}")]
    Unsupported(String),

    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image too large to rasterize: {0}x{1}")]
    TooLarge(u32, u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded image ready for compositing (premultiplied RGBA).
#[derive(Clone)]
pub struct DecodedImage {
    pixmap: Pixmap,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

/// Decode PNG/JPEG/... bytes synchronously.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, AssetError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(AssetError::TooLarge(width, height))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(DecodedImage { pixmap })
}

/// Decode on the blocking pool.
pub async fn decode_image_async(bytes: Vec<u8>) -> Result<DecodedImage, AssetError> {
    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|e| AssetError::Io(std::io::Error::other(e)))?
}

/// Resolves image reference strings into raw bytes.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, AssetError>;
}

/// Decode a `data:<mime>;base64,<payload>` URL.
pub fn decode_data_url(reference: &str) -> Result<Vec<u8>, AssetError> {
    let rest = reference
        .strip_prefix("data:")
        .ok_or_else(|| AssetError::InvalidDataUrl("missing data: prefix".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| AssetError::InvalidDataUrl("missing ',' separator".into()))?;
    if !meta.ends_with(";base64") {
        return Err(AssetError::InvalidDataUrl(
            "only base64 data URLs are supported".into(),
        ));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| AssetError::InvalidDataUrl(e.to_string()))
}

/// Build a `data:` URL for `bytes`.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

#[derive(Debug, Clone)]
struct StoredAsset {
    filename: String,
    bytes: Arc<Vec<u8>>,
}

/// In-process file ingestion collaborator.
///
/// Uploaded blobs get an `asset://<uuid>/<name>` reference. The same library
/// also resolves `data:` URLs and plain file paths (relative ones against
/// `base_dir` when set).
#[derive(Debug, Default)]
pub struct AssetLibrary {
    assets: RwLock<HashMap<String, StoredAsset>>,
    base_dir: Option<PathBuf>,
}

impl AssetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets: RwLock::new(HashMap::new()),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Store a blob and return its reference.
    pub fn ingest(&self, bytes: Vec<u8>, filename: &str) -> String {
        let name = sanitize_filename(filename);
        let reference = format!("{}{}/{}", ASSET_SCHEME, uuid::Uuid::new_v4(), name);
        tracing::debug!(reference = %reference, size = bytes.len(), "ingested asset");
        self.assets.write().insert(
            reference.clone(),
            StoredAsset {
                filename: name,
                bytes: Arc::new(bytes),
            },
        );
        reference
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.assets.read().contains_key(reference)
    }

    /// Sanitized filename recorded at ingestion.
    pub fn filename(&self, reference: &str) -> Option<String> {
        self.assets.read().get(reference).map(|a| a.filename.clone())
    }

    pub fn remove(&self, reference: &str) -> bool {
        self.assets.write().remove(reference).is_some()
    }

    pub fn len(&self) -> usize {
        self.assets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.read().is_empty()
    }
}

#[async_trait]
impl AssetSource for AssetLibrary {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, AssetError> {
        if reference.starts_with(ASSET_SCHEME) {
            let stored = self.assets.read().get(reference).map(|a| Arc::clone(&a.bytes));
            return stored
                .map(|b| b.as_ref().clone())
                .ok_or_else(|| AssetError::NotFound(reference.to_string()));
        }
        if reference.starts_with("data:") {
            return decode_data_url(reference);
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Err(AssetError::Unsupported(reference.to_string()));
        }

        let path = PathBuf::from(reference.strip_prefix("file://").unwrap_or(reference));
        let path = match (&self.base_dir, path.is_relative()) {
            (Some(base), true) => base.join(path),
            _ => path,
        };
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AssetError::NotFound(reference.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Decoded images keyed by reference.
#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    images: HashMap<String, Arc<DecodedImage>>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, reference: impl Into<String>, image: DecodedImage) {
        self.images.insert(reference.into(), Arc::new(image));
    }

    pub fn get(&self, reference: &str) -> Option<&DecodedImage> {
        self.images.get(reference).map(Arc::as_ref)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.images.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Fetch and decode every reference. Any failure fails the whole batch with
/// [`ExportError::RasterizationFailed`]; nothing is partially returned.
pub async fn resolve_images(
    source: &dyn AssetSource,
    references: &[String],
) -> Result<ImageCache, ExportError> {
    let mut decodes = JoinSet::new();
    for reference in references {
        let bytes = source.fetch(reference).await.map_err(|e| {
            ExportError::RasterizationFailed(format!("{}: {}", reference, e))
        })?;
        let reference = reference.clone();
        decodes.spawn(async move {
            let decoded = decode_image_async(bytes).await;
            (reference, decoded)
        });
    }

    let mut cache = ImageCache::new();
    while let Some(joined) = decodes.join_next().await {
        let (reference, decoded) =
            joined.map_err(|e| ExportError::RasterizationFailed(e.to_string()))?;
        let image = decoded
            .map_err(|e| ExportError::RasterizationFailed(format!("{}: {}", reference, e)))?;
        tracing::debug!(
            reference = %reference,
            width = image.width(),
            height = image.height(),
            "decoded image"
        );
        cache.insert(reference, image);
    }
    Ok(cache)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 128]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Logo (final).png"), "My_Logo__final_.png");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("..."), "file");
    }

    #[test]
    fn test_decode_premultiplies() {
        let image = decode_image(&tiny_png()).unwrap();
        assert_eq!((image.width(), image.height()), (2, 3));
        let px = image.pixmap().pixels()[0];
        assert_eq!(px.alpha(), 128);
        assert_eq!(px.red(), 128);
        assert!(decode_image(b"not an image").is_err());
    }

    #[test]
    fn test_data_url_round_trip() {
        let url = encode_data_url("image/png", b"abc");
        assert_eq!(decode_data_url(&url).unwrap(), b"abc");
        assert!(decode_data_url("data:image/png,abc").is_err());
    }

    #[tokio::test]
    async fn test_ingest_and_fetch() {
        let library = AssetLibrary::new();
        let reference = library.ingest(tiny_png(), "logo.png");
        assert!(reference.starts_with("asset://"));
        assert!(reference.ends_with("/logo.png"));
        assert_eq!(library.fetch(&reference).await.unwrap(), tiny_png());
        assert!(matches!(
            library.fetch("asset://missing/x.png").await,
            Err(AssetError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_images_fails_whole_batch() {
        let library = AssetLibrary::new();
        let good = library.ingest(tiny_png(), "a.png");
        let cache = resolve_images(&library, &[good.clone()]).await.unwrap();
        assert!(cache.contains(&good));

        let err = resolve_images(&library, &[good, "missing.png".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::RasterizationFailed(_)));
    }
}
