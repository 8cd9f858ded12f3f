//! Error handling for CardKit
//!
//! Provides error types for all layers of the editor:
//! - Document errors (layer lookup, edit validation)
//! - Export errors (rendering surface, image decoding, encoding)
//! - Store errors (persistence collaborator)
//! - Validation errors (colors, print specs, malformed input)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Input rejected before any state was touched.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Document error type
///
/// Raised by editor commands. None of these are fatal; the document is left
/// unchanged whenever one is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// No layer or document with this id
    #[error("Not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// Edit rejected by validation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A patch targeted a different layer kind than the node has
    #[error("Layer {id} is a {actual} layer, patch is for {requested}")]
    TypeMismatch {
        /// Layer id.
        id: String,
        /// Kind of the existing layer.
        actual: String,
        /// Kind the patch was written for.
        requested: String,
    },

    /// Canvas dimensions must be positive and finite
    #[error("Invalid canvas dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },
}

impl DocumentError {
    pub fn not_found(id: impl Into<String>) -> Self {
        DocumentError::NotFound { id: id.into() }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DocumentError::Validation(ValidationError::new(msg))
    }
}

/// Export error type
///
/// An export either yields a complete buffer or one of these; no partial
/// output is ever produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    /// The output surface could not be allocated
    #[error("Render context unavailable for {width}x{height} surface")]
    RenderContextUnavailable {
        /// Requested surface width in pixels.
        width: u32,
        /// Requested surface height in pixels.
        height: u32,
    },

    /// A source image could not be fetched or decoded
    #[error("Rasterization failed: {0}")]
    RasterizationFailed(String),

    /// The final encoder failed
    #[error("Failed to encode {format}: {reason}")]
    Encoding {
        /// Target format name.
        format: String,
        /// Encoder message.
        reason: String,
    },

    /// The document changed while the export was waiting on images
    #[error("Export superseded by a newer document revision")]
    Superseded,

    /// Export options were rejected
    #[error("Invalid export options: {0}")]
    InvalidOptions(#[from] ValidationError),
}

/// Persistence collaborator error type
#[derive(Error, Debug)]
pub enum StoreError {
    /// Nothing stored under this id
    #[error("Document not found: {id}")]
    NotFound {
        /// The requested id.
        id: String,
    },

    /// Malformed save/load request
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Backing storage failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Main error type for CardKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Export error
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Store error
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a not-found error from any layer
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Document(DocumentError::NotFound { .. })
                | Error::Store(StoreError::NotFound { .. })
        )
    }

    /// Check if this is an export error
    pub fn is_export_error(&self) -> bool {
        matches!(self, Error::Export(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
