//! # CardKit Designer
//!
//! Document model and editing engine for print-ready business cards, plus
//! the renderer and export pipeline that turn a design into PNG, JPEG or
//! PDF at print resolution.
//!
//! ## Core Components
//!
//! ### Document
//! - **Layers**: text, icon, logo, shape and group nodes stacked bottom to top
//! - **Background**: solid, gradient or tiled pattern
//! - **Document**: canvas size at the base screen DPI, orientation, layers
//!
//! ### Editing
//! - **History**: immutable snapshots with bounded undo/redo
//! - **Designer state**: layer commands, gesture coalescing, revisions
//!
//! ### Output
//! - **Renderer**: tiny-skia rasterization at any scale, print preview
//! - **Export**: bleed-aware PNG/JPEG/PDF with async image decoding
//! - **Overlay**: bleed and safe-zone guides for the editor
//!
//! ### Supporting
//! - **Assets**: ingested files, data URLs and image decoding
//! - **Catalogs**: templates, icons and logos
//! - **Store**: async save/load collaborator with memory and file backends
//! - **Serialization**: versioned `.cardkit.json` design files
//!
//! ## Architecture
//!
//! ```text
//! DesignerState
//!   ├── History (Arc<Document> snapshots)
//!   │     └── Document
//!   │           ├── Background
//!   │           └── LayerNode (Text | Icon | Logo | Shape | Group)
//!   └── revision (watch channel)
//!
//! ExportPipeline
//!   ├── AssetSource -> ImageCache (async decode)
//!   ├── Renderer (tiny-skia)
//!   └── Encoders (PNG | JPEG | PDF)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cardkit_designer::{DesignerState, LayerNode};
//!
//! let mut state = DesignerState::new();
//! let id = state.add_layer(LayerNode::text("Jane Doe", 24.0, 24.0))?;
//! state.undo();
//! assert!(state.document().layer(&id).is_none());
//! ```

pub mod assets;
pub mod background;
pub mod catalog;
pub mod designer_state;
pub mod document;
pub mod export;
pub mod font_manager;
pub mod history;
pub mod icons;
pub mod model;
pub mod overlay;
pub mod path_data;
pub mod renderer;
pub mod serialization;
pub mod store;

pub use assets::{AssetError, AssetLibrary, AssetSource, DecodedImage, ImageCache};
pub use background::{Background, BackgroundKind};
pub use catalog::{
    icon_catalog, template_catalog, Catalog, CatalogFilter, CatalogItem, IconEntry, LogoEntry,
    TemplateEntry,
};
pub use designer_state::{DesignerState, RevisionGuard};
pub use document::{Document, Orientation};
pub use export::{ExportGeometry, ExportOptions, ExportOutput, ExportPipeline};
pub use history::{History, HistoryEntry};
pub use model::{
    ContentPatch, GroupLayer, IconLayer, ImageFit, LayerContent, LayerNode, LayerPatch, LayerType,
    LogoLayer, ShapeKind, ShapeLayer, TextAlign, TextLayer,
};
pub use overlay::PrintGuides;
pub use renderer::{render_document, render_preview};
pub use serialization::DesignFile;
pub use store::{DocumentStore, FileStore, MemoryStore, SaveReceipt};
