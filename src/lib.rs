//! # CardKit
//!
//! A print-accurate business card designer:
//! - Layered documents (text, icons, logos, shapes, groups)
//! - Snapshot-based undo/redo with gesture coalescing
//! - PNG, JPEG and PDF export at print DPI with bleed
//! - Bleed and safe-zone guides for on-screen editing
//!
//! ## Architecture
//!
//! CardKit is organized as a workspace with multiple crates:
//!
//! 1. **cardkit-core** - Units, print specs, colors, geometry, errors
//! 2. **cardkit-designer** - Document model, history, rendering, export, catalogs, storage
//! 3. **cardkit-settings** - Configuration files and defaults
//! 4. **cardkit** - This crate; the `cardkit` command-line tool

pub use cardkit_designer as designer;
pub use cardkit_settings as settings;

pub use cardkit_core::{
    Color, DocumentError, Error, ExportError, ExportFormat, PrintSpec, Rect, Result,
    ValidationError,
};

pub use cardkit_designer::{
    AssetLibrary, Background, DesignFile, DesignerState, Document, ExportOptions, ExportOutput,
    ExportPipeline, LayerNode, LayerPatch, PrintGuides,
};

pub use cardkit_settings::Config;

use cardkit_designer::FileStore;

/// File-backed design store rooted at `storage.design_directory`.
pub fn design_store(config: &Config) -> FileStore {
    FileStore::new(config.storage.design_directory.clone())
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("CARDKIT_BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Output on stderr, so command output on stdout stays machine readable
/// - RUST_LOG environment variable support
/// - INFO as the default level
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
