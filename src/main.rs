//! `cardkit` command-line tool
//!
//! Commands: export, info, new, save, open, icons, templates.
//! Listings and reports are JSON on stdout; logs go to stderr.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cardkit::designer::catalog::{icon_catalog, template_catalog, CatalogFilter};
use cardkit::designer::export::{ExportGeometry, ExportOptions, ExportPipeline};
use cardkit::designer::{AssetLibrary, DesignFile, DesignerState, Document, PrintGuides};
use cardkit::{design_store, init_logging, Config, ExportFormat, PrintSpec, VERSION};
use cardkit_core::units::estimate_file_size;

#[derive(Parser)]
#[command(name = "cardkit")]
#[command(about = "CardKit - print-ready business card designer")]
#[command(version = VERSION, long_version = LONG_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (JSON or TOML); defaults to the platform config dir
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a design to PNG, JPEG or PDF
    Export {
        /// Design file (.cardkit.json)
        design: PathBuf,

        /// Output file; defaults to <export dir>/<name>-<dpi>dpi.<ext>
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// png, jpeg or pdf
        #[arg(short, long)]
        format: Option<ExportFormat>,

        /// Target resolution
        #[arg(long)]
        dpi: Option<f64>,

        /// Bleed in millimeters
        #[arg(long)]
        bleed: Option<f64>,

        /// JPEG quality (1-100)
        #[arg(long)]
        quality: Option<u8>,
    },

    /// Print size, print guides and layer summary for a design
    Info {
        /// Design file (.cardkit.json)
        design: PathBuf,
    },

    /// Start a new design from a template
    New {
        /// Output design file
        output: PathBuf,

        /// Template id (see `cardkit templates`)
        #[arg(short, long, default_value = "blank")]
        template: String,

        /// Design name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Copy a design file into the design store
    Save {
        /// Design file (.cardkit.json)
        design: PathBuf,
    },

    /// Write a stored design out to a design file
    Open {
        /// Document id printed by `cardkit save`
        id: String,

        /// Output design file
        output: PathBuf,
    },

    /// List built-in icons
    Icons {
        /// Search name, id and tags
        #[arg(short, long)]
        query: Option<String>,

        #[arg(long)]
        category: Option<String>,
    },

    /// List built-in templates
    Templates {
        /// Search name, id and tags
        #[arg(short, long)]
        query: Option<String>,
    },
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (built ",
    env!("CARDKIT_BUILD_DATE"),
    ")"
);

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path().context("No configuration directory")?,
    };
    Config::load_or_default(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            design,
            output,
            format,
            dpi,
            bleed,
            quality,
        } => {
            let file = DesignFile::load_from_file(&design)?;

            let mut print = file.print.unwrap_or_else(|| config.print_spec());
            if let Some(dpi) = dpi {
                print = print.with_dpi(dpi);
            }
            if let Some(bleed) = bleed {
                print = print.with_bleed_mm(bleed);
            }
            let options = ExportOptions::new(format.unwrap_or(config.export.default_format))
                .with_print_spec(print)
                .with_background(config.export.background)
                .with_jpeg_quality(quality.unwrap_or(config.export.jpeg_quality));

            let base_dir = design
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            let pipeline = ExportPipeline::new(Arc::new(AssetLibrary::with_base_dir(base_dir)));
            let result = pipeline.export(&file.document, &options, None).await?;

            let target =
                output.unwrap_or_else(|| config.export.output_directory.join(&result.filename));
            tokio::fs::write(&target, &result.bytes)
                .await
                .with_context(|| format!("Failed to write {}", target.display()))?;

            print_json(&serde_json::json!({
                "success": true,
                "path": target,
                "format": result.format,
                "width": result.width,
                "height": result.height,
                "bytes": result.bytes.len(),
                "mime_type": result.mime_type,
            }))
        }

        Commands::Info { design } => {
            let file = DesignFile::load_from_file(&design)?;
            let doc = &file.document;
            let print: PrintSpec = file.print.unwrap_or_else(|| config.print_spec());
            let guides = PrintGuides::for_document(doc, &print);
            let geometry = ExportGeometry::compute(doc.width, doc.height, &print);
            let (width_mm, height_mm) = doc.size_mm();

            let layers: Vec<_> = doc
                .layers
                .iter()
                .map(|l| {
                    serde_json::json!({
                        "id": l.id,
                        "name": l.name,
                        "type": l.layer_type().to_string(),
                        "visible": l.visible,
                        "locked": l.locked,
                    })
                })
                .collect();

            print_json(&serde_json::json!({
                "name": doc.name,
                "width": doc.width,
                "height": doc.height,
                "width_mm": width_mm,
                "height_mm": height_mm,
                "orientation": doc.orientation,
                "print": print,
                "guides": guides,
                "export": {
                    "width": geometry.width,
                    "height": geometry.height,
                    "estimated_png_size": estimate_file_size(
                        geometry.width as f64,
                        geometry.height as f64,
                        "png",
                        print.dpi,
                    ),
                },
                "outside_safe_zone": guides.layers_outside_safe_zone(doc),
                "images": doc.image_refs(),
                "layers": layers,
            }))
        }

        Commands::New {
            output,
            template,
            name,
        } => {
            let templates = template_catalog();
            let Some(entry) = templates.get(&template) else {
                bail!("Unknown template '{}'", template);
            };

            let mut state =
                DesignerState::with_max_depth(entry.instantiate(), config.history.max_depth);
            if let Some(name) = name {
                state.rename(name);
            }
            state.save_to_file(&output)?;

            print_json(&serde_json::json!({
                "success": true,
                "path": output,
                "id": state.document().id,
                "layers": state.document().layer_count(),
            }))
        }

        Commands::Save { design } => {
            let mut state = DesignerState::with_max_depth(
                Document::business_card(),
                config.history.max_depth,
            );
            state.load_from_file(&design)?;
            let store = design_store(&config);
            let receipt = state.save_to_store(&store).await?;

            print_json(&serde_json::json!({
                "success": receipt.success,
                "id": receipt.id,
                "directory": store.root(),
            }))
        }

        Commands::Open { id, output } => {
            let store = design_store(&config);
            let mut state = DesignerState::with_max_depth(
                Document::business_card(),
                config.history.max_depth,
            );
            state.open_from_store(&store, &id).await?;
            state.save_to_file(&output)?;

            print_json(&serde_json::json!({
                "success": true,
                "id": id,
                "path": output,
                "layers": state.document().layer_count(),
            }))
        }

        Commands::Icons { query, category } => {
            let filter = CatalogFilter {
                query,
                category,
                tags: Vec::new(),
            };
            let icons: Vec<_> = icon_catalog()
                .filter(&filter)
                .into_iter()
                .map(|i| {
                    serde_json::json!({
                        "id": i.id,
                        "name": i.name,
                        "category": i.category,
                        "tags": i.tags,
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(icons))
        }

        Commands::Templates { query } => {
            let filter = CatalogFilter {
                query,
                ..Default::default()
            };
            let templates: Vec<_> = template_catalog()
                .filter(&filter)
                .into_iter()
                .map(|t| {
                    serde_json::json!({
                        "id": t.id,
                        "name": t.name,
                        "category": t.category,
                        "tags": t.tags,
                        "description": t.description,
                        "layers": t.document.layers.len(),
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(templates))
        }
    }
}
