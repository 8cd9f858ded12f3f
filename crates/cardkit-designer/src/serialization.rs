//! Serialization and deserialization for design files.
//!
//! Implements save/load for `.cardkit.json` design files: the full document
//! (layers, background, canvas size) plus metadata and the print settings
//! the design was last exported with.

use anyhow::{Context, Result};
use cardkit_core::PrintSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::document::Document;

/// Design file format version
pub const FILE_FORMAT_VERSION: &str = "1.0";

/// Conventional design file extension
pub const FILE_EXTENSION: &str = "cardkit.json";

/// Complete design file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignFile {
    pub version: String,
    pub metadata: DesignMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print: Option<PrintSpec>,
    pub document: Document,
}

/// Design metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
}

impl DesignFile {
    /// Wrap a document with fresh metadata
    pub fn new(document: Document) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: DesignMetadata {
                name: document.name.clone(),
                created: now,
                modified: now,
                author: String::new(),
                description: String::new(),
            },
            print: None,
            document,
        }
    }

    /// Carry over creation time, author and description from an earlier
    /// save of the same design; `modified` stays at now.
    pub fn with_previous_metadata(mut self, previous: &DesignMetadata) -> Self {
        self.metadata.created = previous.created;
        self.metadata.author = previous.author.clone();
        self.metadata.description = previous.description.clone();
        self
    }

    pub fn with_print_spec(mut self, spec: PrintSpec) -> Self {
        self.print = Some(spec);
        self
    }

    /// Save design to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize design")?;
        std::fs::write(path.as_ref(), json).context("Failed to write design file")?;
        tracing::info!("Saved design '{}' to {}", self.metadata.name, path.as_ref().display());
        Ok(())
    }

    /// Load design from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read design file")?;
        let design = Self::from_json(&content)?;
        tracing::info!(
            "Loaded design '{}' ({} layers) from {}",
            design.metadata.name,
            design.document.layers.len(),
            path.as_ref().display()
        );
        Ok(design)
    }

    /// Parse and validate a design from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        let mut design: DesignFile =
            serde_json::from_str(content).context("Failed to parse design file")?;

        if design.version != FILE_FORMAT_VERSION {
            tracing::warn!(
                "Design file version {} differs from supported {}",
                design.version,
                FILE_FORMAT_VERSION
            );
        }
        for layer in &mut design.document.layers {
            layer.assign_missing_ids();
        }
        design
            .document
            .validate()
            .context("Design file contains an invalid document")?;
        if let Some(spec) = &design.print {
            spec.validate().context("Design file contains invalid print settings")?;
        }

        // Update modified timestamp
        design.metadata.modified = Utc::now();
        Ok(design)
    }

    pub fn into_document(self) -> Document {
        self.document
    }
}
