//! Configuration and settings management for CardKit
//!
//! Provides configuration file handling, settings management, and validation.
//! Supports JSON and TOML file formats stored in platform-specific directories.
//!
//! Configuration is organized into logical sections:
//! - Print settings (bleed, safe zone, DPI)
//! - Export defaults (format, background, JPEG quality, output directory)
//! - History depth
//! - Storage locations for saved designs

use cardkit_core::print::{PrintAuthority, PrintSpec};
use cardkit_core::units::{
    BASE_SCREEN_DPI, DEFAULT_BLEED_MM, DEFAULT_PRINT_DPI, DEFAULT_SAFE_ZONE_MM,
};
use cardkit_core::{Color, ExportFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, SettingsResult};

/// File name used inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Print settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintSettings {
    /// Bleed margin in millimeters
    pub bleed_mm: f64,
    /// Safe-zone margin in millimeters
    pub safe_zone_mm: f64,
    /// Export resolution
    pub dpi: f64,
    /// Resolution the canvas is authored at
    pub base_dpi: f64,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            bleed_mm: DEFAULT_BLEED_MM,
            safe_zone_mm: DEFAULT_SAFE_ZONE_MM,
            dpi: DEFAULT_PRINT_DPI,
            base_dpi: BASE_SCREEN_DPI,
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Format used when none is requested
    pub default_format: ExportFormat,
    /// Fill for the bleed area behind the artwork
    pub background: Color,
    /// JPEG quality (1-100)
    pub jpeg_quality: u8,
    /// Where exports are written by default
    pub output_directory: PathBuf,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_format: ExportFormat::Png,
            background: Color::WHITE,
            jpeg_quality: 92,
            output_directory: dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")),
        }
    }
}

/// Undo history settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistorySettings {
    /// Maximum undo depth; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Directory for the file-backed design store
    pub design_directory: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            design_directory: dirs::data_dir()
                .map(|d| d.join("cardkit").join("designs"))
                .unwrap_or_else(|| PathBuf::from("designs")),
        }
    }
}

/// Complete application configuration
///
/// Aggregates all settings sections and provides file I/O operations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Print settings
    #[serde(default)]
    pub print: PrintSettings,
    /// Export defaults
    #[serde(default)]
    pub export: ExportSettings,
    /// History settings
    #[serde(default)]
    pub history: HistorySettings,
    /// Storage settings
    #[serde(default)]
    pub storage: StorageSettings,
}

impl Config {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform config file location (`<config dir>/cardkit/config.toml`)
    pub fn default_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("cardkit").join(CONFIG_FILE_NAME))
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
        };

        config.validate()?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load config from `path` if it exists, otherwise return defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.print_spec()
            .validate()
            .map_err(|e| ConfigError::invalid("print", e.0))?;

        if !(1..=100).contains(&self.export.jpeg_quality) {
            return Err(ConfigError::invalid(
                "export.jpeg_quality",
                format!("must be between 1 and 100, got {}", self.export.jpeg_quality),
            ));
        }

        if self.storage.design_directory.as_os_str().is_empty() {
            return Err(ConfigError::invalid(
                "storage.design_directory",
                "must not be empty",
            ));
        }

        if self.history.max_depth == Some(0) {
            return Err(ConfigError::invalid(
                "history.max_depth",
                "must be at least 1 when set",
            ));
        }

        Ok(())
    }

    /// Print spec described by the `print` section
    pub fn print_spec(&self) -> PrintSpec {
        PrintSpec {
            authority: PrintAuthority::Config,
            bleed_mm: self.print.bleed_mm,
            safe_zone_mm: self.print.safe_zone_mm,
            dpi: self.print.dpi,
            base_dpi: self.print.base_dpi,
        }
    }
}
