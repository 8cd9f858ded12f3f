//! CardKit Settings Crate
//!
//! Handles application configuration: print defaults, export defaults,
//! history depth and storage locations.

pub mod config;
pub mod error;

pub use config::{Config, ExportSettings, HistorySettings, PrintSettings, StorageSettings};
pub use error::{ConfigError, SettingsError, SettingsResult};
