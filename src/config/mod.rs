//! Configuration module
//!
//! Runtime settings are layered with figment:
//!
//! 1. built-in defaults
//! 2. `Reconcile.toml` in the working directory (optional)
//! 3. `DATABASE_URL`
//! 4. `RECONCILE_*` environment variables, `__` separating nested keys
//!    (e.g. `RECONCILE_DATABASE__MAX_CONNECTIONS=4`)
//!
//! The resulting [`AppConfig`] and the [`MappingTable`] it points to are
//! built once in `main` and passed down explicitly.

pub mod mapping_table;

pub use mapping_table::MappingTable;

use crate::types::{FileId, ReconcileError};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the optional configuration file
pub const CONFIG_FILE: &str = "Reconcile.toml";

/// File read by column discovery
pub const DISCOVERY_FILE: &str = "main.csv";

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection URL
    pub url: String,
    /// Upper bound of the shared connection pool
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost:5432/shipments".to_string(),
            max_connections: (num_cpus::get() as u32).max(2),
        }
    }
}

/// Process-wide settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Folder holding `<fileId>.csv` exports
    pub csv_dir: PathBuf,
    /// Mapping table to use instead of the embedded one
    pub mapping_file: Option<PathBuf>,
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from("./csvFiles"),
            mapping_file: None,
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from all layers
    pub fn load() -> Result<Self, ReconcileError> {
        Self::from_figment(Self::figment())
    }

    /// The default provider stack
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::raw().only(&["DATABASE_URL"]).map(|_| "database.url".into()))
            .merge(Env::prefixed("RECONCILE_").split("__"))
    }

    /// Extract settings from an arbitrary provider stack
    pub fn from_figment(figment: Figment) -> Result<Self, ReconcileError> {
        let config: AppConfig = figment.extract()?;

        if config.database.max_connections == 0 {
            return Err(ReconcileError::ConfigError {
                message: "database.max_connections must be at least 1".to_string(),
            });
        }

        Ok(config)
    }

    /// Path of the CSV export for a file identifier
    pub fn csv_path(&self, file_id: FileId) -> PathBuf {
        self.csv_dir.join(file_id.file_name())
    }

    /// Path of the column discovery sheet
    pub fn discovery_path(&self) -> PathBuf {
        self.csv_dir.join(DISCOVERY_FILE)
    }

    /// Load the configured mapping table, falling back to the embedded one
    pub fn mapping_table(&self) -> Result<MappingTable, ReconcileError> {
        match &self.mapping_file {
            Some(path) => MappingTable::load(path),
            None => MappingTable::embedded(),
        }
    }
}
