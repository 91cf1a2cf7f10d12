//! Commerce configuration.

use std::path::{Path, PathBuf};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shopkeep_entity::Page;
use shopkeep_files::{LocalFiles, SharedFiles};
use thiserror::Error;

use crate::ids::OrderStatusId;
use crate::money::Currency;

/// Errors loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse TOML config {path}: {source}")]
    Toml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse JSON config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommerceConfig {
    /// Currency for totals and null prices.
    #[serde(default)]
    pub currency: Currency,

    /// Status given to orders created by checkout.
    #[serde(default)]
    pub initial_order_status: OrderStatusId,

    /// Whether a cart with no items may check out.
    #[serde(default = "default_true")]
    pub allow_empty_checkout: bool,

    /// Listing size when the caller gives none.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,

    /// Upper bound on any listing size.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,

    /// Root directory for `LocalFiles`.
    #[serde(default = "default_files_root")]
    pub files_root: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_page_size() -> u64 {
    24
}

fn default_max_page_size() -> u64 {
    100
}

fn default_files_root() -> PathBuf {
    PathBuf::from("./data/files")
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            initial_order_status: OrderStatusId::UNASSIGNED,
            allow_empty_checkout: default_true(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            files_root: default_files_root(),
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

impl CommerceConfig {
    /// Load config from a file. `.json` files are JSON, anything else TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let config: Self = if is_json(path) {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: display,
                source,
            })?
        } else {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: display,
                source,
            })?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save config to a file, picking the format like [`CommerceConfig::load`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        };
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 {
            return Err(ConfigError::Invalid("max_page_size must be positive".to_string()));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size must be in 1..={}",
                self.max_page_size
            )));
        }
        Ok(())
    }

    /// A page whose size is clamped to `max_page_size`; `None` uses the default size.
    pub fn page(&self, skip: u64, limit: Option<u64>) -> Page {
        let limit = limit
            .unwrap_or(self.default_page_size)
            .min(self.max_page_size);
        Page::new(skip, limit)
    }

    /// File storage rooted at `files_root`.
    pub fn local_files(&self) -> SharedFiles {
        Arc::new(LocalFiles::new(&self.files_root))
    }
}
