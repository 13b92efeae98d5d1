//! CLI configuration.
//!
//! Lives in `~/.stratus/config.json` unless `--config` points elsewhere.
//! The service list is ordered: it is the registration order, and so the
//! order in which lookups search the stored graphs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub version: String,
    /// Services to sync, in lookup order.
    pub services: Vec<String>,
    /// Directory holding one `<service>.json` export per service.
    pub source_dir: PathBuf,
    /// Sled database directory for graph snapshots.
    pub store_path: PathBuf,
}

impl Config {
    /// Base directory for config and data.
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".stratus")
    }

    pub fn default_path() -> PathBuf {
        Self::default_dir().join("config.json")
    }

    /// Default configuration rooted at `base`.
    pub fn with_base(base: &Path) -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            services: vec![
                "infra".to_string(),
                "access".to_string(),
                "storage".to_string(),
            ],
            source_dir: base.join("sources"),
            store_path: base.join("graphs"),
        }
    }

    /// Reads the config at `path`, falling back to defaults next to it
    /// when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let base = path.parent().unwrap_or_else(|| Path::new("."));
                return Ok(Self::with_base(base));
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the config as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io_err)
    }
}
