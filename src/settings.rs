//! Optional on-disk defaults for the CLI.
//!
//! Looked up at `--config`/`DAYLIO_CONFIG`, else
//! `<config dir>/daylio-backup/settings.json`. A missing default file is not
//! an error; a missing explicit file is.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::metadata::PKG_NAME;
use crate::schema::registry::KNOWN_VERSIONS;
use crate::schema::validator::ValidationOptions;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Invalid settings {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Export versions accepted without an unknown-version warning.
    pub known_versions: Vec<i64>,
    /// Run the advisory reference checks on every validation.
    pub check_references: bool,
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            known_versions: KNOWN_VERSIONS.to_vec(),
            check_references: false,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(PKG_NAME).join("settings.json"))
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn validation_options(&self) -> ValidationOptions {
        ValidationOptions {
            known_versions: self.known_versions.clone(),
        }
    }
}
