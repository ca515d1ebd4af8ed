use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::session::DEFAULT_HOME;

/// How `ls` turns a path into names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingMode {
    /// Literal string-prefix match on stored names.
    #[default]
    Prefix,
    /// The path itself and its immediate children only.
    Children,
}

/// Everything the interpreter needs, supplied once at construction.
///
/// JSON keys follow the field names; the camelCase names and the legacy
/// `computer_name` / `fs_archive` / `log_file` keys are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, alias = "hostIdentity", alias = "computer_name")]
    pub host_identity: Option<String>,
    #[serde(alias = "archiveLocation", alias = "fs_archive")]
    pub archive_location: PathBuf,
    #[serde(alias = "logDestination", alias = "log_file")]
    pub log_destination: PathBuf,
    #[serde(default = "default_home")]
    pub home: String,
    #[serde(default)]
    pub listing: ListingMode,
}

fn default_home() -> String { DEFAULT_HOME.to_string() }

impl Config {
    pub fn new(host_identity: impl Into<String>, archive_location: impl Into<PathBuf>, log_destination: impl Into<PathBuf>) -> Self {
        Config {
            host_identity: Some(host_identity.into()),
            archive_location: archive_location.into(),
            log_destination: log_destination.into(),
            home: default_home(),
            listing: ListingMode::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn host_identity(&self) -> Result<&str, ConfigError> {
        self.host_identity.as_deref().ok_or(ConfigError::MissingHostIdentity)
    }
}
