use std::path::PathBuf;
use tarfs::ArchiveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("host identity is not configured")]
    MissingHostIdentity,
    #[error("cannot read config {}: {source}", path.display())]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("invalid config {}: {source}", path.display())]
    Parse { path: PathBuf, #[source] source: serde_json::Error },
}

#[derive(Debug, Error)]
pub enum LogError {
    #[error("cannot append to action log {}: {source}", path.display())]
    Io { path: PathBuf, #[source] source: std::io::Error },
}

/// Failures that end the command boundary. Everything else is a result string.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Log(#[from] LogError),
    #[error("session terminated")]
    SessionTerminated,
}
