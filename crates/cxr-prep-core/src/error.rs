//! Error types for dataset preparation.

use std::path::PathBuf;

use thiserror::Error;

use crate::tally::RunTally;

/// Errors that can occur while scanning, copying or fetching a dataset.
#[derive(Debug, Error)]
pub enum PrepError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("Failed to walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    /// Root path is not a directory.
    #[error("Root path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A rebuild stopped part way. Files counted in `tally` are on disk.
    #[error(
        "Rebuild aborted after {} copied and {} skipped: {source}",
        tally.copied,
        tally.skipped
    )]
    RebuildAborted {
        tally: RunTally,
        #[source]
        source: Box<PrepError>,
    },

    /// Archive could not be read or extracted.
    #[error("Archive error in {path}: {message}")]
    Archive { path: PathBuf, message: String },

    /// Remote archive could not be downloaded.
    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    Config { message: String },
}

impl PrepError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }

    /// The path the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::PermissionDenied { path }
            | Self::NotFound { path }
            | Self::Io { path, .. }
            | Self::Walk { path, .. }
            | Self::NotADirectory { path }
            | Self::Archive { path, .. } => Some(path),
            Self::RebuildAborted { source, .. } => source.path(),
            Self::Download { .. } | Self::Config { .. } => None,
        }
    }
}

/// Result alias used across the workspace.
pub type Result<T, E = PrepError> = std::result::Result<T, E>;
