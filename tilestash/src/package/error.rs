//! Error types for tile packages.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading a tile package.
#[derive(Debug, Error)]
pub enum PackageError {
    /// No package file exists at the path.
    #[error("package not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The underlying SQLite database could not be queried.
    #[error("failed to read package {}: {source}", path.display())]
    Database {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A metadata value could not be interpreted.
    #[error("invalid metadata '{key}' = '{value}' in {}", path.display())]
    InvalidMetadata {
        path: PathBuf,
        key: String,
        value: String,
    },

    /// The package holds no tiles and declares no zoom range.
    #[error("package contains no tiles: {}", .0.display())]
    Empty(PathBuf),

    /// The package directory could not be enumerated.
    #[error("failed to scan package directory {}: {reason}", path.display())]
    ScanFailed { path: PathBuf, reason: String },
}

impl PackageError {
    pub(crate) fn database(path: impl Into<PathBuf>, source: rusqlite::Error) -> Self {
        Self::Database {
            path: path.into(),
            source,
        }
    }

    /// Whether this error means the file simply isn't there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
