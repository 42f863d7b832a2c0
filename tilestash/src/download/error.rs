//! Error types for region downloads.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;

/// Reasons a download could not be started.
///
/// Failures after the fetch has started are never returned here; they
/// surface as [`JobState::Failed`](super::JobState::Failed) when polling.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The destination already exists or is being downloaded.
    ///
    /// Nothing was started; confirm with the user, then call
    /// `force_download`.
    #[error("destination already exists: {}", path.display())]
    Conflict { path: PathBuf },

    /// The destination could not be prepared on the filesystem.
    #[error("cannot prepare {}: {source}", path.display())]
    Denied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The request itself is unusable.
    #[error("invalid download request: {0}")]
    InvalidRequest(String),
}

impl DownloadError {
    /// Whether the caller may retry with `force_download`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
