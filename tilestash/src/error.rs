//! Crate-wide error type.

use thiserror::Error;

use crate::composite::ResolveError;
use crate::config::ConfigError;
use crate::coord::CoordError;
use crate::download::DownloadError;
use crate::geocode::LocateError;
use crate::package::PackageError;
use crate::provider::ProviderError;

/// Any error a [`MapSession`](crate::session::MapSession) operation can
/// return.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Coord(#[from] CoordError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Locate(#[from] LocateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this is a destination conflict the user could override.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Download(e) if e.is_conflict())
    }

    /// Whether a place or package could not be found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Locate(e) => e.is_not_found(),
            Error::Package(e) => e.is_not_found(),
            _ => false,
        }
    }
}
