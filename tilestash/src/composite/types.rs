//! Resolution outcomes and policy

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::coord::TileCoord;
use crate::provider::ProviderError;

/// How to choose between packages that all cover a tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// The package added first wins.
    #[default]
    FirstAdded,
    /// The package with the smallest bounding box wins; ties keep
    /// insertion order. A city package then shadows a world package
    /// regardless of load order.
    MostSpecific,
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionPolicy::FirstAdded => write!(f, "first-added"),
            ResolutionPolicy::MostSpecific => write!(f, "most-specific"),
        }
    }
}

impl FromStr for ResolutionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first-added" => Ok(ResolutionPolicy::FirstAdded),
            "most-specific" => Ok(ResolutionPolicy::MostSpecific),
            other => Err(format!(
                "unknown policy '{}' (expected first-added or most-specific)",
                other
            )),
        }
    }
}

/// Where a resolved tile came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileOrigin {
    /// A locally stored package.
    Package(PathBuf),
    /// The live fallback source.
    Live,
}

impl TileOrigin {
    /// Package path, if the tile came from one.
    pub fn package_path(&self) -> Option<&Path> {
        match self {
            TileOrigin::Package(path) => Some(path),
            TileOrigin::Live => None,
        }
    }
}

impl fmt::Display for TileOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileOrigin::Package(path) => write!(f, "package {}", path.display()),
            TileOrigin::Live => write!(f, "live"),
        }
    }
}

/// Tile bytes tagged with their origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTile {
    pub origin: TileOrigin,
    pub data: Vec<u8>,
}

/// Errors from tile resolution.
///
/// Packages never produce one: a failing or incomplete package falls
/// through to the next candidate. Only the live source can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("live source failed for tile {tile}: {source}")]
    Live {
        tile: TileCoord,
        #[source]
        source: ProviderError,
    },
}
