//! Tile source trait and error type.

use thiserror::Error;

use crate::coord::TileCoord;

/// Errors from a live tile source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("unsupported zoom level: {0}")]
    UnsupportedZoom(u8),

    #[error("tile {0} does not exist")]
    InvalidTile(TileCoord),
}

/// A source of tiles fetched on demand (typically over the network).
pub trait TileSource: Send + Sync {
    /// Fetch the encoded bytes of one tile.
    fn fetch_tile(&self, tile: &TileCoord) -> Result<Vec<u8>, ProviderError>;

    /// Human readable source name.
    fn name(&self) -> &str;

    /// Lowest zoom level served.
    fn min_zoom(&self) -> u8 {
        0
    }

    /// Highest zoom level served.
    fn max_zoom(&self) -> u8;

    /// Whether `zoom` is served.
    fn supports_zoom(&self, zoom: u8) -> bool {
        (self.min_zoom()..=self.max_zoom()).contains(&zoom)
    }
}
