//! Live tile source abstraction
//!
//! This module provides the [`TileSource`] trait used both as the
//! composite resolver's live fallback and as the origin the downloader
//! fetches region tiles from, plus an HTTP client seam for testing.
//!
//! ```ignore
//! use tilestash::provider::{ReqwestClient, XyzTileSource};
//!
//! let client = ReqwestClient::new("tilestash/0.1")?;
//! let osm = XyzTileSource::openstreetmap(client);
//! let bytes = osm.fetch_tile(&TileCoord::new(0, 0, 0))?;
//! ```

mod http;
mod types;
mod xyz;

pub use http::{HttpClient, ReqwestClient};
pub use types::{ProviderError, TileSource};
pub use xyz::{XyzTileSource, OPENSTREETMAP_TEMPLATE};

#[cfg(test)]
pub use http::tests::MockHttpClient;
#[cfg(test)]
pub use types::tests::MockTileSource;
