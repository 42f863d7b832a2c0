//! XYZ template tile source.
//!
//! Serves tiles from any server using the `{z}/{x}/{y}` URL convention,
//! with optional `{s}` subdomain rotation. This is the default live map.

use super::{HttpClient, ProviderError, TileSource};
use crate::coord::TileCoord;

/// Default OpenStreetMap tile template.
pub const OPENSTREETMAP_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Tile source backed by an XYZ URL template.
pub struct XyzTileSource<C: HttpClient> {
    http_client: C,
    name: String,
    template: String,
    subdomains: Vec<String>,
    max_zoom: u8,
}

impl<C: HttpClient> XyzTileSource<C> {
    /// Create a source for an arbitrary template.
    pub fn new(
        http_client: C,
        name: impl Into<String>,
        template: impl Into<String>,
        max_zoom: u8,
    ) -> Self {
        Self {
            http_client,
            name: name.into(),
            template: template.into(),
            subdomains: Vec::new(),
            max_zoom,
        }
    }

    /// The public OpenStreetMap tile servers.
    pub fn openstreetmap(http_client: C) -> Self {
        Self::new(http_client, "OpenStreetMap", OPENSTREETMAP_TEMPLATE, 19)
            .with_subdomains(["a", "b", "c"])
    }

    /// Set the subdomains substituted for `{s}`.
    pub fn with_subdomains<I, S>(mut self, subdomains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Builds the tile URL for the given coordinates.
    fn build_url(&self, tile: &TileCoord) -> String {
        let mut url = self
            .template
            .replace("{z}", &tile.zoom.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string());

        if url.contains("{s}") {
            let sub = if self.subdomains.is_empty() {
                ""
            } else {
                let idx = ((tile.x as usize) + (tile.y as usize)) % self.subdomains.len();
                self.subdomains[idx].as_str()
            };
            url = url.replace("{s}", sub);
        }

        url
    }
}

impl<C: HttpClient> TileSource for XyzTileSource<C> {
    fn fetch_tile(&self, tile: &TileCoord) -> Result<Vec<u8>, ProviderError> {
        if !self.supports_zoom(tile.zoom) {
            return Err(ProviderError::UnsupportedZoom(tile.zoom));
        }
        if !tile.is_valid() {
            return Err(ProviderError::InvalidTile(*tile));
        }

        let url = self.build_url(tile);
        tracing::trace!(url = %url, "Fetching live tile");
        self.http_client.get(&url)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn max_zoom(&self) -> u8 {
        self.max_zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockHttpClient;

    #[test]
    fn test_openstreetmap_url() {
        let source = XyzTileSource::openstreetmap(MockHttpClient::ok(vec![]));
        let url = source.build_url(&TileCoord::new(12, 2074, 1409));
        // (2074 + 1409) % 3 == 0
        assert_eq!(url, "https://a.tile.openstreetmap.org/12/2074/1409.png");
    }

    #[test]
    fn test_subdomain_rotation() {
        let source = XyzTileSource::openstreetmap(MockHttpClient::ok(vec![]));
        let b = source.build_url(&TileCoord::new(1, 1, 0));
        let c = source.build_url(&TileCoord::new(1, 1, 1));
        assert!(b.starts_with("https://b."));
        assert!(c.starts_with("https://c."));
    }

    #[test]
    fn test_template_without_subdomain() {
        let source = XyzTileSource::new(
            MockHttpClient::ok(vec![]),
            "local",
            "http://localhost:8080/{z}/{x}/{y}.png",
            18,
        );
        assert_eq!(
            source.build_url(&TileCoord::new(3, 4, 5)),
            "http://localhost:8080/3/4/5.png"
        );
    }

    #[test]
    fn test_fetch_passes_through_client() {
        let source = XyzTileSource::openstreetmap(MockHttpClient::ok(vec![9, 9]));
        let bytes = source.fetch_tile(&TileCoord::new(0, 0, 0)).unwrap();
        assert_eq!(bytes, vec![9, 9]);
    }

    #[test]
    fn test_fetch_rejects_unsupported_zoom() {
        let source = XyzTileSource::openstreetmap(MockHttpClient::ok(vec![]));
        assert_eq!(
            source.fetch_tile(&TileCoord::new(20, 0, 0)),
            Err(ProviderError::UnsupportedZoom(20))
        );
    }

    #[test]
    fn test_fetch_rejects_out_of_grid_tile() {
        let source = XyzTileSource::openstreetmap(MockHttpClient::ok(vec![]));
        let tile = TileCoord::new(1, 2, 0);
        assert_eq!(
            source.fetch_tile(&tile),
            Err(ProviderError::InvalidTile(tile))
        );
    }
}
