//! Nominatim geocoding backend

use serde::Deserialize;

use super::types::{nominatim_bbox_to_bbox, GeocodeError, Place};
use super::Geocoder;
use crate::provider::HttpClient;

/// Public OpenStreetMap Nominatim search endpoint.
pub const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// One search hit, as Nominatim serialises it with `format=json`.
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(rename = "type", default)]
    kind: String,
    boundingbox: [String; 4],
}

/// Geocoder backed by a Nominatim-compatible search API.
pub struct NominatimGeocoder<C: HttpClient> {
    client: C,
    endpoint: String,
}

impl<C: HttpClient> NominatimGeocoder<C> {
    /// Geocoder using the public Nominatim endpoint.
    pub fn new(client: C) -> Self {
        Self::with_endpoint(client, NOMINATIM_SEARCH_URL)
    }

    /// Geocoder using a custom search endpoint.
    pub fn with_endpoint(client: C, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    fn search_url(&self, query: &str) -> Result<String, GeocodeError> {
        reqwest::Url::parse_with_params(
            &self.endpoint,
            &[("q", query), ("format", "json"), ("limit", "1")],
        )
        .map(String::from)
        .map_err(|e| GeocodeError::Request(format!("invalid endpoint {}: {}", self.endpoint, e)))
    }
}

impl<C: HttpClient> Geocoder for NominatimGeocoder<C> {
    fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError> {
        let url = self.search_url(query)?;
        tracing::debug!(url = %url, "Geocoding");

        let body = self
            .client
            .get(&url)
            .map_err(|e| GeocodeError::Request(e.to_string()))?;

        let hits: Vec<SearchHit> =
            serde_json::from_slice(&body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;

        hits.into_iter().next().map(parse_hit).transpose()
    }
}

fn parse_hit(hit: SearchHit) -> Result<Place, GeocodeError> {
    let number = |field: &str, raw: &str| {
        raw.trim()
            .parse::<f64>()
            .map_err(|_| GeocodeError::Malformed(format!("{} is not a number: '{}'", field, raw)))
    };

    let lat = number("lat", &hit.lat)?;
    let lon = number("lon", &hit.lon)?;

    let mut raw_bbox = [0.0; 4];
    for (slot, value) in raw_bbox.iter_mut().zip(hit.boundingbox.iter()) {
        *slot = number("boundingbox", value)?;
    }

    Ok(Place {
        address: hit.display_name,
        lat,
        lon,
        kind: hit.kind,
        bbox: nominatim_bbox_to_bbox(raw_bbox),
    })
}
