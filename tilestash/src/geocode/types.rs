//! Place and error types for geocoding

use thiserror::Error;

use crate::coord::BoundingBox;

/// Classification tag a place must carry to be accepted as a city.
pub const CITY_KIND: &str = "city";

/// A geocoded place.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    /// Display address, most specific component first.
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    /// Raw classification tag reported by the service ("city", "road", ...).
    pub kind: String,
    pub bbox: BoundingBox,
}

impl Place {
    /// Whether the service classified this place as a city.
    pub fn is_city(&self) -> bool {
        self.kind == CITY_KIND
    }
}

/// Failure talking to a geocoding backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// Network or HTTP failure.
    #[error("request failed: {0}")]
    Request(String),

    /// The service answered with something we cannot interpret.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors surfaced by [`LocationResolver`](super::LocationResolver).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocateError {
    /// No place matches the query.
    #[error("no place found for '{0}'")]
    NotFound(String),

    /// The geocoding backend is unreachable or returned garbage.
    #[error("geocoding service error: {0}")]
    Service(#[from] GeocodeError),

    /// The place exists but is not a city.
    #[error("'{address}' is a {kind}, not a city")]
    NotACity { address: String, kind: String },
}

impl LocateError {
    /// Returns true for [`LocateError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocateError::NotFound(_))
    }
}

/// Convert a geocoder bounding box to the crate's convention.
///
/// Geocoders report `[min_lat, max_lat, min_lon, max_lon]`; everything
/// else here uses `(min_lon, min_lat, max_lon, max_lat)`.
pub fn nominatim_bbox_to_bbox(raw: [f64; 4]) -> BoundingBox {
    let [min_lat, max_lat, min_lon, max_lon] = raw;
    BoundingBox {
        min_lon,
        min_lat,
        max_lon,
        max_lat,
    }
}
