//! Place-name lookup
//!
//! A [`Geocoder`] talks to some search backend; [`LocationResolver`]
//! wraps one and maps its answers onto typed outcomes. City lookups are
//! stricter than free-text search so that a region download never covers
//! an unbounded area by accident.

mod nominatim;
mod resolver;
mod types;

pub use nominatim::{NominatimGeocoder, NOMINATIM_SEARCH_URL};
pub use resolver::LocationResolver;
pub use types::{nominatim_bbox_to_bbox, GeocodeError, LocateError, Place, CITY_KIND};

/// A geocoding backend.
pub trait Geocoder: Send + Sync {
    /// Best match for `query`, or `None` when nothing matches.
    fn search(&self, query: &str) -> Result<Option<Place>, GeocodeError>;
}
