//! Validating front end over a geocoder

use std::sync::Arc;

use super::types::{LocateError, Place};
use super::Geocoder;

/// Turns free text into a [`Place`], or a typed reason why not.
///
/// Each call issues at most one geocoder request. Service failures are
/// surfaced as-is; nothing is retried.
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Look up any place.
    pub fn geocode(&self, text: &str) -> Result<Place, LocateError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(LocateError::NotFound(text.to_string()));
        }

        match self.geocoder.search(query) {
            Ok(Some(place)) => {
                tracing::debug!(query, address = %place.address, kind = %place.kind, "Place found");
                Ok(place)
            }
            Ok(None) => {
                tracing::info!(query, "No place found");
                Err(LocateError::NotFound(query.to_string()))
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "Geocoding failed");
                Err(e.into())
            }
        }
    }

    /// Look up a place that must be a city.
    pub fn resolve_city(&self, text: &str) -> Result<Place, LocateError> {
        let place = self.geocode(text)?;
        if !place.is_city() {
            return Err(LocateError::NotACity {
                address: place.address,
                kind: place.kind,
            });
        }
        Ok(place)
    }
}

impl std::fmt::Debug for LocationResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationResolver").finish_non_exhaustive()
    }
}
