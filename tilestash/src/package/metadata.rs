//! MBTiles metadata block.
//!
//! Recognized keys: `center` (`"lon,lat,zoom"`), `minzoom`, `maxzoom` and
//! `bounds` (`"min_lon,min_lat,max_lon,max_lat"`). All are optional.

use std::collections::HashMap;

use crate::coord::BoundingBox;

/// Suggested initial view stored in a package.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestedCenter {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
}

impl SuggestedCenter {
    /// Parse the MBTiles `center` form `"lon,lat,zoom"`.
    ///
    /// The zoom component may be missing, in which case it is 0.
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<f64> = value
            .split(',')
            .map(|p| p.trim().parse::<f64>().ok())
            .collect::<Option<_>>()?;

        match parts.as_slice() {
            [lon, lat, zoom] => Some(Self {
                lat: *lat,
                lon: *lon,
                zoom: *zoom,
            }),
            [lon, lat] => Some(Self {
                lat: *lat,
                lon: *lon,
                zoom: 0.0,
            }),
            _ => None,
        }
    }

    /// Format in the MBTiles `center` form.
    pub fn to_metadata_value(&self) -> String {
        format!("{},{},{}", self.lon, self.lat, self.zoom)
    }
}

/// Key/value metadata read from a package.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageMetadata {
    entries: HashMap<String, String>,
}

impl PackageMetadata {
    /// Build metadata from raw key/value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parsed `center`, if present and well formed.
    pub fn center(&self) -> Option<SuggestedCenter> {
        self.get("center").and_then(SuggestedCenter::parse)
    }

    /// Parsed `bounds`, if present and well formed.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.get("bounds").and_then(|v| v.parse().ok())
    }

    /// Parsed `minzoom`.
    ///
    /// `Some(Err(value))` when present but not a zoom level.
    pub fn min_zoom(&self) -> Option<Result<u8, String>> {
        self.zoom_value("minzoom")
    }

    /// Parsed `maxzoom`.
    pub fn max_zoom(&self) -> Option<Result<u8, String>> {
        self.zoom_value("maxzoom")
    }

    fn zoom_value(&self, key: &str) -> Option<Result<u8, String>> {
        self.get(key).map(|v| {
            // Some writers store zoom as "12.0"
            let trimmed = v.trim();
            trimmed
                .parse::<u8>()
                .or_else(|_| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|z| z.fract() == 0.0 && (0.0..=255.0).contains(z))
                        .map(|z| z as u8)
                        .ok_or(())
                })
                .map_err(|_| v.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_parses_lon_lat_zoom() {
        let center = SuggestedCenter::parse("3.88,43.61,12").unwrap();
        assert_eq!(center.lat, 43.61);
        assert_eq!(center.lon, 3.88);
        assert_eq!(center.zoom, 12.0);
    }

    #[test]
    fn test_center_without_zoom() {
        let center = SuggestedCenter::parse("2.35, 48.85").unwrap();
        assert_eq!(center.zoom, 0.0);
    }

    #[test]
    fn test_center_rejects_garbage() {
        assert!(SuggestedCenter::parse("north").is_none());
        assert!(SuggestedCenter::parse("1,2,3,4").is_none());
    }

    #[test]
    fn test_center_round_trips_metadata_form() {
        let center = SuggestedCenter {
            lat: 48.85,
            lon: 2.35,
            zoom: 12.0,
        };
        assert_eq!(SuggestedCenter::parse(&center.to_metadata_value()), Some(center));
    }

    #[test]
    fn test_zoom_keys() {
        let meta = PackageMetadata::from_pairs([("minzoom", "12"), ("maxzoom", "15.0")]);
        assert_eq!(meta.min_zoom(), Some(Ok(12)));
        assert_eq!(meta.max_zoom(), Some(Ok(15)));

        let bad = PackageMetadata::from_pairs([("minzoom", "twelve")]);
        assert_eq!(bad.min_zoom(), Some(Err("twelve".to_string())));
        assert_eq!(bad.max_zoom(), None);
    }

    #[test]
    fn test_missing_keys_are_none() {
        let meta = PackageMetadata::default();
        assert!(meta.center().is_none());
        assert!(meta.bounds().is_none());
        assert!(meta.min_zoom().is_none());
        assert!(meta.is_empty());
    }
}
