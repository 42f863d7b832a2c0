//! Region requests: what to download and where to put it.

use std::path::{Path, PathBuf};

use super::error::DownloadError;
use crate::coord::{self, BoundingBox, TileRange, ZoomRange, MAX_ZOOM};
use crate::geocode::Place;

/// File name of the world preset package.
pub const WORLD_FILENAME: &str = "World.mbtiles";

/// Bounding box of the world preset.
pub const WORLD_BBOX: BoundingBox = BoundingBox {
    min_lon: -179.0,
    min_lat: -89.0,
    max_lon: 179.0,
    max_lat: 89.0,
};

/// Highest zoom level of the world preset.
pub const WORLD_MAX_ZOOM: u8 = 5;

/// Sorted, de-duplicated, non-empty set of zoom levels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoomLevels {
    levels: Vec<u8>,
    span: ZoomRange,
}

impl ZoomLevels {
    /// Build from any collection of zoom levels.
    pub fn new<I: IntoIterator<Item = u8>>(levels: I) -> Result<Self, DownloadError> {
        let mut levels: Vec<u8> = levels.into_iter().collect();
        levels.sort_unstable();
        levels.dedup();

        let (Some(&min), Some(&max)) = (levels.first(), levels.last()) else {
            return Err(DownloadError::InvalidRequest(
                "at least one zoom level is required".to_string(),
            ));
        };
        if max > MAX_ZOOM {
            return Err(DownloadError::InvalidRequest(format!(
                "zoom level {} exceeds maximum {}",
                max, MAX_ZOOM
            )));
        }

        let span = ZoomRange::new(min, max)
            .map_err(|e| DownloadError::InvalidRequest(e.to_string()))?;
        Ok(Self { levels, span })
    }

    /// Every level of a contiguous range.
    pub fn from_range(range: ZoomRange) -> Self {
        Self {
            levels: range.iter().collect(),
            span: range,
        }
    }

    /// Levels in ascending order.
    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    /// Smallest range containing every level.
    pub fn span(&self) -> ZoomRange {
        self.span
    }
}

impl From<ZoomRange> for ZoomLevels {
    fn from(range: ZoomRange) -> Self {
        Self::from_range(range)
    }
}

/// A bounding box, a set of zoom levels and a destination file.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRequest {
    pub bbox: BoundingBox,
    pub zoom_levels: ZoomLevels,
    pub destination: PathBuf,
}

impl RegionRequest {
    /// Create a request.
    pub fn new(
        bbox: BoundingBox,
        zoom_levels: impl Into<ZoomLevels>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bbox,
            zoom_levels: zoom_levels.into(),
            destination: destination.into(),
        }
    }

    /// The first few zoom levels of the whole world, into `World.mbtiles`.
    pub fn world(packages_dir: &Path, max_zoom: u8) -> Result<Self, DownloadError> {
        let levels = ZoomLevels::new(0..=max_zoom)?;
        Ok(Self::new(WORLD_BBOX, levels, packages_dir.join(WORLD_FILENAME)))
    }

    /// A city's bounding box, into `<City>.mbtiles`.
    ///
    /// The city name is the first comma-separated component of the
    /// place's display address.
    pub fn for_city(place: &Place, packages_dir: &Path, zooms: ZoomRange) -> Self {
        let filename = format!("{}.mbtiles", city_file_stem(&place.address));
        Self::new(place.bbox, zooms, packages_dir.join(filename))
    }

    /// Tile block per requested zoom level.
    pub fn tile_ranges(&self) -> Vec<TileRange> {
        self.zoom_levels
            .levels()
            .iter()
            .map(|&zoom| coord::tile_range(&self.bbox, zoom))
            .collect()
    }

    /// Estimated number of tiles the request covers.
    pub fn estimated_tiles(&self) -> u64 {
        coord::count_tiles(&self.bbox, self.zoom_levels.levels().iter().copied())
    }
}

/// Name used for a city's package file.
fn city_file_stem(address: &str) -> String {
    let city = address.split(',').next().unwrap_or_default().trim();
    let stem: String = city
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect();

    if stem.is_empty() {
        "Unnamed".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(address: &str) -> Place {
        Place {
            address: address.to_string(),
            lat: 48.85,
            lon: 2.35,
            kind: "city".to_string(),
            bbox: BoundingBox::new(2.22, 48.81, 2.47, 48.90).unwrap(),
        }
    }

    #[test]
    fn test_zoom_levels_sorted_and_deduplicated() {
        let levels = ZoomLevels::new([5, 3, 5, 4]).unwrap();
        assert_eq!(levels.levels(), &[3, 4, 5]);
        assert_eq!(levels.span(), ZoomRange::new(3, 5).unwrap());
    }

    #[test]
    fn test_zoom_levels_reject_empty_and_too_deep() {
        assert!(ZoomLevels::new([]).is_err());
        assert!(ZoomLevels::new([MAX_ZOOM + 1]).is_err());
    }

    #[test]
    fn test_sparse_levels_span() {
        let levels = ZoomLevels::new([2, 9]).unwrap();
        assert_eq!(levels.span(), ZoomRange::new(2, 9).unwrap());
        assert_eq!(levels.levels().len(), 2);
    }

    #[test]
    fn test_world_preset() {
        let request = RegionRequest::world(Path::new("/data/mbtiles"), WORLD_MAX_ZOOM).unwrap();
        assert_eq!(request.destination, PathBuf::from("/data/mbtiles/World.mbtiles"));
        assert_eq!(request.bbox, WORLD_BBOX);
        assert_eq!(request.zoom_levels.levels(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(request.estimated_tiles(), 1365);
    }

    #[test]
    fn test_city_preset_uses_first_address_component() {
        let request = RegionRequest::for_city(
            &place("Paris, Île-de-France, France métropolitaine, France"),
            Path::new("/data"),
            ZoomRange::new(12, 15).unwrap(),
        );
        assert_eq!(request.destination, PathBuf::from("/data/Paris.mbtiles"));
        assert_eq!(request.zoom_levels.levels(), &[12, 13, 14, 15]);
    }

    #[test]
    fn test_city_file_stem_is_path_safe() {
        assert_eq!(city_file_stem("a/b, c"), "a_b");
        assert_eq!(city_file_stem(", nowhere"), "Unnamed");
    }

    #[test]
    fn test_tile_ranges_sum_to_estimate() {
        let request = RegionRequest::for_city(
            &place("Paris"),
            Path::new("/data"),
            ZoomRange::new(12, 14).unwrap(),
        );
        let sum: u64 = request.tile_ranges().iter().map(|r| r.count()).sum();
        assert_eq!(sum, request.estimated_tiles());
    }
}
