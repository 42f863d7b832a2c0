//! Coordinate conversion module
//!
//! Provides conversions between geographic coordinates (latitude/longitude)
//! and Web Mercator XYZ tile coordinates, plus the tile-pyramid counting
//! used to size region downloads.

mod types;

pub use types::{
    tiles_per_axis, BoundingBox, CoordError, TileCoord, TileRange, TileRangeIter, ZoomRange,
    MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts geographic coordinates to tile coordinates.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
///
/// # Returns
///
/// A `Result` containing the tile coordinates or an error if inputs are invalid.
#[inline]
pub fn to_tile_coords(lat: f64, lon: f64, zoom: u8) -> Result<TileCoord, CoordError> {
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    Ok(clamped_tile(lat, lon, zoom))
}

/// Tile containing the point, with the point clamped onto the Mercator plane.
///
/// Latitudes beyond the Mercator limits land on the first/last row and
/// `lon == 180` lands on the last column.
fn clamped_tile(lat: f64, lon: f64, zoom: u8) -> TileCoord {
    let n = tiles_per_axis(zoom);
    let nf = n as f64;
    let last = n - 1;

    let lat = lat.clamp(MIN_LAT, MAX_LAT);
    let lon = lon.clamp(MIN_LON, MAX_LON);

    let x = ((lon + 180.0) / 360.0 * nf).floor().max(0.0) as u32;

    let lat_rad = lat.to_radians();
    let y = ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * nf)
        .floor()
        .max(0.0) as u32;

    TileCoord::new(zoom, x.min(last), y.min(last))
}

/// Converts tile coordinates back to geographic coordinates.
///
/// Returns the latitude/longitude of the tile's northwest corner.
#[inline]
pub fn tile_to_lat_lon(tile: &TileCoord) -> (f64, f64) {
    let n = tiles_per_axis(tile.zoom) as f64;

    let lon = tile.x as f64 / n * 360.0 - 180.0;

    let y = tile.y as f64 / n;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();

    (lat, lon)
}

/// Geographic footprint of a tile.
pub fn tile_bounds(tile: &TileCoord) -> BoundingBox {
    let (max_lat, min_lon) = tile_to_lat_lon(tile);
    let (min_lat, max_lon) = tile_to_lat_lon(&TileCoord::new(tile.zoom, tile.x + 1, tile.y + 1));
    BoundingBox {
        min_lon,
        min_lat,
        max_lon,
        max_lat,
    }
}

/// Block of tiles at `zoom` that intersects `bbox`.
pub fn tile_range(bbox: &BoundingBox, zoom: u8) -> TileRange {
    // North edge gives the smallest row.
    let nw = clamped_tile(bbox.max_lat, bbox.min_lon, zoom);
    let se = clamped_tile(bbox.min_lat, bbox.max_lon, zoom);

    TileRange {
        zoom,
        min_x: nw.x.min(se.x),
        max_x: nw.x.max(se.x),
        min_y: nw.y.min(se.y),
        max_y: nw.y.max(se.y),
    }
}

/// Total tile count for `bbox` over every zoom level in `zooms`.
pub fn count_tiles<I>(bbox: &BoundingBox, zooms: I) -> u64
where
    I: IntoIterator<Item = u8>,
{
    zooms
        .into_iter()
        .map(|zoom| tile_range(bbox, zoom).count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_york_city_at_zoom_16() {
        // New York City: 40.7128°N, 74.0060°W
        let tile = to_tile_coords(40.7128, -74.0060, 16).unwrap();
        assert_eq!(tile.y, 24640);
        assert_eq!(tile.x, 19295);
        assert_eq!(tile.zoom, 16);
    }

    #[test]
    fn test_invalid_latitude() {
        let result = to_tile_coords(90.0, 0.0, 10);
        assert!(matches!(
            result.unwrap_err(),
            CoordError::InvalidLatitude(_)
        ));
    }

    #[test]
    fn test_invalid_zoom() {
        let result = to_tile_coords(0.0, 0.0, MAX_ZOOM + 1);
        assert!(matches!(result.unwrap_err(), CoordError::InvalidZoom(_)));
    }

    #[test]
    fn test_tile_to_lat_lon_northwest_corner() {
        let tile = TileCoord::new(16, 19295, 24640);
        let (lat, lon) = tile_to_lat_lon(&tile);

        assert!((lat - 40.713).abs() < 0.01);
        assert!((lon - (-74.007)).abs() < 0.01);
    }

    #[test]
    fn test_tile_bounds_zoom_zero_is_whole_plane() {
        let bounds = tile_bounds(&TileCoord::new(0, 0, 0));
        assert!((bounds.min_lon - -180.0).abs() < 1e-9);
        assert!((bounds.max_lon - 180.0).abs() < 1e-9);
        assert!((bounds.max_lat - MAX_LAT).abs() < 1e-6);
        assert!((bounds.min_lat - MIN_LAT).abs() < 1e-6);
    }

    #[test]
    fn test_tms_row_flip() {
        assert_eq!(TileCoord::new(0, 0, 0).tms_y(), 0);
        assert_eq!(TileCoord::new(2, 1, 0).tms_y(), 3);
        assert_eq!(TileCoord::new(2, 1, 3).tms_y(), 0);
    }

    #[test]
    fn test_world_preset_counts_full_pyramid() {
        let bbox = BoundingBox::new(-179.0, -89.0, 179.0, 89.0).unwrap();

        for zoom in 0..=5u8 {
            let n = tiles_per_axis(zoom) as u64;
            assert_eq!(tile_range(&bbox, zoom).count(), n * n, "zoom {}", zoom);
        }

        // 1 + 4 + 16 + 64 + 256 + 1024
        assert_eq!(count_tiles(&bbox, 0..=5), 1365);
    }

    #[test]
    fn test_city_range_is_small() {
        // Montpellier-sized box
        let bbox = BoundingBox::new(3.80, 43.56, 3.94, 43.65).unwrap();
        let range = tile_range(&bbox, 12);
        assert!(range.count() <= 9);
        assert!(range.contains(&to_tile_coords(43.61, 3.88, 12).unwrap()));
    }

    #[test]
    fn test_range_east_edge_clamps_to_last_column() {
        let bbox = BoundingBox::new(170.0, 0.0, 180.0, 10.0).unwrap();
        let range = tile_range(&bbox, 3);
        assert_eq!(range.max_x, 7);
    }

    #[test]
    fn test_range_iterator_matches_count() {
        let bbox = BoundingBox::new(-10.0, 35.0, 20.0, 55.0).unwrap();
        let range = tile_range(&bbox, 6);
        let tiles: Vec<_> = range.tiles().collect();

        assert_eq!(tiles.len() as u64, range.count());
        assert!(tiles.iter().all(|t| range.contains(t)));
        assert_eq!(tiles[0], TileCoord::new(6, range.min_x, range.min_y));
    }

    #[test]
    fn test_bbox_parse_mbtiles_bounds() {
        let bbox: BoundingBox = "-179,-89,179,89".parse().unwrap();
        assert_eq!(bbox, BoundingBox::new(-179.0, -89.0, 179.0, 89.0).unwrap());
        assert!("1,2,3".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn test_bbox_rejects_inverted() {
        assert!(BoundingBox::new(10.0, 0.0, 5.0, 1.0).is_err());
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 91.0).is_err());
    }

    #[test]
    fn test_zoom_range() {
        let range = ZoomRange::new(12, 15).unwrap();
        assert!(range.contains(12));
        assert!(range.contains(15));
        assert!(!range.contains(16));
        assert_eq!(range.len(), 4);
        assert!(ZoomRange::new(5, 4).is_err());
    }

    #[test]
    fn test_zoom_range_spanning_orders_and_caps() {
        assert_eq!(ZoomRange::spanning(15, 12), ZoomRange::new(12, 15).unwrap());
        assert_eq!(ZoomRange::spanning(30, 40).min(), MAX_ZOOM);
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_tile_coords_in_bounds(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0u8..=18
            ) {
                let tile = to_tile_coords(lat, lon, zoom)?;
                let max_tile = tiles_per_axis(zoom);
                prop_assert!(tile.x < max_tile);
                prop_assert!(tile.y < max_tile);
            }

            #[test]
            fn test_point_tile_inside_bbox_range(
                lat in -60.0..60.0_f64,
                lon in -170.0..170.0_f64,
                half in 0.01..5.0_f64,
                zoom in 0u8..=12
            ) {
                let bbox = BoundingBox::new(lon - half, lat - half, lon + half, lat + half).unwrap();
                let tile = to_tile_coords(lat, lon, zoom)?;
                prop_assert!(tile_range(&bbox, zoom).contains(&tile));
            }

            #[test]
            fn test_count_matches_iteration(
                lat in -60.0..60.0_f64,
                lon in -170.0..170.0_f64,
                half in 0.01..3.0_f64,
                zoom in 0u8..=9
            ) {
                let bbox = BoundingBox::new(lon - half, lat - half, lon + half, lat + half).unwrap();
                let range = tile_range(&bbox, zoom);
                prop_assert_eq!(range.tiles().count() as u64, range.count());
            }
        }
    }
}
