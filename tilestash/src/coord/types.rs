//! Coordinate types for tile math.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Minimum latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.051_128_78;
/// Maximum latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.051_128_78;
/// Minimum longitude.
pub const MIN_LON: f64 = -180.0;
/// Maximum longitude.
pub const MAX_LON: f64 = 180.0;
/// Lowest zoom level.
pub const MIN_ZOOM: u8 = 0;
/// Highest zoom level accepted anywhere in the crate.
pub const MAX_ZOOM: u8 = 22;

/// Errors produced by coordinate validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    #[error("invalid zoom level: {0}")]
    InvalidZoom(u8),

    #[error("invalid zoom range: {min}..={max}")]
    InvalidZoomRange { min: u8, max: u8 },

    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),
}

/// A tile address in the XYZ scheme (row 0 is the northernmost row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Zoom level.
    pub zoom: u8,
    /// Column, increasing eastward.
    pub x: u32,
    /// Row, increasing southward.
    pub y: u32,
}

impl TileCoord {
    /// Create a new tile coordinate.
    pub fn new(zoom: u8, x: u32, y: u32) -> Self {
        Self { zoom, x, y }
    }

    /// Row index in TMS order (row 0 is the southernmost row).
    ///
    /// MBTiles stores `tile_row` this way.
    pub fn tms_y(&self) -> u32 {
        tiles_per_axis(self.zoom)
            .saturating_sub(1)
            .saturating_sub(self.y)
    }

    /// Whether the tile exists at its zoom level.
    pub fn is_valid(&self) -> bool {
        let n = tiles_per_axis(self.zoom);
        self.zoom <= MAX_ZOOM && self.x < n && self.y < n
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Number of tiles along one axis at `zoom`.
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u32 {
    1u32 << zoom.min(31)
}

/// Geographic rectangle ordered `(min_lon, min_lat, max_lon, max_lat)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// The whole world, as far as the longitude/latitude ranges go.
    pub const WORLD: BoundingBox = BoundingBox {
        min_lon: MIN_LON,
        min_lat: -90.0,
        max_lon: MAX_LON,
        max_lat: 90.0,
    };

    /// Create a validated bounding box.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Result<Self, CoordError> {
        for lon in [min_lon, max_lon] {
            if !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        for lat in [min_lat, max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        if min_lon > max_lon || min_lat > max_lat {
            return Err(CoordError::InvalidBoundingBox(format!(
                "{},{},{},{} has min greater than max",
                min_lon, min_lat, max_lon, max_lat
            )));
        }
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// Whether the point lies inside the box (edges included).
    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }

    /// Whether `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.min_lon <= other.min_lon
            && self.min_lat <= other.min_lat
            && self.max_lon >= other.max_lon
            && self.max_lat >= other.max_lat
    }

    /// Area in square degrees.
    pub fn area(&self) -> f64 {
        (self.max_lon - self.min_lon) * (self.max_lat - self.min_lat)
    }

    /// Center point as `(lat, lon)`.
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lon + self.max_lon) / 2.0,
        )
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// Parses the MBTiles `bounds` form `"min_lon,min_lat,max_lon,max_lat"`.
impl FromStr for BoundingBox {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| CoordError::InvalidBoundingBox(s.to_string()))?;

        match parts.as_slice() {
            [min_lon, min_lat, max_lon, max_lat] => {
                BoundingBox::new(*min_lon, *min_lat, *max_lon, *max_lat)
            }
            _ => Err(CoordError::InvalidBoundingBox(s.to_string())),
        }
    }
}

/// Inclusive range of zoom levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoomRange {
    min: u8,
    max: u8,
}

impl ZoomRange {
    /// Create a validated zoom range.
    pub fn new(min: u8, max: u8) -> Result<Self, CoordError> {
        if min > max || max > MAX_ZOOM {
            return Err(CoordError::InvalidZoomRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Range spanning `a` and `b` in either order, capped at [`MAX_ZOOM`].
    pub const fn spanning(a: u8, b: u8) -> Self {
        let (min, max) = if a <= b { (a, b) } else { (b, a) };
        let max = if max > MAX_ZOOM { MAX_ZOOM } else { max };
        let min = if min > max { max } else { min };
        Self { min, max }
    }

    /// Lowest zoom level in the range.
    pub fn min(&self) -> u8 {
        self.min
    }

    /// Highest zoom level in the range.
    pub fn max(&self) -> u8 {
        self.max
    }

    /// Whether `zoom` lies in the range.
    pub fn contains(&self, zoom: u8) -> bool {
        (self.min..=self.max).contains(&zoom)
    }

    /// Iterate over every zoom level in the range.
    pub fn iter(&self) -> impl Iterator<Item = u8> {
        self.min..=self.max
    }

    /// Number of zoom levels in the range.
    pub fn len(&self) -> usize {
        (self.max - self.min) as usize + 1
    }

    /// Always false; a range holds at least one level.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for ZoomRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Rectangular block of tiles at a single zoom level (bounds inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Number of tiles in the range.
    pub fn count(&self) -> u64 {
        let cols = (self.max_x - self.min_x) as u64 + 1;
        let rows = (self.max_y - self.min_y) as u64 + 1;
        cols * rows
    }

    /// Whether the tile lies in the range.
    pub fn contains(&self, tile: &TileCoord) -> bool {
        tile.zoom == self.zoom
            && (self.min_x..=self.max_x).contains(&tile.x)
            && (self.min_y..=self.max_y).contains(&tile.y)
    }

    /// Iterate over the tiles in row-major order.
    pub fn tiles(&self) -> TileRangeIter {
        TileRangeIter {
            range: *self,
            next_x: self.min_x,
            next_y: self.min_y,
            done: false,
        }
    }
}

/// Iterator over the tiles of a [`TileRange`].
#[derive(Debug, Clone)]
pub struct TileRangeIter {
    range: TileRange,
    next_x: u32,
    next_y: u32,
    done: bool,
}

impl Iterator for TileRangeIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let tile = TileCoord::new(self.range.zoom, self.next_x, self.next_y);

        if self.next_x < self.range.max_x {
            self.next_x += 1;
        } else if self.next_y < self.range.max_y {
            self.next_x = self.range.min_x;
            self.next_y += 1;
        } else {
            self.done = true;
        }

        Some(tile)
    }
}
