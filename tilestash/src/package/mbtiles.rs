//! Read-only MBTiles package.

use std::fmt;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::error::PackageError;
use super::metadata::{PackageMetadata, SuggestedCenter};
use crate::coord::{self, BoundingBox, TileCoord, TileRange, ZoomRange};

/// One locally stored region file.
///
/// Identity is the file path. Bounding box, zoom range and suggested center
/// are read once at open time; the package never changes afterwards.
pub struct TilePackage {
    path: PathBuf,
    bounding_box: BoundingBox,
    zoom_range: ZoomRange,
    declared_min_zoom: Option<u8>,
    center: Option<SuggestedCenter>,
    metadata: PackageMetadata,
    // rusqlite connections are Send but not Sync
    conn: Mutex<Connection>,
}

impl TilePackage {
    /// Open a package for reading.
    ///
    /// # Errors
    ///
    /// [`PackageError::NotFound`] if no file exists at `path`, otherwise a
    /// database or metadata error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PackageError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(PackageError::NotFound(path));
        }

        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| PackageError::database(&path, e))?;

        let metadata = read_metadata(&conn).map_err(|e| PackageError::database(&path, e))?;

        let declared_min_zoom = declared_zoom(&path, "minzoom", metadata.min_zoom())?;
        let declared_max_zoom = declared_zoom(&path, "maxzoom", metadata.max_zoom())?;

        let zoom_range = match (declared_min_zoom, declared_max_zoom) {
            (Some(min), Some(max)) => ZoomRange::new(min, max).ok(),
            _ => None,
        };
        let zoom_range = match zoom_range {
            Some(range) => range,
            None => stored_zoom_range(&conn, &path, declared_min_zoom, declared_max_zoom)?,
        };

        // MBTiles readers assume the whole world when bounds are absent
        let bounding_box = metadata.bounds().unwrap_or(BoundingBox::WORLD);
        let center = metadata.center();

        tracing::debug!(
            path = %path.display(),
            bounds = %bounding_box,
            zoom = %zoom_range,
            "Opened tile package"
        );

        Ok(Self {
            path,
            bounding_box,
            zoom_range,
            declared_min_zoom,
            center,
            metadata,
            conn: Mutex::new(conn),
        })
    }

    /// Path of the package file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem, e.g. `"Paris"` for `Paris.mbtiles`.
    pub fn name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Geographic extent of the package.
    pub fn bounding_box(&self) -> BoundingBox {
        self.bounding_box
    }

    /// Zoom levels the package covers.
    pub fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }

    /// `minzoom` as declared in the metadata block, if any.
    pub fn declared_min_zoom(&self) -> Option<u8> {
        self.declared_min_zoom
    }

    /// Suggested initial view, from the `center` metadata key.
    pub fn suggested_center(&self) -> Option<SuggestedCenter> {
        self.center
    }

    /// The full metadata block.
    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    /// Tiles the package covers at `zoom`, or `None` outside its zoom range.
    pub fn coverage_at(&self, zoom: u8) -> Option<TileRange> {
        self.zoom_range
            .contains(zoom)
            .then(|| coord::tile_range(&self.bounding_box, zoom))
    }

    /// Whether the tile lies inside the declared coverage.
    pub fn covers(&self, tile: &TileCoord) -> bool {
        self.coverage_at(tile.zoom)
            .is_some_and(|range| range.contains(tile))
    }

    /// Read one tile in XYZ addressing.
    ///
    /// Returns `Ok(None)` when the package has no tile at that address.
    pub fn read_tile(&self, tile: &TileCoord) -> Result<Option<Vec<u8>>, PackageError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT tile_data FROM tiles \
             WHERE zoom_level = ?1 AND tile_column = ?2 AND tile_row = ?3",
            params![tile.zoom, tile.x, tile.tms_y()],
            |row| row.get::<_, Vec<u8>>(0),
        )
        .optional()
        .map_err(|e| PackageError::database(&self.path, e))
    }

    /// Number of stored tiles.
    pub fn tile_count(&self) -> Result<u64, PackageError> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM tiles", [], |row| row.get::<_, i64>(0))
            .map(|n| n.max(0) as u64)
            .map_err(|e| PackageError::database(&self.path, e))
    }
}

impl fmt::Debug for TilePackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TilePackage")
            .field("path", &self.path)
            .field("bounding_box", &self.bounding_box)
            .field("zoom_range", &self.zoom_range)
            .field("center", &self.center)
            .finish()
    }
}

fn read_metadata(conn: &Connection) -> rusqlite::Result<PackageMetadata> {
    let mut stmt = conn.prepare("SELECT name, value FROM metadata")?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;
    let pairs = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(PackageMetadata::from_pairs(pairs))
}

fn declared_zoom(
    path: &Path,
    key: &str,
    value: Option<Result<u8, String>>,
) -> Result<Option<u8>, PackageError> {
    value
        .transpose()
        .map_err(|value| PackageError::InvalidMetadata {
            path: path.to_path_buf(),
            key: key.to_string(),
            value,
        })
}

/// Zoom range from the tile table, with declared bounds taking precedence.
fn stored_zoom_range(
    conn: &Connection,
    path: &Path,
    declared_min: Option<u8>,
    declared_max: Option<u8>,
) -> Result<ZoomRange, PackageError> {
    let (stored_min, stored_max) = conn
        .query_row(
            "SELECT MIN(zoom_level), MAX(zoom_level) FROM tiles",
            [],
            |row| Ok((row.get::<_, Option<u8>>(0)?, row.get::<_, Option<u8>>(1)?)),
        )
        .map_err(|e| PackageError::database(path, e))?;

    let min = declared_min.or(stored_min);
    let max = declared_max.or(stored_max);

    match (min, max) {
        (Some(min), Some(max)) => {
            ZoomRange::new(min, max).map_err(|_| PackageError::InvalidMetadata {
                path: path.to_path_buf(),
                key: "minzoom/maxzoom".to_string(),
                value: format!("{}/{}", min, max),
            })
        }
        _ => Err(PackageError::Empty(path.to_path_buf())),
    }
}
