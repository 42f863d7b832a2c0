//! MBTiles writer used by the background fetch.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};

use crate::coord::{BoundingBox, TileCoord, ZoomRange};
use crate::package::SuggestedCenter;

/// Tiles inserted per transaction.
const COMMIT_BATCH: usize = 256;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS metadata (name TEXT NOT NULL, value TEXT);
    CREATE UNIQUE INDEX IF NOT EXISTS metadata_name ON metadata (name);
    CREATE TABLE IF NOT EXISTS tiles (
        zoom_level  INTEGER NOT NULL,
        tile_column INTEGER NOT NULL,
        tile_row    INTEGER NOT NULL,
        tile_data   BLOB
    );
    CREATE UNIQUE INDEX IF NOT EXISTS tile_index ON tiles (zoom_level, tile_column, tile_row);
";

/// Descriptive metadata written into a new package.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageInfo {
    pub name: String,
    pub bounds: BoundingBox,
    pub zoom_range: ZoomRange,
    pub center: SuggestedCenter,
}

impl PackageInfo {
    /// Metadata for a region; the suggested center is the bbox center at
    /// the lowest zoom level.
    pub fn new(name: impl Into<String>, bounds: BoundingBox, zoom_range: ZoomRange) -> Self {
        let (lat, lon) = bounds.center();
        Self {
            name: name.into(),
            bounds,
            zoom_range,
            center: SuggestedCenter {
                lat,
                lon,
                zoom: zoom_range.min() as f64,
            },
        }
    }
}

/// Creates and fills a single MBTiles file.
pub struct MbTilesWriter {
    conn: Connection,
    path: PathBuf,
    pending: usize,
    format: Option<&'static str>,
}

impl MbTilesWriter {
    /// Create the file, its schema and the static metadata.
    pub fn create(path: &Path, info: &PackageInfo) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        let entries = [
            ("name", info.name.clone()),
            ("type", "baselayer".to_string()),
            ("version", "1.1".to_string()),
            ("bounds", info.bounds.to_string()),
            ("center", info.center.to_metadata_value()),
            ("minzoom", info.zoom_range.min().to_string()),
            ("maxzoom", info.zoom_range.max().to_string()),
        ];
        for (key, value) in entries {
            conn.execute(
                "INSERT OR REPLACE INTO metadata (name, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }

        conn.execute_batch("BEGIN")?;

        Ok(Self {
            conn,
            path: path.to_path_buf(),
            pending: 0,
            format: None,
        })
    }

    /// Path of the file being written.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store one tile given in XYZ addressing.
    pub fn write_tile(&mut self, tile: &TileCoord, data: &[u8]) -> rusqlite::Result<()> {
        if self.format.is_none() {
            self.format = sniff_format(data);
        }

        self.conn.execute(
            "INSERT OR REPLACE INTO tiles (zoom_level, tile_column, tile_row, tile_data) \
             VALUES (?1, ?2, ?3, ?4)",
            params![tile.zoom, tile.x, tile.tms_y(), data],
        )?;

        self.pending += 1;
        if self.pending >= COMMIT_BATCH {
            self.conn.execute_batch("COMMIT; BEGIN")?;
            self.pending = 0;
        }
        Ok(())
    }

    /// Commit outstanding tiles and record the detected tile format.
    pub fn finish(self) -> rusqlite::Result<()> {
        if let Some(format) = self.format {
            self.conn.execute(
                "INSERT OR REPLACE INTO metadata (name, value) VALUES ('format', ?1)",
                params![format],
            )?;
        }
        self.conn.execute_batch("COMMIT")
    }
}

/// Guess the MBTiles `format` value from a tile's leading bytes.
fn sniff_format(data: &[u8]) -> Option<&'static str> {
    match data {
        [0x89, b'P', b'N', b'G', ..] => Some("png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("jpg"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("webp"),
        [0x1F, 0x8B, ..] => Some("pbf"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn info() -> PackageInfo {
        PackageInfo::new(
            "Test",
            BoundingBox::new(0.0, 0.0, 1.0, 1.0).unwrap(),
            ZoomRange::new(2, 4).unwrap(),
        )
    }

    #[test]
    fn test_package_info_center() {
        let info = info();
        assert_eq!(info.center.lat, 0.5);
        assert_eq!(info.center.lon, 0.5);
        assert_eq!(info.center.zoom, 2.0);
    }

    #[test]
    fn test_writes_metadata_and_tiles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.mbtiles");

        let mut writer = MbTilesWriter::create(&path, &info()).unwrap();
        writer
            .write_tile(&TileCoord::new(2, 1, 0), &[0x89, b'P', b'N', b'G', 0])
            .unwrap();
        writer.finish().unwrap();

        let conn = Connection::open(&path).unwrap();
        let row: u32 = conn
            .query_row("SELECT tile_row FROM tiles", [], |r| r.get(0))
            .unwrap();
        // TMS row of XYZ y=0 at zoom 2
        assert_eq!(row, 3);

        let format: String = conn
            .query_row("SELECT value FROM metadata WHERE name = 'format'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(format, "png");

        let minzoom: String = conn
            .query_row("SELECT value FROM metadata WHERE name = 'minzoom'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(minzoom, "2");
    }

    #[test]
    fn test_commits_across_batches() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("many.mbtiles");

        let mut writer = MbTilesWriter::create(&path, &info()).unwrap();
        for x in 0..(COMMIT_BATCH as u32 + 10) {
            writer.write_tile(&TileCoord::new(12, x, 7), b"t").unwrap();
        }
        writer.finish().unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tiles", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, COMMIT_BATCH as i64 + 10);
    }

    #[test]
    fn test_rewriting_a_tile_replaces_it() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.mbtiles");
        let tile = TileCoord::new(3, 1, 1);

        let mut writer = MbTilesWriter::create(&path, &info()).unwrap();
        writer.write_tile(&tile, b"old").unwrap();
        writer.write_tile(&tile, b"new").unwrap();
        writer.finish().unwrap();

        let conn = Connection::open(&path).unwrap();
        let data: Vec<u8> = conn
            .query_row("SELECT tile_data FROM tiles", [], |r| r.get(0))
            .unwrap();
        assert_eq!(data, b"new");
    }

    #[test]
    fn test_sniff_format() {
        assert_eq!(sniff_format(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpg"));
        assert_eq!(sniff_format(b"RIFF\0\0\0\0WEBPVP8 "), Some("webp"));
        assert_eq!(sniff_format(b"live 0/0/0"), None);
    }
}
