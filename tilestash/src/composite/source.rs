//! Composite tile source

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::types::{ResolutionPolicy, ResolveError, ResolvedTile, TileOrigin};
use crate::coord::TileCoord;
use crate::package::{discover_packages, PackageError, TilePackage};
use crate::provider::TileSource;

type PackageList = Arc<Vec<Arc<TilePackage>>>;

/// Ordered tile packages in front of a live fallback.
///
/// Resolution works on a snapshot of the package list taken when it
/// starts, so mutations never affect a resolution in flight. Mutations
/// replace the list wholesale rather than editing it in place.
pub struct CompositeSource {
    packages: RwLock<PackageList>,
    live: Arc<dyn TileSource>,
    policy: ResolutionPolicy,
}

impl CompositeSource {
    /// Live-only composite.
    pub fn new(live: Arc<dyn TileSource>) -> Self {
        Self {
            packages: RwLock::new(Arc::new(Vec::new())),
            live,
            policy: ResolutionPolicy::default(),
        }
    }

    /// Set the tie-break policy.
    pub fn with_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    /// The live fallback.
    pub fn live(&self) -> &Arc<dyn TileSource> {
        &self.live
    }

    /// Current package list, in resolution order.
    pub fn packages(&self) -> PackageList {
        Arc::clone(&self.packages.read())
    }

    /// Whether no package is loaded.
    pub fn is_live_only(&self) -> bool {
        self.packages.read().is_empty()
    }

    /// Whether a package at `path` is loaded.
    pub fn contains(&self, path: &Path) -> bool {
        let wanted = canonical(path);
        self.packages
            .read()
            .iter()
            .any(|p| p.path() == path || canonical(p.path()) == wanted)
    }

    /// Append a package at the lowest priority.
    ///
    /// A package already loaded from the same path is swapped for the new
    /// handle in place, keeping its priority. Returns true if the package
    /// was appended.
    pub fn add_package(&self, package: Arc<TilePackage>) -> bool {
        let mut guard = self.packages.write();
        let mut next: Vec<Arc<TilePackage>> = guard.iter().cloned().collect();

        let appended = match next.iter().position(|p| p.path() == package.path()) {
            Some(index) => {
                tracing::info!(path = %package.path().display(), "Package reloaded");
                next[index] = package;
                false
            }
            None => {
                tracing::info!(
                    path = %package.path().display(),
                    bbox = %package.bounding_box(),
                    zooms = %package.zoom_range(),
                    "Package added"
                );
                next.push(package);
                true
            }
        };

        *guard = Arc::new(next);
        appended
    }

    /// Drop every package, back to the live source only.
    pub fn reset(&self) {
        *self.packages.write() = Arc::new(Vec::new());
        tracing::info!("Composite reset to live source");
    }

    /// Rebuild the package list from a directory.
    ///
    /// Paths in `exclude` (typically still downloading) are skipped, as
    /// is any package that fails to open. Returns the number loaded.
    pub fn rescan(
        &self,
        dir: &Path,
        extension: &str,
        exclude: &[PathBuf],
    ) -> Result<usize, PackageError> {
        let excluded: Vec<PathBuf> = exclude.iter().map(|p| canonical(p)).collect();

        let mut loaded = Vec::new();
        for path in discover_packages(dir, extension)? {
            if excluded.contains(&canonical(&path)) {
                tracing::debug!(path = %path.display(), "Skipping package still downloading");
                continue;
            }
            match TilePackage::open(&path) {
                Ok(package) => loaded.push(Arc::new(package)),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable package");
                }
            }
        }

        let count = loaded.len();
        *self.packages.write() = Arc::new(loaded);
        tracing::info!(dir = %dir.display(), packages = count, "Packages rescanned");
        Ok(count)
    }

    /// Resolve a tile against the packages, then the live source.
    ///
    /// Only packages whose coverage includes the tile are asked for it.
    pub fn resolve(&self, tile: &TileCoord) -> Result<ResolvedTile, ResolveError> {
        let snapshot = self.packages();

        for package in self.candidates(&snapshot, tile) {
            match package.read_tile(tile) {
                Ok(Some(data)) => {
                    tracing::debug!(tile = %tile, package = %package.path().display(), "Resolved from package");
                    return Ok(ResolvedTile {
                        origin: TileOrigin::Package(package.path().to_path_buf()),
                        data,
                    });
                }
                Ok(None) => {
                    tracing::debug!(tile = %tile, package = %package.path().display(), "Tile missing from package");
                }
                Err(e) => {
                    tracing::warn!(tile = %tile, error = %e, "Package read failed");
                }
            }
        }

        tracing::debug!(tile = %tile, source = self.live.name(), "Resolving from live source");
        self.live
            .fetch_tile(tile)
            .map(|data| ResolvedTile {
                origin: TileOrigin::Live,
                data,
            })
            .map_err(|source| ResolveError::Live {
                tile: *tile,
                source,
            })
    }

    fn candidates<'a>(&self, snapshot: &'a [Arc<TilePackage>], tile: &TileCoord) -> Vec<&'a TilePackage> {
        let mut covering: Vec<&TilePackage> = snapshot
            .iter()
            .map(Arc::as_ref)
            .filter(|p| p.covers(tile))
            .collect();

        if self.policy == ResolutionPolicy::MostSpecific {
            // Stable sort keeps insertion order among equal areas
            covering.sort_by(|a, b| a.bounding_box().area().total_cmp(&b.bounding_box().area()));
        }

        covering
    }
}

impl std::fmt::Debug for CompositeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeSource")
            .field("packages", &self.packages.read().len())
            .field("live", &self.live.name())
            .field("policy", &self.policy)
            .finish()
    }
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{self, BoundingBox, ZoomRange};
    use crate::download::{MbTilesWriter, PackageInfo};
    use crate::provider::{MockTileSource, ProviderError};
    use tempfile::TempDir;

    fn region() -> BoundingBox {
        BoundingBox::new(1.45, 48.12, 3.56, 49.24).unwrap()
    }

    fn paris() -> BoundingBox {
        BoundingBox::new(2.22, 48.81, 2.47, 48.90).unwrap()
    }

    /// Write a package holding every tile of `bbox` over `zooms`, except `skip`.
    fn write_package(
        dir: &Path,
        name: &str,
        bbox: BoundingBox,
        zooms: ZoomRange,
        skip: &[TileCoord],
    ) -> PathBuf {
        let path = dir.join(format!("{}.mbtiles", name));
        let mut writer =
            MbTilesWriter::create(&path, &PackageInfo::new(name, bbox, zooms)).unwrap();
        for zoom in zooms.iter() {
            for tile in coord::tile_range(&bbox, zoom).tiles() {
                if !skip.contains(&tile) {
                    writer
                        .write_tile(&tile, format!("{} {}", name, tile).as_bytes())
                        .unwrap();
                }
            }
        }
        writer.finish().unwrap();
        path
    }

    fn open(path: &Path) -> Arc<TilePackage> {
        Arc::new(TilePackage::open(path).unwrap())
    }

    fn paris_tile() -> TileCoord {
        coord::to_tile_coords(48.8566, 2.3522, 12).unwrap()
    }

    #[test]
    fn test_live_only_uses_fallback() {
        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        let tile = TileCoord::new(3, 4, 2);

        let resolved = composite.resolve(&tile).unwrap();
        assert_eq!(resolved.origin, TileOrigin::Live);
        assert_eq!(resolved.data, MockTileSource::body(&tile));
        assert!(composite.is_live_only());
    }

    #[test]
    fn test_covering_package_wins_over_live() {
        let dir = TempDir::new().unwrap();
        let path = write_package(dir.path(), "Paris", paris(), ZoomRange::new(12, 12).unwrap(), &[]);

        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        composite.add_package(open(&path));

        let tile = paris_tile();
        let resolved = composite.resolve(&tile).unwrap();
        assert_eq!(resolved.origin.package_path(), Some(path.as_path()));
        assert_eq!(resolved.data, format!("Paris {}", tile).into_bytes());
    }

    #[test]
    fn test_outside_zoom_or_bbox_falls_back_without_asking_package() {
        let dir = TempDir::new().unwrap();
        let path = write_package(dir.path(), "Paris", paris(), ZoomRange::new(12, 12).unwrap(), &[]);

        let live = Arc::new(MockTileSource::default());
        let composite = CompositeSource::new(live.clone());
        composite.add_package(open(&path));

        // Same place, deeper zoom
        let deeper = coord::to_tile_coords(48.8566, 2.3522, 14).unwrap();
        assert_eq!(composite.resolve(&deeper).unwrap().origin, TileOrigin::Live);

        // Right zoom, other side of the world
        let sydney = coord::to_tile_coords(-33.87, 151.21, 12).unwrap();
        assert_eq!(composite.resolve(&sydney).unwrap().origin, TileOrigin::Live);

        assert_eq!(live.call_count(), 2);
    }

    #[test]
    fn test_first_added_wins_by_default() {
        let dir = TempDir::new().unwrap();
        let zooms = ZoomRange::new(12, 12).unwrap();
        let region = write_package(dir.path(), "Region", region(), zooms, &[]);
        let city = write_package(dir.path(), "Paris", paris(), zooms, &[]);

        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        composite.add_package(open(&region));
        composite.add_package(open(&city));

        let resolved = composite.resolve(&paris_tile()).unwrap();
        assert_eq!(resolved.origin.package_path(), Some(region.as_path()));
    }

    #[test]
    fn test_most_specific_policy_prefers_smaller_bbox() {
        let dir = TempDir::new().unwrap();
        let zooms = ZoomRange::new(12, 12).unwrap();
        let region = write_package(dir.path(), "Region", region(), zooms, &[]);
        let city = write_package(dir.path(), "Paris", paris(), zooms, &[]);

        let composite = CompositeSource::new(Arc::new(MockTileSource::default()))
            .with_policy(ResolutionPolicy::MostSpecific);
        composite.add_package(open(&region));
        composite.add_package(open(&city));

        let resolved = composite.resolve(&paris_tile()).unwrap();
        assert_eq!(resolved.origin.package_path(), Some(city.as_path()));
    }

    #[test]
    fn test_missing_tile_falls_through_to_next_package() {
        let dir = TempDir::new().unwrap();
        let zooms = ZoomRange::new(12, 12).unwrap();
        let tile = paris_tile();
        let holey = write_package(dir.path(), "Holey", paris(), zooms, &[tile]);
        let full = write_package(dir.path(), "Full", paris(), zooms, &[]);

        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        composite.add_package(open(&holey));
        composite.add_package(open(&full));

        let resolved = composite.resolve(&tile).unwrap();
        assert_eq!(resolved.origin.package_path(), Some(full.as_path()));
    }

    #[test]
    fn test_add_same_path_twice_replaces_in_place() {
        let dir = TempDir::new().unwrap();
        let zooms = ZoomRange::new(12, 12).unwrap();
        let paris_path = write_package(dir.path(), "Paris", paris(), zooms, &[]);
        let region_path = write_package(dir.path(), "Region", region(), zooms, &[]);

        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        assert!(composite.add_package(open(&paris_path)));
        assert!(composite.add_package(open(&region_path)));

        let fresh = open(&paris_path);
        assert!(!composite.add_package(Arc::clone(&fresh)));

        let packages = composite.packages();
        assert_eq!(packages.len(), 2);
        assert!(Arc::ptr_eq(&packages[0], &fresh));
    }

    #[test]
    fn test_reset_returns_to_live() {
        let dir = TempDir::new().unwrap();
        let path = write_package(dir.path(), "Paris", paris(), ZoomRange::new(12, 12).unwrap(), &[]);

        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        composite.add_package(open(&path));
        composite.reset();

        assert!(composite.is_live_only());
        assert_eq!(composite.resolve(&paris_tile()).unwrap().origin, TileOrigin::Live);
    }

    #[test]
    fn test_snapshot_unaffected_by_later_mutation() {
        let dir = TempDir::new().unwrap();
        let path = write_package(dir.path(), "Paris", paris(), ZoomRange::new(12, 12).unwrap(), &[]);

        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        composite.add_package(open(&path));
        let before = composite.packages();
        composite.reset();

        assert_eq!(before.len(), 1);
        assert!(composite.packages().is_empty());
    }

    #[test]
    fn test_rescan_skips_excluded_and_broken() {
        let dir = TempDir::new().unwrap();
        let zooms = ZoomRange::new(12, 12).unwrap();
        let paris_path = write_package(dir.path(), "Paris", paris(), zooms, &[]);
        let busy = write_package(dir.path(), "Busy", paris(), zooms, &[]);
        std::fs::write(dir.path().join("Broken.mbtiles"), b"not sqlite").unwrap();

        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        let loaded = composite
            .rescan(dir.path(), "mbtiles", &[busy.clone()])
            .unwrap();

        assert_eq!(loaded, 1);
        assert!(composite.contains(&paris_path));
        assert!(!composite.contains(&busy));
    }

    #[test]
    fn test_rescan_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let composite = CompositeSource::new(Arc::new(MockTileSource::default()));
        let loaded = composite
            .rescan(&dir.path().join("nothing"), "mbtiles", &[])
            .unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn test_live_failure_is_resolve_error() {
        let composite = CompositeSource::new(Arc::new(MockTileSource::failing_after(0)));
        let err = composite.resolve(&TileCoord::new(1, 0, 0)).unwrap_err();
        assert_eq!(
            err,
            ResolveError::Live {
                tile: TileCoord::new(1, 0, 0),
                source: ProviderError::HttpError("connection reset".to_string()),
            }
        );
    }
}
