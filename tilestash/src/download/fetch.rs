//! Background fetch: pull every tile of a request into its package file.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use super::job::{JobProgress, JobState};
use super::writer::MbTilesWriter;
use crate::coord::TileRange;
use crate::provider::TileSource;

/// Destinations currently owned by a running fetch.
pub(crate) type ActiveSet = Arc<Mutex<HashSet<PathBuf>>>;

/// Releases a destination from the active set when dropped.
#[derive(Debug)]
pub(crate) struct ActiveGuard {
    active: ActiveSet,
    path: PathBuf,
}

impl ActiveGuard {
    pub(crate) fn new(active: ActiveSet, path: PathBuf) -> Self {
        Self { active, path }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.lock().remove(&self.path);
    }
}

/// One job's unit of background work.
pub(crate) struct FetchTask {
    pub(crate) ranges: Vec<TileRange>,
    pub(crate) writer: MbTilesWriter,
    pub(crate) source: Arc<dyn TileSource>,
    pub(crate) progress: JobProgress,
    pub(crate) guard: ActiveGuard,
}

impl FetchTask {
    /// Run to completion on the current thread.
    ///
    /// Never panics: fetch errors and panics both end the job as `Failed`.
    pub(crate) fn run(self) {
        let FetchTask {
            ranges,
            mut writer,
            source,
            progress,
            guard,
        } = self;

        let path = writer.path().to_path_buf();

        let fetched = panic::catch_unwind(AssertUnwindSafe(|| {
            fetch_all(&ranges, &mut writer, source.as_ref(), &progress)
        }));

        let mut state = match fetched {
            Ok(Ok(())) if progress.rendered() == progress.total() => JobState::Completed,
            Ok(Ok(())) => JobState::Failed(format!(
                "wrote {} of {} tiles",
                progress.rendered(),
                progress.total()
            )),
            Ok(Err(reason)) => JobState::Failed(reason),
            Err(payload) => {
                let reason = panic_message(payload.as_ref());
                tracing::error!(path = %path.display(), reason = %reason, "Fetch panicked");
                JobState::Failed(format!("fetch panicked: {}", reason))
            }
        };

        // Keep what was written so far, even for a failed job
        if let Err(e) = writer.finish() {
            if state == JobState::Completed {
                state = JobState::Failed(format!("failed to commit package: {}", e));
            }
        }

        match &state {
            JobState::Completed => tracing::info!(
                path = %path.display(),
                tiles = progress.rendered(),
                "Download completed"
            ),
            other => tracing::warn!(
                path = %path.display(),
                rendered = progress.rendered(),
                total = progress.total(),
                state = %other,
                "Download stopped early"
            ),
        }

        // Release the path before publishing so a finished job is never
        // reported while its destination still counts as busy.
        drop(guard);
        progress.finish(state);
    }
}

fn fetch_all(
    ranges: &[TileRange],
    writer: &mut MbTilesWriter,
    source: &dyn TileSource,
    progress: &JobProgress,
) -> Result<(), String> {
    for range in ranges {
        tracing::debug!(zoom = range.zoom, tiles = range.count(), "Fetching zoom level");
        for tile in range.tiles() {
            let data = source
                .fetch_tile(&tile)
                .map_err(|e| format!("tile {}: {}", tile, e))?;
            writer
                .write_tile(&tile, &data)
                .map_err(|e| format!("writing tile {}: {}", tile, e))?;
            progress.record_tile();
        }
    }
    Ok(())
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{self, BoundingBox, TileCoord, ZoomRange};
    use crate::download::job::DownloadJob;
    use crate::download::writer::PackageInfo;
    use crate::provider::{MockTileSource, ProviderError};
    use tempfile::TempDir;

    struct PanickingSource;

    impl TileSource for PanickingSource {
        fn fetch_tile(&self, _tile: &TileCoord) -> Result<Vec<u8>, ProviderError> {
            panic!("decoder exploded")
        }

        fn name(&self) -> &str {
            "panicking"
        }

        fn max_zoom(&self) -> u8 {
            19
        }
    }

    fn task(dir: &TempDir, source: Arc<dyn TileSource>) -> (FetchTask, DownloadJob, ActiveSet) {
        let bbox = BoundingBox::new(-179.0, -89.0, 179.0, 89.0).unwrap();
        let zooms = ZoomRange::new(0, 2).unwrap();
        let ranges: Vec<_> = zooms.iter().map(|z| coord::tile_range(&bbox, z)).collect();
        let total = ranges.iter().map(|r| r.count()).sum();

        let path = dir.path().join("World.mbtiles");
        let writer = MbTilesWriter::create(&path, &PackageInfo::new("World", bbox, zooms)).unwrap();
        let (job, progress) = DownloadJob::new(path.clone(), total);

        let active: ActiveSet = Arc::new(Mutex::new(HashSet::new()));
        active.lock().insert(path.clone());
        let guard = ActiveGuard::new(Arc::clone(&active), path);

        (
            FetchTask {
                ranges,
                writer,
                source,
                progress,
                guard,
            },
            job,
            active,
        )
    }

    #[test]
    fn test_run_completes_and_releases_path() {
        let dir = TempDir::new().unwrap();
        let (task, job, active) = task(&dir, Arc::new(MockTileSource::default()));

        task.run();

        let status = job.poll_status();
        assert_eq!(status.state, JobState::Completed);
        assert_eq!(status.rendered, 21);
        assert_eq!(status.total, 21);
        assert!(active.lock().is_empty());
    }

    #[test]
    fn test_fetch_error_fails_job() {
        let dir = TempDir::new().unwrap();
        let (task, job, active) = task(&dir, Arc::new(MockTileSource::failing_after(5)));

        task.run();

        let status = job.poll_status();
        assert!(!status.alive);
        assert_eq!(status.rendered, 5);
        match status.state {
            JobState::Failed(reason) => assert!(reason.contains("connection reset")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(active.lock().is_empty());
    }

    #[test]
    fn test_panic_is_contained() {
        let dir = TempDir::new().unwrap();
        let (task, job, _active) = task(&dir, Arc::new(PanickingSource));

        task.run();

        match job.poll_status().state {
            JobState::Failed(reason) => assert!(reason.contains("decoder exploded")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
