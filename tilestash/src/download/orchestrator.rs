//! Region download orchestrator.
//!
//! Validates a [`RegionRequest`], claims its destination file and hands the
//! work to a background thread. Callers observe progress by polling the
//! returned [`DownloadJob`]; nothing here blocks on the fetch.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::error::{DownloadError, DownloadResult};
use super::fetch::{ActiveGuard, ActiveSet, FetchTask};
use super::job::DownloadJob;
use super::request::RegionRequest;
use super::writer::{MbTilesWriter, PackageInfo};
use crate::provider::TileSource;

/// Starts region downloads and tracks which destinations are busy.
pub struct DownloadOrchestrator {
    source: Arc<dyn TileSource>,
    active: ActiveSet,
}

impl DownloadOrchestrator {
    /// Create an orchestrator fetching from `source`.
    pub fn new(source: Arc<dyn TileSource>) -> Self {
        Self {
            source,
            active: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Start a download unless the destination is already taken.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::Denied`] if the destination directory cannot be
    ///   created or the package file cannot be initialised.
    /// - [`DownloadError::Conflict`] if the file exists or another job is
    ///   writing it. Nothing is touched in that case.
    pub fn request_download(&self, request: RegionRequest) -> DownloadResult<DownloadJob> {
        self.start(request, false)
    }

    /// Replace any existing file at the destination, then start.
    ///
    /// Still returns [`DownloadError::Conflict`] if a running job owns the
    /// destination.
    pub fn force_download(&self, request: RegionRequest) -> DownloadResult<DownloadJob> {
        self.start(request, true)
    }

    /// Whether a running job owns `path`.
    pub fn is_downloading(&self, path: &Path) -> bool {
        let path = normalize(path);
        self.active.lock().contains(&path)
    }

    /// Destinations of every running job.
    pub fn active_downloads(&self) -> Vec<PathBuf> {
        self.active.lock().iter().cloned().collect()
    }

    fn start(&self, request: RegionRequest, replace: bool) -> DownloadResult<DownloadJob> {
        let destination = prepare_destination(&request.destination)?;

        let guard = {
            let mut active = self.active.lock();

            if active.contains(&destination) {
                tracing::info!(path = %destination.display(), "Destination is being downloaded");
                return Err(DownloadError::Conflict { path: destination });
            }

            if destination.exists() {
                if !replace {
                    tracing::info!(path = %destination.display(), "Destination already exists");
                    return Err(DownloadError::Conflict { path: destination });
                }
                fs::remove_file(&destination).map_err(|source| DownloadError::Denied {
                    path: destination.clone(),
                    source,
                })?;
                tracing::info!(path = %destination.display(), "Removed existing package");
            }

            active.insert(destination.clone());
            ActiveGuard::new(Arc::clone(&self.active), destination.clone())
        };

        let name = destination
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let info = PackageInfo::new(name, request.bbox, request.zoom_levels.span());

        // Dropping the guard on any error below frees the destination again
        let writer = match MbTilesWriter::create(&destination, &info) {
            Ok(writer) => writer,
            Err(e) => {
                discard_partial(&destination);
                return Err(DownloadError::Denied {
                    path: destination,
                    source: std::io::Error::other(e),
                });
            }
        };

        let ranges = request.tile_ranges();
        let total = request.estimated_tiles();
        let (job, progress) = DownloadJob::new(destination.clone(), total);

        let task = FetchTask {
            ranges,
            writer,
            source: Arc::clone(&self.source),
            progress,
            guard,
        };

        // A failed spawn drops the task, closing the writer first
        if let Err(source) = thread::Builder::new()
            .name(format!("fetch-{}", info.name))
            .spawn(move || task.run())
        {
            discard_partial(&destination);
            return Err(DownloadError::Denied {
                path: destination,
                source,
            });
        }

        tracing::info!(
            path = %destination.display(),
            bbox = %request.bbox,
            zooms = %request.zoom_levels.span(),
            total,
            "Download started"
        );

        Ok(job)
    }
}

/// Remove a package file left behind by a download that never started.
fn discard_partial(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => tracing::warn!(path = %path.display(), "Removed partial package"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Could not remove partial package");
        }
    }
}

/// Create the parent directory and return a stable identity for the path.
fn prepare_destination(path: &Path) -> DownloadResult<PathBuf> {
    let file_name = path.file_name().ok_or_else(|| {
        DownloadError::InvalidRequest(format!("{} has no file name", path.display()))
    })?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    fs::create_dir_all(parent).map_err(|source| DownloadError::Denied {
        path: parent.to_path_buf(),
        source,
    })?;

    let parent = parent.canonicalize().map_err(|source| DownloadError::Denied {
        path: parent.to_path_buf(),
        source,
    })?;

    Ok(parent.join(file_name))
}

/// Best-effort canonical form for lookups in the active set.
fn normalize(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}
