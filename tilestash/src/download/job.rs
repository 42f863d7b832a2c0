//! Download job handle and progress state.
//!
//! The fetch thread is the only writer; any number of pollers read.
//! Counters are atomics: reads may lag the writer but never go backwards.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Lifecycle state of a download job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// The fetch is still running.
    Running,
    /// Every estimated tile was written.
    Completed,
    /// The fetch stopped early.
    Failed(String),
}

impl JobState {
    /// Whether the job has stopped.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Running)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => write!(f, "running"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Point-in-time view of a job's progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    /// Tiles written so far.
    pub rendered: u64,
    /// Estimated tile count for the request.
    pub total: u64,
    /// Whether the fetch is still running.
    pub alive: bool,
    /// Lifecycle state; terminal once `alive` is false.
    pub state: JobState,
}

impl JobStatus {
    /// Progress as a ratio (0.0 to 1.0).
    pub fn progress_ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.rendered as f64 / self.total as f64
        }
    }

    /// Status line shown while polling.
    pub fn message(&self) -> String {
        format!("Downloading tiles {}/{}", self.rendered, self.total)
    }
}

#[derive(Debug)]
struct JobShared {
    destination: PathBuf,
    total: u64,
    rendered: AtomicU64,
    finished: AtomicBool,
    outcome: OnceLock<JobState>,
}

/// Handle to a running or finished download.
///
/// Cloning the handle shares the same progress state.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    shared: Arc<JobShared>,
}

impl DownloadJob {
    /// Create a job and the producer-side handle that updates it.
    pub(crate) fn new(destination: PathBuf, total: u64) -> (Self, JobProgress) {
        let shared = Arc::new(JobShared {
            destination,
            total,
            rendered: AtomicU64::new(0),
            finished: AtomicBool::new(false),
            outcome: OnceLock::new(),
        });
        (
            Self {
                shared: Arc::clone(&shared),
            },
            JobProgress { shared },
        )
    }

    /// Package file being written.
    pub fn destination(&self) -> &Path {
        &self.shared.destination
    }

    /// Estimated tile count.
    pub fn total(&self) -> u64 {
        self.shared.total
    }

    /// Whether the fetch is still running.
    pub fn is_alive(&self) -> bool {
        !self.shared.finished.load(Ordering::Acquire)
    }

    /// Non-blocking snapshot of progress.
    ///
    /// Once `alive` is false every later poll returns the same status.
    pub fn poll_status(&self) -> JobStatus {
        // Read the flag first: a finished job's counters are final.
        let finished = self.shared.finished.load(Ordering::Acquire);
        let rendered = self.shared.rendered.load(Ordering::Acquire);

        let state = if finished {
            self.shared
                .outcome
                .get()
                .cloned()
                .unwrap_or_else(|| JobState::Failed("job stopped without an outcome".to_string()))
        } else {
            JobState::Running
        };

        JobStatus {
            rendered: rendered.min(self.shared.total),
            total: self.shared.total,
            alive: !finished,
            state,
        }
    }
}

/// Producer side of a job, owned by the fetch thread.
#[derive(Debug)]
pub(crate) struct JobProgress {
    shared: Arc<JobShared>,
}

impl JobProgress {
    /// Record one written tile.
    pub(crate) fn record_tile(&self) {
        self.shared.rendered.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn rendered(&self) -> u64 {
        self.shared.rendered.load(Ordering::Acquire)
    }

    pub(crate) fn total(&self) -> u64 {
        self.shared.total
    }

    /// Publish the terminal state. Only the first call has any effect.
    pub(crate) fn finish(&self, state: JobState) {
        let _ = self.shared.outcome.set(state);
        self.shared.finished.store(true, Ordering::Release);
    }
}

impl Drop for JobProgress {
    fn drop(&mut self) {
        // A fetch that unwinds without reporting still ends the job
        if !self.shared.finished.load(Ordering::Acquire) {
            self.finish(JobState::Failed("fetch ended unexpectedly".to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_running_at_zero() {
        let (job, _progress) = DownloadJob::new(PathBuf::from("/a.mbtiles"), 10);
        let status = job.poll_status();

        assert_eq!(status.rendered, 0);
        assert_eq!(status.total, 10);
        assert!(status.alive);
        assert_eq!(status.state, JobState::Running);
        assert_eq!(status.message(), "Downloading tiles 0/10");
    }

    #[test]
    fn test_progress_visible_through_clone() {
        let (job, progress) = DownloadJob::new(PathBuf::from("/a.mbtiles"), 4);
        let other = job.clone();

        progress.record_tile();
        progress.record_tile();

        assert_eq!(other.poll_status().rendered, 2);
        assert_eq!(job.poll_status().progress_ratio(), 0.5);
    }

    #[test]
    fn test_finished_status_is_stable() {
        let (job, progress) = DownloadJob::new(PathBuf::from("/a.mbtiles"), 2);
        progress.record_tile();
        progress.record_tile();
        progress.finish(JobState::Completed);

        let first = job.poll_status();
        let second = job.poll_status();

        assert!(!first.alive);
        assert_eq!(first.state, JobState::Completed);
        assert_eq!(first, second);
    }

    #[test]
    fn test_first_outcome_wins() {
        let (job, progress) = DownloadJob::new(PathBuf::from("/a.mbtiles"), 2);
        progress.finish(JobState::Failed("network".to_string()));
        progress.finish(JobState::Completed);

        assert_eq!(
            job.poll_status().state,
            JobState::Failed("network".to_string())
        );
    }

    #[test]
    fn test_dropped_progress_fails_job() {
        let (job, progress) = DownloadJob::new(PathBuf::from("/a.mbtiles"), 3);
        progress.record_tile();
        drop(progress);

        let status = job.poll_status();
        assert!(!status.alive);
        assert!(matches!(status.state, JobState::Failed(_)));
        assert_eq!(status.rendered, 1);
    }

    #[test]
    fn test_empty_job_ratio() {
        let (job, _progress) = DownloadJob::new(PathBuf::from("/a.mbtiles"), 0);
        assert_eq!(job.poll_status().progress_ratio(), 1.0);
    }
}
