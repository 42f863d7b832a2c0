//! Download progress reporter

use std::ops::ControlFlow;
use std::sync::Arc;

use super::clock::{Scheduler, TaskId};
use super::status::{StatusSink, LONG_STATUS_LIFETIME};
use crate::composite::CompositeSource;
use crate::download::{DownloadJob, JobState, JobStatus};
use crate::package::TilePackage;

/// Polls a download job and reports on it.
///
/// While the job runs each poll publishes a progress line. When it stops,
/// a completed package is opened and handed to the composite, and a final
/// line says how it went.
pub struct DownloadWatcher {
    job: DownloadJob,
    composite: Arc<CompositeSource>,
    status: Arc<dyn StatusSink>,
    finished: Option<JobStatus>,
}

impl DownloadWatcher {
    pub fn new(job: DownloadJob, composite: Arc<CompositeSource>, status: Arc<dyn StatusSink>) -> Self {
        Self {
            job,
            composite,
            status,
            finished: None,
        }
    }

    pub fn job(&self) -> &DownloadJob {
        &self.job
    }

    /// Final status, once the job has stopped and been handled.
    pub fn finished(&self) -> Option<&JobStatus> {
        self.finished.as_ref()
    }

    /// Check the job once. Breaks with the final status after it stops.
    pub fn poll(&mut self) -> ControlFlow<JobStatus> {
        if let Some(done) = &self.finished {
            return ControlFlow::Break(done.clone());
        }

        let status = self.job.poll_status();
        self.status.publish(&status.message(), LONG_STATUS_LIFETIME);
        if status.alive {
            return ControlFlow::Continue(());
        }

        self.conclude(&status);
        self.finished = Some(status.clone());
        ControlFlow::Break(status)
    }

    /// Poll on `scheduler` every `interval` seconds until the job stops.
    pub fn schedule(mut self, scheduler: &mut Scheduler, interval: f64) -> TaskId {
        scheduler.schedule_interval(interval, move |_| match self.poll() {
            ControlFlow::Continue(()) => ControlFlow::Continue(()),
            ControlFlow::Break(_) => ControlFlow::Break(()),
        })
    }

    fn conclude(&self, status: &JobStatus) {
        let path = self.job.destination();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        match &status.state {
            JobState::Completed => match TilePackage::open(path) {
                Ok(package) => {
                    self.composite.add_package(Arc::new(package));
                    self.status
                        .publish(&format!("Download complete: {}", name), LONG_STATUS_LIFETIME);
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Downloaded package unreadable");
                    self.status
                        .publish(&format!("Download failed: {}", e), LONG_STATUS_LIFETIME);
                }
            },
            JobState::Failed(reason) => {
                self.status.publish(
                    &format!("Download failed: {} ({}/{} tiles)", reason, status.rendered, status.total),
                    LONG_STATUS_LIFETIME,
                );
            }
            JobState::Running => {}
        }
    }
}

impl std::fmt::Debug for DownloadWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadWatcher")
            .field("job", &self.job)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
