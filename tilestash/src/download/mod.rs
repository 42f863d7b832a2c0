//! Region downloads into new tile packages.
//!
//! This module turns a region request into a running background fetch:
//! - Region requests and presets (`request`)
//! - Job handles with pollable progress (`job`)
//! - The background fetch itself (`fetch`)
//! - MBTiles writing (`writer`)
//! - High-level orchestration (`orchestrator`)
//!
//! # Lifecycle
//!
//! ```text
//! request_download ──► Running ──► Completed
//!                         │
//!                         └──────► Failed(reason)
//! ```
//!
//! There is no pause, resume or cancel. Callers poll
//! [`DownloadJob::poll_status`] until `alive` is false.
//!
//! # Example
//!
//! ```ignore
//! use tilestash::download::{DownloadOrchestrator, RegionRequest};
//!
//! let orchestrator = DownloadOrchestrator::new(live_source);
//! let job = orchestrator.request_download(RegionRequest::world(&dir, 5)?)?;
//!
//! // On every scheduler tick:
//! let status = job.poll_status();
//! println!("{}", status.message());
//! ```

mod error;
mod fetch;
mod job;
mod orchestrator;
mod request;
mod writer;

pub use error::{DownloadError, DownloadResult};
pub use job::{DownloadJob, JobState, JobStatus};
pub use orchestrator::DownloadOrchestrator;
pub use request::{RegionRequest, ZoomLevels, WORLD_BBOX, WORLD_FILENAME, WORLD_MAX_ZOOM};
pub use writer::{MbTilesWriter, PackageInfo};
