//! Non-blocking timing for the UI thread.
//!
//! Everything that waits is expressed as "check back in N seconds": a
//! [`Scheduler`] runs callbacks on a simulated clock, a [`StatusBoard`]
//! keeps a message up for a while, and a [`DownloadWatcher`] polls a
//! running download until it stops.

mod clock;
mod status;
mod watcher;

pub use clock::{Scheduler, TaskId};
pub use status::{StatusBoard, StatusSink, DEFAULT_STATUS_LIFETIME, LONG_STATUS_LIFETIME};
pub use watcher::DownloadWatcher;

#[cfg(test)]
pub use status::tests::RecordingSink;
