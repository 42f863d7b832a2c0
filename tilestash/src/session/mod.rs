//! A map session wiring every component together.
//!
//! [`MapSession`] is what a UI drives: it owns the viewport, the
//! scheduler and the status board, and shares one composite source with
//! every download watcher it starts.
//!
//! ```text
//!  search / download city ──► LocationResolver ──► ViewportController
//!                                   │
//!                                   ▼
//!                          DownloadOrchestrator ──► background fetch
//!                                   │
//!                       DownloadWatcher (polled by Scheduler)
//!                                   │ completed
//!                                   ▼
//!  tile(z/x/y) ───────────► CompositeSource ──► package | live
//! ```

mod map;

pub use map::MapSession;
