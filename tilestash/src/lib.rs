//! TileStash - Offline map packages for slippy maps
//!
//! This library downloads regions of a tile map into local MBTiles
//! packages and serves tiles from those packages, falling back to a live
//! tile server for anything they do not cover.
//!
//! # Modules
//!
//! - [`coord`] - Web Mercator tile math
//! - [`package`] - Reading MBTiles packages
//! - [`provider`] - Live tile sources
//! - [`composite`] - Package-first tile resolution
//! - [`download`] - Background region downloads
//! - [`geocode`] - Place-name lookup
//! - [`viewport`] - Animated map viewport
//! - [`scheduler`] - Non-blocking timing and status reporting
//! - [`config`] - Configuration and the INI config file
//! - [`logging`] - Subscriber setup for binaries
//! - [`session`] - Everything wired together for one map view

pub mod composite;
pub mod config;
pub mod coord;
pub mod download;
pub mod error;
pub mod geocode;
pub mod logging;
pub mod package;
pub mod provider;
pub mod scheduler;
pub mod session;
pub mod viewport;

pub use error::{Error, Result};
pub use session::MapSession;
