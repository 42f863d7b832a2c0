//! Composite tile resolution.
//!
//! A [`CompositeSource`] answers tile requests from the first loaded
//! package that covers the tile, falling back to a live [`TileSource`]
//! when none does.
//!
//! ```text
//! resolve(z/x/y)
//!     │
//!     ├── package 1 covers? ── has tile? ──► bytes
//!     ├── package 2 covers? ── has tile? ──► bytes
//!     │   ...
//!     └── live source ─────────────────────► bytes
//! ```
//!
//! [`TileSource`]: crate::provider::TileSource

mod source;
mod types;

pub use source::CompositeSource;
pub use types::{ResolutionPolicy, ResolveError, ResolvedTile, TileOrigin};
