//! Locally stored tile packages.
//!
//! A tile package is a single MBTiles file holding a pyramid of tiles for
//! one region plus a key/value metadata block. This module only reads
//! packages; writing them is the download module's job.
//!
//! # Example
//!
//! ```ignore
//! use tilestash::coord::TileCoord;
//! use tilestash::package::TilePackage;
//!
//! let package = TilePackage::open("/data/mbtiles/Paris.mbtiles")?;
//! println!("{} covers {} at {}", package.name(), package.bounding_box(), package.zoom_range());
//!
//! if let Some(bytes) = package.read_tile(&TileCoord::new(12, 2074, 1409))? {
//!     println!("{} bytes", bytes.len());
//! }
//! ```

mod discovery;
mod error;
mod mbtiles;
mod metadata;

pub use discovery::{discover_packages, package_names};
pub use error::PackageError;
pub use mbtiles::TilePackage;
pub use metadata::{PackageMetadata, SuggestedCenter};
