//! Tile command - resolve a single tile through the composite source.

use std::fs;
use std::path::PathBuf;

use tilestash::coord::TileCoord;
use tilestash::MapSession;

use crate::error::CliError;

/// Arguments for the tile command.
pub struct TileArgs {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
    pub output: Option<PathBuf>,
    pub live_only: bool,
}

/// Resolve a tile, preferring local packages, and report where it came from.
pub fn run(session: &MapSession, args: TileArgs) -> Result<(), CliError> {
    let tile = TileCoord::new(args.zoom, args.x, args.y);
    if !tile.is_valid() {
        return Err(CliError::Config(format!("tile {} is out of range", tile)));
    }

    if !args.live_only {
        let loaded = session.load_all_packages()?;
        tracing::debug!(packages = loaded, "Packages loaded");
    }

    let resolved = session.tile(&tile)?;
    println!("{}: {} bytes from {}", tile, resolved.data.len(), resolved.origin);

    if let Some(path) = args.output {
        fs::write(&path, &resolved.data)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}
