//! Package listing CLI commands.

use clap::Subcommand;
use console::style;
use tilestash::config::TileStashConfig;
use tilestash::package::{discover_packages, package_names, TilePackage};

use crate::error::CliError;

/// Package subcommands.
#[derive(Debug, Subcommand)]
pub enum PackagesCommands {
    /// List downloaded packages
    List,

    /// Show what a package covers
    Info {
        /// Package name as listed, with or without extension (e.g., Paris.mbtiles)
        name: String,
    },
}

/// Run a packages subcommand.
pub fn run(command: PackagesCommands, config: &TileStashConfig) -> Result<(), CliError> {
    match command {
        PackagesCommands::List => run_list(config),
        PackagesCommands::Info { name } => run_info(&name, config),
    }
}

fn run_list(config: &TileStashConfig) -> Result<(), CliError> {
    let paths = discover_packages(&config.packages_dir, &config.package_extension)?;
    let mut names = package_names(&paths);
    names.sort();

    if names.is_empty() {
        println!("No packages in {}", config.packages_dir.display());
        println!("Use 'tilestash download world' or 'tilestash download city <name>' to get one.");
        return Ok(());
    }

    println!("Packages in {}:", config.packages_dir.display());
    for name in names {
        println!("  {}", style(name).bold());
    }
    Ok(())
}

fn run_info(name: &str, config: &TileStashConfig) -> Result<(), CliError> {
    let package = TilePackage::open(config.package_path(name))?;

    println!("{}", style(package.name()).bold());
    println!("  File:    {}", package.path().display());
    println!("  Bounds:  {}", package.bounding_box());
    println!("  Zooms:   {}", package.zoom_range());
    match package.suggested_center() {
        Some(center) => println!(
            "  Center:  {:.4}, {:.4} at zoom {}",
            center.lat, center.lon, center.zoom
        ),
        None => println!("  Center:  (not set)"),
    }
    println!("  Tiles:   {}", package.tile_count()?);
    if let Some(format) = package.metadata().get("format") {
        println!("  Format:  {}", format);
    }
    Ok(())
}
