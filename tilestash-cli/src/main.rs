//! TileStash CLI - command-line interface
//!
//! Downloads regions into offline packages and resolves tiles through the
//! same composite source the map uses.

mod commands;
mod error;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tilestash::logging::{default_log_dir, init_logging};

use commands::common::{load_config, open_session};
use commands::config::ConfigCommands;
use commands::download::DownloadCommands;
use commands::packages::PackagesCommands;
use commands::tile::TileArgs;
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "tilestash", version, about = "Offline map packages for slippy maps")]
struct Cli {
    /// Config file to use instead of the default one
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Inspect downloaded packages
    #[command(subcommand)]
    Packages(PackagesCommands),

    /// Download a region into a package
    #[command(subcommand)]
    Download(DownloadCommands),

    /// Look up a place by name
    Search {
        /// Address or place name
        query: String,
    },

    /// Resolve one tile, preferring local packages
    Tile {
        /// Zoom level
        zoom: u8,
        /// Tile column
        x: u32,
        /// Tile row (XYZ scheme)
        y: u32,
        /// Write the tile bytes to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip local packages
        #[arg(long)]
        live_only: bool,
    },

    /// View or edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let _logging = match init_logging(&default_log_dir(), filter) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    if let Err(e) = run(cli) {
        tracing::debug!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Config(command) => commands::config::run(command, config_path),
        Commands::Packages(command) => {
            let config = load_config(config_path)?;
            commands::packages::run(command, &config)
        }
        Commands::Download(command) => {
            let mut session = open_session(load_config(config_path)?)?;
            commands::download::run(&mut session, command)
        }
        Commands::Search { query } => {
            let mut session = open_session(load_config(config_path)?)?;
            commands::search::run(&mut session, &query)
        }
        Commands::Tile {
            zoom,
            x,
            y,
            output,
            live_only,
        } => {
            let session = open_session(load_config(config_path)?)?;
            commands::tile::run(
                &session,
                TileArgs {
                    zoom,
                    x,
                    y,
                    output,
                    live_only,
                },
            )
        }
    }
}
