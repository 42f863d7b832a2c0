//! Configuration management CLI commands.
//!
//! Provides `config get`, `config set`, `config list`, and `config path`
//! for viewing and editing settings from the command line.

use std::path::Path;

use clap::Subcommand;
use tilestash::config::ConfigKey;

use super::common::load_config_file;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Get a configuration value
    Get {
        /// Configuration key in format section.key (e.g., download.city_max_zoom)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key in format section.key (e.g., download.city_max_zoom)
        key: String,

        /// Value to set
        value: String,
    },

    /// List all configuration settings
    List,

    /// Show the configuration file path
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key, config_path),
        ConfigCommands::Set { key, value } => run_set(&key, &value, config_path),
        ConfigCommands::List => run_list(config_path),
        ConfigCommands::Path => run_path(config_path),
    }
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "Unknown configuration key '{}'. Use 'tilestash config list' to see available keys.",
            key
        ))
    })
}

/// Get a configuration value.
fn run_get(key: &str, config_path: Option<&Path>) -> Result<(), CliError> {
    let config_key = parse_key(key)?;
    let config = load_config_file(config_path)?.to_config()?;
    println!("{}", config_key.get(&config));
    Ok(())
}

/// Set a configuration value.
fn run_set(key: &str, value: &str, config_path: Option<&Path>) -> Result<(), CliError> {
    let config_key = parse_key(key)?;

    let mut file = load_config_file(config_path)?;
    file.set(config_key, value)?;
    file.save()?;

    println!("Set {} = {}", config_key.name(), value);
    Ok(())
}

/// List all configuration settings.
fn run_list(config_path: Option<&Path>) -> Result<(), CliError> {
    let file = load_config_file(config_path)?;
    let config = file.to_config()?;

    println!("Configuration Settings");
    println!("======================");
    println!();

    let mut current_section = "";

    for key in ConfigKey::all() {
        let section = key.section();

        if section != current_section {
            if !current_section.is_empty() {
                println!();
            }
            println!("[{}]", section);
            current_section = section;
        }

        let marker = if file.raw(*key).is_some() { "" } else { "  (default)" };
        println!("  {} = {}{}", key.key_name(), key.get(&config), marker);
    }

    Ok(())
}

/// Show the configuration file path.
fn run_path(config_path: Option<&Path>) -> Result<(), CliError> {
    let file = load_config_file(config_path)?;
    println!("{}", file.path().display());
    Ok(())
}
