//! Helpers shared across CLI commands.

use std::path::Path;

use tilestash::config::{ConfigFile, TileStashConfig};
use tilestash::MapSession;

use crate::error::CliError;

/// Load the config file at `path`, or the default one.
pub fn load_config_file(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    let file = match path {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::load_default()?,
    };
    Ok(file)
}

/// Effective configuration: defaults overlaid with the config file.
pub fn load_config(path: Option<&Path>) -> Result<TileStashConfig, CliError> {
    Ok(load_config_file(path)?.to_config()?)
}

/// Open a session talking to the configured live services.
pub fn open_session(config: TileStashConfig) -> Result<MapSession, CliError> {
    tracing::debug!(packages = %config.packages_dir.display(), "Opening map session");
    Ok(MapSession::new(config)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[download]\nworld_max_zoom = 2\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.world_max_zoom, 2);
    }

    #[test]
    fn test_bad_config_value_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        std::fs::write(&path, "[viewport]\nzoom = far\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("viewport.zoom"));
    }
}
