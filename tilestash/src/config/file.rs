//! INI configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use ini::Ini;

use super::error::ConfigError;
use super::keys::ConfigKey;
use super::settings::TileStashConfig;

/// Default location of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilestash")
        .join("config.ini")
}

/// A configuration file on disk.
///
/// Keys missing from the file keep their defaults; keys the crate does
/// not know are left alone when the file is written back.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    ini: Ini,
}

impl ConfigFile {
    /// Load `path`, or start empty if it does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self {
                path,
                ini: Ini::new(),
            });
        }

        let ini = Ini::load_from_file(&path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.clone(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.clone(),
                message: e.to_string(),
            },
        })?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(Self { path, ini })
    }

    /// Load the file at the default location.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(config_file_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw value stored for `key`, if the file sets it.
    pub fn raw(&self, key: ConfigKey) -> Option<&str> {
        let (section, name) = key.parts();
        self.ini.get_from(Some(section), name)
    }

    /// Validate `value` and store it under `key`.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<(), ConfigError> {
        let mut probe = self.to_config()?;
        key.set(&mut probe, value)?;

        let (section, name) = key.parts();
        self.ini
            .with_section(Some(section))
            .set(name, key.get(&probe));

        // The other city bound may have been dragged along
        if let Some(other) = city_zoom_partner(key) {
            if self.raw(other).is_some() {
                let (section, name) = other.parts();
                self.ini
                    .with_section(Some(section))
                    .set(name, other.get(&probe));
            }
        }
        Ok(())
    }

    /// Build the effective configuration: defaults overlaid by the file.
    pub fn to_config(&self) -> Result<TileStashConfig, ConfigError> {
        let mut config = TileStashConfig::default();
        for key in ConfigKey::ALL {
            if let Some(value) = self.raw(key) {
                key.set(&mut config, value)?;
            }
        }
        self.check_city_zooms()?;
        Ok(config)
    }

    /// Both city bounds given in the file must be in order.
    fn check_city_zooms(&self) -> Result<(), ConfigError> {
        let min_key = ConfigKey::DownloadCityMinZoom;
        let max_key = ConfigKey::DownloadCityMaxZoom;
        let (Some(min), Some(max)) = (self.raw(min_key), self.raw(max_key)) else {
            return Ok(());
        };

        match (min.trim().parse::<u8>(), max.trim().parse::<u8>()) {
            (Ok(lo), Ok(hi)) if lo > hi => Err(ConfigError::InvalidValue {
                key: min_key.to_string(),
                value: min.to_string(),
                reason: format!("must not exceed {} ({})", max_key, hi),
            }),
            _ => Ok(()),
        }
    }

    /// Store every key of `config`.
    pub fn update_from(&mut self, config: &TileStashConfig) {
        for key in ConfigKey::ALL {
            let (section, name) = key.parts();
            self.ini
                .with_section(Some(section))
                .set(name, key.get(config));
        }
    }

    /// Write the file, creating its directory if needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        self.ini.write_to_file(&self.path).map_err(io_err)?;

        tracing::info!(path = %self.path.display(), "Saved config file");
        Ok(())
    }
}

fn city_zoom_partner(key: ConfigKey) -> Option<ConfigKey> {
    match key {
        ConfigKey::DownloadCityMinZoom => Some(ConfigKey::DownloadCityMaxZoom),
        ConfigKey::DownloadCityMaxZoom => Some(ConfigKey::DownloadCityMinZoom),
        _ => None,
    }
}
