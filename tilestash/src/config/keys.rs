//! Named configuration keys as they appear in `config.ini`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::error::ConfigError;
use super::settings::TileStashConfig;
use crate::composite::ResolutionPolicy;
use crate::coord::{ZoomRange, MAX_ZOOM};

/// A `section.key` entry of the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    PackagesDirectory,
    PackagesExtension,
    LiveUrlTemplate,
    LiveMaxZoom,
    LiveUserAgent,
    LiveTimeoutSecs,
    GeocoderUrl,
    DownloadCityMinZoom,
    DownloadCityMaxZoom,
    DownloadWorldMaxZoom,
    DownloadPollInterval,
    ViewportLatitude,
    ViewportLongitude,
    ViewportZoom,
    ViewportStageDuration,
    ViewportIntermediateZoom,
    ViewportPackageZoom,
    ResolverPolicy,
}

impl ConfigKey {
    /// Every key, in file order.
    pub const ALL: [ConfigKey; 18] = [
        ConfigKey::PackagesDirectory,
        ConfigKey::PackagesExtension,
        ConfigKey::LiveUrlTemplate,
        ConfigKey::LiveMaxZoom,
        ConfigKey::LiveUserAgent,
        ConfigKey::LiveTimeoutSecs,
        ConfigKey::GeocoderUrl,
        ConfigKey::DownloadCityMinZoom,
        ConfigKey::DownloadCityMaxZoom,
        ConfigKey::DownloadWorldMaxZoom,
        ConfigKey::DownloadPollInterval,
        ConfigKey::ViewportLatitude,
        ConfigKey::ViewportLongitude,
        ConfigKey::ViewportZoom,
        ConfigKey::ViewportStageDuration,
        ConfigKey::ViewportIntermediateZoom,
        ConfigKey::ViewportPackageZoom,
        ConfigKey::ResolverPolicy,
    ];

    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &Self::ALL
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// INI section the key lives in.
    pub fn section(&self) -> &'static str {
        self.parts().0
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        self.parts().1
    }

    /// INI section and key.
    pub fn parts(&self) -> (&'static str, &'static str) {
        match self {
            ConfigKey::PackagesDirectory => ("packages", "directory"),
            ConfigKey::PackagesExtension => ("packages", "extension"),
            ConfigKey::LiveUrlTemplate => ("live", "url_template"),
            ConfigKey::LiveMaxZoom => ("live", "max_zoom"),
            ConfigKey::LiveUserAgent => ("live", "user_agent"),
            ConfigKey::LiveTimeoutSecs => ("live", "timeout_secs"),
            ConfigKey::GeocoderUrl => ("geocoder", "url"),
            ConfigKey::DownloadCityMinZoom => ("download", "city_min_zoom"),
            ConfigKey::DownloadCityMaxZoom => ("download", "city_max_zoom"),
            ConfigKey::DownloadWorldMaxZoom => ("download", "world_max_zoom"),
            ConfigKey::DownloadPollInterval => ("download", "poll_interval"),
            ConfigKey::ViewportLatitude => ("viewport", "latitude"),
            ConfigKey::ViewportLongitude => ("viewport", "longitude"),
            ConfigKey::ViewportZoom => ("viewport", "zoom"),
            ConfigKey::ViewportStageDuration => ("viewport", "stage_duration"),
            ConfigKey::ViewportIntermediateZoom => ("viewport", "intermediate_zoom"),
            ConfigKey::ViewportPackageZoom => ("viewport", "package_zoom"),
            ConfigKey::ResolverPolicy => ("resolver", "policy"),
        }
    }

    /// Current value of this key in `config`.
    pub fn get(&self, config: &TileStashConfig) -> String {
        match self {
            ConfigKey::PackagesDirectory => config.packages_dir.display().to_string(),
            ConfigKey::PackagesExtension => config.package_extension.clone(),
            ConfigKey::LiveUrlTemplate => config.live_url_template.clone(),
            ConfigKey::LiveMaxZoom => config.live_max_zoom.to_string(),
            ConfigKey::LiveUserAgent => config.user_agent.clone(),
            ConfigKey::LiveTimeoutSecs => config.http_timeout.as_secs().to_string(),
            ConfigKey::GeocoderUrl => config.geocoder_url.clone(),
            ConfigKey::DownloadCityMinZoom => config.city_zooms.min().to_string(),
            ConfigKey::DownloadCityMaxZoom => config.city_zooms.max().to_string(),
            ConfigKey::DownloadWorldMaxZoom => config.world_max_zoom.to_string(),
            ConfigKey::DownloadPollInterval => config.poll_interval.to_string(),
            ConfigKey::ViewportLatitude => config.default_center.0.to_string(),
            ConfigKey::ViewportLongitude => config.default_center.1.to_string(),
            ConfigKey::ViewportZoom => config.default_zoom.to_string(),
            ConfigKey::ViewportStageDuration => config.animation_stage.to_string(),
            ConfigKey::ViewportIntermediateZoom => config.intermediate_zoom.to_string(),
            ConfigKey::ViewportPackageZoom => config.package_zoom.to_string(),
            ConfigKey::ResolverPolicy => config.resolution_policy.to_string(),
        }
    }

    /// Parse `value` and store it in `config`.
    ///
    /// `config` is left untouched when the value is rejected.
    pub fn set(&self, config: &mut TileStashConfig, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::PackagesDirectory => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.packages_dir = PathBuf::from(value);
            }
            ConfigKey::PackagesExtension => {
                let ext = value.trim_start_matches('.');
                if ext.is_empty() || ext.contains(['/', '\\', '*']) {
                    return Err(self.invalid(value, "must be a plain file extension"));
                }
                config.package_extension = ext.to_string();
            }
            ConfigKey::LiveUrlTemplate => {
                if !["{z}", "{x}", "{y}"].iter().all(|p| value.contains(p)) {
                    return Err(self.invalid(value, "must contain {z}, {x} and {y}"));
                }
                config.live_url_template = value.to_string();
            }
            ConfigKey::LiveMaxZoom => config.live_max_zoom = self.zoom(value)?,
            ConfigKey::LiveUserAgent => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.user_agent = value.to_string();
            }
            ConfigKey::LiveTimeoutSecs => {
                let secs: u64 = self.parse(value)?;
                if secs == 0 {
                    return Err(self.invalid(value, "must be at least 1"));
                }
                config.http_timeout = Duration::from_secs(secs);
            }
            ConfigKey::GeocoderUrl => {
                reqwest::Url::parse(value).map_err(|e| self.invalid(value, &e.to_string()))?;
                config.geocoder_url = value.to_string();
            }
            // Moving one bound past the other drags the other along
            ConfigKey::DownloadCityMinZoom => {
                let min = self.zoom(value)?;
                config.city_zooms = ZoomRange::spanning(min, config.city_zooms.max().max(min));
            }
            ConfigKey::DownloadCityMaxZoom => {
                let max = self.zoom(value)?;
                config.city_zooms = ZoomRange::spanning(config.city_zooms.min().min(max), max);
            }
            ConfigKey::DownloadWorldMaxZoom => config.world_max_zoom = self.zoom(value)?,
            ConfigKey::DownloadPollInterval => config.poll_interval = self.positive(value)?,
            ConfigKey::ViewportLatitude => {
                let lat: f64 = self.parse(value)?;
                if !(-90.0..=90.0).contains(&lat) {
                    return Err(self.invalid(value, "must be between -90 and 90"));
                }
                config.default_center.0 = lat;
            }
            ConfigKey::ViewportLongitude => {
                let lon: f64 = self.parse(value)?;
                if !(-180.0..=180.0).contains(&lon) {
                    return Err(self.invalid(value, "must be between -180 and 180"));
                }
                config.default_center.1 = lon;
            }
            ConfigKey::ViewportZoom => config.default_zoom = self.zoom(value)?,
            ConfigKey::ViewportStageDuration => {
                let secs: f64 = self.parse(value)?;
                if !(secs.is_finite() && secs >= 0.0) {
                    return Err(self.invalid(value, "must be zero or more"));
                }
                config.animation_stage = secs;
            }
            ConfigKey::ViewportIntermediateZoom => config.intermediate_zoom = self.zoom(value)?,
            ConfigKey::ViewportPackageZoom => config.package_zoom = self.zoom(value)?,
            ConfigKey::ResolverPolicy => {
                config.resolution_policy = value
                    .parse::<ResolutionPolicy>()
                    .map_err(|e| self.invalid(value, &e))?;
            }
        }
        Ok(())
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn parse<T: FromStr>(&self, value: &str) -> Result<T, ConfigError>
    where
        T::Err: fmt::Display,
    {
        value
            .parse::<T>()
            .map_err(|e| self.invalid(value, &e.to_string()))
    }

    fn zoom(&self, value: &str) -> Result<u8, ConfigError> {
        let zoom: u8 = self.parse(value)?;
        if zoom > MAX_ZOOM {
            return Err(self.invalid(value, &format!("must be at most {}", MAX_ZOOM)));
        }
        Ok(zoom)
    }

    fn positive(&self, value: &str) -> Result<f64, ConfigError> {
        let n: f64 = self.parse(value)?;
        if !(n.is_finite() && n > 0.0) {
            return Err(self.invalid(value, "must be greater than zero"));
        }
        Ok(n)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (section, key) = self.parts();
        write!(f, "{}.{}", section, key)
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::ALL
            .iter()
            .copied()
            .find(|k| k.to_string() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_parse() {
        assert_eq!(
            "download.city_min_zoom".parse::<ConfigKey>().unwrap(),
            ConfigKey::DownloadCityMinZoom
        );
        assert_eq!(
            " Packages.Directory ".parse::<ConfigKey>().unwrap(),
            ConfigKey::PackagesDirectory
        );
        assert!(matches!(
            "packages.colour".parse::<ConfigKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_key_names_unique() {
        let names: std::collections::HashSet<String> =
            ConfigKey::ALL.iter().map(|k| k.to_string()).collect();
        assert_eq!(names.len(), ConfigKey::ALL.len());
    }

    #[test]
    fn test_set_and_get() {
        let mut config = TileStashConfig::default();
        ConfigKey::DownloadWorldMaxZoom.set(&mut config, "4").unwrap();
        ConfigKey::ResolverPolicy.set(&mut config, "most-specific").unwrap();
        ConfigKey::PackagesExtension.set(&mut config, ".mbtiles").unwrap();

        assert_eq!(ConfigKey::DownloadWorldMaxZoom.get(&config), "4");
        assert_eq!(config.resolution_policy, ResolutionPolicy::MostSpecific);
        assert_eq!(config.package_extension, "mbtiles");
    }

    #[test]
    fn test_city_zoom_bounds_stay_ordered() {
        let mut config = TileStashConfig::default();
        ConfigKey::DownloadCityMinZoom.set(&mut config, "16").unwrap();
        assert_eq!(config.city_zooms, ZoomRange::new(16, 16).unwrap());

        ConfigKey::DownloadCityMaxZoom.set(&mut config, "18").unwrap();
        assert_eq!(config.city_zooms, ZoomRange::new(16, 18).unwrap());

        ConfigKey::DownloadCityMaxZoom.set(&mut config, "10").unwrap();
        assert_eq!(config.city_zooms, ZoomRange::new(10, 10).unwrap());

        let err = ConfigKey::DownloadCityMinZoom.set(&mut config, "20").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert_eq!(config.city_zooms, ZoomRange::new(10, 10).unwrap());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = TileStashConfig::default();
        let before = config.clone();

        assert!(ConfigKey::LiveMaxZoom.set(&mut config, "23").is_err());
        assert!(ConfigKey::LiveMaxZoom.set(&mut config, "deep").is_err());
        assert!(ConfigKey::LiveUrlTemplate.set(&mut config, "https://x/{z}.png").is_err());
        assert!(ConfigKey::GeocoderUrl.set(&mut config, "not a url").is_err());
        assert!(ConfigKey::DownloadPollInterval.set(&mut config, "0").is_err());
        assert!(ConfigKey::ViewportLatitude.set(&mut config, "95").is_err());
        assert!(ConfigKey::LiveTimeoutSecs.set(&mut config, "0").is_err());

        assert_eq!(config, before);
    }
}
