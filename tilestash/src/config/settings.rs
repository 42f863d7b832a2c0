//! Runtime configuration for a map session.

use std::path::PathBuf;
use std::time::Duration;

use crate::composite::ResolutionPolicy;
use crate::coord::ZoomRange;
use crate::geocode::NOMINATIM_SEARCH_URL;
use crate::provider::OPENSTREETMAP_TEMPLATE;
use crate::viewport::{
    DEFAULT_CENTER, DEFAULT_INTERMEDIATE_ZOOM, DEFAULT_PACKAGE_ZOOM, DEFAULT_STAGE_DURATION,
    DEFAULT_ZOOM,
};

/// File extension of tile packages.
pub const DEFAULT_PACKAGE_EXTENSION: &str = "mbtiles";
/// Deepest zoom served by the public OpenStreetMap tile servers.
pub const DEFAULT_LIVE_MAX_ZOOM: u8 = 19;
/// First zoom level fetched for a city download.
pub const DEFAULT_OFFLINE_MIN_ZOOM: u8 = 12;
/// Last zoom level fetched for a city download.
pub const DEFAULT_OFFLINE_MAX_ZOOM: u8 = 15;
/// Seconds between polls of a running download.
pub const DEFAULT_POLL_INTERVAL: f64 = 0.5;
/// HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every tile and geocoder request.
pub fn default_user_agent() -> String {
    format!("tilestash/{}", env!("CARGO_PKG_VERSION"))
}

/// Per-user data directory for tilestash.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tilestash")
}

/// Directory holding downloaded packages.
pub fn default_packages_dir() -> PathBuf {
    data_dir().join("mbtiles")
}

/// Everything the orchestrator, resolver and locator need, passed in
/// explicitly at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TileStashConfig {
    /// Directory packages are discovered in and downloaded to.
    pub packages_dir: PathBuf,
    pub package_extension: String,

    /// XYZ URL template of the live source.
    pub live_url_template: String,
    pub live_max_zoom: u8,
    pub user_agent: String,
    pub http_timeout: Duration,

    /// Geocoder search endpoint.
    pub geocoder_url: String,

    /// Zoom levels fetched for a city.
    pub city_zooms: ZoomRange,
    /// Deepest level of the world preset.
    pub world_max_zoom: u8,
    pub poll_interval: f64,

    /// Initial viewport position as (lat, lon).
    pub default_center: (f64, f64),
    pub default_zoom: u8,
    pub animation_stage: f64,
    pub intermediate_zoom: u8,
    /// Zoom used when a loaded package declares no minimum.
    pub package_zoom: u8,

    pub resolution_policy: ResolutionPolicy,
}

impl Default for TileStashConfig {
    fn default() -> Self {
        Self {
            packages_dir: default_packages_dir(),
            package_extension: DEFAULT_PACKAGE_EXTENSION.to_string(),
            live_url_template: OPENSTREETMAP_TEMPLATE.to_string(),
            live_max_zoom: DEFAULT_LIVE_MAX_ZOOM,
            user_agent: default_user_agent(),
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            geocoder_url: NOMINATIM_SEARCH_URL.to_string(),
            city_zooms: ZoomRange::spanning(DEFAULT_OFFLINE_MIN_ZOOM, DEFAULT_OFFLINE_MAX_ZOOM),
            world_max_zoom: crate::download::WORLD_MAX_ZOOM,
            poll_interval: DEFAULT_POLL_INTERVAL,
            default_center: DEFAULT_CENTER,
            default_zoom: DEFAULT_ZOOM,
            animation_stage: DEFAULT_STAGE_DURATION,
            intermediate_zoom: DEFAULT_INTERMEDIATE_ZOOM,
            package_zoom: DEFAULT_PACKAGE_ZOOM,
            resolution_policy: ResolutionPolicy::default(),
        }
    }
}

impl TileStashConfig {
    /// Default configuration with packages kept in `packages_dir`.
    pub fn new(packages_dir: PathBuf) -> Self {
        Self {
            packages_dir,
            ..Default::default()
        }
    }

    /// Set the packages directory.
    pub fn with_packages_dir(mut self, dir: PathBuf) -> Self {
        self.packages_dir = dir;
        self
    }

    /// Set the live source URL template.
    pub fn with_live_url_template(mut self, template: impl Into<String>) -> Self {
        self.live_url_template = template.into();
        self
    }

    /// Set the geocoder endpoint.
    pub fn with_geocoder_url(mut self, url: impl Into<String>) -> Self {
        self.geocoder_url = url.into();
        self
    }

    /// Set the city download zoom levels.
    pub fn with_city_zooms(mut self, zooms: ZoomRange) -> Self {
        self.city_zooms = zooms;
        self
    }

    /// Set the deepest world preset zoom.
    pub fn with_world_max_zoom(mut self, zoom: u8) -> Self {
        self.world_max_zoom = zoom;
        self
    }

    /// Set the HTTP timeout.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Set the viewport animation stage duration.
    pub fn with_animation_stage(mut self, seconds: f64) -> Self {
        self.animation_stage = seconds;
        self
    }

    /// Set the package resolution policy.
    pub fn with_resolution_policy(mut self, policy: ResolutionPolicy) -> Self {
        self.resolution_policy = policy;
        self
    }

    /// Full path of the package `name`, given with or without its extension.
    ///
    /// Both `"Paris"` and the listed `"Paris.mbtiles"` map to the same file.
    pub fn package_path(&self, name: &str) -> PathBuf {
        let suffix = format!(".{}", self.package_extension);
        let stem = name.strip_suffix(suffix.as_str()).unwrap_or(name);
        self.packages_dir.join(format!("{}{}", stem, suffix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TileStashConfig::default();
        assert_eq!(config.package_extension, "mbtiles");
        assert_eq!(config.city_zooms, ZoomRange::new(12, 15).unwrap());
        assert_eq!(config.world_max_zoom, 5);
        assert_eq!(config.poll_interval, 0.5);
        assert_eq!(config.default_center, (43.61, 3.88));
        assert_eq!(config.default_zoom, 8);
        assert_eq!(config.intermediate_zoom, 5);
        assert!(config.packages_dir.ends_with("tilestash/mbtiles"));
        assert!(config.user_agent.starts_with("tilestash/"));
    }

    #[test]
    fn test_builders() {
        let config = TileStashConfig::new(PathBuf::from("/maps"))
            .with_world_max_zoom(3)
            .with_resolution_policy(ResolutionPolicy::MostSpecific);
        assert_eq!(config.package_path("World"), PathBuf::from("/maps/World.mbtiles"));
        assert_eq!(config.package_path("World.mbtiles"), PathBuf::from("/maps/World.mbtiles"));
        assert_eq!(config.world_max_zoom, 3);
        assert_eq!(config.resolution_policy, ResolutionPolicy::MostSpecific);
    }
}
