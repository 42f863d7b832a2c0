//! Configuration.
//!
//! [`TileStashConfig`] is a plain struct handed to each component at
//! construction. [`ConfigFile`] persists it as INI, one `section.key`
//! per [`ConfigKey`]:
//!
//! ```ini
//! [packages]
//! directory = /home/me/.local/share/tilestash/mbtiles
//!
//! [download]
//! city_min_zoom = 12
//! city_max_zoom = 15
//! ```

mod error;
mod file;
mod keys;
mod settings;

pub use error::ConfigError;
pub use file::{config_file_path, ConfigFile};
pub use keys::ConfigKey;
pub use settings::{
    data_dir, default_packages_dir, default_user_agent, TileStashConfig,
    DEFAULT_HTTP_TIMEOUT, DEFAULT_LIVE_MAX_ZOOM, DEFAULT_OFFLINE_MAX_ZOOM,
    DEFAULT_OFFLINE_MIN_ZOOM, DEFAULT_PACKAGE_EXTENSION, DEFAULT_POLL_INTERVAL,
};
