//! Map session

use std::path::PathBuf;
use std::sync::Arc;

use crate::composite::{CompositeSource, ResolvedTile};
use crate::config::TileStashConfig;
use crate::coord::TileCoord;
use crate::download::{DownloadError, DownloadJob, DownloadOrchestrator, RegionRequest};
use crate::error::Result;
use crate::geocode::{Geocoder, LocationResolver, NominatimGeocoder, Place};
use crate::package::{discover_packages, package_names, PackageError, TilePackage};
use crate::provider::{ReqwestClient, TileSource, XyzTileSource};
use crate::scheduler::{
    DownloadWatcher, Scheduler, StatusBoard, StatusSink, TaskId, DEFAULT_STATUS_LIFETIME,
    LONG_STATUS_LIFETIME,
};
use crate::viewport::{ViewportController, ViewportFrame};

/// Subdomains rotated through for `{s}` in live URL templates.
const LIVE_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// The state behind one map view.
pub struct MapSession {
    config: TileStashConfig,
    composite: Arc<CompositeSource>,
    orchestrator: DownloadOrchestrator,
    locator: LocationResolver,
    viewport: ViewportController,
    scheduler: Scheduler,
    status: Arc<StatusBoard>,
    watchers: Vec<TaskId>,
}

impl MapSession {
    /// Session talking to the configured live tile server and geocoder.
    pub fn new(config: TileStashConfig) -> Result<Self> {
        let client = Arc::new(ReqwestClient::with_timeout(
            &config.user_agent,
            config.http_timeout,
        )?);

        let live = XyzTileSource::new(
            Arc::clone(&client),
            "live",
            config.live_url_template.clone(),
            config.live_max_zoom,
        )
        .with_subdomains(LIVE_SUBDOMAINS);
        let geocoder = NominatimGeocoder::with_endpoint(client, config.geocoder_url.clone());

        Ok(Self::with_sources(config, Arc::new(live), Arc::new(geocoder)))
    }

    /// Session over caller-supplied sources.
    pub fn with_sources(
        config: TileStashConfig,
        live: Arc<dyn TileSource>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let composite = CompositeSource::new(Arc::clone(&live)).with_policy(config.resolution_policy);
        let viewport = ViewportController::new(
            config.default_center.0,
            config.default_center.1,
            config.default_zoom,
        )
        .with_stage_duration(config.animation_stage)
        .with_intermediate_zoom(config.intermediate_zoom)
        .with_default_package_zoom(config.package_zoom);

        Self {
            orchestrator: DownloadOrchestrator::new(live),
            composite: Arc::new(composite),
            locator: LocationResolver::new(geocoder),
            viewport,
            scheduler: Scheduler::new(),
            status: Arc::new(StatusBoard::new()),
            watchers: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &TileStashConfig {
        &self.config
    }

    pub fn composite(&self) -> &Arc<CompositeSource> {
        &self.composite
    }

    pub fn orchestrator(&self) -> &DownloadOrchestrator {
        &self.orchestrator
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    /// Visible status line, if any.
    pub fn status(&self) -> Option<String> {
        self.status.current()
    }

    /// Whether any download is still being watched.
    pub fn has_running_downloads(&self) -> bool {
        self.watchers.iter().any(|id| self.scheduler.is_scheduled(*id))
    }

    /// Find a place by name and move the map there.
    pub fn search(&mut self, text: &str) -> Result<Place> {
        self.status
            .publish(&format!("Looking for \"{}\"", text), DEFAULT_STATUS_LIFETIME);
        let place = self.locator.geocode(text)?;
        self.viewport.animated_center_on(place.lat, place.lon)?;
        Ok(place)
    }

    /// Resolve a city, move the map there and start downloading it.
    ///
    /// Nothing is downloaded unless the place is a city.
    pub fn prepare_city_download(&mut self, text: &str, force: bool) -> Result<DownloadJob> {
        let place = self.locator.resolve_city(text)?;
        self.viewport.animated_center_on(place.lat, place.lon)?;
        let request = RegionRequest::for_city(&place, &self.config.packages_dir, self.config.city_zooms);
        self.download(request, force)
    }

    /// Start the world preset download.
    pub fn download_world(&mut self, force: bool) -> Result<DownloadJob> {
        let request = RegionRequest::world(&self.config.packages_dir, self.config.world_max_zoom)?;
        self.download(request, force)
    }

    /// Start a download and watch it from the scheduler.
    ///
    /// With `force` an existing file is replaced.
    pub fn download(&mut self, request: RegionRequest, force: bool) -> Result<DownloadJob> {
        let filename = request
            .destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let started = if force {
            self.orchestrator.force_download(request)
        } else {
            self.orchestrator.request_download(request)
        };

        let job = match started {
            Ok(job) => job,
            Err(e @ DownloadError::Conflict { .. }) => {
                self.status
                    .publish(&format!("File already exists: {}", filename), LONG_STATUS_LIFETIME);
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let watcher = DownloadWatcher::new(
            job.clone(),
            Arc::clone(&self.composite),
            Arc::clone(&self.status) as Arc<dyn StatusSink>,
        );
        let id = watcher.schedule(&mut self.scheduler, self.config.poll_interval);
        self.watchers.push(id);
        Ok(job)
    }

    /// Base names of the packages on disk.
    pub fn available_packages(&self) -> Result<Vec<String>> {
        let paths = discover_packages(&self.config.packages_dir, &self.config.package_extension)?;
        Ok(package_names(&paths))
    }

    /// Load every finished package on disk into the composite source.
    pub fn load_all_packages(&self) -> Result<usize> {
        Ok(self.composite.rescan(
            &self.config.packages_dir,
            &self.config.package_extension,
            &self.orchestrator.active_downloads(),
        )?)
    }

    /// Reload packages from disk and center the map on `name`.
    ///
    /// `name` is either a listed file name or its stem.
    pub fn load_package(&mut self, name: &str) -> Result<Arc<TilePackage>> {
        self.load_all_packages()?;

        let path = self.config.package_path(name);
        let wanted = path.file_name();
        let package = self
            .composite
            .packages()
            .iter()
            .find(|p| p.path().file_name() == wanted)
            .cloned()
            .ok_or(PackageError::NotFound(path))?;

        self.viewport.load_package(&package)?;
        Ok(package)
    }

    /// Go back to the live map only.
    pub fn load_live_map(&mut self) {
        self.composite.reset();
    }

    /// React to a position fix.
    pub fn on_location(&mut self, lat: f64, lon: f64) -> Result<String> {
        let message = self.viewport.on_location(lat, lon)?;
        self.status.publish(&message, LONG_STATUS_LIFETIME);
        Ok(message)
    }

    /// Advance time by `dt` seconds and return the viewport frame.
    pub fn tick(&mut self, dt: f64) -> ViewportFrame {
        self.scheduler.advance(dt);
        self.watchers.retain(|id| self.scheduler.is_scheduled(*id));
        self.status.advance(dt);
        self.viewport.advance(dt)
    }

    /// Resolve one tile.
    pub fn tile(&self, tile: &TileCoord) -> Result<ResolvedTile> {
        Ok(self.composite.resolve(tile)?)
    }

    /// Path a package named `name` would live at.
    pub fn package_path(&self, name: &str) -> PathBuf {
        self.config.package_path(name)
    }
}

impl std::fmt::Debug for MapSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapSession")
            .field("packages_dir", &self.config.packages_dir)
            .field("composite", &self.composite)
            .field("viewport", &self.viewport.frame())
            .field("watchers", &self.watchers.len())
            .finish()
    }
}
