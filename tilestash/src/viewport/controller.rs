//! Viewport animation controller

use super::transition::Transition;
use super::ViewportFrame;
use crate::coord::{CoordError, MAX_LAT, MAX_ZOOM, MIN_LAT};
use crate::package::TilePackage;

/// Default initial position (Montpellier).
pub const DEFAULT_CENTER: (f64, f64) = (43.61, 3.88);
/// Default initial zoom level.
pub const DEFAULT_ZOOM: u8 = 8;
/// Duration of each animation stage, in seconds.
pub const DEFAULT_STAGE_DURATION: f64 = 1.0;
/// Zoom level reached halfway through an animated move.
pub const DEFAULT_INTERMEDIATE_ZOOM: u8 = 5;
/// Zoom used when a loaded package declares no minimum zoom.
pub const DEFAULT_PACKAGE_ZOOM: u8 = 12;

/// Whether a transition is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportState {
    Idle,
    Transitioning,
}

/// Owns the map viewport and animates it between places.
///
/// Nothing here blocks. Time moves forward only through
/// [`advance`](Self::advance), which the scheduler calls every tick.
#[derive(Debug, Clone)]
pub struct ViewportController {
    frame: ViewportFrame,
    transition: Option<Transition>,
    stage_duration: f64,
    intermediate_zoom: u8,
    default_package_zoom: u8,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(DEFAULT_CENTER.0, DEFAULT_CENTER.1, DEFAULT_ZOOM)
    }
}

impl ViewportController {
    /// Controller resting at the given position.
    pub fn new(lat: f64, lon: f64, zoom: u8) -> Self {
        Self {
            frame: ViewportFrame {
                lat: lat.clamp(MIN_LAT, MAX_LAT),
                lon: lon.clamp(-180.0, 180.0),
                zoom: f64::from(zoom.min(MAX_ZOOM)),
            },
            transition: None,
            stage_duration: DEFAULT_STAGE_DURATION,
            intermediate_zoom: DEFAULT_INTERMEDIATE_ZOOM,
            default_package_zoom: DEFAULT_PACKAGE_ZOOM,
        }
    }

    /// Sets the duration of each animation stage.
    pub fn with_stage_duration(mut self, seconds: f64) -> Self {
        self.stage_duration = seconds.max(0.0);
        self
    }

    /// Sets the zoom reached between the two stages.
    pub fn with_intermediate_zoom(mut self, zoom: u8) -> Self {
        self.intermediate_zoom = zoom.min(MAX_ZOOM);
        self
    }

    /// Sets the zoom used for packages without a declared minimum.
    pub fn with_default_package_zoom(mut self, zoom: u8) -> Self {
        self.default_package_zoom = zoom.min(MAX_ZOOM);
        self
    }

    pub fn state(&self) -> ViewportState {
        if self.transition.is_some() {
            ViewportState::Transitioning
        } else {
            ViewportState::Idle
        }
    }

    /// The current, possibly mid-transition, frame.
    pub fn frame(&self) -> ViewportFrame {
        self.frame
    }

    /// Move straight to a position.
    ///
    /// An in-flight transition is dropped; the zoom it started from is
    /// kept.
    pub fn center_on(&mut self, lat: f64, lon: f64) -> Result<(), CoordError> {
        let (lat, lon) = checked_position(lat, lon)?;
        if let Some(transition) = self.transition.take() {
            self.frame.zoom = transition.final_zoom;
        }
        self.frame.lat = lat;
        self.frame.lon = lon;
        Ok(())
    }

    /// Animate to a position, ending at the zoom level in effect before
    /// any in-flight transition began.
    pub fn animated_center_on(&mut self, lat: f64, lon: f64) -> Result<(), CoordError> {
        let final_zoom = self.resting_zoom();
        self.animate_to(lat, lon, final_zoom)
    }

    /// Set the zoom level, dropping any transition at its current
    /// position.
    pub fn set_zoom(&mut self, zoom: u8) {
        self.transition = None;
        self.frame.zoom = f64::from(zoom.min(MAX_ZOOM));
    }

    /// Show a freshly loaded package.
    ///
    /// Animates to the package's suggested center, ending at its
    /// declared minimum zoom or the default package zoom. Without a
    /// suggested center only the zoom changes.
    pub fn load_package(&mut self, package: &TilePackage) -> Result<(), CoordError> {
        let zoom = package
            .declared_min_zoom()
            .unwrap_or(self.default_package_zoom)
            .min(MAX_ZOOM);

        match package.suggested_center() {
            Some(center) => {
                tracing::debug!(package = %package.name(), lat = center.lat, lon = center.lon, zoom, "Centering on package");
                self.animate_to(center.lat, center.lon, f64::from(zoom))
            }
            None => {
                tracing::debug!(package = %package.name(), zoom, "Package has no center");
                self.set_zoom(zoom);
                Ok(())
            }
        }
    }

    /// React to a position fix: animate there and describe it.
    pub fn on_location(&mut self, lat: f64, lon: f64) -> Result<String, CoordError> {
        self.animated_center_on(lat, lon)?;
        Ok(format!("Latitude: {:.2} / Longitude: {:.2}", lat, lon))
    }

    /// Move time forward and publish the resulting frame.
    pub fn advance(&mut self, dt: f64) -> ViewportFrame {
        if let Some(transition) = self.transition.as_mut() {
            transition.advance(dt);
            self.frame = transition.frame();
            if transition.is_finished() {
                self.transition = None;
            }
        }
        self.frame
    }

    fn resting_zoom(&self) -> f64 {
        self.transition
            .as_ref()
            .map(|t| t.final_zoom)
            .unwrap_or(self.frame.zoom)
    }

    fn animate_to(&mut self, lat: f64, lon: f64, final_zoom: f64) -> Result<(), CoordError> {
        let target = checked_position(lat, lon)?;
        let transition = Transition::new(
            self.frame,
            target,
            f64::from(self.intermediate_zoom),
            final_zoom,
            self.stage_duration,
        );

        if transition.total_duration() == 0.0 {
            self.frame = transition.end_frame();
            self.transition = None;
        } else {
            // Replaces any transition in flight
            self.transition = Some(transition);
        }
        Ok(())
    }
}

/// Validate a position, pulling polar latitudes into Mercator range.
fn checked_position(lat: f64, lon: f64) -> Result<(f64, f64), CoordError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    Ok((lat.clamp(MIN_LAT, MAX_LAT), lon))
}
