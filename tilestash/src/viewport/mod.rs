//! Map viewport and its animated transitions.
//!
//! The controller is a small state machine:
//!
//! ```text
//! Idle ──animated_center_on──► Transitioning ──advance past end──► Idle
//!                                   │  ▲
//!                                   └──┘ animated_center_on (replaces)
//! ```

mod controller;
mod transition;

pub use controller::{
    ViewportController, ViewportState, DEFAULT_CENTER, DEFAULT_INTERMEDIATE_ZOOM,
    DEFAULT_PACKAGE_ZOOM, DEFAULT_STAGE_DURATION, DEFAULT_ZOOM,
};

/// A consistent (lat, lon, zoom) snapshot of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportFrame {
    pub lat: f64,
    pub lon: f64,
    /// Fractional during transitions.
    pub zoom: f64,
}

impl ViewportFrame {
    /// Integer zoom level to fetch tiles at.
    pub fn zoom_level(&self) -> u8 {
        self.zoom.max(0.0).floor() as u8
    }
}
