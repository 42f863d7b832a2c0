//! Two-stage timed transition

use super::ViewportFrame;

/// An in-flight animated move.
///
/// Stage one pans towards the target while zooming to the intermediate
/// level; stage two zooms from there to the final level in place.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transition {
    from: ViewportFrame,
    target_lat: f64,
    target_lon: f64,
    intermediate_zoom: f64,
    pub(crate) final_zoom: f64,
    stage_duration: f64,
    elapsed: f64,
}

impl Transition {
    pub(crate) fn new(
        from: ViewportFrame,
        target: (f64, f64),
        intermediate_zoom: f64,
        final_zoom: f64,
        stage_duration: f64,
    ) -> Self {
        Self {
            from,
            target_lat: target.0,
            target_lon: target.1,
            intermediate_zoom,
            final_zoom,
            stage_duration: stage_duration.max(0.0),
            elapsed: 0.0,
        }
    }

    pub(crate) fn total_duration(&self) -> f64 {
        self.stage_duration * 2.0
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.elapsed >= self.total_duration()
    }

    /// Move time forward by `dt`, never past the end.
    pub(crate) fn advance(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.total_duration());
        }
    }

    /// Frame at the current elapsed time.
    pub(crate) fn frame(&self) -> ViewportFrame {
        if self.stage_duration == 0.0 || self.is_finished() {
            return self.end_frame();
        }

        if self.elapsed < self.stage_duration {
            let t = self.elapsed / self.stage_duration;
            ViewportFrame {
                lat: lerp(self.from.lat, self.target_lat, t),
                lon: lerp(self.from.lon, self.target_lon, t),
                zoom: lerp(self.from.zoom, self.intermediate_zoom, t),
            }
        } else {
            let t = (self.elapsed - self.stage_duration) / self.stage_duration;
            ViewportFrame {
                lat: self.target_lat,
                lon: self.target_lon,
                zoom: lerp(self.intermediate_zoom, self.final_zoom, t),
            }
        }
    }

    pub(crate) fn end_frame(&self) -> ViewportFrame {
        ViewportFrame {
            lat: self.target_lat,
            lon: self.target_lon,
            zoom: self.final_zoom,
        }
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
