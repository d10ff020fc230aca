//! Per-view observer state: look direction, zoom, location and time.
//!
//! There is no ambient clock. The host passes wall-clock milliseconds in via
//! [`ObserverFrame::set_clock`]; when time travel is active the simulated
//! timestamp is used instead. Local sidereal time is cached and refreshed by
//! [`ObserverFrame::update_lst`], which location and time-travel setters call
//! immediately.

use crate::coords::wrap_degrees;
use crate::sidereal::local_sidereal_time;

/// Allowed field-of-view range in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FovRange {
    pub min_deg: f64,
    pub max_deg: f64,
}

impl FovRange {
    /// Range for ordinary pinch zoom.
    pub const INTERACTIVE: FovRange = FovRange {
        min_deg: 20.0,
        max_deg: 120.0,
    };

    /// Clamp `fov_deg` into range. Non-finite input maps to `max_deg`.
    pub fn clamp(&self, fov_deg: f64) -> f64 {
        if fov_deg.is_finite() {
            fov_deg.clamp(self.min_deg, self.max_deg)
        } else {
            self.max_deg
        }
    }
}

impl Default for FovRange {
    /// Deep-zoom range matching the LOD breakpoints.
    fn default() -> Self {
        Self {
            min_deg: 0.1,
            max_deg: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObserverFrame {
    azimuth_deg: f64,
    altitude_deg: f64,
    fov_deg: f64,
    fov_range: FovRange,
    latitude_deg: f64,
    longitude_deg: f64,
    clock_ms: i64,
    simulated_time_ms: Option<i64>,
    lst_deg: f64,
    lst_time_ms: i64,
}

fn finite_or(v: f64, fallback: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}

impl ObserverFrame {
    /// Observer at `(latitude, longitude)` looking at azimuth 0 on the horizon,
    /// with the clock set to `now_ms`.
    pub fn new(latitude_deg: f64, longitude_deg: f64, now_ms: i64) -> Self {
        let mut frame = Self {
            azimuth_deg: 0.0,
            altitude_deg: 0.0,
            fov_deg: 60.0,
            fov_range: FovRange::default(),
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            clock_ms: now_ms,
            simulated_time_ms: None,
            lst_deg: 0.0,
            lst_time_ms: now_ms,
        };
        frame.set_location(latitude_deg, longitude_deg);
        frame
    }

    pub fn azimuth_deg(&self) -> f64 {
        self.azimuth_deg
    }

    pub fn altitude_deg(&self) -> f64 {
        self.altitude_deg
    }

    pub fn fov_deg(&self) -> f64 {
        self.fov_deg
    }

    pub fn fov_range(&self) -> FovRange {
        self.fov_range
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude_deg
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude_deg
    }

    /// Cached local sidereal time in degrees.
    pub fn lst_deg(&self) -> f64 {
        self.lst_deg
    }

    /// Timestamp the cached LST was computed for.
    pub fn lst_time_ms(&self) -> i64 {
        self.lst_time_ms
    }

    /// Simulated timestamp when time travel is active.
    pub fn simulated_time_ms(&self) -> Option<i64> {
        self.simulated_time_ms
    }

    /// Timestamp the sky is drawn for: simulated time if set, else the clock.
    pub fn effective_time_ms(&self) -> i64 {
        self.simulated_time_ms.unwrap_or(self.clock_ms)
    }

    /// Set the look direction. Azimuth wraps into `[0, 360)`, altitude clamps
    /// to `[-90, 90]`; non-finite values keep the current direction.
    pub fn set_orientation(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.azimuth_deg = wrap_degrees(finite_or(azimuth_deg, self.azimuth_deg));
        self.altitude_deg = finite_or(altitude_deg, self.altitude_deg).clamp(-90.0, 90.0);
    }

    pub fn set_fov(&mut self, fov_deg: f64) {
        self.fov_deg = self.fov_range.clamp(fov_deg);
    }

    /// Change the allowed range and re-clamp the current FOV.
    pub fn set_fov_range(&mut self, range: FovRange) {
        let min = range.min_deg.max(f64::MIN_POSITIVE);
        self.fov_range = FovRange {
            min_deg: min,
            max_deg: range.max_deg.max(min),
        };
        self.fov_deg = self.fov_range.clamp(self.fov_deg);
    }

    /// Apply a pinch gesture. `scale > 1` spreads the fingers and zooms in.
    ///
    /// Zero, negative or non-finite scales are ignored.
    pub fn zoom_by(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.set_fov(self.fov_deg / scale);
        }
    }

    /// Move the observer. Latitude clamps to `[-90, 90]`, longitude wraps into
    /// `[-180, 180)`; LST is refreshed immediately.
    pub fn set_location(&mut self, latitude_deg: f64, longitude_deg: f64) {
        self.latitude_deg = finite_or(latitude_deg, 0.0).clamp(-90.0, 90.0);
        self.longitude_deg = wrap_degrees(finite_or(longitude_deg, 0.0) + 180.0) - 180.0;
        self.update_lst();
    }

    /// Advance the wall clock. Does not refresh LST; see [`update_lst`](Self::update_lst).
    pub fn set_clock(&mut self, now_ms: i64) {
        self.clock_ms = now_ms;
    }

    /// Enter (`Some`) or leave (`None`) time travel; LST is refreshed immediately.
    pub fn set_simulated_time(&mut self, simulated_ms: Option<i64>) {
        self.simulated_time_ms = simulated_ms;
        self.update_lst();
    }

    /// Recompute LST for the effective time and current longitude.
    pub fn update_lst(&mut self) {
        let t = self.effective_time_ms();
        self.lst_deg = local_sidereal_time(t, self.longitude_deg);
        self.lst_time_ms = t;
    }

    /// Milliseconds of effective time since the cached LST was computed.
    pub fn lst_age_ms(&self) -> u64 {
        self.effective_time_ms().abs_diff(self.lst_time_ms)
    }
}
