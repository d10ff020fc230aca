//! Exponential smoothing of the camera look direction.
//!
//! Sensor readings and drag gestures both set a target orientation; each
//! frame [`OrientationSmoother::step`] moves the current orientation a fixed
//! fraction of the remaining distance toward it. Azimuth always travels the
//! short way around the 0/360 seam.

use crate::coords::{shortest_angle_delta, wrap_degrees};
use crate::observer::ObserverFrame;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingConfig {
    /// Fraction of the remaining error removed per frame for sensor input.
    pub sensor_factor: f64,
    /// Fraction of the remaining error removed per frame for drag input.
    pub drag_factor: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            sensor_factor: 0.14,
            drag_factor: 0.2,
        }
    }
}

/// Which input last set the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Sensor,
    Drag,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrientationSmoother {
    config: SmoothingConfig,
    azimuth_deg: f64,
    altitude_deg: f64,
    target_azimuth_deg: f64,
    target_altitude_deg: f64,
    source: InputSource,
}

impl Default for OrientationSmoother {
    fn default() -> Self {
        Self::new(SmoothingConfig::default())
    }
}

impl OrientationSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config: SmoothingConfig {
                sensor_factor: clamp_factor(config.sensor_factor),
                drag_factor: clamp_factor(config.drag_factor),
            },
            azimuth_deg: 0.0,
            altitude_deg: 0.0,
            target_azimuth_deg: 0.0,
            target_altitude_deg: 0.0,
            source: InputSource::Sensor,
        }
    }

    pub fn config(&self) -> SmoothingConfig {
        self.config
    }

    /// Smoothed `(azimuth, altitude)` in degrees.
    pub fn current(&self) -> (f64, f64) {
        (self.azimuth_deg, self.altitude_deg)
    }

    pub fn target(&self) -> (f64, f64) {
        (self.target_azimuth_deg, self.target_altitude_deg)
    }

    pub fn source(&self) -> InputSource {
        self.source
    }

    /// Target from a drag or programmatic look-at. Uses the drag factor.
    pub fn set_target_orientation(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.set_target(azimuth_deg, altitude_deg);
        self.source = InputSource::Drag;
    }

    /// Target from the device rotation sensor. Uses the sensor factor.
    pub fn set_sensor_orientation(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.set_target(azimuth_deg, altitude_deg);
        self.source = InputSource::Sensor;
    }

    /// Shift the target by a drag of `(dx_px, dy_px)` on a view `width_px`
    /// wide showing `fov_deg`. The sky follows the finger: dragging right
    /// turns the camera left, dragging down tilts it up.
    pub fn drag_by(&mut self, dx_px: f64, dy_px: f64, fov_deg: f64, width_px: f64) {
        if !(width_px > 0.0 && fov_deg > 0.0) || !fov_deg.is_finite() {
            return;
        }
        let deg_per_px = fov_deg / width_px;
        let (az, alt) = self.target();
        self.set_target_orientation(az - dx_px * deg_per_px, alt + dy_px * deg_per_px);
    }

    /// Jump straight to `(azimuth, altitude)` with no easing.
    pub fn snap_to(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.set_target(azimuth_deg, altitude_deg);
        self.azimuth_deg = self.target_azimuth_deg;
        self.altitude_deg = self.target_altitude_deg;
    }

    /// Advance one frame and return the new smoothed `(azimuth, altitude)`.
    pub fn step(&mut self) -> (f64, f64) {
        let factor = match self.source {
            InputSource::Sensor => self.config.sensor_factor,
            InputSource::Drag => self.config.drag_factor,
        };
        let d_az = shortest_angle_delta(self.azimuth_deg, self.target_azimuth_deg);
        let d_alt = self.target_altitude_deg - self.altitude_deg;
        if d_az != 0.0 {
            self.azimuth_deg = wrap_degrees(self.azimuth_deg + factor * d_az);
        }
        if d_alt != 0.0 {
            self.altitude_deg = (self.altitude_deg + factor * d_alt).clamp(-90.0, 90.0);
        }
        self.current()
    }

    /// Step once and write the result into `frame`.
    pub fn apply(&mut self, frame: &mut ObserverFrame) {
        let (az, alt) = self.step();
        frame.set_orientation(az, alt);
    }

    fn set_target(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        if azimuth_deg.is_finite() {
            self.target_azimuth_deg = wrap_degrees(azimuth_deg);
        }
        if altitude_deg.is_finite() {
            self.target_altitude_deg = altitude_deg.clamp(-90.0, 90.0);
        }
    }
}

fn clamp_factor(f: f64) -> f64 {
    if f.is_finite() {
        f.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotent_at_rest() {
        let mut s = OrientationSmoother::default();
        s.snap_to(123.4, -12.5);
        s.set_sensor_orientation(123.4, -12.5);
        assert_eq!(s.step(), (123.4, -12.5));
        s.set_target_orientation(123.4, -12.5);
        assert_eq!(s.step(), (123.4, -12.5));
    }

    #[test]
    fn test_exponential_approach() {
        let mut s = OrientationSmoother::default();
        s.set_sensor_orientation(100.0, 50.0);
        let (az, alt) = s.step();
        assert!((az - 14.0).abs() < 1e-12, "expected 14, got {}", az);
        assert!((alt - 7.0).abs() < 1e-12, "expected 7, got {}", alt);

        s.set_target_orientation(100.0, 50.0);
        let (az2, _) = s.step();
        assert!((az2 - (14.0 + 0.2 * 86.0)).abs() < 1e-12);

        for _ in 0..200 {
            s.step();
        }
        let (az, alt) = s.current();
        assert!((az - 100.0).abs() < 1e-9 && (alt - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_wraparound_takes_short_way() {
        let mut s = OrientationSmoother::default();
        s.snap_to(359.0, 0.0);
        s.set_sensor_orientation(1.0, 0.0);
        for _ in 0..100 {
            let (az, _) = s.step();
            assert!(
                az >= 359.0 || az <= 1.0,
                "azimuth {} strayed off the short arc",
                az
            );
        }
        assert!(shortest_angle_delta(s.current().0, 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_altitude_clamped() {
        let mut s = OrientationSmoother::default();
        s.set_target_orientation(0.0, 200.0);
        assert_eq!(s.target().1, 90.0);
        s.snap_to(0.0, -400.0);
        assert_eq!(s.current().1, -90.0);
    }

    #[test]
    fn test_drag_moves_target_by_fov_fraction() {
        let mut s = OrientationSmoother::default();
        s.snap_to(10.0, 0.0);
        // Half the view width at 60 deg FOV is 30 deg
        s.drag_by(500.0, -250.0, 60.0, 1000.0);
        let (az, alt) = s.target();
        assert!((az - 340.0).abs() < 1e-12, "az {}", az);
        assert!((alt + 15.0).abs() < 1e-12, "alt {}", alt);
        assert_eq!(s.source(), InputSource::Drag);

        s.drag_by(10.0, 10.0, 60.0, 0.0);
        assert_eq!(s.target(), (az, alt));
    }

    #[test]
    fn test_apply_writes_frame() {
        let mut s = OrientationSmoother::default();
        let mut frame = ObserverFrame::new(0.0, 0.0, 0);
        s.snap_to(350.0, 20.0);
        s.apply(&mut frame);
        assert_eq!(frame.azimuth_deg(), 350.0);
        assert_eq!(frame.altitude_deg(), 20.0);
    }
}
