//! Reference overlays: cardinal markers, the horizon (alt/az) grid, and the
//! equatorial (RA/Dec) grid.
//!
//! Cardinal markers and the alt/az grid are ground-fixed and must be drawn
//! through a [`ProjectionMode::GroundFixed`] projector. The equatorial grid
//! rotates with the stars and uses a sky-fixed projector. Grid lines are
//! sampled along great or small circles and returned as screen segments.
//!
//! In the view frame north lies at azimuth 270° and east at 0°; azimuth
//! increases to the right. [`compass_to_view_azimuth`] converts a compass
//! bearing.
//!
//! [`ProjectionMode::GroundFixed`]: crate::projection::ProjectionMode::GroundFixed

use crate::coords::{horizon_to_uvec, radec_to_uvec, wrap_degrees};
use crate::projection::SphereProjector;
use crate::render::LineSegment;
use crate::Vector3;

/// View-frame azimuth of true north.
pub const NORTH_AZIMUTH_DEG: f64 = 270.0;

/// Compass labels and their compass bearings.
pub const CARDINAL_DIRECTIONS: [(&str, f64); 8] = [
    ("N", 0.0),
    ("NE", 45.0),
    ("E", 90.0),
    ("SE", 135.0),
    ("S", 180.0),
    ("SW", 225.0),
    ("W", 270.0),
    ("NW", 315.0),
];

/// Convert a compass bearing (0° north, 90° east) to view-frame azimuth.
pub fn compass_to_view_azimuth(compass_deg: f64) -> f64 {
    wrap_degrees(compass_deg + NORTH_AZIMUTH_DEG)
}

/// Inverse of [`compass_to_view_azimuth`].
pub fn view_to_compass_azimuth(view_az_deg: f64) -> f64 {
    wrap_degrees(view_az_deg - NORTH_AZIMUTH_DEG)
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridConfig {
    /// Spacing of altitude circles.
    pub alt_step_deg: f64,
    /// Spacing of azimuth meridians.
    pub az_step_deg: f64,
    pub dec_step_deg: f64,
    pub ra_step_deg: f64,
    /// Distance between samples along a grid line.
    pub sample_step_deg: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            alt_step_deg: 15.0,
            az_step_deg: 30.0,
            dec_step_deg: 15.0,
            ra_step_deg: 30.0,
            sample_step_deg: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridLineKind {
    /// Circle of constant altitude (0° is the horizon).
    Altitude(f64),
    /// Meridian of constant view-frame azimuth.
    Azimuth(f64),
    Declination(f64),
    RightAscension(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLine {
    pub kind: GridLineKind,
    pub segments: Vec<LineSegment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardinalMarker {
    pub label: &'static str,
    /// View-frame azimuth.
    pub azimuth_deg: f64,
    pub x: f64,
    pub y: f64,
}

/// Cardinal and intercardinal labels on the horizon that fall on screen.
pub fn cardinal_markers(projector: &SphereProjector, margin_px: f64) -> Vec<CardinalMarker> {
    CARDINAL_DIRECTIONS
        .iter()
        .filter_map(|&(label, compass)| {
            let azimuth_deg = compass_to_view_azimuth(compass);
            projector
                .project(&horizon_to_uvec(azimuth_deg, 0.0), margin_px)
                .map(|p| CardinalMarker {
                    label,
                    azimuth_deg,
                    x: p.x,
                    y: p.y,
                })
        })
        .collect()
}

/// Altitude circles and azimuth meridians through a ground-fixed projector.
/// Lines with no visible segment are omitted.
pub fn horizon_grid(projector: &SphereProjector, config: &GridConfig) -> Vec<GridLine> {
    let sample = sanitize_step(config.sample_step_deg, 2.0);
    let mut lines = Vec::new();
    for alt in circle_levels(sanitize_step(config.alt_step_deg, 15.0)) {
        let pts = samples(0.0, 360.0, sample).map(|az| horizon_to_uvec(az, alt));
        push_line(&mut lines, GridLineKind::Altitude(alt), trace(projector, pts));
    }
    for az in meridian_levels(sanitize_step(config.az_step_deg, 30.0)) {
        let pts = samples(-90.0, 90.0, sample).map(|alt| horizon_to_uvec(az, alt));
        push_line(&mut lines, GridLineKind::Azimuth(az), trace(projector, pts));
    }
    lines
}

/// Declination circles and hour-angle meridians through a sky-fixed projector.
pub fn equatorial_grid(projector: &SphereProjector, config: &GridConfig) -> Vec<GridLine> {
    let sample = sanitize_step(config.sample_step_deg, 2.0);
    let mut lines = Vec::new();
    for dec in circle_levels(sanitize_step(config.dec_step_deg, 15.0)) {
        let pts = samples(0.0, 360.0, sample).map(|ra| radec_to_uvec(ra, dec));
        push_line(&mut lines, GridLineKind::Declination(dec), trace(projector, pts));
    }
    for ra in meridian_levels(sanitize_step(config.ra_step_deg, 30.0)) {
        let pts = samples(-90.0, 90.0, sample).map(|dec| radec_to_uvec(ra, dec));
        push_line(&mut lines, GridLineKind::RightAscension(ra), trace(projector, pts));
    }
    lines
}

fn push_line(lines: &mut Vec<GridLine>, kind: GridLineKind, segments: Vec<LineSegment>) {
    if !segments.is_empty() {
        lines.push(GridLine { kind, segments });
    }
}

/// Project consecutive samples and keep segments with both ends in front of
/// the camera and some part possibly on screen.
fn trace<I>(projector: &SphereProjector, points: I) -> Vec<LineSegment>
where
    I: Iterator<Item = Vector3>,
{
    let viewport = projector.viewport();
    let mut out = Vec::new();
    let mut prev = None;
    for v in points {
        let cur = projector.project_unclipped(&v);
        if let (Some(a), Some(b)) = (prev, cur) {
            let seg = LineSegment::new(&a, &b);
            if !seg.is_outside(&viewport) {
                out.push(seg);
            }
        }
        prev = cur;
    }
    out
}

fn sanitize_step(step: f64, fallback: f64) -> f64 {
    if step.is_finite() && step > 0.0 {
        step.clamp(0.25, 90.0)
    } else {
        fallback
    }
}

/// `start, start + step, ..., end` with the end always included.
fn samples(start: f64, end: f64, step: f64) -> impl Iterator<Item = f64> {
    let n = ((end - start) / step).ceil().max(1.0) as usize;
    (0..=n).map(move |i| (start + i as f64 * step).min(end))
}

/// Small-circle levels strictly between the poles, symmetric about zero.
fn circle_levels(step: f64) -> Vec<f64> {
    let k = ((90.0 - 1e-9) / step).floor() as i32;
    (-k..=k).map(|i| i as f64 * step).collect()
}

/// Meridian longitudes in `[0, 360)`.
fn meridian_levels(step: f64) -> Vec<f64> {
    let n = (360.0 / step).round().max(1.0) as usize;
    (0..n).map(|i| i as f64 * 360.0 / n as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::ObserverFrame;
    use crate::projection::Viewport;

    fn ground(az: f64, alt: f64, fov: f64) -> SphereProjector {
        let mut f = ObserverFrame::new(45.0, 0.0, 0);
        f.set_orientation(az, alt);
        f.set_fov(fov);
        SphereProjector::ground_fixed(&f, Viewport::new(1000.0, 1000.0))
    }

    #[test]
    fn test_compass_conversion() {
        assert_eq!(compass_to_view_azimuth(0.0), NORTH_AZIMUTH_DEG);
        assert_eq!(compass_to_view_azimuth(90.0), 0.0);
        for &c in &[0.0, 12.5, 180.0, 359.0] {
            assert!((view_to_compass_azimuth(compass_to_view_azimuth(c)) - c).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cardinal_marker_at_center() {
        let p = ground(NORTH_AZIMUTH_DEG, 0.0, 60.0);
        let markers = cardinal_markers(&p, 0.0);
        let labels: Vec<&str> = markers.iter().map(|m| m.label).collect();
        assert_eq!(labels, vec!["N"]);
        assert!((markers[0].x - 500.0).abs() < 1e-6 && (markers[0].y - 500.0).abs() < 1e-6);

        // East is to the right of north
        let wide = cardinal_markers(&ground(NORTH_AZIMUTH_DEG, 0.0, 120.0), 0.0);
        let x_of = |l: &str| wide.iter().find(|m| m.label == l).map(|m| m.x);
        assert!(x_of("NE").unwrap() > x_of("N").unwrap());
        assert!(x_of("NW").unwrap() < x_of("N").unwrap());
    }

    #[test]
    fn test_horizon_line_is_level() {
        let p = ground(10.0, 0.0, 60.0);
        let grid = horizon_grid(&p, &GridConfig::default());
        let horizon = grid
            .iter()
            .find(|l| l.kind == GridLineKind::Altitude(0.0))
            .expect("horizon should be visible");
        for s in &horizon.segments {
            assert!((s.y1 - 500.0).abs() < 1e-6 && (s.y2 - 500.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_grid_levels() {
        assert_eq!(circle_levels(30.0), vec![-60.0, -30.0, 0.0, 30.0, 60.0]);
        assert_eq!(circle_levels(45.0), vec![-45.0, 0.0, 45.0]);
        assert_eq!(meridian_levels(90.0), vec![0.0, 90.0, 180.0, 270.0]);
        let s: Vec<f64> = samples(0.0, 5.0, 2.0).collect();
        assert_eq!(s, vec![0.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_equatorial_grid_visible() {
        let mut f = ObserverFrame::new(30.0, 0.0, 0);
        f.set_orientation(NORTH_AZIMUTH_DEG, 30.0);
        let p = SphereProjector::sky_fixed(&f, Viewport::new(1000.0, 1000.0));
        let grid = equatorial_grid(&p, &GridConfig::default());
        // Looking at the pole every RA meridian converges on screen
        let meridians = grid
            .iter()
            .filter(|l| matches!(l.kind, GridLineKind::RightAscension(_)))
            .count();
        assert_eq!(meridians, 12);
        assert!(grid.iter().all(|l| !l.segments.is_empty()));
    }
}
