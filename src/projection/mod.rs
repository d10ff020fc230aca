//! Perspective projection of the celestial sphere onto the screen.
//!
//! # Camera frame
//!
//! After rotation a direction is expressed in the camera frame:
//! +X forward (out of the screen), +Y left, +Z up. A point is in front of
//! the camera only if its forward component exceeds [`MIN_FORWARD`].
//!
//! # Sky-fixed pipeline
//!
//! ```text
//! celestial ── Rz(-LST) ── Rx(lat - 90°) ── Rz(az) ── Ry(alt) ──> camera
//! ```
//!
//! Sidereal rotation first, then the latitude tilt that raises the pole to
//! altitude `lat`, then camera yaw, then camera pitch. Azimuth increases to
//! the right (clockwise seen from the zenith).
//!
//! # Ground-fixed pipeline
//!
//! Horizon overlays skip the sidereal and latitude stages:
//!
//! ```text
//! horizon ── Rz(az) ── Ry(alt) ──> camera
//! ```
//!
//! # Screen mapping
//!
//! ```text
//! scale   = width / (2 tan(fov / 2))
//! screenX = cx + (right / forward) * scale      right = -Y
//! screenY = cy - (up / forward) * scale         up    = +Z
//! ```

pub mod affine;

use nalgebra::Rotation3;

use crate::coords::{normalize_or_fallback, wrap_degrees};
use crate::observer::ObserverFrame;
use crate::Vector3;

pub use affine::ArtworkTransform;

/// Points with a smaller forward component are treated as behind the camera.
pub const MIN_FORWARD: f64 = 0.01;

/// Screen size in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Non-finite or sub-pixel dimensions are raised to one pixel.
    pub fn new(width: f64, height: f64) -> Self {
        let sane = |v: f64| if v.is_finite() && v >= 1.0 { v } else { 1.0 };
        Self {
            width: sane(width),
            height: sane(height),
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Whether `(x, y)` lies inside the viewport grown by `margin` on every side.
    pub fn contains(&self, x: f64, y: f64, margin: f64) -> bool {
        x >= -margin && x <= self.width + margin && y >= -margin && y <= self.height + margin
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1000.0, 1000.0)
    }
}

/// Off-screen allowance in pixels before an object is culled.
///
/// Planets draw larger sprites than stars and get a wider margin so they do
/// not pop at the screen edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullMargins {
    pub star_px: f64,
    pub planet_px: f64,
}

impl Default for CullMargins {
    fn default() -> Self {
        Self {
            star_px: 10.0,
            planet_px: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    /// Full sidereal, latitude, yaw and pitch chain for celestial objects.
    SkyFixed,
    /// Yaw and pitch only, for horizon grids and cardinal markers.
    GroundFixed,
}

/// A projected point. `depth` is the forward component in the camera frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

/// Rotation and perspective for one frame.
///
/// Build one per frame from the observer state, then project any number of
/// unit vectors through it.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereProjector {
    rotation: Rotation3<f64>,
    viewport: Viewport,
    scale: f64,
    mode: ProjectionMode,
}

impl SphereProjector {
    pub fn new(frame: &ObserverFrame, viewport: Viewport, mode: ProjectionMode) -> Self {
        let pitch = frame.altitude_deg().to_radians();
        let yaw = frame.azimuth_deg().to_radians();
        let camera = Rotation3::from_axis_angle(&Vector3::y_axis(), pitch)
            * Rotation3::from_axis_angle(&Vector3::z_axis(), yaw);
        let rotation = match mode {
            ProjectionMode::SkyFixed => camera * celestial_to_horizon_rotation(frame),
            ProjectionMode::GroundFixed => camera,
        };
        Self {
            rotation,
            viewport,
            scale: focal_scale(frame.fov_deg(), viewport.width),
            mode,
        }
    }

    pub fn sky_fixed(frame: &ObserverFrame, viewport: Viewport) -> Self {
        Self::new(frame, viewport, ProjectionMode::SkyFixed)
    }

    pub fn ground_fixed(frame: &ObserverFrame, viewport: Viewport) -> Self {
        Self::new(frame, viewport, ProjectionMode::GroundFixed)
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Pixels per unit of tangent-plane offset.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotate a direction into the camera frame.
    pub fn to_camera(&self, v: &Vector3) -> Vector3 {
        self.rotation * v
    }

    /// Project `v`, culling points behind the camera or farther than
    /// `margin_px` outside the viewport.
    pub fn project(&self, v: &Vector3, margin_px: f64) -> Option<ScreenPoint> {
        self.project_unclipped(v)
            .filter(|p| self.viewport.contains(p.x, p.y, margin_px))
    }

    /// Project `v`, culling only points behind the camera. Used for line
    /// endpoints, which may legitimately lie off screen.
    pub fn project_unclipped(&self, v: &Vector3) -> Option<ScreenPoint> {
        let c = self.rotation * v;
        let forward = c.x;
        if !(forward > MIN_FORWARD) {
            return None;
        }
        let (cx, cy) = self.viewport.center();
        let x = cx + (-c.y / forward) * self.scale;
        let y = cy - (c.z / forward) * self.scale;
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        Some(ScreenPoint {
            x,
            y,
            depth: forward,
        })
    }

    /// Direction at the screen centre, in the frame of this projector's mode.
    pub fn look_direction(&self) -> Vector3 {
        self.rotation.inverse_transform_vector(&Vector3::x())
    }

    /// Direction under screen pixel `(x, y)`.
    pub fn unproject(&self, x: f64, y: f64) -> Vector3 {
        let (cx, cy) = self.viewport.center();
        let camera = Vector3::new(1.0, -(x - cx) / self.scale, -(y - cy) / self.scale);
        normalize_or_fallback(self.rotation.inverse_transform_vector(&camera))
    }

    /// Angular radius in degrees from the screen centre to a corner.
    pub fn view_radius_deg(&self) -> f64 {
        let half_diag = 0.5 * self.viewport.width.hypot(self.viewport.height);
        (half_diag / self.scale).atan().to_degrees()
    }
}

/// Rotation taking celestial unit vectors into the observer's horizon frame.
fn celestial_to_horizon_rotation(frame: &ObserverFrame) -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), (frame.latitude_deg() - 90.0).to_radians())
        * Rotation3::from_axis_angle(&Vector3::z_axis(), -frame.lst_deg().to_radians())
}

/// View-frame `(azimuth, altitude)` in degrees of a celestial direction, for
/// pointing the camera at it.
pub fn celestial_to_horizon(frame: &ObserverFrame, v: &Vector3) -> (f64, f64) {
    let h = celestial_to_horizon_rotation(frame) * normalize_or_fallback(*v);
    let alt = h.z.clamp(-1.0, 1.0).asin().to_degrees();
    let az = if h.x.abs() < 1e-15 && h.y.abs() < 1e-15 {
        0.0
    } else {
        wrap_degrees((-h.y).atan2(h.x).to_degrees())
    };
    (az, alt)
}

/// `width / (2 tan(fov / 2))`, with the FOV held inside `(0°, 179°]`.
fn focal_scale(fov_deg: f64, width: f64) -> f64 {
    let fov = if fov_deg.is_finite() {
        fov_deg.clamp(1e-3, 179.0)
    } else {
        60.0
    };
    width / (2.0 * (fov.to_radians() / 2.0).tan())
}
