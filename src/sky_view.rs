//! One interactive sky view: catalog, observer, smoothing, LOD and the
//! per-frame render output behind a single frame-driven API.
//!
//! The host forwards input as it arrives (sensor orientation, drags, pinches,
//! location and time changes) and calls [`SkyView::tick`] once per display
//! frame with the wall-clock time. Input is last-write-wins; smoothing
//! absorbs jitter between frames.
//!
//! The catalog is held behind an [`Arc`]. Reloading through
//! [`SkyView::load_catalog`] copies on write, so a snapshot handed out by
//! [`SkyView::catalog`] stays valid for whoever holds it.

use std::sync::Arc;

use tracing::{debug, info};

use crate::catalog::{CelestialCatalog, Constellation, LoadOutcome};
use crate::grid::{self, CardinalMarker, GridConfig, GridLine};
use crate::hit_test::{self, HitRadii, HitResult};
use crate::lod::{LodConfig, MagnitudeLodSelector};
use crate::object::{CelestialObject, ConstellationArtwork};
use crate::observer::{FovRange, ObserverFrame};
use crate::projection::{celestial_to_horizon, SphereProjector, Viewport};
use crate::render::{FrameRenderState, RenderConfig};
use crate::smoothing::{OrientationSmoother, SmoothingConfig};

#[derive(Debug, Clone, PartialEq)]
pub struct SkyViewConfig {
    pub viewport: Viewport,
    pub fov_range: FovRange,
    pub lod: LodConfig,
    pub smoothing: SmoothingConfig,
    pub render: RenderConfig,
    pub hit_radii: HitRadii,
    pub grid: GridConfig,
    /// Maximum age of the cached LST in real-time mode.
    pub lst_refresh_ms: u64,
    /// At or below this FOV the LOD subset is narrowed to a cone around the
    /// look direction before projection.
    pub deep_zoom_fov_deg: f64,
}

impl Default for SkyViewConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            fov_range: FovRange::default(),
            lod: LodConfig::default(),
            smoothing: SmoothingConfig::default(),
            render: RenderConfig::default(),
            hit_radii: HitRadii::default(),
            grid: GridConfig::default(),
            lst_refresh_ms: 2_000,
            deep_zoom_fov_deg: 15.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkyView {
    config: SkyViewConfig,
    catalog: Arc<CelestialCatalog>,
    observer: ObserverFrame,
    smoother: OrientationSmoother,
    lod: MagnitudeLodSelector,
    frame: FrameRenderState,
    projector: SphereProjector,
}

impl SkyView {
    pub fn new(config: SkyViewConfig, latitude_deg: f64, longitude_deg: f64, now_ms: i64) -> Self {
        let mut observer = ObserverFrame::new(latitude_deg, longitude_deg, now_ms);
        observer.set_fov_range(config.fov_range);
        let mut smoother = OrientationSmoother::new(config.smoothing);
        smoother.snap_to(observer.azimuth_deg(), observer.altitude_deg());
        let projector = SphereProjector::sky_fixed(&observer, config.viewport);
        Self {
            lod: MagnitudeLodSelector::new(config.lod.clone()),
            catalog: Arc::new(CelestialCatalog::new()),
            frame: FrameRenderState::new(),
            config,
            observer,
            smoother,
            projector,
        }
    }

    pub fn config(&self) -> &SkyViewConfig {
        &self.config
    }

    /// Current catalog snapshot.
    pub fn catalog(&self) -> &Arc<CelestialCatalog> {
        &self.catalog
    }

    /// Replace the catalog with an already-built snapshot.
    pub fn set_catalog(&mut self, catalog: Arc<CelestialCatalog>) {
        info!(
            "sky view catalog replaced: {} objects (generation {})",
            catalog.len(),
            catalog.generation()
        );
        self.catalog = catalog;
        self.lod.reset();
    }

    /// Load objects and artwork into the catalog, copying it first if a
    /// snapshot is shared elsewhere.
    pub fn load_catalog(
        &mut self,
        objects: Vec<CelestialObject>,
        artworks: Vec<ConstellationArtwork>,
    ) -> LoadOutcome {
        Arc::make_mut(&mut self.catalog).load(objects, artworks)
    }

    pub fn observer(&self) -> &ObserverFrame {
        &self.observer
    }

    pub fn smoother(&self) -> &OrientationSmoother {
        &self.smoother
    }

    /// Output of the last [`tick`](Self::tick).
    pub fn frame(&self) -> &FrameRenderState {
        &self.frame
    }

    /// Sky-fixed projector used by the last [`tick`](Self::tick).
    pub fn projector(&self) -> &SphereProjector {
        &self.projector
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.config.viewport = viewport;
    }

    pub fn set_location(&mut self, latitude_deg: f64, longitude_deg: f64) {
        self.observer.set_location(latitude_deg, longitude_deg);
        debug!(
            "observer moved to ({:.4}, {:.4}), LST {:.4}",
            self.observer.latitude_deg(),
            self.observer.longitude_deg(),
            self.observer.lst_deg()
        );
    }

    /// Enter (`Some`) or leave (`None`) time travel.
    pub fn set_simulated_time(&mut self, simulated_ms: Option<i64>) {
        self.observer.set_simulated_time(simulated_ms);
    }

    pub fn set_sensor_orientation(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.smoother.set_sensor_orientation(azimuth_deg, altitude_deg);
    }

    pub fn set_target_orientation(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.smoother.set_target_orientation(azimuth_deg, altitude_deg);
    }

    /// Jump the camera without easing.
    pub fn snap_to(&mut self, azimuth_deg: f64, altitude_deg: f64) {
        self.smoother.snap_to(azimuth_deg, altitude_deg);
        self.observer.set_orientation(azimuth_deg, altitude_deg);
    }

    /// Drag by a screen delta in pixels.
    pub fn drag_by(&mut self, dx_px: f64, dy_px: f64) {
        self.smoother.drag_by(
            dx_px,
            dy_px,
            self.observer.fov_deg(),
            self.config.viewport.width,
        );
    }

    /// Pinch zoom; `scale > 1` zooms in.
    pub fn zoom_by(&mut self, scale: f64) {
        self.observer.zoom_by(scale);
    }

    pub fn set_fov(&mut self, fov_deg: f64) {
        self.observer.set_fov(fov_deg);
    }

    /// Ease the camera toward a catalog object. Returns `false` for an
    /// unknown id.
    pub fn look_at(&mut self, id: &str) -> bool {
        let Some(obj) = self.catalog.get(id) else {
            return false;
        };
        let (az, alt) = celestial_to_horizon(&self.observer, obj.uvec());
        self.smoother.set_target_orientation(az, alt);
        true
    }

    /// Advance one frame at wall-clock time `now_ms`.
    pub fn tick(&mut self, now_ms: i64) -> &FrameRenderState {
        self.observer.set_clock(now_ms);
        if self.observer.simulated_time_ms().is_none()
            && self.observer.lst_age_ms() >= self.config.lst_refresh_ms
        {
            self.observer.update_lst();
            debug!("LST refreshed to {:.5}", self.observer.lst_deg());
        }
        self.smoother.apply(&mut self.observer);
        self.projector = SphereProjector::sky_fixed(&self.observer, self.config.viewport);

        let fov = self.observer.fov_deg();
        let prefix_len = self.lod.select_visible(&self.catalog, fov).len();
        if fov <= self.config.deep_zoom_fov_deg {
            let radius = self.projector.view_radius_deg() + 1.0;
            let mut subset = self
                .catalog
                .query_cone(&self.projector.look_direction(), radius);
            // Cone results are ascending, so the LOD cut is a truncation
            subset.retain(|&i| i < prefix_len);
            self.frame
                .update(&self.projector, &self.catalog, subset, &self.config.render);
        } else {
            self.frame
                .update(&self.projector, &self.catalog, 0..prefix_len, &self.config.render);
        }
        &self.frame
    }

    /// Object under a tap at `(x, y)` in the last frame.
    pub fn tap(&self, x: f64, y: f64) -> HitResult {
        hit_test::pick(&self.frame, &self.catalog, x, y, &self.config.hit_radii)
    }

    /// Object under the screen centre in the last frame.
    pub fn crosshair(&self) -> HitResult {
        let (cx, cy) = self.config.viewport.center();
        self.tap(cx, cy)
    }

    /// Constellation nearest the crosshair in the last frame.
    pub fn focused_constellation(&self) -> Option<&Constellation> {
        self.frame
            .focused_constellation()
            .and_then(|i| self.catalog.constellations().get(i))
    }

    pub fn cardinal_markers(&self) -> Vec<CardinalMarker> {
        let p = SphereProjector::ground_fixed(&self.observer, self.config.viewport);
        grid::cardinal_markers(&p, self.config.render.margins.planet_px)
    }

    pub fn horizon_grid(&self) -> Vec<GridLine> {
        let p = SphereProjector::ground_fixed(&self.observer, self.config.viewport);
        grid::horizon_grid(&p, &self.config.grid)
    }

    pub fn equatorial_grid(&self) -> Vec<GridLine> {
        grid::equatorial_grid(&self.projector, &self.config.grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_test::HitKind;
    use crate::sidereal::J2000_EPOCH_MS;

    fn view() -> SkyView {
        let mut v = SkyView::new(SkyViewConfig::default(), 0.0, -280.46061837, J2000_EPOCH_MS);
        v.set_fov(60.0);
        v.load_catalog(
            vec![
                CelestialObject::star("HIP1", 0.0, 0.0, 1.0).with_name("Origin"),
                CelestialObject::star("HIP2", 90.0, 0.0, 2.0),
                CelestialObject::planet("venus", 5.0, 0.0, -4.0).with_name("Venus"),
            ],
            Vec::new(),
        );
        v
    }

    #[test]
    fn test_crosshair_finds_center_star() {
        let mut v = view();
        v.tick(J2000_EPOCH_MS);
        let hit = v.crosshair();
        assert_eq!(hit.kind, HitKind::Star);
        assert_eq!(hit.id, "HIP1");
        assert_eq!(hit.name, "Origin");
    }

    #[test]
    fn test_tap_prefers_planet() {
        let mut v = view();
        v.tick(J2000_EPOCH_MS);
        let venus = v.frame().planets()[0];
        // Venus sits 5 degrees (~76 px) from the origin star
        let hit = v.tap(venus.x, venus.y);
        assert_eq!(hit.kind, HitKind::Planet);
        assert_eq!(hit.subtitle, "Planet");
        assert!(!v.tap(5.0, 5.0).is_hit());
    }

    #[test]
    fn test_lst_refresh_cadence() {
        let mut v = view();
        let lst0 = v.observer().lst_deg();
        v.tick(J2000_EPOCH_MS + 1_000);
        assert_eq!(v.observer().lst_deg(), lst0, "LST refreshed before the interval");
        v.tick(J2000_EPOCH_MS + 2_000);
        assert!(v.observer().lst_deg() != lst0);
        assert_eq!(v.observer().lst_time_ms(), J2000_EPOCH_MS + 2_000);

        // Time travel freezes the sky regardless of the clock
        v.set_simulated_time(Some(J2000_EPOCH_MS));
        v.tick(J2000_EPOCH_MS + 60_000);
        assert_eq!(v.observer().lst_time_ms(), J2000_EPOCH_MS);
    }

    #[test]
    fn test_tick_extreme_clock() {
        let mut v = view();
        for &now in &[i64::MIN, i64::MAX, J2000_EPOCH_MS, i64::MIN] {
            v.tick(now);
            assert!(v.observer().lst_deg().is_finite(), "LST not finite at {}", now);
            assert_eq!(v.observer().lst_time_ms(), now);
        }
    }

    #[test]
    fn test_look_at_converges() {
        let mut v = view();
        assert!(v.look_at("HIP2"));
        assert!(!v.look_at("nope"));
        for _ in 0..200 {
            v.tick(J2000_EPOCH_MS);
        }
        assert_eq!(v.crosshair().id, "HIP2");
    }

    #[test]
    fn test_deep_zoom_uses_cone() {
        let mut v = view();
        v.set_fov(5.0);
        let frame = v.tick(J2000_EPOCH_MS);
        assert_eq!(frame.stars().len(), 1);
        assert_eq!(v.crosshair().id, "HIP1");
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let mut v = view();
        let snapshot = Arc::clone(v.catalog());
        let outcome = v.load_catalog(vec![CelestialObject::star("X", 0.0, 0.0, 1.0)], Vec::new());
        assert_eq!(outcome, LoadOutcome::Reloaded);
        assert_eq!(snapshot.len(), 3);
        assert_eq!(v.catalog().len(), 1);
    }

    #[test]
    fn test_overlays() {
        let mut v = view();
        v.snap_to(grid::NORTH_AZIMUTH_DEG, 0.0);
        v.tick(J2000_EPOCH_MS);
        assert!(v.cardinal_markers().iter().any(|m| m.label == "N"));
        assert!(!v.horizon_grid().is_empty());
        assert!(!v.equatorial_grid().is_empty());
    }
}
