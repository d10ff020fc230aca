//! Per-frame projection output for drawing backends.
//!
//! [`FrameRenderState::update`] projects the LOD subset, every planet, and the
//! stars referenced by constellation artwork, then derives line segments and
//! artwork placements. The catalog is never mutated; screen positions live in
//! a parallel array indexed by catalog position and are valid only for the
//! frame that produced them.

mod constellation;

pub use constellation::{focus_opacity, place_artwork, FocusConfig};

use crate::appearance::{spectral_type_to_color, MagnitudeScale, Rgb};
use crate::catalog::CelestialCatalog;
use crate::coords::angular_separation_deg;
use crate::projection::{ArtworkTransform, CullMargins, ScreenPoint, SphereProjector, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedStar {
    /// Catalog index.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub depth: f64,
    pub radius: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedPlanet {
    /// Catalog index.
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub depth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl LineSegment {
    pub fn new(a: &ScreenPoint, b: &ScreenPoint) -> Self {
        Self {
            x1: a.x,
            y1: a.y,
            x2: b.x,
            y2: b.y,
        }
    }

    /// True if both ends lie past the same edge of `viewport`, so no part of
    /// the segment can be visible.
    pub fn is_outside(&self, viewport: &Viewport) -> bool {
        (self.x1 < 0.0 && self.x2 < 0.0)
            || (self.x1 > viewport.width && self.x2 > viewport.width)
            || (self.y1 < 0.0 && self.y2 < 0.0)
            || (self.y1 > viewport.height && self.y2 > viewport.height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkPlacement {
    /// Index into [`CelestialCatalog::constellations`].
    pub constellation: usize,
    pub image_name: String,
    pub transform: ArtworkTransform,
    pub opacity: f64,
}

/// Drawing parameters that do not change from frame to frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderConfig {
    pub margins: CullMargins,
    pub magnitude_scale: MagnitudeScale,
    pub focus: FocusConfig,
}

#[derive(Debug, Clone, Copy, Default)]
struct Slot {
    projected: bool,
    /// Projection ignoring the viewport bounds; `None` behind the camera.
    point: Option<ScreenPoint>,
    on_screen: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FrameRenderState {
    stars: Vec<ProjectedStar>,
    planets: Vec<ProjectedPlanet>,
    lines: Vec<LineSegment>,
    artworks: Vec<ArtworkPlacement>,
    focused_constellation: Option<usize>,
    slots: Vec<Slot>,
    touched: Vec<usize>,
    generation: u64,
}

impl FrameRenderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute everything for one frame.
    ///
    /// `subset` is the catalog indices chosen by level-of-detail selection.
    /// Planets in it are ignored since every planet is projected anyway.
    pub fn update<I>(
        &mut self,
        projector: &SphereProjector,
        catalog: &CelestialCatalog,
        subset: I,
        config: &RenderConfig,
    ) where
        I: IntoIterator<Item = usize>,
    {
        self.reset(catalog);
        let star_margin = config.margins.star_px;

        for index in subset {
            if catalog.object(index).is_some_and(|o| !o.is_planet()) {
                self.project_star(projector, catalog, index, star_margin, config);
            }
        }

        for &index in catalog.planet_indices() {
            let Some(obj) = catalog.object(index) else {
                continue;
            };
            if let Some(p) = projector.project(obj.uvec(), config.margins.planet_px) {
                self.planets.push(ProjectedPlanet {
                    index,
                    x: p.x,
                    y: p.y,
                    depth: p.depth,
                });
            }
        }

        // Constellation figures draw regardless of the LOD cutoff
        for c in catalog.constellations() {
            for &index in c.star_indices() {
                self.project_star(projector, catalog, index, star_margin, config);
            }
        }

        // Far to near: larger forward component first
        self.stars.sort_by(|a, b| b.depth.total_cmp(&a.depth));

        self.build_lines(projector, catalog, star_margin);
        self.build_artworks(projector, catalog, &config.focus);
    }

    fn reset(&mut self, catalog: &CelestialCatalog) {
        if self.generation != catalog.generation() || self.slots.len() != catalog.len() {
            self.slots.clear();
            self.slots.resize(catalog.len(), Slot::default());
            self.touched.clear();
            self.generation = catalog.generation();
        }
        for &i in &self.touched {
            self.slots[i] = Slot::default();
        }
        self.touched.clear();
        self.stars.clear();
        self.planets.clear();
        self.lines.clear();
        self.artworks.clear();
        self.focused_constellation = None;
    }

    /// Project a catalog index into its slot. The flag is true the first time
    /// an index is projected this frame.
    fn slot(
        &mut self,
        projector: &SphereProjector,
        catalog: &CelestialCatalog,
        index: usize,
        margin: f64,
    ) -> Option<(Slot, bool)> {
        let obj = catalog.object(index)?;
        let existing = *self.slots.get(index)?;
        if existing.projected {
            return Some((existing, false));
        }
        let point = projector.project_unclipped(obj.uvec());
        let on_screen = point.is_some_and(|p| projector.viewport().contains(p.x, p.y, margin));
        let slot = Slot {
            projected: true,
            point,
            on_screen,
        };
        self.slots[index] = slot;
        self.touched.push(index);
        Some((slot, true))
    }

    fn project_star(
        &mut self,
        projector: &SphereProjector,
        catalog: &CelestialCatalog,
        index: usize,
        margin: f64,
        config: &RenderConfig,
    ) {
        let Some((slot, fresh)) = self.slot(projector, catalog, index, margin) else {
            return;
        };
        if !fresh || !slot.on_screen {
            return;
        }
        let Some(p) = slot.point else {
            return;
        };
        let Some(obj) = catalog.object(index) else {
            return;
        };
        if obj.is_planet() {
            return;
        }
        self.stars.push(ProjectedStar {
            index,
            x: p.x,
            y: p.y,
            depth: p.depth,
            radius: config.magnitude_scale.radius(obj.magnitude()),
            color: spectral_type_to_color(obj.spectral_type()),
        });
    }

    fn build_lines(
        &mut self,
        projector: &SphereProjector,
        catalog: &CelestialCatalog,
        margin: f64,
    ) {
        let viewport = projector.viewport();
        for c in catalog.constellations() {
            for &[a, b] in c.segments() {
                let (Some((sa, _)), Some((sb, _))) = (
                    self.slot(projector, catalog, a, margin),
                    self.slot(projector, catalog, b, margin),
                ) else {
                    continue;
                };
                let (Some(pa), Some(pb)) = (sa.point, sb.point) else {
                    continue;
                };
                let segment = LineSegment::new(&pa, &pb);
                if !segment.is_outside(&viewport) {
                    self.lines.push(segment);
                }
            }
        }
    }

    fn build_artworks(
        &mut self,
        projector: &SphereProjector,
        catalog: &CelestialCatalog,
        focus: &FocusConfig,
    ) {
        let look = projector.look_direction();
        let mut best: Option<(usize, f64)> = None;
        for (ci, c) in catalog.constellations().iter().enumerate() {
            let Some(center) = c.center() else {
                continue;
            };
            let separation = angular_separation_deg(center, &look);
            let opacity = focus_opacity(separation, focus);
            if opacity <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, s)| separation < s) {
                best = Some((ci, separation));
            }
            let slots = &self.slots;
            let screen_of = |i: usize| slots.get(i).filter(|s| s.on_screen).and_then(|s| s.point);
            if let Some(transform) = place_artwork(c, screen_of) {
                self.artworks.push(ArtworkPlacement {
                    constellation: ci,
                    image_name: c.image_name().to_string(),
                    transform,
                    opacity,
                });
            }
        }
        self.focused_constellation = best.map(|(ci, _)| ci);
    }

    /// On-screen stars, far to near.
    pub fn stars(&self) -> &[ProjectedStar] {
        &self.stars
    }

    /// On-screen planets.
    pub fn planets(&self) -> &[ProjectedPlanet] {
        &self.planets
    }

    pub fn lines(&self) -> &[LineSegment] {
        &self.lines
    }

    /// Artwork with a sane transform and non-zero focus opacity.
    pub fn artworks(&self) -> &[ArtworkPlacement] {
        &self.artworks
    }

    /// Constellation whose centre is nearest the crosshair, if any is within
    /// the fade radius.
    pub fn focused_constellation(&self) -> Option<usize> {
        self.focused_constellation
    }

    /// Screen position of a catalog index this frame, if it was projected and
    /// landed on screen.
    pub fn screen_position(&self, index: usize) -> Option<ScreenPoint> {
        self.slots
            .get(index)
            .filter(|s| s.on_screen)
            .and_then(|s| s.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Anchor, CelestialObject, ConstellationArtwork};
    use crate::observer::ObserverFrame;
    use crate::sidereal::J2000_EPOCH_MS;

    /// Looking at RA 0, Dec 0 from the equator with LST 0.
    fn projector() -> SphereProjector {
        let mut frame = ObserverFrame::new(0.0, 0.0, 0);
        frame.set_simulated_time(Some(J2000_EPOCH_MS));
        frame.set_location(0.0, -280.46061837);
        frame.set_fov(60.0);
        SphereProjector::sky_fixed(&frame, Viewport::new(1000.0, 1000.0))
    }

    fn triangle_art(ids: [&str; 3]) -> ConstellationArtwork {
        ConstellationArtwork {
            id: "Tri".into(),
            name: "Triangulum".into(),
            image_name: "tri.png".into(),
            image_size: [200.0, 200.0],
            anchors: vec![
                Anchor {
                    pixel: [20.0, 20.0],
                    star_id: ids[0].into(),
                },
                Anchor {
                    pixel: [180.0, 30.0],
                    star_id: ids[1].into(),
                },
                Anchor {
                    pixel: [90.0, 170.0],
                    star_id: ids[2].into(),
                },
            ],
            lines: vec![vec![ids[0].into(), ids[1].into(), ids[2].into(), ids[0].into()]],
        }
    }

    fn catalog() -> CelestialCatalog {
        let objects = vec![
            CelestialObject::star("bright", 0.0, 0.0, 0.5),
            CelestialObject::star("near", 4.0, 2.0, 2.0),
            CelestialObject::star("behind", 180.0, 0.0, 1.0),
            CelestialObject::star("t1", 355.0, -3.0, 5.5),
            CelestialObject::star("t2", 5.0, -4.0, 5.8),
            CelestialObject::star("t3", 1.0, 6.0, 5.9),
            CelestialObject::star("faint", 2.0, 1.0, 7.0),
            CelestialObject::planet("mars", 3.0, -1.0, 1.5),
        ];
        CelestialCatalog::from_parts(objects, vec![triangle_art(["t1", "t2", "t3"])])
    }

    fn ids<'a>(catalog: &'a CelestialCatalog, stars: &[ProjectedStar]) -> Vec<&'a str> {
        let mut v: Vec<&str> = stars.iter().map(|s| catalog.all()[s.index].id()).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_subset_planets_and_constellation_stars() {
        let cat = catalog();
        let mut state = FrameRenderState::new();
        // LOD prefix down to magnitude 2: bright, behind, mars, near
        let prefix = cat.all().iter().take_while(|o| o.magnitude() <= 2.0).count();
        state.update(&projector(), &cat, 0..prefix, &RenderConfig::default());

        assert_eq!(ids(&cat, state.stars()), vec!["bright", "near", "t1", "t2", "t3"]);
        assert_eq!(state.planets().len(), 1);
        assert_eq!(cat.all()[state.planets()[0].index].id(), "mars");
        assert_eq!(state.lines().len(), 3);

        let behind = cat.index_of("behind").unwrap();
        assert!(state.screen_position(behind).is_none());
        let faint = cat.index_of("faint").unwrap();
        assert!(
            state.screen_position(faint).is_none(),
            "faint star outside the subset was projected"
        );
    }

    #[test]
    fn test_planets_drawn_with_empty_subset() {
        let cat = catalog();
        let mut state = FrameRenderState::new();
        state.update(&projector(), &cat, std::iter::empty(), &RenderConfig::default());
        assert_eq!(state.planets().len(), 1);
        assert_eq!(ids(&cat, state.stars()), vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn test_stars_sorted_far_to_near() {
        let cat = catalog();
        let mut state = FrameRenderState::new();
        state.update(&projector(), &cat, 0..cat.len(), &RenderConfig::default());
        let depths: Vec<f64> = state.stars().iter().map(|s| s.depth).collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]), "depths not sorted: {:?}", depths);
        // Dead centre has the largest forward component
        let centre = state.stars()[0];
        assert_eq!(cat.all()[centre.index].id(), "bright");
        assert!((centre.x - 500.0).abs() < 1e-6 && (centre.y - 500.0).abs() < 1e-6);
        assert!(centre.radius > state.stars().last().unwrap().radius);
    }

    #[test]
    fn test_artwork_placed_through_anchors() {
        let cat = catalog();
        let mut state = FrameRenderState::new();
        state.update(&projector(), &cat, 0..cat.len(), &RenderConfig::default());

        assert_eq!(state.focused_constellation(), Some(0));
        assert_eq!(state.artworks().len(), 1);
        let placement = &state.artworks()[0];
        assert_eq!(placement.image_name, "tri.png");
        assert_eq!(placement.opacity, 1.0);
        for anchor in cat.constellations()[0].anchors() {
            let (x, y) = placement.transform.apply(anchor.pixel[0], anchor.pixel[1]);
            let p = state.screen_position(anchor.object).unwrap();
            assert!((x - p.x).abs() < 1e-6 && (y - p.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_artwork_fades_out_of_focus() {
        let cat = catalog();
        let mut frame = ObserverFrame::new(0.0, -280.46061837, 0);
        frame.set_simulated_time(Some(J2000_EPOCH_MS));
        frame.set_orientation(90.0, 0.0);
        let p = SphereProjector::sky_fixed(&frame, Viewport::new(1000.0, 1000.0));
        let mut state = FrameRenderState::new();
        state.update(&p, &cat, 0..cat.len(), &RenderConfig::default());
        assert!(state.artworks().is_empty());
        assert!(state.focused_constellation().is_none());
        assert!(state.lines().is_empty());
    }

    #[test]
    fn test_state_resets_between_frames() {
        let mut cat = catalog();
        let mut state = FrameRenderState::new();
        state.update(&projector(), &cat, 0..cat.len(), &RenderConfig::default());
        assert!(!state.stars().is_empty());

        cat.load(vec![CelestialObject::star("solo", 0.0, 0.0, 1.0)], Vec::new());
        state.update(&projector(), &cat, 0..cat.len(), &RenderConfig::default());
        assert_eq!(state.stars().len(), 1);
        assert!(state.planets().is_empty());
        assert!(state.lines().is_empty());
        assert!(state.screen_position(5).is_none());
    }
}
