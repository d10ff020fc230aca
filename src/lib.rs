//! # skydome
//!
//! An orientation-driven **night-sky projection kernel**.
//!
//! Given a catalog of stars and planets, an observer position and time, and a
//! camera orientation, `skydome` computes where every object lands on screen.
//! It also decides which stars to show at the current zoom and answers tap
//! queries. Drawing is left to the host: the output is plain arrays of screen
//! points, line segments and image transforms that any canvas, GL or SVG
//! backend can consume.
//!
//! ## Features
//!
//! - **Sidereal projection**: local sidereal time, latitude tilt, camera yaw
//!   and pitch, then a perspective divide with visibility culling
//! - **Ground-fixed overlays**: cardinal markers and an alt/az grid that stay
//!   put while the sky turns, plus a sky-fixed RA/Dec grid
//! - **Magnitude level of detail**: a brightness-sorted catalog lets each
//!   frame take an O(k) prefix, with hysteresis to avoid flicker while zooming
//! - **Constellation artwork**: image anchors warped onto projected stars with
//!   an affine fit, faded in around the crosshair
//! - **Smoothed input**: sensor and drag orientation eased toward the target,
//!   wrap-safe across 0°/360°
//! - **Typed ingestion**: JSON payloads parsed into records once, with bad
//!   entries dropped and logged
//!
//! ## Example
//!
//! ```
//! use skydome::{CelestialObject, SkyView, SkyViewConfig, HitKind};
//!
//! // Observer on the equator, clock at 2024-01-01T00:00:00Z
//! let mut view = SkyView::new(SkyViewConfig::default(), 0.0, 0.0, 1_704_067_200_000);
//! view.load_catalog(
//!     vec![
//!         CelestialObject::star("HIP32349", 101.287, -16.716, -1.46).with_name("Sirius"),
//!         CelestialObject::planet("jupiter", 40.0, 15.0, -2.5).with_name("Jupiter"),
//!     ],
//!     Vec::new(),
//! );
//!
//! view.look_at("HIP32349");
//! for i in 0..120 {
//!     view.tick(1_704_067_200_000 + i * 16);
//! }
//! let hit = view.crosshair();
//! assert_eq!(hit.kind, HitKind::Star);
//! assert_eq!(hit.name, "Sirius");
//! ```
//!
//! ## Frame pipeline
//!
//! 1. **Input**: sensor readings, drags and pinches update the smoother target
//!    and the field of view
//! 2. **Clock**: LST is recomputed when the cached value is older than the
//!    refresh interval, or immediately on location and time-travel changes
//! 3. **Level of detail**: the limiting magnitude for the FOV selects a prefix
//!    of the catalog; at deep zoom it is further cut to a cone around the look
//!    direction
//! 4. **Projection**: the subset, every planet, and every constellation star
//!    are projected into a per-frame array parallel to the catalog
//! 5. **Derived output**: line segments, artwork placements and crosshair focus
//!

pub mod appearance;
pub mod catalog;
pub mod coords;
pub mod grid;
pub mod ingest;
pub mod lod;
pub mod object;
pub mod observer;
pub mod projection;
pub mod render;
pub mod sidereal;
pub mod sky_view;
pub mod smoothing;

pub use appearance::{magnitude_to_radius, spectral_type_to_color, MagnitudeScale, Rgb};
pub use catalog::{CelestialCatalog, Constellation, LoadOutcome};
pub use coords::{radec_to_uvec, uvec_to_radec};
pub use grid::{CardinalMarker, GridConfig, GridLine, GridLineKind};
pub use hit_test::{find_nearest, HitKind, HitRadii, HitResult};
pub use ingest::{parse_artworks_json, parse_planets_json, parse_stars_json, IngestReport};
pub use lod::{limiting_magnitude, LodConfig, MagnitudeLodSelector};
pub use object::{Anchor, CelestialObject, ConstellationArtwork, ObjectKind, StarInfo};
pub use observer::{FovRange, ObserverFrame};
pub use projection::{
    ArtworkTransform, CullMargins, ProjectionMode, ScreenPoint, SphereProjector, Viewport,
};
pub use render::{
    ArtworkPlacement, FocusConfig, FrameRenderState, LineSegment, ProjectedPlanet,
    ProjectedStar, RenderConfig,
};
pub use sidereal::local_sidereal_time;
pub use sky_view::{SkyView, SkyViewConfig};
pub use smoothing::{OrientationSmoother, SmoothingConfig};

// Double precision throughout: at deep zoom a 0.1° field spans ~1000 px, so
// single precision rotation error would be visible.
pub type Vector3 = nalgebra::Vector3<f64>;
