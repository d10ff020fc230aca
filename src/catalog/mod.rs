//! Celestial catalog: brightness-sorted objects, id lookup, constellations.
//!
//! Objects are stored sorted by magnitude (brightest first) so that the
//! level-of-detail selector can take a prefix instead of filtering the whole
//! catalog. Constellation artwork is resolved against the catalog once per
//! load: anchor and line star ids become object indices, and each
//! constellation gets an on-sky centre used for crosshair focus.
//!
//! The catalog is read-only between loads. A multi-threaded host should wrap
//! it in an `Arc` and swap in a freshly loaded catalog rather than calling
//! [`CelestialCatalog::load`] while a projection pass is running.

mod constellation;
mod sky_index;

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

pub use constellation::{Constellation, ResolvedAnchor};
pub use sky_index::SkyIndex;

use crate::coords::shortest_angle_delta;
use crate::object::{CelestialObject, ConstellationArtwork};
use crate::Vector3;

/// Positions closer than this (degrees) count as unchanged on reload.
pub const POSITION_EPSILON_DEG: f64 = 0.01;

/// Default resolution of the cone-search index (`12 * nside^2` cells).
pub const DEFAULT_INDEX_NSIDE: u32 = 16;

/// What a call to [`CelestialCatalog::load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Objects and artwork matched the current contents; nothing was rebuilt.
    Unchanged,
    /// Objects matched; only constellation artwork was re-resolved.
    ArtworkReloaded,
    /// Objects (and artwork) were replaced.
    Reloaded,
}

#[derive(Debug, Clone, Default)]
pub struct CelestialCatalog {
    objects: Vec<CelestialObject>,
    by_id: HashMap<String, usize>,
    planet_indices: Vec<usize>,
    artworks: Vec<ConstellationArtwork>,
    constellations: Vec<Constellation>,
    sky_index: SkyIndex,
    generation: u64,
}

impl CelestialCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from objects and artwork in one step.
    pub fn from_parts(objects: Vec<CelestialObject>, artworks: Vec<ConstellationArtwork>) -> Self {
        let mut catalog = Self::new();
        catalog.load(objects, artworks);
        catalog
    }

    /// Replace the catalog contents.
    ///
    /// Objects with a non-finite magnitude or a duplicate id are dropped with a
    /// warning. If the surviving objects match the current ones index-for-index
    /// (same id, RA/Dec within [`POSITION_EPSILON_DEG`], same magnitude) the
    /// object tables are left untouched.
    pub fn load(
        &mut self,
        objects: Vec<CelestialObject>,
        artworks: Vec<ConstellationArtwork>,
    ) -> LoadOutcome {
        let mut seen: HashSet<String> = HashSet::with_capacity(objects.len());
        let mut accepted: Vec<CelestialObject> = Vec::with_capacity(objects.len());
        for obj in objects {
            if !obj.magnitude().is_finite() {
                warn!("dropping {}: non-finite magnitude", obj.id());
                continue;
            }
            if !obj.ra_deg().is_finite() || !obj.dec_deg().is_finite() {
                warn!(
                    "dropping {}: non-finite position ({}, {})",
                    obj.id(),
                    obj.ra_deg(),
                    obj.dec_deg()
                );
                continue;
            }
            if !seen.insert(obj.id().to_string()) {
                warn!("dropping duplicate catalog id {}", obj.id());
                continue;
            }
            accepted.push(obj);
        }
        // Stable sort keeps payload order among equal magnitudes
        accepted.sort_by(|a, b| a.magnitude().total_cmp(&b.magnitude()));

        let objects_unchanged = self.generation > 0 && self.same_objects(&accepted);
        if objects_unchanged && self.artworks == artworks {
            debug!(
                "catalog reload skipped: {} objects unchanged",
                self.objects.len()
            );
            return LoadOutcome::Unchanged;
        }

        self.generation += 1;
        if objects_unchanged {
            self.artworks = artworks;
            self.resolve_constellations();
            info!(
                "re-resolved {} constellations (generation {})",
                self.constellations.len(),
                self.generation
            );
            return LoadOutcome::ArtworkReloaded;
        }

        self.objects = accepted;
        self.by_id = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id().to_string(), i))
            .collect();
        self.planet_indices = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, o)| o.is_planet())
            .map(|(i, _)| i)
            .collect();
        self.sky_index = SkyIndex::build(DEFAULT_INDEX_NSIDE, &self.objects);
        self.artworks = artworks;
        self.resolve_constellations();

        info!(
            "loaded catalog: {} objects ({} planets), {} constellations (generation {})",
            self.objects.len(),
            self.planet_indices.len(),
            self.constellations.len(),
            self.generation
        );
        LoadOutcome::Reloaded
    }

    fn same_objects(&self, incoming: &[CelestialObject]) -> bool {
        incoming.len() == self.objects.len()
            && incoming.iter().zip(&self.objects).all(|(a, b)| {
                a.id() == b.id()
                    && a.is_planet() == b.is_planet()
                    && shortest_angle_delta(a.ra_deg(), b.ra_deg()).abs() < POSITION_EPSILON_DEG
                    && (a.dec_deg() - b.dec_deg()).abs() < POSITION_EPSILON_DEG
                    && a.magnitude() == b.magnitude()
            })
    }

    fn resolve_constellations(&mut self) {
        let by_id = &self.by_id;
        let objects = &self.objects;
        self.constellations = self
            .artworks
            .iter()
            .map(|art| Constellation::resolve(art, objects, |id| by_id.get(id).copied()))
            .collect();
    }

    /// Incremented every time [`load`](Self::load) changes the contents.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects, brightest first.
    pub fn all(&self) -> &[CelestialObject] {
        &self.objects
    }

    /// Object at a catalog index.
    pub fn object(&self, index: usize) -> Option<&CelestialObject> {
        self.objects.get(index)
    }

    pub fn get(&self, id: &str) -> Option<&CelestialObject> {
        self.index_of(id).map(|i| &self.objects[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// First object whose display name matches `name`, ignoring ASCII case.
    pub fn find_by_name(&self, name: &str) -> Option<&CelestialObject> {
        let name = name.trim();
        self.objects
            .iter()
            .find(|o| o.name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    /// Catalog indices of all planets, brightest first.
    pub fn planet_indices(&self) -> &[usize] {
        &self.planet_indices
    }

    pub fn constellations(&self) -> &[Constellation] {
        &self.constellations
    }

    /// Catalog indices of objects within `radius_deg` of `dir`, ascending.
    ///
    /// Since indices follow brightness order, the result is also brightest first.
    pub fn query_cone(&self, dir: &Vector3, radius_deg: f64) -> Vec<usize> {
        self.sky_index
            .query(&self.objects, dir, radius_deg.to_radians())
    }
}
