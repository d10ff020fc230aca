use tracing::debug;

use crate::object::{CelestialObject, ConstellationArtwork};
use crate::Vector3;

/// Artwork anchor whose star resolved to a catalog index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAnchor {
    pub pixel: [f64; 2],
    pub object: usize,
}

/// Constellation artwork resolved against a loaded catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Constellation {
    id: String,
    name: String,
    image_name: String,
    image_size: [f64; 2],
    anchors: Vec<ResolvedAnchor>,
    segments: Vec<[usize; 2]>,
    star_indices: Vec<usize>,
    center: Option<Vector3>,
}

impl Constellation {
    /// Resolve star ids through `lookup`.
    ///
    /// Unresolved anchors are dropped. A line segment is kept only when both of
    /// its endpoints resolve, so an unknown id splits a polyline instead of
    /// bridging across it.
    pub(crate) fn resolve<F>(
        art: &ConstellationArtwork,
        objects: &[CelestialObject],
        lookup: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<usize>,
    {
        let mut anchors = Vec::with_capacity(art.anchors.len());
        for a in &art.anchors {
            match lookup(&a.star_id) {
                Some(object) => anchors.push(ResolvedAnchor {
                    pixel: a.pixel,
                    object,
                }),
                None => debug!("{}: anchor star {} not in catalog", art.id, a.star_id),
            }
        }

        let mut segments = Vec::new();
        for line in &art.lines {
            let resolved: Vec<Option<usize>> = line.iter().map(|id| lookup(id)).collect();
            for pair in resolved.windows(2) {
                if let [Some(a), Some(b)] = pair {
                    if a != b {
                        segments.push([*a, *b]);
                    }
                }
            }
        }

        let mut star_indices: Vec<usize> = anchors
            .iter()
            .map(|a| a.object)
            .chain(segments.iter().flatten().copied())
            .collect();
        star_indices.sort_unstable();
        star_indices.dedup();

        let sum: Vector3 = star_indices
            .iter()
            .filter_map(|&i| objects.get(i))
            .map(|o| *o.uvec())
            .sum();
        let norm = sum.norm();
        let center = if norm > 1e-9 { Some(sum / norm) } else { None };

        Self {
            id: art.id.clone(),
            name: art.name.clone(),
            image_name: art.image_name.clone(),
            image_size: art.image_size,
            anchors,
            segments,
            star_indices,
            center,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image_name(&self) -> &str {
        &self.image_name
    }

    pub fn image_size(&self) -> [f64; 2] {
        self.image_size
    }

    pub fn anchors(&self) -> &[ResolvedAnchor] {
        &self.anchors
    }

    /// Line segments as pairs of catalog indices.
    pub fn segments(&self) -> &[[usize; 2]] {
        &self.segments
    }

    /// Every catalog index referenced by anchors or lines, ascending, no repeats.
    pub fn star_indices(&self) -> &[usize] {
        &self.star_indices
    }

    /// Normalized centroid of the referenced stars, `None` if nothing resolved.
    pub fn center(&self) -> Option<&Vector3> {
        self.center.as_ref()
    }
}
