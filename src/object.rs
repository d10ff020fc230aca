//! Catalog object types: stars, planets, and constellation artwork.
//!
//! Objects are immutable once ingested. The unit vector is derived from RA/Dec
//! when the object is built (or repositioned) so it can never drift from the
//! source coordinates.

use crate::coords::{radec_to_uvec, wrap_degrees};
use crate::Vector3;

/// Star-only descriptive metadata. None of it feeds into projection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StarInfo {
    /// Harvard classification, e.g. `"B8Ia"`. Drives display colour.
    pub spectral_type: Option<String>,
    /// Constellation abbreviation or name the star belongs to.
    pub constellation: Option<String>,
    /// Distance in light years.
    pub distance_ly: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Star(StarInfo),
    Planet,
}

/// A star or planet with a precomputed position on the unit sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct CelestialObject {
    id: String,
    name: Option<String>,
    ra_deg: f64,
    dec_deg: f64,
    magnitude: f64,
    kind: ObjectKind,
    uvec: Vector3,
}

impl CelestialObject {
    /// Build a star. RA is wrapped into `[0, 360)` and Dec clamped to `[-90, 90]`.
    pub fn star(id: impl Into<String>, ra_deg: f64, dec_deg: f64, magnitude: f64) -> Self {
        Self::with_kind(id, ra_deg, dec_deg, magnitude, ObjectKind::Star(StarInfo::default()))
    }

    /// Build a planet. RA is wrapped into `[0, 360)` and Dec clamped to `[-90, 90]`.
    pub fn planet(id: impl Into<String>, ra_deg: f64, dec_deg: f64, magnitude: f64) -> Self {
        Self::with_kind(id, ra_deg, dec_deg, magnitude, ObjectKind::Planet)
    }

    fn with_kind(
        id: impl Into<String>,
        ra_deg: f64,
        dec_deg: f64,
        magnitude: f64,
        kind: ObjectKind,
    ) -> Self {
        let mut obj = Self {
            id: id.into(),
            name: None,
            ra_deg: 0.0,
            dec_deg: 0.0,
            magnitude,
            kind,
            uvec: Vector3::new(1.0, 0.0, 0.0),
        };
        obj.set_position(ra_deg, dec_deg);
        obj
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// Attach star metadata. Has no effect on planets.
    pub fn with_star_info(mut self, info: StarInfo) -> Self {
        if let ObjectKind::Star(ref mut existing) = self.kind {
            *existing = info;
        }
        self
    }

    /// Move the object, recomputing its unit vector.
    pub fn set_position(&mut self, ra_deg: f64, dec_deg: f64) {
        self.ra_deg = wrap_degrees(ra_deg);
        self.dec_deg = dec_deg.clamp(-90.0, 90.0);
        self.uvec = radec_to_uvec(self.ra_deg, self.dec_deg);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name if present, otherwise the catalog id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn ra_deg(&self) -> f64 {
        self.ra_deg
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec_deg
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn is_planet(&self) -> bool {
        matches!(self.kind, ObjectKind::Planet)
    }

    /// Star metadata, or `None` for planets.
    pub fn star_info(&self) -> Option<&StarInfo> {
        match &self.kind {
            ObjectKind::Star(info) => Some(info),
            ObjectKind::Planet => None,
        }
    }

    pub fn spectral_type(&self) -> Option<&str> {
        self.star_info().and_then(|s| s.spectral_type.as_deref())
    }

    /// Unit vector pointing to the object on the celestial sphere.
    pub fn uvec(&self) -> &Vector3 {
        &self.uvec
    }

    /// One-line description for selection readouts.
    ///
    /// Stars: constellation, spectral type and distance where known.
    /// Planets: `"Planet"`.
    pub fn subtitle(&self) -> String {
        let info = match &self.kind {
            ObjectKind::Planet => return "Planet".to_string(),
            ObjectKind::Star(info) => info,
        };
        let mut parts: Vec<String> = Vec::new();
        if let Some(c) = info.constellation.as_deref().filter(|c| !c.is_empty()) {
            parts.push(c.to_string());
        }
        if let Some(sp) = info.spectral_type.as_deref().filter(|s| !s.is_empty()) {
            parts.push(sp.to_string());
        }
        if let Some(d) = info.distance_ly {
            parts.push(format!("{:.0} ly", d));
        }
        parts.push(format!("mag {:.2}", self.magnitude));
        parts.join(" · ")
    }
}

/// Correspondence between an artwork pixel and a catalog star.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    /// Pixel position in the artwork image, `[x, y]`.
    pub pixel: [f64; 2],
    /// Catalog id of the star the pixel sits on.
    pub star_id: String,
}

/// Constellation artwork and stick-figure definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstellationArtwork {
    pub id: String,
    pub name: String,
    pub image_name: String,
    /// Image size in pixels, `[width, height]`.
    pub image_size: [f64; 2],
    pub anchors: Vec<Anchor>,
    /// Polylines of catalog star ids; consecutive ids form a segment.
    pub lines: Vec<Vec<String>>,
}

/// Catalog id for a Hipparcos number, e.g. `HIP677`.
pub fn hip_id(hip: u32) -> String {
    format!("HIP{}", hip)
}
