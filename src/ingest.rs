//! Typed ingestion of catalog and artwork payloads.
//!
//! Payloads arrive as JSON arrays from the host application. Each element is
//! decoded into a record struct with explicit optional fields, validated, and
//! converted to a domain object. A malformed element is logged and dropped;
//! only a payload that is not a JSON array at all is an error.
//!
//! Star record:
//!
//! ```json
//! {"id": "HIP32349", "name": "Sirius", "ra": 101.287, "dec": -16.716,
//!  "magnitude": -1.46, "spectralType": "A1V", "constellation": "CMa", "distance": 8.6}
//! ```
//!
//! Planet record: `{"name": "Mars", "ra": 10.0, "dec": 5.0, "magnitude": 0.5}`.
//!
//! Artwork record:
//!
//! ```json
//! {"id": "Ori", "name": "Orion", "imageName": "orion.png", "imageSize": [512, 512],
//!  "anchors": [{"pos": [100, 80], "hip": 27989}],
//!  "lines": [[27989, 26727, 26311]]}
//! ```

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::object::{hip_id, Anchor, CelestialObject, ConstellationArtwork, StarInfo};

/// Magnitude assumed for stars with no magnitude field.
pub const DEFAULT_STAR_MAGNITUDE: f64 = 6.0;
/// Magnitude assumed for planets with no magnitude field.
pub const DEFAULT_PLANET_MAGNITUDE: f64 = 0.0;

/// Result of ingesting one payload.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport<T> {
    /// Records that passed validation, in payload order.
    pub items: Vec<T>,
    /// Number of elements dropped as malformed.
    pub dropped: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarRecord {
    pub id: Option<String>,
    pub hip: Option<u32>,
    pub name: Option<String>,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    #[serde(alias = "mag")]
    pub magnitude: Option<f64>,
    #[serde(alias = "spectral_type", alias = "spect")]
    pub spectral_type: Option<String>,
    pub constellation: Option<String>,
    #[serde(alias = "distanceLightYears")]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub ra: Option<f64>,
    pub dec: Option<f64>,
    #[serde(alias = "mag")]
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnchorRecord {
    pub pos: [f64; 2],
    pub hip: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub image_name: Option<String>,
    pub image_size: Option<[f64; 2]>,
    /// Decoded one by one so a bad anchor drops only itself.
    #[serde(default)]
    pub anchors: Vec<serde_json::Value>,
    #[serde(default)]
    pub lines: Vec<Vec<u32>>,
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn checked_position(ra: Option<f64>, dec: Option<f64>) -> Result<(f64, f64), String> {
    let ra = ra.ok_or("missing ra")?;
    let dec = dec.ok_or("missing dec")?;
    if !ra.is_finite() || !dec.is_finite() {
        return Err(format!("non-finite position ({}, {})", ra, dec));
    }
    if !(-90.0..=90.0).contains(&dec) {
        return Err(format!("declination {} outside [-90, 90]", dec));
    }
    Ok((ra, dec))
}

fn magnitude_or(mag: Option<f64>, default: f64) -> f64 {
    mag.filter(|m| m.is_finite()).unwrap_or(default)
}

impl StarRecord {
    pub fn into_object(self) -> Result<CelestialObject, String> {
        let id = non_empty(self.id)
            .or_else(|| self.hip.map(hip_id))
            .ok_or("missing id")?;
        let (ra, dec) = checked_position(self.ra, self.dec)?;
        let info = StarInfo {
            spectral_type: non_empty(self.spectral_type),
            constellation: non_empty(self.constellation),
            distance_ly: self.distance.filter(|d| d.is_finite() && *d >= 0.0),
        };
        let mut star = CelestialObject::star(
            id,
            ra,
            dec,
            magnitude_or(self.magnitude, DEFAULT_STAR_MAGNITUDE),
        )
        .with_star_info(info);
        if let Some(name) = non_empty(self.name) {
            star = star.with_name(name);
        }
        Ok(star)
    }
}

impl PlanetRecord {
    pub fn into_object(self) -> Result<CelestialObject, String> {
        let name = non_empty(self.name);
        let id = non_empty(self.id)
            .or_else(|| name.as_ref().map(|n| n.to_lowercase()))
            .ok_or("missing id and name")?;
        let (ra, dec) = checked_position(self.ra, self.dec)?;
        let mut planet = CelestialObject::planet(
            id,
            ra,
            dec,
            magnitude_or(self.magnitude, DEFAULT_PLANET_MAGNITUDE),
        );
        if let Some(name) = name {
            planet = planet.with_name(name);
        }
        Ok(planet)
    }
}

impl ArtworkRecord {
    pub fn into_artwork(self) -> Result<ConstellationArtwork, String> {
        let id = non_empty(self.id).ok_or("missing id")?;
        let [w, h] = self.image_size.ok_or("missing imageSize")?;
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(format!("invalid imageSize [{}, {}]", w, h));
        }
        let mut anchors = Vec::with_capacity(self.anchors.len());
        for (idx, value) in self.anchors.into_iter().enumerate() {
            let a = match serde_json::from_value::<AnchorRecord>(value) {
                Ok(a) => a,
                Err(e) => {
                    debug!("artwork {}: dropping anchor #{}: {}", id, idx, e);
                    continue;
                }
            };
            let [x, y] = a.pos;
            if (0.0..=w).contains(&x) && (0.0..=h).contains(&y) {
                anchors.push(Anchor {
                    pixel: [x, y],
                    star_id: hip_id(a.hip),
                });
            } else {
                debug!("artwork {}: anchor HIP{} at ({}, {}) outside image", id, a.hip, x, y);
            }
        }
        let lines = self
            .lines
            .into_iter()
            .map(|l| l.into_iter().map(hip_id).collect())
            .collect();
        Ok(ConstellationArtwork {
            name: non_empty(self.name).unwrap_or_else(|| id.clone()),
            image_name: non_empty(self.image_name).unwrap_or_default(),
            id,
            image_size: [w, h],
            anchors,
            lines,
        })
    }
}

/// Decode a JSON array element by element, dropping the ones that fail.
fn ingest_array<R, T, F>(json: &str, what: &str, convert: F) -> anyhow::Result<IngestReport<T>>
where
    R: DeserializeOwned,
    F: Fn(R) -> Result<T, String>,
{
    let elements: Vec<serde_json::Value> = serde_json::from_str(json)
        .with_context(|| format!("{} payload is not a JSON array", what))?;

    let mut items = Vec::with_capacity(elements.len());
    let mut dropped = 0;
    for (idx, value) in elements.into_iter().enumerate() {
        let converted = serde_json::from_value::<R>(value)
            .map_err(|e| e.to_string())
            .and_then(&convert);
        match converted {
            Ok(item) => items.push(item),
            Err(reason) => {
                warn!("dropping {} record #{}: {}", what, idx, reason);
                dropped += 1;
            }
        }
    }
    info!("ingested {} {} records ({} dropped)", items.len(), what, dropped);
    Ok(IngestReport { items, dropped })
}

/// Parse a JSON array of star records.
pub fn parse_stars_json(json: &str) -> anyhow::Result<IngestReport<CelestialObject>> {
    ingest_array(json, "star", StarRecord::into_object)
}

/// Parse a JSON array of planet records.
pub fn parse_planets_json(json: &str) -> anyhow::Result<IngestReport<CelestialObject>> {
    ingest_array(json, "planet", PlanetRecord::into_object)
}

/// Parse a JSON array of constellation artwork records.
pub fn parse_artworks_json(json: &str) -> anyhow::Result<IngestReport<ConstellationArtwork>> {
    ingest_array(json, "artwork", ArtworkRecord::into_artwork)
}
