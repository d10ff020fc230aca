//! Equal-area-ish spherical binning for cone searches over catalog objects.
//!
//! Latitude is partitioned into `3 * nside` bins in `z = sin(dec)` and
//! longitude into `4 * nside` bins in right ascension, for `12 * nside^2`
//! cells. Each cell maps to a compact slice of object indices.
//!
//! Query flow:
//! 1. Bound the declination band of the cone and walk its z-bins.
//! 2. In each z-bin, bound the RA half-width and walk the (wrapped) RA bins.
//! 3. Apply the exact angular test with a dot-product threshold.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::coords::normalize_or_fallback;
use crate::object::CelestialObject;
use crate::Vector3;

#[derive(Debug, Clone, Default)]
pub struct SkyIndex {
    n_lat: u32,
    n_lon: u32,
    cell_offsets: Vec<u32>,
    object_indices: Vec<u32>,
}

impl SkyIndex {
    /// Bin `objects` by position. `nside` is clamped to at least 1.
    pub fn build(nside: u32, objects: &[CelestialObject]) -> Self {
        let nside = nside.max(1);
        let n_lat = 3 * nside;
        let n_lon = 4 * nside;
        let n_cells = (n_lat * n_lon) as usize;

        let mut bins: Vec<Vec<u32>> = vec![Vec::new(); n_cells];
        for (idx, obj) in objects.iter().enumerate() {
            let cell = Self::cell_for_uvec(n_lat, n_lon, obj.uvec());
            bins[cell as usize].push(idx as u32);
        }

        let mut cell_offsets = Vec::with_capacity(n_cells + 1);
        let mut object_indices = Vec::with_capacity(objects.len());
        cell_offsets.push(0);
        for bin in bins {
            object_indices.extend(bin);
            cell_offsets.push(object_indices.len() as u32);
        }

        Self {
            n_lat,
            n_lon,
            cell_offsets,
            object_indices,
        }
    }

    pub fn len(&self) -> usize {
        self.object_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_indices.is_empty()
    }

    /// Indices of `objects` within `radius_rad` of `dir`, sorted ascending.
    ///
    /// `objects` must be the slice the index was built from. `dir` is
    /// normalized internally and `radius_rad` is clamped to `[0, π]`.
    pub fn query(&self, objects: &[CelestialObject], dir: &Vector3, radius_rad: f64) -> Vec<usize> {
        if self.is_empty() || self.n_lat == 0 {
            return Vec::new();
        }
        let radius = if radius_rad.is_finite() {
            radius_rad.clamp(0.0, PI)
        } else {
            PI
        };
        let dir = normalize_or_fallback(*dir);
        let cos_radius = radius.cos();

        let dec0 = dir.z.clamp(-1.0, 1.0).asin();
        let z_min = (dec0 - radius).max(-FRAC_PI_2).sin();
        let z_max = (dec0 + radius).min(FRAC_PI_2).sin();
        let z_step = 2.0 / self.n_lat as f64;
        let lon_step = TAU / self.n_lon as f64;

        let phi = dir.y.atan2(dir.x).rem_euclid(TAU);

        let mut out = Vec::new();
        let lat_start = Self::z_to_lat_bin(self.n_lat, z_min);
        let lat_end = Self::z_to_lat_bin(self.n_lat, z_max);
        for lat_bin in lat_start..=lat_end {
            // Widest RA span in this band occurs at its most poleward edge
            let z_lo = -1.0 + lat_bin as f64 * z_step;
            let z_hi = z_lo + z_step;
            let z_pole = z_lo.abs().max(z_hi.abs()).min(1.0);
            let cos_band = (1.0 - z_pole * z_pole).sqrt();

            let ratio = if cos_band > 1e-9 {
                radius.sin() / cos_band
            } else {
                f64::INFINITY
            };
            if radius >= FRAC_PI_2 || ratio >= 1.0 {
                for lon_bin in 0..self.n_lon {
                    self.collect_cell(objects, lat_bin, lon_bin, &dir, cos_radius, &mut out);
                }
                continue;
            }

            let half_span = ratio.asin() + lon_step;
            self.for_each_wrapped_lon_bin(phi - half_span, phi + half_span, |lon_bin| {
                self.collect_cell(objects, lat_bin, lon_bin, &dir, cos_radius, &mut out);
            });
        }

        out.sort_unstable();
        out.dedup();
        out
    }

    fn collect_cell(
        &self,
        objects: &[CelestialObject],
        lat_bin: u32,
        lon_bin: u32,
        dir: &Vector3,
        cos_radius: f64,
        out: &mut Vec<usize>,
    ) {
        let cell = (lat_bin * self.n_lon + lon_bin) as usize;
        let start = self.cell_offsets[cell] as usize;
        let end = self.cell_offsets[cell + 1] as usize;
        for &idx in &self.object_indices[start..end] {
            let idx = idx as usize;
            if let Some(obj) = objects.get(idx) {
                if dir.dot(obj.uvec()) >= cos_radius {
                    out.push(idx);
                }
            }
        }
    }

    fn for_each_wrapped_lon_bin<F>(&self, lon_min: f64, lon_max: f64, mut f: F)
    where
        F: FnMut(u32),
    {
        if lon_max - lon_min >= TAU {
            for lon_bin in 0..self.n_lon {
                f(lon_bin);
            }
            return;
        }
        let start_bin = Self::phi_to_lon_bin(self.n_lon, lon_min.rem_euclid(TAU));
        let end_bin = Self::phi_to_lon_bin(self.n_lon, lon_max.rem_euclid(TAU));

        if start_bin <= end_bin {
            for lon_bin in start_bin..=end_bin {
                f(lon_bin);
            }
            return;
        }
        for lon_bin in start_bin..self.n_lon {
            f(lon_bin);
        }
        for lon_bin in 0..=end_bin {
            f(lon_bin);
        }
    }

    fn cell_for_uvec(n_lat: u32, n_lon: u32, v: &Vector3) -> u32 {
        let phi = v.y.atan2(v.x).rem_euclid(TAU);
        let lat_bin = Self::z_to_lat_bin(n_lat, v.z);
        let lon_bin = Self::phi_to_lon_bin(n_lon, phi);
        lat_bin * n_lon + lon_bin
    }

    fn z_to_lat_bin(n_lat: u32, z: f64) -> u32 {
        let u = ((z.clamp(-1.0, 1.0) + 1.0) * 0.5).clamp(0.0, 1.0);
        ((u * n_lat as f64).floor() as u32).min(n_lat - 1)
    }

    fn phi_to_lon_bin(n_lon: u32, phi: f64) -> u32 {
        let u = (phi / TAU).clamp(0.0, 1.0);
        ((u * n_lon as f64).floor() as u32).min(n_lon - 1)
    }
}
