//! Magnitude level-of-detail: how faint a star is still drawn at a given zoom.
//!
//! The limiting magnitude is a piecewise-linear function of field of view.
//! Wide views show only bright stars; deep zoom shows the whole catalog.
//! Because the catalog is sorted brightest first, the visible set is always a
//! prefix of it, found in O(k) for k visible objects.

use tracing::debug;

use crate::catalog::CelestialCatalog;
use crate::object::CelestialObject;

/// `(fov_deg, limiting_magnitude)` pairs, widest FOV first.
pub const DEFAULT_LOD_BREAKPOINTS: [(f64, f64); 5] = [
    (150.0, 3.8),
    (75.0, 5.0),
    (20.0, 6.5),
    (5.0, 7.5),
    (0.1, 8.0),
];

#[derive(Debug, Clone, PartialEq)]
pub struct LodConfig {
    /// FOV is clamped into `[fov_min_deg, fov_max_deg]` before interpolation.
    pub fov_min_deg: f64,
    pub fov_max_deg: f64,
    /// Limit changes smaller than this keep the previous selection.
    pub hysteresis_mag: f64,
    /// `(fov_deg, magnitude)` breakpoints, FOV strictly decreasing.
    pub breakpoints: Vec<(f64, f64)>,
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            fov_min_deg: 0.1,
            fov_max_deg: 150.0,
            hysteresis_mag: 0.2,
            breakpoints: DEFAULT_LOD_BREAKPOINTS.to_vec(),
        }
    }
}

impl LodConfig {
    /// Limiting magnitude for a field of view in degrees.
    pub fn limiting_magnitude(&self, fov_deg: f64) -> f64 {
        interpolate_limit(&self.breakpoints, self.fov_min_deg, self.fov_max_deg, fov_deg)
    }
}

/// Limiting magnitude under the default breakpoints and FOV range.
pub fn limiting_magnitude(fov_deg: f64) -> f64 {
    interpolate_limit(&DEFAULT_LOD_BREAKPOINTS, 0.1, 150.0, fov_deg)
}

fn interpolate_limit(breakpoints: &[(f64, f64)], fov_min: f64, fov_max: f64, fov_deg: f64) -> f64 {
    let fov = if fov_deg.is_finite() {
        fov_deg.clamp(fov_min, fov_max)
    } else {
        fov_max
    };
    let (Some(&(wide_fov, wide_mag)), Some(&(_, narrow_mag))) =
        (breakpoints.first(), breakpoints.last())
    else {
        return f64::INFINITY;
    };
    if fov >= wide_fov {
        return wide_mag;
    }
    for pair in breakpoints.windows(2) {
        let (f0, m0) = pair[0];
        let (f1, m1) = pair[1];
        if fov == f1 {
            return m1;
        }
        if fov < f0 && fov > f1 {
            let t = (f0 - fov) / (f0 - f1);
            return m0 + t * (m1 - m0);
        }
    }
    narrow_mag
}

/// Chooses the brightness-sorted catalog prefix to draw, with hysteresis.
#[derive(Debug, Clone, Default)]
pub struct MagnitudeLodSelector {
    config: LodConfig,
    applied_limit: Option<f64>,
    prefix_len: usize,
    generation: u64,
}

impl MagnitudeLodSelector {
    pub fn new(config: LodConfig) -> Self {
        Self {
            config,
            applied_limit: None,
            prefix_len: 0,
            generation: 0,
        }
    }

    pub fn config(&self) -> &LodConfig {
        &self.config
    }

    /// Limit currently applied, `None` before the first selection.
    pub fn applied_limit(&self) -> Option<f64> {
        self.applied_limit
    }

    /// Forget the current selection so the next call recomputes it.
    pub fn reset(&mut self) {
        self.applied_limit = None;
        self.prefix_len = 0;
    }

    /// Objects to draw at `fov_deg`: the catalog prefix with
    /// `magnitude <= limit`.
    ///
    /// If the new limit is within the hysteresis band of the applied one and
    /// the catalog has not been reloaded, the previous prefix is returned.
    pub fn select_visible<'a>(
        &mut self,
        catalog: &'a CelestialCatalog,
        fov_deg: f64,
    ) -> &'a [CelestialObject] {
        let limit = self.config.limiting_magnitude(fov_deg);
        let all = catalog.all();

        if let Some(applied) = self.applied_limit {
            if self.generation == catalog.generation()
                && (limit - applied).abs() < self.config.hysteresis_mag
            {
                return &all[..self.prefix_len.min(all.len())];
            }
        }

        let len = all
            .iter()
            .take_while(|o| o.magnitude() <= limit)
            .count();
        debug!(
            "LOD limit {:?} -> {:.2} at fov {:.2}: {} of {} objects",
            self.applied_limit,
            limit,
            fov_deg,
            len,
            all.len()
        );
        self.applied_limit = Some(limit);
        self.prefix_len = len;
        self.generation = catalog.generation();
        &all[..len]
    }
}
