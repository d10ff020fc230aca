//! Constellation artwork placement and crosshair focus opacity.

use crate::catalog::{Constellation, ResolvedAnchor};
use crate::projection::{ArtworkTransform, ScreenPoint};

/// Angular falloff for constellation artwork around the crosshair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusConfig {
    /// Full opacity when the constellation centre is within this many degrees
    /// of the look direction.
    pub full_radius_deg: f64,
    /// Zero opacity at and beyond this separation.
    pub fade_radius_deg: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            full_radius_deg: 12.0,
            fade_radius_deg: 40.0,
        }
    }
}

/// Artwork opacity in `[0, 1]` for a centre `separation_deg` from the
/// look direction. Smoothstep between the two radii, non-increasing in
/// separation.
pub fn focus_opacity(separation_deg: f64, config: &FocusConfig) -> f64 {
    if !separation_deg.is_finite() {
        return 0.0;
    }
    let full = config.full_radius_deg.max(0.0);
    let fade = config.fade_radius_deg.max(full);
    if separation_deg <= full {
        return 1.0;
    }
    if separation_deg >= fade {
        return 0.0;
    }
    let t = (separation_deg - full) / (fade - full);
    1.0 - t * t * (3.0 - 2.0 * t)
}

/// Fit an image-to-screen transform from the anchors whose stars are on
/// screen.
///
/// Three or more visible anchors give an affine map through the widest
/// screen triangle; exactly two give a similarity. Fewer anchors, a
/// degenerate fit, or a scale outside the sane range give `None`.
pub fn place_artwork<F>(constellation: &Constellation, screen_of: F) -> Option<ArtworkTransform>
where
    F: Fn(usize) -> Option<ScreenPoint>,
{
    let visible: Vec<(&ResolvedAnchor, ScreenPoint)> = constellation
        .anchors()
        .iter()
        .filter_map(|a| screen_of(a.object).map(|p| (a, p)))
        .collect();

    let transform = match visible.len() {
        0 | 1 => return None,
        2 => {
            let src = [visible[0].0.pixel, visible[1].0.pixel];
            let dst = [
                [visible[0].1.x, visible[0].1.y],
                [visible[1].1.x, visible[1].1.y],
            ];
            ArtworkTransform::from_two_points(&src, &dst)?
        }
        _ => {
            let [i, j, k] = widest_triangle(&visible)?;
            let src = [visible[i].0.pixel, visible[j].0.pixel, visible[k].0.pixel];
            let dst = [
                [visible[i].1.x, visible[i].1.y],
                [visible[j].1.x, visible[j].1.y],
                [visible[k].1.x, visible[k].1.y],
            ];
            ArtworkTransform::from_three_points(&src, &dst)?
        }
    };
    transform.is_sane().then_some(transform)
}

/// Indices of the three points spanning the largest screen-space triangle.
fn widest_triangle(points: &[(&ResolvedAnchor, ScreenPoint)]) -> Option<[usize; 3]> {
    let n = points.len();
    let mut best: Option<([usize; 3], f64)> = None;
    for i in 0..n {
        for j in (i + 1)..n {
            for k in (j + 1)..n {
                let (a, b, c) = (points[i].1, points[j].1, points[k].1);
                let area = ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs();
                if best.map_or(true, |(_, best_area)| area > best_area) {
                    best = Some(([i, j, k], area));
                }
            }
        }
    }
    best.filter(|&(_, area)| area > 0.0).map(|(idx, _)| idx)
}
