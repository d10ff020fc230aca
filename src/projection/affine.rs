//! Image-to-screen transforms for constellation artwork.
//!
//! Artwork carries anchor pixels tied to catalog stars. Once those stars are
//! projected, the image is warped onto the screen with a full affine map (three
//! anchors) or a rotation + uniform scale + translation (two anchors).
//!
//! The map is
//!
//! ```text
//! [x]   [a  b] [u]   [tx]
//! [y] = [c  d] [v] + [ty]
//! ```
//!
//! with `(u, v)` in image pixels and `(x, y)` in screen pixels.

use nalgebra::Matrix3;

use crate::Vector3;

/// Accepted range for the singular values of the linear part.
pub const MIN_ARTWORK_SCALE: f64 = 0.02;
pub const MAX_ARTWORK_SCALE: f64 = 8.0;

/// Anchors closer than this (pixels) are treated as coincident.
const MIN_ANCHOR_SEPARATION: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtworkTransform {
    /// Row-major `[[a, b, tx], [c, d, ty]]`.
    pub matrix: [[f64; 3]; 2],
}

impl ArtworkTransform {
    pub const IDENTITY: ArtworkTransform = ArtworkTransform {
        matrix: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
    };

    /// Exact affine map sending each `src[i]` to `dst[i]`.
    ///
    /// Returns `None` if the source triangle is degenerate.
    pub fn from_three_points(src: &[[f64; 2]; 3], dst: &[[f64; 2]; 3]) -> Option<Self> {
        // Twice the signed area against the longest edge squared
        let e1 = [src[1][0] - src[0][0], src[1][1] - src[0][1]];
        let e2 = [src[2][0] - src[0][0], src[2][1] - src[0][1]];
        let e3 = [src[2][0] - src[1][0], src[2][1] - src[1][1]];
        let longest = [e1, e2, e3]
            .iter()
            .map(|e| e[0] * e[0] + e[1] * e[1])
            .fold(0.0_f64, f64::max);
        let area2 = e1[0] * e2[1] - e2[0] * e1[1];
        if longest < MIN_ANCHOR_SEPARATION * MIN_ANCHOR_SEPARATION
            || area2.abs() < 1e-12 * longest
        {
            return None;
        }

        let lu = Matrix3::new(
            src[0][0],
            src[0][1],
            1.0,
            src[1][0],
            src[1][1],
            1.0,
            src[2][0],
            src[2][1],
            1.0,
        )
        .lu();
        let row_x = lu.solve(&Vector3::new(dst[0][0], dst[1][0], dst[2][0]))?;
        let row_y = lu.solve(&Vector3::new(dst[0][1], dst[1][1], dst[2][1]))?;
        let t = Self {
            matrix: [
                [row_x[0], row_x[1], row_x[2]],
                [row_y[0], row_y[1], row_y[2]],
            ],
        };
        t.is_finite().then_some(t)
    }

    /// Similarity (rotation, uniform scale, translation) sending `src[i]` to
    /// `dst[i]`, computed as `z' = k z + t` over complex numbers.
    ///
    /// Returns `None` if the two source points coincide.
    pub fn from_two_points(src: &[[f64; 2]; 2], dst: &[[f64; 2]; 2]) -> Option<Self> {
        let (su, sv) = (src[1][0] - src[0][0], src[1][1] - src[0][1]);
        let (dx, dy) = (dst[1][0] - dst[0][0], dst[1][1] - dst[0][1]);
        let denom = su * su + sv * sv;
        if denom < MIN_ANCHOR_SEPARATION * MIN_ANCHOR_SEPARATION {
            return None;
        }
        // k = d / s
        let kr = (dx * su + dy * sv) / denom;
        let ki = (dy * su - dx * sv) / denom;
        let tx = dst[0][0] - (kr * src[0][0] - ki * src[0][1]);
        let ty = dst[0][1] - (ki * src[0][0] + kr * src[0][1]);
        let t = Self {
            matrix: [[kr, -ki, tx], [ki, kr, ty]],
        };
        t.is_finite().then_some(t)
    }

    /// Map an image pixel to the screen.
    pub fn apply(&self, u: f64, v: f64) -> (f64, f64) {
        let [[a, b, tx], [c, d, ty]] = self.matrix;
        (a * u + b * v + tx, c * u + d * v + ty)
    }

    pub fn determinant(&self) -> f64 {
        let [[a, b, _], [c, d, _]] = self.matrix;
        a * d - b * c
    }

    /// Geometric-mean scale factor, `sqrt(|det|)`.
    pub fn scale_factor(&self) -> f64 {
        self.determinant().abs().sqrt()
    }

    /// `(smallest, largest)` singular values of the linear part.
    pub fn singular_values(&self) -> (f64, f64) {
        let [[a, b, _], [c, d, _]] = self.matrix;
        let q = a * a + b * b + c * c + d * d;
        let det = self.determinant();
        let disc = (q * q - 4.0 * det * det).max(0.0).sqrt();
        let s_max = (0.5 * (q + disc)).sqrt();
        let s_min = (0.5 * (q - disc)).max(0.0).sqrt();
        (s_min, s_max)
    }

    /// True if the map neither collapses nor blows up the image: both singular
    /// values lie within `[MIN_ARTWORK_SCALE, MAX_ARTWORK_SCALE]`.
    ///
    /// Nearly collinear anchors give a tiny smallest singular value and are
    /// rejected here.
    pub fn is_sane(&self) -> bool {
        if !self.is_finite() {
            return false;
        }
        let (s_min, s_max) = self.singular_values();
        s_min >= MIN_ARTWORK_SCALE && s_max <= MAX_ARTWORK_SCALE
    }

    fn is_finite(&self) -> bool {
        self.matrix.iter().flatten().all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: (f64, f64), b: [f64; 2]) -> bool {
        (a.0 - b[0]).abs() < 1e-9 && (a.1 - b[1]).abs() < 1e-9
    }

    #[test]
    fn test_three_point_affine_maps_anchors() {
        let src = [[0.0, 0.0], [100.0, 0.0], [0.0, 50.0]];
        let dst = [[200.0, 300.0], [260.0, 320.0], [190.0, 340.0]];
        let t = ArtworkTransform::from_three_points(&src, &dst).unwrap();
        for i in 0..3 {
            assert!(close(t.apply(src[i][0], src[i][1]), dst[i]), "anchor {} not mapped", i);
        }
        assert!(t.is_sane());
    }

    #[test]
    fn test_collinear_anchors_rejected() {
        let src = [[0.0, 0.0], [50.0, 50.0], [100.0, 100.0]];
        let dst = [[0.0, 0.0], [10.0, 5.0], [20.0, 30.0]];
        assert!(ArtworkTransform::from_three_points(&src, &dst).is_none());
        let coincident = [[5.0, 5.0], [5.0, 5.0], [5.0, 5.0]];
        assert!(ArtworkTransform::from_three_points(&coincident, &dst).is_none());

        // Screen points nearly collinear: solvable but squashed flat
        let src = [[0.0, 0.0], [100.0, 0.0], [0.0, 100.0]];
        let dst = [[0.0, 0.0], [100.0, 0.0], [100.0, 0.5]];
        let t = ArtworkTransform::from_three_points(&src, &dst).unwrap();
        assert!(!t.is_sane(), "singular values {:?}", t.singular_values());
    }

    #[test]
    fn test_three_point_affine_large_coordinates() {
        // Anchor pixels far from the origin, as on a large texture
        let src = [[4000.0, 3000.0], [4200.0, 3000.0], [4000.0, 3300.0]];
        let dst = [[10.0, 20.0], [30.0, 20.0], [10.0, 50.0]];
        let t = ArtworkTransform::from_three_points(&src, &dst).unwrap();
        for i in 0..3 {
            assert!(close(t.apply(src[i][0], src[i][1]), dst[i]), "anchor {} not mapped", i);
        }
        let (s_min, s_max) = t.singular_values();
        assert!((s_min - 0.1).abs() < 1e-9 && (s_max - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_two_point_similarity() {
        let src = [[10.0, 10.0], [110.0, 10.0]];
        // Rotated 90 degrees and scaled by 2
        let dst = [[500.0, 500.0], [500.0, 700.0]];
        let t = ArtworkTransform::from_two_points(&src, &dst).unwrap();
        assert!(close(t.apply(10.0, 10.0), dst[0]));
        assert!(close(t.apply(110.0, 10.0), dst[1]));
        assert!((t.scale_factor() - 2.0).abs() < 1e-12);
        let (s_min, s_max) = t.singular_values();
        assert!((s_min - 2.0).abs() < 1e-9 && (s_max - 2.0).abs() < 1e-9);

        assert!(ArtworkTransform::from_two_points(&[[1.0, 1.0], [1.0, 1.0]], &dst).is_none());
    }

    #[test]
    fn test_scale_bounds() {
        let src = [[0.0, 0.0], [100.0, 0.0]];
        let tiny = ArtworkTransform::from_two_points(&src, &[[0.0, 0.0], [1.0, 0.0]]).unwrap();
        assert!(!tiny.is_sane());
        let huge = ArtworkTransform::from_two_points(&src, &[[0.0, 0.0], [900.0, 0.0]]).unwrap();
        assert!(!huge.is_sane());
        assert!(ArtworkTransform::IDENTITY.is_sane());
    }
}
