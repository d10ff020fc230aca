//! Unit-sphere coordinate helpers.
//!
//! Equatorial positions are carried as degrees at the API boundary and as
//! unit vectors everywhere else:
//!
//! ```text
//! x = cos(dec) cos(ra),  y = cos(dec) sin(ra),  z = sin(dec)
//! ```
//!
//! +Z is the north celestial pole and +X points at RA = 0 on the equator.

use crate::Vector3;

/// Unit vector pointing to `(ra, dec)` on the celestial sphere.
///
/// Both angles are in degrees. At the poles `cos(dec)` is exactly zero, so the
/// result collapses to `(0, 0, ±1)` regardless of RA.
pub fn radec_to_uvec(ra_deg: f64, dec_deg: f64) -> Vector3 {
    let (rasin, racos) = ra_deg.to_radians().sin_cos();
    let (decsin, deccos) = dec_deg.clamp(-90.0, 90.0).to_radians().sin_cos();
    Vector3::new(deccos * racos, deccos * rasin, decsin)
}

/// Inverse of [`radec_to_uvec`]: returns `(ra, dec)` in degrees with RA in `[0, 360)`.
///
/// The input does not need to be normalized. A zero vector maps to `(0, 0)`.
pub fn uvec_to_radec(v: &Vector3) -> (f64, f64) {
    let n = v.norm();
    if n <= 0.0 {
        return (0.0, 0.0);
    }
    let dec = (v.z / n).clamp(-1.0, 1.0).asin().to_degrees();
    let ra = wrap_degrees(v.y.atan2(v.x).to_degrees());
    (ra, dec)
}

/// Wrap an angle in degrees into `[0, 360)`.
#[inline]
pub fn wrap_degrees(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if w >= 360.0 {
        0.0
    } else {
        w
    }
}

/// Shortest signed difference `to - from` in degrees, in `[-180, 180]`.
///
/// Used wherever azimuths are blended so that 359° → 1° is a +2° step rather
/// than a −358° sweep.
#[inline]
pub fn shortest_angle_delta(from_deg: f64, to_deg: f64) -> f64 {
    let d = (to_deg - from_deg).rem_euclid(360.0);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Angle between two direction vectors, in degrees.
///
/// Uses `atan2(|a×b|, a·b)`, which stays accurate for both tiny and
/// near-antipodal separations.
pub fn angular_separation_deg(a: &Vector3, b: &Vector3) -> f64 {
    let cross = a.cross(b).norm();
    let dot = a.dot(b);
    cross.atan2(dot).to_degrees()
}

/// Unit vector for a horizon direction in the local ground frame.
///
/// The ground frame shares the camera conventions of
/// [`SphereProjector`](crate::SphereProjector): +X is azimuth 0 on the
/// horizon, +Z is the zenith, and azimuth increases clockwise seen from above
/// (toward −Y).
pub fn horizon_to_uvec(az_deg: f64, alt_deg: f64) -> Vector3 {
    let (azsin, azcos) = az_deg.to_radians().sin_cos();
    let (altsin, altcos) = alt_deg.clamp(-90.0, 90.0).to_radians().sin_cos();
    Vector3::new(altcos * azcos, -altcos * azsin, altsin)
}

/// Normalize `v`, falling back to +X for a zero-length input.
pub(crate) fn normalize_or_fallback(v: Vector3) -> Vector3 {
    let n = v.norm();
    if n > 0.0 && n.is_finite() {
        v / n
    } else {
        Vector3::new(1.0, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uvec_is_unit_length() {
        for ra in (0..360).step_by(15) {
            for dec in (-90..=90).step_by(10) {
                let v = radec_to_uvec(ra as f64, dec as f64);
                assert!(
                    (v.norm() - 1.0).abs() < 1e-12,
                    "|uvec({}, {})| = {}",
                    ra,
                    dec,
                    v.norm()
                );
            }
        }
    }

    #[test]
    fn test_uvec_known_axes() {
        let x = radec_to_uvec(0.0, 0.0);
        assert!((x - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-15);
        let y = radec_to_uvec(90.0, 0.0);
        assert!((y - Vector3::new(0.0, 1.0, 0.0)).norm() < 1e-15);
        let pole = radec_to_uvec(123.0, 90.0);
        assert!((pole - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-15);
        let south = radec_to_uvec(17.0, -90.0);
        assert!((south - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-15);
    }

    #[test]
    fn test_uvec_roundtrip() {
        let points = [(0.0, 0.0), (37.95, 89.26), (201.3, -11.16), (359.9, 45.0)];
        for &(ra, dec) in &points {
            let (ra2, dec2) = uvec_to_radec(&radec_to_uvec(ra, dec));
            assert!(
                shortest_angle_delta(ra, ra2).abs() < 1e-9 && (dec - dec2).abs() < 1e-9,
                "Roundtrip failed for ({}, {}): got ({}, {})",
                ra,
                dec,
                ra2,
                dec2
            );
        }
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(0.0), 0.0);
        assert_eq!(wrap_degrees(360.0), 0.0);
        assert!((wrap_degrees(-30.0) - 330.0).abs() < 1e-12);
        assert!((wrap_degrees(725.0) - 5.0).abs() < 1e-12);
        let tiny = wrap_degrees(-1e-15);
        assert!((0.0..360.0).contains(&tiny));
    }

    #[test]
    fn test_shortest_angle_delta() {
        assert!((shortest_angle_delta(359.0, 1.0) - 2.0).abs() < 1e-12);
        assert!((shortest_angle_delta(1.0, 359.0) + 2.0).abs() < 1e-12);
        assert!((shortest_angle_delta(10.0, 100.0) - 90.0).abs() < 1e-12);
        assert!((shortest_angle_delta(0.0, 180.0).abs() - 180.0).abs() < 1e-12);
    }

    #[test]
    fn test_angular_separation() {
        let a = radec_to_uvec(10.0, 0.0);
        let b = radec_to_uvec(40.0, 0.0);
        assert!((angular_separation_deg(&a, &b) - 30.0).abs() < 1e-10);
        let c = radec_to_uvec(190.0, 0.0);
        assert!((angular_separation_deg(&a, &c) - 180.0).abs() < 1e-10);
    }

    #[test]
    fn test_horizon_uvec() {
        let north = horizon_to_uvec(0.0, 0.0);
        assert!((north - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-15);
        let east = horizon_to_uvec(90.0, 0.0);
        assert!((east - Vector3::new(0.0, -1.0, 0.0)).norm() < 1e-15);
        let zenith = horizon_to_uvec(200.0, 90.0);
        assert!((zenith - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-15);
    }
}
