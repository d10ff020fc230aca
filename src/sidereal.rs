//! Julian date and sidereal time from Unix epoch milliseconds.
//!
//! Uses the IAU 1982 GMST polynomial as given in Meeus, *Astronomical
//! Algorithms*, eq. 12.4. The polynomial is evaluated in days from J2000.0,
//! so results are stable to well under an arcsecond over centuries, which is
//! far below anything visible on screen.

use crate::coords::wrap_degrees;

/// Julian date of the Unix epoch (1970-01-01T00:00:00Z).
pub const UNIX_EPOCH_JD: f64 = 2440587.5;
/// Julian date of J2000.0 (2000-01-01T12:00:00 TT, treated as UTC here).
pub const J2000_JD: f64 = 2451545.0;
/// Unix epoch milliseconds of J2000.0.
pub const J2000_EPOCH_MS: i64 = 946_728_000_000;

const MS_PER_DAY: f64 = 86_400_000.0;

/// Julian date for a Unix timestamp in milliseconds.
#[inline]
pub fn julian_date(epoch_ms: i64) -> f64 {
    epoch_ms as f64 / MS_PER_DAY + UNIX_EPOCH_JD
}

/// Greenwich Mean Sidereal Time in degrees, `[0, 360)`.
pub fn greenwich_mean_sidereal_time(epoch_ms: i64) -> f64 {
    let d = julian_date(epoch_ms) - J2000_JD;
    let t = d / 36525.0;
    let gmst = 280.46061837 + 360.98564736629 * d + 0.000387933 * t * t
        - t * t * t / 38_710_000.0;
    wrap_degrees(gmst)
}

/// Local Sidereal Time in degrees, `[0, 360)`.
///
/// `longitude_deg` is east-positive. Non-finite longitudes are treated as 0.
pub fn local_sidereal_time(epoch_ms: i64, longitude_deg: f64) -> f64 {
    let lon = if longitude_deg.is_finite() {
        longitude_deg
    } else {
        0.0
    };
    wrap_degrees(greenwich_mean_sidereal_time(epoch_ms) + lon + 360.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_julian_date_epochs() {
        assert_eq!(julian_date(0), UNIX_EPOCH_JD);
        assert!((julian_date(J2000_EPOCH_MS) - J2000_JD).abs() < 1e-9);
    }

    #[test]
    fn test_gmst_at_j2000() {
        let gmst = greenwich_mean_sidereal_time(J2000_EPOCH_MS);
        assert!(
            (gmst - 280.46061837).abs() < 1e-6,
            "GMST at J2000.0: expected 280.46061837, got {:.8}",
            gmst
        );
    }

    #[test]
    fn test_gmst_meeus_example_12b() {
        // Meeus example 12.b: 1987-04-10 19:21:00 UT -> 8h34m57.0896s
        let ms = 545_080_860_000;
        let expected = (8.0 + 34.0 / 60.0 + 57.0896 / 3600.0) * 15.0;
        let gmst = greenwich_mean_sidereal_time(ms);
        assert!(
            (gmst - expected).abs() < 1e-4,
            "GMST: expected {:.6}, got {:.6}",
            expected,
            gmst
        );
    }

    #[test]
    fn test_lst_adds_longitude() {
        let ms = 1_704_067_200_000; // 2024-01-01T00:00:00Z
        let g = greenwich_mean_sidereal_time(ms);
        let west = local_sidereal_time(ms, -122.4194);
        assert!((wrap_degrees(g - 122.4194) - west).abs() < 1e-9);
        let east = local_sidereal_time(ms, 139.6917);
        assert!((wrap_degrees(g + 139.6917) - east).abs() < 1e-9);
    }

    #[test]
    fn test_lst_range_and_nan_longitude() {
        for k in 0..48 {
            let ms = J2000_EPOCH_MS + k * 1_800_000;
            let lst = local_sidereal_time(ms, -179.9);
            assert!((0.0..360.0).contains(&lst), "LST out of range: {}", lst);
        }
        let lst_nan = local_sidereal_time(J2000_EPOCH_MS, f64::NAN);
        assert!((lst_nan - 280.46061837).abs() < 1e-6);
    }

    #[test]
    fn test_sidereal_day_advances_one_turn() {
        // One sidereal day (~86164.0905 s) brings GMST back to the same value
        let ms = J2000_EPOCH_MS;
        let sidereal_day_ms = 86_164_091;
        let a = greenwich_mean_sidereal_time(ms);
        let b = greenwich_mean_sidereal_time(ms + sidereal_day_ms);
        assert!((a - b).abs() < 1e-3, "a={} b={}", a, b);
    }
}
