//! Display appearance of stars: colour from spectral class, radius from magnitude.

/// 8-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Colour as `0xRRGGBB`.
    pub fn to_hex(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// Harvard class → display colour, hottest first.
///
/// Values follow the commonly used blackbody approximations for the class
/// midpoints (O ≈ 40 kK down to M ≈ 3 kK).
pub const SPECTRAL_COLORS: [(char, Rgb); 7] = [
    ('O', Rgb::new(155, 176, 255)),
    ('B', Rgb::new(170, 191, 255)),
    ('A', Rgb::new(202, 215, 255)),
    ('F', Rgb::new(248, 247, 255)),
    ('G', Rgb::new(255, 244, 234)),
    ('K', Rgb::new(255, 210, 161)),
    ('M', Rgb::new(255, 204, 111)),
];

/// Colour for a spectral type string such as `"G2V"` or `"k5III"`.
///
/// Only the first non-whitespace character is significant; unknown or empty
/// types are white.
pub fn spectral_type_to_color(spectral_type: Option<&str>) -> Rgb {
    let Some(first) = spectral_type.and_then(|s| s.trim_start().chars().next()) else {
        return Rgb::WHITE;
    };
    let class = first.to_ascii_uppercase();
    SPECTRAL_COLORS
        .iter()
        .find(|(c, _)| *c == class)
        .map(|(_, rgb)| *rgb)
        .unwrap_or(Rgb::WHITE)
}

/// Linear magnitude → radius mapping, clamped at both ends.
///
/// `bright_mag` maps to `max_radius`, `faint_mag` maps to `min_radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnitudeScale {
    pub bright_mag: f64,
    pub faint_mag: f64,
    pub max_radius: f64,
    pub min_radius: f64,
}

impl Default for MagnitudeScale {
    fn default() -> Self {
        Self {
            bright_mag: -1.5,
            faint_mag: 6.0,
            max_radius: 6.0,
            min_radius: 1.0,
        }
    }
}

impl MagnitudeScale {
    /// Display radius in pixels for a magnitude. NaN is treated as the faint end.
    pub fn radius(&self, magnitude: f64) -> f64 {
        let span = self.faint_mag - self.bright_mag;
        if !magnitude.is_finite() || span.abs() < f64::EPSILON {
            return self.min_radius;
        }
        let t = ((self.faint_mag - magnitude) / span).clamp(0.0, 1.0);
        self.min_radius + t * (self.max_radius - self.min_radius)
    }
}

/// Radius for `magnitude` using the default [`MagnitudeScale`].
pub fn magnitude_to_radius(magnitude: f64) -> f64 {
    MagnitudeScale::default().radius(magnitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectral_colors() {
        assert_eq!(spectral_type_to_color(Some("G2V")), Rgb::new(255, 244, 234));
        assert_eq!(spectral_type_to_color(Some("m1.5Iab")), Rgb::new(255, 204, 111));
        assert_eq!(spectral_type_to_color(Some(" B8Ia")), Rgb::new(170, 191, 255));
        assert_eq!(spectral_type_to_color(Some("W")), Rgb::WHITE);
        assert_eq!(spectral_type_to_color(Some("")), Rgb::WHITE);
        assert_eq!(spectral_type_to_color(None), Rgb::WHITE);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::new(0x12, 0x34, 0x56).to_hex(), 0x123456);
    }

    #[test]
    fn test_radius_clamped_and_monotonic() {
        let scale = MagnitudeScale::default();
        assert_eq!(scale.radius(-5.0), scale.max_radius);
        assert_eq!(scale.radius(-1.5), scale.max_radius);
        assert_eq!(scale.radius(6.0), scale.min_radius);
        assert_eq!(scale.radius(12.0), scale.min_radius);
        assert_eq!(scale.radius(f64::NAN), scale.min_radius);

        let mut prev = f64::INFINITY;
        for i in 0..=100 {
            let mag = -3.0 + i as f64 * 0.1;
            let r = magnitude_to_radius(mag);
            assert!(r <= prev, "radius increased at mag {}: {} > {}", mag, r, prev);
            prev = r;
        }
    }
}
