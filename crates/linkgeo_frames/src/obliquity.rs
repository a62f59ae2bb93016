//! Constant rotation between the J2000 equator and the J2000 ecliptic.
//!
//! Uses the IAU 1976 mean obliquity at J2000.0 (84381.448″), the value
//! that defines the ECLIPJ2000 frame.

use crate::matrix::{Mat3, mtxv, mxv};

/// Mean obliquity of the ecliptic at J2000.0, radians.
pub const OBLIQUITY_J2000_RAD: f64 = 84_381.448 / 3600.0 * std::f64::consts::PI / 180.0;

/// Rotation taking J2000 components to ECLIPJ2000 components.
pub fn j2000_to_ecliptic_matrix() -> Mat3 {
    let (s, c) = OBLIQUITY_J2000_RAD.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, s], [0.0, -s, c]]
}

/// Express a J2000 vector in ECLIPJ2000.
pub fn j2000_to_ecliptic(v: &[f64; 3]) -> [f64; 3] {
    mxv(&j2000_to_ecliptic_matrix(), v)
}

/// Express an ECLIPJ2000 vector in J2000.
pub fn ecliptic_to_j2000(v: &[f64; 3]) -> [f64; 3] {
    mtxv(&j2000_to_ecliptic_matrix(), v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obliquity_value() {
        assert!((OBLIQUITY_J2000_RAD.to_degrees() - 23.439_291_111).abs() < 1e-8);
    }

    #[test]
    fn north_celestial_pole_in_ecliptic() {
        let pole = j2000_to_ecliptic(&[0.0, 0.0, 1.0]);
        assert!(pole[0].abs() < 1e-15);
        assert!((pole[1] - OBLIQUITY_J2000_RAD.sin()).abs() < 1e-15);
        assert!((pole[2] - OBLIQUITY_J2000_RAD.cos()).abs() < 1e-15);
    }

    #[test]
    fn roundtrip() {
        let v = [1.2e8, -4.5e7, 3.3e6];
        let back = ecliptic_to_j2000(&j2000_to_ecliptic(&v));
        for i in 0..3 {
            assert!((back[i] - v[i]).abs() < 1e-6);
        }
    }
}
