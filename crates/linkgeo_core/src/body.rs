//! Ephemeris object identifiers.

use std::fmt::{Display, Formatter};

/// A body, barycenter, or spacecraft identified by its NAIF ID code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Body(i32);

impl Body {
    pub const SOLAR_SYSTEM_BARYCENTER: Body = Body(0);
    pub const EARTH_MOON_BARYCENTER: Body = Body(3);
    pub const MARS_BARYCENTER: Body = Body(4);
    pub const SUN: Body = Body(10);
    pub const MOON: Body = Body(301);
    pub const EARTH: Body = Body(399);
    pub const MARS: Body = Body(499);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// NAIF ID code.
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Planet-to-barycenter fallback for planets whose system barycenter
    /// lies within a metre of the planet: Mercury, Venus, Mars.
    ///
    /// Systems with massive moons (Earth-Moon offset is ~4700 km) have no
    /// fallback, so a missing planet segment is reported instead.
    pub const fn system_barycenter(self) -> Option<Body> {
        match self.0 {
            199 | 299 | 499 => Some(Body(self.0 / 100)),
            _ => None,
        }
    }

    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("SOLAR SYSTEM BARYCENTER"),
            3 => Some("EARTH-MOON BARYCENTER"),
            4 => Some("MARS BARYCENTER"),
            10 => Some("SUN"),
            301 => Some("MOON"),
            399 => Some("EARTH"),
            499 => Some("MARS"),
            _ => None,
        }
    }
}

impl Display for Body {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "BODY({})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn barycenter_fallback() {
        assert_eq!(Body::MARS.system_barycenter(), Some(Body::MARS_BARYCENTER));
        assert_eq!(Body::new(299).system_barycenter(), Some(Body::new(2)));
        assert_eq!(Body::EARTH.system_barycenter(), None);
        assert_eq!(Body::new(599).system_barycenter(), None);
        assert_eq!(Body::MOON.system_barycenter(), None);
        assert_eq!(Body::new(-76).system_barycenter(), None);
    }

    #[test]
    fn display() {
        assert_eq!(Body::EARTH.to_string(), "EARTH");
        assert_eq!(Body::new(-76).to_string(), "BODY(-76)");
    }
}
