//! Reference-frame identifiers.

use std::fmt::{Display, Formatter};

/// A reference frame, identified by its NAIF frame code.
///
/// Built-in inertial frames use codes 1-21; body-fixed and spacecraft
/// frames use the codes assigned by their frame definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Frame(i32);

impl Frame {
    pub const J2000: Frame = Frame(1);
    pub const ECLIPJ2000: Frame = Frame(17);
    pub const IAU_EARTH: Frame = Frame(10013);
    pub const IAU_MARS: Frame = Frame(10014);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    /// NAIF frame code.
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Whether this is one of the built-in inertial frames.
    pub const fn is_inertial(self) -> bool {
        matches!(self.0, 1..=21)
    }

    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("J2000"),
            17 => Some("ECLIPJ2000"),
            10013 => Some("IAU_EARTH"),
            10014 => Some("IAU_MARS"),
            _ => None,
        }
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "FRAME({})", self.0),
        }
    }
}
