//! State vectors and aberration-correction modes.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use linkgeo_frames::vector::norm;
use linkgeo_frames::{Frame, FrameVector};
use linkgeo_time::Epoch;

use crate::body::Body;
use crate::error::EngineError;

/// Speed of light in vacuum (km/s).
pub const SPEED_OF_LIGHT_KM_S: f64 = 299_792.458;

/// Aberration correction applied to a relative state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AberrationCorrection {
    /// Geometric state at the observation epoch.
    None,
    /// Target position at the light-time emission epoch.
    LightTime,
    /// Light time plus stellar aberration from the observer's velocity.
    #[default]
    LightTimeStellar,
}

impl AberrationCorrection {
    pub const fn code(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::LightTime => "LT",
            Self::LightTimeStellar => "LT+S",
        }
    }

    pub const fn uses_light_time(self) -> bool {
        !matches!(self, Self::None)
    }

    pub const fn uses_stellar_aberration(self) -> bool {
        matches!(self, Self::LightTimeStellar)
    }
}

impl Display for AberrationCorrection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AberrationCorrection {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        match compact.to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "LT" => Ok(Self::LightTime),
            "LT+S" => Ok(Self::LightTimeStellar),
            _ => Err(EngineError::InvalidQuery(
                "aberration correction must be NONE, LT, or LT+S",
            )),
        }
    }
}

/// Cartesian state of `target` relative to `observer`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateVector {
    pub position_km: [f64; 3],
    pub velocity_km_s: [f64; 3],
    pub frame: Frame,
    pub epoch: Epoch,
    pub observer: Body,
    pub target: Body,
    pub correction: AberrationCorrection,
}

impl StateVector {
    pub fn position(&self) -> FrameVector {
        FrameVector::new(self.frame, self.position_km)
    }

    pub fn velocity(&self) -> FrameVector {
        FrameVector::new(self.frame, self.velocity_km_s)
    }

    pub fn range_km(&self) -> f64 {
        norm(&self.position_km)
    }

    /// Packed `[x, y, z, vx, vy, vz]`.
    pub fn to_array(&self) -> [f64; 6] {
        let p = self.position_km;
        let v = self.velocity_km_s;
        [p[0], p[1], p[2], v[0], v[1], v[2]]
    }
}

/// A state together with the one-way light time of the solution that
/// produced it.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelativeState {
    pub state: StateVector,
    /// One-way light time between observer and target (s).
    pub light_time_s: f64,
    /// Light-time iterations performed; zero for geometric states.
    pub iterations: u32,
}
