//! 3-vector helpers and frame-tagged vectors.

use std::error::Error;
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};

use crate::frame::Frame;

pub fn add(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(a: &[f64; 3], k: f64) -> [f64; 3] {
    [a[0] * k, a[1] * k, a[2] * k]
}

pub fn neg(a: &[f64; 3]) -> [f64; 3] {
    [-a[0], -a[1], -a[2]]
}

pub fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Euclidean length, scaled to avoid overflow on very large components.
pub fn norm(a: &[f64; 3]) -> f64 {
    let m = a[0].abs().max(a[1].abs()).max(a[2].abs());
    if m == 0.0 || !m.is_finite() {
        return m;
    }
    let s = scale(a, 1.0 / m);
    m * dot(&s, &s).sqrt()
}

/// Unit vector, or `None` for a zero or non-finite vector.
pub fn unit(a: &[f64; 3]) -> Option<[f64; 3]> {
    let n = norm(a);
    if n == 0.0 || !n.is_finite() {
        return None;
    }
    Some(scale(a, 1.0 / n))
}

/// Angle between two vectors in radians, in [0, π].
///
/// Uses the chord-length (half-angle) form near 0 and π, where the inverse
/// cosine of the dot product loses precision, and a clamped inverse cosine
/// elsewhere. Returns `None` if either vector has zero length.
pub fn vsep(a: &[f64; 3], b: &[f64; 3]) -> Option<f64> {
    let ua = unit(a)?;
    let ub = unit(b)?;
    let d = dot(&ua, &ub);
    let angle = if d > 0.5 {
        let half_chord = 0.5 * norm(&sub(&ua, &ub));
        2.0 * half_chord.min(1.0).asin()
    } else if d < -0.5 {
        let half_chord = 0.5 * norm(&add(&ua, &ub));
        PI - 2.0 * half_chord.min(1.0).asin()
    } else {
        d.clamp(-1.0, 1.0).acos()
    };
    Some(angle)
}

/// Rotate `v` by `angle` radians about `axis` (Rodrigues). A zero axis
/// leaves `v` unchanged.
pub fn rotate_about(v: &[f64; 3], axis: &[f64; 3], angle: f64) -> [f64; 3] {
    let Some(k) = unit(axis) else {
        return *v;
    };
    let (s, c) = angle.sin_cos();
    let kxv = cross(&k, v);
    let kdv = dot(&k, v);
    [
        v[0] * c + kxv[0] * s + k[0] * kdv * (1.0 - c),
        v[1] * c + kxv[1] * s + k[1] * kdv * (1.0 - c),
        v[2] * c + kxv[2] * s + k[2] * kdv * (1.0 - c),
    ]
}

/// A 3-vector tagged with the frame it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameVector {
    pub frame: Frame,
    pub xyz: [f64; 3],
}

impl FrameVector {
    pub fn new(frame: Frame, xyz: [f64; 3]) -> Self {
        Self { frame, xyz }
    }

    pub fn norm(&self) -> f64 {
        norm(&self.xyz)
    }

    pub fn scaled(&self, k: f64) -> Self {
        Self::new(self.frame, scale(&self.xyz, k))
    }
}

/// Why an angle between two frame vectors is undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeparationError {
    /// The vectors are expressed in different frames.
    FrameMismatch { left: Frame, right: Frame },
    /// At least one vector has zero (or non-finite) length.
    ZeroLength,
}

impl Display for SeparationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FrameMismatch { left, right } => {
                write!(f, "vectors expressed in different frames ({left} vs {right})")
            }
            Self::ZeroLength => write!(f, "angle undefined for a zero-length vector"),
        }
    }
}

impl Error for SeparationError {}

/// Angle in radians between two vectors expressed in the same frame.
pub fn angular_separation(a: &FrameVector, b: &FrameVector) -> Result<f64, SeparationError> {
    if a.frame != b.frame {
        return Err(SeparationError::FrameMismatch {
            left: a.frame,
            right: b.frame,
        });
    }
    vsep(&a.xyz, &b.xyz).ok_or(SeparationError::ZeroLength)
}
