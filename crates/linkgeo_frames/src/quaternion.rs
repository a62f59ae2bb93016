//! Unit quaternions for sampled attitude.
//!
//! Scalar-first convention `q = (w, x, y, z)`; [`Quaternion::to_matrix`]
//! yields the rotation that takes components in the child frame to
//! components in the parent frame.

use crate::matrix::Mat3;

/// Unit quaternion, scalar first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Rotation by `angle` radians about `axis`. `None` for a zero axis.
    pub fn from_axis_angle(axis: &[f64; 3], angle: f64) -> Option<Self> {
        let k = crate::vector::unit(axis)?;
        let (s, c) = (0.5 * angle).sin_cos();
        Some(Self::new(c, k[0] * s, k[1] * s, k[2] * s))
    }

    fn dot(&self, other: &Self) -> f64 {
        self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Normalised copy, or `None` for a zero or non-finite quaternion.
    pub fn normalized(&self) -> Option<Self> {
        let n = self.norm();
        if n == 0.0 || !n.is_finite() {
            return None;
        }
        Some(Self::new(self.w / n, self.x / n, self.y / n, self.z / n))
    }

    pub fn to_matrix(&self) -> Mat3 {
        let Self { w, x, y, z } = *self;
        [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y - w * z),
                2.0 * (x * z + w * y),
            ],
            [
                2.0 * (x * y + w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z - w * x),
            ],
            [
                2.0 * (x * z - w * y),
                2.0 * (y * z + w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ]
    }

    /// Quaternion of a rotation matrix (Shepperd's method).
    pub fn from_matrix(m: &Mat3) -> Self {
        let trace = m[0][0] + m[1][1] + m[2][2];
        let q = if trace > 0.0 {
            let s = 2.0 * (1.0 + trace).sqrt();
            Self::new(
                0.25 * s,
                (m[2][1] - m[1][2]) / s,
                (m[0][2] - m[2][0]) / s,
                (m[1][0] - m[0][1]) / s,
            )
        } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
            let s = 2.0 * (1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt();
            Self::new(
                (m[2][1] - m[1][2]) / s,
                0.25 * s,
                (m[0][1] + m[1][0]) / s,
                (m[0][2] + m[2][0]) / s,
            )
        } else if m[1][1] > m[2][2] {
            let s = 2.0 * (1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt();
            Self::new(
                (m[0][2] - m[2][0]) / s,
                (m[0][1] + m[1][0]) / s,
                0.25 * s,
                (m[1][2] + m[2][1]) / s,
            )
        } else {
            let s = 2.0 * (1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt();
            Self::new(
                (m[1][0] - m[0][1]) / s,
                (m[0][2] + m[2][0]) / s,
                (m[1][2] + m[2][1]) / s,
                0.25 * s,
            )
        };
        if q.w < 0.0 {
            Self::new(-q.w, -q.x, -q.y, -q.z)
        } else {
            q
        }
    }

    /// Spherical linear interpolation along the shorter arc, `t` in [0, 1].
    pub fn slerp(&self, other: &Self, t: f64) -> Self {
        let mut end = *other;
        let mut d = self.dot(other);
        if d < 0.0 {
            end = Self::new(-end.w, -end.x, -end.y, -end.z);
            d = -d;
        }
        let (a, b) = if d > 0.9995 {
            (1.0 - t, t)
        } else {
            let theta = d.min(1.0).acos();
            let s = theta.sin();
            (((1.0 - t) * theta).sin() / s, (t * theta).sin() / s)
        };
        let q = Self::new(
            a * self.w + b * end.w,
            a * self.x + b * end.x,
            a * self.y + b * end.y,
            a * self.z + b * end.z,
        );
        q.normalized().unwrap_or(q)
    }

    /// Rotation angle between two attitudes, radians in [0, π].
    ///
    /// Chord form: `|q1 - q2| = 2 sin(θ/4)` for unit quaternions on the
    /// same hemisphere.
    pub fn angle_to(&self, other: &Self) -> f64 {
        let sign = if self.dot(other) < 0.0 { -1.0 } else { 1.0 };
        let dw = self.w - sign * other.w;
        let dx = self.x - sign * other.x;
        let dy = self.y - sign * other.y;
        let dz = self.z - sign * other.z;
        let chord = (dw * dw + dx * dx + dy * dy + dz * dz).sqrt();
        4.0 * (0.5 * chord).min(1.0).asin()
    }
}
