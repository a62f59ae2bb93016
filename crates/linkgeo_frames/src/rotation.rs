//! Epoch-stamped rotations between named frames.
//!
//! A [`RotationMatrix`] is valid only at its epoch; frames attached to
//! rotating or articulated bodies change from one epoch to the next, so
//! these values are never reused across epochs.

use std::error::Error;
use std::fmt::{Display, Formatter};

use linkgeo_time::Epoch;

use crate::frame::Frame;
use crate::matrix::{self, IDENTITY, Mat3, ZERO, mxm, mxv, transpose};
use crate::vector::{FrameVector, add};

/// A vector or rotation was applied in a frame other than the one expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMismatch {
    pub expected: Frame,
    pub found: Frame,
}

impl Display for FrameMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "expected frame {}, found {}", self.expected, self.found)
    }
}

impl Error for FrameMismatch {}

/// Rotation taking components in `from` to components in `to` at `epoch`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix {
    pub from: Frame,
    pub to: Frame,
    pub epoch: Epoch,
    pub matrix: Mat3,
}

impl RotationMatrix {
    pub fn new(from: Frame, to: Frame, epoch: Epoch, matrix: Mat3) -> Self {
        Self {
            from,
            to,
            epoch,
            matrix,
        }
    }

    pub fn identity(frame: Frame, epoch: Epoch) -> Self {
        Self::new(frame, frame, epoch, IDENTITY)
    }

    /// Rotate a vector expressed in `from` into `to`.
    pub fn apply(&self, v: &FrameVector) -> Result<FrameVector, FrameMismatch> {
        if v.frame != self.from {
            return Err(FrameMismatch {
                expected: self.from,
                found: v.frame,
            });
        }
        Ok(FrameVector::new(self.to, mxv(&self.matrix, &v.xyz)))
    }

    /// The reverse rotation (`to` → `from`).
    pub fn inverse(&self) -> Self {
        Self::new(self.to, self.from, self.epoch, transpose(&self.matrix))
    }

    /// Compose `self` (A→B) with `next` (B→C) into A→C.
    pub fn then(&self, next: &RotationMatrix) -> Result<Self, FrameMismatch> {
        if next.from != self.to {
            return Err(FrameMismatch {
                expected: self.to,
                found: next.from,
            });
        }
        Ok(Self::new(
            self.from,
            next.to,
            self.epoch,
            mxm(&next.matrix, &self.matrix),
        ))
    }
}

/// Rotation plus its time derivative: the 6×6 state transformation
/// `[[R, 0], [dR/dt, R]]` in block form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateRotation {
    pub from: Frame,
    pub to: Frame,
    pub epoch: Epoch,
    pub rotation: Mat3,
    /// dR/dt, per second.
    pub rate: Mat3,
}

impl StateRotation {
    pub fn new(from: Frame, to: Frame, epoch: Epoch, rotation: Mat3, rate: Mat3) -> Self {
        Self {
            from,
            to,
            epoch,
            rotation,
            rate,
        }
    }

    pub fn identity(frame: Frame, epoch: Epoch) -> Self {
        Self::new(frame, frame, epoch, IDENTITY, ZERO)
    }

    /// Position and velocity in `to`: `p' = R p`, `v' = R v + (dR/dt) p`.
    pub fn apply(&self, position: &[f64; 3], velocity: &[f64; 3]) -> ([f64; 3], [f64; 3]) {
        let p = mxv(&self.rotation, position);
        let v = add(&mxv(&self.rotation, velocity), &mxv(&self.rate, position));
        (p, v)
    }

    pub fn inverse(&self) -> Self {
        Self::new(
            self.to,
            self.from,
            self.epoch,
            transpose(&self.rotation),
            transpose(&self.rate),
        )
    }

    /// Compose `self` (A→B) with `next` (B→C) into A→C.
    pub fn then(&self, next: &StateRotation) -> Result<Self, FrameMismatch> {
        if next.from != self.to {
            return Err(FrameMismatch {
                expected: self.to,
                found: next.from,
            });
        }
        let rotation = mxm(&next.rotation, &self.rotation);
        let rate = matrix::add(
            &mxm(&next.rate, &self.rotation),
            &mxm(&next.rotation, &self.rate),
        );
        Ok(Self::new(self.from, next.to, self.epoch, rotation, rate))
    }

    pub fn rotation_matrix(&self) -> RotationMatrix {
        RotationMatrix::new(self.from, self.to, self.epoch, self.rotation)
    }
}
