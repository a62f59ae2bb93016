//! Frame helpers for link geometry computations.
//!
//! Provides reference-frame identifiers, frame-tagged vectors, rotation and
//! state-rotation matrices, quaternion attitude interpolation, and the
//! constant J2000 ↔ ecliptic rotation.

pub mod frame;
pub mod matrix;
pub mod obliquity;
pub mod quaternion;
pub mod rotation;
pub mod vector;

pub use frame::Frame;
pub use matrix::Mat3;
pub use obliquity::{OBLIQUITY_J2000_RAD, ecliptic_to_j2000, j2000_to_ecliptic};
pub use quaternion::Quaternion;
pub use rotation::{FrameMismatch, RotationMatrix, StateRotation};
pub use vector::{FrameVector, SeparationError, angular_separation, vsep};
