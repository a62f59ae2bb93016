//! Rotations of vectors and states between frames.

use linkgeo_frames::matrix::{self, IDENTITY, Mat3, ZERO, transpose};
use linkgeo_frames::obliquity::j2000_to_ecliptic_matrix;
use linkgeo_frames::{Frame, FrameVector, RotationMatrix, StateRotation};
use linkgeo_time::Epoch;

use crate::error::EngineError;
use crate::provider::EphemerisProvider;
use crate::state::StateVector;

/// Largest accepted deviation of a provider rotation from orthonormality.
pub const ROTATION_TOLERANCE: f64 = 1e-9;

/// Frame conversions at an epoch, backed by a provider.
///
/// Identity and the J2000 ↔ ECLIPJ2000 rotation are answered locally;
/// everything else is looked up per call and never reused across epochs.
pub struct FrameTransformer<'a, P: EphemerisProvider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: EphemerisProvider + ?Sized> FrameTransformer<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Rotation `from → to` at `epoch`.
    pub fn rotation(
        &self,
        from: Frame,
        to: Frame,
        epoch: Epoch,
    ) -> Result<RotationMatrix, EngineError> {
        if let Some(m) = builtin(from, to) {
            return Ok(RotationMatrix::new(from, to, epoch, m));
        }
        let r = self.provider.frame_transform(from, to, epoch)?;
        check_provider_rotation(from, to, r.from, r.to, &r.matrix)?;
        Ok(r)
    }

    /// Rotation `from → to` and its rate at `epoch`.
    pub fn state_rotation(
        &self,
        from: Frame,
        to: Frame,
        epoch: Epoch,
    ) -> Result<StateRotation, EngineError> {
        if let Some(m) = builtin(from, to) {
            return Ok(StateRotation::new(from, to, epoch, m, ZERO));
        }
        let r = self.provider.state_transform(from, to, epoch)?;
        check_provider_rotation(from, to, r.from, r.to, &r.rotation)?;
        if !r.rate.iter().flatten().all(|v| v.is_finite()) {
            return Err(EngineError::Internal(format!(
                "provider returned a non-finite rotation rate for {from} -> {to}"
            )));
        }
        Ok(r)
    }

    /// Express `vector` in `to`.
    pub fn transform_vector(
        &self,
        vector: &FrameVector,
        to: Frame,
        epoch: Epoch,
    ) -> Result<FrameVector, EngineError> {
        if vector.frame == to {
            return Ok(*vector);
        }
        let r = self.rotation(vector.frame, to, epoch)?;
        log::trace!("rotating vector {} -> {to}", vector.frame);
        Ok(r.apply(vector)?)
    }

    /// Express `state` in `to` at its own epoch, including the
    /// frame-rotation term in the velocity.
    pub fn transform_state(
        &self,
        state: &StateVector,
        to: Frame,
    ) -> Result<StateVector, EngineError> {
        if state.frame == to {
            return Ok(*state);
        }
        let sr = self.state_rotation(state.frame, to, state.epoch)?;
        let (position_km, velocity_km_s) = sr.apply(&state.position_km, &state.velocity_km_s);
        Ok(StateVector {
            position_km,
            velocity_km_s,
            frame: to,
            ..*state
        })
    }
}

fn builtin(from: Frame, to: Frame) -> Option<Mat3> {
    if from == to {
        Some(IDENTITY)
    } else if from == Frame::J2000 && to == Frame::ECLIPJ2000 {
        Some(j2000_to_ecliptic_matrix())
    } else if from == Frame::ECLIPJ2000 && to == Frame::J2000 {
        Some(transpose(&j2000_to_ecliptic_matrix()))
    } else {
        None
    }
}

fn check_provider_rotation(
    from: Frame,
    to: Frame,
    got_from: Frame,
    got_to: Frame,
    m: &Mat3,
) -> Result<(), EngineError> {
    if got_from != from {
        return Err(EngineError::FrameMismatch {
            expected: from,
            found: got_from,
        });
    }
    if got_to != to {
        return Err(EngineError::FrameMismatch {
            expected: to,
            found: got_to,
        });
    }
    if !matrix::is_rotation(m, ROTATION_TOLERANCE) {
        return Err(EngineError::Internal(format!(
            "provider rotation {from} -> {to} is not orthonormal (error {:e})",
            matrix::orthonormality_error(m)
        )));
    }
    Ok(())
}
