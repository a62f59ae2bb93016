//! The boundary to already-loaded reference data.

use linkgeo_frames::matrix::{Mat3, scaled_difference};
use linkgeo_frames::{Frame, RotationMatrix, StateRotation};
use linkgeo_time::Epoch;

use crate::body::Body;
use crate::error::EngineError;
use crate::state::{AberrationCorrection, RelativeState};

/// Step used when a rotation rate has to be differenced numerically (s).
pub const RATE_STEP_S: f64 = 1.0;

/// Source of body states and frame orientations.
///
/// Implementations are deterministic functions of their inputs and of data
/// that is immutable while queries run, so a provider can be shared
/// read-only across threads.
pub trait EphemerisProvider {
    /// State of `target` relative to `observer` at `epoch`, in `frame`.
    ///
    /// Fails with [`EngineError::EphemerisDataUnavailable`] when no loaded
    /// data covers the pair at `epoch`.
    fn state_vector(
        &self,
        observer: Body,
        target: Body,
        epoch: Epoch,
        frame: Frame,
        correction: AberrationCorrection,
    ) -> Result<RelativeState, EngineError>;

    /// Rotation taking components in `from` to `to` at `epoch`.
    ///
    /// Fails with [`EngineError::FrameDataUnavailable`] when either frame
    /// has no orientation data at `epoch`.
    fn frame_transform(
        &self,
        from: Frame,
        to: Frame,
        epoch: Epoch,
    ) -> Result<RotationMatrix, EngineError>;

    /// Rotation and its time derivative.
    ///
    /// The default differentiates [`frame_transform`](Self::frame_transform)
    /// numerically; providers with analytic rates should override it.
    fn state_transform(
        &self,
        from: Frame,
        to: Frame,
        epoch: Epoch,
    ) -> Result<StateRotation, EngineError> {
        differentiate_rotation(from, to, epoch, |t| self.frame_transform(from, to, t))
    }
}

/// Build a [`StateRotation`] by differencing `rotation_at` around `epoch`.
///
/// Central difference where both neighbours are available, one-sided at
/// the edges of coverage. Errors other than missing frame data propagate.
pub fn differentiate_rotation<F>(
    from: Frame,
    to: Frame,
    epoch: Epoch,
    rotation_at: F,
) -> Result<StateRotation, EngineError>
where
    F: Fn(Epoch) -> Result<RotationMatrix, EngineError>,
{
    let center = rotation_at(epoch)?;
    let h = RATE_STEP_S;
    let rate: Mat3 = match (rotation_at(epoch - h), rotation_at(epoch + h)) {
        (Ok(behind), Ok(ahead)) => scaled_difference(&ahead.matrix, &behind.matrix, 0.5 / h),
        (Ok(behind), Err(e)) if is_coverage_edge(&e) => {
            scaled_difference(&center.matrix, &behind.matrix, 1.0 / h)
        }
        (Err(e), Ok(ahead)) if is_coverage_edge(&e) => {
            scaled_difference(&ahead.matrix, &center.matrix, 1.0 / h)
        }
        (Err(e), Err(_)) if is_coverage_edge(&e) => {
            log::warn!(
                "no neighbouring orientation for {from} -> {to} around ET {}",
                epoch.as_tdb_seconds()
            );
            return Err(e);
        }
        (Err(e), _) | (_, Err(e)) => return Err(e),
    };
    Ok(StateRotation::new(from, to, epoch, center.matrix, rate))
}

fn is_coverage_edge(e: &EngineError) -> bool {
    matches!(e, EngineError::FrameDataUnavailable { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkgeo_frames::matrix::{mxm, rotation_about_axis, skew};

    const SPUN: Frame = Frame::new(-1000);
    const OMEGA: f64 = 1.0e-4;

    /// Spins about z, covering only `[0, 100]` s.
    struct Spinner;

    impl EphemerisProvider for Spinner {
        fn state_vector(
            &self,
            observer: Body,
            target: Body,
            epoch: Epoch,
            _frame: Frame,
            _correction: AberrationCorrection,
        ) -> Result<RelativeState, EngineError> {
            Err(EngineError::EphemerisDataUnavailable {
                target,
                observer,
                epoch_tdb_s: epoch.as_tdb_seconds(),
            })
        }

        fn frame_transform(
            &self,
            from: Frame,
            to: Frame,
            epoch: Epoch,
        ) -> Result<RotationMatrix, EngineError> {
            let t = epoch.as_tdb_seconds();
            if !(0.0..=100.0).contains(&t) {
                return Err(EngineError::FrameDataUnavailable {
                    from,
                    to,
                    epoch_tdb_s: t,
                });
            }
            let m = rotation_about_axis(&[0.0, 0.0, 1.0], OMEGA * t)
                .ok_or_else(|| EngineError::Internal("axis".into()))?;
            Ok(RotationMatrix::new(from, to, epoch, m))
        }
    }

    fn expected_rate(t: f64) -> Mat3 {
        let r = rotation_about_axis(&[0.0, 0.0, 1.0], OMEGA * t).unwrap();
        mxm(&skew(&[0.0, 0.0, OMEGA]), &r)
    }

    fn max_diff(a: &Mat3, b: &Mat3) -> f64 {
        let mut worst: f64 = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                worst = worst.max((a[i][j] - b[i][j]).abs());
            }
        }
        worst
    }

    #[test]
    fn central_difference_inside_coverage() {
        let sr = Spinner
            .state_transform(SPUN, Frame::J2000, Epoch::from_tdb_seconds(50.0))
            .unwrap();
        assert!(max_diff(&sr.rate, &expected_rate(50.0)) < 1e-12);
    }

    #[test]
    fn one_sided_at_coverage_edges() {
        for t in [0.0, 100.0] {
            let sr = Spinner
                .state_transform(SPUN, Frame::J2000, Epoch::from_tdb_seconds(t))
                .unwrap();
            // Forward/backward differences are first order in the step.
            assert!(max_diff(&sr.rate, &expected_rate(t)) < 1e-7, "t = {t}");
        }
    }

    #[test]
    fn outside_coverage_fails() {
        let err = Spinner
            .state_transform(SPUN, Frame::J2000, Epoch::from_tdb_seconds(500.0))
            .unwrap_err();
        assert!(matches!(err, EngineError::FrameDataUnavailable { .. }));
    }

    #[test]
    fn neighbour_faults_are_not_treated_as_edges() {
        let at = Epoch::from_tdb_seconds(10.0);
        let err = differentiate_rotation(SPUN, Frame::J2000, at, |t| {
            if t == at {
                Ok(RotationMatrix::identity(SPUN, t))
            } else {
                Err(EngineError::Internal("corrupt attitude record".into()))
            }
        })
        .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
    }
}
