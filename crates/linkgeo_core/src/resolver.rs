//! Light-time and stellar-aberration corrected relative states.
//!
//! The resolver asks its provider only for geometric J2000 states of single
//! bodies relative to the solar system barycenter. Corrections are solved in
//! J2000 and the result is then rotated into the requested frame, so the
//! position and velocity always come from the same light-time solution.

use std::collections::HashMap;

use linkgeo_frames::Frame;
use linkgeo_frames::vector::{add, cross, dot, norm, rotate_about, scale, sub, unit};
use linkgeo_time::Epoch;

use crate::body::Body;
use crate::error::EngineError;
use crate::provider::EphemerisProvider;
use crate::state::{AberrationCorrection, RelativeState, SPEED_OF_LIGHT_KM_S, StateVector};
use crate::transformer::FrameTransformer;

/// Convergence floor for very short light times (s).
pub const LIGHT_TIME_FLOOR_S: f64 = 1e-15;

/// Light-time iteration controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightTimeSettings {
    /// Relative change in light time accepted as converged.
    pub tolerance: f64,
    pub max_iterations: u32,
    /// Step used to difference the stellar-aberration correction (s).
    pub aberration_step_s: f64,
}

impl Default for LightTimeSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-12,
            max_iterations: 6,
            aberration_step_s: 1.0,
        }
    }
}

impl LightTimeSettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(EngineError::InvalidConfig(
                "light-time tolerance must be finite and positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(EngineError::InvalidConfig(
                "light-time max_iterations must be at least 1",
            ));
        }
        if !(self.aberration_step_s.is_finite() && self.aberration_step_s > 0.0) {
            return Err(EngineError::InvalidConfig(
                "aberration_step_s must be finite and positive",
            ));
        }
        Ok(())
    }
}

/// Telemetry from a query or batch of queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryStats {
    /// Provider lookups actually performed.
    pub evaluations: u32,
    pub cache_hits: u32,
}

/// Per-query memoization of barycentric states.
///
/// Keys use `epoch.to_bits()`: within one query the same retarded epoch is
/// recomputed bit-identically, e.g. once the light time has settled.
struct ComputationContext {
    cache: HashMap<(i32, u64), [f64; 6]>,
    evaluations: u32,
    cache_hits: u32,
}

impl ComputationContext {
    fn new() -> Self {
        Self {
            cache: HashMap::with_capacity(16),
            evaluations: 0,
            cache_hits: 0,
        }
    }

    fn stats(&self) -> QueryStats {
        QueryStats {
            evaluations: self.evaluations,
            cache_hits: self.cache_hits,
        }
    }
}

fn position(s: &[f64; 6]) -> [f64; 3] {
    [s[0], s[1], s[2]]
}

fn velocity(s: &[f64; 6]) -> [f64; 3] {
    [s[3], s[4], s[5]]
}

/// Apparent direction after stellar aberration.
///
/// Rotates `position` toward the observer's barycentric velocity by
/// `asin(|û × v/c|)`. A zero position is returned unchanged.
pub fn stellar_aberration(
    position: &[f64; 3],
    observer_velocity: &[f64; 3],
) -> Result<[f64; 3], EngineError> {
    let Some(u) = unit(position) else {
        return Ok(*position);
    };
    if !(norm(observer_velocity) < SPEED_OF_LIGHT_KM_S) {
        return Err(EngineError::DegenerateGeometry(
            "observer speed is not below the speed of light",
        ));
    }
    let beta = scale(observer_velocity, 1.0 / SPEED_OF_LIGHT_KM_S);
    let axis = cross(&u, &beta);
    let sin_phi = norm(&axis);
    if sin_phi == 0.0 {
        return Ok(*position);
    }
    Ok(rotate_about(position, &axis, sin_phi.min(1.0).asin()))
}

struct LightTimeSolution {
    position: [f64; 3],
    velocity: [f64; 3],
    light_time_s: f64,
    iterations: u32,
}

/// Resolves observer → target states with aberration corrections.
pub struct StateVectorResolver<'a, P: EphemerisProvider + ?Sized> {
    provider: &'a P,
    settings: LightTimeSettings,
}

impl<'a, P: EphemerisProvider + ?Sized> StateVectorResolver<'a, P> {
    pub fn new(provider: &'a P) -> Self {
        Self {
            provider,
            settings: LightTimeSettings::default(),
        }
    }

    pub fn with_settings(
        provider: &'a P,
        settings: LightTimeSettings,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(Self { provider, settings })
    }

    pub fn settings(&self) -> &LightTimeSettings {
        &self.settings
    }

    /// State of `target` as seen from `observer` at `epoch`, in `frame`.
    pub fn relative_state(
        &self,
        observer: Body,
        target: Body,
        epoch: Epoch,
        frame: Frame,
        correction: AberrationCorrection,
    ) -> Result<RelativeState, EngineError> {
        let mut ctx = ComputationContext::new();
        self.relative_state_with_ctx(observer, target, epoch, frame, correction, &mut ctx)
    }

    /// [`relative_state`](Self::relative_state) plus provider telemetry.
    pub fn relative_state_with_stats(
        &self,
        observer: Body,
        target: Body,
        epoch: Epoch,
        frame: Frame,
        correction: AberrationCorrection,
    ) -> Result<(RelativeState, QueryStats), EngineError> {
        let mut ctx = ComputationContext::new();
        let state =
            self.relative_state_with_ctx(observer, target, epoch, frame, correction, &mut ctx)?;
        Ok((state, ctx.stats()))
    }

    fn relative_state_with_ctx(
        &self,
        observer: Body,
        target: Body,
        epoch: Epoch,
        frame: Frame,
        correction: AberrationCorrection,
        ctx: &mut ComputationContext,
    ) -> Result<RelativeState, EngineError> {
        if !epoch.is_finite() {
            return Err(EngineError::InvalidQuery("epoch must be finite"));
        }
        if observer == target {
            return Err(EngineError::InvalidQuery(
                "target and observer body cannot be identical",
            ));
        }

        let obs = self.barycentric(observer, epoch, ctx)?;
        let mut solution = if correction.uses_light_time() {
            self.solve_light_time(&obs, target, epoch, ctx)?
        } else {
            let tgt = self.barycentric(target, epoch, ctx)?;
            let p = sub(&position(&tgt), &position(&obs));
            LightTimeSolution {
                light_time_s: norm(&p) / SPEED_OF_LIGHT_KM_S,
                position: p,
                velocity: sub(&velocity(&tgt), &velocity(&obs)),
                iterations: 0,
            }
        };

        if correction.uses_stellar_aberration() {
            let apparent = stellar_aberration(&solution.position, &velocity(&obs))?;
            let offset = sub(&apparent, &solution.position);
            let rate = self.aberration_rate(observer, &solution, &offset, epoch, ctx)?;
            solution.position = apparent;
            solution.velocity = add(&solution.velocity, &rate);
        }

        let mut state = StateVector {
            position_km: solution.position,
            velocity_km_s: solution.velocity,
            frame: Frame::J2000,
            epoch,
            observer,
            target,
            correction,
        };
        if frame != Frame::J2000 {
            state = FrameTransformer::new(self.provider).transform_state(&state, frame)?;
        }
        log::trace!(
            "{target} from {observer} at ET {} ({correction}): {:.3} km, light time {:.9} s",
            epoch.as_tdb_seconds(),
            state.range_km(),
            solution.light_time_s
        );

        Ok(RelativeState {
            state,
            light_time_s: solution.light_time_s,
            iterations: solution.iterations,
        })
    }

    /// Geometric J2000 state of `body` relative to the solar system
    /// barycenter.
    fn barycentric(
        &self,
        body: Body,
        epoch: Epoch,
        ctx: &mut ComputationContext,
    ) -> Result<[f64; 6], EngineError> {
        if body == Body::SOLAR_SYSTEM_BARYCENTER {
            return Ok([0.0; 6]);
        }
        let key = (body.code(), epoch.as_tdb_seconds().to_bits());
        if let Some(cached) = ctx.cache.get(&key) {
            ctx.cache_hits += 1;
            return Ok(*cached);
        }
        let rs = self.provider.state_vector(
            Body::SOLAR_SYSTEM_BARYCENTER,
            body,
            epoch,
            Frame::J2000,
            AberrationCorrection::None,
        )?;
        if rs.state.frame != Frame::J2000 {
            return Err(EngineError::FrameMismatch {
                expected: Frame::J2000,
                found: rs.state.frame,
            });
        }
        let state = rs.state.to_array();
        ctx.evaluations += 1;
        ctx.cache.insert(key, state);
        Ok(state)
    }

    /// Fixed-point iteration `τ = |T(t - τ) - O(t)| / c`.
    fn solve_light_time(
        &self,
        obs: &[f64; 6],
        target: Body,
        epoch: Epoch,
        ctx: &mut ComputationContext,
    ) -> Result<LightTimeSolution, EngineError> {
        let obs_pos = position(obs);
        let geometric = self.barycentric(target, epoch, ctx)?;
        let mut tau = norm(&sub(&position(&geometric), &obs_pos)) / SPEED_OF_LIGHT_KM_S;
        let mut residual = f64::INFINITY;

        for iteration in 1..=self.settings.max_iterations {
            let tgt = self.barycentric(target, epoch - tau, ctx)?;
            let r = sub(&position(&tgt), &obs_pos);
            let next = norm(&r) / SPEED_OF_LIGHT_KM_S;
            residual = (next - tau).abs();
            tau = next;
            if residual <= (self.settings.tolerance * tau).max(LIGHT_TIME_FLOOR_S) {
                let v_tgt = velocity(&tgt);
                let v_rel = sub(&v_tgt, &velocity(obs));
                // d(tau)/dt from c * tau = |r|, with r = T(t - tau) - O(t).
                let dtau = match unit(&r) {
                    Some(u) => dot(&u, &v_rel) / (SPEED_OF_LIGHT_KM_S + dot(&u, &v_tgt)),
                    None => 0.0,
                };
                log::debug!(
                    "light time to {target} converged after {iteration} iterations: {tau:.12} s"
                );
                return Ok(LightTimeSolution {
                    position: r,
                    velocity: sub(&scale(&v_tgt, 1.0 - dtau), &velocity(obs)),
                    light_time_s: tau,
                    iterations: iteration,
                });
            }
        }

        log::warn!(
            "light time to {target} did not settle in {} iterations (residual {residual:e} s)",
            self.settings.max_iterations
        );
        Err(EngineError::NonConvergence {
            iterations: self.settings.max_iterations,
            residual_s: residual,
        })
    }

    /// Stellar-aberration offset with the observer displaced by `dt`.
    fn aberration_offset(
        &self,
        observer: Body,
        solution: &LightTimeSolution,
        epoch: Epoch,
        dt: f64,
        ctx: &mut ComputationContext,
    ) -> Result<[f64; 3], EngineError> {
        let obs = self.barycentric(observer, epoch + dt, ctx)?;
        let p = add(&solution.position, &scale(&solution.velocity, dt));
        Ok(sub(&stellar_aberration(&p, &velocity(&obs))?, &p))
    }

    /// Time derivative of the stellar-aberration offset, differenced with
    /// observer velocities around `epoch`; one-sided where coverage ends and
    /// zero when neither neighbour is covered.
    fn aberration_rate(
        &self,
        observer: Body,
        solution: &LightTimeSolution,
        offset: &[f64; 3],
        epoch: Epoch,
        ctx: &mut ComputationContext,
    ) -> Result<[f64; 3], EngineError> {
        let h = self.settings.aberration_step_s;
        let behind = self.aberration_offset(observer, solution, epoch, -h, ctx);
        let ahead = self.aberration_offset(observer, solution, epoch, h, ctx);
        let rate = match (behind, ahead) {
            (Ok(b), Ok(a)) => scale(&sub(&a, &b), 0.5 / h),
            (Err(b), Err(a)) if is_coverage_edge(&b) && is_coverage_edge(&a) => {
                log::warn!(
                    "no observer {observer} data within {h} s of ET {}; \
                     apparent velocity omits the aberration rate",
                    epoch.as_tdb_seconds()
                );
                [0.0; 3]
            }
            (Ok(b), Err(e)) if is_coverage_edge(&e) => scale(&sub(offset, &b), 1.0 / h),
            (Err(e), Ok(a)) if is_coverage_edge(&e) => scale(&sub(&a, offset), 1.0 / h),
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };
        Ok(rate)
    }
}

fn is_coverage_edge(e: &EngineError) -> bool {
    matches!(e, EngineError::EphemerisDataUnavailable { .. })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkgeo_frames::vsep;

    #[test]
    fn aberration_leaves_parallel_and_zero_alone() {
        let p = [1.0e6, 0.0, 0.0];
        assert_eq!(stellar_aberration(&p, &[30.0, 0.0, 0.0]).unwrap(), p);
        assert_eq!(stellar_aberration(&[0.0; 3], &[0.0, 30.0, 0.0]).unwrap(), [0.0; 3]);
    }

    #[test]
    fn aberration_tilts_toward_velocity() {
        let p = [1.0e6, 0.0, 0.0];
        let v = [0.0, 30.0, 0.0];
        let apparent = stellar_aberration(&p, &v).unwrap();
        let angle = vsep(&p, &apparent).unwrap();
        assert!((angle - (30.0 / SPEED_OF_LIGHT_KM_S).asin()).abs() < 1e-15);
        assert!(apparent[1] > 0.0);
        assert!((norm(&apparent) - 1.0e6).abs() < 1e-6);
    }

    #[test]
    fn superluminal_observer_is_degenerate() {
        let err =
            stellar_aberration(&[1.0, 0.0, 0.0], &[0.0, SPEED_OF_LIGHT_KM_S, 0.0]).unwrap_err();
        assert!(matches!(err, EngineError::DegenerateGeometry(_)));
    }

    #[test]
    fn settings_validation() {
        assert!(LightTimeSettings::default().validate().is_ok());
        let zero_iter = LightTimeSettings {
            max_iterations: 0,
            ..LightTimeSettings::default()
        };
        assert!(zero_iter.validate().is_err());
        let bad_tol = LightTimeSettings {
            tolerance: f64::NAN,
            ..LightTimeSettings::default()
        };
        assert!(bad_tol.validate().is_err());
    }
}
