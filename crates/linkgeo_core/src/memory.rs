//! In-memory provider: body segments chained to the solar system
//! barycenter and frame links chained to J2000.

use linkgeo_frames::matrix::{self, Mat3, ZERO, mxm, rotation_about_axis, skew, transpose};
use linkgeo_frames::obliquity::j2000_to_ecliptic_matrix;
use linkgeo_frames::vector::{add, norm, scale, sub, unit};
use linkgeo_frames::{Frame, Quaternion, RotationMatrix, StateRotation};
use linkgeo_time::Epoch;

use crate::body::Body;
use crate::chebyshev::ChebyshevRecord;
use crate::config::{KernelConfig, KernelKind, KernelLoader};
use crate::error::EngineError;
use crate::provider::EphemerisProvider;
use crate::resolver::StateVectorResolver;
use crate::state::{AberrationCorrection, RelativeState, SPEED_OF_LIGHT_KM_S, StateVector};
use crate::transformer::ROTATION_TOLERANCE;

/// Longest body or frame chain followed before giving up.
const MAX_CHAIN_DEPTH: usize = 32;

/// How a segment's state varies over its coverage.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyModel {
    /// Linear motion: `p(t) = p0 + v (t - t0)`.
    Uniform {
        reference: Epoch,
        position_km: [f64; 3],
        velocity_km_s: [f64; 3],
    },
    /// Consecutive Chebyshev position records, velocity by differentiation.
    Chebyshev(Vec<ChebyshevRecord>),
}

/// State of `target` relative to `center` in J2000 over `[start, end]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BodySegment {
    pub target: Body,
    pub center: Body,
    pub start: Epoch,
    pub end: Epoch,
    pub model: BodyModel,
}

impl BodySegment {
    /// A body at rest relative to `center` for all time.
    pub fn fixed(target: Body, center: Body, position_km: [f64; 3]) -> Self {
        Self::uniform(
            target,
            center,
            Epoch::from_tdb_seconds(0.0),
            position_km,
            [0.0; 3],
        )
    }

    /// Linear motion through `position_km` at `reference`, unbounded coverage.
    pub fn uniform(
        target: Body,
        center: Body,
        reference: Epoch,
        position_km: [f64; 3],
        velocity_km_s: [f64; 3],
    ) -> Self {
        Self {
            target,
            center,
            start: Epoch::from_tdb_seconds(f64::NEG_INFINITY),
            end: Epoch::from_tdb_seconds(f64::INFINITY),
            model: BodyModel::Uniform {
                reference,
                position_km,
                velocity_km_s,
            },
        }
    }

    /// Chebyshev records; coverage spans the first to the last record.
    pub fn chebyshev(
        target: Body,
        center: Body,
        mut records: Vec<ChebyshevRecord>,
    ) -> Result<Self, EngineError> {
        if records.is_empty() {
            return Err(EngineError::InvalidConfig(
                "chebyshev segment needs at least one record",
            ));
        }
        records.sort_by(|a, b| a.mid_s.total_cmp(&b.mid_s));
        let start = records[0].start_s();
        let end = records[records.len() - 1].end_s();
        Ok(Self {
            target,
            center,
            start: Epoch::from_tdb_seconds(start),
            end: Epoch::from_tdb_seconds(end),
            model: BodyModel::Chebyshev(records),
        })
    }

    /// With coverage limited to `[start, end]`.
    pub fn with_coverage(mut self, start: Epoch, end: Epoch) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn covers(&self, epoch: Epoch) -> bool {
        self.start <= epoch && epoch <= self.end
    }

    /// `[x, y, z, vx, vy, vz]` relative to `center`, or `None` outside
    /// coverage or in a gap between records.
    pub fn evaluate(&self, epoch: Epoch) -> Option<[f64; 6]> {
        if !self.covers(epoch) {
            return None;
        }
        let (p, v) = match &self.model {
            BodyModel::Uniform {
                reference,
                position_km,
                velocity_km_s,
            } => {
                let dt = epoch - *reference;
                (add(position_km, &scale(velocity_km_s, dt)), *velocity_km_s)
            }
            BodyModel::Chebyshev(records) => {
                let t = epoch.as_tdb_seconds();
                // Records are sorted; the first one ending at or after `t`
                // is the only candidate.
                let idx = records.partition_point(|r| r.end_s() < t);
                let record = records.get(idx).filter(|r| r.covers(t))?;
                record.evaluate(t)
            }
        };
        Some([p[0], p[1], p[2], v[0], v[1], v[2]])
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.target == self.center {
            return Err(EngineError::InvalidConfig(
                "segment target and center must differ",
            ));
        }
        if self.target == Body::SOLAR_SYSTEM_BARYCENTER {
            return Err(EngineError::InvalidConfig(
                "the solar system barycenter is the root of every chain",
            ));
        }
        if !(self.start <= self.end) {
            return Err(EngineError::InvalidConfig(
                "segment coverage must satisfy start <= end",
            ));
        }
        match &self.model {
            BodyModel::Uniform {
                reference,
                position_km,
                velocity_km_s,
            } => {
                if !reference.is_finite()
                    || !position_km.iter().chain(velocity_km_s).all(|v| v.is_finite())
                {
                    return Err(EngineError::InvalidConfig(
                        "uniform segment values must be finite",
                    ));
                }
            }
            BodyModel::Chebyshev(records) => {
                if records.is_empty() || !records.iter().all(ChebyshevRecord::is_well_formed) {
                    return Err(EngineError::InvalidConfig(
                        "chebyshev records must be non-empty with matching finite series",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// How a frame is oriented relative to its parent.
///
/// Every model yields the rotation taking components in the frame to
/// components in its parent.
#[derive(Debug, Clone, PartialEq)]
pub enum AttitudeModel {
    /// Constant offset, e.g. an instrument mounted on a body frame.
    Fixed(Mat3),
    /// Uniform rotation about `axis` (parent components):
    /// `R(t) = A(axis, rate * (t - reference)) · base`.
    Spin {
        base: Mat3,
        axis: [f64; 3],
        rate_rad_s: f64,
        reference: Epoch,
    },
    /// Attitude samples sorted by epoch, interpolated with SLERP.
    Sampled(Vec<(Epoch, Quaternion)>),
}

/// Orientation of `frame` relative to `parent`.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLink {
    pub frame: Frame,
    pub parent: Frame,
    pub model: AttitudeModel,
}

impl FrameLink {
    pub fn fixed(frame: Frame, parent: Frame, rotation: Mat3) -> Self {
        Self {
            frame,
            parent,
            model: AttitudeModel::Fixed(rotation),
        }
    }

    pub fn spin(
        frame: Frame,
        parent: Frame,
        base: Mat3,
        axis: [f64; 3],
        rate_rad_s: f64,
        reference: Epoch,
    ) -> Self {
        Self {
            frame,
            parent,
            model: AttitudeModel::Spin {
                base,
                axis,
                rate_rad_s,
                reference,
            },
        }
    }

    /// Sampled attitude; samples are sorted and normalised here.
    pub fn sampled(
        frame: Frame,
        parent: Frame,
        mut samples: Vec<(Epoch, Quaternion)>,
    ) -> Result<Self, EngineError> {
        samples.sort_by(|a, b| a.0.as_tdb_seconds().total_cmp(&b.0.as_tdb_seconds()));
        let samples = samples
            .into_iter()
            .map(|(t, q)| {
                q.normalized()
                    .map(|q| (t, q))
                    .ok_or(EngineError::InvalidConfig(
                        "attitude quaternions must be non-zero",
                    ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            frame,
            parent,
            model: AttitudeModel::Sampled(samples),
        })
    }

    /// Coverage window; `None` when the link is valid at all epochs.
    pub fn coverage(&self) -> Option<(Epoch, Epoch)> {
        match &self.model {
            AttitudeModel::Sampled(samples) => {
                let first = samples.first()?.0;
                let last = samples.last()?.0;
                Some((first, last))
            }
            _ => None,
        }
    }

    pub fn covers(&self, epoch: Epoch) -> bool {
        match self.coverage() {
            Some((start, end)) => start <= epoch && epoch <= end,
            None => !matches!(&self.model, AttitudeModel::Sampled(_)),
        }
    }

    /// Rotation `frame → parent` and its rate at `epoch`.
    pub fn state_rotation(&self, epoch: Epoch) -> Option<StateRotation> {
        if !self.covers(epoch) {
            return None;
        }
        let (rotation, rate) = match &self.model {
            AttitudeModel::Fixed(m) => (*m, ZERO),
            AttitudeModel::Spin {
                base,
                axis,
                rate_rad_s,
                reference,
            } => {
                let angle = rate_rad_s * (epoch - *reference);
                let spin = rotation_about_axis(axis, angle)?;
                let rotation = mxm(&spin, base);
                let omega = scale(&unit(axis)?, *rate_rad_s);
                (rotation, mxm(&skew(&omega), &rotation))
            }
            AttitudeModel::Sampled(samples) => sampled_rotation(samples, epoch)?,
        };
        Some(StateRotation::new(
            self.frame,
            self.parent,
            epoch,
            rotation,
            rate,
        ))
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.frame == self.parent {
            return Err(EngineError::InvalidConfig("frame link parent must differ"));
        }
        if self.frame == Frame::J2000 || self.frame == Frame::ECLIPJ2000 {
            return Err(EngineError::InvalidConfig(
                "built-in inertial frames cannot be redefined",
            ));
        }
        match &self.model {
            AttitudeModel::Fixed(m) => {
                if !matrix::is_rotation(m, ROTATION_TOLERANCE) {
                    return Err(EngineError::InvalidConfig(
                        "fixed frame offset must be a rotation",
                    ));
                }
            }
            AttitudeModel::Spin {
                base,
                axis,
                rate_rad_s,
                reference,
            } => {
                if !matrix::is_rotation(base, ROTATION_TOLERANCE) {
                    return Err(EngineError::InvalidConfig(
                        "spin base orientation must be a rotation",
                    ));
                }
                if unit(axis).is_none() || !rate_rad_s.is_finite() || !reference.is_finite() {
                    return Err(EngineError::InvalidConfig(
                        "spin needs a non-zero axis and finite rate and reference",
                    ));
                }
            }
            AttitudeModel::Sampled(samples) => {
                if samples.is_empty() {
                    return Err(EngineError::InvalidConfig(
                        "sampled attitude needs at least one sample",
                    ));
                }
                if !samples.iter().all(|(t, _)| t.is_finite())
                    || samples.windows(2).any(|w| w[0].0 >= w[1].0)
                {
                    return Err(EngineError::InvalidConfig(
                        "attitude sample epochs must be finite and strictly increasing",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// SLERP between the bracketing samples; the rate is the constant angular
/// velocity carrying one sample into the next.
fn sampled_rotation(samples: &[(Epoch, Quaternion)], epoch: Epoch) -> Option<(Mat3, Mat3)> {
    if let [(_, only)] = samples {
        return Some((only.to_matrix(), ZERO));
    }
    let upper = samples
        .partition_point(|(t, _)| *t <= epoch)
        .clamp(1, samples.len() - 1);
    let (t0, q0) = samples[upper - 1];
    let (t1, q1) = samples[upper];
    let span = t1 - t0;
    let frac = ((epoch - t0) / span).clamp(0.0, 1.0);
    let rotation = q0.slerp(&q1, frac).to_matrix();

    let step = mxm(&q1.to_matrix(), &transpose(&q0.to_matrix()));
    let dq = Quaternion::from_matrix(&step);
    let v = [dq.x, dq.y, dq.z];
    let sin_half = norm(&v);
    let rate = if sin_half == 0.0 {
        ZERO
    } else {
        let angle = 2.0 * sin_half.atan2(dq.w);
        let omega = scale(&v, angle / (sin_half * span));
        mxm(&skew(&omega), &rotation)
    };
    Some((rotation, rate))
}

fn ecliptic_to_j2000(epoch: Epoch) -> StateRotation {
    StateRotation::new(
        Frame::ECLIPJ2000,
        Frame::J2000,
        epoch,
        transpose(&j2000_to_ecliptic_matrix()),
        ZERO,
    )
}

/// Owned reference data held in memory.
///
/// Lifecycle: construct, load segments and frame links, query, then
/// [`clear`](Self::clear) or drop. Later loads take priority over earlier
/// ones where coverage overlaps.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    segments: Vec<BodySegment>,
    links: Vec<FrameLink>,
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config` and let `loader` populate a fresh provider with
    /// every ephemeris, frame, and attitude file it names.
    pub fn from_config(
        config: &KernelConfig,
        loader: &impl KernelLoader,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let mut provider = Self::new();
        for (kind, path) in config.load_order() {
            if matches!(kind, KernelKind::LeapSeconds | KernelKind::SpacecraftClock) {
                continue;
            }
            log::debug!("loading {kind:?} data from {}", path.display());
            loader.load(kind, path, &mut provider)?;
        }
        Ok(provider)
    }

    pub fn load_segment(&mut self, segment: BodySegment) -> Result<(), EngineError> {
        segment.validate()?;
        log::trace!(
            "segment {} -> {} over [{}, {}]",
            segment.target,
            segment.center,
            segment.start.as_tdb_seconds(),
            segment.end.as_tdb_seconds()
        );
        self.segments.push(segment);
        Ok(())
    }

    pub fn load_frame_link(&mut self, link: FrameLink) -> Result<(), EngineError> {
        link.validate()?;
        log::trace!("frame link {} -> {}", link.frame, link.parent);
        self.links.push(link);
        Ok(())
    }

    /// Release all loaded data.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.links.clear();
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn frame_link_count(&self) -> usize {
        self.links.len()
    }

    /// Latest-loaded segment for `body` that evaluates at `epoch`.
    fn evaluate_body(&self, body: Body, epoch: Epoch) -> Option<(Body, [f64; 6])> {
        self.segments
            .iter()
            .rev()
            .filter(|s| s.target == body)
            .find_map(|s| s.evaluate(epoch).map(|state| (s.center, state)))
    }

    /// Geometric J2000 state of `body` relative to the solar system
    /// barycenter, walking the segment chain.
    pub fn barycentric_state(&self, body: Body, epoch: Epoch) -> Result<[f64; 6], EngineError> {
        let mut code = body;
        let mut state = [0.0f64; 6];
        let mut depth = 0;

        while code != Body::SOLAR_SYSTEM_BARYCENTER {
            depth += 1;
            if depth > MAX_CHAIN_DEPTH {
                return Err(EngineError::Internal(format!(
                    "segment chain from {body} does not reach the solar system barycenter"
                )));
            }
            match self.evaluate_body(code, epoch) {
                Some((center, eval)) => {
                    for (acc, v) in state.iter_mut().zip(eval) {
                        *acc += v;
                    }
                    code = center;
                }
                None => {
                    let known_center = self.segments.iter().rev().find(|s| s.target == code);
                    if known_center.is_none() {
                        if let Some(bary) = code.system_barycenter() {
                            code = bary;
                            continue;
                        }
                    }
                    return Err(EngineError::EphemerisDataUnavailable {
                        target: code,
                        observer: known_center
                            .map_or(Body::SOLAR_SYSTEM_BARYCENTER, |s| s.center),
                        epoch_tdb_s: epoch.as_tdb_seconds(),
                    });
                }
            }
        }
        Ok(state)
    }

    /// Latest-loaded link for `frame` valid at `epoch`.
    fn link_rotation(&self, frame: Frame, epoch: Epoch) -> Option<StateRotation> {
        self.links
            .iter()
            .rev()
            .filter(|l| l.frame == frame)
            .find_map(|l| l.state_rotation(epoch))
    }

    /// `frame → J2000` rotation and rate, walking the link chain.
    fn to_j2000(&self, frame: Frame, epoch: Epoch) -> Option<Result<StateRotation, EngineError>> {
        let mut acc = StateRotation::identity(frame, epoch);
        let mut current = frame;
        for _ in 0..MAX_CHAIN_DEPTH {
            let step = if current == Frame::J2000 {
                return Some(Ok(acc));
            } else if current == Frame::ECLIPJ2000 {
                ecliptic_to_j2000(epoch)
            } else {
                self.link_rotation(current, epoch)?
            };
            current = step.to;
            acc = match acc.then(&step) {
                Ok(next) => next,
                Err(e) => return Some(Err(e.into())),
            };
        }
        Some(Err(EngineError::Internal(format!(
            "frame chain from {frame} does not reach J2000"
        ))))
    }
}

impl EphemerisProvider for MemoryProvider {
    fn state_vector(
        &self,
        observer: Body,
        target: Body,
        epoch: Epoch,
        frame: Frame,
        correction: AberrationCorrection,
    ) -> Result<RelativeState, EngineError> {
        if correction != AberrationCorrection::None || frame != Frame::J2000 {
            return StateVectorResolver::new(self).relative_state(
                observer, target, epoch, frame, correction,
            );
        }
        if !epoch.is_finite() {
            return Err(EngineError::InvalidQuery("epoch must be finite"));
        }
        if observer == target {
            return Err(EngineError::InvalidQuery(
                "target and observer body cannot be identical",
            ));
        }
        let t = self.barycentric_state(target, epoch)?;
        let o = self.barycentric_state(observer, epoch)?;
        let position_km = sub(&[t[0], t[1], t[2]], &[o[0], o[1], o[2]]);
        let velocity_km_s = sub(&[t[3], t[4], t[5]], &[o[3], o[4], o[5]]);
        Ok(RelativeState {
            state: StateVector {
                position_km,
                velocity_km_s,
                frame,
                epoch,
                observer,
                target,
                correction,
            },
            light_time_s: norm(&position_km) / SPEED_OF_LIGHT_KM_S,
            iterations: 0,
        })
    }

    fn frame_transform(
        &self,
        from: Frame,
        to: Frame,
        epoch: Epoch,
    ) -> Result<RotationMatrix, EngineError> {
        Ok(self.state_transform(from, to, epoch)?.rotation_matrix())
    }

    fn state_transform(
        &self,
        from: Frame,
        to: Frame,
        epoch: Epoch,
    ) -> Result<StateRotation, EngineError> {
        if from == to {
            return Ok(StateRotation::identity(from, epoch));
        }
        let unavailable = || EngineError::FrameDataUnavailable {
            from,
            to,
            epoch_tdb_s: epoch.as_tdb_seconds(),
        };
        let source = self.to_j2000(from, epoch).ok_or_else(unavailable)??;
        let dest = self.to_j2000(to, epoch).ok_or_else(unavailable)??;
        Ok(source.then(&dest.inverse())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkgeo_frames::matrix::{IDENTITY, mxv};

    const LANDER: Body = Body::new(-76);
    const SITE: Body = Body::new(-76900);
    const BODY_FIXED: Frame = Frame::new(-76000);
    const MAST: Frame = Frame::new(-76200);

    fn epoch(s: f64) -> Epoch {
        Epoch::from_tdb_seconds(s)
    }

    fn planets() -> MemoryProvider {
        let mut p = MemoryProvider::new();
        p.load_segment(BodySegment::fixed(
            Body::EARTH_MOON_BARYCENTER,
            Body::SOLAR_SYSTEM_BARYCENTER,
            [1.0e8, 0.0, 0.0],
        ))
        .unwrap();
        p.load_segment(BodySegment::fixed(
            Body::EARTH,
            Body::EARTH_MOON_BARYCENTER,
            [-4.6e3, 0.0, 0.0],
        ))
        .unwrap();
        p.load_segment(BodySegment::uniform(
            Body::MARS_BARYCENTER,
            Body::SOLAR_SYSTEM_BARYCENTER,
            epoch(0.0),
            [2.0e8, 1.0e7, 0.0],
            [0.0, 24.0, 0.0],
        ))
        .unwrap();
        p
    }

    #[test]
    fn chain_sums_to_barycenter() {
        let p = planets();
        let earth = p.barycentric_state(Body::EARTH, epoch(10.0)).unwrap();
        assert_eq!(&earth[..3], &[1.0e8 - 4.6e3, 0.0, 0.0]);
    }

    #[test]
    fn planet_falls_back_to_system_barycenter() {
        let p = planets();
        let mars = p.barycentric_state(Body::MARS, epoch(100.0)).unwrap();
        assert_eq!(mars[1], 1.0e7 + 2400.0);
        assert_eq!(mars[4], 24.0);
    }

    #[test]
    fn earth_never_stands_in_for_its_barycenter() {
        let mut p = MemoryProvider::new();
        p.load_segment(BodySegment::fixed(
            Body::EARTH_MOON_BARYCENTER,
            Body::SOLAR_SYSTEM_BARYCENTER,
            [1.0e8, 0.0, 0.0],
        ))
        .unwrap();
        p.load_segment(BodySegment::fixed(
            LANDER,
            Body::SOLAR_SYSTEM_BARYCENTER,
            [0.0; 3],
        ))
        .unwrap();

        let err = p.barycentric_state(Body::EARTH, epoch(0.0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::EphemerisDataUnavailable { target, .. } if target == Body::EARTH
        ));
        let err = p
            .state_vector(
                LANDER,
                Body::EARTH,
                epoch(0.0),
                Frame::J2000,
                AberrationCorrection::LightTimeStellar,
            )
            .unwrap_err();
        assert!(matches!(err, EngineError::EphemerisDataUnavailable { .. }));
    }

    #[test]
    fn missing_body_is_unavailable() {
        let p = planets();
        let err = p.barycentric_state(LANDER, epoch(0.0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::EphemerisDataUnavailable { target, .. } if target == LANDER
        ));
    }

    #[test]
    fn coverage_gap_is_unavailable() {
        let mut p = planets();
        p.load_segment(
            BodySegment::fixed(LANDER, Body::MARS, [3390.0, 0.0, 0.0])
                .with_coverage(epoch(0.0), epoch(100.0)),
        )
        .unwrap();
        assert!(p.barycentric_state(LANDER, epoch(50.0)).is_ok());
        let err = p.barycentric_state(LANDER, epoch(150.0)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::EphemerisDataUnavailable { target, observer, .. }
                if target == LANDER && observer == Body::MARS
        ));
    }

    #[test]
    fn later_segments_take_priority() {
        let mut p = planets();
        p.load_segment(BodySegment::fixed(SITE, Body::MARS, [1.0, 0.0, 0.0]))
            .unwrap();
        p.load_segment(
            BodySegment::fixed(SITE, Body::MARS, [2.0, 0.0, 0.0])
                .with_coverage(epoch(0.0), epoch(10.0)),
        )
        .unwrap();
        let base = p.barycentric_state(Body::MARS, epoch(5.0)).unwrap()[0];
        assert_eq!(p.barycentric_state(SITE, epoch(5.0)).unwrap()[0] - base, 2.0);
        let base = p.barycentric_state(Body::MARS, epoch(50.0)).unwrap()[0];
        assert_eq!(p.barycentric_state(SITE, epoch(50.0)).unwrap()[0] - base, 1.0);
    }

    #[test]
    fn chebyshev_segment_gaps() {
        let rec = |mid: f64| ChebyshevRecord {
            mid_s: mid,
            radius_s: 10.0,
            x: vec![mid, 10.0],
            y: vec![0.0],
            z: vec![0.0],
        };
        let seg =
            BodySegment::chebyshev(LANDER, Body::MARS, vec![rec(50.0), rec(10.0)]).unwrap();
        assert_eq!(seg.start, epoch(0.0));
        assert_eq!(seg.end, epoch(60.0));
        let s = seg.evaluate(epoch(15.0)).unwrap();
        assert!((s[0] - 15.0).abs() < 1e-12);
        assert!((s[3] - 1.0).abs() < 1e-15);
        assert!(seg.evaluate(epoch(30.0)).is_none());
        assert!(seg.evaluate(epoch(61.0)).is_none());
    }

    #[test]
    fn rejects_invalid_segments() {
        let mut p = MemoryProvider::new();
        assert!(
            p.load_segment(BodySegment::fixed(Body::MARS, Body::MARS, [0.0; 3]))
                .is_err()
        );
        assert!(
            p.load_segment(BodySegment::fixed(
                Body::MARS,
                Body::SUN,
                [f64::NAN, 0.0, 0.0]
            ))
            .is_err()
        );
        assert!(
            p.load_segment(
                BodySegment::fixed(Body::MARS, Body::SUN, [0.0; 3])
                    .with_coverage(epoch(5.0), epoch(1.0))
            )
            .is_err()
        );
        assert_eq!(p.segment_count(), 0);
    }

    #[test]
    fn chain_cycle_is_reported() {
        let mut p = MemoryProvider::new();
        p.load_segment(BodySegment::fixed(
            Body::new(-1),
            Body::new(-2),
            [1.0, 0.0, 0.0],
        ))
        .unwrap();
        p.load_segment(BodySegment::fixed(
            Body::new(-2),
            Body::new(-1),
            [1.0, 0.0, 0.0],
        ))
        .unwrap();
        assert!(matches!(
            p.barycentric_state(Body::new(-1), epoch(0.0)),
            Err(EngineError::Internal(_))
        ));
    }

    #[test]
    fn fixed_and_ecliptic_links_compose() {
        let mut p = MemoryProvider::new();
        let quarter_turn =
            rotation_about_axis(&[0.0, 0.0, 1.0], std::f64::consts::FRAC_PI_2).unwrap();
        p.load_frame_link(FrameLink::fixed(
            BODY_FIXED,
            Frame::ECLIPJ2000,
            quarter_turn,
        ))
        .unwrap();
        let r = p
            .frame_transform(BODY_FIXED, Frame::J2000, epoch(0.0))
            .unwrap();
        let expected = mxm(&transpose(&j2000_to_ecliptic_matrix()), &quarter_turn);
        for i in 0..3 {
            for j in 0..3 {
                assert!((r.matrix[i][j] - expected[i][j]).abs() < 1e-15);
            }
        }
        let back = p
            .frame_transform(Frame::J2000, BODY_FIXED, epoch(0.0))
            .unwrap();
        let v = mxv(&back.matrix, &mxv(&r.matrix, &[0.3, -0.4, 0.5]));
        assert!((v[0] - 0.3).abs() < 1e-15 && (v[1] + 0.4).abs() < 1e-15);
    }

    #[test]
    fn spin_rate_is_analytic() {
        let mut p = MemoryProvider::new();
        let omega = 7.088e-5;
        p.load_frame_link(FrameLink::spin(
            BODY_FIXED,
            Frame::J2000,
            IDENTITY,
            [0.0, 0.0, 1.0],
            omega,
            epoch(0.0),
        ))
        .unwrap();
        let sr = p
            .state_transform(BODY_FIXED, Frame::J2000, epoch(1000.0))
            .unwrap();
        // A point on the x axis of the spinning frame moves at omega km/s per km.
        let (_, v) = sr.apply(&[1.0, 0.0, 0.0], &[0.0; 3]);
        assert!((norm(&v) - omega).abs() < 1e-15);
    }

    #[test]
    fn sampled_attitude_interpolates_and_bounds() {
        let mut p = MemoryProvider::new();
        let q0 = Quaternion::IDENTITY;
        let q1 = Quaternion::from_axis_angle(&[0.0, 0.0, 1.0], 0.2).unwrap();
        let link = FrameLink::sampled(
            MAST,
            Frame::J2000,
            vec![(epoch(10.0), q1), (epoch(0.0), q0)],
        )
        .unwrap();
        p.load_frame_link(link).unwrap();

        let sr = p.state_transform(MAST, Frame::J2000, epoch(5.0)).unwrap();
        let x = mxv(&sr.rotation, &[1.0, 0.0, 0.0]);
        assert!((x[1].atan2(x[0]) - 0.1).abs() < 1e-12);
        let (_, v) = sr.apply(&[1.0, 0.0, 0.0], &[0.0; 3]);
        assert!((norm(&v) - 0.02).abs() < 1e-12);

        let err = p
            .frame_transform(MAST, Frame::J2000, epoch(10.5))
            .unwrap_err();
        assert!(matches!(err, EngineError::FrameDataUnavailable { .. }));
    }

    #[test]
    fn rejects_invalid_links() {
        let mut p = MemoryProvider::new();
        let skewed = [[1.0, 0.1, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert!(
            p.load_frame_link(FrameLink::fixed(MAST, Frame::J2000, skewed))
                .is_err()
        );
        assert!(
            p.load_frame_link(FrameLink::fixed(MAST, MAST, IDENTITY))
                .is_err()
        );
        assert!(
            p.load_frame_link(FrameLink::fixed(Frame::J2000, MAST, IDENTITY))
                .is_err()
        );
        let zero = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert!(FrameLink::sampled(MAST, Frame::J2000, vec![(epoch(0.0), zero)]).is_err());
        let dup = FrameLink::sampled(
            MAST,
            Frame::J2000,
            vec![(epoch(0.0), Quaternion::IDENTITY); 2],
        )
        .unwrap();
        assert!(p.load_frame_link(dup).is_err());
        assert_eq!(p.frame_link_count(), 0);
    }

    #[test]
    fn unknown_frame_is_unavailable() {
        let p = MemoryProvider::new();
        assert!(matches!(
            p.frame_transform(MAST, Frame::J2000, epoch(0.0)),
            Err(EngineError::FrameDataUnavailable { .. })
        ));
        assert!(p.frame_transform(MAST, MAST, epoch(0.0)).is_ok());
    }

    #[test]
    fn geometric_state_and_clear() {
        let mut p = planets();
        let rs = p
            .state_vector(
                Body::EARTH,
                Body::MARS,
                epoch(0.0),
                Frame::J2000,
                AberrationCorrection::None,
            )
            .unwrap();
        assert_eq!(rs.iterations, 0);
        assert_eq!(rs.state.position_km, [2.0e8 - (1.0e8 - 4.6e3), 1.0e7, 0.0]);
        assert!((rs.light_time_s - rs.state.range_km() / SPEED_OF_LIGHT_KM_S).abs() < 1e-12);

        p.clear();
        assert_eq!(p.segment_count(), 0);
        assert!(
            p.state_vector(
                Body::EARTH,
                Body::MARS,
                epoch(0.0),
                Frame::J2000,
                AberrationCorrection::None,
            )
            .is_err()
        );
    }
}
