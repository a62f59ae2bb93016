//! Boresight-to-target angular separation and the full link report.

use std::fmt::{Display, Formatter};

use linkgeo_frames::{Frame, FrameVector, angular_separation};
use linkgeo_time::{Epoch, Instant, TimeConverter};

use crate::body::Body;
use crate::clock::{SclkReading, SpacecraftClock};
use crate::error::EngineError;
use crate::provider::EphemerisProvider;
use crate::resolver::{LightTimeSettings, StateVectorResolver};
use crate::state::{AberrationCorrection, RelativeState};
use crate::transformer::FrameTransformer;

/// Correction used for every link computation.
pub const LINK_CORRECTION: AberrationCorrection = AberrationCorrection::LightTimeStellar;

/// Engine-wide tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometrySettings {
    pub light_time: LightTimeSettings,
    /// Separations below this many degrees count as aligned.
    pub alignment_threshold_deg: f64,
}

impl Default for GeometrySettings {
    fn default() -> Self {
        Self {
            light_time: LightTimeSettings::default(),
            alignment_threshold_deg: 1.0,
        }
    }
}

impl GeometrySettings {
    pub fn validate(&self) -> Result<(), EngineError> {
        self.light_time.validate()?;
        if !(self.alignment_threshold_deg > 0.0 && self.alignment_threshold_deg <= 180.0) {
            return Err(EngineError::InvalidConfig(
                "alignment_threshold_deg must be in (0, 180]",
            ));
        }
        Ok(())
    }
}

/// Angle between two directions, in `[0, 180]` degrees.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct AngularSeparation {
    degrees: f64,
}

impl AngularSeparation {
    pub fn from_radians(radians: f64) -> Self {
        Self {
            degrees: radians.to_degrees().clamp(0.0, 180.0),
        }
    }

    pub fn degrees(self) -> f64 {
        self.degrees
    }

    pub fn radians(self) -> f64 {
        self.degrees.to_radians()
    }
}

impl Display for AngularSeparation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6} deg", self.degrees)
    }
}

/// A boresight on `observer` and the body it should point at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkRequest {
    pub observer: Body,
    pub target: Body,
    /// Boresight direction in `boresight_frame`; length is irrelevant.
    pub boresight: [f64; 3],
    pub boresight_frame: Frame,
    /// Frame the separation is measured in.
    pub inertial_frame: Frame,
}

impl LinkRequest {
    fn validate(&self) -> Result<(), EngineError> {
        if self.observer == self.target {
            return Err(EngineError::InvalidQuery(
                "target and observer body cannot be identical",
            ));
        }
        if !self.inertial_frame.is_inertial() {
            return Err(EngineError::InvalidQuery(
                "separation must be measured in an inertial frame",
            ));
        }
        if !self.boresight.iter().all(|v| v.is_finite()) {
            return Err(EngineError::InvalidQuery("boresight must be finite"));
        }
        Ok(())
    }
}

/// Everything computed for one link at one instant.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct LinkGeometry {
    pub instant: Instant,
    /// Apparent target as seen from the observer.
    pub target_from_observer: RelativeState,
    /// Apparent observer as seen from the target.
    pub observer_from_target: RelativeState,
    /// Boresight expressed in the inertial frame.
    pub boresight: FrameVector,
    pub separation: AngularSeparation,
    pub boresight_aligned: bool,
    /// Observer clock reading, when the engine carries that spacecraft's clock.
    pub sclk: Option<SclkReading>,
}

impl LinkGeometry {
    /// Apparent target direction in the inertial frame.
    pub fn apparent_target(&self) -> FrameVector {
        self.target_from_observer.state.position()
    }

    pub fn sol(&self) -> Option<u64> {
        self.sclk.as_ref().map(SclkReading::sol)
    }
}

/// Orchestrates time conversion, state resolution, boresight rotation,
/// and the angle between them. Every query either fully succeeds or
/// returns the first error.
pub struct GeometryEngine<'a, P: EphemerisProvider + ?Sized> {
    time: &'a TimeConverter,
    provider: &'a P,
    settings: GeometrySettings,
    clock: Option<&'a SpacecraftClock>,
}

impl<'a, P: EphemerisProvider + ?Sized> GeometryEngine<'a, P> {
    pub fn new(time: &'a TimeConverter, provider: &'a P) -> Self {
        Self {
            time,
            provider,
            settings: GeometrySettings::default(),
            clock: None,
        }
    }

    pub fn with_settings(
        time: &'a TimeConverter,
        provider: &'a P,
        settings: GeometrySettings,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(Self {
            time,
            provider,
            settings,
            clock: None,
        })
    }

    /// Stamp link reports for `clock`'s spacecraft with its clock reading.
    pub fn with_clock(mut self, clock: &'a SpacecraftClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn settings(&self) -> &GeometrySettings {
        &self.settings
    }

    fn resolver(&self) -> Result<StateVectorResolver<'a, P>, EngineError> {
        StateVectorResolver::with_settings(self.provider, self.settings.light_time)
    }

    /// Angle between the boresight and the apparent direction to `target`
    /// at the UTC instant `utc`.
    pub fn angular_separation_to_target(
        &self,
        utc: &str,
        boresight: [f64; 3],
        boresight_frame: Frame,
        inertial_frame: Frame,
        observer: Body,
        target: Body,
    ) -> Result<AngularSeparation, EngineError> {
        let request = LinkRequest {
            observer,
            target,
            boresight,
            boresight_frame,
            inertial_frame,
        };
        self.separation_at_utc(utc, &request)
    }

    pub fn separation_at_utc(
        &self,
        utc: &str,
        request: &LinkRequest,
    ) -> Result<AngularSeparation, EngineError> {
        request.validate()?;
        let instant = self.time.to_ephemeris_time(utc)?;
        self.separation_at(instant.epoch, request)
    }

    /// Separation at an ephemeris epoch.
    pub fn separation_at(
        &self,
        epoch: Epoch,
        request: &LinkRequest,
    ) -> Result<AngularSeparation, EngineError> {
        request.validate()?;
        let apparent = self.resolver()?.relative_state(
            request.observer,
            request.target,
            epoch,
            request.inertial_frame,
            LINK_CORRECTION,
        )?;
        let boresight = self.inertial_boresight(request, epoch)?;
        separation(&boresight, &apparent)
    }

    /// Full link report at the UTC instant `utc`.
    pub fn link_geometry(
        &self,
        utc: &str,
        request: &LinkRequest,
    ) -> Result<LinkGeometry, EngineError> {
        request.validate()?;
        let instant = self.time.to_ephemeris_time(utc)?;
        let epoch = instant.epoch;
        let resolver = self.resolver()?;

        let target_from_observer = resolver.relative_state(
            request.observer,
            request.target,
            epoch,
            request.inertial_frame,
            LINK_CORRECTION,
        )?;
        let observer_from_target = resolver.relative_state(
            request.target,
            request.observer,
            epoch,
            request.inertial_frame,
            LINK_CORRECTION,
        )?;
        let boresight = self.inertial_boresight(request, epoch)?;
        let separation = separation(&boresight, &target_from_observer)?;
        let boresight_aligned = separation.degrees() < self.settings.alignment_threshold_deg;
        let sclk = match self.clock {
            Some(clock) if clock.spacecraft() == request.observer => Some(clock.reading(epoch)?),
            _ => None,
        };

        log::debug!(
            "{} -> {} at {}: separation {separation}, one-way light time {:.6} s",
            request.observer,
            request.target,
            instant.text,
            target_from_observer.light_time_s
        );

        Ok(LinkGeometry {
            instant,
            target_from_observer,
            observer_from_target,
            boresight,
            separation,
            boresight_aligned,
            sclk,
        })
    }

    /// Separations for many instants; each entry succeeds or fails on its own.
    pub fn separation_series(
        &self,
        utcs: &[&str],
        request: &LinkRequest,
    ) -> Vec<Result<AngularSeparation, EngineError>> {
        utcs.iter()
            .map(|utc| self.separation_at_utc(utc, request))
            .collect()
    }

    fn inertial_boresight(
        &self,
        request: &LinkRequest,
        epoch: Epoch,
    ) -> Result<FrameVector, EngineError> {
        let body_fixed = FrameVector::new(request.boresight_frame, request.boresight);
        FrameTransformer::new(self.provider).transform_vector(
            &body_fixed,
            request.inertial_frame,
            epoch,
        )
    }
}

fn separation(
    boresight: &FrameVector,
    apparent: &RelativeState,
) -> Result<AngularSeparation, EngineError> {
    let radians = angular_separation(boresight, &apparent.state.position())?;
    Ok(AngularSeparation::from_radians(radians))
}
