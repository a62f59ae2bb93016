//! Core engine errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

use linkgeo_frames::{Frame, FrameMismatch, SeparationError};
use linkgeo_time::TimeError;

use crate::body::Body;

/// Pipeline stage in which a query failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configuration,
    Request,
    TimeConversion,
    StateResolution,
    FrameTransform,
    Geometry,
    Internal,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Request => "request validation",
            Self::TimeConversion => "time conversion",
            Self::StateResolution => "state resolution",
            Self::FrameTransform => "frame transformation",
            Self::Geometry => "geometry",
            Self::Internal => "internal",
        };
        f.write_str(name)
    }
}

/// Core engine errors.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EngineError {
    MalformedTime(String),
    ReferenceDataMissing(String),
    /// Epoch before the first spacecraft clock correlation record.
    ClockOutOfRange {
        spacecraft: Body,
        epoch_tdb_s: f64,
    },
    EphemerisDataUnavailable {
        target: Body,
        observer: Body,
        epoch_tdb_s: f64,
    },
    FrameDataUnavailable {
        from: Frame,
        to: Frame,
        epoch_tdb_s: f64,
    },
    NonConvergence {
        iterations: u32,
        residual_s: f64,
    },
    DegenerateGeometry(&'static str),
    FrameMismatch {
        expected: Frame,
        found: Frame,
    },
    InvalidConfig(&'static str),
    InvalidQuery(&'static str),
    Internal(String),
}

impl EngineError {
    /// The stage of the link computation this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::MalformedTime(_)
            | Self::ReferenceDataMissing(_)
            | Self::ClockOutOfRange { .. } => Stage::TimeConversion,
            Self::EphemerisDataUnavailable { .. } | Self::NonConvergence { .. } => {
                Stage::StateResolution
            }
            Self::FrameDataUnavailable { .. } => Stage::FrameTransform,
            Self::DegenerateGeometry(_) | Self::FrameMismatch { .. } => Stage::Geometry,
            Self::InvalidConfig(_) => Stage::Configuration,
            Self::InvalidQuery(_) => Stage::Request,
            Self::Internal(_) => Stage::Internal,
        }
    }
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTime(msg) => write!(f, "{msg}"),
            Self::ReferenceDataMissing(msg) => write!(f, "reference data missing: {msg}"),
            Self::ClockOutOfRange {
                spacecraft,
                epoch_tdb_s,
            } => write!(f, "no {spacecraft} clock correlation covers ET {epoch_tdb_s}"),
            Self::EphemerisDataUnavailable {
                target,
                observer,
                epoch_tdb_s,
            } => write!(
                f,
                "no ephemeris data for {target} relative to {observer} at ET {epoch_tdb_s}"
            ),
            Self::FrameDataUnavailable {
                from,
                to,
                epoch_tdb_s,
            } => write!(f, "no frame data for {from} -> {to} at ET {epoch_tdb_s}"),
            Self::NonConvergence {
                iterations,
                residual_s,
            } => write!(
                f,
                "light time did not converge after {iterations} iterations (residual {residual_s:e} s)"
            ),
            Self::DegenerateGeometry(msg) => write!(f, "degenerate geometry: {msg}"),
            Self::FrameMismatch { expected, found } => {
                write!(f, "frame mismatch: expected {expected}, found {found}")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::InvalidQuery(msg) => write!(f, "invalid query: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl Error for EngineError {}

impl From<TimeError> for EngineError {
    fn from(e: TimeError) -> Self {
        match e {
            e @ TimeError::MalformedTime(_) => Self::MalformedTime(e.to_string()),
            other => Self::ReferenceDataMissing(other.to_string()),
        }
    }
}

impl From<FrameMismatch> for EngineError {
    fn from(e: FrameMismatch) -> Self {
        Self::FrameMismatch {
            expected: e.expected,
            found: e.found,
        }
    }
}

impl From<SeparationError> for EngineError {
    fn from(e: SeparationError) -> Self {
        match e {
            SeparationError::FrameMismatch { left, right } => Self::FrameMismatch {
                expected: left,
                found: right,
            },
            SeparationError::ZeroLength => {
                Self::DegenerateGeometry("angle undefined for a zero-length vector")
            }
        }
    }
}
