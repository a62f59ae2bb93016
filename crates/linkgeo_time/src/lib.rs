//! Time-scale conversions (UTC/TAI/TT/TDB) and leap-second support.
//!
//! This crate provides:
//! - Strict parsing of calendar/UTC strings into [`UtcTime`]
//! - A [`LeapSecondTable`] holding already-loaded leap-second data
//! - The UTC → TAI → TT → TDB chain and its inverse
//! - [`Epoch`] for type-safe TDB epochs and [`Instant`] pairing an input
//!   string with its epoch
//! - [`TimeConverter`], the single place that derives an epoch from a string

pub mod error;
pub mod julian;
pub mod leap;
pub mod scales;
pub mod utc_time;

use std::ops::{Add, Sub};

pub use error::TimeError;
pub use julian::{J2000_JD, SECONDS_PER_DAY, jd_to_tdb_seconds, tdb_seconds_to_jd};
pub use leap::{LeapEntry, LeapSecondTable};
pub use utc_time::{UtcTime, normalize_whitespace};

/// A TDB epoch represented as seconds past J2000.0.
///
/// This is the primary time type used throughout the engine.
/// It wraps an `f64` providing type safety and convenient conversions.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Epoch {
    tdb_seconds: f64,
}

impl Epoch {
    /// Create an epoch from TDB seconds past J2000.0.
    pub fn from_tdb_seconds(s: f64) -> Self {
        Self { tdb_seconds: s }
    }

    /// Create an epoch from a Julian Date in TDB.
    pub fn from_jd_tdb(jd: f64) -> Self {
        Self {
            tdb_seconds: jd_to_tdb_seconds(jd),
        }
    }

    /// TDB seconds past J2000.0.
    pub fn as_tdb_seconds(self) -> f64 {
        self.tdb_seconds
    }

    /// Julian Date in TDB.
    pub fn as_jd_tdb(self) -> f64 {
        tdb_seconds_to_jd(self.tdb_seconds)
    }

    pub fn is_finite(self) -> bool {
        self.tdb_seconds.is_finite()
    }
}

impl Add<f64> for Epoch {
    type Output = Epoch;

    fn add(self, seconds: f64) -> Epoch {
        Epoch::from_tdb_seconds(self.tdb_seconds + seconds)
    }
}

impl Sub<f64> for Epoch {
    type Output = Epoch;

    fn sub(self, seconds: f64) -> Epoch {
        Epoch::from_tdb_seconds(self.tdb_seconds - seconds)
    }
}

impl Sub for Epoch {
    type Output = f64;

    /// Elapsed TDB seconds from `rhs` to `self`.
    fn sub(self, rhs: Epoch) -> f64 {
        self.tdb_seconds - rhs.tdb_seconds
    }
}

/// A parsed UTC input together with the epoch derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct Instant {
    /// The input after whitespace normalisation.
    pub text: String,
    pub utc: UtcTime,
    pub epoch: Epoch,
}

/// Converts calendar strings to ephemeris time using an installed
/// leap-second table.
#[derive(Debug, Clone, Default)]
pub struct TimeConverter {
    leap_seconds: Option<LeapSecondTable>,
}

impl TimeConverter {
    pub fn new(table: LeapSecondTable) -> Self {
        Self {
            leap_seconds: Some(table),
        }
    }

    /// Converter backed by [`LeapSecondTable::builtin`].
    pub fn with_builtin_table() -> Self {
        Self::new(LeapSecondTable::builtin())
    }

    /// Converter with no leap-second data; every conversion fails with
    /// [`TimeError::LeapSecondsUnavailable`] until a table is installed.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn install(&mut self, table: LeapSecondTable) {
        self.leap_seconds = Some(table);
    }

    pub fn leap_seconds(&self) -> Option<&LeapSecondTable> {
        self.leap_seconds.as_ref()
    }

    fn table(&self) -> Result<&LeapSecondTable, TimeError> {
        self.leap_seconds
            .as_ref()
            .ok_or(TimeError::LeapSecondsUnavailable)
    }

    /// Parse `utc` and derive its TDB epoch.
    ///
    /// A malformed string is reported before missing reference data.
    pub fn to_ephemeris_time(&self, utc: &str) -> Result<Instant, TimeError> {
        let parsed: UtcTime = utc.parse()?;
        let epoch = parsed.to_epoch(self.table()?)?;
        log::trace!("{utc:?} -> ET {:.6}", epoch.as_tdb_seconds());
        Ok(Instant {
            text: normalize_whitespace(utc),
            utc: parsed,
            epoch,
        })
    }

    /// Recover UTC calendar fields for a TDB epoch.
    pub fn to_utc(&self, epoch: Epoch) -> Result<UtcTime, TimeError> {
        UtcTime::from_epoch(epoch, self.table()?)
    }
}
