//! Spacecraft clock readings and the mission sol.
//!
//! A clock counts ticks in mixed-radix fields, most significant first. A
//! Mars local solar clock, for instance, uses `sol:hour:minute:second:fraction`,
//! and a reading prints as `P/00153:13:21:07:04512` with `P` the partition.
//! Ticks map to ephemeris time through piecewise-linear correlation records.

use std::fmt::{Display, Formatter};

use linkgeo_time::Epoch;

use crate::body::Body;
use crate::error::EngineError;

/// One correlation record: from `et_s` onward, ticks advance from `ticks`
/// at `seconds_per_tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockCorrelation {
    pub ticks: f64,
    pub et_s: f64,
    pub seconds_per_tick: f64,
}

/// Tick/ephemeris-time correlation and field layout for one spacecraft.
#[derive(Debug, Clone, PartialEq)]
pub struct SpacecraftClock {
    spacecraft: Body,
    partition: u32,
    /// Field moduli, most significant first.
    moduli: Vec<u64>,
    /// Sorted by `et_s`, strictly increasing in both ticks and time.
    records: Vec<ClockCorrelation>,
    capacity: u64,
}

impl SpacecraftClock {
    pub fn new(
        spacecraft: Body,
        partition: u32,
        moduli: Vec<u64>,
        mut records: Vec<ClockCorrelation>,
    ) -> Result<Self, EngineError> {
        if moduli.is_empty() || moduli.iter().any(|&m| m == 0) {
            return Err(EngineError::InvalidConfig(
                "clock fields need at least one positive modulus",
            ));
        }
        let capacity = moduli
            .iter()
            .try_fold(1u64, |acc, &m| acc.checked_mul(m))
            .ok_or(EngineError::InvalidConfig(
                "clock moduli overflow the tick count",
            ))?;
        if records.is_empty() {
            return Err(EngineError::InvalidConfig(
                "clock needs at least one correlation record",
            ));
        }
        if !records.iter().all(|r| {
            r.ticks.is_finite()
                && r.et_s.is_finite()
                && r.seconds_per_tick.is_finite()
                && r.seconds_per_tick > 0.0
        }) {
            return Err(EngineError::InvalidConfig(
                "clock correlation values must be finite with a positive rate",
            ));
        }
        records.sort_by(|a, b| a.et_s.total_cmp(&b.et_s));
        if records
            .windows(2)
            .any(|w| !(w[0].et_s < w[1].et_s && w[0].ticks < w[1].ticks))
        {
            return Err(EngineError::InvalidConfig(
                "clock correlation records must increase in ticks and time",
            ));
        }
        Ok(Self {
            spacecraft,
            partition,
            moduli,
            records,
            capacity,
        })
    }

    pub fn spacecraft(&self) -> Body {
        self.spacecraft
    }

    pub fn partition(&self) -> u32 {
        self.partition
    }

    /// Continuous tick count at `epoch`.
    pub fn ticks_at(&self, epoch: Epoch) -> Result<f64, EngineError> {
        let t = epoch.as_tdb_seconds();
        if !t.is_finite() {
            return Err(EngineError::InvalidQuery("epoch must be finite"));
        }
        let idx = self.records.partition_point(|r| r.et_s <= t);
        let Some(record) = idx.checked_sub(1).map(|i| &self.records[i]) else {
            return Err(self.out_of_range(epoch));
        };
        Ok(record.ticks + (t - record.et_s) / record.seconds_per_tick)
    }

    /// Clock reading at `epoch`, rounded to the nearest tick.
    pub fn reading(&self, epoch: Epoch) -> Result<SclkReading, EngineError> {
        let ticks = self.ticks_at(epoch)?.round();
        if !(ticks >= 0.0 && ticks < self.capacity as f64) {
            return Err(self.out_of_range(epoch));
        }
        let mut remaining = ticks as u64;
        let mut fields = vec![0; self.moduli.len()];
        for (field, &modulus) in fields.iter_mut().zip(&self.moduli).rev() {
            *field = remaining % modulus;
            remaining /= modulus;
        }
        Ok(SclkReading {
            partition: self.partition,
            fields,
            widths: self.moduli.iter().map(|&m| digits(m - 1)).collect(),
        })
    }

    fn out_of_range(&self, epoch: Epoch) -> EngineError {
        EngineError::ClockOutOfRange {
            spacecraft: self.spacecraft,
            epoch_tdb_s: epoch.as_tdb_seconds(),
        }
    }
}

fn digits(mut n: u64) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// A decomposed clock reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SclkReading {
    pub partition: u32,
    /// Field values, most significant first.
    pub fields: Vec<u64>,
    widths: Vec<usize>,
}

impl SclkReading {
    /// Leading field; on a local solar clock this is the mission sol.
    pub fn sol(&self) -> u64 {
        self.fields[0]
    }
}

impl Display for SclkReading {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/", self.partition)?;
        for (i, (value, width)) in self.fields.iter().zip(&self.widths).enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{value:0width$}")?;
        }
        Ok(())
    }
}

/// Sol from a clock string of the form `P/sol:...`.
pub fn sol_of(sclk: &str) -> Result<u64, EngineError> {
    sclk.trim()
        .split_once('/')
        .and_then(|(_, fields)| fields.split(':').next())
        .and_then(|sol| sol.trim().parse().ok())
        .ok_or(EngineError::InvalidQuery(
            "spacecraft clock string must look like P/sol:...",
        ))
}
