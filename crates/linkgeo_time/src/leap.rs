//! Leap-second table and the TDB-TT model constants that travel with it.
//!
//! The values mirror the `DELTET/*` variables of a NAIF leapseconds kernel.
//! Reading such a kernel from disk belongs to the loading layer; this module
//! only holds the already-loaded numbers.

use crate::error::TimeError;
use crate::julian::day_start_seconds;

/// TT - TAI in seconds.
pub const DELTA_T_A: f64 = 32.184;
/// Amplitude of the dominant periodic TDB-TT term, seconds.
pub const K: f64 = 1.657e-3;
/// Earth orbital eccentricity used in the Kepler step.
pub const EB: f64 = 1.671e-2;
/// Mean anomaly at J2000.0, radians.
pub const M0: f64 = 6.239996;
/// Mean anomaly rate, radians per second.
pub const M1: f64 = 1.99096871e-7;

/// (TAI-UTC, year, month) for every step through the end of 2016.
const BUILTIN_STEPS: [(f64, i32, u32); 28] = [
    (10.0, 1972, 1),
    (11.0, 1972, 7),
    (12.0, 1973, 1),
    (13.0, 1974, 1),
    (14.0, 1975, 1),
    (15.0, 1976, 1),
    (16.0, 1977, 1),
    (17.0, 1978, 1),
    (18.0, 1979, 1),
    (19.0, 1980, 1),
    (20.0, 1981, 7),
    (21.0, 1982, 7),
    (22.0, 1983, 7),
    (23.0, 1985, 7),
    (24.0, 1988, 1),
    (25.0, 1990, 1),
    (26.0, 1991, 1),
    (27.0, 1992, 7),
    (28.0, 1993, 7),
    (29.0, 1994, 7),
    (30.0, 1996, 1),
    (31.0, 1997, 7),
    (32.0, 1999, 1),
    (33.0, 2006, 1),
    (34.0, 2009, 1),
    (35.0, 2012, 7),
    (36.0, 2015, 7),
    (37.0, 2017, 1),
];

/// One step of the TAI-UTC table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LeapEntry {
    /// TAI - UTC in seconds from `utc_s` onward.
    pub delta_at: f64,
    /// UTC seconds past J2000 (calendar reading) at which the value takes effect.
    pub utc_s: f64,
}

/// Loaded leap-second data plus the TDB-TT model coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct LeapSecondTable {
    pub delta_t_a: f64,
    pub k: f64,
    pub eb: f64,
    pub m0: f64,
    pub m1: f64,
    entries: Vec<LeapEntry>,
}

impl LeapSecondTable {
    /// Build a table from externally loaded values.
    ///
    /// Entries must be non-empty, finite, and strictly increasing in epoch.
    pub fn new(
        delta_t_a: f64,
        k: f64,
        eb: f64,
        m: [f64; 2],
        entries: Vec<LeapEntry>,
    ) -> Result<Self, TimeError> {
        if entries.is_empty() {
            return Err(TimeError::InvalidLeapTable("table has no entries"));
        }
        if entries
            .iter()
            .any(|e| !e.utc_s.is_finite() || !e.delta_at.is_finite())
        {
            return Err(TimeError::InvalidLeapTable("non-finite entry"));
        }
        if entries.windows(2).any(|w| w[1].utc_s <= w[0].utc_s) {
            return Err(TimeError::InvalidLeapTable(
                "entries must be strictly increasing in epoch",
            ));
        }
        if ![delta_t_a, k, eb, m[0], m[1]].iter().all(|v| v.is_finite()) {
            return Err(TimeError::InvalidLeapTable("non-finite model coefficient"));
        }
        Ok(Self {
            delta_t_a,
            k,
            eb,
            m0: m[0],
            m1: m[1],
            entries,
        })
    }

    /// The table published in the 2017 leapseconds kernel (37 s since 2017-JAN-1).
    pub fn builtin() -> Self {
        let entries = BUILTIN_STEPS
            .iter()
            .map(|&(delta_at, year, month)| LeapEntry {
                delta_at,
                utc_s: day_start_seconds(year, month, 1),
            })
            .collect();
        Self {
            delta_t_a: DELTA_T_A,
            k: K,
            eb: EB,
            m0: M0,
            m1: M1,
            entries,
        }
    }

    pub fn entries(&self) -> &[LeapEntry] {
        &self.entries
    }

    /// TAI-UTC in force at a UTC instant given as calendar seconds past J2000.
    pub fn delta_at(&self, utc_s: f64) -> Result<f64, TimeError> {
        let idx = self.entries.partition_point(|e| e.utc_s <= utc_s);
        if idx == 0 {
            return Err(TimeError::BeforeLeapTable { utc_s });
        }
        Ok(self.entries[idx - 1].delta_at)
    }

    /// Whether a positive leap second is inserted immediately before `utc_s`.
    pub fn has_leap_second_before(&self, utc_s: f64) -> bool {
        let idx = self.entries.partition_point(|e| e.utc_s < utc_s);
        match (idx.checked_sub(1), self.entries.get(idx)) {
            (Some(prev), Some(entry)) => {
                entry.utc_s == utc_s && entry.delta_at > self.entries[prev].delta_at
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_shape() {
        let table = LeapSecondTable::builtin();
        assert_eq!(table.entries().len(), 28);
        assert_eq!(table.entries()[0].delta_at, 10.0);
        assert_eq!(table.entries()[27].delta_at, 37.0);
        assert!((table.k - 1.657e-3).abs() < 1e-15);
    }

    #[test]
    fn builtin_1972_epoch() {
        let table = LeapSecondTable::builtin();
        // 1972-Jan-01 00:00 = JD 2441317.5
        let expected = (2_441_317.5 - 2_451_545.0) * 86_400.0;
        assert_eq!(table.entries()[0].utc_s, expected);
    }

    #[test]
    fn delta_at_lookup() {
        let table = LeapSecondTable::builtin();
        let jan_2017 = day_start_seconds(2017, 1, 1);
        assert_eq!(table.delta_at(jan_2017 - 1.0), Ok(36.0));
        assert_eq!(table.delta_at(jan_2017), Ok(37.0));
        assert_eq!(table.delta_at(0.0), Ok(32.0));
    }

    #[test]
    fn delta_at_before_table() {
        let table = LeapSecondTable::builtin();
        let s = day_start_seconds(1960, 1, 1);
        assert!(matches!(
            table.delta_at(s),
            Err(TimeError::BeforeLeapTable { .. })
        ));
    }

    #[test]
    fn leap_second_detection() {
        let table = LeapSecondTable::builtin();
        assert!(table.has_leap_second_before(day_start_seconds(2017, 1, 1)));
        assert!(table.has_leap_second_before(day_start_seconds(2015, 7, 1)));
        assert!(!table.has_leap_second_before(day_start_seconds(2016, 1, 1)));
        // First entry starts the table; there is no preceding step.
        assert!(!table.has_leap_second_before(day_start_seconds(1972, 1, 1)));
    }

    #[test]
    fn rejects_unsorted_entries() {
        let entries = vec![
            LeapEntry { delta_at: 11.0, utc_s: 10.0 },
            LeapEntry { delta_at: 10.0, utc_s: 5.0 },
        ];
        assert!(matches!(
            LeapSecondTable::new(DELTA_T_A, K, EB, [M0, M1], entries),
            Err(TimeError::InvalidLeapTable(_))
        ));
    }

    #[test]
    fn rejects_empty_table() {
        assert!(matches!(
            LeapSecondTable::new(DELTA_T_A, K, EB, [M0, M1], Vec::new()),
            Err(TimeError::InvalidLeapTable(_))
        ));
    }
}
