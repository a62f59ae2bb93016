//! TAI / TT / TDB conversions following the NAIF leapseconds model.
//!
//! TDB - TT = K sin(E), E = M + EB sin(M), M = M0 + M1 * t, with `t` in
//! seconds past J2000. UTC enters and leaves through TAI so that leap
//! seconds stay explicit.

use crate::error::TimeError;
use crate::leap::LeapSecondTable;

/// Convergence threshold for inverting TDB - TT, seconds.
const TDB_INVERSION_TOL_S: f64 = 1e-12;
const TDB_INVERSION_MAX_ITER: usize = 8;

/// A UTC reading recovered from TAI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UtcReading {
    /// Ordinary instant: calendar seconds past J2000.
    Regular(f64),
    /// Inside an inserted leap second: the 23:59 minute start (calendar
    /// seconds past J2000) and the seconds field, which is >= 60.
    Leap { minute_start_s: f64, second: f64 },
}

/// TT seconds past J2000 to TDB seconds past J2000.
pub fn tt_to_tdb(tt_s: f64, table: &LeapSecondTable) -> f64 {
    let m = table.m0 + table.m1 * tt_s;
    let e = m + table.eb * m.sin();
    tt_s + table.k * e.sin()
}

/// TDB seconds past J2000 to TT seconds past J2000 (fixed-point inversion).
pub fn tdb_to_tt(tdb_s: f64, table: &LeapSecondTable) -> f64 {
    let mut tt = tdb_s;
    for _ in 0..TDB_INVERSION_MAX_ITER {
        let next = tdb_s - (tt_to_tdb(tt, table) - tt);
        let done = (next - tt).abs() <= TDB_INVERSION_TOL_S;
        tt = next;
        if done {
            break;
        }
    }
    tt
}

/// TAI seconds past J2000 to TDB seconds past J2000.
pub fn tai_to_tdb(tai_s: f64, table: &LeapSecondTable) -> f64 {
    tt_to_tdb(tai_s + table.delta_t_a, table)
}

/// TDB seconds past J2000 to TAI seconds past J2000.
pub fn tdb_to_tai(tdb_s: f64, table: &LeapSecondTable) -> f64 {
    tdb_to_tt(tdb_s, table) - table.delta_t_a
}

/// Recover the UTC reading for a TAI instant, flagging inserted leap seconds.
pub fn tai_to_utc(tai_s: f64, table: &LeapSecondTable) -> Result<UtcReading, TimeError> {
    let entries = table.entries();
    let idx = entries.partition_point(|e| e.utc_s + e.delta_at <= tai_s);
    if idx == 0 {
        return Err(TimeError::BeforeLeapTable {
            utc_s: tai_s - entries[0].delta_at,
        });
    }
    let prev = entries[idx - 1];
    if let Some(next) = entries.get(idx) {
        let window_start = next.utc_s + prev.delta_at;
        if next.delta_at > prev.delta_at && tai_s >= window_start {
            return Ok(UtcReading::Leap {
                minute_start_s: next.utc_s - 60.0,
                second: 60.0 + (tai_s - window_start),
            });
        }
    }
    Ok(UtcReading::Regular(tai_s - prev.delta_at))
}
