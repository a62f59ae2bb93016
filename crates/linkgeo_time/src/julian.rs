//! Calendar arithmetic and Julian Date helpers.
//!
//! Day counts use integer proleptic-Gregorian arithmetic so that calendar
//! fields map to seconds past J2000 without the rounding a Julian Date
//! intermediate would introduce.

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00:00 TDB).
pub const J2000_JD: f64 = 2_451_545.0;

/// Seconds in one day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Days from 1970-01-01 to 2000-01-01.
const UNIX_DAYS_TO_J2000_DATE: i64 = 10_957;

const MONTH_ABBREVS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Convert a Julian Date to seconds past J2000.0 in the same time scale.
pub fn jd_to_tdb_seconds(jd: f64) -> f64 {
    (jd - J2000_JD) * SECONDS_PER_DAY
}

/// Convert seconds past J2000.0 to a Julian Date in the same time scale.
pub fn tdb_seconds_to_jd(s: f64) -> f64 {
    J2000_JD + s / SECONDS_PER_DAY
}

/// Gregorian leap-year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`. Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Month number (1-12) from a three-letter English abbreviation, any case.
pub fn month_from_abbrev(s: &str) -> Option<u32> {
    MONTH_ABBREVS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(s))
        .map(|i| i as u32 + 1)
}

/// Three-letter upper-case abbreviation for a month number (1-12).
pub fn month_abbrev(month: u32) -> Option<&'static str> {
    MONTH_ABBREVS.get(month.checked_sub(1)? as usize).copied()
}

/// Convert a day-of-year (1-based) into (month, day).
pub fn month_day_from_day_of_year(year: i32, doy: u32) -> Option<(u32, u32)> {
    let mut remaining = doy;
    for month in 1..=12 {
        let len = days_in_month(year, month);
        if remaining >= 1 && remaining <= len {
            return Some((month, remaining));
        }
        remaining = remaining.checked_sub(len)?;
    }
    None
}

/// Days since 1970-01-01 for a proleptic Gregorian date.
pub fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = i64::from((month + 9) % 12);
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]: (year, month, day).
pub fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = (yoe + era * 400 + i64::from(month <= 2)) as i32;
    (year, month, day)
}

/// Seconds past J2000.0 of a calendar date at midnight, in whatever
/// uniform scale the calendar fields are read in.
pub fn day_start_seconds(year: i32, month: u32, day: u32) -> f64 {
    let days = days_from_civil(year, month, day) - UNIX_DAYS_TO_J2000_DATE;
    days as f64 * SECONDS_PER_DAY - SECONDS_PER_DAY / 2.0
}

/// Calendar date (year, month, day) and seconds-of-day for a value of
/// seconds past J2000.0.
pub fn calendar_from_seconds(s: f64) -> (i32, u32, u32, f64) {
    let from_midnight = s + SECONDS_PER_DAY / 2.0;
    let days = (from_midnight / SECONDS_PER_DAY).floor();
    let mut sod = from_midnight - days * SECONDS_PER_DAY;
    let mut days = days as i64;
    // Guard against sod rounding up to a full day.
    if sod >= SECONDS_PER_DAY {
        sod -= SECONDS_PER_DAY;
        days += 1;
    }
    let (year, month, day) = civil_from_days(days + UNIX_DAYS_TO_J2000_DATE);
    (year, month, day, sod)
}
