//! UTC calendar date/time with sub-second precision.
//!
//! `UtcTime` is the parsed form of every timestamp entering the engine.
//! Parsing is strict: out-of-range fields are rejected, never clamped.
//! Conversion to and from [`Epoch`] requires a [`LeapSecondTable`].

use std::str::FromStr;

use crate::Epoch;
use crate::error::TimeError;
use crate::julian::{
    calendar_from_seconds, day_start_seconds, days_in_month, month_abbrev, month_from_abbrev,
    month_day_from_day_of_year,
};
use crate::leap::LeapSecondTable;
use crate::scales::{self, UtcReading};

/// UTC calendar date with sub-second precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtcTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl UtcTime {
    pub fn new(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Check field ranges. Second 60 is accepted only at 23:59; whether a
    /// leap second really occurs there is checked against the table in
    /// [`UtcTime::to_epoch`].
    pub fn validate(&self) -> Result<(), TimeError> {
        let text = self.to_string();
        if !(1..=9999).contains(&self.year) {
            return Err(TimeError::malformed(&text, "year out of range"));
        }
        if !(1..=12).contains(&self.month) {
            return Err(TimeError::malformed(&text, "month out of range"));
        }
        if self.day == 0 || self.day > days_in_month(self.year, self.month) {
            return Err(TimeError::malformed(&text, "day out of range"));
        }
        if self.hour > 23 {
            return Err(TimeError::malformed(&text, "hour out of range"));
        }
        if self.minute > 59 {
            return Err(TimeError::malformed(&text, "minute out of range"));
        }
        if !self.second.is_finite() || self.second < 0.0 || self.second >= 61.0 {
            return Err(TimeError::malformed(&text, "second out of range"));
        }
        if self.second >= 60.0 && (self.hour != 23 || self.minute != 59) {
            return Err(TimeError::malformed(
                &text,
                "second 60 is only valid at 23:59",
            ));
        }
        Ok(())
    }

    /// Calendar seconds past J2000 at the start of this minute.
    fn minute_start_seconds(&self) -> f64 {
        day_start_seconds(self.year, self.month, self.day)
            + f64::from(self.hour) * 3600.0
            + f64::from(self.minute) * 60.0
    }

    /// Convert to a TDB epoch.
    ///
    /// TAI-UTC is taken at the start of the minute, so the seconds inside an
    /// inserted leap second (23:59:60.x) continue the old offset and the
    /// mapping stays monotonic.
    pub fn to_epoch(&self, table: &LeapSecondTable) -> Result<Epoch, TimeError> {
        self.validate()?;
        let minute_start = self.minute_start_seconds();
        if self.second >= 60.0 && !table.has_leap_second_before(minute_start + 60.0) {
            return Err(TimeError::malformed(
                &self.to_string(),
                "no leap second is tabulated at the end of this day",
            ));
        }
        let delta_at = table.delta_at(minute_start)?;
        let tai_s = minute_start + self.second + delta_at;
        Ok(Epoch::from_tdb_seconds(scales::tai_to_tdb(tai_s, table)))
    }

    /// Convert a TDB epoch back to UTC calendar fields.
    pub fn from_epoch(epoch: Epoch, table: &LeapSecondTable) -> Result<Self, TimeError> {
        let tai_s = scales::tdb_to_tai(epoch.as_tdb_seconds(), table);
        let (base_s, second_offset) = match scales::tai_to_utc(tai_s, table)? {
            UtcReading::Regular(utc_s) => (utc_s, 0.0),
            UtcReading::Leap {
                minute_start_s,
                second,
            } => (minute_start_s, second),
        };
        let (year, month, day, sod) = calendar_from_seconds(base_s);
        let hour = (sod / 3600.0).floor() as u32;
        let minute = ((sod - f64::from(hour) * 3600.0) / 60.0).floor() as u32;
        let second = sod - f64::from(hour) * 3600.0 - f64::from(minute) * 60.0 + second_offset;
        Ok(Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })
    }

    /// `YYYY-MON-DD HH:MM:SS.fff` rendering with a three-letter month.
    pub fn to_calendar_string(&self) -> String {
        let mon = month_abbrev(self.month).unwrap_or("???");
        format!(
            "{:04}-{}-{:02} {:02}:{:02}:{:06.3}",
            self.year, mon, self.day, self.hour, self.minute, self.second
        )
    }
}

impl std::fmt::Display for UtcTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.second as u32;
        let frac = self.second - whole as f64;
        if frac.abs() < 1e-9 {
            write!(
                f,
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                self.year, self.month, self.day, self.hour, self.minute, whole
            )
        } else {
            write!(
                f,
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:09.6}Z",
                self.year, self.month, self.day, self.hour, self.minute, self.second
            )
        }
    }
}

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl FromStr for UtcTime {
    type Err = TimeError;

    /// Accepted shapes (date and full `HH:MM:SS[.fff]` time are both required):
    ///
    /// - `2016-SEP-08 14:32:32`
    /// - `2016-09-08 14:32:32`, `2016-09-08T14:32:32.5Z`
    /// - `2016-252 14:32:32`, `2016-252T14:32:32`
    /// - `09/08/2016 14:32:32`, `09-08-2016 14:32:32`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = normalize_whitespace(s);
        if text.is_empty() {
            return Err(TimeError::malformed(s, "empty time string"));
        }
        let folded = text.to_ascii_uppercase();
        let upper = folded.strip_suffix('Z').unwrap_or(&folded);

        let (date, time) = split_date_time(upper).ok_or_else(|| {
            TimeError::malformed(&text, "expected a date and an HH:MM:SS time")
        })?;
        let (year, month, day) = parse_date(date, &text)?;
        let (hour, minute, second) = parse_time(time, &text)?;

        let utc = Self::new(year, month, day, hour, minute, second);
        utc.validate()?;
        Ok(utc)
    }
}

/// Split at the single space, or at a `T` sitting between two digits.
fn split_date_time(s: &str) -> Option<(&str, &str)> {
    if let Some((date, time)) = s.split_once(' ') {
        if time.contains(' ') {
            return None;
        }
        return Some((date, time));
    }
    let bytes = s.as_bytes();
    let pos = (1..bytes.len().saturating_sub(1)).find(|&i| {
        bytes[i] == b'T' && bytes[i - 1].is_ascii_digit() && bytes[i + 1].is_ascii_digit()
    })?;
    Some((&s[..pos], &s[pos + 1..]))
}

fn parse_uint(field: &str, min_len: usize, max_len: usize) -> Option<u32> {
    if field.len() < min_len || field.len() > max_len || !field.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    field.parse().ok()
}

fn parse_year(field: &str) -> Option<i32> {
    parse_uint(field, 4, 4).map(|y| y as i32)
}

fn parse_date(date: &str, text: &str) -> Result<(i32, u32, u32), TimeError> {
    let bad = |reason: &str| TimeError::malformed(text, reason);

    if date.contains('/') {
        let parts: Vec<&str> = date.split('/').collect();
        if parts.len() != 3 {
            return Err(bad("expected MM/DD/YYYY"));
        }
        let month = parse_uint(parts[0], 1, 2).ok_or_else(|| bad("bad month"))?;
        let day = parse_uint(parts[1], 1, 2).ok_or_else(|| bad("bad day"))?;
        let year = parse_year(parts[2]).ok_or_else(|| bad("bad year"))?;
        return Ok((year, month, day));
    }

    let parts: Vec<&str> = date.split('-').collect();
    match parts.as_slice() {
        [year, doy] => {
            let year = parse_year(year).ok_or_else(|| bad("bad year"))?;
            let doy = parse_uint(doy, 3, 3).ok_or_else(|| bad("bad day of year"))?;
            let (month, day) = month_day_from_day_of_year(year, doy)
                .ok_or_else(|| bad("day of year out of range"))?;
            Ok((year, month, day))
        }
        [first, second, third] if first.len() == 4 => {
            let year = parse_year(first).ok_or_else(|| bad("bad year"))?;
            let month = if second.bytes().all(|b| b.is_ascii_alphabetic()) {
                month_from_abbrev(second).ok_or_else(|| bad("unknown month name"))?
            } else {
                parse_uint(second, 1, 2).ok_or_else(|| bad("bad month"))?
            };
            let day = parse_uint(third, 1, 2).ok_or_else(|| bad("bad day"))?;
            Ok((year, month, day))
        }
        [month, day, year] if year.len() == 4 => {
            let month = parse_uint(month, 1, 2).ok_or_else(|| bad("bad month"))?;
            let day = parse_uint(day, 1, 2).ok_or_else(|| bad("bad day"))?;
            let year = parse_year(year).ok_or_else(|| bad("bad year"))?;
            Ok((year, month, day))
        }
        _ => Err(bad("unrecognised date layout")),
    }
}

fn parse_time(time: &str, text: &str) -> Result<(u32, u32, f64), TimeError> {
    let bad = |reason: &str| TimeError::malformed(text, reason);
    let parts: Vec<&str> = time.split(':').collect();
    let [hour, minute, second] = parts.as_slice() else {
        return Err(bad("expected HH:MM:SS"));
    };
    let hour = parse_uint(hour, 1, 2).ok_or_else(|| bad("bad hour"))?;
    let minute = parse_uint(minute, 2, 2).ok_or_else(|| bad("bad minute"))?;

    let (whole, frac) = match second.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (*second, None),
    };
    parse_uint(whole, 2, 2).ok_or_else(|| bad("bad second"))?;
    if let Some(frac) = frac {
        if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return Err(bad("bad fractional second"));
        }
    }
    let second: f64 = second.parse().map_err(|_| bad("bad second"))?;
    Ok((hour, minute, second))
}
