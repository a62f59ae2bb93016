//! Error types for time-scale conversions.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from UTC parsing, leap-second lookup, or table construction.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum TimeError {
    /// The input string is not a supported calendar format, or a field is out of range.
    MalformedTime(String),
    /// No leap-second table has been installed in the converter.
    LeapSecondsUnavailable,
    /// UTC instant (seconds past J2000) precedes the first leap-second table entry.
    BeforeLeapTable { utc_s: f64 },
    /// A leap-second table failed validation.
    InvalidLeapTable(&'static str),
}

impl TimeError {
    pub(crate) fn malformed(input: &str, reason: &str) -> Self {
        Self::MalformedTime(format!("'{input}': {reason}"))
    }

    /// True when the failure is due to missing or non-covering reference data
    /// rather than a bad input string.
    pub fn is_reference_data_missing(&self) -> bool {
        matches!(
            self,
            Self::LeapSecondsUnavailable | Self::BeforeLeapTable { .. } | Self::InvalidLeapTable(_)
        )
    }
}

impl Display for TimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedTime(msg) => write!(f, "malformed time string {msg}"),
            Self::LeapSecondsUnavailable => write!(f, "no leap-second table loaded"),
            Self::BeforeLeapTable { utc_s } => {
                write!(f, "UTC {utc_s} s past J2000 precedes the leap-second table")
            }
            Self::InvalidLeapTable(msg) => write!(f, "invalid leap-second table: {msg}"),
        }
    }
}

impl Error for TimeError {}
