//! Date normalization.
//!
//! Scanner exports and hand-edited spreadsheets disagree on date shape.
//! [`DateNormalizer`] accepts the shapes seen in practice and renders them
//! all as `YYYY-MM-DD`. Anything it cannot read exactly is reported as a
//! [`DateError`]; it never guesses.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Canonical output format.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// `%Y` takes one to four digits; anything before this year came from a
/// short or truncated year field and is refused.
const MIN_YEAR: i32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("empty date value")]
    Empty,
    #[error("unrecognized date format: '{0}'")]
    Unrecognized(String),
}

const ISO_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const ISO_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const MONTH_FIRST_DATETIME_FORMATS: &[&str] = &["%m/%d/%Y %H:%M:%S", "%m/%d/%Y %H:%M"];
const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y"];

const DAY_FIRST_DATETIME_FORMATS: &[&str] = &["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];
const DAY_FIRST_DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y"];

const NAMED_MONTH_FORMATS: &[&str] = &["%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%d %B %Y"];

/// Parses heterogeneous date strings.
///
/// Numeric `NN/NN/YYYY` dates are month-first unless `day_first` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateNormalizer {
    pub day_first: bool,
}

impl DateNormalizer {
    pub fn new(day_first: bool) -> Self {
        Self { day_first }
    }

    pub fn parse(&self, input: &str) -> Result<NaiveDate, DateError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(DateError::Empty);
        }
        match self.parse_any(s) {
            Some(date) if date.year() >= MIN_YEAR => Ok(date),
            _ => Err(DateError::Unrecognized(s.to_string())),
        }
    }

    fn parse_any(&self, s: &str) -> Option<NaiveDate> {

        // Offset-bearing timestamps keep the calendar date they were written in.
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.date_naive());
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
            return Some(dt.date_naive());
        }

        let (numeric_datetimes, numeric_dates) = if self.day_first {
            (DAY_FIRST_DATETIME_FORMATS, DAY_FIRST_DATE_FORMATS)
        } else {
            (MONTH_FIRST_DATETIME_FORMATS, MONTH_FIRST_DATE_FORMATS)
        };

        for fmt in ISO_DATETIME_FORMATS.iter().chain(numeric_datetimes) {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt.date());
            }
        }

        for fmt in ISO_DATE_FORMATS
            .iter()
            .chain(numeric_dates)
            .chain(NAMED_MONTH_FORMATS)
        {
            if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
                return Some(date);
            }
        }

        None
    }

    pub fn normalize(&self, input: &str) -> Result<String, DateError> {
        self.parse(input)
            .map(|d| d.format(CANONICAL_FORMAT).to_string())
    }
}

/// Normalize with the default (month-first) policy.
pub fn normalize_date(input: &str) -> Result<String, DateError> {
    DateNormalizer::default().normalize(input)
}
