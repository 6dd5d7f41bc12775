//! Period string parsing — textual work-history ranges to concrete instants.
//!
//! A period string is `"<start> to <end>"`, where each side is a dash-joined
//! date at one of three granularities (`2019`, `2022-06`, `2024-01-15`) and
//! the end may be the literal `Present`. Missing month defaults to January,
//! missing day to the 1st. All instants are midnight UTC.
//!
//! The dossier is curated, not user-submitted, so a string that fails this
//! grammar is a content bug: parsing fails loudly and the whole dataset is
//! rejected at load time.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

/// Separator between the start and end of a period string.
const RANGE_SEPARATOR: &str = " to ";

/// Failure to parse a period string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PeriodError {
    #[error("period `{0}` is missing the ` to ` separator")]
    MissingSeparator(String),

    #[error("period `{period}` has a non-numeric date component `{component}`")]
    BadComponent { period: String, component: String },

    #[error("period `{0}` names an impossible calendar date")]
    InvalidDate(String),

    #[error("period `{0}` ends before it starts")]
    Backward(String),

    #[error("period `{0}` ends at `Present` but the engagement is not in progress")]
    PresentNotAllowed(String),
}

/// A concrete half-open interval `[start, end)` in calendar time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Covered duration. Never negative for ranges built by [`parse_period`].
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// End of a parsed period: a fixed date, or "still running".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodEnd {
    Date(DateTime<Utc>),
    Present,
}

/// A period string parsed but not yet pinned to an evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedPeriod {
    pub start: DateTime<Utc>,
    pub end: PeriodEnd,
}

impl ParsedPeriod {
    /// Whether the period is open-ended (`... to Present`).
    pub fn is_open(&self) -> bool {
        matches!(self.end, PeriodEnd::Present)
    }

    /// Pin the period to a concrete range at evaluation time `now`.
    ///
    /// An open end resolves to `now`; if `now` is somehow before the start
    /// the range is clamped to empty rather than going backward.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateRange {
        match self.end {
            PeriodEnd::Date(end) => DateRange::new(self.start, end),
            PeriodEnd::Present => DateRange::new(self.start, now.max(self.start)),
        }
    }
}

/// Parse a period string like `"2022-06 to 2024-03"` or `"2024-01-15 to Present"`.
pub fn parse_period(period: &str) -> Result<ParsedPeriod, PeriodError> {
    let (start_part, end_part) = period
        .split_once(RANGE_SEPARATOR)
        .ok_or_else(|| PeriodError::MissingSeparator(period.to_string()))?;

    let start = parse_date(period, start_part.trim())?;

    let end_token = end_part.trim();
    if end_token.eq_ignore_ascii_case("present") {
        return Ok(ParsedPeriod {
            start,
            end: PeriodEnd::Present,
        });
    }

    let end = parse_date(period, end_token)?;
    if end < start {
        return Err(PeriodError::Backward(period.to_string()));
    }

    Ok(ParsedPeriod {
        start,
        end: PeriodEnd::Date(end),
    })
}

/// Parse one side of a period: `YYYY`, `YYYY-MM`, or `YYYY-MM-DD`.
fn parse_date(period: &str, token: &str) -> Result<DateTime<Utc>, PeriodError> {
    let mut parts = token.splitn(3, '-');

    let year = parse_component(period, parts.next().unwrap_or(""))?;
    let month = match parts.next() {
        Some(m) => parse_component(period, m)?,
        None => 1,
    };
    let day = match parts.next() {
        Some(d) => parse_component(period, d)?,
        None => 1,
    };

    let date = NaiveDate::from_ymd_opt(year, month as u32, day as u32)
        .ok_or_else(|| PeriodError::InvalidDate(period.to_string()))?;

    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn parse_component(period: &str, component: &str) -> Result<i32, PeriodError> {
    component
        .trim()
        .parse::<i32>()
        .map_err(|_| PeriodError::BadComponent {
            period: period.to_string(),
            component: component.to_string(),
        })
}
