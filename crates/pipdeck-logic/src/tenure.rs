//! Experience aggregation — engagements to a level + progress readout.
//!
//! Completed engagement ranges are merged (overlapping time counts once),
//! then an open in-progress engagement accrues live from its start to the
//! evaluation instant. Level is whole years of covered time; the progress
//! value is a display-oriented "seconds into the current year" counter.
//!
//! Two year lengths coexist on purpose:
//! * level accrual divides by a fixed 365.25-day year (leap-year averaging),
//! * the progress denominator is a flat 365-day year, and the live counter
//!   resets at each Jan 1 even mid-engagement.
//!
//! That asymmetry is the product behavior. Everything here is a pure
//! function of its inputs plus an explicit `now`; callers wanting a live
//! count-up simply re-invoke once per second.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::period::{parse_period, DateRange, PeriodError};

/// Seconds in the fixed-length year used for level accrual (365.25 days).
pub const CALENDAR_YEAR_SECS: f64 = 365.25 * 24.0 * 60.0 * 60.0;

/// Seconds in the flat year used as the progress-bar denominator (365 days).
pub const DISPLAY_YEAR_SECS: i64 = 365 * 24 * 60 * 60;

/// Engagement lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementStatus {
    #[serde(rename = "COMPLETED")]
    Completed,
    #[serde(rename = "IN PROGRESS")]
    InProgress,
}

/// One modeled period of work experience.
///
/// Only `status` and `period` feed the computation; the rest is carried
/// for the presentation shell (quest log, map pins).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engagement {
    pub name: String,
    #[serde(rename = "company")]
    pub organization: String,
    pub status: EngagementStatus,
    /// Textual range, e.g. `"2022-06 to 2024-03"` or `"2024-01-15 to Present"`.
    pub period: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub achievements: Vec<String>,
    #[serde(default)]
    pub tracked: bool,
    /// `[latitude, longitude]` for the map tab.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<[f64; 2]>,
}

/// Derived tenure readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenure {
    /// Whole 365.25-day years of covered experience.
    pub level: u32,
    /// Seconds of progress within the current year unit.
    pub progress_secs: i64,
    /// Denominator for the progress display.
    pub year_secs: i64,
    /// Whether an in-progress engagement is advancing the readout.
    pub live: bool,
}

impl Tenure {
    /// Render the progress counter the way the shell displays it,
    /// e.g. `"1,234,567/31,536,000"`.
    pub fn xp_display(&self) -> String {
        format!(
            "{}/{}",
            group_thousands(self.progress_secs),
            group_thousands(self.year_secs)
        )
    }
}

/// Merge ranges into a minimal sorted non-overlapping partition.
///
/// Ranges that touch (`next.start == run.end`) are combined, so the output
/// covers exactly the union of the inputs.
pub fn merge_ranges(mut ranges: Vec<DateRange>) -> Vec<DateRange> {
    if ranges.is_empty() {
        return ranges;
    }
    ranges.sort_by_key(|r| r.start);

    let mut merged: Vec<DateRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(run) if range.start <= run.end => {
                run.end = run.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Compute the tenure readout for a set of engagements at instant `now`.
///
/// Any period that fails to parse aborts the whole computation — the
/// dossier is curated and a malformed period is a content bug, not a
/// runtime condition.
pub fn compute_tenure(engagements: &[Engagement], now: DateTime<Utc>) -> Result<Tenure, PeriodError> {
    let mut completed: Vec<DateRange> = Vec::new();
    let mut in_progress: Vec<DateRange> = Vec::new();

    for engagement in engagements {
        let parsed = parse_period(&engagement.period)?;
        match engagement.status {
            EngagementStatus::Completed => {
                if parsed.is_open() {
                    return Err(PeriodError::PresentNotAllowed(engagement.period.clone()));
                }
                completed.push(parsed.resolve(now));
            }
            EngagementStatus::InProgress => in_progress.push(parsed.resolve(now)),
        }
    }

    // At most one in-progress engagement is the curated norm. With more,
    // the most recent start drives the live readout and the rest merge
    // with the completed set so their time still counts exactly once.
    in_progress.sort_by_key(|r| r.start);
    let current = in_progress.pop();
    if !in_progress.is_empty() {
        warn!(
            extra = in_progress.len(),
            "multiple in-progress engagements; most recent start drives the readout"
        );
        completed.extend(in_progress);
    }

    let merged = merge_ranges(completed);
    let mut total_secs: i64 = merged.iter().map(|r| r.duration().num_seconds()).sum();

    if let Some(range) = &current {
        total_secs += range.duration().num_seconds();
    }

    let level = (total_secs as f64 / CALENDAR_YEAR_SECS).floor() as u32;

    let (progress_secs, live) = match &current {
        Some(range) => {
            // Live counter: seconds since whichever is later of the
            // engagement start and Jan 1 of the current year.
            let progress_start = range.start.max(start_of_year(now));
            ((now - progress_start).num_seconds().max(0), true)
        }
        None => {
            // Static snapshot: fractional year expressed in display seconds.
            let fraction = (total_secs as f64 / CALENDAR_YEAR_SECS).fract();
            ((fraction * DISPLAY_YEAR_SECS as f64).floor() as i64, false)
        }
    };

    Ok(Tenure {
        level,
        progress_secs,
        year_secs: DISPLAY_YEAR_SECS,
        live,
    })
}

/// Midnight UTC on Jan 1 of `now`'s year.
fn start_of_year(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .unwrap_or(now)
}

fn group_thousands(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
            .and_utc()
    }

    fn completed(period: &str) -> Engagement {
        Engagement {
            name: "Test".to_string(),
            organization: "Test Org".to_string(),
            status: EngagementStatus::Completed,
            period: period.to_string(),
            description: String::new(),
            achievements: Vec::new(),
            tracked: false,
            coordinates: None,
        }
    }

    fn in_progress(period: &str) -> Engagement {
        Engagement {
            status: EngagementStatus::InProgress,
            ..completed(period)
        }
    }

    fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> DateRange {
        DateRange::new(start, end)
    }

    #[test]
    fn test_merge_empty() {
        assert!(merge_ranges(Vec::new()).is_empty());
    }

    #[test]
    fn test_merge_disjoint_is_noop() {
        let a = range(utc(2017, 6, 1), utc(2017, 12, 1));
        let b = range(utc(2018, 3, 1), utc(2018, 9, 1));
        let merged = merge_ranges(vec![b, a]);
        assert_eq!(merged, vec![a, b], "disjoint ranges stay separate, sorted");
    }

    #[test]
    fn test_merge_overlapping() {
        // Concrete case from the dossier: these overlap by 14 months.
        let a = range(utc(2022, 6, 1), utc(2024, 3, 1));
        let b = range(utc(2021, 4, 1), utc(2023, 8, 1));
        let merged = merge_ranges(vec![a, b]);
        assert_eq!(merged, vec![range(utc(2021, 4, 1), utc(2024, 3, 1))]);
    }

    #[test]
    fn test_merge_touching_ranges_combine() {
        let a = range(utc(2019, 1, 1), utc(2020, 1, 1));
        let b = range(utc(2020, 1, 1), utc(2021, 1, 1));
        let merged = merge_ranges(vec![a, b]);
        assert_eq!(merged, vec![range(utc(2019, 1, 1), utc(2021, 1, 1))]);
    }

    #[test]
    fn test_merge_contained_range_absorbed() {
        let outer = range(utc(2019, 1, 1), utc(2023, 1, 1));
        let inner = range(utc(2020, 1, 1), utc(2021, 1, 1));
        let merged = merge_ranges(vec![inner, outer]);
        assert_eq!(merged, vec![outer]);
    }

    #[test]
    fn test_no_engagements_is_level_zero() {
        let t = compute_tenure(&[], utc(2025, 1, 1)).unwrap();
        assert_eq!(t.level, 0);
        assert_eq!(t.progress_secs, 0);
        assert!(!t.live);
    }

    #[test]
    fn test_disjoint_completed_sum_exactly() {
        // Two disjoint 1-year ranges: just over 2 calendar (365.25d) years
        // of raw days would be needed for level 2; 730 days falls short.
        let engagements = vec![
            completed("2017 to 2018"),
            completed("2019 to 2020"),
        ];
        let t = compute_tenure(&engagements, utc(2025, 6, 1)).unwrap();
        assert_eq!(t.level, 1, "730 days < 2 × 365.25 days");
        assert!(!t.live);
    }

    #[test]
    fn test_overlap_not_double_counted() {
        let engagements = vec![
            completed("2021-04 to 2023-08"),
            completed("2022-06 to 2024-03"),
        ];
        let t = compute_tenure(&engagements, utc(2025, 1, 1)).unwrap();
        // Union is 2021-04-01..2024-03-01 = 1065 days = 2.915 years.
        assert_eq!(t.level, 2);
    }

    #[test]
    fn test_level_crosses_at_calendar_year_boundary() {
        let engagements = vec![in_progress("2024-01-01 to Present")];
        let start = utc(2024, 1, 1);

        let just_before = start + Duration::seconds(CALENDAR_YEAR_SECS as i64 - 1);
        let t = compute_tenure(&engagements, just_before).unwrap();
        assert_eq!(t.level, 0);

        let at_boundary = start + Duration::seconds(CALENDAR_YEAR_SECS as i64);
        let t = compute_tenure(&engagements, at_boundary).unwrap();
        assert_eq!(t.level, 1);
    }

    #[test]
    fn test_level_monotonic_as_time_advances() {
        let engagements = vec![in_progress("2020-03 to Present")];
        let mut last = 0;
        for months in 0..60 {
            let now = utc(2020, 4, 1) + Duration::days(30 * months);
            let t = compute_tenure(&engagements, now).unwrap();
            assert!(t.level >= last, "level must never decrease");
            last = t.level;
        }
    }

    #[test]
    fn test_live_progress_from_engagement_start_same_year() {
        // Started this calendar year: progress counts from the start date.
        let engagements = vec![in_progress("2025-03-01 to Present")];
        let now = utc(2025, 3, 11);
        let t = compute_tenure(&engagements, now).unwrap();
        assert!(t.live);
        assert_eq!(t.progress_secs, 10 * 86_400);
    }

    #[test]
    fn test_live_progress_resets_at_jan_first() {
        // Started in a prior year: progress counts from Jan 1 of now's year.
        let engagements = vec![in_progress("2024-01-15 to Present")];
        let now = utc(2025, 1, 11);
        let t = compute_tenure(&engagements, now).unwrap();
        assert_eq!(t.progress_secs, 10 * 86_400);
    }

    #[test]
    fn test_static_progress_is_fractional_year() {
        // Half a calendar year completed, no in-progress engagement.
        let engagements = vec![completed("2020-01-01 to 2020-07-01")];
        let t = compute_tenure(&engagements, utc(2025, 1, 1)).unwrap();
        assert_eq!(t.level, 0);
        assert!(!t.live);
        let expected =
            ((182.0 * 86_400.0 / CALENDAR_YEAR_SECS).fract() * DISPLAY_YEAR_SECS as f64) as i64;
        assert_eq!(t.progress_secs, expected);
    }

    #[test]
    fn test_in_progress_accrues_into_level() {
        let engagements = vec![
            completed("2017 to 2020"), // 3 years and change
        ];
        let base = compute_tenure(&engagements, utc(2025, 1, 1)).unwrap();

        let with_live = vec![
            completed("2017 to 2020"),
            in_progress("2023-01-01 to Present"),
        ];
        let t = compute_tenure(&with_live, utc(2025, 1, 1)).unwrap();
        assert!(t.level > base.level, "two live years must raise the level");
    }

    #[test]
    fn test_completed_with_present_end_rejected() {
        let engagements = vec![completed("2020 to Present")];
        let err = compute_tenure(&engagements, utc(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, PeriodError::PresentNotAllowed(_)));
    }

    #[test]
    fn test_malformed_period_is_fatal() {
        let engagements = vec![completed("2020-2023")];
        assert!(compute_tenure(&engagements, utc(2025, 1, 1)).is_err());
    }

    #[test]
    fn test_multiple_in_progress_most_recent_drives_progress() {
        let engagements = vec![
            in_progress("2020-01 to Present"),
            in_progress("2025-02-01 to Present"),
        ];
        let now = utc(2025, 2, 11);
        let t = compute_tenure(&engagements, now).unwrap();
        // Progress follows the 2025 engagement (10 days), not the 2020 one.
        assert_eq!(t.progress_secs, 10 * 86_400);
        // The older engagement's five years still count toward the level.
        assert!(t.level >= 5);
    }

    #[test]
    fn test_xp_display_grouping() {
        let t = Tenure {
            level: 7,
            progress_secs: 1_234_567,
            year_secs: DISPLAY_YEAR_SECS,
            live: true,
        };
        assert_eq!(t.xp_display(), "1,234,567/31,536,000");
    }

    #[test]
    fn test_group_thousands_small_values() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
    }
}
