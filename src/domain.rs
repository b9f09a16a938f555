use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::error::{Result, StatsError};

/// Display format for streak range endpoints, e.g. `Jan 04`.
const RANGE_DATE_FORMAT: &str = "%b %d";

fn iso_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static date pattern"))
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// The shape is checked before chrono sees the string, so inputs chrono would
/// otherwise tolerate (`2024-6-5`, surrounding whitespace, trailing time
/// components) are rejected as well as impossible dates like `2024-02-30`.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    if !iso_date_pattern().is_match(raw) {
        return Err(StatsError::InvalidDateFormat(raw.to_string()));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| StatsError::InvalidDateFormat(raw.to_string()))
}

/// One calendar day's contribution count from a single source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityDay {
    pub date: NaiveDate,
    pub count: u32,
}

impl ActivityDay {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }
}

/// Sorts by date and collapses repeated dates, keeping the entry that came
/// last in the input.
pub fn dedup_days(days: &[ActivityDay]) -> Vec<ActivityDay> {
    let mut sorted = days.to_vec();
    sorted.sort_by_key(|d| d.date);

    let mut unique: Vec<ActivityDay> = Vec::with_capacity(sorted.len());
    for day in sorted {
        match unique.last_mut() {
            Some(last) if last.date == day.date => *last = day,
            _ => unique.push(day),
        }
    }
    unique
}

/// Seconds of coding time recorded for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CodingDay {
    pub date: NaiveDate,
    pub seconds: f64,
}

impl CodingDay {
    pub fn new(date: NaiveDate, seconds: f64) -> Self {
        Self { date, seconds }
    }
}

/// Merged commits and coding time for one day of a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub commits: u32,
    pub coding_seconds: f64,
}

impl DailyStat {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            commits: 0,
            coding_seconds: 0.0,
        }
    }
}

/// Calendar span of a streak, or the "No Activity" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum StreakRange {
    NoActivity,
    Span { start: NaiveDate, end: NaiveDate },
}

impl StreakRange {
    /// Builds a range from optional endpoints; either missing means no activity.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match (start, end) {
            (Some(start), Some(end)) => StreakRange::Span { start, end },
            _ => StreakRange::NoActivity,
        }
    }

    pub fn is_no_activity(&self) -> bool {
        matches!(self, StreakRange::NoActivity)
    }
}

impl fmt::Display for StreakRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreakRange::NoActivity => write!(f, "No Activity"),
            StreakRange::Span { start, end } if start == end => {
                write!(f, "{}", start.format(RANGE_DATE_FORMAT))
            }
            StreakRange::Span { start, end } => write!(
                f,
                "{} - {}",
                start.format(RANGE_DATE_FORMAT),
                end.format(RANGE_DATE_FORMAT)
            ),
        }
    }
}

impl From<StreakRange> for String {
    fn from(range: StreakRange) -> Self {
        range.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_accepts_iso() {
        assert_eq!(parse_date("2024-06-05").unwrap(), ymd(2024, 6, 5));
        assert_eq!(parse_date("2024-02-29").unwrap(), ymd(2024, 2, 29));
    }

    #[test]
    fn test_parse_date_rejects_malformed() {
        for raw in [
            "",
            "2024-6-5",
            "2024/06/05",
            " 2024-06-05",
            "2024-06-05T00:00:00Z",
            "2023-02-29",
            "2024-13-01",
            "yesterday",
        ] {
            match parse_date(raw) {
                Err(StatsError::InvalidDateFormat(value)) => assert_eq!(value, raw),
                other => panic!("expected InvalidDateFormat for {raw:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_dedup_days_sorts_and_keeps_last() {
        let days = [
            ActivityDay::new(ymd(2024, 1, 3), 1),
            ActivityDay::new(ymd(2024, 1, 1), 7),
            ActivityDay::new(ymd(2024, 1, 3), 9),
            ActivityDay::new(ymd(2024, 1, 2), 0),
        ];
        assert_eq!(
            dedup_days(&days),
            vec![
                ActivityDay::new(ymd(2024, 1, 1), 7),
                ActivityDay::new(ymd(2024, 1, 2), 0),
                ActivityDay::new(ymd(2024, 1, 3), 9),
            ]
        );
    }

    #[test]
    fn test_range_display() {
        assert_eq!(StreakRange::NoActivity.to_string(), "No Activity");

        let single = StreakRange::Span {
            start: ymd(2024, 1, 4),
            end: ymd(2024, 1, 4),
        };
        assert_eq!(single.to_string(), "Jan 04");

        let span = StreakRange::Span {
            start: ymd(2024, 1, 1),
            end: ymd(2024, 1, 2),
        };
        assert_eq!(span.to_string(), "Jan 01 - Jan 02");
    }

    #[test]
    fn test_range_from_bounds() {
        assert!(StreakRange::from_bounds(None, Some(ymd(2024, 1, 1))).is_no_activity());
        assert!(StreakRange::from_bounds(Some(ymd(2024, 1, 1)), None).is_no_activity());
        let day = Some(ymd(2024, 1, 1));
        assert!(!StreakRange::from_bounds(day, day).is_no_activity());
    }

    #[test]
    fn test_range_serializes_as_display_text() {
        let span = StreakRange::Span {
            start: ymd(2024, 3, 9),
            end: ymd(2024, 3, 12),
        };
        assert_eq!(serde_json::to_string(&span).unwrap(), "\"Mar 09 - Mar 12\"");
        assert_eq!(
            serde_json::to_string(&StreakRange::NoActivity).unwrap(),
            "\"No Activity\""
        );
    }
}
