use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::domain::{dedup_days, ActivityDay, StreakRange};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreakResult {
    pub total_count_in_year: u64,
    pub current_streak: u32,
    pub current_streak_range: StreakRange,
    pub longest_streak: u32,
    pub longest_streak_range: StreakRange,
}

impl Default for StreakResult {
    fn default() -> Self {
        Self {
            total_count_in_year: 0,
            current_streak: 0,
            current_streak_range: StreakRange::NoActivity,
            longest_streak: 0,
            longest_streak_range: StreakRange::NoActivity,
        }
    }
}

/// Computes year-to-date total, current streak and longest streak relative to
/// `today`. Input order does not matter; repeated dates keep the last entry.
pub fn calculate_streak(days: &[ActivityDay], today: NaiveDate) -> StreakResult {
    let days = dedup_days(days);

    if days.is_empty() {
        debug!(component = "streak", "No contribution history");
        return StreakResult::default();
    }

    let total_count_in_year = year_total(&days, today.year());
    let (longest_streak, longest_streak_range) = longest_run(&days);
    let (current_streak, current_streak_range) = if is_streak_active(&days, today) {
        current_run(&days, today)
    } else {
        (0, StreakRange::NoActivity)
    };

    debug!(
        component = "streak",
        day_count = days.len(),
        total_count_in_year,
        current_streak,
        longest_streak,
        "Streak computed"
    );

    StreakResult {
        total_count_in_year,
        current_streak,
        current_streak_range,
        longest_streak,
        longest_streak_range,
    }
}

fn year_total(days: &[ActivityDay], year: i32) -> u64 {
    days.iter()
        .filter(|d| d.date.year() == year)
        .map(|d| u64::from(d.count))
        .sum()
}

fn follows(prev: NaiveDate, next: NaiveDate) -> bool {
    prev.succ_opt() == Some(next)
}

/// Longest run of consecutive active days. A zero-count day or a missing
/// calendar day ends the run; ties keep the earliest run.
fn longest_run(days: &[ActivityDay]) -> (u32, StreakRange) {
    let mut longest = 0u32;
    let mut longest_start = None;
    let mut longest_end = None;

    let mut run = 0u32;
    let mut run_start = None;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        let contiguous = previous.map_or(true, |prev| follows(prev, day.date));
        if !day.is_active() || !contiguous {
            run = 0;
            run_start = None;
        }

        if day.is_active() {
            if run == 0 {
                run_start = Some(day.date);
            }
            run += 1;

            if run > longest {
                longest = run;
                longest_start = run_start;
                longest_end = Some(day.date);
            }
        }

        previous = Some(day.date);
    }

    (longest, StreakRange::from_bounds(longest_start, longest_end))
}

/// The streak is alive when the latest entry is active and dated today or
/// yesterday, or when today's entry is empty but yesterday's is active.
fn is_streak_active(days: &[ActivityDay], today: NaiveDate) -> bool {
    let yesterday = today.pred_opt();

    match days {
        [] => false,
        [.., second_last, last] => {
            (last.is_active() && (last.date == today || Some(last.date) == yesterday))
                || (second_last.is_active() && Some(second_last.date) == yesterday)
        }
        [last] => last.is_active() && (last.date == today || Some(last.date) == yesterday),
    }
}

/// Walks back from the latest entry. An empty entry for today is skipped since
/// today's data may not be reported yet; any other gap ends the walk.
fn current_run(days: &[ActivityDay], today: NaiveDate) -> (u32, StreakRange) {
    let mut streak = 0u32;
    let mut start = None;
    let mut end = None;

    for day in days.iter().rev() {
        if !day.is_active() {
            if day.date == today {
                continue;
            }
            break;
        }

        if let Some(earliest) = start {
            if !follows(day.date, earliest) {
                break;
            }
        }

        streak += 1;
        start = Some(day.date);
        if end.is_none() {
            end = Some(day.date);
        }
    }

    (streak, StreakRange::from_bounds(start, end))
}
