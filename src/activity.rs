use tracing::debug;

use crate::domain::{ActivityDay, CodingDay, DailyStat};
use crate::series::DateSeries;
use crate::utils::{first_non_empty, format_duration};

/// Aligns commit counts and coding time onto `window`.
///
/// The output always holds exactly one record per window day, ascending.
/// Each source only writes its own field, so a day with commits but no coding
/// time keeps `coding_seconds == 0.0` and vice versa. Records dated outside
/// the window are dropped; repeated dates within a source keep the last value.
pub fn merge_activity(
    window: &DateSeries,
    commits: &[ActivityDay],
    coding: &[CodingDay],
) -> Vec<DailyStat> {
    let mut stats = window.zero_filled();
    let mut dropped = 0usize;

    for day in commits {
        match window.index_of(day.date) {
            Some(idx) => stats[idx].commits = day.count,
            None => dropped += 1,
        }
    }

    for day in coding {
        match window.index_of(day.date) {
            Some(idx) => stats[idx].coding_seconds = day.seconds,
            None => dropped += 1,
        }
    }

    debug!(
        component = "activity_merge",
        window_days = window.len(),
        commit_records = commits.len(),
        coding_records = coding.len(),
        dropped,
        "Activity series merged"
    );

    stats
}

/// Label for total coded time: the precomputed upstream text when it has one,
/// otherwise the window's summed coding time.
pub fn coded_time_label(precomputed: Option<&str>, series: &[DailyStat]) -> String {
    if let Some(text) = first_non_empty([precomputed]) {
        return text.to_string();
    }

    let total: f64 = series.iter().map(|s| s.coding_seconds).sum();
    format_duration(total)
}
