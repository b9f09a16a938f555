use chrono::{Days, NaiveDate};

use crate::domain::DailyStat;

/// A gap-free, ascending run of calendar days ending at a fixed date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSeries {
    dates: Vec<NaiveDate>,
}

impl DateSeries {
    /// Covers `end - (days - 1)` through `end` inclusive. A zero-length window
    /// is treated as "today only" and yields the single day `end`.
    pub fn ending_at(end: NaiveDate, days: u32) -> Self {
        let days = days.max(1);
        let start = end
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .unwrap_or(NaiveDate::MIN);

        let dates: Vec<NaiveDate> = start.iter_days().take_while(|d| *d <= end).collect();
        Self { dates }
    }

    pub fn start(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn end(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.end()
    }

    /// Position of `date` within the window, or `None` when it falls outside.
    pub fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if !self.contains(date) {
            return None;
        }
        usize::try_from((date - self.start()).num_days()).ok()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// One zeroed record per day, ascending.
    pub fn zero_filled(&self) -> Vec<DailyStat> {
        self.dates.iter().copied().map(DailyStat::empty).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_is_complete_and_ascending() {
        let end = ymd(2024, 3, 2);
        for days in [1u32, 2, 7, 30, 366] {
            let series = DateSeries::ending_at(end, days);
            assert_eq!(series.len(), days as usize);
            assert_eq!(series.end(), end);
            for pair in series.dates().windows(2) {
                assert_eq!(pair[0].succ_opt().unwrap(), pair[1]);
            }
        }
    }

    #[test]
    fn test_window_crosses_leap_day() {
        let series = DateSeries::ending_at(ymd(2024, 3, 1), 3);
        assert_eq!(
            series.dates(),
            &[ymd(2024, 2, 28), ymd(2024, 2, 29), ymd(2024, 3, 1)]
        );
    }

    #[test]
    fn test_zero_days_means_today_only() {
        let series = DateSeries::ending_at(ymd(2024, 6, 7), 0);
        assert_eq!(series.dates(), &[ymd(2024, 6, 7)]);
    }

    #[test]
    fn test_index_of() {
        let series = DateSeries::ending_at(ymd(2024, 6, 7), 7);
        assert_eq!(series.start(), ymd(2024, 6, 1));
        assert_eq!(series.index_of(ymd(2024, 6, 1)), Some(0));
        assert_eq!(series.index_of(ymd(2024, 6, 7)), Some(6));
        assert_eq!(series.index_of(ymd(2024, 5, 31)), None);
        assert_eq!(series.index_of(ymd(2024, 6, 8)), None);
    }

    #[test]
    fn test_zero_filled() {
        let stats = DateSeries::ending_at(ymd(2024, 6, 7), 3).zero_filled();
        assert_eq!(stats.len(), 3);
        assert!(stats
            .iter()
            .all(|s| s.commits == 0 && s.coding_seconds == 0.0));
        assert_eq!(stats[0].date, ymd(2024, 6, 5));
    }
}
