use serde::Serialize;
use std::fmt;
use tracing::debug;

const COMMITS_MEDIAN_ALL_TIME: f64 = 100.0;
const COMMITS_MEDIAN_RECENT: f64 = 50.0;
const COMMITS_WEIGHT: f64 = 2.0;
const PRS_MEDIAN: f64 = 5.0;
const PRS_WEIGHT: f64 = 3.0;
const ISSUES_MEDIAN: f64 = 5.0;
const ISSUES_WEIGHT: f64 = 1.0;
const REVIEWS_MEDIAN: f64 = 1.0;
const REVIEWS_WEIGHT: f64 = 1.0;
const STARS_MEDIAN: f64 = 5.0;
const STARS_WEIGHT: f64 = 4.0;
const FOLLOWERS_MEDIAN: f64 = 2.0;
const FOLLOWERS_WEIGHT: f64 = 1.0;

const TOTAL_WEIGHT: f64 =
    COMMITS_WEIGHT + PRS_WEIGHT + ISSUES_WEIGHT + REVIEWS_WEIGHT + STARS_WEIGHT + FOLLOWERS_WEIGHT;

/// Upper percentile bound for each grade, best first.
const GRADE_THRESHOLDS: [(f64, Grade); 8] = [
    (1.0, Grade::S),
    (12.5, Grade::APlus),
    (25.0, Grade::A),
    (37.5, Grade::AMinus),
    (50.0, Grade::BPlus),
    (62.5, Grade::B),
    (75.0, Grade::BMinus),
    (87.5, Grade::CPlus),
];

/// Aggregate profile counters used for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RankInput {
    /// Selects the all-time commit median (100) instead of the recent one (50).
    pub all_time_commits: bool,
    pub commits: u64,
    pub pull_requests: u64,
    pub issues: u64,
    pub reviews: u64,
    /// Carried for display only; does not affect the score.
    pub repo_count: u64,
    /// Carried for display only; does not affect the score.
    pub contributed_to: u64,
    pub stars: u64,
    pub followers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum Grade {
    S,
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
}

impl Grade {
    /// First grade whose bound is not exceeded by `percentile`.
    pub fn from_percentile(percentile: f64) -> Self {
        GRADE_THRESHOLDS
            .iter()
            .find(|(bound, _)| percentile <= *bound)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::C)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::S => "S",
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::AMinus => "A-",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::BMinus => "B-",
            Grade::CPlus => "C+",
            Grade::C => "C",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Grade> for String {
    fn from(grade: Grade) -> Self {
        grade.as_str().to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankResult {
    /// Share of users ranked above this profile, 0 (best) to 100.
    pub percentile: f64,
    pub grade: Grade,
}

fn exponential_cdf(x: f64) -> f64 {
    1.0 - 2f64.powf(-x)
}

fn log_normal_cdf(x: f64) -> f64 {
    x / (1.0 + x)
}

fn ratio(value: u64, median: f64) -> f64 {
    value as f64 / median
}

pub fn calculate_rank(input: &RankInput) -> RankResult {
    let commits_median = if input.all_time_commits {
        COMMITS_MEDIAN_ALL_TIME
    } else {
        COMMITS_MEDIAN_RECENT
    };

    let weighted = COMMITS_WEIGHT * exponential_cdf(ratio(input.commits, commits_median))
        + PRS_WEIGHT * exponential_cdf(ratio(input.pull_requests, PRS_MEDIAN))
        + ISSUES_WEIGHT * exponential_cdf(ratio(input.issues, ISSUES_MEDIAN))
        + REVIEWS_WEIGHT * exponential_cdf(ratio(input.reviews, REVIEWS_MEDIAN))
        + STARS_WEIGHT * log_normal_cdf(ratio(input.stars, STARS_MEDIAN))
        + FOLLOWERS_WEIGHT * log_normal_cdf(ratio(input.followers, FOLLOWERS_MEDIAN));

    let percentile = ((1.0 - weighted / TOTAL_WEIGHT) * 100.0).clamp(0.0, 100.0);
    let grade = Grade::from_percentile(percentile);

    debug!(component = "rank", percentile, grade = %grade, "Rank computed");

    RankResult { percentile, grade }
}
