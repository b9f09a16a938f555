pub mod activity;
pub mod args;
pub mod config;
pub mod domain;
pub mod error;
pub mod music;
pub mod payload;
pub mod rank;
pub mod repo;
pub mod report;
pub mod series;
pub mod streak;
pub mod utils;

pub use activity::{coded_time_label, merge_activity};
pub use args::Args;
pub use domain::{ActivityDay, CodingDay, DailyStat, StreakRange};
pub use error::StatsError;
pub use music::{build_dashboard, MusicDashboard, Period};
pub use rank::{calculate_rank, Grade, RankInput, RankResult};
pub use repo::{build_repo_card, RepoCard};
pub use series::DateSeries;
pub use streak::{calculate_streak, StreakResult};
