use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "statcard",
    about = "Compute card statistics from GitHub, WakaTime and Last.fm payloads",
    version,
    long_about = None
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Reference time zone as a whole-hour UTC offset, used to determine "today"
    #[arg(long, global = true, default_value_t = 0, allow_hyphen_values = true)]
    pub utc_offset: i32,

    /// Override today's date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// Number of worker threads
    #[arg(short, long, global = true)]
    pub workers: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Current and longest contribution streaks, one per calendar payload
    Streak {
        /// GitHub contribution calendar payloads (JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Percentile rank and grade from profile counters
    Rank {
        /// GitHub profile stats payload (JSON); replaces the counter flags
        #[arg(
            long,
            conflicts_with_all = ["prs", "issues", "reviews", "repos", "stars", "followers"]
        )]
        profile: Option<PathBuf>,

        /// Commit search payload (JSON) providing the total commit count
        #[arg(long, requires = "profile", conflicts_with = "commits")]
        total_commits: Option<PathBuf>,

        /// Use the recent-commit median instead of the all-time one
        #[arg(long)]
        recent_commits: bool,

        #[arg(long, default_value_t = 0)]
        commits: u64,

        #[arg(long, default_value_t = 0)]
        prs: u64,

        #[arg(long, default_value_t = 0)]
        issues: u64,

        #[arg(long, default_value_t = 0)]
        reviews: u64,

        #[arg(long, default_value_t = 0)]
        repos: u64,

        #[arg(long, default_value_t = 0)]
        stars: u64,

        #[arg(long, default_value_t = 0)]
        followers: u64,
    },

    /// Daily commits and coding time aligned over a trailing window
    Activity {
        /// GitHub username
        #[arg(short, long)]
        user: String,

        /// WakaTime username, when it differs from the GitHub one
        #[arg(long)]
        waka_user: Option<String>,

        /// GitHub contribution calendar payload (JSON)
        #[arg(long)]
        contributions: Option<PathBuf>,

        /// WakaTime daily summaries payload (JSON)
        #[arg(long)]
        wakatime: Option<PathBuf>,

        /// WakaTime all-time payload (JSON)
        #[arg(long)]
        all_time: Option<PathBuf>,

        /// Window length in days; 0 means today only
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },

    /// Recent track and top charts from Last.fm
    Music {
        /// Last.fm username
        #[arg(short, long)]
        user: String,

        /// Chart period: overall, 7day, 1month, 3month or 12month
        #[arg(long, default_value = "7day")]
        period: String,

        /// user.getrecenttracks payload (JSON)
        #[arg(long)]
        recent: Option<PathBuf>,

        /// track.getInfo payload (JSON) for the recent track
        #[arg(long)]
        track_info: Option<PathBuf>,

        /// user.gettopartists payload (JSON)
        #[arg(long)]
        top_artists: Option<PathBuf>,

        /// user.gettopalbums payload (JSON)
        #[arg(long)]
        top_albums: Option<PathBuf>,

        /// Reference instant for time-ago labels, in Unix seconds
        #[arg(long, allow_hyphen_values = true)]
        now: Option<i64>,
    },

    /// Counters for a pinned repository card
    Pin {
        /// GitHub repository query payload (JSON)
        repository: PathBuf,

        /// Include the wrapped description
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        show_description: bool,
    },
}
