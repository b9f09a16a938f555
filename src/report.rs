use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::activity::{coded_time_label, merge_activity};
use crate::args::{Args, Command};
use crate::config::Settings;
use crate::domain::DailyStat;
use crate::error::StatsError;
use crate::music::{build_dashboard, DashboardSources, MusicDashboard, Period};
use crate::payload;
use crate::rank::{calculate_rank, RankInput, RankResult};
use crate::repo::{build_repo_card, RepoCard};
use crate::series::DateSeries;
use crate::streak::{calculate_streak, StreakResult};
use crate::utils::{first_non_empty, format_compact, format_duration, format_number};

#[derive(Debug, Clone, Serialize)]
pub struct StreakReport {
    pub source: PathBuf,
    #[serde(flatten)]
    pub result: StreakResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankReport {
    pub counters: RankInput,
    #[serde(flatten)]
    pub result: RankResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityReport {
    pub user: String,
    pub wakatime_user: String,
    pub coded_time: String,
    pub days: Vec<DailyStat>,
}

/// Options for the activity report, mirroring the `activity` subcommand.
#[derive(Debug, Clone, Default)]
pub struct ActivityRequest<'a> {
    pub user: &'a str,
    pub waka_user: Option<&'a str>,
    pub contributions: Option<&'a Path>,
    pub wakatime: Option<&'a Path>,
    pub all_time: Option<&'a Path>,
    pub days: u32,
}

/// Options for the listening dashboard, mirroring the `music` subcommand.
#[derive(Debug, Clone, Default)]
pub struct MusicRequest<'a> {
    pub user: &'a str,
    pub period: Period,
    pub recent: Option<&'a Path>,
    pub track_info: Option<&'a Path>,
    pub top_artists: Option<&'a Path>,
    pub top_albums: Option<&'a Path>,
}

fn read_payload(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read payload {:?}", path))
}

/// Reads and decodes a source whose absence the report can absorb. Read and
/// decode failures are logged and yield `None`.
fn read_optional<T>(
    path: &Path,
    component: &str,
    parse: impl FnOnce(&str) -> std::result::Result<T, StatsError>,
) -> Option<T> {
    let parsed = read_payload(path).and_then(|json| {
        parse(json.as_str()).with_context(|| format!("Invalid payload {:?}", path))
    });

    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            let reason = format!("{:#}", e);
            warn!(action = "parse", component, file_path = ?path, error = %reason, "Ignoring unusable payload");
            None
        }
    }
}

pub fn run(args: &Args) -> Result<()> {
    let settings = Settings::from_args(args)?;
    info!(action = "configure", component = "settings", today = %settings.today, workers = settings.workers, "Resolved settings");

    match &args.command {
        Command::Streak { files } => {
            let reports = streak_reports(files, &settings)?;
            if settings.json {
                print_json(&reports)
            } else {
                reports.iter().for_each(print_streak_report);
                Ok(())
            }
        }
        Command::Rank {
            profile,
            total_commits,
            recent_commits,
            commits,
            prs,
            issues,
            reviews,
            repos,
            stars,
            followers,
        } => {
            let counters = match profile {
                Some(profile) => {
                    let commits = match total_commits {
                        Some(path) => payload::parse_total_commits(&read_payload(path)?)
                            .with_context(|| format!("Invalid commit search payload {:?}", path))?,
                        None => *commits,
                    };
                    payload::parse_profile_stats(&read_payload(profile)?, commits, !*recent_commits)
                        .with_context(|| format!("Invalid profile payload {:?}", profile))?
                }
                None => RankInput {
                    all_time_commits: !*recent_commits,
                    commits: *commits,
                    pull_requests: *prs,
                    issues: *issues,
                    reviews: *reviews,
                    repo_count: *repos,
                    contributed_to: 0,
                    stars: *stars,
                    followers: *followers,
                },
            };

            let report = rank_report(counters);
            if settings.json {
                print_json(&report)
            } else {
                print_rank_report(&report);
                Ok(())
            }
        }
        Command::Activity {
            user,
            waka_user,
            contributions,
            wakatime,
            all_time,
            days,
        } => {
            let request = ActivityRequest {
                user: user.as_str(),
                waka_user: waka_user.as_deref(),
                contributions: contributions.as_deref(),
                wakatime: wakatime.as_deref(),
                all_time: all_time.as_deref(),
                days: *days,
            };
            let report = activity_report(&request, settings.today)?;
            if settings.json {
                print_json(&report)
            } else {
                print_activity_report(&report);
                Ok(())
            }
        }
        Command::Music {
            user,
            period,
            recent,
            track_info,
            top_artists,
            top_albums,
            now,
        } => {
            let now = match now {
                Some(ts) => DateTime::from_timestamp(*ts, 0)
                    .with_context(|| format!("--now is out of range: {}", ts))?,
                None => Utc::now(),
            };
            let request = MusicRequest {
                user: user.as_str(),
                period: Period::from_param(period),
                recent: recent.as_deref(),
                track_info: track_info.as_deref(),
                top_artists: top_artists.as_deref(),
                top_albums: top_albums.as_deref(),
            };
            let report = music_report(&request, now)?;
            if settings.json {
                print_json(&report)
            } else {
                print_music_report(&report);
                Ok(())
            }
        }
        Command::Pin {
            repository,
            show_description,
        } => {
            let report = pin_report(repository, *show_description)?;
            if settings.json {
                print_json(&report)
            } else {
                print_pin_report(&report);
                Ok(())
            }
        }
    }
}

/// Computes one streak per calendar payload on a dedicated worker pool.
/// Reports come back in the order the files were given.
pub fn streak_reports(files: &[PathBuf], settings: &Settings) -> Result<Vec<StreakReport>> {
    let start_time = Instant::now();
    info!(action = "start", component = "streak", file_count = files.len(), worker_count = settings.workers, "Computing streaks");

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.workers)
        .build()
        .context("Failed to build worker pool")?;

    let reports = pool.install(|| {
        files
            .par_iter()
            .map(|path| -> Result<StreakReport> {
                let json = read_payload(path)?;
                let days = payload::parse_contribution_calendar(&json)
                    .with_context(|| format!("Invalid contribution payload {:?}", path))?;
                if days.is_empty() {
                    warn!(action = "parse", component = "streak", file_path = ?path, "Payload has no contribution days");
                }
                Ok(StreakReport {
                    source: path.clone(),
                    result: calculate_streak(&days, settings.today),
                })
            })
            .collect::<Result<Vec<_>>>()
    })?;

    info!(
        action = "complete",
        component = "streak",
        file_count = reports.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Streaks computed"
    );
    Ok(reports)
}

pub fn rank_report(counters: RankInput) -> RankReport {
    let result = calculate_rank(&counters);
    info!(action = "complete", component = "rank", percentile = result.percentile, grade = %result.grade, "Rank computed");
    RankReport { counters, result }
}

/// Builds the aligned activity series. Each source is optional; a missing
/// source leaves its field zeroed for every day. The contribution calendar is
/// required once given, while unusable WakaTime payloads are logged and
/// treated as absent.
pub fn activity_report(request: &ActivityRequest<'_>, today: NaiveDate) -> Result<ActivityReport> {
    let start_time = Instant::now();
    let wakatime_user = first_non_empty([request.waka_user, Some(request.user)])
        .unwrap_or_default()
        .to_string();
    info!(action = "start", component = "activity", user = request.user, wakatime_user = %wakatime_user, days = request.days, "Building activity series");

    let commits = match request.contributions {
        Some(path) => payload::parse_contribution_calendar(&read_payload(path)?)
            .with_context(|| format!("Invalid contribution payload {:?}", path))?,
        None => Vec::new(),
    };

    let coding = request
        .wakatime
        .and_then(|path| read_optional(path, "wakatime", payload::parse_wakatime_summaries))
        .unwrap_or_default();

    let all_time = request
        .all_time
        .and_then(|path| read_optional(path, "wakatime", payload::parse_wakatime_all_time))
        .flatten();

    let window = DateSeries::ending_at(today, request.days);
    let days = merge_activity(&window, &commits, &coding);
    let precomputed = all_time.as_ref().map(|summary| summary.text.as_str());
    let coded_time = coded_time_label(precomputed, &days);

    info!(
        action = "complete",
        component = "activity",
        window_days = days.len(),
        duration_ms = start_time.elapsed().as_millis(),
        "Activity series built"
    );

    Ok(ActivityReport {
        user: request.user.to_string(),
        wakatime_user,
        coded_time,
        days,
    })
}

/// Builds the listening dashboard. Chart payloads are required once given;
/// the track play count falls back to zero when its payload is unusable.
pub fn music_report(request: &MusicRequest<'_>, now: DateTime<Utc>) -> Result<MusicDashboard> {
    info!(action = "start", component = "music", user = request.user, period = request.period.as_param(), "Building music dashboard");

    let recent = match request.recent {
        Some(path) => payload::parse_lastfm_recent_track(&read_payload(path)?)
            .with_context(|| format!("Invalid recent tracks payload {:?}", path))?,
        None => None,
    };

    // Play counts are only looked up for an actual track.
    let user_play_count = match (&recent, request.track_info) {
        (Some(_), Some(path)) => {
            read_optional(path, "music", payload::parse_lastfm_track_play_count).unwrap_or(0)
        }
        _ => 0,
    };

    let artists = match request.top_artists {
        Some(path) => payload::parse_lastfm_top_artists(&read_payload(path)?)
            .with_context(|| format!("Invalid top artists payload {:?}", path))?,
        None => Vec::new(),
    };

    let albums = match request.top_albums {
        Some(path) => payload::parse_lastfm_top_albums(&read_payload(path)?)
            .with_context(|| format!("Invalid top albums payload {:?}", path))?,
        None => Vec::new(),
    };

    let sources = DashboardSources {
        user: request.user,
        period: request.period,
        recent: recent.as_ref(),
        user_play_count,
        artists: &artists,
        albums: &albums,
    };
    let dashboard = build_dashboard(&sources, now);

    info!(
        action = "complete",
        component = "music",
        is_playing = dashboard.current_track.is_playing,
        artist_count = dashboard.top_artists.len(),
        album_count = dashboard.top_albums.len(),
        "Music dashboard built"
    );
    Ok(dashboard)
}

pub fn pin_report(path: &Path, show_description: bool) -> Result<RepoCard> {
    let repo = payload::parse_repository(&read_payload(path)?)
        .with_context(|| format!("Invalid repository payload {:?}", path))?;
    let card = build_repo_card(&repo, show_description);
    info!(action = "complete", component = "pin", repository = %card.name, stars = %card.stars, forks = %card.forks, "Repository card built");
    Ok(card)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
    println!("{}", rendered);
    Ok(())
}

pub fn print_streak_report(report: &StreakReport) {
    let result = &report.result;

    println!("\n--- Streak: {} ---", report.source.display());
    println!(
        "Contributions this year: {}",
        format_number(result.total_count_in_year)
    );
    println!(
        "Current streak: {} ({})",
        format_number(u64::from(result.current_streak)),
        result.current_streak_range
    );
    println!(
        "Longest streak: {} ({})",
        format_number(u64::from(result.longest_streak)),
        result.longest_streak_range
    );
}

pub fn print_rank_report(report: &RankReport) {
    let counters = &report.counters;

    println!("\n--- Rank ---");
    println!("Grade: {} (top {:.1}%)", report.result.grade, report.result.percentile);
    println!("Commits: {}", format_compact(counters.commits));
    println!("Pull requests: {}", format_compact(counters.pull_requests));
    println!("Issues: {}", format_compact(counters.issues));
    println!("Reviews: {}", format_compact(counters.reviews));
    println!("Stars: {}", format_compact(counters.stars));
    println!("Followers: {}", format_compact(counters.followers));
    if counters.contributed_to > 0 {
        println!("Contributed to: {}", format_compact(counters.contributed_to));
    }
}

pub fn print_activity_report(report: &ActivityReport) {
    println!("\n--- Activity: {} (WakaTime: {}) ---", report.user, report.wakatime_user);
    println!("Coded time: {}", report.coded_time);
    for day in &report.days {
        println!(
            "- {}: {} commits, {}",
            day.date.format("%a %b %d"),
            format_number(u64::from(day.commits)),
            format_duration(day.coding_seconds)
        );
    }
}

pub fn print_music_report(report: &MusicDashboard) {
    let track = &report.current_track;

    println!("\n--- Music: {} ({}) ---", report.user, report.period);
    println!("{}: {} - {}", track.time_ago, track.title, track.artist);
    if !track.album.is_empty() {
        println!("Album: {}", track.album);
    }
    if track.user_play_count > 0 {
        println!("Your plays: {}", format_number(u64::from(track.user_play_count)));
    }

    println!("Top artists:");
    for item in &report.top_artists {
        println!("- {} ({})", item.title, item.subtitle);
    }
    println!("Top albums:");
    for item in &report.top_albums {
        let plays = item.extra.as_deref().unwrap_or_default();
        println!("- {} by {} ({})", item.title, item.subtitle, plays);
    }
}

pub fn print_pin_report(report: &RepoCard) {
    println!("\n--- Repository: {} ---", report.name);
    for line in &report.description_lines {
        println!("{}", line);
    }
    println!("Language: {} ({})", report.language, report.language_color);
    println!("Stars: {}", report.stars);
    println!("Forks: {}", report.forks);
}
