//! Listening dashboard derived from Last.fm: the most recent track and the
//! top artists and albums for a period.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Last.fm serves this image for entries that have no artwork.
pub const PLACEHOLDER_IMAGE_HASH: &str = "2a96cbd8b46e442fc41c2b86b821562f";

pub const TOP_ITEM_LIMIT: usize = 3;

/// Chart period accepted by the Last.fm top-items endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Overall,
    #[default]
    SevenDays,
    OneMonth,
    ThreeMonths,
    TwelveMonths,
}

impl Period {
    /// Unknown values fall back to the weekly chart.
    pub fn from_param(raw: &str) -> Self {
        match raw {
            "overall" => Period::Overall,
            "7day" => Period::SevenDays,
            "1month" => Period::OneMonth,
            "3month" => Period::ThreeMonths,
            "12month" => Period::TwelveMonths,
            _ => Period::SevenDays,
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            Period::Overall => "overall",
            Period::SevenDays => "7day",
            Period::OneMonth => "1month",
            Period::ThreeMonths => "3month",
            Period::TwelveMonths => "12month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Overall => "All Time",
            Period::SevenDays => "7 Days",
            Period::OneMonth => "1 Month",
            Period::ThreeMonths => "3 Months",
            Period::TwelveMonths => "1 Year",
        }
    }
}

/// Most recent scrobble as decoded from `user.getrecenttracks`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RecentTrack {
    pub name: String,
    pub artist: String,
    pub album: String,
    pub image_url: String,
    pub now_playing: bool,
    /// Unix seconds of the scrobble; absent while playing or when unparseable.
    pub played_at: Option<i64>,
}

/// One entry of a top-artists or top-albums chart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopItem {
    pub name: String,
    /// Album charts only.
    pub artist: Option<String>,
    pub image_url: String,
    pub play_count: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackStatus {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub cover_url: Option<String>,
    pub is_playing: bool,
    pub time_ago: String,
    pub user_play_count: u32,
}

impl TrackStatus {
    /// Shown when the user has never scrobbled anything.
    pub fn no_track() -> Self {
        Self {
            title: "No Track".to_string(),
            artist: "Unknown".to_string(),
            album: String::new(),
            cover_url: None,
            is_playing: false,
            time_ago: "Never".to_string(),
            user_play_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardItem {
    pub title: String,
    pub subtitle: String,
    pub extra: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MusicDashboard {
    pub user: String,
    pub period: String,
    pub current_track: TrackStatus,
    pub top_artists: Vec<DashboardItem>,
    pub top_albums: Vec<DashboardItem>,
}

/// Empty URLs and the placeholder artwork count as no image.
pub fn is_invalid_image(url: &str) -> bool {
    url.is_empty() || url.contains(PLACEHOLDER_IMAGE_HASH)
}

fn usable_image(url: &str) -> Option<String> {
    (!is_invalid_image(url)).then(|| url.to_string())
}

/// Relative age of a scrobble. Ages are truncated to whole units; a missing
/// timestamp yields an empty label.
pub fn time_ago(played_at: Option<i64>, now: DateTime<Utc>) -> String {
    let Some(played_at) = played_at.and_then(|uts| DateTime::from_timestamp(uts, 0)) else {
        return String::new();
    };

    let elapsed = now.signed_duration_since(played_at);
    let minutes = elapsed.num_minutes();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{} mins ago", minutes)
    } else if elapsed.num_hours() < 24 {
        format!("{} hours ago", elapsed.num_hours())
    } else {
        format!("{} days ago", elapsed.num_days())
    }
}

pub fn track_status(
    track: Option<&RecentTrack>,
    user_play_count: u32,
    now: DateTime<Utc>,
) -> TrackStatus {
    let Some(track) = track else {
        return TrackStatus::no_track();
    };

    let time_ago = if track.now_playing {
        "Now Playing".to_string()
    } else {
        time_ago(track.played_at, now)
    };

    TrackStatus {
        title: track.name.clone(),
        artist: track.artist.clone(),
        album: track.album.clone(),
        cover_url: usable_image(&track.image_url),
        is_playing: track.now_playing,
        time_ago,
        user_play_count,
    }
}

fn plays_label(play_count: &str) -> String {
    format!("{} plays", play_count)
}

pub fn artist_items(artists: &[TopItem]) -> Vec<DashboardItem> {
    artists
        .iter()
        .take(TOP_ITEM_LIMIT)
        .map(|artist| DashboardItem {
            title: artist.name.clone(),
            subtitle: plays_label(&artist.play_count),
            extra: None,
            image_url: usable_image(&artist.image_url),
        })
        .collect()
}

pub fn album_items(albums: &[TopItem]) -> Vec<DashboardItem> {
    albums
        .iter()
        .take(TOP_ITEM_LIMIT)
        .map(|album| DashboardItem {
            title: album.name.clone(),
            subtitle: album.artist.clone().unwrap_or_default(),
            extra: Some(plays_label(&album.play_count)),
            image_url: usable_image(&album.image_url),
        })
        .collect()
}

/// Everything the listening card shows, for a single user and period.
#[derive(Debug, Clone, Default)]
pub struct DashboardSources<'a> {
    pub user: &'a str,
    pub period: Period,
    pub recent: Option<&'a RecentTrack>,
    pub user_play_count: u32,
    pub artists: &'a [TopItem],
    pub albums: &'a [TopItem],
}

pub fn build_dashboard(sources: &DashboardSources<'_>, now: DateTime<Utc>) -> MusicDashboard {
    MusicDashboard {
        user: sources.user.to_string(),
        period: sources.period.label().to_string(),
        current_track: track_status(sources.recent, sources.user_play_count, now),
        top_artists: artist_items(sources.artists),
        top_albums: album_items(sources.albums),
    }
}
