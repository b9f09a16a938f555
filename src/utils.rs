use time::macros::format_description;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber. `RUST_LOG` takes precedence;
/// otherwise `--verbose` selects `info` and the default is `error`.
pub fn setup_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "error" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let timer = LocalTime::new(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(timer)
        .with_writer(std::io::stderr)
        .init();
}

pub fn format_number(num: u64) -> String {
    num.to_string()
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| std::str::from_utf8(chunk).unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}

/// Short form for card counters: `999`, `1.2k`, `15.0k`. Halves round up.
pub fn format_compact(num: u64) -> String {
    if num <= 999 {
        return num.to_string();
    }

    let tenths = (num as f64 / 100.0).round();
    format!("{:.1}k", tenths / 10.0)
}

/// `"N hrs M mins"`, dropping the hours part below one hour.
pub fn format_duration(seconds: f64) -> String {
    let total_minutes = if seconds.is_finite() && seconds > 0.0 {
        (seconds / 60.0).floor() as u64
    } else {
        0
    };
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    match hours {
        0 => format!("{} mins", minutes),
        1 => format!("1 hr {} mins", minutes),
        _ => format!("{} hrs {} mins", format_number(hours), minutes),
    }
}

/// First candidate that is present and not blank.
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_compact() {
        assert_eq!(format_compact(0), "0");
        assert_eq!(format_compact(999), "999");
        assert_eq!(format_compact(1000), "1.0k");
        assert_eq!(format_compact(1234), "1.2k");
        assert_eq!(format_compact(15_040), "15.0k");
        assert_eq!(format_compact(1250), "1.3k");
        assert_eq!(format_compact(999_999), "1000.0k");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0 mins");
        assert_eq!(format_duration(59.0), "0 mins");
        assert_eq!(format_duration(600.0), "10 mins");
        assert_eq!(format_duration(3600.0), "1 hr 0 mins");
        assert_eq!(format_duration(9000.0), "2 hrs 30 mins");
        assert_eq!(format_duration(f64::NAN), "0 mins");
        assert_eq!(format_duration(3_600_000.0), "1,000 hrs 0 mins");
    }

    #[test]
    fn test_first_non_empty() {
        assert_eq!(first_non_empty([None, Some(""), Some("octo")]), Some("octo"));
        assert_eq!(first_non_empty([Some("waka"), Some("octo")]), Some("waka"));
        assert_eq!(first_non_empty([Some(" "), None]), None);
        assert_eq!(first_non_empty(Vec::<Option<&str>>::new()), None);
    }
}
