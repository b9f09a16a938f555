use anyhow::{Context, Result};
use chrono::{FixedOffset, NaiveDate, Utc};

use crate::args::{Args, Command};
use crate::domain::parse_date;

const MIN_UTC_OFFSET_HOURS: i32 = -12;
const MAX_UTC_OFFSET_HOURS: i32 = 14;
const MAX_DEFAULT_WORKERS: usize = 8;
const MAX_WINDOW_DAYS: u32 = 366;

/// Runtime settings resolved once from the command line and passed down
/// explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub today: NaiveDate,
    pub workers: usize,
    pub json: bool,
}

impl Settings {
    pub fn from_args(args: &Args) -> Result<Self> {
        validate_args(args)?;

        let today = match args.today.as_deref() {
            Some(raw) => parse_date(raw).context("--today must be a YYYY-MM-DD date")?,
            None => today_in_offset(args.utc_offset)?,
        };

        let workers = args
            .workers
            .unwrap_or_else(|| num_cpus::get().min(MAX_DEFAULT_WORKERS));

        Ok(Self {
            today,
            workers,
            json: args.json,
        })
    }
}

pub fn validate_args(args: &Args) -> Result<()> {
    if !(MIN_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&args.utc_offset) {
        anyhow::bail!(
            "--utc-offset must be between {} and {}",
            MIN_UTC_OFFSET_HOURS,
            MAX_UTC_OFFSET_HOURS
        );
    }

    if let Some(workers) = args.workers {
        if workers == 0 {
            anyhow::bail!("--workers must be greater than 0");
        }
    }

    if let Command::Activity { days, .. } = &args.command {
        if *days > MAX_WINDOW_DAYS {
            anyhow::bail!("--days must be at most {}", MAX_WINDOW_DAYS);
        }
    }

    Ok(())
}

/// Current calendar date in the reference time zone.
pub fn today_in_offset(offset_hours: i32) -> Result<NaiveDate> {
    let offset = FixedOffset::east_opt(offset_hours * 3600)
        .with_context(|| format!("Invalid UTC offset: {} hours", offset_hours))?;
    Ok(Utc::now().with_timezone(&offset).date_naive())
}
