//! Time windows for slicing the log history into per-month sheets.

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone, Utc};

/// Days roll over at 16:00 UTC so late-night games count toward the previous
/// pug night.
pub const DAY_END_HOUR_UTC: u32 = 16;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Inclusive unix-timestamp range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBounds {
    pub start: i64,
    pub end: i64,
}

impl TimeBounds {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn for_day(year: i32, month: u32, day: u32) -> Result<Self> {
        let start = day_boundary(year, month, day)?;
        Ok(Self {
            start,
            end: start + SECONDS_PER_DAY,
        })
    }

    pub fn for_month(year: i32, month: u32) -> Result<Self> {
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        Ok(Self {
            start: day_boundary(year, month, 1)?,
            end: day_boundary(next_year, next_month, 1)?,
        })
    }

    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

fn day_boundary(year: i32, month: u32, day: u32) -> Result<i64> {
    let moment = Utc
        .with_ymd_and_hms(year, month, day, DAY_END_HOUR_UTC, 0, 0)
        .single()
        .with_context(|| format!("invalid date {year}-{month:02}-{day:02}"))?;
    Ok(moment.timestamp())
}

/// Worksheet label for a month window, e.g. "June 2018".
pub fn month_label(year: i32, month: u32) -> Result<String> {
    let date = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("invalid month {year}-{month:02}"))?;
    Ok(date.format("%B %Y").to_string())
}
