//! Next-run computation for recurring reports and backups
//!
//! The computed timestamp is always strictly after `now`; callers rely on
//! that to keep schedules advancing regardless of run outcome.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{FinReportError, FinReportResult};

/// How often a schedule fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Frequency {
    /// Parse a frequency from its lowercase name
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        };
        write!(f, "{}", s)
    }
}

/// Parse a `HH:MM` (24-hour) time-of-day string
///
/// Shared by next-run computation and by the schedule/backup stores,
/// which validate patched time strings before persisting them.
pub fn parse_time_of_day(time: &str) -> FinReportResult<NaiveTime> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| FinReportError::Validation(format!("Invalid time of day: {:?}", time)))
}

/// Compute the next execution instant for a schedule
///
/// `time` is `HH:MM` (24-hour). `day_of_week` defaults to Monday,
/// `day_of_month` to 1. Rules:
///
/// - daily: tomorrow at the configured time
/// - weekly: the next matching weekday at the configured time, rolling one
///   day first when today's slot has already passed (an exact-now tick
///   counts as passed)
/// - monthly: the configured day of this month, or next month when that
///   slot has passed; overflowing days clamp to month end
/// - quarterly: day 1 of the next quarter-start month
/// - yearly: January 1, or next year's when passed
///
/// The result is strictly after `now` for every valid input.
pub fn calculate_next_run(
    now: DateTime<Utc>,
    frequency: Frequency,
    time: &str,
    day_of_week: Option<Weekday>,
    day_of_month: Option<u32>,
) -> FinReportResult<DateTime<Utc>> {
    let tod = parse_time_of_day(time)?;

    let mut candidate = at_time(now.date_naive(), tod);

    match frequency {
        Frequency::Daily => {
            candidate += Duration::days(1);
        }
        Frequency::Weekly => {
            if candidate <= now {
                candidate += Duration::days(1);
            }
            let target = day_of_week.unwrap_or(Weekday::Mon);
            while candidate.weekday() != target {
                candidate += Duration::days(1);
            }
        }
        Frequency::Monthly => {
            if candidate <= now {
                candidate += Duration::days(1);
            }
            let dom = day_of_month.unwrap_or(1).max(1);
            let date = candidate.date_naive();
            candidate = at_time(with_day_clamped(date.year(), date.month(), dom), tod);
            if candidate <= now {
                let (year, month) = next_month(date.year(), date.month());
                candidate = at_time(with_day_clamped(year, month, dom), tod);
            }
        }
        Frequency::Quarterly => {
            // Next quarter-start month: ((month0 / 3) + 1) * 3, rolling the year
            let month0 = now.month0();
            let mut year = now.year();
            let mut quarter_month0 = (month0 / 3 + 1) * 3;
            if quarter_month0 >= 12 {
                quarter_month0 -= 12;
                year += 1;
            }
            candidate = at_time(with_day_clamped(year, quarter_month0 + 1, 1), tod);
        }
        Frequency::Yearly => {
            candidate = at_time(with_day_clamped(now.year(), 1, 1), tod);
            if candidate <= now {
                candidate = at_time(with_day_clamped(now.year() + 1, 1, 1), tod);
            }
        }
    }

    debug_assert!(candidate > now);
    Ok(candidate)
}

/// Convert a stored day-of-week index (0 = Sunday .. 6 = Saturday) to a
/// chrono weekday
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    match index {
        0 => Some(Weekday::Sun),
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        _ => None,
    }
}

fn at_time(date: NaiveDate, tod: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(tod))
}

/// Build a date, clamping the day to the month's length (Feb 31 -> Feb 28/29)
fn with_day_clamped(year: i32, month: u32, day: u32) -> NaiveDate {
    let last = days_in_month(year, month);
    NaiveDate::from_ymd_opt(year, month, day.min(last))
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, month, 1).unwrap())
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
        .day()
}
