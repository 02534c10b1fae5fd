//! Working-hours evaluation.

use std::collections::BTreeSet;

use chrono::{Datelike, Local, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::responder::settings::{self, Settings};

/// Format used to store and display working-hour bounds.
pub const TIME_FORMAT: &str = "%H:%M";

/// Source of the current wall-clock time.
#[derive(Debug, Clone)]
pub enum Clock {
    /// Server local time.
    Local,
    /// Wall-clock time in a fixed IANA zone.
    Zone(Tz),
    /// Frozen time.
    #[cfg(test)]
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::Local => Local::now().naive_local(),
            Clock::Zone(tz) => Utc::now().with_timezone(tz).naive_local(),
            #[cfg(test)]
            Clock::Fixed(at) => *at,
        }
    }
}

/// Parse an `HH:MM` time. Single-digit hours are accepted.
pub fn parse_time(input: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), TIME_FORMAT).ok()
}

/// Parsed form of the schedule settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSchedule {
    /// ISO weekdays, 1 = Monday .. 7 = Sunday.
    pub days: BTreeSet<u32>,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl WorkSchedule {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            days: parse_days(&settings.working_days),
            start: time_or_default(settings::WORK_START, &settings.work_start),
            end: time_or_default(settings::WORK_END, &settings.work_end),
        }
    }

    /// True when `now` falls on a working day and inside `[start, end]`.
    ///
    /// If `end` is earlier than `start` the window wraps past midnight,
    /// e.g. 22:00-06:00 matches 23:30 and 05:00. The weekday is always
    /// that of `now`.
    pub fn contains(&self, now: NaiveDateTime) -> bool {
        let weekday = now.weekday().number_from_monday();
        if !self.days.contains(&weekday) {
            return false;
        }

        let time = now.time();
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }
}

/// Comma-separated weekday numbers. Anything that isn't 1-7 is skipped.
fn parse_days(raw: &str) -> BTreeSet<u32> {
    raw.split(',')
        .filter_map(|d| d.trim().parse::<u32>().ok())
        .filter(|d| (1..=7).contains(d))
        .collect()
}

fn time_or_default(key: &str, raw: &str) -> NaiveTime {
    if let Some(t) = parse_time(raw) {
        return t;
    }
    warn!("Stored {key} '{raw}' is not HH:MM, using default");
    settings::default_for(key)
        .and_then(parse_time)
        .unwrap_or(NaiveTime::MIN)
}
