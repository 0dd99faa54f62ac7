//! Day/night window resolution.
//!
//! All values are time-of-day only; the date component never takes part in
//! the comparison.

use std::fmt;

use chrono::{NaiveTime, Timelike};
use thiserror::Error;

const TIME_OF_DAY_FORMAT: &str = "%H:%M";

pub type ScheduleResult<T> = std::result::Result<T, ScheduleError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("invalid time of day {value:?}, expected HH:mm")]
    InvalidTime { value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    Day,
    Night,
}

impl Window {
    pub fn opposite(self) -> Self {
        match self {
            Window::Day => Window::Night,
            Window::Night => Window::Day,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Day => f.write_str("day"),
            Window::Night => f.write_str("night"),
        }
    }
}

/// Decide which window is in effect at `now`.
///
/// `day <= now < night` is day, everything else is night. The instant equal
/// to `day` is always day, so with `day == night` only that single instant
/// resolves to day.
pub fn resolve(now: NaiveTime, day: NaiveTime, night: NaiveTime) -> Window {
    if now == day || (day <= now && now < night) {
        Window::Day
    } else {
        Window::Night
    }
}

pub fn parse_time_of_day(value: &str) -> ScheduleResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_OF_DAY_FORMAT).map_err(|_| {
        ScheduleError::InvalidTime {
            value: value.to_string(),
        }
    })
}

pub trait Clock {
    fn now(&self) -> NaiveTime;
}

/// Local wall clock, truncated to whole seconds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveTime {
        let now = chrono::Local::now().time();
        now.with_nanosecond(0).unwrap_or(now)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveTime {
        self.0
    }
}
