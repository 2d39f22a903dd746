//! Parsing of compact time-range tokens such as `"230-320P"` or `"1030-1120"`.
//!
//! Times are kept as minutes since midnight. Source tokens do not always carry a
//! PM marker for afternoon and evening classes, so every endpoint goes through
//! [`correct_meridiem`] after it is resolved.

use serde::{Serialize, Serializer};
use std::fmt;

use super::error::{PlannerError, Result};

const MINUTES_PER_HOUR: u16 = 60;
const HALF_DAY: u16 = 12 * MINUTES_PER_HOUR;

/// Lower suspicious window, exclusive on both ends: 00:01 to 06:30.
const EARLY_WINDOW: (u16, u16) = (1, 6 * MINUTES_PER_HOUR + 30);
/// Upper suspicious window, exclusive on both ends: 22:30 to 23:59.
const LATE_WINDOW: (u16, u16) = (22 * MINUTES_PER_HOUR + 30, 23 * MINUTES_PER_HOUR + 59);

/// A wall-clock time of day, stored as minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    /// Creates a time from a 24-hour hour and minute.
    pub fn from_hm(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self(u16::from(hour) * MINUTES_PER_HOUR + u16::from(minute)))
        } else {
            None
        }
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u8 {
        (self.0 / MINUTES_PER_HOUR) as u8
    }

    pub fn minute(self) -> u8 {
        (self.0 % MINUTES_PER_HOUR) as u8
    }

    /// Swaps the AM/PM half of the day, keeping the 12-hour clock reading.
    pub fn flip_meridiem(self) -> Self {
        if self.0 < HALF_DAY {
            Self(self.0 + HALF_DAY)
        } else {
            Self(self.0 - HALF_DAY)
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:00", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

/// Returns true if `time` is an unlikely class time, i.e. the AM/PM label of the
/// source token was probably wrong.
pub fn is_suspicious(time: ClockTime) -> bool {
    let m = time.minutes();
    (EARLY_WINDOW.0 < m && m < EARLY_WINDOW.1) || (LATE_WINDOW.0 < m && m < LATE_WINDOW.1)
}

/// Flips the meridiem of a time that falls inside one of the suspicious windows.
///
/// The correction is applied once; the flipped value is not re-checked.
pub fn correct_meridiem(time: ClockTime) -> ClockTime {
    if is_suspicious(time) {
        time.flip_meridiem()
    } else {
        time
    }
}

/// A closed time interval on a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeRange {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeRange {
    /// Parses a raw range token like `"900-950"` or `"230-320P"`.
    ///
    /// A `P` marker places both endpoints in the afternoon before meridiem
    /// correction runs on each endpoint independently.
    pub fn parse(token: &str) -> Result<Self> {
        let trimmed = token.trim();
        let (body, meridiem) = match trimmed.strip_suffix('P') {
            Some(rest) => (rest.trim_end(), Meridiem::Pm),
            None => (trimmed, Meridiem::Am),
        };

        let (start, end) = body
            .split_once('-')
            .ok_or_else(|| PlannerError::malformed(token, "missing '-' separator"))?;

        Ok(Self {
            start: parse_endpoint(token, start.trim(), meridiem)?,
            end: parse_endpoint(token, end.trim(), meridiem)?,
        })
    }

    /// Closed-interval intersection. Ranges that only touch at a boundary
    /// still overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The `HH:MM:SS` start and end strings.
    pub fn normalized(&self) -> (String, String) {
        (self.start.to_string(), self.end.to_string())
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Resolves one `HMM`/`HHMM` clock number against a meridiem and corrects it.
fn parse_endpoint(token: &str, digits: &str, meridiem: Meridiem) -> Result<ClockTime> {
    let (hour, minute) = split_clock(token, digits)?;

    if !(1..=12).contains(&hour) {
        return Err(PlannerError::malformed(
            token,
            format!("hour {hour} is not on a 12-hour clock"),
        ));
    }
    if minute >= 60 {
        return Err(PlannerError::malformed(
            token,
            format!("minute {minute} out of range"),
        ));
    }

    let hour24 = match meridiem {
        Meridiem::Am => hour % 12,
        Meridiem::Pm => hour % 12 + 12,
    };
    let time = ClockTime::from_hm(hour24, minute)
        .ok_or_else(|| PlannerError::malformed(token, "time out of range"))?;

    Ok(correct_meridiem(time))
}

/// Splits a 3-digit number as 1+2 digits and a 4-digit number as 2+2.
fn split_clock(token: &str, digits: &str) -> Result<(u8, u8)> {
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PlannerError::malformed(
            token,
            format!("{digits:?} is not numeric"),
        ));
    }

    let split_at = match digits.len() {
        3 => 1,
        4 => 2,
        n => {
            return Err(PlannerError::malformed(
                token,
                format!("expected 3 or 4 digits, found {n}"),
            ))
        }
    };

    let (hour, minute) = digits.split_at(split_at);
    let hour = hour
        .parse::<u8>()
        .map_err(|e| PlannerError::malformed(token, e.to_string()))?;
    let minute = minute
        .parse::<u8>()
        .map_err(|e| PlannerError::malformed(token, e.to_string()))?;

    Ok((hour, minute))
}
