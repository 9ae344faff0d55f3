/*
 * Galileo Network Analytics (GNA) Toolkit
 *
 * Copyright 2024-2025 Fidelis Farm & Technologies, LLC
 * All Rights Reserved.
 * See license information in LICENSE.
 */

use chrono::{DateTime, TimeDelta, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Error;

lazy_static! {
    static ref TIME_RANGE: Regex = Regex::new(r"^(\d+)([dDwWsSmMhH])$").unwrap();
}

/// Sampling step requested for every range query, independent of window size.
pub const STEP_SECONDS: i64 = 10 * 60;

#[derive(Debug, Clone, PartialEq)]
pub enum TimeUnit {
    SECOND,
    MINUTE,
    HOUR,
    DAY,
    WEEK,
}

impl TimeUnit {
    pub fn seconds(&self) -> i64 {
        match self {
            TimeUnit::SECOND => 1,
            TimeUnit::MINUTE => 60,
            TimeUnit::HOUR => 60 * 60,
            TimeUnit::DAY => 24 * 60 * 60,
            TimeUnit::WEEK => 7 * 24 * 60 * 60,
        }
    }
}

pub fn parse_time_unit(unit_string: &str) -> Result<TimeUnit, Error> {
    match unit_string {
        "s" | "S" => Ok(TimeUnit::SECOND),
        "m" | "M" => Ok(TimeUnit::MINUTE),
        "h" | "H" => Ok(TimeUnit::HOUR),
        "d" | "D" => Ok(TimeUnit::DAY),
        "w" | "W" => Ok(TimeUnit::WEEK),
        _ => Err(Error::other(format!("invalid time unit: {}", unit_string))),
    }
}

/// Parses `<integer><unit>` (e.g. `29d`, `6H`) into a duration.
pub fn parse_time_range(range_string: &str) -> Result<TimeDelta, Error> {
    let captures = TIME_RANGE
        .captures(range_string)
        .ok_or_else(|| Error::other(format!("invalid time range format: {}", range_string)))?;

    // digits are guaranteed by the pattern, so only overflow can fail here
    let value = captures[1].parse::<i64>().map_err(|e| {
        Error::other(format!("invalid time range value {}: {}", &captures[1], e))
    })?;
    let unit = parse_time_unit(&captures[2])?;

    value
        .checked_mul(unit.seconds())
        .and_then(TimeDelta::try_seconds)
        .ok_or_else(|| Error::other(format!("time range out of bounds: {}", range_string)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: TimeDelta,
}

impl TimeWindow {
    pub fn ending_at(end: DateTime<Utc>, range_string: &str) -> Result<Self, Error> {
        let duration = parse_time_range(range_string)?;
        let start = end
            .checked_sub_signed(duration)
            .ok_or_else(|| Error::other(format!("time range out of bounds: {}", range_string)))?;

        Ok(Self {
            start,
            end,
            step: TimeDelta::seconds(STEP_SECONDS),
        })
    }

    pub fn ending_now(range_string: &str) -> Result<Self, Error> {
        Self::ending_at(Utc::now(), range_string)
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

#[cfg(test)]
#[path = "timerange_test.rs"]
mod tests;
