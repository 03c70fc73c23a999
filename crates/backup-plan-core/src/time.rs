// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Time-of-day codec.
//!
//! Backup times are written either as `HH:MM` (UTC) or as `HH:MM±HH` with a
//! whole-hour UTC offset, e.g. `11:12+03`. Output is always zero-padded.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// A UTC offset in whole hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct UtcOffset(i8);

impl UtcOffset {
    /// Coordinated Universal Time.
    pub const UTC: UtcOffset = UtcOffset(0);

    /// Westernmost accepted offset.
    pub const MIN_HOURS: i32 = -12;

    /// Easternmost accepted offset.
    pub const MAX_HOURS: i32 = 14;

    /// Build an offset, rejecting values outside -12..=+14.
    pub fn from_hours(hours: i32) -> Option<Self> {
        (Self::MIN_HOURS..=Self::MAX_HOURS)
            .contains(&hours)
            .then_some(UtcOffset(hours as i8))
    }

    pub fn hours(&self) -> i32 {
        i32::from(self.0)
    }

    pub fn is_utc(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        write!(f, "{}{:02}", sign, self.0.unsigned_abs())
    }
}

/// A wall-clock time with the UTC offset it was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    clock: NaiveTime,
    offset: UtcOffset,
}

impl TimeOfDay {
    /// Create a time of day, validating hour and minute ranges.
    pub fn new(hour: u32, minute: u32, offset: UtcOffset) -> Result<Self> {
        if hour > 23 {
            return Err(PlanError::validation(
                "time",
                format!("hour {} is out of range 0-23", hour),
            ));
        }
        if minute > 59 {
            return Err(PlanError::validation(
                "time",
                format!("minute {} is out of range 0-59", minute),
            ));
        }
        let clock = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| PlanError::validation("time", "not a valid time of day"))?;
        Ok(Self { clock, offset })
    }

    /// Create a UTC time of day.
    pub fn utc(hour: u32, minute: u32) -> Result<Self> {
        Self::new(hour, minute, UtcOffset::UTC)
    }

    pub fn hour(&self) -> u32 {
        self.clock.hour()
    }

    pub fn minute(&self) -> u32 {
        self.clock.minute()
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    /// The wall-clock time of the same instant in another offset.
    ///
    /// Only the clock moves; a conversion that wraps past midnight does not
    /// carry a day.
    pub fn to_offset(&self, target: UtcOffset) -> TimeOfDay {
        let shift = Duration::hours(i64::from(target.hours() - self.offset.hours()));
        let (clock, _) = self.clock.overflowing_add_signed(shift);
        TimeOfDay {
            clock,
            offset: target,
        }
    }

    /// The wall-clock time of the same instant in UTC.
    pub fn to_utc(&self) -> TimeOfDay {
        self.to_offset(UtcOffset::UTC)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.clock.format("%H:%M"))?;
        if !self.offset.is_utc() {
            write!(f, "{}", self.offset)?;
        }
        Ok(())
    }
}

impl FromStr for TimeOfDay {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self> {
        parse_time_of_day(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = PlanError;

    fn try_from(value: String) -> Result<Self> {
        parse_time_of_day(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Parse `HH:MM±HH`, falling back to bare `HH:MM` (UTC).
pub fn parse_time_of_day(input: &str) -> Result<TimeOfDay> {
    let trimmed = input.trim();
    let invalid = || PlanError::InvalidTime {
        input: input.to_string(),
    };

    let (clock, offset) = match trimmed.rfind(['+', '-']) {
        Some(pos) => {
            let (clock, suffix) = trimmed.split_at(pos);
            (clock, parse_offset(suffix).ok_or_else(invalid)?)
        }
        None => (trimmed, UtcOffset::UTC),
    };

    let clock = NaiveTime::parse_from_str(clock, "%H:%M").map_err(|_| invalid())?;
    Ok(TimeOfDay { clock, offset })
}

/// Parse a `±HH` suffix.
fn parse_offset(suffix: &str) -> Option<UtcOffset> {
    let (negative, digits) = match suffix.split_at_checked(1)? {
        ("+", digits) => (false, digits),
        ("-", digits) => (true, digits),
        _ => return None,
    };
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits.parse().ok()?;
    UtcOffset::from_hours(if negative { -hours } else { hours })
}

/// Render `time` in `target`, using the offset form unless `target` is UTC.
pub fn format_time_of_day(time: &TimeOfDay, target: UtcOffset) -> String {
    time.to_offset(target).to_string()
}

/// The offset a user wrote in previously stored state.
///
/// Missing or unreadable prior state yields `default`.
pub fn observed_offset(prior: Option<&str>, default: UtcOffset) -> UtcOffset {
    prior
        .and_then(|s| parse_time_of_day(s).ok())
        .map(|t| t.offset())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset(hours: i32) -> UtcOffset {
        UtcOffset::from_hours(hours).unwrap()
    }

    #[test]
    fn test_parse_bare_time_is_utc() {
        let t = parse_time_of_day("16:20").unwrap();
        assert_eq!(t.hour(), 16);
        assert_eq!(t.minute(), 20);
        assert!(t.offset().is_utc());
    }

    #[test]
    fn test_parse_offset_time() {
        let t = parse_time_of_day("11:12+03").unwrap();
        assert_eq!((t.hour(), t.minute()), (11, 12));
        assert_eq!(t.offset().hours(), 3);

        let t = parse_time_of_day("23:05-04").unwrap();
        assert_eq!(t.offset().hours(), -4);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for input in ["", "noon", "24:00", "12:60", "12:00+3", "12:00+15", "12:00Z", "12:00:00"] {
            let err = parse_time_of_day(input).unwrap_err();
            assert!(
                matches!(err, PlanError::InvalidTime { .. }),
                "expected InvalidTime for {:?}, got {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(TimeOfDay::utc(8, 2).unwrap().to_string(), "08:02");
        assert_eq!(
            TimeOfDay::new(7, 0, offset(-5)).unwrap().to_string(),
            "07:00-05"
        );
    }

    #[test]
    fn test_to_utc() {
        let utc = parse_time_of_day("11:12+03").unwrap().to_utc();
        assert_eq!(utc.to_string(), "08:12");
        assert!(utc.offset().is_utc());
    }

    #[test]
    fn test_to_utc_wraps_clock_past_midnight() {
        let utc = parse_time_of_day("01:30+03").unwrap().to_utc();
        assert_eq!(utc.to_string(), "22:30");

        let utc = parse_time_of_day("22:00-05").unwrap().to_utc();
        assert_eq!(utc.to_string(), "03:00");

        let back = utc.to_offset(UtcOffset::from_hours(-5).unwrap());
        assert_eq!(back.to_string(), "22:00-05");
    }

    #[test]
    fn test_format_in_target_offset() {
        let utc = TimeOfDay::utc(8, 12).unwrap();
        assert_eq!(format_time_of_day(&utc, offset(3)), "11:12+03");
        assert_eq!(format_time_of_day(&utc, UtcOffset::UTC), "08:12");
    }

    #[test]
    fn test_observed_offset() {
        assert_eq!(observed_offset(Some("11:12+03"), UtcOffset::UTC).hours(), 3);
        assert!(observed_offset(Some("11:12"), offset(2)).is_utc());
        assert_eq!(observed_offset(None, offset(2)).hours(), 2);
        assert_eq!(observed_offset(Some("bogus"), offset(-1)).hours(), -1);
    }

    #[test]
    fn test_serde_as_string() {
        let t: TimeOfDay = serde_json::from_str("\"09:30+01\"").unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"09:30+01\"");
        assert!(serde_json::from_str::<TimeOfDay>("\"9h30\"").is_err());
    }
}
