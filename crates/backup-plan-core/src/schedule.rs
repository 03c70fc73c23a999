// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Translation between user schedules and backend trigger patterns.
//!
//! A trigger pattern has five whitespace-separated fields:
//!
//! ```text
//! minute hour day month weekday-list
//! ```
//!
//! Weekly schedules fill minute, hour and the weekday list (`1,2`), always in
//! UTC. Interval schedules use `0 */N * * *`. With incremental backups the
//! pattern runs every day (`* * *`) and the day producing the full backup
//! travels separately as `full_day`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PlanError, Result};
use crate::time::{TimeOfDay, UtcOffset, parse_time_of_day};
use crate::weekday::Weekday;

/// Interval lengths the backend accepts, in hours.
pub const ALLOWED_INTERVAL_HOURS: [u32; 3] = [3, 12, 24];

/// A validated backup schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleSpec {
    /// Run at `time` on each of `dates`.
    Weekly {
        dates: BTreeSet<Weekday>,
        time: TimeOfDay,
    },
    /// Run every `every_hours` hours.
    Interval { every_hours: u32 },
}

impl ScheduleSpec {
    /// Build a weekly schedule; at least one day is required.
    pub fn weekly(dates: impl IntoIterator<Item = Weekday>, time: TimeOfDay) -> Result<Self> {
        let dates: BTreeSet<Weekday> = dates.into_iter().collect();
        if dates.is_empty() {
            return Err(PlanError::validation("dates", "at least one day is required"));
        }
        Ok(Self::Weekly { dates, time })
    }

    /// Build an interval schedule; only 3, 12 and 24 hours are accepted.
    pub fn interval(every_hours: u32) -> Result<Self> {
        validate_interval(every_hours)?;
        Ok(Self::Interval { every_hours })
    }

    pub fn is_interval(&self) -> bool {
        matches!(self, Self::Interval { .. })
    }
}

fn validate_interval(every_hours: u32) -> Result<()> {
    if ALLOWED_INTERVAL_HOURS.contains(&every_hours) {
        Ok(())
    } else {
        Err(PlanError::validation(
            "every_hours",
            format!("{} is not one of 3, 12, 24", every_hours),
        ))
    }
}

/// Schedule fields as they appear in plan configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleInput {
    /// Weekday abbreviations (`Mo`..`Su`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dates: Option<Vec<String>>,
    /// `HH:MM` or `HH:MM±HH`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    /// Hourly interval, exclusive with `dates` and `time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every_hours: Option<u32>,
}

impl TryFrom<&ScheduleInput> for ScheduleSpec {
    type Error = PlanError;

    fn try_from(input: &ScheduleInput) -> Result<Self> {
        let has_dates = input.dates.as_ref().is_some_and(|d| !d.is_empty());

        if let Some(every_hours) = input.every_hours {
            if has_dates || input.time.is_some() {
                return Err(PlanError::validation(
                    "every_hours",
                    "cannot be combined with dates or time",
                ));
            }
            return Self::interval(every_hours);
        }

        let time = input
            .time
            .as_deref()
            .ok_or_else(|| PlanError::validation("time", "is required unless every_hours is set"))?;
        let time = parse_time_of_day(time)?;

        let dates = input
            .dates
            .iter()
            .flatten()
            .map(|d| Weekday::from_abbrev(d))
            .collect::<Result<Vec<_>>>()?;

        Self::weekly(dates, time)
    }
}

impl From<&ScheduleSpec> for ScheduleInput {
    fn from(spec: &ScheduleSpec) -> Self {
        match spec {
            ScheduleSpec::Weekly { dates, time } => ScheduleInput {
                dates: Some(dates.iter().map(|d| d.abbrev().to_string()).collect()),
                time: Some(time.to_string()),
                every_hours: None,
            },
            ScheduleSpec::Interval { every_hours } => ScheduleInput {
                every_hours: Some(*every_hours),
                ..Default::default()
            },
        }
    }
}

/// A backend trigger pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TriggerPattern(String);

impl TriggerPattern {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn malformed(&self, reason: impl Into<String>) -> PlanError {
        PlanError::MalformedPattern {
            pattern: self.0.clone(),
            reason: reason.into(),
        }
    }

    fn fields(&self) -> Result<[&str; 5]> {
        let fields: Vec<&str> = self.0.split_whitespace().collect();
        fields
            .try_into()
            .map_err(|f: Vec<&str>| self.malformed(format!("expected 5 fields, found {}", f.len())))
    }
}

impl fmt::Display for TriggerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Output of [`expand_schedule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedSchedule {
    pub pattern: TriggerPattern,
    /// Day producing the full backup, set only for incremental plans.
    pub full_day: Option<Weekday>,
}

/// Build the backend trigger pattern for a schedule.
///
/// Only the time is converted to UTC. Weekday numbers and the full day are
/// emitted as configured, even when the conversion wraps past midnight.
pub fn expand_schedule(spec: &ScheduleSpec, incremental: bool) -> Result<ExpandedSchedule> {
    let (dates, time) = match spec {
        ScheduleSpec::Interval { every_hours } => {
            if incremental {
                return Err(PlanError::validation(
                    "incremental_backup",
                    "requires a dates/time schedule, not every_hours",
                ));
            }
            validate_interval(*every_hours)?;
            return Ok(ExpandedSchedule {
                pattern: TriggerPattern(format!("0 */{} * * *", every_hours)),
                full_day: None,
            });
        }
        ScheduleSpec::Weekly { dates, time } => (dates, time),
    };

    if dates.is_empty() {
        return Err(PlanError::validation("dates", "at least one day is required"));
    }

    let utc = time.to_utc();

    if incremental {
        let mut days = dates.iter();
        let (Some(full_day), None) = (days.next(), days.next()) else {
            return Err(PlanError::validation(
                "dates",
                format!(
                    "exactly one day must be set when incremental backups are enabled, got {}",
                    dates.len()
                ),
            ));
        };
        debug!(%full_day, "Expanded incremental schedule");
        return Ok(ExpandedSchedule {
            pattern: TriggerPattern(format!("{} {} * * *", utc.minute(), utc.hour())),
            full_day: Some(*full_day),
        });
    }

    let weekday_list = dates
        .iter()
        .map(|d| d.number().to_string())
        .collect::<Vec<_>>()
        .join(",");

    Ok(ExpandedSchedule {
        pattern: TriggerPattern(format!(
            "{} {} * * {}",
            utc.minute(),
            utc.hour(),
            weekday_list
        )),
        full_day: None,
    })
}

/// Read a backend trigger pattern back into a schedule.
///
/// `full_day` is the plan's full-backup day number (incremental plans only).
/// Times are rendered in `observed`, the offset the user wrote previously.
pub fn flatten_schedule(
    pattern: &TriggerPattern,
    full_day: Option<u8>,
    observed: UtcOffset,
) -> Result<ScheduleSpec> {
    let [minute, hour, _, _, weekdays] = pattern.fields()?;

    if let Some(every) = hour.strip_prefix("*/") {
        let every_hours: u32 = every
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| pattern.malformed(format!("invalid hour interval '{}'", hour)))?;
        return Ok(ScheduleSpec::Interval { every_hours });
    }

    let minute: u32 = minute
        .parse()
        .map_err(|_| pattern.malformed(format!("invalid minute '{}'", minute)))?;
    let hour: u32 = hour
        .parse()
        .map_err(|_| pattern.malformed(format!("invalid hour '{}'", hour)))?;
    let utc = TimeOfDay::utc(hour, minute).map_err(|e| pattern.malformed(e.to_string()))?;
    let time = utc.to_offset(observed);

    let dates: BTreeSet<Weekday> = match full_day {
        Some(number) => {
            let day = Weekday::from_number(number).ok_or_else(|| {
                PlanError::MalformedState(format!("full day {} is out of range 0-6", number))
            })?;
            BTreeSet::from([day])
        }
        None => parse_weekday_list(pattern, weekdays)?,
    };

    Ok(ScheduleSpec::Weekly { dates, time })
}

fn parse_weekday_list(pattern: &TriggerPattern, field: &str) -> Result<BTreeSet<Weekday>> {
    if field == "*" {
        return Ok(Weekday::ALL.into_iter().collect());
    }
    field
        .split(',')
        .map(|entry| {
            entry
                .parse::<u8>()
                .ok()
                .and_then(Weekday::from_number)
                .ok_or_else(|| pattern.malformed(format!("invalid weekday '{}'", entry)))
        })
        .collect()
}
