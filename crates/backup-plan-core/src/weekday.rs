// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Weekday abbreviations and their cron day numbers.
//!
//! The backend numbers days from Monday: `Mo` = 0 .. `Su` = 6.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{PlanError, Result};

/// Day of the week as written in backup plan configuration.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[repr(u8)]
pub enum Weekday {
    #[serde(rename = "Mo")]
    #[strum(serialize = "Mo")]
    Monday = 0,
    #[serde(rename = "Tu")]
    #[strum(serialize = "Tu")]
    Tuesday = 1,
    #[serde(rename = "We")]
    #[strum(serialize = "We")]
    Wednesday = 2,
    #[serde(rename = "Th")]
    #[strum(serialize = "Th")]
    Thursday = 3,
    #[serde(rename = "Fr")]
    #[strum(serialize = "Fr")]
    Friday = 4,
    #[serde(rename = "Sa")]
    #[strum(serialize = "Sa")]
    Saturday = 5,
    #[serde(rename = "Su")]
    #[strum(serialize = "Su")]
    Sunday = 6,
}

impl Weekday {
    /// All days in cron order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Parse a two-letter abbreviation (`Mo`..`Su`).
    pub fn from_abbrev(abbrev: &str) -> Result<Self> {
        abbrev
            .trim()
            .parse()
            .map_err(|_| PlanError::UnknownWeekday(abbrev.to_string()))
    }

    /// The two-letter abbreviation.
    pub fn abbrev(&self) -> &'static str {
        (*self).into()
    }

    /// The 0-based cron day number.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// Look up a day by its 0-based cron number.
    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(number as usize).copied()
    }
}
