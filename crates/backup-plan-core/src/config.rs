// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the translators.

use crate::time::UtcOffset;

/// Trigger `max_backups` used when the plan keeps GFS retention.
///
/// The backend rejects a zero value, and under GFS the count is not derived
/// from user input.
pub const DEFAULT_TRIGGER_MAX_BACKUPS: u32 = 30;

/// Settings shared by all translation calls.
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Trigger `max_backups` when GFS retention is active.
    pub trigger_max_backups: u32,
    /// Offset used to render backend times when no prior state exists.
    pub default_offset: UtcOffset,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            trigger_max_backups: DEFAULT_TRIGGER_MAX_BACKUPS,
            default_offset: UtcOffset::UTC,
        }
    }
}

impl TranslatorConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BACKUP_PLAN_TRIGGER_MAX_BACKUPS`: trigger max backups under GFS (default: 30)
    /// - `BACKUP_PLAN_DEFAULT_UTC_OFFSET`: offset in hours for first reads (default: 0)
    pub fn from_env() -> Result<Self, ConfigError> {
        let trigger_max_backups: u32 = std::env::var("BACKUP_PLAN_TRIGGER_MAX_BACKUPS")
            .unwrap_or_else(|_| DEFAULT_TRIGGER_MAX_BACKUPS.to_string())
            .parse()
            .ok()
            .filter(|n| *n > 0)
            .ok_or(ConfigError::Invalid(
                "BACKUP_PLAN_TRIGGER_MAX_BACKUPS",
                "must be a positive integer",
            ))?;

        let default_offset = std::env::var("BACKUP_PLAN_DEFAULT_UTC_OFFSET")
            .unwrap_or_else(|_| "0".to_string())
            .trim()
            .parse::<i32>()
            .ok()
            .and_then(UtcOffset::from_hours)
            .ok_or(ConfigError::Invalid(
                "BACKUP_PLAN_DEFAULT_UTC_OFFSET",
                "must be a whole number of hours between -12 and 14",
            ))?;

        Ok(Self {
            trigger_max_backups,
            default_offset,
        })
    }

    /// Set the trigger max backups used under GFS retention.
    pub fn with_trigger_max_backups(mut self, max_backups: u32) -> Self {
        self.trigger_max_backups = max_backups;
        self
    }

    /// Set the offset used when no prior state exists.
    pub fn with_default_offset(mut self, offset: UtcOffset) -> Self {
        self.default_offset = offset;
        self
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, &'static str),
}
