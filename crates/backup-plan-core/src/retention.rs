// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Retention policy translation.
//!
//! A plan keeps either a fixed number of backups ("full") or a
//! Grandfather-Father-Son set of weekly, monthly and yearly backups. A zero
//! monthly or yearly tier means the tier is not used; the backend omits it.

use serde::{Deserialize, Serialize};

use crate::config::TranslatorConfig;
use crate::error::{PlanError, Result};

/// Retention type as stored on a backend plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionType {
    MaxBackups,
    Gfs,
}

/// User-facing retention policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Keep the newest `max_backups` backups.
    Full { max_backups: u32 },
    /// Keep `weekly` weekly, `monthly` monthly and `yearly` yearly backups.
    Gfs {
        weekly: u32,
        #[serde(default)]
        monthly: u32,
        #[serde(default)]
        yearly: u32,
    },
}

/// GFS tier counts as stored on a backend plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GfsPayload {
    pub son: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grandfather: Option<u32>,
}

/// Backend retention fields produced by [`expand_retention`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPayload {
    pub retention_type: RetentionType,
    pub gfs: Option<GfsPayload>,
    /// Value for the trigger's `max_backups` field.
    pub trigger_max_backups: u32,
}

fn tier(count: u32) -> Option<u32> {
    (count > 0).then_some(count)
}

/// Convert a retention policy into backend plan and trigger fields.
pub fn expand_retention(
    policy: &RetentionPolicy,
    config: &TranslatorConfig,
) -> Result<RetentionPayload> {
    match *policy {
        RetentionPolicy::Full { max_backups } => {
            if max_backups == 0 {
                return Err(PlanError::validation("max_backups", "must be at least 1"));
            }
            Ok(RetentionPayload {
                retention_type: RetentionType::MaxBackups,
                gfs: None,
                trigger_max_backups: max_backups,
            })
        }
        RetentionPolicy::Gfs {
            weekly,
            monthly,
            yearly,
        } => {
            if weekly == 0 {
                return Err(PlanError::validation("gfs_weekly", "must be at least 1"));
            }
            Ok(RetentionPayload {
                retention_type: RetentionType::Gfs,
                gfs: Some(GfsPayload {
                    son: weekly,
                    father: tier(monthly),
                    grandfather: tier(yearly),
                }),
                trigger_max_backups: config.trigger_max_backups,
            })
        }
    }
}

/// Read backend retention fields back into a policy.
///
/// Plans without a retention type predate GFS support and are treated as
/// fixed-count retention.
pub fn flatten_retention(
    retention_type: Option<RetentionType>,
    gfs: Option<&GfsPayload>,
    trigger_max_backups: u32,
) -> Result<RetentionPolicy> {
    match retention_type {
        None | Some(RetentionType::MaxBackups) => Ok(RetentionPolicy::Full {
            max_backups: trigger_max_backups,
        }),
        Some(RetentionType::Gfs) => {
            let gfs = gfs.ok_or_else(|| {
                PlanError::MalformedState("retention type is gfs but no gfs counts are set".into())
            })?;
            Ok(RetentionPolicy::Gfs {
                weekly: gfs.son,
                monthly: gfs.father.unwrap_or(0),
                yearly: gfs.grandfather.unwrap_or(0),
            })
        }
    }
}
