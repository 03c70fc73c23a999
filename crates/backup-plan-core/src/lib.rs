// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backup Plan Core
//!
//! Translation engine between user-facing backup plan configuration and an
//! OpenStack-compatible backup API.
//!
//! # Architecture
//!
//! - [`time`] and [`weekday`]: codecs for `HH:MM±HH` and `Mo`..`Su`
//! - [`schedule`]: schedule <-> cron-like trigger pattern
//! - [`retention`]: fixed-count and GFS retention <-> backend fields
//! - [`resources`]: instance IDs -> typed plan resources via an [`InstanceCatalog`]
//! - [`volumes`]: selected block volumes attached to compute instances
//! - [`plan`]: all of the above assembled into plan and trigger payloads
//!
//! Everything is synchronous and stateless. The only I/O happens inside the
//! caller's [`InstanceCatalog`] implementation.
//!
//! # Example
//!
//! ```
//! use backup_plan_core::{ScheduleSpec, TimeOfDay, Weekday, expand_schedule};
//!
//! # fn example() -> backup_plan_core::Result<()> {
//! let time: TimeOfDay = "11:12+03".parse()?;
//! let spec = ScheduleSpec::weekly([Weekday::Tuesday, Weekday::Wednesday], time)?;
//! let expanded = expand_schedule(&spec, false)?;
//! assert_eq!(expanded.pattern.as_str(), "12 8 * * 1,2");
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod config;
pub mod error;
pub mod plan;
pub mod provider;
pub mod resources;
pub mod retention;
pub mod schedule;
pub mod time;
pub mod types;
pub mod volumes;
pub mod weekday;

pub use config::{ConfigError, DEFAULT_TRIGGER_MAX_BACKUPS, TranslatorConfig};
pub use error::{ErrorCategory, PlanError, Result, UpstreamError};
pub use plan::{
    BackupPlanConfig, PlanRequest, PlanResponse, TriggerRequest, TriggerResponse,
    build_plan_request, build_trigger_request, flatten_plan,
};
pub use provider::ProviderKind;
pub use resources::{
    InstanceCatalog, InventorySnapshot, flatten_resources, resolve_resources,
    resolve_resources_for,
};
pub use retention::{
    GfsPayload, RetentionPayload, RetentionPolicy, RetentionType, expand_retention,
    flatten_retention,
};
pub use schedule::{
    ALLOWED_INTERVAL_HOURS, ExpandedSchedule, ScheduleInput, ScheduleSpec, TriggerPattern,
    expand_schedule, flatten_schedule,
};
pub use time::{TimeOfDay, UtcOffset, format_time_of_day, observed_offset, parse_time_of_day};
pub use types::{InstanceRecord, PlanResource, ResourceKind, VolumeTarget};
pub use volumes::enrich_with_volumes;
pub use weekday::Weekday;
