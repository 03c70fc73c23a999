// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backup plan and trigger payloads.
//!
//! A user-facing [`BackupPlanConfig`] becomes two backend objects: a plan
//! (resources, provider, retention, full day) and a trigger (pattern and
//! max backups) that references the plan by ID. [`flatten_plan`] goes the
//! other way when reading the backend state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::TranslatorConfig;
use crate::error::{PlanError, Result};
use crate::provider::ProviderKind;
use crate::resources::{InstanceCatalog, flatten_resources, resolve_resources_for};
use crate::retention::{
    GfsPayload, RetentionPolicy, RetentionType, expand_retention, flatten_retention,
};
use crate::schedule::{
    ExpandedSchedule, ScheduleInput, ScheduleSpec, TriggerPattern, expand_schedule,
    flatten_schedule,
};
use crate::time::observed_offset;
use crate::types::{PlanResource, VolumeTarget};
use crate::volumes::enrich_with_volumes;

/// A backup plan as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupPlanConfig {
    pub name: String,
    pub provider_name: ProviderKind,
    pub instance_ids: Vec<String>,
    /// Volume selection per compute instance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backup_targets: Vec<VolumeTarget>,
    pub schedule: ScheduleInput,
    #[serde(default)]
    pub incremental_backup: bool,
    pub retention: RetentionPolicy,
}

/// Body of a plan create/update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub name: String,
    pub resources: Vec<PlanResource>,
    pub provider_id: String,
    /// Cron number of the full-backup day, incremental plans only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_type: Option<RetentionType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gfs: Option<GfsPayload>,
}

/// A plan as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResponse {
    pub id: String,
    #[serde(flatten)]
    pub plan: PlanRequest,
}

/// Body of a trigger create/update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerRequest {
    pub name: String,
    pub plan_id: String,
    pub pattern: TriggerPattern,
    pub max_backups: u32,
}

/// A trigger as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerResponse {
    pub id: String,
    #[serde(flatten)]
    pub trigger: TriggerRequest,
}

impl BackupPlanConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PlanError::validation("name", "must not be empty"));
        }
        if self.instance_ids.is_empty() {
            return Err(PlanError::validation(
                "instance_ids",
                "at least one instance is required",
            ));
        }
        if self.provider_name != ProviderKind::Compute
            && self.backup_targets.iter().any(|t| t.volume_ids.is_some())
        {
            return Err(PlanError::validation(
                "backup_targets",
                format!(
                    "volume selection is only supported for {}",
                    ProviderKind::Compute
                ),
            ));
        }
        Ok(())
    }

    fn expanded_schedule(&self) -> Result<ExpandedSchedule> {
        let spec = ScheduleSpec::try_from(&self.schedule)?;
        expand_schedule(&spec, self.incremental_backup)
    }
}

/// Build the plan create/update body.
///
/// Resolves every instance ID through `catalog` and attaches the selected
/// volumes of compute instances.
#[instrument(skip_all, fields(plan = %config.name, provider = %config.provider_name))]
pub fn build_plan_request<C>(
    config: &BackupPlanConfig,
    provider_id: &str,
    catalog: &C,
    translator: &TranslatorConfig,
) -> Result<PlanRequest>
where
    C: InstanceCatalog + ?Sized,
{
    config.validate()?;
    let schedule = config.expanded_schedule()?;
    let retention = expand_retention(&config.retention, translator)?;

    let resources = resolve_resources_for(catalog, config.provider_name, &config.instance_ids)?;
    let resources = match config.provider_name {
        ProviderKind::Compute => enrich_with_volumes(resources, &config.backup_targets)?,
        ProviderKind::Database => resources,
    };

    info!(resources = resources.len(), "Built backup plan request");
    Ok(PlanRequest {
        name: config.name.clone(),
        resources,
        provider_id: provider_id.to_string(),
        full_day: schedule.full_day.map(|d| d.number()),
        retention_type: Some(retention.retention_type),
        gfs: retention.gfs,
    })
}

/// Build the trigger create/update body for the plan `plan_id`.
pub fn build_trigger_request(
    config: &BackupPlanConfig,
    plan_id: &str,
    translator: &TranslatorConfig,
) -> Result<TriggerRequest> {
    let schedule = config.expanded_schedule()?;
    let retention = expand_retention(&config.retention, translator)?;

    debug!(pattern = %schedule.pattern, "Built trigger request");
    Ok(TriggerRequest {
        name: config.name.clone(),
        plan_id: plan_id.to_string(),
        pattern: schedule.pattern,
        max_backups: retention.trigger_max_backups,
    })
}

/// Read backend plan and trigger state back into configuration.
///
/// `prior` is the configuration last written by the user, if any. Its time
/// offset is reused so `11:12+03` does not come back as `08:12`, and its
/// "all volumes" targets are kept for instances still in the plan.
pub fn flatten_plan(
    plan: &PlanResponse,
    trigger: &TriggerResponse,
    provider: ProviderKind,
    prior: Option<&BackupPlanConfig>,
    translator: &TranslatorConfig,
) -> Result<BackupPlanConfig> {
    if trigger.trigger.plan_id != plan.id {
        return Err(PlanError::MalformedState(format!(
            "trigger {} belongs to plan {}, not {}",
            trigger.id, trigger.trigger.plan_id, plan.id
        )));
    }

    let observed = observed_offset(
        prior.and_then(|p| p.schedule.time.as_deref()),
        translator.default_offset,
    );
    let schedule = flatten_schedule(&trigger.trigger.pattern, plan.plan.full_day, observed)?;
    let retention = flatten_retention(
        plan.plan.retention_type,
        plan.plan.gfs.as_ref(),
        trigger.trigger.max_backups,
    )?;

    let (instance_ids, mut backup_targets) = flatten_resources(&plan.plan.resources);
    if let Some(prior) = prior {
        for target in &prior.backup_targets {
            let kept = target.volume_ids.is_none()
                && instance_ids.contains(&target.instance_id)
                && !backup_targets
                    .iter()
                    .any(|t| t.instance_id == target.instance_id);
            if kept {
                backup_targets.push(target.clone());
            }
        }
    }

    Ok(BackupPlanConfig {
        name: plan.plan.name.clone(),
        provider_name: provider,
        instance_ids,
        backup_targets,
        schedule: ScheduleInput::from(&schedule),
        incremental_backup: plan.plan.full_day.is_some(),
        retention,
    })
}
