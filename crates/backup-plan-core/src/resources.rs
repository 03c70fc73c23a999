// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resolution of instance IDs into plan resources.
//!
//! Configuration lists bare IDs. The backend needs each one typed: a compute
//! instance, a database instance, or a database cluster. The resolver lists
//! the relevant collections once and matches every requested ID against
//! them, reporting all unmatched IDs together.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{PlanError, Result, UpstreamError};
use crate::provider::ProviderKind;
use crate::types::{InstanceRecord, PlanResource, ResourceKind, VolumeTarget};

/// Read-only access to the upstream resource listings.
///
/// Implementations perform the actual API calls; errors are passed through
/// wrapped with the name of the call.
pub trait InstanceCatalog {
    /// All compute instances in the region.
    fn list_compute_instances(&self) -> std::result::Result<Vec<InstanceRecord>, UpstreamError>;

    /// All database instances in the region.
    fn list_database_instances(&self) -> std::result::Result<Vec<InstanceRecord>, UpstreamError>;

    /// All database clusters in the region.
    fn list_database_clusters(&self) -> std::result::Result<Vec<InstanceRecord>, UpstreamError>;
}

/// An [`InstanceCatalog`] over listings captured ahead of time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub compute_instances: Vec<InstanceRecord>,
    #[serde(default)]
    pub database_instances: Vec<InstanceRecord>,
    #[serde(default)]
    pub database_clusters: Vec<InstanceRecord>,
}

impl InstanceCatalog for InventorySnapshot {
    fn list_compute_instances(&self) -> std::result::Result<Vec<InstanceRecord>, UpstreamError> {
        Ok(self.compute_instances.clone())
    }

    fn list_database_instances(&self) -> std::result::Result<Vec<InstanceRecord>, UpstreamError> {
        Ok(self.database_instances.clone())
    }

    fn list_database_clusters(&self) -> std::result::Result<Vec<InstanceRecord>, UpstreamError> {
        Ok(self.database_clusters.clone())
    }
}

/// Listing indexed by ID, holding the name.
fn index(records: Vec<InstanceRecord>) -> HashMap<String, String> {
    records.into_iter().map(|r| (r.id, r.name)).collect()
}

fn resource(id: &str, kind: ResourceKind, name: &str) -> PlanResource {
    let resource = PlanResource::new(id, kind);
    if name.is_empty() {
        resource
    } else {
        resource.with_name(name)
    }
}

/// Resolve instance IDs for a provider given by name.
///
/// `provider` may be a configuration name (`cloud_servers`, `dbaas`) or a
/// backend name (`OS::Nova`, `OS::Trove`).
pub fn resolve_resources<C>(
    catalog: &C,
    provider: &str,
    instance_ids: &[String],
) -> Result<Vec<PlanResource>>
where
    C: InstanceCatalog + ?Sized,
{
    let kind: ProviderKind = provider.parse()?;
    resolve_resources_for(catalog, kind, instance_ids)
}

/// Resolve instance IDs into typed plan resources, in request order.
///
/// Fails with [`PlanError::ResourcesNotFound`] naming every ID that matched
/// nothing; no partial result is returned.
#[instrument(skip_all, fields(provider = %kind, requested = instance_ids.len()))]
pub fn resolve_resources_for<C>(
    catalog: &C,
    kind: ProviderKind,
    instance_ids: &[String],
) -> Result<Vec<PlanResource>>
where
    C: InstanceCatalog + ?Sized,
{
    let mut resources = Vec::with_capacity(instance_ids.len());
    let mut missing = Vec::new();

    match kind {
        ProviderKind::Compute => {
            let servers = index(
                catalog
                    .list_compute_instances()
                    .map_err(|e| PlanError::upstream("list compute instances", e))?,
            );
            for id in instance_ids {
                match servers.get(id) {
                    Some(name) => resources.push(resource(id, ResourceKind::ComputeInstance, name)),
                    None => missing.push(id.clone()),
                }
            }
        }
        ProviderKind::Database => {
            let instances = index(
                catalog
                    .list_database_instances()
                    .map_err(|e| PlanError::upstream("list database instances", e))?,
            );
            let clusters = index(
                catalog
                    .list_database_clusters()
                    .map_err(|e| PlanError::upstream("list database clusters", e))?,
            );
            for id in instance_ids {
                if let Some(name) = instances.get(id) {
                    resources.push(resource(id, ResourceKind::DatabaseInstance, name));
                } else if let Some(name) = clusters.get(id) {
                    resources.push(resource(id, ResourceKind::DatabaseCluster, name));
                } else {
                    missing.push(id.clone());
                }
            }
        }
    }

    if !missing.is_empty() {
        warn!(missing = ?missing, "Requested resources not found");
        return Err(PlanError::ResourcesNotFound { ids: missing });
    }

    debug!(resolved = resources.len(), "Resolved plan resources");
    Ok(resources)
}

/// Split plan resources back into instance IDs and volume targets.
///
/// Instances without volume children produce no target, which reads back as
/// "all volumes".
pub fn flatten_resources(resources: &[PlanResource]) -> (Vec<String>, Vec<VolumeTarget>) {
    let mut instance_ids = Vec::with_capacity(resources.len());
    let mut targets = Vec::new();

    for resource in resources {
        if resource.kind == ResourceKind::BlockVolume {
            continue;
        }
        instance_ids.push(resource.id.clone());

        let volumes: Vec<String> = resource
            .children
            .iter()
            .filter(|c| c.kind == ResourceKind::BlockVolume)
            .map(|c| c.id.clone())
            .collect();
        if !volumes.is_empty() {
            targets.push(VolumeTarget::volumes(resource.id.clone(), volumes));
        }
    }

    (instance_ids, targets)
}
