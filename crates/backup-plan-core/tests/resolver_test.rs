// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Resource resolution and volume enrichment tests for backup-plan-core.

use std::cell::Cell;

use backup_plan_core::{
    ErrorCategory, InstanceCatalog, InstanceRecord, InventorySnapshot, PlanError, PlanResource,
    ProviderKind, ResourceKind, UpstreamError, VolumeTarget, enrich_with_volumes,
    resolve_resources, resolve_resources_for,
};

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn inventory() -> InventorySnapshot {
    InventorySnapshot {
        compute_instances: vec![
            InstanceRecord::new("vm-1", "web-1"),
            InstanceRecord::new("vm-2", "web-2"),
            InstanceRecord::new("vm-3", "worker"),
        ],
        database_instances: vec![InstanceRecord::new("db-1", "orders")],
        database_clusters: vec![InstanceRecord::new("cl-1", "analytics")],
    }
}

/// Catalog that counts calls and can fail one listing.
#[derive(Default)]
struct CountingCatalog {
    inner: InventorySnapshot,
    calls: Cell<u32>,
    fail_clusters: bool,
}

impl InstanceCatalog for CountingCatalog {
    fn list_compute_instances(&self) -> Result<Vec<InstanceRecord>, UpstreamError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.list_compute_instances()
    }

    fn list_database_instances(&self) -> Result<Vec<InstanceRecord>, UpstreamError> {
        self.calls.set(self.calls.get() + 1);
        self.inner.list_database_instances()
    }

    fn list_database_clusters(&self) -> Result<Vec<InstanceRecord>, UpstreamError> {
        self.calls.set(self.calls.get() + 1);
        if self.fail_clusters {
            return Err("503 Service Unavailable".into());
        }
        self.inner.list_database_clusters()
    }
}

#[test]
fn test_compute_resolution_preserves_input_order() {
    let resources =
        resolve_resources_for(&inventory(), ProviderKind::Compute, &ids(&["vm-3", "vm-1"]))
            .unwrap();

    assert_eq!(
        resources,
        vec![
            PlanResource::new("vm-3", ResourceKind::ComputeInstance).with_name("worker"),
            PlanResource::new("vm-1", ResourceKind::ComputeInstance).with_name("web-1"),
        ]
    );
}

#[test]
fn test_database_resolution_types_instances_and_clusters() {
    let resources =
        resolve_resources_for(&inventory(), ProviderKind::Database, &ids(&["cl-1", "db-1"]))
            .unwrap();

    assert_eq!(resources.len(), 2);
    assert_eq!(resources[0].kind, ResourceKind::DatabaseCluster);
    assert_eq!(resources[0].name.as_deref(), Some("analytics"));
    assert_eq!(resources[1].kind, ResourceKind::DatabaseInstance);
    assert_eq!(resources[1].name.as_deref(), Some("orders"));
}

#[test]
fn test_instance_match_wins_over_cluster() {
    let mut catalog = inventory();
    catalog
        .database_clusters
        .push(InstanceRecord::new("db-1", "shadow"));

    let resources =
        resolve_resources_for(&catalog, ProviderKind::Database, &ids(&["db-1"])).unwrap();
    assert_eq!(resources[0].kind, ResourceKind::DatabaseInstance);
}

#[test]
fn test_missing_ids_are_aggregated() {
    let err = resolve_resources_for(
        &inventory(),
        ProviderKind::Compute,
        &ids(&["a", "vm-2", "c"]),
    )
    .unwrap_err();

    match &err {
        PlanError::ResourcesNotFound { ids } => assert_eq!(ids, &["a", "c"]),
        other => panic!("expected ResourcesNotFound, got {:?}", other),
    }
    assert_eq!(err.category(), ErrorCategory::Lookup);
    let message = err.to_string();
    assert!(message.contains("a, c"), "message was {}", message);
}

#[test]
fn test_compute_ids_do_not_match_database_listings() {
    let err = resolve_resources_for(&inventory(), ProviderKind::Compute, &ids(&["db-1"]))
        .unwrap_err();
    assert!(matches!(err, PlanError::ResourcesNotFound { .. }));
}

#[test]
fn test_resolve_by_provider_name() {
    let resources = resolve_resources(&inventory(), "dbaas", &ids(&["db-1"])).unwrap();
    assert_eq!(resources[0].kind, ResourceKind::DatabaseInstance);

    let resources = resolve_resources(&inventory(), "OS::Nova", &ids(&["vm-2"])).unwrap();
    assert_eq!(resources[0].kind, ResourceKind::ComputeInstance);
}

#[test]
fn test_unknown_provider_fails_before_listing() {
    let catalog = CountingCatalog::default();
    let err = resolve_resources(&catalog, "object_storage", &ids(&["x"])).unwrap_err();

    assert!(matches!(err, PlanError::UnknownProvider(_)));
    assert_eq!(catalog.calls.get(), 0);
}

#[test]
fn test_listing_calls_per_provider() {
    let catalog = CountingCatalog {
        inner: inventory(),
        ..Default::default()
    };
    resolve_resources_for(&catalog, ProviderKind::Compute, &ids(&["vm-1", "vm-2"])).unwrap();
    assert_eq!(catalog.calls.get(), 1);

    catalog.calls.set(0);
    resolve_resources_for(&catalog, ProviderKind::Database, &ids(&["db-1", "cl-1"])).unwrap();
    assert_eq!(catalog.calls.get(), 2);
}

#[test]
fn test_upstream_failure_is_wrapped() {
    let catalog = CountingCatalog {
        inner: inventory(),
        fail_clusters: true,
        ..Default::default()
    };
    let err = resolve_resources_for(&catalog, ProviderKind::Database, &ids(&["db-1"]))
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Upstream);
    assert_eq!(
        err.to_string(),
        "list database clusters failed: 503 Service Unavailable"
    );
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_volumes_attached_to_matching_instance() {
    let resources =
        resolve_resources_for(&inventory(), ProviderKind::Compute, &ids(&["vm-1", "vm-2"]))
            .unwrap();
    let targets = vec![
        VolumeTarget::volumes("vm-2", ["vol-a", "vol-b"]),
        VolumeTarget::all("vm-1"),
    ];

    let enriched = enrich_with_volumes(resources, &targets).unwrap();
    assert!(enriched[0].children.is_empty());
    assert_eq!(
        enriched[1].children,
        vec![PlanResource::volume("vol-a"), PlanResource::volume("vol-b")]
    );
}

#[test]
fn test_empty_volume_selection_is_kept_distinct() {
    let resources = vec![PlanResource::new("vm-1", ResourceKind::ComputeInstance)];
    let enriched =
        enrich_with_volumes(resources, &[VolumeTarget::volumes("vm-1", Vec::<String>::new())])
            .unwrap();
    assert!(enriched[0].children.is_empty());
}

#[test]
fn test_volume_target_for_unresolved_instance() {
    let resources = vec![PlanResource::new("vm-1", ResourceKind::ComputeInstance)];
    let err = enrich_with_volumes(resources, &[VolumeTarget::volumes("vm-9", ["vol-x"])])
        .unwrap_err();

    assert!(matches!(
        err,
        PlanError::VolumeTargetWithoutInstance { ref instance_id } if instance_id == "vm-9"
    ));
    assert_eq!(err.category(), ErrorCategory::Consistency);
}

#[test]
fn test_plan_resource_json_shape() {
    let mut vm = PlanResource::new("vm-1", ResourceKind::ComputeInstance).with_name("web-1");
    vm.children.push(PlanResource::volume("vol-a"));

    assert_eq!(
        serde_json::to_value(&vm).unwrap(),
        serde_json::json!({
            "id": "vm-1",
            "type": "OS::Nova::Server",
            "name": "web-1",
            "children": [{"id": "vol-a", "type": "OS::Cinder::Volume"}]
        })
    );
}
