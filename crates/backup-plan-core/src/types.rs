// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Plan resource types.

use serde::{Deserialize, Serialize};

/// Kind of resource a backup plan targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "OS::Nova::Server")]
    ComputeInstance,
    #[serde(rename = "OS::Trove::Instance")]
    DatabaseInstance,
    #[serde(rename = "OS::Trove::Cluster")]
    DatabaseCluster,
    #[serde(rename = "OS::Cinder::Volume")]
    BlockVolume,
}

impl ResourceKind {
    /// Backend type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ComputeInstance => "OS::Nova::Server",
            Self::DatabaseInstance => "OS::Trove::Instance",
            Self::DatabaseCluster => "OS::Trove::Cluster",
            Self::BlockVolume => "OS::Cinder::Volume",
        }
    }
}

/// A backup target inside a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Volumes attached to a compute instance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PlanResource>,
}

impl PlanResource {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            children: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// A block volume child.
    pub fn volume(id: impl Into<String>) -> Self {
        Self::new(id, ResourceKind::BlockVolume)
    }
}

/// One entry of an upstream instance or cluster listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl InstanceRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Volumes to back up for one compute instance.
///
/// `volume_ids: None` backs up every volume of the instance. `Some(vec![])`
/// is a distinct, explicit selection of no volumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeTarget {
    pub instance_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ids: Option<Vec<String>>,
}

impl VolumeTarget {
    /// Back up all volumes of `instance_id`.
    pub fn all(instance_id: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            volume_ids: None,
        }
    }

    /// Back up only the listed volumes of `instance_id`.
    pub fn volumes<I, S>(instance_id: impl Into<String>, volume_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            instance_id: instance_id.into(),
            volume_ids: Some(volume_ids.into_iter().map(Into::into).collect()),
        }
    }
}
