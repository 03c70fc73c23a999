// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Backup provider kinds and their names.
//!
//! The backend identifies providers by OpenStack service names (`OS::Nova`,
//! `OS::Trove`); configuration uses `cloud_servers` and `dbaas`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Which family of resources a plan backs up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Compute instances and their volumes.
    #[serde(rename = "cloud_servers")]
    Compute,
    /// Database instances and clusters.
    #[serde(rename = "dbaas")]
    Database,
}

impl ProviderKind {
    /// Name used in plan configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Compute => "cloud_servers",
            Self::Database => "dbaas",
        }
    }

    /// Name the backend reports for the provider.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Compute => "OS::Nova",
            Self::Database => "OS::Trove",
        }
    }

    /// Look up a provider by its backend name.
    pub fn from_backend_name(name: &str) -> Result<Self> {
        match name {
            "OS::Nova" => Ok(Self::Compute),
            "OS::Trove" => Ok(Self::Database),
            other => Err(PlanError::UnknownProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = PlanError;

    /// Accepts either the configuration name or the backend name.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cloud_servers" => Ok(Self::Compute),
            "dbaas" => Ok(Self::Database),
            other => Self::from_backend_name(other),
        }
    }
}
