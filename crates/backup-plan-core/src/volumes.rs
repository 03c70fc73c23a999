// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Attaching selected block volumes to resolved compute instances.

use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::error::{PlanError, Result};
use crate::types::{PlanResource, VolumeTarget};

/// Add the volumes named by `targets` as children of their instances.
///
/// Targets without a volume list leave their instance untouched so the
/// backend backs up every attached volume. A target whose instance is not in
/// `resources` means the caller passed inconsistent inputs and fails with
/// [`PlanError::VolumeTargetWithoutInstance`].
#[instrument(skip_all, fields(resources = resources.len(), targets = targets.len()))]
pub fn enrich_with_volumes(
    mut resources: Vec<PlanResource>,
    targets: &[VolumeTarget],
) -> Result<Vec<PlanResource>> {
    let positions: HashMap<String, usize> = resources
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.clone(), i))
        .collect();

    for target in targets {
        let Some(volume_ids) = &target.volume_ids else {
            continue;
        };
        let position = *positions.get(&target.instance_id).ok_or_else(|| {
            PlanError::VolumeTargetWithoutInstance {
                instance_id: target.instance_id.clone(),
            }
        })?;

        let instance = &mut resources[position];
        instance
            .children
            .extend(volume_ids.iter().map(PlanResource::volume));
        debug!(
            instance_id = %target.instance_id,
            volumes = volume_ids.len(),
            "Attached volumes to instance"
        );
    }

    Ok(resources)
}
