// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-instance retention state machine.
//!
//! ```text
//! FetchInventory ─┬─ failed ──────────────────────────────────► FailedFetch
//!                 ├─ empty ─► Bootstrap ─┬─ ok ───────────────► Bootstrapped
//!                 │                      └─ failed ───────────► FailedCreate
//!                 └─ non-empty ─► DeleteOldest ─┬─ failed ────► FailedDelete
//!                                               └─ ok ─► CreateReplacement
//!                                                         ├─ ok ──► Rotated
//!                                                         └─ failed ► FailedCreate (lost)
//! ```

use snapkeep_gateway::{Instance, Snapshot, SnapshotGateway};
use tracing::instrument;

use crate::naming::{bootstrap_description, bootstrap_name};
use crate::outcome::RetentionOutcome;
use crate::policy::RetentionPolicy;

/// The snapshot with the earliest `created_date`. Ties go to the snapshot that
/// appears first in `snapshots`.
pub fn select_oldest(snapshots: &[Snapshot]) -> Option<&Snapshot> {
    snapshots.iter().min_by_key(|s| s.created_date)
}

/// Apply the retention policy to one instance.
///
/// At most one delete and one create are issued, delete first. A create never
/// follows a failed delete.
#[instrument(skip_all, fields(instance_id = instance.id, instance = %instance.name))]
pub async fn rotate_instance(
    gateway: &dyn SnapshotGateway,
    instance: &Instance,
    policy: &RetentionPolicy,
) -> RetentionOutcome {
    let snapshots = match gateway.list_snapshots(instance.id).await {
        Ok(snapshots) => snapshots,
        Err(err) => return RetentionOutcome::failed_fetch(instance, &err),
    };

    match select_oldest(&snapshots) {
        Some(oldest) => rotate(gateway, instance, oldest).await,
        None if policy.bootstrap_empty => bootstrap(gateway, instance).await,
        None => RetentionOutcome::skipped(instance),
    }
}

async fn bootstrap(gateway: &dyn SnapshotGateway, instance: &Instance) -> RetentionOutcome {
    let name = bootstrap_name(instance);
    let description = bootstrap_description(instance);

    match gateway
        .create_snapshot(instance.id, &name, &description)
        .await
    {
        Ok(created) => RetentionOutcome::bootstrapped(instance, &created),
        Err(err) => RetentionOutcome::failed_bootstrap(instance, &name, &err),
    }
}

async fn rotate(
    gateway: &dyn SnapshotGateway,
    instance: &Instance,
    oldest: &Snapshot,
) -> RetentionOutcome {
    if let Err(err) = gateway.delete_snapshot(instance.id, &oldest.id).await {
        return RetentionOutcome::failed_delete(instance, oldest, &err);
    }

    // The replacement keeps the deleted snapshot's identity; only the timestamp moves.
    match gateway
        .create_snapshot(instance.id, &oldest.name, &oldest.description)
        .await
    {
        Ok(created) => RetentionOutcome::rotated(instance, oldest, &created),
        Err(err) => RetentionOutcome::failed_replacement(instance, oldest, &err),
    }
}
