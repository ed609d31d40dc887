// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bulk purge: delete every snapshot of one instance.

use snapkeep_gateway::SnapshotGateway;
use tracing::instrument;

use crate::outcome::{PurgeEntry, PurgeReport};

/// Delete every snapshot of `instance_id`, continuing past individual failures.
///
/// Never creates anything. An empty inventory succeeds with no entries.
#[instrument(skip(gateway))]
pub async fn purge_instance(gateway: &dyn SnapshotGateway, instance_id: i64) -> PurgeReport {
    let snapshots = match gateway.list_snapshots(instance_id).await {
        Ok(snapshots) => snapshots,
        Err(err) => {
            return PurgeReport {
                instance_id,
                fetch_error: Some(format!("failed to list snapshots: {}", err)),
                entries: Vec::new(),
            };
        }
    };

    let mut entries = Vec::with_capacity(snapshots.len());
    for snapshot in snapshots {
        let error = gateway
            .delete_snapshot(instance_id, &snapshot.id)
            .await
            .err()
            .map(|err| err.to_string());
        entries.push(PurgeEntry {
            snapshot_id: snapshot.id,
            snapshot_name: snapshot.name,
            error,
        });
    }

    PurgeReport {
        instance_id,
        fetch_error: None,
        entries,
    }
}
