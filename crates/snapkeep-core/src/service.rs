// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! SnapshotService: the engine's entry point for callers.

use std::sync::Arc;

use snapkeep_gateway::{Instance, Result, Snapshot, SnapshotGateway};

use crate::engine::rotate_instance;
use crate::fleet::rotate_fleet;
use crate::outcome::{PurgeReport, RetentionOutcome, RunReport};
use crate::policy::RetentionPolicy;
use crate::purge::purge_instance;

/// Binds a gateway to a retention policy.
///
/// Every method returns data; none print or log.
#[derive(Clone)]
pub struct SnapshotService {
    gateway: Arc<dyn SnapshotGateway>,
    policy: RetentionPolicy,
}

impl SnapshotService {
    pub fn new(gateway: Arc<dyn SnapshotGateway>, policy: RetentionPolicy) -> Self {
        Self { gateway, policy }
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Replace the retention policy.
    pub fn with_policy(mut self, policy: RetentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    // =========================================================================
    // Retention
    // =========================================================================

    /// One full rotation pass over the fleet.
    pub async fn rotate_fleet(&self) -> RunReport {
        rotate_fleet(self.gateway.as_ref(), &self.policy).await
    }

    /// Apply the retention policy to a single instance.
    pub async fn rotate_instance(&self, instance: &Instance) -> RetentionOutcome {
        rotate_instance(self.gateway.as_ref(), instance, &self.policy).await
    }

    /// Delete every snapshot of an instance without replacement.
    pub async fn purge_instance(&self, instance_id: i64) -> PurgeReport {
        purge_instance(self.gateway.as_ref(), instance_id).await
    }

    // =========================================================================
    // Pass-throughs
    // =========================================================================

    pub async fn list_instances_report(&self) -> Result<Vec<Instance>> {
        self.gateway.list_instances().await
    }

    pub async fn list_snapshots_report(&self, instance_id: i64) -> Result<Vec<Snapshot>> {
        self.gateway.list_snapshots(instance_id).await
    }

    /// Manually create a snapshot.
    pub async fn create_snapshot(
        &self,
        instance_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Snapshot> {
        self.gateway
            .create_snapshot(instance_id, name, description)
            .await
    }

    /// Manually delete a snapshot.
    pub async fn delete_snapshot(&self, instance_id: i64, snapshot_id: &str) -> Result<()> {
        self.gateway.delete_snapshot(instance_id, snapshot_id).await
    }
}
