// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The gateway capability consumed by the retention engine.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Instance, Snapshot};

/// Authenticated snapshot operations against a provider.
///
/// Implementations own credential acquisition and refresh, request signing,
/// status-code interpretation and envelope decoding. Every failure, transport
/// or provider, comes back as an `Err` carrying a readable message; callers
/// only branch on success versus failure.
#[async_trait]
pub trait SnapshotGateway: Send + Sync {
    /// List every instance in the fleet.
    async fn list_instances(&self) -> Result<Vec<Instance>>;

    /// List the snapshots of one instance, in provider order.
    ///
    /// An instance without snapshots yields `Ok(vec![])`, never an error.
    async fn list_snapshots(&self, instance_id: i64) -> Result<Vec<Snapshot>>;

    /// Create a snapshot and return it as the provider recorded it.
    async fn create_snapshot(
        &self,
        instance_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Snapshot>;

    /// Delete one snapshot.
    async fn delete_snapshot(&self, instance_id: i64, snapshot_id: &str) -> Result<()>;
}
