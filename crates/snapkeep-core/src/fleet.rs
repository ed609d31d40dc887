// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fleet-wide rotation run.

use chrono::Utc;
use snapkeep_gateway::SnapshotGateway;
use tracing::instrument;

use crate::engine::rotate_instance;
use crate::outcome::RunReport;
use crate::policy::RetentionPolicy;

/// Rotate every instance of the fleet, one after another, in listing order.
///
/// A failed fleet listing yields a report with `fleet_error` set and no
/// outcomes. Otherwise every instance is visited exactly once regardless of
/// earlier failures.
#[instrument(skip_all)]
pub async fn rotate_fleet(gateway: &dyn SnapshotGateway, policy: &RetentionPolicy) -> RunReport {
    let started_at = Utc::now();

    let instances = match gateway.list_instances().await {
        Ok(instances) => instances,
        Err(err) => return RunReport::fleet_failure(started_at, &err),
    };

    let mut outcomes = Vec::with_capacity(instances.len());
    for instance in &instances {
        outcomes.push(rotate_instance(gateway, instance, policy).await);
    }

    RunReport::completed(started_at, outcomes)
}
