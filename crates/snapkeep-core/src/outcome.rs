// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-instance outcomes and the reports they are collected into.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use snapkeep_gateway::{GatewayError, Instance, Snapshot};

/// What the engine ended up doing for one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionAction {
    /// No snapshots existed; a first one was created.
    Bootstrapped,
    /// The oldest snapshot was deleted and recreated.
    Rotated,
    /// Nothing to do under the active policy.
    SkippedNoop,
    /// The snapshot inventory could not be read.
    FailedFetch,
    /// The oldest snapshot could not be deleted; nothing was created.
    FailedDelete,
    /// Creating a snapshot failed. See [`RetentionOutcome::snapshot_lost`].
    FailedCreate,
}

impl RetentionAction {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RetentionAction::FailedFetch
                | RetentionAction::FailedDelete
                | RetentionAction::FailedCreate
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionAction::Bootstrapped => "bootstrapped",
            RetentionAction::Rotated => "rotated",
            RetentionAction::SkippedNoop => "skipped",
            RetentionAction::FailedFetch => "failed_fetch",
            RetentionAction::FailedDelete => "failed_delete",
            RetentionAction::FailedCreate => "failed_create",
        }
    }
}

impl fmt::Display for RetentionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the retention policy for one instance in one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetentionOutcome {
    pub instance_id: i64,
    pub instance_name: String,
    pub action: RetentionAction,
    /// Human-readable account of what happened.
    pub detail: String,
    /// Snapshot removed during this run, if any.
    pub deleted_snapshot_id: Option<String>,
    /// Snapshot created during this run, if any.
    pub created_snapshot_id: Option<String>,
    /// The oldest snapshot was deleted but its replacement was not created.
    pub snapshot_lost: bool,
}

impl RetentionOutcome {
    fn base(instance: &Instance, action: RetentionAction, detail: String) -> Self {
        Self {
            instance_id: instance.id,
            instance_name: instance.name.clone(),
            action,
            detail,
            deleted_snapshot_id: None,
            created_snapshot_id: None,
            snapshot_lost: false,
        }
    }

    pub(crate) fn bootstrapped(instance: &Instance, created: &Snapshot) -> Self {
        Self {
            created_snapshot_id: Some(created.id.clone()),
            ..Self::base(
                instance,
                RetentionAction::Bootstrapped,
                format!(
                    "no snapshots found; created initial snapshot {} ({})",
                    created.id, created.name
                ),
            )
        }
    }

    pub(crate) fn rotated(instance: &Instance, deleted: &Snapshot, created: &Snapshot) -> Self {
        Self {
            deleted_snapshot_id: Some(deleted.id.clone()),
            created_snapshot_id: Some(created.id.clone()),
            ..Self::base(
                instance,
                RetentionAction::Rotated,
                format!(
                    "deleted oldest snapshot {} (created {}) and created replacement {} ({})",
                    deleted.id,
                    deleted.created_date.to_rfc3339(),
                    created.id,
                    created.name
                ),
            )
        }
    }

    pub(crate) fn skipped(instance: &Instance) -> Self {
        Self::base(
            instance,
            RetentionAction::SkippedNoop,
            "no snapshots found and bootstrap is disabled; nothing changed".to_string(),
        )
    }

    pub(crate) fn failed_fetch(instance: &Instance, err: &GatewayError) -> Self {
        Self::base(
            instance,
            RetentionAction::FailedFetch,
            format!("failed to list snapshots; nothing changed: {}", err),
        )
    }

    pub(crate) fn failed_delete(instance: &Instance, oldest: &Snapshot, err: &GatewayError) -> Self {
        Self::base(
            instance,
            RetentionAction::FailedDelete,
            format!(
                "failed to delete oldest snapshot {}; no replacement created, nothing changed: {}",
                oldest.id, err
            ),
        )
    }

    pub(crate) fn failed_bootstrap(instance: &Instance, name: &str, err: &GatewayError) -> Self {
        Self::base(
            instance,
            RetentionAction::FailedCreate,
            format!(
                "failed to create initial snapshot {}; no snapshot was deleted: {}",
                name, err
            ),
        )
    }

    pub(crate) fn failed_replacement(
        instance: &Instance,
        deleted: &Snapshot,
        err: &GatewayError,
    ) -> Self {
        Self {
            deleted_snapshot_id: Some(deleted.id.clone()),
            snapshot_lost: true,
            ..Self::base(
                instance,
                RetentionAction::FailedCreate,
                format!(
                    "SNAPSHOT LOST: deleted snapshot {} ({}) but failed to create its replacement: {}",
                    deleted.id, deleted.name, err
                ),
            )
        }
    }

    pub fn is_failure(&self) -> bool {
        self.action.is_failure()
    }
}

/// Ordered outcomes of one fleet pass.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Set when the fleet itself could not be listed; `outcomes` is then empty.
    pub fleet_error: Option<String>,
    /// One entry per instance, in fleet order.
    pub outcomes: Vec<RetentionOutcome>,
}

impl RunReport {
    pub(crate) fn fleet_failure(started_at: DateTime<Utc>, err: &GatewayError) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            fleet_error: Some(format!("failed to list instances: {}", err)),
            outcomes: Vec::new(),
        }
    }

    pub(crate) fn completed(started_at: DateTime<Utc>, outcomes: Vec<RetentionOutcome>) -> Self {
        Self {
            started_at,
            finished_at: Utc::now(),
            fleet_error: None,
            outcomes,
        }
    }

    pub fn is_fleet_failure(&self) -> bool {
        self.fleet_error.is_some()
    }

    /// True on a fleet failure or any failed instance.
    pub fn has_failures(&self) -> bool {
        self.is_fleet_failure() || self.outcomes.iter().any(RetentionOutcome::is_failure)
    }

    pub fn count(&self, action: RetentionAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }

    pub fn outcome_for(&self, instance_id: i64) -> Option<&RetentionOutcome> {
        self.outcomes.iter().find(|o| o.instance_id == instance_id)
    }

    /// Outcomes where a snapshot was deleted without a replacement.
    pub fn lost_snapshots(&self) -> impl Iterator<Item = &RetentionOutcome> {
        self.outcomes.iter().filter(|o| o.snapshot_lost)
    }

    /// One-line summary, e.g. `3 instances: 1 rotated, 1 bootstrapped, 1 failed`.
    pub fn summary(&self) -> String {
        if let Some(err) = &self.fleet_error {
            return format!("fleet failure: {}", err);
        }

        let failed = self.outcomes.iter().filter(|o| o.is_failure()).count();
        let mut summary = format!(
            "{} instances: {} rotated, {} bootstrapped, {} skipped, {} failed",
            self.outcomes.len(),
            self.count(RetentionAction::Rotated),
            self.count(RetentionAction::Bootstrapped),
            self.count(RetentionAction::SkippedNoop),
            failed
        );
        let lost = self.lost_snapshots().count();
        if lost > 0 {
            summary.push_str(&format!(", {} snapshot(s) lost", lost));
        }
        summary
    }
}

/// Result of deleting one snapshot during a purge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurgeEntry {
    pub snapshot_id: String,
    pub snapshot_name: String,
    /// Failure message; `None` means the snapshot was deleted.
    pub error: Option<String>,
}

impl PurgeEntry {
    pub fn is_deleted(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcome of purging every snapshot of one instance.
#[derive(Debug, Clone, Serialize)]
pub struct PurgeReport {
    pub instance_id: i64,
    /// Set when the inventory could not be listed; `entries` is then empty.
    pub fetch_error: Option<String>,
    /// One entry per snapshot, in inventory order.
    pub entries: Vec<PurgeEntry>,
}

impl PurgeReport {
    pub fn deleted_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_deleted()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.len() - self.deleted_count()
    }

    /// Inventory listed and every snapshot deleted (trivially true when empty).
    pub fn is_success(&self) -> bool {
        self.fetch_error.is_none() && self.failed_count() == 0
    }
}
