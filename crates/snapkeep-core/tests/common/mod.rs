// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory gateway that records every call and fails on demand.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use snapkeep_core::{GatewayError, Instance, Result, Snapshot, SnapshotGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListInstances,
    ListSnapshots(i64),
    Create {
        instance_id: i64,
        name: String,
        description: String,
    },
    Delete {
        instance_id: i64,
        snapshot_id: String,
    },
}

#[derive(Default)]
struct State {
    instances: Vec<Instance>,
    snapshots: HashMap<i64, Vec<Snapshot>>,
    fail_list_instances: Option<String>,
    fail_list_snapshots: HashSet<i64>,
    fail_create: HashSet<i64>,
    fail_delete: HashSet<String>,
    calls: Vec<Call>,
    created: u32,
}

#[derive(Default)]
pub struct RecordingGateway {
    state: Mutex<State>,
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

/// Snapshot created `minutes` after the base time.
pub fn snap(id: &str, minutes: i64) -> Snapshot {
    Snapshot {
        id: id.to_string(),
        name: format!("{}-name", id),
        description: format!("{}-description", id),
        created_date: base_time() + Duration::minutes(minutes),
        auto_delete_date: None,
    }
}

fn injected(what: &str) -> GatewayError {
    GatewayError::Api {
        status: 500,
        message: format!("injected {} failure", what),
    }
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(self, id: i64, name: &str, snapshots: Vec<Snapshot>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.instances.push(Instance::new(id, name, "running"));
            state.snapshots.insert(id, snapshots);
        }
        self
    }

    pub fn failing_list_instances(self, message: &str) -> Self {
        self.state.lock().unwrap().fail_list_instances = Some(message.to_string());
        self
    }

    pub fn failing_list_snapshots(self, instance_id: i64) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_list_snapshots
            .insert(instance_id);
        self
    }

    pub fn failing_create(self, instance_id: i64) -> Self {
        self.state.lock().unwrap().fail_create.insert(instance_id);
        self
    }

    pub fn failing_delete(self, snapshot_id: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .fail_delete
            .insert(snapshot_id.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn calls_for(&self, instance_id: i64) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| match call {
                Call::ListInstances => false,
                Call::ListSnapshots(id) => *id == instance_id,
                Call::Create { instance_id: id, .. } | Call::Delete { instance_id: id, .. } => {
                    *id == instance_id
                }
            })
            .collect()
    }

    pub fn creates(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .collect()
    }

    pub fn deletes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Delete { .. }))
            .collect()
    }

    /// Snapshot ids currently held for an instance.
    pub fn snapshot_ids(&self, instance_id: i64) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .snapshots
            .get(&instance_id)
            .map(|s| s.iter().map(|s| s.id.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SnapshotGateway for RecordingGateway {
    async fn list_instances(&self) -> Result<Vec<Instance>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListInstances);
        if let Some(message) = &state.fail_list_instances {
            return Err(GatewayError::Http(message.clone()));
        }
        Ok(state.instances.clone())
    }

    async fn list_snapshots(&self, instance_id: i64) -> Result<Vec<Snapshot>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListSnapshots(instance_id));
        if state.fail_list_snapshots.contains(&instance_id) {
            return Err(injected("list"));
        }
        Ok(state
            .snapshots
            .get(&instance_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_snapshot(
        &self,
        instance_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Snapshot> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Create {
            instance_id,
            name: name.to_string(),
            description: description.to_string(),
        });
        if state.fail_create.contains(&instance_id) {
            return Err(injected("create"));
        }

        state.created += 1;
        let snapshot = Snapshot {
            id: format!("new-{}", state.created),
            name: name.to_string(),
            description: description.to_string(),
            created_date: base_time() + Duration::days(1),
            auto_delete_date: None,
        };
        state
            .snapshots
            .entry(instance_id)
            .or_default()
            .push(snapshot.clone());
        Ok(snapshot)
    }

    async fn delete_snapshot(&self, instance_id: i64, snapshot_id: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::Delete {
            instance_id,
            snapshot_id: snapshot_id.to_string(),
        });
        if state.fail_delete.contains(snapshot_id) {
            return Err(injected("delete"));
        }
        if let Some(snapshots) = state.snapshots.get_mut(&instance_id) {
            snapshots.retain(|s| s.id != snapshot_id);
        }
        Ok(())
    }
}
