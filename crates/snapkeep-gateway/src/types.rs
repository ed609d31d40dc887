// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Domain types and provider wire formats.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A compute instance as seen at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    /// Provider instance id.
    pub id: i64,
    /// Instance name.
    pub name: String,
    /// Display name shown in the provider console (may be empty).
    #[serde(default)]
    pub display_name: String,
    /// Provider status string (e.g. "running").
    pub status: String,
}

impl Instance {
    pub fn new(id: i64, name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            display_name: String::new(),
            status: status.into(),
        }
    }
}

/// A point-in-time image of an instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Provider-assigned snapshot id.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Ordering key for retention.
    pub created_date: DateTime<Utc>,
    /// When the provider will remove the snapshot on its own, if scheduled.
    pub auto_delete_date: Option<DateTime<Utc>>,
}

// ============================================================================
// Wire formats
// ============================================================================

/// Instance entry in `GET /v1/compute/instances`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceRecord {
    pub instance_id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<InstanceRecord> for Instance {
    fn from(record: InstanceRecord) -> Self {
        Self {
            id: record.instance_id,
            name: record.name.unwrap_or_default(),
            display_name: record.display_name.unwrap_or_default(),
            status: record.status.unwrap_or_default(),
        }
    }
}

/// Pagination block returned by list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page: u32,
}

/// Body of `GET /v1/compute/instances`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstanceListResponse {
    #[serde(default)]
    pub data: Option<Vec<InstanceRecord>>,
    #[serde(rename = "_pagination", alias = "pagination", default)]
    pub pagination: Option<Pagination>,
}

/// Snapshot entry in list and create responses.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    pub snapshot_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(alias = "createdAt")]
    pub created_date: DateTime<Utc>,
    #[serde(default)]
    pub auto_delete_date: Option<DateTime<Utc>>,
}

impl From<SnapshotRecord> for Snapshot {
    fn from(record: SnapshotRecord) -> Self {
        Self {
            id: record.snapshot_id,
            name: record.name.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            created_date: record.created_date,
            auto_delete_date: record.auto_delete_date,
        }
    }
}

/// `{"data": [...]}` envelope shared by the snapshot list and create endpoints.
///
/// A missing or null `data` decodes as no snapshots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotEnvelope {
    #[serde(default)]
    pub data: Option<Vec<SnapshotRecord>>,
}

impl SnapshotEnvelope {
    pub fn into_snapshots(self) -> Vec<Snapshot> {
        self.data
            .unwrap_or_default()
            .into_iter()
            .map(Snapshot::from)
            .collect()
    }
}

/// Body of `POST /v1/compute/instances/{id}/snapshots`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSnapshotRequest {
    pub name: String,
    pub description: String,
}

/// OpenID Connect token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_snapshot_record_accepts_both_timestamp_names() {
        let created_date: SnapshotRecord = serde_json::from_value(serde_json::json!({
            "snapshotId": "snap-1",
            "name": "daily",
            "description": "nightly image",
            "createdDate": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        let created_at: SnapshotRecord = serde_json::from_value(serde_json::json!({
            "snapshotId": "snap-2",
            "name": "daily",
            "createdAt": "2024-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(created_date.created_date, created_at.created_date);
        assert_eq!(
            created_date.created_date,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_snapshot_from_record_fills_missing_text() {
        let record: SnapshotRecord = serde_json::from_value(serde_json::json!({
            "snapshotId": "snap-9",
            "name": null,
            "createdDate": "2024-03-01T10:00:00Z",
            "autoDeleteDate": "2024-04-01T10:00:00Z"
        }))
        .unwrap();
        let snapshot = Snapshot::from(record);

        assert_eq!(snapshot.id, "snap-9");
        assert_eq!(snapshot.name, "");
        assert_eq!(snapshot.description, "");
        assert!(snapshot.auto_delete_date.is_some());
    }

    #[test]
    fn test_envelope_null_data_is_empty() {
        let envelope: SnapshotEnvelope =
            serde_json::from_value(serde_json::json!({"data": null})).unwrap();
        assert!(envelope.into_snapshots().is_empty());

        let envelope: SnapshotEnvelope = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(envelope.into_snapshots().is_empty());
    }

    #[test]
    fn test_instance_list_response_with_pagination() {
        let body: InstanceListResponse = serde_json::from_value(serde_json::json!({
            "_pagination": {"size": 2, "totalElements": 3, "totalPages": 2, "page": 1},
            "data": [
                {"instanceId": 101, "name": "vmi101", "displayName": "web", "status": "running"},
                {"instanceId": 102, "name": "vmi102", "status": "stopped"}
            ]
        }))
        .unwrap();

        let pagination = body.pagination.unwrap();
        assert_eq!(pagination.total_pages, 2);

        let instances: Vec<Instance> = body
            .data
            .unwrap()
            .into_iter()
            .map(Instance::from)
            .collect();
        assert_eq!(instances[0].display_name, "web");
        assert_eq!(instances[1].display_name, "");
        assert_eq!(instances[1].status, "stopped");
    }
}
