// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! ContaboGateway: the HTTPS implementation of [`SnapshotGateway`].

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::SnapshotGateway;
use crate::session::AuthSession;
use crate::types::{
    CreateSnapshotRequest, Instance, InstanceListResponse, Snapshot, SnapshotEnvelope,
};

/// Gateway backed by the Contabo compute API.
///
/// Requests carry a bearer token from the owned [`AuthSession`] and a fresh
/// `x-request-id`. A 401 invalidates the token and the request is retried once.
pub struct ContaboGateway {
    http: reqwest::Client,
    session: AuthSession,
    config: GatewayConfig,
}

impl ContaboGateway {
    /// Create a gateway with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {}", e)))?;

        let session = AuthSession::new(http.clone(), &config);

        Ok(Self {
            http,
            session,
            config,
        })
    }

    /// Create a gateway from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    /// Get the gateway configuration.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get the authentication session.
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    /// Send an authenticated request, returning only 2xx responses.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&CreateSnapshotRequest>,
    ) -> Result<reqwest::Response> {
        let url = self.config.endpoint(segments)?;
        let mut refreshed = false;

        loop {
            let token = self.session.bearer().await?;
            let request_id = Uuid::new_v4().to_string();

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&token)
                .header("x-request-id", &request_id);
            if !query.is_empty() {
                request = request.query(query);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            debug!(%method, %url, %request_id, "Sending request");
            let response = request.send().await.map_err(|e| self.transport_error(e))?;
            let status = response.status();
            debug!(status = status.as_u16(), %request_id, "Received response");

            if status == StatusCode::UNAUTHORIZED && !refreshed {
                warn!(%request_id, "Access token rejected, refreshing once");
                self.session.invalidate(&token).await;
                refreshed = true;
                continue;
            }

            if !status.is_success() {
                return Err(api_error(response).await);
            }

            return Ok(response);
        }
    }

    async fn read_json<T: DeserializeOwned + Default>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(T::default());
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn transport_error(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.config.request_timeout.as_millis() as u64)
        } else {
            GatewayError::from(err)
        }
    }
}

async fn api_error(response: reqwest::Response) -> GatewayError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body
    };
    GatewayError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl SnapshotGateway for ContaboGateway {
    #[instrument(skip(self))]
    async fn list_instances(&self) -> Result<Vec<Instance>> {
        let mut instances = Vec::new();
        let mut page: u32 = 1;

        loop {
            let response = self
                .send(
                    Method::GET,
                    &["v1", "compute", "instances"],
                    &[
                        ("page", page.to_string()),
                        ("size", self.config.page_size.to_string()),
                    ],
                    None,
                )
                .await?;
            let body: InstanceListResponse = self.read_json(response).await?;

            let records = body.data.unwrap_or_default();
            let fetched = records.len();
            instances.extend(records.into_iter().map(Instance::from));

            let total_pages = body.pagination.map(|p| p.total_pages).unwrap_or(1);
            debug!(page, total_pages, fetched, "Fetched instance page");
            if fetched == 0 || page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(instances)
    }

    #[instrument(skip(self))]
    async fn list_snapshots(&self, instance_id: i64) -> Result<Vec<Snapshot>> {
        let instance = instance_id.to_string();
        let response = self
            .send(
                Method::GET,
                &["v1", "compute", "instances", instance.as_str(), "snapshots"],
                &[],
                None,
            )
            .await?;
        let envelope: SnapshotEnvelope = self.read_json(response).await?;
        let snapshots = envelope.into_snapshots();
        debug!(count = snapshots.len(), "Fetched snapshots");
        Ok(snapshots)
    }

    #[instrument(skip(self, description))]
    async fn create_snapshot(
        &self,
        instance_id: i64,
        name: &str,
        description: &str,
    ) -> Result<Snapshot> {
        let instance = instance_id.to_string();
        let body = CreateSnapshotRequest {
            name: name.to_string(),
            description: description.to_string(),
        };
        let response = self
            .send(
                Method::POST,
                &["v1", "compute", "instances", instance.as_str(), "snapshots"],
                &[],
                Some(&body),
            )
            .await?;
        let envelope: SnapshotEnvelope = self.read_json(response).await?;

        let snapshot = envelope.into_snapshots().into_iter().next().ok_or_else(|| {
            GatewayError::UnexpectedResponse(format!(
                "create response for instance {} contained no snapshot",
                instance_id
            ))
        })?;
        debug!(snapshot_id = %snapshot.id, "Snapshot created");
        Ok(snapshot)
    }

    #[instrument(skip(self))]
    async fn delete_snapshot(&self, instance_id: i64, snapshot_id: &str) -> Result<()> {
        // Dot segments would be collapsed out of the path and retarget the request.
        if matches!(snapshot_id, "" | "." | "..") {
            return Err(GatewayError::InvalidRequest(format!(
                "invalid snapshot id: {:?}",
                snapshot_id
            )));
        }
        let instance = instance_id.to_string();
        self.send(
            Method::DELETE,
            &["v1", "compute", "instances", instance.as_str(), "snapshots", snapshot_id],
            &[],
            None,
        )
        .await?;
        debug!("Snapshot deleted");
        Ok(())
    }
}
