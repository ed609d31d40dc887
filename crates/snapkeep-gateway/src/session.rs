// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! OAuth2 session owning the provider access token.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::types::TokenResponse;

/// Tokens are treated as expired this long before the provider says so.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        self.expires_at.is_none_or(|at| Instant::now() < at)
    }
}

/// Password-grant session against the provider's token endpoint.
///
/// The token lives behind an async mutex and is acquired while the lock is
/// held, so concurrent callers wait for one acquisition instead of racing.
pub struct AuthSession {
    http: reqwest::Client,
    auth_url: String,
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
    timeout_ms: u64,
    token: Mutex<Option<CachedToken>>,
}

impl AuthSession {
    pub fn new(http: reqwest::Client, config: &GatewayConfig) -> Self {
        Self {
            http,
            auth_url: config.auth_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            username: config.api_user.clone(),
            password: config.api_password.clone(),
            timeout_ms: config.request_timeout.as_millis() as u64,
            token: Mutex::new(None),
        }
    }

    /// Return a valid access token, acquiring one if none is cached or the
    /// cached one has expired.
    pub async fn bearer(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let token = self.acquire().await?;
        let value = token.value.clone();
        *guard = Some(token);
        Ok(value)
    }

    /// Drop the cached token if it is still the one the provider rejected.
    ///
    /// A token refreshed by another caller in the meantime is kept.
    pub async fn invalidate(&self, rejected: &str) {
        let mut guard = self.token.lock().await;
        if guard.as_ref().is_some_and(|t| t.value == rejected) {
            debug!("Discarding rejected access token");
            *guard = None;
        }
    }

    /// Whether a token is currently cached.
    pub async fn has_token(&self) -> bool {
        self.token.lock().await.is_some()
    }

    fn auth_error(&self, context: &str, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout_ms)
        } else {
            GatewayError::Auth(format!("{}: {}", context, err))
        }
    }

    #[instrument(skip(self), fields(auth_url = %self.auth_url))]
    async fn acquire(&self) -> Result<CachedToken> {
        debug!("Requesting access token");

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("username", self.username.as_str()),
            ("password", self.password.as_str()),
            ("grant_type", "password"),
        ];

        let response = self
            .http
            .post(&self.auth_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| self.auth_error("token request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Auth(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| self.auth_error("invalid token response", e))?;

        if token.access_token.is_empty() {
            return Err(GatewayError::Auth(
                "token endpoint returned an empty access token".to_string(),
            ));
        }

        let expires_at = token
            .expires_in
            .map(|secs| Instant::now() + Duration::from_secs(secs).saturating_sub(EXPIRY_MARGIN));

        info!(expires_in = ?token.expires_in, "Access token acquired");

        Ok(CachedToken {
            value: token.access_token,
            expires_at,
        })
    }
}
