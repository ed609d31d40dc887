// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Configuration for the snapshot gateway.

use std::fmt;
use std::time::Duration;

use crate::error::{GatewayError, Result};

const DEFAULT_API_URL: &str = "https://api.contabo.com";
const DEFAULT_AUTH_URL: &str =
    "https://auth.contabo.com/auth/realms/contabo/protocol/openid-connect/token";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_PAGE_SIZE: u32 = 100;

/// Configuration for the ContaboGateway.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL of the compute API.
    pub api_url: String,
    /// OpenID Connect token endpoint.
    pub auth_url: String,
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// API user (password grant username).
    pub api_user: String,
    /// API password.
    pub api_password: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Page size used when listing instances.
    pub page_size: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            api_user: String::new(),
            api_password: String::new(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

// Secrets never reach logs.
impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_url", &self.api_url)
            .field("auth_url", &self.auth_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_user", &self.api_user)
            .field("api_password", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl GatewayConfig {
    /// Create a configuration with the given credentials and default endpoints.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_user: impl Into<String>,
        api_password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            api_user: api_user.into(),
            api_password: api_password.into(),
            ..Self::default()
        }
    }

    /// Create a configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CONTABO_CLIENT_ID`, `CONTABO_CLIENT_SECRET`: OAuth2 client (required)
    /// - `CONTABO_API_USER`, `CONTABO_API_PASSWORD`: API credentials (required)
    /// - `CONTABO_API_URL`: API base URL (default: "https://api.contabo.com")
    /// - `CONTABO_AUTH_URL`: token endpoint (default: Contabo's OpenID realm)
    /// - `SNAPKEEP_REQUEST_TIMEOUT_MS`: request timeout in milliseconds (default: 30000)
    /// - `SNAPKEEP_PAGE_SIZE`: instance listing page size (default: 100)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| GatewayError::Config(format!("{} is not set", key)))
        };

        let request_timeout_ms: u64 = lookup("SNAPKEEP_REQUEST_TIMEOUT_MS")
            .unwrap_or_else(|| DEFAULT_REQUEST_TIMEOUT_MS.to_string())
            .parse()
            .map_err(|e| {
                GatewayError::Config(format!("invalid SNAPKEEP_REQUEST_TIMEOUT_MS: {}", e))
            })?;

        let page_size: u32 = lookup("SNAPKEEP_PAGE_SIZE")
            .unwrap_or_else(|| DEFAULT_PAGE_SIZE.to_string())
            .parse()
            .map_err(|e| GatewayError::Config(format!("invalid SNAPKEEP_PAGE_SIZE: {}", e)))?;
        if page_size == 0 {
            return Err(GatewayError::Config(
                "SNAPKEEP_PAGE_SIZE must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            api_url: lookup("CONTABO_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            auth_url: lookup("CONTABO_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            client_id: required("CONTABO_CLIENT_ID")?,
            client_secret: required("CONTABO_CLIENT_SECRET")?,
            api_user: required("CONTABO_API_USER")?,
            api_password: required("CONTABO_API_PASSWORD")?,
            request_timeout: Duration::from_millis(request_timeout_ms),
            page_size,
        })
    }

    /// Set the API base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the token endpoint URL.
    pub fn with_auth_url(mut self, url: impl Into<String>) -> Self {
        self.auth_url = url.into();
        self
    }

    /// Set the request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the instance listing page size.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// API URL for the given path segments.
    ///
    /// Each segment is percent-encoded, so a `/` or `?` inside an id stays part
    /// of that segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url> {
        let invalid = || GatewayError::Config(format!("invalid API URL: {}", self.api_url));
        let mut url = reqwest::Url::parse(&self.api_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn credentials() -> HashMap<String, String> {
        vars(&[
            ("CONTABO_CLIENT_ID", "client"),
            ("CONTABO_CLIENT_SECRET", "secret"),
            ("CONTABO_API_USER", "ops@example.com"),
            ("CONTABO_API_PASSWORD", "hunter2"),
        ])
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.api_url, "https://api.contabo.com");
        assert!(config.auth_url.ends_with("/openid-connect/token"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_from_lookup_defaults() {
        let env = credentials();
        let config = GatewayConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.client_id, "client");
        assert_eq!(config.api_user, "ops@example.com");
        assert_eq!(config.api_url, "https://api.contabo.com");
        assert_eq!(config.page_size, 100);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let mut env = credentials();
        env.extend(vars(&[
            ("CONTABO_API_URL", "http://localhost:9000"),
            ("SNAPKEEP_REQUEST_TIMEOUT_MS", "1500"),
            ("SNAPKEEP_PAGE_SIZE", "25"),
        ]));
        let config = GatewayConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.request_timeout, Duration::from_millis(1500));
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn test_from_lookup_missing_credential() {
        let mut env = credentials();
        env.remove("CONTABO_API_PASSWORD");
        let err = GatewayConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, GatewayError::Config(_)));
        assert!(err.to_string().contains("CONTABO_API_PASSWORD"));
    }

    #[test]
    fn test_from_lookup_invalid_numbers() {
        let mut env = credentials();
        env.insert("SNAPKEEP_REQUEST_TIMEOUT_MS".into(), "soon".into());
        let err = GatewayConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(err.to_string().contains("SNAPKEEP_REQUEST_TIMEOUT_MS"));

        let mut env = credentials();
        env.insert("SNAPKEEP_PAGE_SIZE".into(), "0".into());
        assert!(GatewayConfig::from_lookup(|k| env.get(k).cloned()).is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = GatewayConfig::new("client", "top-secret", "user", "pa55word");
        let debug = format!("{:?}", config);
        assert!(debug.contains("client"));
        assert!(!debug.contains("top-secret"));
        assert!(!debug.contains("pa55word"));
    }

    #[test]
    fn test_builder_methods() {
        let config = GatewayConfig::new("c", "s", "u", "p")
            .with_api_url("http://127.0.0.1:8080/")
            .with_auth_url("http://127.0.0.1:8080/token")
            .with_request_timeout(Duration::from_secs(5))
            .with_page_size(0);

        assert_eq!(config.api_url, "http://127.0.0.1:8080/");
        assert_eq!(config.auth_url, "http://127.0.0.1:8080/token");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.page_size, 1);
    }

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let config = GatewayConfig::new("c", "s", "u", "p").with_api_url("http://127.0.0.1:8080/");

        let url = config
            .endpoint(&["v1", "compute", "instances", "7", "snapshots", "x/../8?a#b"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/v1/compute/instances/7/snapshots/x%2F..%2F8%3Fa%23b"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let config = GatewayConfig::new("c", "s", "u", "p").with_api_url("http://proxy.local/contabo");

        let url = config.endpoint(&["v1", "compute", "instances"]).unwrap();
        assert_eq!(url.as_str(), "http://proxy.local/contabo/v1/compute/instances");
    }

    #[test]
    fn test_endpoint_rejects_invalid_api_url() {
        let config = GatewayConfig::new("c", "s", "u", "p").with_api_url("not a url");
        assert!(matches!(
            config.endpoint(&["v1"]),
            Err(GatewayError::Config(_))
        ));
    }
}
