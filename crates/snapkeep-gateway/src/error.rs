// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for snapkeep-gateway.

use thiserror::Error;

/// Result type using GatewayError.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur when talking to the snapshot provider.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error (missing or invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Token acquisition failed.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure (DNS, TLS, connection reset).
    #[error("http error: {0}")]
    Http(String),

    /// Request timed out.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// Provider answered with a non-success status.
    #[error("api error [{status}]: {message}")]
    Api { status: u16, message: String },

    /// Request rejected before it was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Response was well-formed HTTP but unusable.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GatewayError {
    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        // Timeouts are mapped by the caller, which knows the configured duration.
        if err.is_decode() {
            GatewayError::Serialization(err.to_string())
        } else {
            GatewayError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Serialization(err.to_string())
    }
}
