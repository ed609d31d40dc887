// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Snapkeep Snapshot Gateway
//!
//! Authenticated access to a cloud provider's compute snapshots. The
//! [`SnapshotGateway`] trait is the only surface the retention engine sees;
//! [`ContaboGateway`] implements it against the Contabo compute API over HTTPS.
//!
//! The gateway owns everything transport-shaped: OAuth2 token acquisition and
//! refresh, request ids, pagination, status-code interpretation and response
//! envelopes. Every operation returns [`Result`], whose error renders as a
//! human-readable message.
//!
//! # Example
//!
//! ```no_run
//! use snapkeep_gateway::{ContaboGateway, GatewayConfig, SnapshotGateway};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = ContaboGateway::new(GatewayConfig::from_env()?)?;
//!
//! for instance in gateway.list_instances().await? {
//!     let snapshots = gateway.list_snapshots(instance.id).await?;
//!     println!("{} has {} snapshot(s)", instance.name, snapshots.len());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod gateway;
mod session;
mod types;

pub use client::ContaboGateway;
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::SnapshotGateway;
pub use session::AuthSession;
pub use types::{
    CreateSnapshotRequest, Instance, InstanceListResponse, InstanceRecord, Pagination, Snapshot,
    SnapshotEnvelope, SnapshotRecord, TokenResponse,
};
