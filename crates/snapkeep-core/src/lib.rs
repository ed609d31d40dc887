// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Snapkeep Retention Rotation Engine
//!
//! Enforces a single-snapshot retention policy across a fleet of compute
//! instances. For each instance the engine reads the snapshot inventory and
//! either rotates (delete the oldest, recreate it under the same name and
//! description) or bootstraps (create a first snapshot when none exist).
//!
//! # Failure isolation
//!
//! Only a failed fleet listing aborts a run. Per-instance failures are recorded
//! in the [`RunReport`] and the run moves on; the report always holds one
//! [`RetentionOutcome`] per instance, in fleet order. A replacement snapshot is
//! never created for an instance whose delete failed, and a create failure after
//! a successful delete is flagged as snapshot loss.
//!
//! Nothing in this crate's library prints or logs. Callers consume the returned
//! reports.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use snapkeep_core::{RetentionPolicy, SnapshotService};
//! use snapkeep_gateway::ContaboGateway;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(ContaboGateway::from_env()?);
//! let service = SnapshotService::new(gateway, RetentionPolicy::default());
//!
//! let report = service.rotate_fleet().await;
//! for outcome in &report.outcomes {
//!     println!("{}: {} ({})", outcome.instance_id, outcome.action, outcome.detail);
//! }
//! # Ok(())
//! # }
//! ```

mod engine;
mod fleet;
mod naming;
mod outcome;
mod policy;
mod purge;
mod service;

pub use engine::{rotate_instance, select_oldest};
pub use fleet::rotate_fleet;
pub use naming::{bootstrap_description, bootstrap_name};
pub use outcome::{PurgeEntry, PurgeReport, RetentionAction, RetentionOutcome, RunReport};
pub use policy::RetentionPolicy;
pub use purge::purge_instance;
pub use service::SnapshotService;

pub use snapkeep_gateway::{GatewayError, Instance, Result, Snapshot, SnapshotGateway};
