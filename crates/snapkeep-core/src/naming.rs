// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Names given to snapshots the engine creates from scratch.

use snapkeep_gateway::Instance;

/// Name of the first snapshot of an instance: `{name}-Initial-Snapshot`, with
/// underscores in the instance name turned into hyphens.
pub fn bootstrap_name(instance: &Instance) -> String {
    format!("{}-Initial-Snapshot", instance.name.replace('_', "-"))
}

/// Description of the first snapshot. The instance name is kept verbatim.
pub fn bootstrap_description(instance: &Instance) -> String {
    format!(
        "Initial snapshot auto-created by snapkeep for instance {} ({})",
        instance.id, instance.name
    )
}
