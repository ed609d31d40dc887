// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Retention policy knobs.

/// Behavior switches for a rotation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Create a first snapshot for instances that have none. When disabled such
    /// instances are reported as skipped.
    pub bootstrap_empty: bool,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            bootstrap_empty: true,
        }
    }
}

impl RetentionPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a policy from environment variables.
    ///
    /// Environment variables:
    /// - `SNAPKEEP_BOOTSTRAP_EMPTY`: bootstrap empty instances (default: "true";
    ///   "false", "0", "no" and "off" disable it)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bootstrap_empty = lookup("SNAPKEEP_BOOTSTRAP_EMPTY")
            .map(|v| {
                !matches!(
                    v.trim().to_lowercase().as_str(),
                    "false" | "0" | "no" | "off"
                )
            })
            .unwrap_or(true);

        Self { bootstrap_empty }
    }

    pub fn with_bootstrap_empty(mut self, enabled: bool) -> Self {
        self.bootstrap_empty = enabled;
        self
    }
}
