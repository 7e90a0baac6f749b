// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock documents: the sole coordination primitive between cluster nodes.

use crate::key::LockKey;
use serde::{Deserialize, Serialize};

/// A claim on a `(group, name)` pair, imprinted with the owning node's
/// `instanceId` and the time it was taken. Two uses share this one shape:
/// a trigger-acquisition lock (keyed by the trigger's own key) and a
/// job-concurrency lock (keyed by `JobKey::as_lock_key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lock {
    pub key: LockKey,
    pub instance_id: String,
    /// Epoch milliseconds at acquisition; the only clock-derived field the
    /// lock carries, and the one expiry windows are measured against.
    pub lock_time_ms: u64,
}

impl Lock {
    pub fn new(key: LockKey, instance_id: impl Into<String>, lock_time_ms: u64) -> Self {
        Self { key, instance_id: instance_id.into(), lock_time_ms }
    }

    /// A lock is expired once it has been held longer than `timeout_ms`,
    /// measured from `now_ms`. Negative/underflowing deltas (clock skew) are
    /// treated as not-yet-expired rather than panicking.
    pub fn is_expired(&self, now_ms: u64, timeout_ms: u64) -> bool {
        now_ms.saturating_sub(self.lock_time_ms) > timeout_ms
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
