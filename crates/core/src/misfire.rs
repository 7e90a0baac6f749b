// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Misfire policy codes and job-completion instructions.

use serde::{Deserialize, Serialize};

/// Per-trigger policy selecting how a trigger advances after a missed fire.
///
/// Numeric codes mirror the historical convention: `-1` means "use the
/// scheduler's smart-policy default", `0` means ignore misfires entirely,
/// positive values are shape-specific policies interpreted by the trigger's
/// persistence helper (see `qjs_storage::registry`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MisfireInstruction(pub i32);

impl MisfireInstruction {
    pub const SMART_POLICY: MisfireInstruction = MisfireInstruction(-1);
    pub const IGNORE: MisfireInstruction = MisfireInstruction(0);

    pub fn is_ignore(&self) -> bool {
        *self == Self::IGNORE
    }
}

impl Default for MisfireInstruction {
    fn default() -> Self {
        Self::SMART_POLICY
    }
}

/// The instruction a completed job execution returns to the store, naming
/// what should happen to the trigger(s) that caused it to fire.
///
/// State persistence for the `SetTriggerComplete` / `SetTriggerError` /
/// `SetAllJobTriggers*` variants is a known gap: only a scheduling-change
/// signal is emitted today (see design notes, open questions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionInstruction {
    NoInstruction,
    ReExecuteJob,
    SetTriggerComplete,
    DeleteTrigger,
    SetAllJobTriggersComplete,
    SetTriggerError,
    SetAllJobTriggersError,
}

#[cfg(test)]
#[path = "misfire_tests.rs"]
mod tests;
