// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger lifecycle states.

use serde::{Deserialize, Serialize};

/// Where a trigger sits in its lifecycle: waiting -> acquired -> executing ->
/// complete / error / deleted, with paused/blocked branches layered on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    Waiting,
    Paused,
    /// Claimed by a lock document; owned by exactly one node until release or expiry.
    Acquired,
    Complete,
    Error,
    /// Held back by a job-level concurrency lock. See design notes: no code
    /// path currently transitions a trigger into this state (partial).
    Blocked,
    /// `Blocked`, but the trigger was also paused while blocked.
    PausedBlocked,
    Deleted,
}

impl TriggerState {
    pub fn is_paused(&self) -> bool {
        matches!(self, TriggerState::Paused | TriggerState::PausedBlocked)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TriggerState::Complete | TriggerState::Error | TriggerState::Deleted)
    }
}

crate::simple_display! {
    TriggerState {
        Waiting => "waiting",
        Paused => "paused",
        Acquired => "acquired",
        Complete => "complete",
        Error => "error",
        Blocked => "blocked",
        PausedBlocked => "paused_blocked",
        Deleted => "deleted",
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
