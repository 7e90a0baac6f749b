// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The scheduler-facing notification seam.
//!
//! The store doesn't run a scheduling loop itself; it tells the scheduler
//! when something happened that might change the schedule. `NoopSignaler`
//! is a reasonable default for tests and for callers that poll instead of
//! reacting to signals.

use qjs_core::Trigger;
use parking_lot::Mutex;

pub trait SchedulerSignaler: Send + Sync {
    /// A trigger's `nextFireTime` had already elapsed by more than the
    /// misfire threshold when it was found.
    fn trigger_misfired(&self, trigger: &Trigger);

    /// A trigger reached a terminal state (complete, error, deleted) and
    /// won't fire again.
    fn trigger_finalized(&self, trigger: &Trigger);

    /// Something changed that could affect when the scheduler should next
    /// wake up (a trigger paused/resumed, a group paused/resumed, a job
    /// removed).
    fn scheduling_change(&self);
}

#[derive(Debug, Default)]
pub struct NoopSignaler;

impl SchedulerSignaler for NoopSignaler {
    fn trigger_misfired(&self, _trigger: &Trigger) {}
    fn trigger_finalized(&self, _trigger: &Trigger) {}
    fn scheduling_change(&self) {}
}

/// Records every call for test assertions. Not behind `test-support`: it's
/// plain data with no access to crate internals, so there's no surface to
/// gate.
#[derive(Default)]
pub struct RecordingSignaler {
    inner: Mutex<RecordingSignalerState>,
}

#[derive(Default)]
struct RecordingSignalerState {
    misfired: Vec<String>,
    finalized: Vec<String>,
    scheduling_changes: u32,
}

impl RecordingSignaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn misfired_keys(&self) -> Vec<String> {
        self.inner.lock().misfired.clone()
    }

    pub fn finalized_keys(&self) -> Vec<String> {
        self.inner.lock().finalized.clone()
    }

    pub fn scheduling_change_count(&self) -> u32 {
        self.inner.lock().scheduling_changes
    }
}

impl SchedulerSignaler for RecordingSignaler {
    fn trigger_misfired(&self, trigger: &Trigger) {
        self.inner.lock().misfired.push(trigger.key.to_string());
    }

    fn trigger_finalized(&self, trigger: &Trigger) {
        self.inner.lock().finalized.push(trigger.key.to_string());
    }

    fn scheduling_change(&self) {
        self.inner.lock().scheduling_changes += 1;
    }
}

#[cfg(test)]
#[path = "signaler_tests.rs"]
mod tests;
