// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The trigger-shape evaluation seam.
//!
//! Computing an actual next-fire time from a cron expression or an interval
//! is explicitly out of scope for this crate: it depends on calendar
//! semantics and trigger-shape math that belong to the scheduler, not the
//! store. What the store needs is a narrow hook it can call during
//! acquisition and misfire handling without knowing which shape it's
//! looking at. [`TriggerScheduler`] is that hook; callers supply their own
//! implementation (real cron math, interval math, whatever they need) when
//! constructing a [`crate::store::JobStore`].

use qjs_core::{Calendar, Trigger};

/// Supplied by the caller. The store calls into this during acquisition and
/// misfire handling; it never inspects a trigger's shape fields itself.
pub trait TriggerScheduler: Send + Sync {
    /// The next fire time (epoch millis) after `trigger`'s current
    /// `next_fire_time`, or `None` if the trigger has no more fires.
    fn compute_next_fire(&self, trigger: &Trigger, calendar: Option<&Calendar>) -> Option<i64>;

    /// Advance `trigger` past one or more missed fires, per its own misfire
    /// policy. Expected to update `next_fire_time` (and may update
    /// shape-specific bookkeeping in `trigger.extra`, e.g. `timesTriggered`).
    fn update_after_misfire(&self, trigger: &mut Trigger, calendar: Option<&Calendar>);

    /// Advance `trigger` past the fire it just completed, computing its new
    /// `next_fire_time` (or clearing it to signal completion).
    fn on_triggered(&self, trigger: &mut Trigger, calendar: Option<&Calendar>);
}

/// A fixed-interval stand-in used by the store's own tests, where
/// deterministic math matters more than faithful cron semantics. Production
/// callers are expected to supply their own [`TriggerScheduler`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedIntervalScheduler {
    pub interval_ms: i64,
    pub repeat_count: Option<i64>,
}

impl FixedIntervalScheduler {
    pub fn new(interval_ms: i64) -> Self {
        Self { interval_ms, repeat_count: None }
    }

    pub fn with_repeat_count(interval_ms: i64, repeat_count: i64) -> Self {
        Self { interval_ms, repeat_count: Some(repeat_count) }
    }

    fn times_triggered(trigger: &Trigger) -> i64 {
        trigger.extra.get("timesTriggered").and_then(|v| v.as_i64()).unwrap_or(0)
    }

    fn exhausted(&self, trigger: &Trigger) -> bool {
        match self.repeat_count {
            Some(limit) => Self::times_triggered(trigger) >= limit,
            None => false,
        }
    }
}

impl TriggerScheduler for FixedIntervalScheduler {
    fn compute_next_fire(&self, trigger: &Trigger, _calendar: Option<&Calendar>) -> Option<i64> {
        if self.exhausted(trigger) {
            return None;
        }
        let base = trigger.next_fire_time.unwrap_or(trigger.start_time);
        let candidate = base + self.interval_ms;
        match trigger.end_time {
            Some(end) if candidate > end => None,
            _ => Some(candidate),
        }
    }

    fn update_after_misfire(&self, trigger: &mut Trigger, calendar: Option<&Calendar>) {
        trigger.next_fire_time = self.compute_next_fire(trigger, calendar);
    }

    fn on_triggered(&self, trigger: &mut Trigger, calendar: Option<&Calendar>) {
        let count = Self::times_triggered(trigger) + 1;
        trigger.extra.insert("timesTriggered".into(), serde_json::json!(count));
        trigger.previous_fire_time = trigger.next_fire_time;
        trigger.next_fire_time = self.compute_next_fire(trigger, calendar);
    }
}

#[cfg(test)]
#[path = "trigger_behavior_tests.rs"]
mod tests;
