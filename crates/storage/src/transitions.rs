// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pause/resume state transitions, by key, by group matcher, or globally.
//!
//! A trigger resumed by key transitions straight back to `waiting` without
//! consulting whether its group is still marked paused, and a trigger newly
//! stored into an already-paused group is not auto-paused — both match the
//! source this was distilled from rather than what might seem more
//! consistent (see DESIGN.md open questions).

use std::collections::BTreeSet;

use qjs_core::{GroupMatcher, JobKey, StoreResult, TriggerKey, TriggerState};

use crate::document::DocumentStore;
use crate::groups::GroupStateTracker;
use crate::registry::TriggerShapeRegistry;
use crate::schedule::ScheduleCrud;

pub struct StateTransitions<'a> {
    store: &'a dyn DocumentStore,
    registry: &'a TriggerShapeRegistry,
}

impl<'a> StateTransitions<'a> {
    pub fn new(store: &'a dyn DocumentStore, registry: &'a TriggerShapeRegistry) -> Self {
        Self { store, registry }
    }

    fn crud(&self) -> ScheduleCrud<'a> {
        ScheduleCrud::new(self.store, self.registry)
    }

    fn groups(&self) -> GroupStateTracker<'a> {
        GroupStateTracker::new(self.store)
    }

    pub fn pause_trigger(&self, key: &TriggerKey) -> StoreResult<()> {
        if let Some(mut trigger) = self.crud().get_trigger(key)? {
            trigger.state = TriggerState::Paused;
            self.crud().persist_trigger(&trigger)?;
        }
        Ok(())
    }

    pub fn resume_trigger(&self, key: &TriggerKey) -> StoreResult<()> {
        if let Some(mut trigger) = self.crud().get_trigger(key)? {
            trigger.state = TriggerState::Waiting;
            self.crud().persist_trigger(&trigger)?;
        }
        Ok(())
    }

    /// Pauses every matching trigger and records each matched group as
    /// paused. Returns the set of groups touched.
    pub fn pause_triggers(&self, matcher: GroupMatcher) -> StoreResult<BTreeSet<String>> {
        let mut groups = BTreeSet::new();
        for key in self.crud().get_trigger_keys(matcher) {
            self.pause_trigger(&key)?;
            groups.insert(key.group.clone());
        }
        for group in &groups {
            self.groups().mark_trigger_group_paused(group);
        }
        Ok(groups)
    }

    pub fn resume_triggers(&self, matcher: GroupMatcher) -> StoreResult<BTreeSet<String>> {
        let mut groups = BTreeSet::new();
        for key in self.crud().get_trigger_keys(matcher) {
            self.resume_trigger(&key)?;
            groups.insert(key.group.clone());
        }
        for group in &groups {
            self.groups().unmark_trigger_group_paused(group);
        }
        Ok(groups)
    }

    pub fn pause_all(&self) -> StoreResult<()> {
        self.pause_triggers(GroupMatcher::Everything)?;
        Ok(())
    }

    pub fn resume_all(&self) -> StoreResult<()> {
        self.resume_triggers(GroupMatcher::Everything)?;
        Ok(())
    }

    /// Pauses a job by updating every trigger that references it.
    pub fn pause_job(&self, key: &JobKey) -> StoreResult<()> {
        for trigger in self.crud().get_triggers_for_job(key)? {
            self.pause_trigger(&trigger.key)?;
        }
        Ok(())
    }

    pub fn resume_job(&self, key: &JobKey) -> StoreResult<()> {
        for trigger in self.crud().get_triggers_for_job(key)? {
            self.resume_trigger(&trigger.key)?;
        }
        Ok(())
    }

    /// Pauses every job matching `matcher` and records the groups derived
    /// from those jobs' triggers as paused.
    pub fn pause_jobs(&self, matcher: GroupMatcher) -> StoreResult<BTreeSet<String>> {
        let mut groups = BTreeSet::new();
        for job_key in self.crud().get_job_keys(matcher) {
            self.pause_job(&job_key)?;
            groups.insert(job_key.group.clone());
        }
        for group in &groups {
            self.groups().mark_job_group_paused(group);
        }
        Ok(groups)
    }

    pub fn resume_jobs(&self, matcher: GroupMatcher) -> StoreResult<BTreeSet<String>> {
        let mut groups = BTreeSet::new();
        for job_key in self.crud().get_job_keys(matcher) {
            self.resume_job(&job_key)?;
            groups.insert(job_key.group.clone());
        }
        for group in &groups {
            self.groups().unmark_job_group_paused(group);
        }
        Ok(groups)
    }
}

#[cfg(test)]
#[path = "transitions_tests.rs"]
mod tests;
