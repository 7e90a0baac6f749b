// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`JobStore`]: the facade gluing a document store, configuration, trigger
//! shapes, a clock, a signaler, and a trigger scheduler into the full public
//! API. Everything here delegates to the component modules; `JobStore`
//! itself holds no state of its own beyond the references it was built with.

use std::collections::BTreeSet;

use qjs_core::{
    Calendar, Clock, CompletionInstruction, GroupMatcher, Job, JobKey, StoreResult, Trigger, TriggerKey,
};

use crate::acquire::AcquisitionProtocol;
use crate::bootstrap::Bootstrap;
use crate::config::StoreConfig;
use crate::document::DocumentStore;
use crate::fire::{FireBundle, FireProtocol};
use crate::groups::GroupStateTracker;
use crate::registry::TriggerShapeRegistry;
use crate::schedule::ScheduleCrud;
use crate::signaler::SchedulerSignaler;
use crate::transitions::StateTransitions;
use crate::trigger_behavior::TriggerScheduler;

pub struct JobStore<'a, C: Clock> {
    store: &'a dyn DocumentStore,
    registry: &'a TriggerShapeRegistry,
    config: &'a StoreConfig,
    clock: &'a C,
    signaler: &'a dyn SchedulerSignaler,
    scheduler: &'a dyn TriggerScheduler,
}

impl<'a, C: Clock> JobStore<'a, C> {
    pub fn new(
        store: &'a dyn DocumentStore,
        registry: &'a TriggerShapeRegistry,
        config: &'a StoreConfig,
        clock: &'a C,
        signaler: &'a dyn SchedulerSignaler,
        scheduler: &'a dyn TriggerScheduler,
    ) -> Self {
        Self { store, registry, config, clock, signaler, scheduler }
    }

    fn crud(&self) -> ScheduleCrud<'a> {
        ScheduleCrud::new(self.store, self.registry)
    }

    fn groups(&self) -> GroupStateTracker<'a> {
        GroupStateTracker::new(self.store)
    }

    fn transitions(&self) -> StateTransitions<'a> {
        StateTransitions::new(self.store, self.registry)
    }

    fn acquisition(&self) -> AcquisitionProtocol<'a, C> {
        AcquisitionProtocol::new(self.store, self.registry, self.config, self.clock, self.signaler, self.scheduler)
    }

    fn fire(&self) -> FireProtocol<'a, C> {
        FireProtocol::new(self.store, self.registry, self.config, self.clock, self.signaler, self.scheduler)
    }

    /// Runs index setup (no-op for the in-process backend) and self-lock
    /// cleanup. Callers invoke this once before joining a cluster.
    pub fn initialize(&self) -> StoreResult<usize> {
        self.config.validate()?;
        Bootstrap::new(self.store, self.config).run()
    }

    // --- schedule CRUD -----------------------------------------------

    pub fn store_job(&self, job: &Job, replace: bool) -> StoreResult<qjs_core::JobId> {
        self.crud().store_job(job, replace)
    }

    pub fn store_trigger(&self, trigger: &Trigger, replace: bool) -> StoreResult<()> {
        self.crud().store_trigger(trigger, replace)
    }

    pub fn remove_job(&self, key: &JobKey) -> StoreResult<bool> {
        self.crud().remove_job(key)
    }

    pub fn remove_trigger(&self, key: &TriggerKey) -> StoreResult<bool> {
        self.crud().remove_trigger(key)
    }

    pub fn replace_trigger(&self, key: &TriggerKey, new_trigger: Trigger) -> StoreResult<()> {
        self.crud().replace_trigger(key, new_trigger)
    }

    pub fn store_calendar(&self, calendar: &Calendar, replace: bool, update_triggers: bool) -> StoreResult<()> {
        self.crud().store_calendar(calendar, replace, update_triggers)
    }

    pub fn remove_calendar(&self, name: &str) -> bool {
        self.crud().remove_calendar(name)
    }

    pub fn retrieve_calendar(&self, name: &str) -> StoreResult<Calendar> {
        self.crud().retrieve_calendar(name)
    }

    pub fn get_calendar_names(&self) -> StoreResult<Vec<String>> {
        self.crud().get_calendar_names()
    }

    pub fn get_job(&self, key: &JobKey) -> StoreResult<Option<Job>> {
        self.crud().get_job(key)
    }

    pub fn get_trigger(&self, key: &TriggerKey) -> StoreResult<Option<Trigger>> {
        self.crud().get_trigger(key)
    }

    pub fn get_triggers_for_job(&self, key: &JobKey) -> StoreResult<Vec<Trigger>> {
        self.crud().get_triggers_for_job(key)
    }

    pub fn get_job_keys(&self, matcher: GroupMatcher) -> BTreeSet<JobKey> {
        self.crud().get_job_keys(matcher)
    }

    pub fn get_trigger_keys(&self, matcher: GroupMatcher) -> BTreeSet<TriggerKey> {
        self.crud().get_trigger_keys(matcher)
    }

    pub fn get_job_group_names(&self) -> BTreeSet<String> {
        self.crud().get_job_group_names()
    }

    pub fn get_trigger_group_names(&self) -> BTreeSet<String> {
        self.crud().get_trigger_group_names()
    }

    pub fn check_job_exists(&self, key: &JobKey) -> bool {
        self.crud().check_job_exists(key)
    }

    pub fn check_trigger_exists(&self, key: &TriggerKey) -> bool {
        self.crud().check_trigger_exists(key)
    }

    pub fn job_count(&self) -> usize {
        self.crud().job_count()
    }

    pub fn trigger_count(&self) -> usize {
        self.crud().trigger_count()
    }

    // --- pause/resume --------------------------------------------------

    pub fn pause_trigger(&self, key: &TriggerKey) -> StoreResult<()> {
        self.transitions().pause_trigger(key)
    }

    pub fn resume_trigger(&self, key: &TriggerKey) -> StoreResult<()> {
        self.transitions().resume_trigger(key)
    }

    pub fn pause_triggers(&self, matcher: GroupMatcher) -> StoreResult<BTreeSet<String>> {
        self.transitions().pause_triggers(matcher)
    }

    pub fn resume_triggers(&self, matcher: GroupMatcher) -> StoreResult<BTreeSet<String>> {
        self.transitions().resume_triggers(matcher)
    }

    pub fn pause_all(&self) -> StoreResult<()> {
        self.transitions().pause_all()
    }

    pub fn resume_all(&self) -> StoreResult<()> {
        self.transitions().resume_all()
    }

    pub fn pause_job(&self, key: &JobKey) -> StoreResult<()> {
        self.transitions().pause_job(key)
    }

    pub fn resume_job(&self, key: &JobKey) -> StoreResult<()> {
        self.transitions().resume_job(key)
    }

    pub fn pause_jobs(&self, matcher: GroupMatcher) -> StoreResult<BTreeSet<String>> {
        self.transitions().pause_jobs(matcher)
    }

    pub fn resume_jobs(&self, matcher: GroupMatcher) -> StoreResult<BTreeSet<String>> {
        self.transitions().resume_jobs(matcher)
    }

    pub fn paused_trigger_groups(&self) -> BTreeSet<String> {
        self.groups().paused_trigger_groups()
    }

    pub fn paused_job_groups(&self) -> BTreeSet<String> {
        self.groups().paused_job_groups()
    }

    // --- acquisition & firing -------------------------------------------

    pub fn acquire_next_triggers(&self, not_before: i64, not_after: i64, max_count: usize) -> StoreResult<Vec<Trigger>> {
        self.acquisition().acquire_next(not_before, not_after, max_count)
    }

    pub fn release_acquired_trigger(&self, key: &TriggerKey) {
        self.acquisition().release_acquired_trigger(key)
    }

    pub fn triggers_fired(&self, batch: &[Trigger]) -> StoreResult<Vec<FireBundle>> {
        self.fire().triggers_fired(batch)
    }

    pub fn triggered_job_complete(
        &self,
        trigger_key: &TriggerKey,
        job: &Job,
        instruction: CompletionInstruction,
    ) -> StoreResult<()> {
        self.fire().triggered_job_complete(trigger_key, job, instruction)
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
