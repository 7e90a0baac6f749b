// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::memory::MemoryDocumentStore;
use crate::registry::TriggerShapeRegistry;
use crate::schedule::ScheduleCrud;
use qjs_core::{Job, JobKey, Trigger, TriggerKey};

struct Fixture {
    backend: MemoryDocumentStore,
    registry: TriggerShapeRegistry,
}

impl Fixture {
    fn new() -> Self {
        Self { backend: MemoryDocumentStore::new(), registry: TriggerShapeRegistry::with_defaults() }
    }

    fn crud(&self) -> ScheduleCrud<'_> {
        ScheduleCrud::new(&self.backend, &self.registry)
    }

    fn transitions(&self) -> StateTransitions<'_> {
        StateTransitions::new(&self.backend, &self.registry)
    }

    fn seed(&self, group: &str, name: &str) {
        let job = Job::new(JobKey::new(group, name), "shell");
        self.crud().store_job(&job, false).unwrap();
        let trigger = Trigger::new(TriggerKey::new(group, name), job.key.clone(), "simple", 1_000);
        self.crud().store_trigger(&trigger, false).unwrap();
    }
}

#[test]
fn pause_then_resume_trigger_round_trips_state() {
    let fx = Fixture::new();
    fx.seed("G", "T");
    let key = TriggerKey::new("G", "T");

    fx.transitions().pause_trigger(&key).unwrap();
    assert_eq!(fx.crud().get_trigger(&key).unwrap().unwrap().state, TriggerState::Paused);

    fx.transitions().resume_trigger(&key).unwrap();
    assert_eq!(fx.crud().get_trigger(&key).unwrap().unwrap().state, TriggerState::Waiting);
}

#[test]
fn pause_trigger_on_missing_key_is_a_no_op() {
    let fx = Fixture::new();
    fx.transitions().pause_trigger(&TriggerKey::new("G", "Ghost")).unwrap();
}

#[test]
fn pause_triggers_by_matcher_marks_the_group_paused() {
    let fx = Fixture::new();
    fx.seed("G", "T1");
    fx.seed("G", "T2");
    fx.seed("Other", "T3");

    let groups = fx.transitions().pause_triggers(GroupMatcher::equals("G")).unwrap();
    assert_eq!(groups, BTreeSet::from(["G".to_string()]));

    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("G", "T1")).unwrap().unwrap().state, TriggerState::Paused);
    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("G", "T2")).unwrap().unwrap().state, TriggerState::Paused);
    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("Other", "T3")).unwrap().unwrap().state, TriggerState::Waiting);

    let groups_tracker = GroupStateTracker::new(&fx.backend);
    assert!(groups_tracker.is_trigger_group_paused("G"));
    assert!(!groups_tracker.is_trigger_group_paused("Other"));
}

#[test]
fn resume_trigger_by_key_ignores_the_group_pause_set() {
    let fx = Fixture::new();
    fx.seed("G", "T1");
    fx.transitions().pause_triggers(GroupMatcher::equals("G")).unwrap();

    // Group "G" is still marked paused, but resuming a single trigger by key
    // takes it straight back to waiting regardless.
    let key = TriggerKey::new("G", "T1");
    fx.transitions().resume_trigger(&key).unwrap();

    assert_eq!(fx.crud().get_trigger(&key).unwrap().unwrap().state, TriggerState::Waiting);
    assert!(GroupStateTracker::new(&fx.backend).is_trigger_group_paused("G"));
}

#[test]
fn pause_all_and_resume_all_cover_every_group() {
    let fx = Fixture::new();
    fx.seed("G1", "T1");
    fx.seed("G2", "T2");

    fx.transitions().pause_all().unwrap();
    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("G1", "T1")).unwrap().unwrap().state, TriggerState::Paused);
    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("G2", "T2")).unwrap().unwrap().state, TriggerState::Paused);

    fx.transitions().resume_all().unwrap();
    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("G1", "T1")).unwrap().unwrap().state, TriggerState::Waiting);
    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("G2", "T2")).unwrap().unwrap().state, TriggerState::Waiting);
}

#[test]
fn pause_job_pauses_every_trigger_referencing_it() {
    let fx = Fixture::new();
    let job = Job::new(JobKey::new("G", "J"), "shell");
    fx.crud().store_job(&job, false).unwrap();
    let t1 = Trigger::new(TriggerKey::new("G", "T1"), job.key.clone(), "simple", 1_000);
    let t2 = Trigger::new(TriggerKey::new("G", "T2"), job.key.clone(), "simple", 1_000);
    fx.crud().store_trigger(&t1, false).unwrap();
    fx.crud().store_trigger(&t2, false).unwrap();

    fx.transitions().pause_job(&job.key).unwrap();

    assert_eq!(fx.crud().get_trigger(&t1.key).unwrap().unwrap().state, TriggerState::Paused);
    assert_eq!(fx.crud().get_trigger(&t2.key).unwrap().unwrap().state, TriggerState::Paused);
}

#[test]
fn pause_jobs_by_matcher_marks_job_groups_paused() {
    let fx = Fixture::new();
    fx.seed("G", "J1");

    let groups = fx.transitions().pause_jobs(GroupMatcher::equals("G")).unwrap();
    assert_eq!(groups, BTreeSet::from(["G".to_string()]));
    assert!(GroupStateTracker::new(&fx.backend).is_job_group_paused("G"));
    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("G", "J1")).unwrap().unwrap().state, TriggerState::Paused);

    let resumed = fx.transitions().resume_jobs(GroupMatcher::equals("G")).unwrap();
    assert_eq!(resumed, BTreeSet::from(["G".to_string()]));
    assert!(!GroupStateTracker::new(&fx.backend).is_job_group_paused("G"));
    assert_eq!(fx.crud().get_trigger(&TriggerKey::new("G", "J1")).unwrap().unwrap().state, TriggerState::Waiting);
}
