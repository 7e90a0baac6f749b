// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::memory::MemoryDocumentStore;
use crate::signaler::NoopSignaler;
use crate::trigger_behavior::FixedIntervalScheduler;
use qjs_core::{FakeClock, JobKey, TriggerKey};

struct Fixture {
    backend: MemoryDocumentStore,
    registry: TriggerShapeRegistry,
    config: StoreConfig,
    clock: FakeClock,
    signaler: NoopSignaler,
    scheduler: FixedIntervalScheduler,
}

impl Fixture {
    fn new() -> Self {
        let mut config = StoreConfig::new("node-a");
        config.connection = crate::config::ConnectionConfig::AlreadyBuilt;
        Self {
            backend: MemoryDocumentStore::new(),
            registry: TriggerShapeRegistry::with_defaults(),
            config,
            clock: FakeClock::new(),
            signaler: NoopSignaler,
            scheduler: FixedIntervalScheduler::new(1_000),
        }
    }

    fn store(&self) -> JobStore<'_, FakeClock> {
        JobStore::new(&self.backend, &self.registry, &self.config, &self.clock, &self.signaler, &self.scheduler)
    }
}

#[test]
fn initialize_validates_config_and_cleans_self_locks() {
    let fx = Fixture::new();
    let cleaned = fx.store().initialize().unwrap();
    assert_eq!(cleaned, 0);
}

#[test]
fn initialize_rejects_invalid_config() {
    let mut config = StoreConfig::new("");
    config.connection = crate::config::ConnectionConfig::AlreadyBuilt;
    let backend = MemoryDocumentStore::new();
    let registry = TriggerShapeRegistry::with_defaults();
    let clock = FakeClock::new();
    let signaler = NoopSignaler;
    let scheduler = FixedIntervalScheduler::new(1_000);
    let store = JobStore::new(&backend, &registry, &config, &clock, &signaler, &scheduler);

    assert!(store.initialize().is_err());
}

#[test]
fn end_to_end_store_acquire_fire_complete() {
    let fx = Fixture::new();
    let store = fx.store();

    let job = Job::new(JobKey::new("G", "J"), "shell");
    store.store_job(&job, false).unwrap();
    fx.clock.set_epoch_ms(10_000);
    let trigger = Trigger::new(TriggerKey::new("G", "T"), job.key.clone(), "simple", 9_000);
    store.store_trigger(&trigger, false).unwrap();

    let acquired = store.acquire_next_triggers(0, 10_000, 10).unwrap();
    assert_eq!(acquired.len(), 1);

    let bundles = store.triggers_fired(&acquired).unwrap();
    assert_eq!(bundles.len(), 1);
    assert_eq!(bundles[0].job.key, job.key);

    store
        .triggered_job_complete(&trigger.key, &bundles[0].job, CompletionInstruction::NoInstruction)
        .unwrap();

    // The trigger lock was released by triggered_job_complete; the trigger
    // itself is still waiting on its (now-advanced) next fire time.
    let stored = store.get_trigger(&trigger.key).unwrap().unwrap();
    assert_eq!(stored.next_fire_time, Some(10_000));
}

#[test]
fn pause_job_then_remove_job_cleans_up_its_triggers() {
    let fx = Fixture::new();
    let store = fx.store();

    let job = Job::new(JobKey::new("G", "J"), "shell");
    store.store_job(&job, false).unwrap();
    let trigger = Trigger::new(TriggerKey::new("G", "T"), job.key.clone(), "simple", 1_000);
    store.store_trigger(&trigger, false).unwrap();

    store.pause_job(&job.key).unwrap();
    assert_eq!(store.get_trigger(&trigger.key).unwrap().unwrap().state, qjs_core::TriggerState::Paused);

    assert!(store.remove_job(&job.key).unwrap());
    assert!(store.get_trigger(&trigger.key).unwrap().is_none());
}

#[test]
fn group_level_pause_is_visible_through_the_facade() {
    let fx = Fixture::new();
    let store = fx.store();
    let job = Job::new(JobKey::new("G", "J"), "shell");
    store.store_job(&job, false).unwrap();
    let trigger = Trigger::new(TriggerKey::new("G", "T"), job.key.clone(), "simple", 1_000);
    store.store_trigger(&trigger, false).unwrap();

    let groups = store.pause_triggers(GroupMatcher::equals("G")).unwrap();
    assert_eq!(groups, BTreeSet::from(["G".to_string()]));
    assert!(store.paused_trigger_groups().contains("G"));

    store.resume_triggers(GroupMatcher::equals("G")).unwrap();
    assert!(!store.paused_trigger_groups().contains("G"));
}
