// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::memory::MemoryDocumentStore;
use crate::schedule::ScheduleCrud;
use crate::signaler::RecordingSignaler;
use crate::trigger_behavior::FixedIntervalScheduler;
use qjs_core::{FakeClock, JobKey, TriggerKey};

struct Fixture {
    backend: MemoryDocumentStore,
    registry: TriggerShapeRegistry,
    config: StoreConfig,
    clock: FakeClock,
}

impl Fixture {
    fn new() -> Self {
        let mut config = StoreConfig::new("node-a");
        config.job_timeout_ms = 60_000;
        Self {
            backend: MemoryDocumentStore::new(),
            registry: TriggerShapeRegistry::with_defaults(),
            config,
            clock: FakeClock::new(),
        }
    }

    fn crud(&self) -> ScheduleCrud<'_> {
        ScheduleCrud::new(&self.backend, &self.registry)
    }

    fn protocol<'a>(&'a self, signaler: &'a dyn SchedulerSignaler, scheduler: &'a dyn TriggerScheduler) -> FireProtocol<'a, FakeClock> {
        FireProtocol::new(&self.backend, &self.registry, &self.config, &self.clock, signaler, scheduler)
    }

    fn seed(&self, disallow_concurrent: bool) -> (Job, Trigger) {
        let mut job = Job::new(JobKey::new("G", "J"), "shell");
        job.disallow_concurrent_execution = disallow_concurrent;
        self.crud().store_job(&job, false).unwrap();
        let trigger = Trigger::new(TriggerKey::new("G", "T"), job.key.clone(), "simple", 1_000);
        self.crud().store_trigger(&trigger, false).unwrap();
        (job, trigger)
    }
}

#[test]
fn triggers_fired_produces_a_bundle_and_advances_the_trigger() {
    let fx = Fixture::new();
    let (_, trigger) = fx.seed(false);
    let signaler = RecordingSignaler::new();
    let scheduler = FixedIntervalScheduler::new(1_000);

    let bundles = fx.protocol(&signaler, &scheduler).triggers_fired(&[trigger]).unwrap();

    assert_eq!(bundles.len(), 1);
    assert_eq!(bundles[0].job.key, JobKey::new("G", "J"));
    assert_eq!(bundles[0].next_fire_time_after, Some(2_000));

    let stored = fx.crud().get_trigger(&TriggerKey::new("G", "T")).unwrap().unwrap();
    assert_eq!(stored.next_fire_time, Some(2_000));
}

#[test]
fn triggers_fired_skips_a_trigger_whose_job_is_missing() {
    let fx = Fixture::new();
    let (_, mut trigger) = fx.seed(false);
    fx.crud().remove_job(&JobKey::new("G", "J")).unwrap();
    trigger.job_key = JobKey::new("G", "J"); // job no longer exists
    let signaler = RecordingSignaler::new();
    let scheduler = FixedIntervalScheduler::new(1_000);

    let bundles = fx.protocol(&signaler, &scheduler).triggers_fired(&[trigger]).unwrap();
    assert!(bundles.is_empty());
}

#[test]
fn triggers_fired_skips_when_named_calendar_is_missing() {
    let fx = Fixture::new();
    let (_, mut trigger) = fx.seed(false);
    trigger.calendar_name = Some("nonexistent".to_string());
    let signaler = RecordingSignaler::new();
    let scheduler = FixedIntervalScheduler::new(1_000);

    let bundles = fx.protocol(&signaler, &scheduler).triggers_fired(&[trigger]).unwrap();
    assert!(bundles.is_empty());
}

#[test]
fn disallow_concurrent_execution_blocks_a_second_concurrent_fire() {
    let fx = Fixture::new();
    let (_, trigger) = fx.seed(true);
    let signaler = RecordingSignaler::new();
    let scheduler = FixedIntervalScheduler::new(1_000);
    let protocol = fx.protocol(&signaler, &scheduler);

    let first = protocol.triggers_fired(&[trigger.clone()]).unwrap();
    assert_eq!(first.len(), 1);

    // Second fire attempt for the same job, concurrency lock still held.
    let second = protocol.triggers_fired(&[trigger]).unwrap();
    assert!(second.is_empty());
}

#[test]
fn expired_job_concurrency_lock_is_cleared_on_conflict() {
    let fx = Fixture::new();
    let (_, trigger) = fx.seed(true);
    let signaler = RecordingSignaler::new();
    let scheduler = FixedIntervalScheduler::new(1_000);
    let protocol = fx.protocol(&signaler, &scheduler);

    protocol.triggers_fired(&[trigger.clone()]).unwrap();
    fx.clock.advance(std::time::Duration::from_millis(fx.config.job_timeout_ms + 1));

    // The lock is stale; this attempt should observe and clear it even
    // though it still reports the fire as skipped (retried next cycle).
    let second = protocol.triggers_fired(&[trigger]).unwrap();
    assert!(second.is_empty());

    let lock_key = JobKey::new("G", "J").as_lock_key();
    assert!(fx
        .backend
        .find(crate::document::Collection::Locks, &crate::document::DocKey::new(lock_key.group, lock_key.name))
        .is_none());
}

#[test]
fn triggered_job_complete_with_delete_trigger_removes_it() {
    let fx = Fixture::new();
    let (job, trigger) = fx.seed(false);
    let signaler = RecordingSignaler::new();
    let scheduler = FixedIntervalScheduler::new(1_000);
    let protocol = fx.protocol(&signaler, &scheduler);

    protocol
        .triggered_job_complete(&trigger.key, &job, qjs_core::CompletionInstruction::DeleteTrigger)
        .unwrap();

    assert!(fx.crud().get_trigger(&trigger.key).unwrap().is_none());
    assert_eq!(signaler.scheduling_change_count(), 1);
}

#[test]
fn triggered_job_complete_releases_concurrency_lock() {
    let fx = Fixture::new();
    let (mut job, trigger) = fx.seed(true);
    job.disallow_concurrent_execution = true;
    let signaler = RecordingSignaler::new();
    let scheduler = FixedIntervalScheduler::new(1_000);
    let protocol = fx.protocol(&signaler, &scheduler);

    protocol.triggers_fired(&[trigger.clone()]).unwrap();
    protocol
        .triggered_job_complete(&trigger.key, &job, qjs_core::CompletionInstruction::NoInstruction)
        .unwrap();

    let second = protocol.triggers_fired(&[trigger]).unwrap();
    assert_eq!(second.len(), 1, "concurrency lock should have been released");
}

#[test]
fn triggered_job_complete_with_persist_job_data_restores_the_job() {
    let fx = Fixture::new();
    let (mut job, trigger) = fx.seed(false);
    job.persist_job_data_after_execution = true;
    job.data_map.insert_string("last_run", "ok");
    let signaler = RecordingSignaler::new();
    let scheduler = FixedIntervalScheduler::new(1_000);
    let protocol = fx.protocol(&signaler, &scheduler);

    protocol
        .triggered_job_complete(&trigger.key, &job, qjs_core::CompletionInstruction::NoInstruction)
        .unwrap();

    let stored = fx.crud().get_job(&job.key).unwrap().unwrap();
    assert_eq!(stored.data_map.get("last_run"), Some(&serde_json::json!("ok")));
}
