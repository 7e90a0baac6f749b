// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fire/complete protocol: turning an acquired trigger into a runnable
//! fire bundle, and reconciling the store once that job run completes.
//!
//! Job-level mutual exclusion (I6) piggybacks on the same primitive as
//! trigger acquisition: a job-concurrency lock is just a lock document
//! keyed by `JobKey::as_lock_key()` instead of the trigger's own key.

use qjs_core::{Calendar, Clock, CompletionInstruction, Job, StoreError, StoreResult, Trigger, TriggerKey};

use crate::codec;
use crate::config::StoreConfig;
use crate::document::{BackendError, Collection, DocKey, DocumentStore};
use crate::registry::TriggerShapeRegistry;
use crate::schedule::ScheduleCrud;
use crate::signaler::SchedulerSignaler;
use crate::trigger_behavior::TriggerScheduler;

/// Everything the runtime needs to actually run a job for one trigger fire.
#[derive(Debug, Clone)]
pub struct FireBundle {
    pub job: Job,
    pub trigger: Trigger,
    pub calendar: Option<Calendar>,
    pub previous_fire_time_before: Option<i64>,
    pub previous_fire_time_after: Option<i64>,
    pub next_fire_time_after: Option<i64>,
    pub fired_at: i64,
}

pub struct FireProtocol<'a, C: Clock> {
    store: &'a dyn DocumentStore,
    registry: &'a TriggerShapeRegistry,
    config: &'a StoreConfig,
    clock: &'a C,
    signaler: &'a dyn SchedulerSignaler,
    scheduler: &'a dyn TriggerScheduler,
}

impl<'a, C: Clock> FireProtocol<'a, C> {
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

    pub fn triggers_fired(&self, batch: &[Trigger]) -> StoreResult<Vec<FireBundle>> {
        let now = self.clock.epoch_ms() as i64;
        let mut bundles = Vec::with_capacity(batch.len());

        for t in batch {
            let calendar = match &t.calendar_name {
                Some(name) => match self.crud().load_calendar_raw(name)? {
                    Some(cal) => Some(cal),
                    None => continue, // named-but-missing calendar: skip this fire entirely
                },
                None => None,
            };

            let mut trigger = t.clone();
            let previous_fire_time_before = trigger.previous_fire_time;
            self.scheduler.on_triggered(&mut trigger, calendar.as_ref());

            let Some(job) = self.crud().get_job(&trigger.job_key)? else { continue };

            if job.disallow_concurrent_execution {
                let lock_key = job.key.as_lock_key();
                let lock_doc_key = DocKey::new(lock_key.group.clone(), lock_key.name.clone());
                let lock = qjs_core::Lock::new(lock_key, self.config.instance_id.clone(), now as u64);
                match self.store.insert(Collection::Locks, lock_doc_key.clone(), codec::encode_lock(&lock)) {
                    Ok(()) => {
                        tracing::debug!(job = %job.key, instance_id = %self.config.instance_id, "claimed job concurrency lock");
                    }
                    Err(BackendError::Conflict) => {
                        tracing::warn!(job = %job.key, trigger = %trigger.key, "job concurrency lock held, skipping this fire");
                        self.release_trigger_lock(&trigger.key);
                        if let Some(existing_doc) = self.store.find(Collection::Locks, &lock_doc_key) {
                            let existing_lock = codec::decode_lock(&existing_doc)?;
                            if existing_lock.is_expired(now as u64, self.config.job_timeout_ms) {
                                tracing::warn!(job = %job.key, owner = %existing_lock.instance_id, "clearing expired job concurrency lock");
                                self.store.delete(Collection::Locks, &lock_doc_key);
                            }
                        }
                        continue;
                    }
                    Err(BackendError::Io(msg)) => return Err(StoreError::Storage(anyhow::anyhow!(msg))),
                }
            }

            let bundle = FireBundle {
                job,
                trigger: trigger.clone(),
                calendar,
                previous_fire_time_before,
                previous_fire_time_after: trigger.previous_fire_time,
                next_fire_time_after: trigger.next_fire_time,
                fired_at: now,
            };
            self.crud().persist_trigger(&trigger)?;
            bundles.push(bundle);
        }

        Ok(bundles)
    }

    /// `job`'s data map is assumed caller-modified when `persist_job_data_after_execution`
    /// is set; the store has no independent dirty-tracking of its own.
    pub fn triggered_job_complete(
        &self,
        trigger_key: &TriggerKey,
        job: &Job,
        instruction: CompletionInstruction,
    ) -> StoreResult<()> {
        if job.persist_job_data_after_execution {
            self.crud().store_job(job, true)?;
        }
        if job.disallow_concurrent_execution {
            tracing::debug!(job = %job.key, "releasing job concurrency lock");
            let lock_key = job.key.as_lock_key();
            self.store.delete(Collection::Locks, &DocKey::new(lock_key.group, lock_key.name));
        }

        if self.crud().get_trigger(trigger_key)?.is_some() {
            match instruction {
                CompletionInstruction::DeleteTrigger => {
                    self.crud().remove_trigger(trigger_key)?;
                    self.signaler.scheduling_change();
                }
                CompletionInstruction::SetTriggerComplete
                | CompletionInstruction::SetTriggerError
                | CompletionInstruction::SetAllJobTriggersComplete
                | CompletionInstruction::SetAllJobTriggersError => {
                    // State persistence for these codes is a known gap in the
                    // source this was distilled from: only the signal fires.
                    self.signaler.scheduling_change();
                }
                CompletionInstruction::NoInstruction | CompletionInstruction::ReExecuteJob => {}
            }
        }

        self.release_trigger_lock(trigger_key);
        Ok(())
    }

    fn release_trigger_lock(&self, key: &TriggerKey) {
        tracing::debug!(trigger = %key, "releasing trigger lock");
        let lock_key = key.as_lock_key();
        self.store.delete(Collection::Locks, &DocKey::new(lock_key.group, lock_key.name));
    }
}

#[cfg(test)]
#[path = "fire_tests.rs"]
mod tests;
