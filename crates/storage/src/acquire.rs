// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The acquisition protocol: the optimistic-lock race by which competing
//! scheduler nodes claim due triggers.
//!
//! The only coordination primitive is [`DocumentStore::insert`]'s
//! insert-if-absent atomicity (I4). There is no consensus round and no
//! multi-document transaction; a node either wins the unique lock insert or
//! it doesn't, and a lock left behind by a dead node is reclaimed once it's
//! provably older than `triggerTimeoutMillis`.

use std::collections::HashSet;

use qjs_core::{Clock, StoreError, StoreResult, Trigger, TriggerKey};

use crate::codec;
use crate::config::StoreConfig;
use crate::document::{BackendError, Collection, DocKey, DocumentStore};
use crate::registry::TriggerShapeRegistry;
use crate::schedule::ScheduleCrud;
use crate::signaler::SchedulerSignaler;
use crate::trigger_behavior::TriggerScheduler;

enum MisfireOutcome {
    NoMisfire,
    /// The trigger's new `next_fire_time` was persisted.
    Misfired,
    /// The trigger has no more fires; the caller removes its document.
    Exhausted,
}

pub struct AcquisitionProtocol<'a, C: Clock> {
    store: &'a dyn DocumentStore,
    registry: &'a TriggerShapeRegistry,
    config: &'a StoreConfig,
    clock: &'a C,
    signaler: &'a dyn SchedulerSignaler,
    scheduler: &'a dyn TriggerScheduler,
}

impl<'a, C: Clock> AcquisitionProtocol<'a, C> {
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

    /// `not_before` is accepted for API symmetry with the runtime's call
    /// site but otherwise ignored, per the source this was distilled from:
    /// any trigger due at or before `not_after` qualifies regardless of how
    /// early it became due.
    pub fn acquire_next(&self, _not_before: i64, not_after: i64, max_count: usize) -> StoreResult<Vec<Trigger>> {
        let mut accumulated: Vec<Trigger> = Vec::new();
        let mut accumulated_keys: HashSet<TriggerKey> = HashSet::new();

        'outer: loop {
            if accumulated.len() >= max_count {
                break;
            }
            let now_ms = self.clock.epoch_ms() as i64;
            let mut candidates = self.waiting_candidates(not_after);
            candidates.sort_by_key(|(_, t)| t.next_fire_time);

            for (doc_key, mut trigger) in candidates {
                if accumulated.len() >= max_count {
                    break 'outer;
                }
                if accumulated_keys.contains(&trigger.key) {
                    continue;
                }

                if trigger.next_fire_time.is_none() {
                    self.store.delete(Collection::Triggers, &doc_key);
                    continue;
                }

                match self.apply_misfire(&mut trigger, now_ms)? {
                    MisfireOutcome::Exhausted => {
                        self.store.delete(Collection::Triggers, &doc_key);
                        continue;
                    }
                    MisfireOutcome::Misfired => {
                        if trigger.next_fire_time.map(|t| t > not_after).unwrap_or(true) {
                            continue;
                        }
                    }
                    MisfireOutcome::NoMisfire => {}
                }

                let lock_key = trigger.key.as_lock_key();
                let lock_doc_key = DocKey::new(lock_key.group.clone(), lock_key.name.clone());
                let lock = qjs_core::Lock::new(lock_key, self.config.instance_id.clone(), now_ms as u64);

                match self.store.insert(Collection::Locks, lock_doc_key.clone(), codec::encode_lock(&lock)) {
                    Ok(()) => {
                        tracing::debug!(trigger = %trigger.key, instance_id = %self.config.instance_id, "claimed trigger lock");
                        accumulated_keys.insert(trigger.key.clone());
                        accumulated.push(trigger);
                    }
                    Err(BackendError::Conflict) => {
                        match self.store.find(Collection::Locks, &lock_doc_key) {
                            Some(existing_doc) => {
                                let existing_lock = codec::decode_lock(&existing_doc)?;
                                if existing_lock.is_expired(now_ms as u64, self.config.trigger_timeout_ms) {
                                    tracing::warn!(trigger = %trigger.key, owner = %existing_lock.instance_id, "reclaiming expired trigger lock");
                                    self.store.delete(Collection::Locks, &lock_doc_key);
                                    continue 'outer;
                                }
                                // Held and live: another node owns this trigger.
                                tracing::debug!(trigger = %trigger.key, owner = %existing_lock.instance_id, "trigger lock held by another node");
                            }
                            // Raced deletion: the lock vanished between our insert
                            // attempt and this lookup. Leave it for the next cycle.
                            None => {}
                        }
                    }
                    Err(BackendError::Io(msg)) => return Err(StoreError::Storage(anyhow::anyhow!(msg))),
                }
            }
            break;
        }

        accumulated.sort_by_key(|t| t.next_fire_time);
        Ok(accumulated)
    }

    fn waiting_candidates(&self, not_after: i64) -> Vec<(DocKey, Trigger)> {
        let rows = self.store.find_where(Collection::Triggers, &move |_k, doc| {
            doc.get("state").and_then(|v| v.as_str()) == Some("waiting")
                && doc.get("nextFireTime").and_then(|v| v.as_i64()).map(|t| t <= not_after).unwrap_or(false)
        });
        rows.into_iter()
            .filter_map(|(k, doc)| codec::decode_trigger(&doc, self.registry).ok().map(|t| (k, t)))
            .collect()
    }

    fn apply_misfire(&self, trigger: &mut Trigger, now_ms: i64) -> StoreResult<MisfireOutcome> {
        let misfire_time = now_ms - self.config.misfire_threshold_ms as i64;
        let next_fire = trigger.next_fire_time;
        if next_fire.map(|t| t > misfire_time).unwrap_or(true) || trigger.misfire_instruction.is_ignore() {
            return Ok(MisfireOutcome::NoMisfire);
        }

        let calendar = match &trigger.calendar_name {
            Some(name) => self.crud().load_calendar_raw(name)?,
            None => None,
        };

        tracing::warn!(trigger = %trigger.key, next_fire_time = next_fire, "trigger misfired");
        self.signaler.trigger_misfired(trigger);
        self.scheduler.update_after_misfire(trigger, calendar.as_ref());

        if trigger.next_fire_time.is_none() {
            tracing::debug!(trigger = %trigger.key, "misfired trigger exhausted, removing");
            self.signaler.trigger_finalized(trigger);
            return Ok(MisfireOutcome::Exhausted);
        }
        if trigger.next_fire_time == next_fire {
            return Ok(MisfireOutcome::NoMisfire);
        }

        self.crud().persist_trigger(trigger)?;
        tracing::debug!(trigger = %trigger.key, next_fire_time = trigger.next_fire_time, "misfired trigger rescheduled");
        Ok(MisfireOutcome::Misfired)
    }

    /// Deletes the trigger-lock document regardless of `instanceId` — any
    /// node observing a stuck lock may clean it. This deliberately weakens
    /// lock-ownership checking to let the cluster recover from dead nodes.
    pub fn release_acquired_trigger(&self, key: &TriggerKey) {
        tracing::debug!(trigger = %key, "releasing trigger lock");
        let lock_key = key.as_lock_key();
        self.store.delete(Collection::Locks, &DocKey::new(lock_key.group, lock_key.name));
    }
}

#[cfg(test)]
#[path = "acquire_tests.rs"]
mod tests;
