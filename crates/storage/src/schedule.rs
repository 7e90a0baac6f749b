// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Schedule CRUD: store/retrieve/remove jobs, triggers, and calendars, plus
//! the orphan-cleanup and replace-with-rollback rules that keep I1-I3
//! holding at every quiescent point.
//!
//! A few operations are carried as deliberate known gaps rather than
//! completed: `retrieve_calendar`, `get_calendar_names`, and bulk
//! `store_jobs_and_triggers` all return `Unsupported`, matching the source
//! this was distilled from (see DESIGN.md).

use std::collections::BTreeSet;

use qjs_core::{Calendar, GroupMatcher, Job, JobKey, StoreError, StoreResult, Trigger, TriggerKey, TriggerState};

use crate::codec;
use crate::document::{Collection, DocKey, Document, DocumentStore};
use crate::query;
use crate::registry::TriggerShapeRegistry;

pub struct ScheduleCrud<'a> {
    store: &'a dyn DocumentStore,
    registry: &'a TriggerShapeRegistry,
}

impl<'a> ScheduleCrud<'a> {
    pub fn new(store: &'a dyn DocumentStore, registry: &'a TriggerShapeRegistry) -> Self {
        Self { store, registry }
    }

    fn job_key_doc(key: &JobKey) -> DocKey {
        DocKey::new(key.group.clone(), key.name.clone())
    }

    fn trigger_key_doc(key: &TriggerKey) -> DocKey {
        DocKey::new(key.group.clone(), key.name.clone())
    }

    fn find_job(&self, key: &JobKey) -> StoreResult<Option<Job>> {
        match self.store.find(Collection::Jobs, &Self::job_key_doc(key)) {
            Some(doc) => Ok(Some(codec::decode_job(&doc)?)),
            None => Ok(None),
        }
    }

    fn find_trigger(&self, key: &TriggerKey) -> StoreResult<Option<Trigger>> {
        match self.store.find(Collection::Triggers, &Self::trigger_key_doc(key)) {
            Some(doc) => Ok(Some(codec::decode_trigger(&doc, self.registry)?)),
            None => Ok(None),
        }
    }

    /// Triggers whose `job_key` matches `key`, decoded.
    fn triggers_for_job_key(&self, key: &JobKey) -> StoreResult<Vec<(DocKey, Trigger)>> {
        let group = key.group.clone();
        let name = key.name.clone();
        let rows = self.store.find_where(Collection::Triggers, &move |_k, doc| {
            doc.get("jobGroup").and_then(|v| v.as_str()) == Some(group.as_str())
                && doc.get("jobName").and_then(|v| v.as_str()) == Some(name.as_str())
        });
        rows.into_iter()
            .map(|(k, doc)| codec::decode_trigger(&doc, self.registry).map(|t| (k, t)))
            .collect()
    }

    fn sanitize_extra(&self, trigger: &Trigger) -> std::collections::BTreeMap<String, serde_json::Value> {
        let mut doc = Document::new();
        self.registry.inject_for_storage(trigger, &mut doc);
        doc
    }

    /// Upsert on `(group, name)`. Idempotent when a job already exists and
    /// `replace` is false.
    pub fn store_job(&self, job: &Job, replace: bool) -> StoreResult<qjs_core::JobId> {
        let key = Self::job_key_doc(&job.key);
        if let Some(existing_doc) = self.store.find(Collection::Jobs, &key) {
            let existing = codec::decode_job(&existing_doc)?;
            if !replace {
                return Ok(existing.id);
            }
            let mut updated = job.clone();
            updated.id = existing.id.clone();
            self.store.put(Collection::Jobs, key, codec::encode_job(&updated)).map_err(map_backend)?;
            Ok(updated.id)
        } else {
            self.store.insert(Collection::Jobs, key, codec::encode_job(job)).map_err(map_backend)?;
            Ok(job.id.clone())
        }
    }

    /// Resolves `job_key` by lookup, fails `NotFound` if the job is absent.
    /// New triggers enter `Waiting`.
    pub fn store_trigger(&self, trigger: &Trigger, replace: bool) -> StoreResult<()> {
        if self.find_job(&trigger.job_key)?.is_none() {
            return Err(StoreError::NotFound(format!("job {} referenced by trigger", trigger.job_key)));
        }
        let key = Self::trigger_key_doc(&trigger.key);
        let existing = self.store.find(Collection::Triggers, &key);
        if existing.is_some() && !replace {
            return Err(StoreError::AlreadyExists(format!("trigger {}", trigger.key)));
        }

        let mut stored = trigger.clone();
        if existing.is_none() {
            stored.state = TriggerState::Waiting;
        }
        stored.extra = self.sanitize_extra(&stored);
        let doc = codec::encode_trigger(&stored);

        if existing.is_some() {
            self.store.put(Collection::Triggers, key, doc).map_err(map_backend)?;
        } else {
            self.store.insert(Collection::Triggers, key, doc).map_err(map_backend)?;
        }
        Ok(())
    }

    /// Removes the job and every trigger referencing it. Returns whether a
    /// job was actually removed.
    pub fn remove_job(&self, key: &JobKey) -> StoreResult<bool> {
        let Some(_job) = self.find_job(key)? else { return Ok(false) };
        for (trigger_key, _) in self.triggers_for_job_key(key)? {
            self.store.delete(Collection::Triggers, &trigger_key);
        }
        self.store.delete(Collection::Jobs, &Self::job_key_doc(key));
        Ok(true)
    }

    /// Removes the trigger, then applies the orphan rule (I3): if its job
    /// is non-durable and now has no remaining triggers, the job is removed
    /// too. Orphan cleanup failures never mask the primary removal's
    /// success.
    pub fn remove_trigger(&self, key: &TriggerKey) -> StoreResult<bool> {
        let Some(removed_doc) = self.store.delete(Collection::Triggers, &Self::trigger_key_doc(key)) else {
            return Ok(false);
        };
        let removed = match codec::decode_trigger(&removed_doc, self.registry) {
            Ok(t) => t,
            Err(_) => return Ok(true),
        };
        if let Ok(Some(job)) = self.find_job(&removed.job_key) {
            if !job.durable {
                if let Ok(remaining) = self.triggers_for_job_key(&removed.job_key) {
                    if remaining.is_empty() {
                        self.store.delete(Collection::Jobs, &Self::job_key_doc(&removed.job_key));
                    }
                }
            }
        }
        Ok(true)
    }

    /// Requires the old and new triggers to reference the same job. Copies
    /// the old trigger's data map into `new_trigger` unless the caller
    /// already set one. If the new trigger can't be stored, the old one is
    /// re-inserted (best-effort rollback: if that re-insert also fails, the
    /// trigger is lost with no compensating log, matching the source this
    /// was distilled from).
    pub fn replace_trigger(&self, key: &TriggerKey, mut new_trigger: Trigger) -> StoreResult<()> {
        let old_doc = self
            .store
            .find(Collection::Triggers, &Self::trigger_key_doc(key))
            .ok_or_else(|| StoreError::NotFound(format!("trigger {key}")))?;
        let old = codec::decode_trigger(&old_doc, self.registry)?;
        if old.job_key != new_trigger.job_key {
            return Err(StoreError::AlreadyExists(format!(
                "replaceTrigger job mismatch: old references {}, new references {}",
                old.job_key, new_trigger.job_key
            )));
        }
        if new_trigger.data_map.is_empty() {
            new_trigger.data_map = old.data_map.clone();
        }

        self.store.delete(Collection::Triggers, &Self::trigger_key_doc(key));
        match self.store_trigger(&new_trigger, true) {
            Ok(()) => Ok(()),
            Err(e) => {
                let _ = self.store.insert(Collection::Triggers, Self::trigger_key_doc(key), old_doc);
                Err(e)
            }
        }
    }

    /// `update_triggers = true` is not supported.
    pub fn store_calendar(&self, calendar: &Calendar, replace: bool, update_triggers: bool) -> StoreResult<()> {
        if update_triggers {
            return Err(StoreError::Unsupported("storeCalendar(updateTriggers=true)"));
        }
        let key = DocKey::singleton(calendar.name.clone());
        let doc = codec::encode_calendar(calendar);
        if replace {
            self.store.put(Collection::Calendars, key, doc).map_err(map_backend)?;
        } else {
            self.store.insert(Collection::Calendars, key, doc).map_err(map_backend)?;
        }
        Ok(())
    }

    pub fn remove_calendar(&self, name: &str) -> bool {
        self.store.delete(Collection::Calendars, &DocKey::singleton(name.to_string())).is_some()
    }

    pub fn retrieve_calendar(&self, _name: &str) -> StoreResult<Calendar> {
        Err(StoreError::Unsupported("retrieveCalendar"))
    }

    pub fn get_calendar_names(&self) -> StoreResult<Vec<String>> {
        Err(StoreError::Unsupported("getCalendarNames"))
    }

    pub fn store_jobs_and_triggers(&self, _pairs: &[(Job, Vec<Trigger>)]) -> StoreResult<()> {
        Err(StoreError::Unsupported("storeJobsAndTriggers"))
    }

    pub fn get_job_keys(&self, matcher: GroupMatcher) -> BTreeSet<JobKey> {
        let predicate = query::matcher_predicate(matcher);
        self.store
            .find_where(Collection::Jobs, &predicate)
            .into_iter()
            .map(|(k, _)| JobKey::new(k.group, k.name))
            .collect()
    }

    pub fn get_trigger_keys(&self, matcher: GroupMatcher) -> BTreeSet<TriggerKey> {
        let predicate = query::matcher_predicate(matcher);
        self.store
            .find_where(Collection::Triggers, &predicate)
            .into_iter()
            .map(|(k, _)| TriggerKey::new(k.group, k.name))
            .collect()
    }

    pub fn get_job_group_names(&self) -> BTreeSet<String> {
        query::distinct_groups(self.store.all(Collection::Jobs).iter().map(|(k, _)| k))
    }

    pub fn get_trigger_group_names(&self) -> BTreeSet<String> {
        query::distinct_groups(self.store.all(Collection::Triggers).iter().map(|(k, _)| k))
    }

    pub fn get_triggers_for_job(&self, key: &JobKey) -> StoreResult<Vec<Trigger>> {
        Ok(self.triggers_for_job_key(key)?.into_iter().map(|(_, t)| t).collect())
    }

    pub fn check_job_exists(&self, key: &JobKey) -> bool {
        self.store.find(Collection::Jobs, &Self::job_key_doc(key)).is_some()
    }

    pub fn check_trigger_exists(&self, key: &TriggerKey) -> bool {
        self.store.find(Collection::Triggers, &Self::trigger_key_doc(key)).is_some()
    }

    pub fn job_count(&self) -> usize {
        self.store.count(Collection::Jobs)
    }

    pub fn trigger_count(&self) -> usize {
        self.store.count(Collection::Triggers)
    }

    pub fn get_job(&self, key: &JobKey) -> StoreResult<Option<Job>> {
        self.find_job(key)
    }

    pub fn get_trigger(&self, key: &TriggerKey) -> StoreResult<Option<Trigger>> {
        self.find_trigger(key)
    }

    /// Persists an already-existing trigger as-is (no job-reference check,
    /// no state reset to `Waiting`). Used by the acquisition and fire
    /// protocols, which own the trigger's lifecycle state themselves and
    /// would otherwise pay `store_trigger`'s full validation on every
    /// misfire/fire bookkeeping write.
    pub(crate) fn persist_trigger(&self, trigger: &Trigger) -> StoreResult<()> {
        let key = Self::trigger_key_doc(&trigger.key);
        self.store.put(Collection::Triggers, key, codec::encode_trigger(trigger)).map_err(map_backend)
    }

    /// Internal raw calendar lookup used by the acquisition and fire
    /// protocols to evaluate misfire/fire behavior. Distinct from the
    /// public `retrieve_calendar`, which is a known-unsupported gap carried
    /// from the source this was distilled from.
    pub(crate) fn load_calendar_raw(&self, name: &str) -> StoreResult<Option<Calendar>> {
        match self.store.find(Collection::Calendars, &DocKey::singleton(name.to_string())) {
            Some(doc) => Ok(Some(codec::decode_calendar(&doc)?)),
            None => Ok(None),
        }
    }
}

pub(crate) fn map_backend(err: crate::document::BackendError) -> StoreError {
    match err {
        crate::document::BackendError::Conflict => StoreError::AlreadyExists("document already exists".to_string()),
        crate::document::BackendError::Io(msg) => StoreError::Storage(anyhow::anyhow!(msg)),
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
