// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracks which trigger/job groups are paused.
//!
//! Pause state for a group is nothing more than a row's presence in one of
//! the two paused-group collections, keyed on the group name. This mirrors
//! jobs/triggers/calendars in using the document store as the single source
//! of truth rather than an in-memory set, so a second node sees a pause
//! applied by the first without any extra coordination.

use std::collections::BTreeSet;

use crate::document::{Collection, DocKey, Document, DocumentStore};

pub struct GroupStateTracker<'a> {
    store: &'a dyn DocumentStore,
}

impl<'a> GroupStateTracker<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self { store }
    }

    pub fn mark_trigger_group_paused(&self, group: &str) {
        mark(self.store, Collection::PausedTriggerGroups, group);
    }

    pub fn unmark_trigger_group_paused(&self, group: &str) {
        unmark(self.store, Collection::PausedTriggerGroups, group);
    }

    pub fn is_trigger_group_paused(&self, group: &str) -> bool {
        is_marked(self.store, Collection::PausedTriggerGroups, group)
    }

    pub fn paused_trigger_groups(&self) -> BTreeSet<String> {
        marked_groups(self.store, Collection::PausedTriggerGroups)
    }

    pub fn mark_job_group_paused(&self, group: &str) {
        mark(self.store, Collection::PausedJobGroups, group);
    }

    pub fn unmark_job_group_paused(&self, group: &str) {
        unmark(self.store, Collection::PausedJobGroups, group);
    }

    pub fn is_job_group_paused(&self, group: &str) -> bool {
        is_marked(self.store, Collection::PausedJobGroups, group)
    }

    pub fn paused_job_groups(&self) -> BTreeSet<String> {
        marked_groups(self.store, Collection::PausedJobGroups)
    }
}

fn marker_key(group: &str) -> DocKey {
    DocKey::singleton(group)
}

fn mark(store: &dyn DocumentStore, collection: Collection, group: &str) {
    // `put` rather than `insert`: marking an already-paused group is a no-op,
    // not a conflict. A write failure here is swallowed, matching the rest of
    // this crate's paused-groups bookkeeping (see StoreError's propagation
    // policy): the group simply stays unmarked rather than panicking the
    // caller's whole pause operation over bookkeeping.
    let _ = store.put(collection, marker_key(group), Document::new());
}

fn unmark(store: &dyn DocumentStore, collection: Collection, group: &str) {
    store.delete(collection, &marker_key(group));
}

fn is_marked(store: &dyn DocumentStore, collection: Collection, group: &str) -> bool {
    store.find(collection, &marker_key(group)).is_some()
}

fn marked_groups(store: &dyn DocumentStore, collection: Collection) -> BTreeSet<String> {
    store.all(collection).into_iter().map(|(k, _)| k.name).collect()
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
