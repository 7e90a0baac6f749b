// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process [`DocumentStore`] implementation.
//!
//! Each collection is a `HashMap` behind its own `parking_lot::Mutex`, so
//! `insert`'s check-then-write is a single critical section — the same
//! atomicity a real document database gives you via its unique index, just
//! local instead of cluster-wide. That's sufficient for everything this
//! crate's own test suite exercises (multiple threads, one process); a
//! multi-process deployment plugs in a different `DocumentStore` impl here
//! without changing any component above this module.

use crate::document::{BackendError, Collection, DocKey, Document, DocumentStore};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
struct CollectionTable {
    rows: HashMap<DocKey, Document>,
}

pub struct MemoryDocumentStore {
    jobs: Mutex<CollectionTable>,
    triggers: Mutex<CollectionTable>,
    calendars: Mutex<CollectionTable>,
    locks: Mutex<CollectionTable>,
    paused_trigger_groups: Mutex<CollectionTable>,
    paused_job_groups: Mutex<CollectionTable>,
    /// Test-only fault injection: the next `insert`/`put` against the named
    /// collection fails once, then the hook clears itself. Used to simulate
    /// the storage failure `replaceTrigger`'s rollback path (P4) depends on.
    #[cfg(any(test, feature = "test-support"))]
    inject_failure: Mutex<Option<Collection>>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(CollectionTable::default()),
            triggers: Mutex::new(CollectionTable::default()),
            calendars: Mutex::new(CollectionTable::default()),
            locks: Mutex::new(CollectionTable::default()),
            paused_trigger_groups: Mutex::new(CollectionTable::default()),
            paused_job_groups: Mutex::new(CollectionTable::default()),
            #[cfg(any(test, feature = "test-support"))]
            inject_failure: Mutex::new(None),
        }
    }

    fn table(&self, collection: Collection) -> &Mutex<CollectionTable> {
        match collection {
            Collection::Jobs => &self.jobs,
            Collection::Triggers => &self.triggers,
            Collection::Calendars => &self.calendars,
            Collection::Locks => &self.locks,
            Collection::PausedTriggerGroups => &self.paused_trigger_groups,
            Collection::PausedJobGroups => &self.paused_job_groups,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn inject_failure_on_next_write(&self, collection: Collection) {
        *self.inject_failure.lock() = Some(collection);
    }

    #[cfg(any(test, feature = "test-support"))]
    fn take_injected_failure(&self, collection: Collection) -> bool {
        let mut guard = self.inject_failure.lock();
        if *guard == Some(collection) {
            *guard = None;
            true
        } else {
            false
        }
    }

    #[cfg(not(any(test, feature = "test-support")))]
    fn take_injected_failure(&self, _collection: Collection) -> bool {
        false
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn insert(&self, collection: Collection, key: DocKey, doc: Document) -> Result<(), BackendError> {
        if self.take_injected_failure(collection) {
            return Err(BackendError::Io("simulated write failure".to_string()));
        }
        let mut table = self.table(collection).lock();
        if table.rows.contains_key(&key) {
            return Err(BackendError::Conflict);
        }
        table.rows.insert(key, doc);
        Ok(())
    }

    fn put(&self, collection: Collection, key: DocKey, doc: Document) -> Result<(), BackendError> {
        if self.take_injected_failure(collection) {
            return Err(BackendError::Io("simulated write failure".to_string()));
        }
        self.table(collection).lock().rows.insert(key, doc);
        Ok(())
    }

    fn find(&self, collection: Collection, key: &DocKey) -> Option<Document> {
        self.table(collection).lock().rows.get(key).cloned()
    }

    fn delete(&self, collection: Collection, key: &DocKey) -> Option<Document> {
        self.table(collection).lock().rows.remove(key)
    }

    fn all(&self, collection: Collection) -> Vec<(DocKey, Document)> {
        self.table(collection)
            .lock()
            .rows
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
