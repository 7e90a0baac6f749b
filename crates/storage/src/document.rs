// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The document-store abstraction.
//!
//! Wire transport to an actual document database (connection pooling,
//! authentication, the Mongo wire protocol itself) is out of scope for this
//! crate — see the purpose & scope notes in the crate root. What remains is
//! the contract every component above this module is written against: named
//! collections of key -> document pairs, an atomic insert-if-absent that
//! enforces the `(group, name)` uniqueness invariants (I1/I4), and an
//! unordered scan for predicate-based queries. [`memory::MemoryDocumentStore`]
//! is the in-process implementation used by tests and by callers that don't
//! need cross-process durability; a real deployment swaps in an
//! implementation backed by an actual database without touching any other
//! module.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A decoded-to-JSON-values document. Field order is irrelevant; `BTreeMap`
/// just keeps debug output and test assertions stable.
pub type Document = BTreeMap<String, serde_json::Value>;

/// The six collections named in the external interface. Calendars are keyed
/// by name alone; every other collection is keyed by `(group, name)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Jobs,
    Triggers,
    Calendars,
    Locks,
    PausedTriggerGroups,
    PausedJobGroups,
}

impl Collection {
    /// The bare collection name, before the configured prefix is applied.
    pub fn base_name(&self) -> &'static str {
        match self {
            Collection::Jobs => "jobs",
            Collection::Triggers => "triggers",
            Collection::Calendars => "calendars",
            Collection::Locks => "locks",
            Collection::PausedTriggerGroups => "paused_trigger_groups",
            Collection::PausedJobGroups => "paused_job_groups",
        }
    }
}

/// A document's unique key within its collection. Calendars use an empty
/// `group` by convention, since they're keyed on `name` alone (unique index
/// on `name`, no compound index).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocKey {
    pub group: String,
    pub name: String,
}

impl DocKey {
    pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
        Self { group: group.into(), name: name.into() }
    }

    pub fn calendar(name: impl Into<String>) -> Self {
        Self { group: String::new(), name: name.into() }
    }

    /// A key for collections with no `(group, name)` compound shape —
    /// calendars and the paused-group marker collections all key on a
    /// single string.
    pub fn singleton(name: impl Into<String>) -> Self {
        Self { group: String::new(), name: name.into() }
    }
}

#[derive(Debug, Error)]
pub enum BackendError {
    /// The unique `(group, name)` index rejected the write: a document with
    /// this key already exists.
    #[error("a document already exists for this key")]
    Conflict,
    /// The underlying storage medium failed. Wrapped as `StoreError::Storage`
    /// by callers.
    #[error("storage I/O failure: {0}")]
    Io(String),
}

/// The document-store contract. Every method is safe for concurrent
/// invocation from multiple threads within one process; cross-process
/// coordination relies entirely on `insert`'s atomicity (see component H).
pub trait DocumentStore: Send + Sync {
    /// Insert-if-absent. Returns `Conflict` without mutating anything if a
    /// document already exists for `key`. This is the *only* primitive the
    /// acquisition protocol and the CRUD layer rely on for race safety.
    fn insert(&self, collection: Collection, key: DocKey, doc: Document) -> Result<(), BackendError>;

    /// Unconditional upsert: overwrite if present, insert otherwise.
    fn put(&self, collection: Collection, key: DocKey, doc: Document) -> Result<(), BackendError>;

    fn find(&self, collection: Collection, key: &DocKey) -> Option<Document>;

    /// Remove and return the document, if any.
    fn delete(&self, collection: Collection, key: &DocKey) -> Option<Document>;

    fn all(&self, collection: Collection) -> Vec<(DocKey, Document)>;

    /// Scan a collection for documents matching a predicate. The document
    /// store never interprets the predicate; it is produced by the query
    /// helper (`crate::query`) from a `GroupMatcher` or similar.
    fn find_where(
        &self,
        collection: Collection,
        predicate: &dyn Fn(&DocKey, &Document) -> bool,
    ) -> Vec<(DocKey, Document)> {
        self.all(collection).into_iter().filter(|(k, d)| predicate(k, d)).collect()
    }

    fn count(&self, collection: Collection) -> usize {
        self.all(collection).len()
    }
}
