// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::codec;
use crate::document::DocKey;
use crate::memory::MemoryDocumentStore;
use qjs_core::{Lock, LockKey};

fn put_lock(store: &MemoryDocumentStore, group: &str, name: &str, instance_id: &str) {
    let lock = Lock::new(LockKey::new(group, name), instance_id.to_string(), 1_000);
    store.put(Collection::Locks, DocKey::new(group, name), codec::encode_lock(&lock)).unwrap();
}

#[test]
fn clean_up_self_locks_removes_only_this_nodes_locks() {
    let store = MemoryDocumentStore::new();
    put_lock(&store, "G", "mine", "node-a");
    put_lock(&store, "G", "theirs", "node-b");

    let config = StoreConfig::new("node-a");
    let removed = Bootstrap::new(&store, &config).clean_up_self_locks();

    assert_eq!(removed, 1);
    assert!(store.find(Collection::Locks, &DocKey::new("G", "mine")).is_none());
    assert!(store.find(Collection::Locks, &DocKey::new("G", "theirs")).is_some());
}

#[test]
fn clean_up_self_locks_is_idempotent_on_an_empty_store() {
    let store = MemoryDocumentStore::new();
    let config = StoreConfig::new("node-a");
    assert_eq!(Bootstrap::new(&store, &config).clean_up_self_locks(), 0);
}

#[test]
fn run_completes_the_full_sequence() {
    let store = MemoryDocumentStore::new();
    put_lock(&store, "G", "mine", "node-a");
    let config = StoreConfig::new("node-a");

    let removed = Bootstrap::new(&store, &config).run().unwrap();
    assert_eq!(removed, 1);
}
