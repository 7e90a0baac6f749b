// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job definitions and their data payload.

use crate::error::StoreError;
use crate::key::JobKey;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Opaque identity assigned to a job at insertion time. Stable across
    /// `storeJob(replace=true)` updates; never reused after `removeJob`.
    pub struct JobId("job-");
}

/// String-keyed payload attached to a job or trigger.
///
/// Values are `serde_json::Value` so that round-tripping through the codec
/// (`qjs_storage::codec`) is lossless. [`JobDataMap::try_insert`] is the
/// boundary where a caller's arbitrary `Serialize` value either becomes a
/// `Value` or fails with [`StoreError::Serialization`], naming the offending
/// key — the one place component A's "non-serializable value" diagnostic
/// actually originates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDataMap(IndexMap<String, serde_json::Value>);

impl JobDataMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_insert<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> Result<(), StoreError> {
        let key = key.into();
        let value = serde_json::to_value(value)
            .map_err(|source| StoreError::Serialization { key: key.clone(), source })?;
        self.0.insert(key, value);
        Ok(())
    }

    pub fn insert_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), serde_json::Value::String(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }

    /// True only when every value is a JSON string — the condition under
    /// which the codec is allowed to store fields inline rather than as a
    /// single opaque blob.
    pub fn is_all_strings(&self) -> bool {
        self.0.values().all(|v| v.is_string())
    }
}

impl FromIterator<(String, serde_json::Value)> for JobDataMap {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A schedulable unit of work. Identified by `(group, name)`; `id` is the
/// opaque identity assigned at first insertion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub key: JobKey,
    /// Identifies the job implementation to the (external) type registry.
    pub type_tag: String,
    pub description: Option<String>,
    /// Durable jobs persist even with zero referencing triggers (invariant I3
    /// only removes non-durable orphans).
    pub durable: bool,
    /// Re-store the job after execution when its data map was mutated in place.
    pub persist_job_data_after_execution: bool,
    /// Cluster-wide mutual exclusion: at most one job-concurrency lock while executing.
    pub disallow_concurrent_execution: bool,
    pub data_map: JobDataMap,
}

impl Job {
    pub fn new(key: JobKey, type_tag: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            key,
            type_tag: type_tag.into(),
            description: None,
            durable: false,
            persist_job_data_after_execution: false,
            disallow_concurrent_execution: false,
            data_map: JobDataMap::new(),
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
