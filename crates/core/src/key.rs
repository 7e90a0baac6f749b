// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite `(group, name)` keys shared by jobs, triggers, and calendars.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default group used when a caller does not specify one.
pub const DEFAULT_GROUP: &str = "DEFAULT";

/// A `(group, name)` pair uniquely identifying a job within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobKey {
    pub group: String,
    pub name: String,
}

/// A `(group, name)` pair uniquely identifying a trigger within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriggerKey {
    pub group: String,
    pub name: String,
}

/// A `(group, name)` pair uniquely identifying a lock document.
///
/// Job-concurrency locks use the `jobconcurrentlock:` name prefix convention
/// (see [`TriggerKey::job_lock`]) rather than a distinct lock kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LockKey {
    pub group: String,
    pub name: String,
}

/// Prefix applied to a job name to derive its cluster-wide concurrency lock name.
pub const JOB_CONCURRENT_LOCK_PREFIX: &str = "jobconcurrentlock:";

macro_rules! impl_key {
    ($ty:ident) => {
        impl $ty {
            pub fn new(group: impl Into<String>, name: impl Into<String>) -> Self {
                Self { group: group.into(), name: name.into() }
            }

            pub fn with_default_group(name: impl Into<String>) -> Self {
                Self::new(DEFAULT_GROUP, name)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}.{}", self.group, self.name)
            }
        }
    };
}

impl_key!(JobKey);
impl_key!(TriggerKey);
impl_key!(LockKey);

impl JobKey {
    pub fn as_lock_key(&self) -> LockKey {
        LockKey::new(self.group.clone(), format!("{JOB_CONCURRENT_LOCK_PREFIX}{}", self.name))
    }
}

impl TriggerKey {
    /// The lock key a trigger's own acquisition lock is stored under: identical
    /// `(group, name)` to the trigger itself.
    pub fn as_lock_key(&self) -> LockKey {
        LockKey::new(self.group.clone(), self.name.clone())
    }
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
