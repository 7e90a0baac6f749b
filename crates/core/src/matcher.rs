// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Group matchers: the vocabulary callers use to select jobs/triggers by group.
//!
//! A matcher is a value, not a query. Translating it into a store-side
//! predicate is the query helper's job (see `qjs_storage::query`).

use serde::{Deserialize, Serialize};

/// Selects a subset of a collection by comparing the `group` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupMatcher {
    Equals(String),
    StartsWith(String),
    EndsWith(String),
    Contains(String),
    /// Matches every group ("anything").
    Everything,
}

impl GroupMatcher {
    pub fn equals(group: impl Into<String>) -> Self {
        Self::Equals(group.into())
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Self::StartsWith(prefix.into())
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        Self::EndsWith(suffix.into())
    }

    pub fn contains(needle: impl Into<String>) -> Self {
        Self::Contains(needle.into())
    }

    /// Pure in-process evaluation, independent of any storage backend.
    /// The storage crate's query helper builds an equivalent store-side
    /// predicate from the same matcher so that in-memory and backed
    /// implementations agree.
    pub fn matches(&self, group: &str) -> bool {
        match self {
            GroupMatcher::Equals(g) => group == g,
            GroupMatcher::StartsWith(p) => group.starts_with(p.as_str()),
            GroupMatcher::EndsWith(s) => group.ends_with(s.as_str()),
            GroupMatcher::Contains(n) => group.contains(n.as_str()),
            GroupMatcher::Everything => true,
        }
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
