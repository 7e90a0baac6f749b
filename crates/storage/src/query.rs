// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Translates [`GroupMatcher`] into predicates the document store can run
//! over a collection, plus a set-membership predicate for bulk operations
//! that already know the exact groups they want (e.g. "resume everything
//! paused by this matcher" needs to re-find the same groups it paused).

use std::collections::BTreeSet;

use qjs_core::GroupMatcher;

use crate::document::DocKey;

/// A predicate over a document's key, matching [`DocumentStore::find_where`]'s
/// signature.
pub fn matcher_predicate(matcher: GroupMatcher) -> impl Fn(&DocKey, &crate::document::Document) -> bool {
    move |key, _doc| matcher.matches(&key.group)
}

/// A predicate that matches keys whose group is in `groups`.
pub fn group_in_predicate(groups: BTreeSet<String>) -> impl Fn(&DocKey, &crate::document::Document) -> bool {
    move |key, _doc| groups.contains(&key.group)
}

/// Collects the distinct groups present among `keys`.
pub fn distinct_groups<'a>(keys: impl IntoIterator<Item = &'a DocKey>) -> BTreeSet<String> {
    keys.into_iter().map(|k| k.group.clone()).collect()
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
