// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Calendars: opaque exclusion blobs keyed by name.
//!
//! The store only round-trips the blob; holiday/exclusion semantics are a
//! runtime collaborator's concern, not the store's.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub name: String,
    /// Opaque serialized form supplied by the runtime's calendar codec.
    pub blob: Vec<u8>,
}

impl Calendar {
    pub fn new(name: impl Into<String>, blob: Vec<u8>) -> Self {
        Self { name: name.into(), blob }
    }
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
