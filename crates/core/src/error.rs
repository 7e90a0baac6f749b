// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy surfaced to callers of the store.
//!
//! `LockExpired` is deliberately absent: it drives a retry loop inside the
//! acquisition protocol and must never reach a caller (see
//! `qjs_storage::acquire`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("job data value for key {key:?} is not serializable: {source}")]
    Serialization { key: String, source: serde_json::Error },

    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
