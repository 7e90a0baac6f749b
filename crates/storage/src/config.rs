// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store configuration and its validation.
//!
//! Connection parameters (`mongoUri`, `addresses`/`username`/`password`,
//! pool sizing, socket timeouts) don't drive anything in this crate — the
//! document store is injected directly as a [`crate::document::DocumentStore`]
//! rather than dialed by this crate. [`ConnectionConfig`] is kept anyway so
//! the configuration-error behavior the external interface describes (the
//! `mongoUri` xor `addresses` rule, and rejecting a pre-built client
//! alongside connection parameters) is still enforceable by callers that
//! build their `DocumentStore` from one of these.

use qjs_core::{StoreError, StoreResult};

pub const DEFAULT_COLLECTION_PREFIX: &str = "quartz_";
pub const DEFAULT_MISFIRE_THRESHOLD_MS: u64 = 5_000;
pub const DEFAULT_TRIGGER_TIMEOUT_MS: u64 = 10 * 60 * 1_000;
pub const DEFAULT_JOB_TIMEOUT_MS: u64 = 10 * 60 * 1_000;

/// Either a pre-built client handle (opaque to this crate) or the
/// parameters to build one. Exactly one of `mongo_uri` / `addresses` must
/// be set in the `Parameters` case.
#[derive(Debug, Clone)]
pub enum ConnectionConfig {
    AlreadyBuilt,
    Parameters(ConnectionParameters),
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionParameters {
    pub mongo_uri: Option<String>,
    pub addresses: Option<Vec<String>>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub db_name: Option<String>,
    pub auth_db_name: Option<String>,
    pub max_connections_per_host: Option<u32>,
    pub connect_timeout_ms: Option<u64>,
    pub socket_timeout_ms: Option<u64>,
    pub socket_keep_alive: Option<bool>,
    pub threads_allowed_to_block_for_connection_multiplier: Option<u32>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig::Parameters(ConnectionParameters::default())
    }
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub collection_prefix: String,
    pub instance_id: String,
    pub misfire_threshold_ms: u64,
    pub trigger_timeout_ms: u64,
    pub job_timeout_ms: u64,
    pub connection: ConnectionConfig,
}

impl StoreConfig {
    /// `instance_id` is required for cluster safety: it's imprinted on
    /// every lock this node takes and used for startup self-cleanup.
    pub fn new(instance_id: impl Into<String>) -> Self {
        Self {
            collection_prefix: DEFAULT_COLLECTION_PREFIX.to_string(),
            instance_id: instance_id.into(),
            misfire_threshold_ms: DEFAULT_MISFIRE_THRESHOLD_MS,
            trigger_timeout_ms: DEFAULT_TRIGGER_TIMEOUT_MS,
            job_timeout_ms: DEFAULT_JOB_TIMEOUT_MS,
            connection: ConnectionConfig::default(),
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        if self.instance_id.trim().is_empty() {
            return Err(StoreError::Config("instanceId is required".to_string()));
        }
        if self.collection_prefix.trim().is_empty() {
            return Err(StoreError::Config("collectionPrefix must not be empty".to_string()));
        }
        if let ConnectionConfig::Parameters(params) = &self.connection {
            match (&params.mongo_uri, &params.addresses) {
                (Some(_), Some(_)) => {
                    return Err(StoreError::Config(
                        "mongoUri and addresses are mutually exclusive".to_string(),
                    ))
                }
                (None, None) => {
                    return Err(StoreError::Config(
                        "one of mongoUri or addresses is required".to_string(),
                    ))
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn collection_name(&self, base: &str) -> String {
        format!("{}{}", self.collection_prefix, base)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
