// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger definitions: the other half of the schedule, and the thing the
//! acquisition protocol actually competes over.

use crate::job::JobDataMap;
use crate::key::{JobKey, TriggerKey};
use crate::misfire::MisfireInstruction;
use crate::state::TriggerState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

crate::define_id! {
    /// Identifies one specific firing of a trigger, assigned when it fires.
    pub struct FireInstanceId("fire");
}

/// A trigger. Core fields are named directly; shape-specific fields
/// (simple/cron/calendar-interval/daily-time-interval) are injected and
/// extracted by the persistence helper selected for `type_tag` — see
/// `qjs_storage::registry`. No core code inspects `extra` by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub key: TriggerKey,
    pub job_key: JobKey,
    pub type_tag: String,
    pub description: Option<String>,
    pub calendar_name: Option<String>,
    pub state: TriggerState,
    /// Epoch milliseconds.
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub next_fire_time: Option<i64>,
    pub previous_fire_time: Option<i64>,
    pub final_fire_time: Option<i64>,
    pub fire_instance_id: Option<FireInstanceId>,
    pub priority: i32,
    pub misfire_instruction: MisfireInstruction,
    pub data_map: JobDataMap,
    /// Shape-specific attributes injected by `TriggerShape::inject_for_storage`
    /// and read back by `TriggerShape::hydrate_after_construct`.
    #[serde(default)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Default trigger priority (Quartz historically calls this `5`).
pub const DEFAULT_PRIORITY: i32 = 5;

impl Trigger {
    pub fn new(key: TriggerKey, job_key: JobKey, type_tag: impl Into<String>, start_time: i64) -> Self {
        Self {
            key,
            job_key,
            type_tag: type_tag.into(),
            description: None,
            calendar_name: None,
            state: TriggerState::Waiting,
            start_time,
            end_time: None,
            next_fire_time: Some(start_time),
            previous_fire_time: None,
            final_fire_time: None,
            fire_instance_id: None,
            priority: DEFAULT_PRIORITY,
            misfire_instruction: MisfireInstruction::default(),
            data_map: JobDataMap::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Invariant I7: a stored trigger must have a `next_fire_time` unless it
    /// has reached a terminal state.
    pub fn satisfies_next_fire_invariant(&self) -> bool {
        self.next_fire_time.is_some() || self.state.is_terminal()
    }
}

#[cfg(test)]
#[path = "trigger_tests.rs"]
mod tests;
