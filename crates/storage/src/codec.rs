// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encode/decode jobs, triggers, and calendars to/from store documents.
//!
//! A data map is stored inline (one document field per key) only when every
//! value in it is a JSON string; otherwise the whole map is serialized and
//! base64-encoded into a single opaque field. On decode the opaque field is
//! tried first; if it's absent, the map is reconstructed from whatever
//! fields remain outside the reserved set. Trigger data maps are always
//! stored opaquely — triggers already carry persistence-helper-injected
//! shape fields (component B) alongside the reserved set, and risking a
//! collision between those and an inline-reconstructed data map isn't worth
//! the space saved (see DESIGN.md).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use qjs_core::{Calendar, Job, JobDataMap, JobId, Lock, Trigger};
use qjs_core::{JobKey, LockKey, TriggerKey};
use qjs_core::{MisfireInstruction, StoreError, StoreResult, TriggerState};

use crate::document::Document;
use crate::registry::TriggerShapeRegistry;

const JOB_OPAQUE_FIELD: &str = "jobDataJson";
const JOB_RESERVED_FIELDS: &[&str] = &[
    "id",
    "group",
    "name",
    "jobClass",
    "description",
    "durable",
    "persistJobDataAfterExecution",
    "disallowConcurrentExecution",
    JOB_OPAQUE_FIELD,
];

const TRIGGER_OPAQUE_FIELD: &str = "jobDataJson";

fn insert_data_map(map: &JobDataMap, doc: &mut Document, opaque_field: &str, force_opaque: bool) {
    if map.is_empty() {
        return;
    }
    if !force_opaque && map.is_all_strings() {
        for (k, v) in map.iter() {
            doc.insert(k.clone(), v.clone());
        }
        return;
    }
    // `JobDataMap`'s values are always already-valid `serde_json::Value`s
    // (see `JobDataMap::try_insert`), so this can't fail.
    let bytes = serde_json::to_vec(map).expect("job data map values are pre-validated JSON");
    doc.insert(opaque_field.to_string(), serde_json::Value::String(BASE64.encode(bytes)));
}

fn extract_data_map(doc: &Document, opaque_field: &str, reserved: &[&str]) -> StoreResult<JobDataMap> {
    if let Some(serde_json::Value::String(encoded)) = doc.get(opaque_field) {
        let bytes = BASE64
            .decode(encoded)
            .map_err(|e| StoreError::Storage(anyhow::anyhow!("corrupt opaque data map: {e}")))?;
        let map: JobDataMap = serde_json::from_slice(&bytes)
            .map_err(|e| StoreError::Storage(anyhow::anyhow!("corrupt opaque data map: {e}")))?;
        return Ok(map);
    }
    let mut map = JobDataMap::new();
    for (k, v) in doc.iter() {
        if reserved.contains(&k.as_str()) || k == opaque_field {
            continue;
        }
        // Re-serializing a `Value` back into a `Value` cannot fail.
        map.try_insert(k.clone(), v.clone()).expect("re-encoding a Value is infallible");
    }
    Ok(map)
}

pub fn encode_job(job: &Job) -> Document {
    let mut doc = Document::new();
    doc.insert("id".into(), serde_json::Value::String(job.id.to_string()));
    doc.insert("group".into(), serde_json::Value::String(job.key.group.clone()));
    doc.insert("name".into(), serde_json::Value::String(job.key.name.clone()));
    doc.insert("jobClass".into(), serde_json::Value::String(job.type_tag.clone()));
    if let Some(d) = &job.description {
        doc.insert("description".into(), serde_json::Value::String(d.clone()));
    }
    doc.insert("durable".into(), serde_json::Value::Bool(job.durable));
    doc.insert(
        "persistJobDataAfterExecution".into(),
        serde_json::Value::Bool(job.persist_job_data_after_execution),
    );
    doc.insert(
        "disallowConcurrentExecution".into(),
        serde_json::Value::Bool(job.disallow_concurrent_execution),
    );
    insert_data_map(&job.data_map, &mut doc, JOB_OPAQUE_FIELD, false);
    doc
}

pub fn decode_job(doc: &Document) -> StoreResult<Job> {
    let id = doc
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| StoreError::Storage(anyhow::anyhow!("job document missing id")))?;
    let group = field_str(doc, "group")?;
    let name = field_str(doc, "name")?;
    let type_tag = field_str(doc, "jobClass")?;
    let description = doc.get("description").and_then(|v| v.as_str()).map(str::to_string);
    let durable = doc.get("durable").and_then(|v| v.as_bool()).unwrap_or(false);
    let persist_job_data_after_execution = doc
        .get("persistJobDataAfterExecution")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let disallow_concurrent_execution = doc
        .get("disallowConcurrentExecution")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let data_map = extract_data_map(doc, JOB_OPAQUE_FIELD, JOB_RESERVED_FIELDS)?;

    Ok(Job {
        id: JobId::from_string(id),
        key: JobKey::new(group, name),
        type_tag,
        description,
        durable,
        persist_job_data_after_execution,
        disallow_concurrent_execution,
        data_map,
    })
}

pub fn encode_trigger(trigger: &Trigger) -> Document {
    let mut doc = Document::new();
    doc.insert("group".into(), serde_json::Value::String(trigger.key.group.clone()));
    doc.insert("name".into(), serde_json::Value::String(trigger.key.name.clone()));
    doc.insert("jobGroup".into(), serde_json::Value::String(trigger.job_key.group.clone()));
    doc.insert("jobName".into(), serde_json::Value::String(trigger.job_key.name.clone()));
    doc.insert("triggerClass".into(), serde_json::Value::String(trigger.type_tag.clone()));
    if let Some(d) = &trigger.description {
        doc.insert("description".into(), serde_json::Value::String(d.clone()));
    }
    if let Some(c) = &trigger.calendar_name {
        doc.insert("calendarName".into(), serde_json::Value::String(c.clone()));
    }
    doc.insert("state".into(), serde_json::Value::String(trigger.state.to_string()));
    doc.insert("startTime".into(), serde_json::json!(trigger.start_time));
    doc.insert("endTime".into(), serde_json::json!(trigger.end_time));
    doc.insert("nextFireTime".into(), serde_json::json!(trigger.next_fire_time));
    doc.insert("previousFireTime".into(), serde_json::json!(trigger.previous_fire_time));
    doc.insert("finalFireTime".into(), serde_json::json!(trigger.final_fire_time));
    doc.insert(
        "fireInstanceId".into(),
        serde_json::json!(trigger.fire_instance_id.as_ref().map(|id| id.to_string())),
    );
    doc.insert("priority".into(), serde_json::json!(trigger.priority));
    doc.insert("misfireInstruction".into(), serde_json::json!(trigger.misfire_instruction.0));
    insert_data_map(&trigger.data_map, &mut doc, TRIGGER_OPAQUE_FIELD, true);
    for (k, v) in &trigger.extra {
        doc.insert(k.clone(), v.clone());
    }
    doc
}

pub fn decode_trigger(doc: &Document, registry: &TriggerShapeRegistry) -> StoreResult<Trigger> {
    let group = field_str(doc, "group")?;
    let name = field_str(doc, "name")?;
    let job_group = field_str(doc, "jobGroup")?;
    let job_name = field_str(doc, "jobName")?;
    let type_tag = field_str(doc, "triggerClass")?;
    let description = doc.get("description").and_then(|v| v.as_str()).map(str::to_string);
    let calendar_name = doc.get("calendarName").and_then(|v| v.as_str()).map(str::to_string);
    let state = decode_state(doc)?;
    let start_time = doc
        .get("startTime")
        .and_then(|v| v.as_i64())
        .ok_or_else(|| StoreError::Storage(anyhow::anyhow!("trigger document missing startTime")))?;
    let end_time = doc.get("endTime").and_then(|v| v.as_i64());
    let next_fire_time = doc.get("nextFireTime").and_then(|v| v.as_i64());
    let previous_fire_time = doc.get("previousFireTime").and_then(|v| v.as_i64());
    let final_fire_time = doc.get("finalFireTime").and_then(|v| v.as_i64());
    let fire_instance_id = doc
        .get("fireInstanceId")
        .and_then(|v| v.as_str())
        .map(qjs_core::FireInstanceId::from_string);
    let priority = doc.get("priority").and_then(|v| v.as_i64()).unwrap_or(i64::from(qjs_core::DEFAULT_PRIORITY)) as i32;
    let misfire_instruction =
        MisfireInstruction(doc.get("misfireInstruction").and_then(|v| v.as_i64()).unwrap_or(-1) as i32);
    let data_map = extract_data_map(doc, TRIGGER_OPAQUE_FIELD, &[])?;

    const CORE_FIELDS: &[&str] = &[
        "group",
        "name",
        "jobGroup",
        "jobName",
        "triggerClass",
        "description",
        "calendarName",
        "state",
        "startTime",
        "endTime",
        "nextFireTime",
        "previousFireTime",
        "finalFireTime",
        "fireInstanceId",
        "priority",
        "misfireInstruction",
        TRIGGER_OPAQUE_FIELD,
    ];
    let extra = doc
        .iter()
        .filter(|(k, _)| !CORE_FIELDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    let mut trigger = Trigger {
        key: TriggerKey::new(group, name),
        job_key: JobKey::new(job_group, job_name),
        type_tag,
        description,
        calendar_name,
        state,
        start_time,
        end_time,
        next_fire_time,
        previous_fire_time,
        final_fire_time,
        fire_instance_id,
        priority,
        misfire_instruction,
        data_map,
        extra,
    };
    // Per-shape hydration only validates today (e.g. a cron trigger document
    // missing `cronExpression`); `extra`'s contents were already reconstructed
    // above by excluding `CORE_FIELDS`, so this can't change the decoded value.
    registry.hydrate_after_construct(&mut trigger, doc)?;
    Ok(trigger)
}

fn decode_state(doc: &Document) -> StoreResult<TriggerState> {
    let raw = field_str(doc, "state")?;
    Ok(match raw.as_str() {
        "waiting" => TriggerState::Waiting,
        "paused" => TriggerState::Paused,
        "acquired" => TriggerState::Acquired,
        "complete" => TriggerState::Complete,
        "error" => TriggerState::Error,
        "blocked" => TriggerState::Blocked,
        "paused_blocked" => TriggerState::PausedBlocked,
        "deleted" => TriggerState::Deleted,
        other => {
            return Err(StoreError::Storage(anyhow::anyhow!("unrecognized trigger state {other:?}")))
        }
    })
}

pub fn encode_calendar(calendar: &Calendar) -> Document {
    let mut doc = Document::new();
    doc.insert("name".into(), serde_json::Value::String(calendar.name.clone()));
    doc.insert("blob".into(), serde_json::Value::String(BASE64.encode(&calendar.blob)));
    doc
}

pub fn decode_calendar(doc: &Document) -> StoreResult<Calendar> {
    let name = field_str(doc, "name")?;
    let blob = doc
        .get("blob")
        .and_then(|v| v.as_str())
        .ok_or_else(|| StoreError::Storage(anyhow::anyhow!("calendar document missing blob")))?;
    let blob = BASE64
        .decode(blob)
        .map_err(|e| StoreError::Storage(anyhow::anyhow!("corrupt calendar blob: {e}")))?;
    Ok(Calendar { name, blob })
}

pub fn encode_lock(lock: &Lock) -> Document {
    let mut doc = Document::new();
    doc.insert("group".into(), serde_json::Value::String(lock.key.group.clone()));
    doc.insert("name".into(), serde_json::Value::String(lock.key.name.clone()));
    doc.insert("instanceId".into(), serde_json::Value::String(lock.instance_id.clone()));
    doc.insert("lockTime".into(), serde_json::json!(lock.lock_time_ms));
    doc
}

pub fn decode_lock(doc: &Document) -> StoreResult<Lock> {
    let group = field_str(doc, "group")?;
    let name = field_str(doc, "name")?;
    let instance_id = field_str(doc, "instanceId")?;
    let lock_time_ms = doc
        .get("lockTime")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| StoreError::Storage(anyhow::anyhow!("lock document missing lockTime")))?;
    Ok(Lock { key: LockKey::new(group, name), instance_id, lock_time_ms })
}

fn field_str(doc: &Document, field: &'static str) -> StoreResult<String> {
    doc.get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| StoreError::Storage(anyhow::anyhow!("document missing field {field:?}")))
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
