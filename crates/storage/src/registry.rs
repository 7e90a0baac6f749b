// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trigger-shape persistence helpers and the registry that dispatches to them.
//!
//! Each shape (simple, cron, calendar-interval, daily-time-interval) knows
//! only how to move its own fields between a [`Trigger`]'s `extra` bag and a
//! document — nothing here computes an actual next-fire time. That's the
//! trigger-shape-evaluation boundary the crate purpose notes call out as an
//! external collaborator's job (see `crate::trigger_behavior`). Adding a new
//! shape means writing one more `TriggerShape` impl and registering it; no
//! other component needs to know it exists.

use crate::document::Document;
use qjs_core::{StoreError, StoreResult, Trigger};

/// Per-shape adapter between a trigger's generic `extra` bag and the
/// document fields a particular trigger shape owns.
pub trait TriggerShape: Send + Sync {
    /// The `typeTag` this helper owns, and the value stored in
    /// `trigger.type_tag` / the document's `triggerClass` field.
    fn type_tag(&self) -> &'static str;

    /// Whether this helper should handle `trigger`. The default matches on
    /// `type_tag`; shapes rarely need to override it.
    fn can_handle(&self, trigger: &Trigger) -> bool {
        trigger.type_tag == self.type_tag()
    }

    /// Copy this shape's fields from `trigger.extra` into `doc`, using
    /// whatever document field names the shape owns.
    fn inject_for_storage(&self, trigger: &Trigger, doc: &mut Document);

    /// Read this shape's fields back out of `doc` into `trigger.extra`.
    fn hydrate_after_construct(&self, trigger: &mut Trigger, doc: &Document) -> StoreResult<()>;
}

fn copy_if_present(trigger: &Trigger, doc: &mut Document, keys: &[&str]) {
    for key in keys {
        if let Some(v) = trigger.extra.get(*key) {
            doc.insert((*key).to_string(), v.clone());
        }
    }
}

fn hydrate_if_present(trigger: &mut Trigger, doc: &Document, keys: &[&str]) {
    for key in keys {
        if let Some(v) = doc.get(*key) {
            trigger.extra.insert((*key).to_string(), v.clone());
        }
    }
}

/// `repeatCount`, `repeatInterval` (ms), `timesTriggered`.
pub struct SimpleTriggerShape;

const SIMPLE_FIELDS: &[&str] = &["repeatCount", "repeatInterval", "timesTriggered"];

impl TriggerShape for SimpleTriggerShape {
    fn type_tag(&self) -> &'static str {
        "simple"
    }

    fn inject_for_storage(&self, trigger: &Trigger, doc: &mut Document) {
        copy_if_present(trigger, doc, SIMPLE_FIELDS);
    }

    fn hydrate_after_construct(&self, trigger: &mut Trigger, doc: &Document) -> StoreResult<()> {
        hydrate_if_present(trigger, doc, SIMPLE_FIELDS);
        Ok(())
    }
}

/// `cronExpression`, `timezone`.
pub struct CronTriggerShape;

const CRON_FIELDS: &[&str] = &["cronExpression", "timezone"];

impl TriggerShape for CronTriggerShape {
    fn type_tag(&self) -> &'static str {
        "cron"
    }

    fn inject_for_storage(&self, trigger: &Trigger, doc: &mut Document) {
        copy_if_present(trigger, doc, CRON_FIELDS);
    }

    fn hydrate_after_construct(&self, trigger: &mut Trigger, doc: &Document) -> StoreResult<()> {
        if !doc.contains_key("cronExpression") {
            return Err(StoreError::Storage(anyhow::anyhow!(
                "cron trigger document missing cronExpression"
            )));
        }
        hydrate_if_present(trigger, doc, CRON_FIELDS);
        Ok(())
    }
}

/// `repeatIntervalUnit`, `repeatInterval`, `timesTriggered`,
/// `preserveHourOfDayAcrossDaylightSavings`.
pub struct CalendarIntervalTriggerShape;

const CALENDAR_INTERVAL_FIELDS: &[&str] = &[
    "repeatIntervalUnit",
    "repeatInterval",
    "timesTriggered",
    "preserveHourOfDayAcrossDaylightSavings",
];

impl TriggerShape for CalendarIntervalTriggerShape {
    fn type_tag(&self) -> &'static str {
        "calendar-interval"
    }

    fn inject_for_storage(&self, trigger: &Trigger, doc: &mut Document) {
        copy_if_present(trigger, doc, CALENDAR_INTERVAL_FIELDS);
    }

    fn hydrate_after_construct(&self, trigger: &mut Trigger, doc: &Document) -> StoreResult<()> {
        hydrate_if_present(trigger, doc, CALENDAR_INTERVAL_FIELDS);
        Ok(())
    }
}

/// `repeatIntervalUnit`, `repeatInterval`, `startTimeOfDay`, `endTimeOfDay`,
/// `daysOfWeek`, `timesTriggered`.
pub struct DailyTimeIntervalTriggerShape;

const DAILY_TIME_INTERVAL_FIELDS: &[&str] = &[
    "repeatIntervalUnit",
    "repeatInterval",
    "startTimeOfDay",
    "endTimeOfDay",
    "daysOfWeek",
    "timesTriggered",
];

impl TriggerShape for DailyTimeIntervalTriggerShape {
    fn type_tag(&self) -> &'static str {
        "daily-time-interval"
    }

    fn inject_for_storage(&self, trigger: &Trigger, doc: &mut Document) {
        copy_if_present(trigger, doc, DAILY_TIME_INTERVAL_FIELDS);
    }

    fn hydrate_after_construct(&self, trigger: &mut Trigger, doc: &Document) -> StoreResult<()> {
        hydrate_if_present(trigger, doc, DAILY_TIME_INTERVAL_FIELDS);
        Ok(())
    }
}

/// Dispatches to the first registered shape that can handle a trigger, and
/// maps a stored `typeTag` back to its shape. No core store code inspects a
/// specific shape's fields directly.
pub struct TriggerShapeRegistry {
    shapes: Vec<Box<dyn TriggerShape>>,
}

impl TriggerShapeRegistry {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    /// The four built-in shapes, in the order a fresh registry normally
    /// wants them tried.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(SimpleTriggerShape));
        registry.register(Box::new(CronTriggerShape));
        registry.register(Box::new(CalendarIntervalTriggerShape));
        registry.register(Box::new(DailyTimeIntervalTriggerShape));
        registry
    }

    pub fn register(&mut self, shape: Box<dyn TriggerShape>) {
        self.shapes.push(shape);
    }

    /// First-match in registration order.
    pub fn for_trigger(&self, trigger: &Trigger) -> Option<&dyn TriggerShape> {
        self.shapes.iter().find(|s| s.can_handle(trigger)).map(|b| b.as_ref())
    }

    pub fn by_type_tag(&self, type_tag: &str) -> Option<&dyn TriggerShape> {
        self.shapes.iter().find(|s| s.type_tag() == type_tag).map(|b| b.as_ref())
    }

    pub fn inject_for_storage(&self, trigger: &Trigger, doc: &mut Document) {
        if let Some(shape) = self.for_trigger(trigger) {
            shape.inject_for_storage(trigger, doc);
        }
    }

    /// No-op (not an error) when no shape is registered for the trigger's
    /// `typeTag`, matching `inject_for_storage`'s equally permissive lookup.
    pub fn hydrate_after_construct(&self, trigger: &mut Trigger, doc: &Document) -> StoreResult<()> {
        match self.by_type_tag(&trigger.type_tag.clone()) {
            Some(shape) => shape.hydrate_after_construct(trigger, doc),
            None => Ok(()),
        }
    }
}

impl Default for TriggerShapeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
