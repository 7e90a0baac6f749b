// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use qjs_core::{JobKey, TriggerKey};

fn cron_trigger() -> Trigger {
    Trigger::new(TriggerKey::new("G", "T"), JobKey::new("G", "J"), "cron", 1_000)
}

#[test]
fn registry_dispatches_by_type_tag_first_match() {
    let registry = TriggerShapeRegistry::with_defaults();
    let trigger = cron_trigger();
    let shape = registry.for_trigger(&trigger).expect("cron shape registered");
    assert_eq!(shape.type_tag(), "cron");
}

#[test]
fn unregistered_type_tag_has_no_shape() {
    let registry = TriggerShapeRegistry::with_defaults();
    let trigger = Trigger::new(TriggerKey::new("G", "T"), JobKey::new("G", "J"), "exotic", 1_000);
    assert!(registry.for_trigger(&trigger).is_none());
}

#[test]
fn inject_for_storage_copies_only_shapes_own_fields() {
    let registry = TriggerShapeRegistry::with_defaults();
    let mut trigger = cron_trigger();
    trigger.extra.insert("cronExpression".into(), serde_json::json!("* * * * *"));
    trigger.extra.insert("timezone".into(), serde_json::json!("UTC"));
    trigger.extra.insert("unrelatedNoise".into(), serde_json::json!(42));

    let mut doc = Document::new();
    registry.inject_for_storage(&trigger, &mut doc);

    assert_eq!(doc.get("cronExpression"), Some(&serde_json::json!("* * * * *")));
    assert_eq!(doc.get("timezone"), Some(&serde_json::json!("UTC")));
    assert!(!doc.contains_key("unrelatedNoise"));
}

#[test]
fn hydrate_after_construct_rejects_cron_trigger_missing_expression() {
    let registry = TriggerShapeRegistry::with_defaults();
    let mut trigger = cron_trigger();
    let doc = Document::new();
    let err = registry.hydrate_after_construct(&mut trigger, &doc).unwrap_err();
    assert!(matches!(err, StoreError::Storage(_)));
}

#[test]
fn hydrate_after_construct_fills_extra_from_document() {
    let registry = TriggerShapeRegistry::with_defaults();
    let mut trigger = Trigger::new(TriggerKey::new("G", "T"), JobKey::new("G", "J"), "simple", 1_000);
    let mut doc = Document::new();
    doc.insert("repeatCount".into(), serde_json::json!(5));
    doc.insert("repeatInterval".into(), serde_json::json!(60_000));

    registry.hydrate_after_construct(&mut trigger, &doc).unwrap();

    assert_eq!(trigger.extra.get("repeatCount"), Some(&serde_json::json!(5)));
    assert_eq!(trigger.extra.get("repeatInterval"), Some(&serde_json::json!(60_000)));
}

#[test]
fn hydrate_after_construct_is_a_no_op_for_an_unregistered_type_tag() {
    let registry = TriggerShapeRegistry::with_defaults();
    let mut trigger = Trigger::new(TriggerKey::new("G", "T"), JobKey::new("G", "J"), "exotic", 1_000);
    let doc = Document::new();
    registry.hydrate_after_construct(&mut trigger, &doc).unwrap();
    assert!(trigger.extra.is_empty());
}

#[test]
fn by_type_tag_finds_shape_without_a_trigger_instance() {
    let registry = TriggerShapeRegistry::with_defaults();
    assert!(registry.by_type_tag("daily-time-interval").is_some());
    assert!(registry.by_type_tag("no-such-shape").is_none());
}

#[test]
fn custom_shape_can_be_registered_alongside_defaults() {
    struct AlwaysFalseShape;
    impl TriggerShape for AlwaysFalseShape {
        fn type_tag(&self) -> &'static str {
            "never-matches"
        }
        fn can_handle(&self, _trigger: &Trigger) -> bool {
            false
        }
        fn inject_for_storage(&self, _trigger: &Trigger, _doc: &mut Document) {}
        fn hydrate_after_construct(&self, _trigger: &mut Trigger, _doc: &Document) -> StoreResult<()> {
            Ok(())
        }
    }

    let mut registry = TriggerShapeRegistry::new();
    registry.register(Box::new(AlwaysFalseShape));
    registry.register(Box::new(SimpleTriggerShape));

    let simple = Trigger::new(TriggerKey::new("G", "T"), JobKey::new("G", "J"), "simple", 1_000);
    let shape = registry.for_trigger(&simple).expect("simple shape registered second");
    assert_eq!(shape.type_tag(), "simple");
}
