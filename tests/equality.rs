mod common;

use immutable_flux::diagnostics::WarningContext;
use immutable_flux::exemption::{ignore_list, SKIP_EQUALITY_MARKER};
use immutable_flux::{
    shallow_equal, Element, Exemption, ExemptionMap, PersistentValue, PropMap, WarningStyle,
};
use serde_json::json;

fn exemptions(entries: &[(&str, Exemption)]) -> ExemptionMap {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Test that two absent maps are equal.
#[test]
fn test_both_absent_are_equal() {
    assert!(shallow_equal(None, None, &ExemptionMap::new(), &WarningContext::silent()));
}

/// Test that one absent map is never equal to a present one.
#[test]
fn test_one_absent_is_unequal() {
    let map = PropMap::new();
    let silent = WarningContext::silent();
    assert!(!shallow_equal(Some(&map), None, &ExemptionMap::new(), &silent));
    assert!(!shallow_equal(None, Some(&map), &ExemptionMap::new(), &silent));
}

/// Test that the same reference is equal without looking at any key.
#[test]
fn test_reference_short_circuit() {
    let sink = common::recording_sink();
    let ctx = WarningContext::new("C", WarningStyle::Mixin, sink.clone());
    let map = common::plain_props(&[("data", json!({}))]);
    let alias = map.clone();
    assert!(shallow_equal(Some(&map), Some(&alias), &ExemptionMap::new(), &ctx));
    assert_eq!(sink.count(), 0);
}

/// Test that a different key count is unequal.
#[test]
fn test_key_count_mismatch() {
    let a = PropMap::new().with("a", 1i64);
    let b = PropMap::new().with("a", 1i64).with("b", 2i64);
    assert!(!shallow_equal(Some(&a), Some(&b), &ExemptionMap::new(), &WarningContext::silent()));
}

/// Test that an extra exempt key still makes the maps unequal.
#[test]
fn test_key_count_mismatch_with_exempt_extra_key() {
    let a = PropMap::new().with("a", 1i64);
    let b = PropMap::new().with("a", 1i64).with("b", 2i64);
    let exempt = exemptions(&[("b", Exemption::Full)]);
    assert!(!shallow_equal(Some(&a), Some(&b), &exempt, &WarningContext::silent()));
}

/// Test that structurally equal persistent values compare equal in distinct maps.
#[test]
fn test_persistent_values_compare_structurally() {
    let a = PropMap::new().with("m", PersistentValue::from_plain(&json!({"x": [1, 2]})));
    let b = PropMap::new().with("m", PersistentValue::from_plain(&json!({"x": [1, 2]})));
    assert!(!a.same(&b));
    assert!(shallow_equal(Some(&a), Some(&b), &ExemptionMap::new(), &WarningContext::silent()));
}

/// Test that plain objects compare by identity only.
#[test]
fn test_plain_objects_compare_by_identity() {
    let a = common::plain_props(&[("o", json!({"x": 1}))]);
    let b = common::plain_props(&[("o", json!({"x": 1}))]);
    assert!(!shallow_equal(Some(&a), Some(&b), &ExemptionMap::new(), &WarningContext::silent()));

    let mut c = PropMap::new();
    c.insert("o", a.get("o").unwrap().clone());
    assert!(shallow_equal(Some(&a), Some(&c), &ExemptionMap::new(), &WarningContext::silent()));
}

/// Test that elements compare by identity.
#[test]
fn test_elements_compare_by_identity() {
    let element = Element::new("div", PropMap::new());
    let a = PropMap::new().with("child", element.clone());
    let b = PropMap::new().with("child", element);
    let c = PropMap::new().with("child", Element::new("div", PropMap::new()));
    let silent = WarningContext::silent();
    assert!(shallow_equal(Some(&a), Some(&b), &ExemptionMap::new(), &silent));
    assert!(!shallow_equal(Some(&a), Some(&c), &ExemptionMap::new(), &silent));
}

/// Test that a fully exempt key never causes inequality and never warns.
#[test]
fn test_full_exemption_suppresses_inequality() {
    let sink = common::recording_sink();
    let ctx = WarningContext::new("C", WarningStyle::Mixin, sink.clone());
    let a = common::plain_props(&[("data", json!({}))]);
    let b = common::plain_props(&[("data", json!({}))]);
    assert!(shallow_equal(Some(&a), Some(&b), &ignore_list(["data"]), &ctx));
    assert_eq!(sink.count(), 0);
}

/// Test that the skip-equality marker still warns but never causes inequality.
#[test]
fn test_skip_equality_warns_without_inequality() {
    let sink = common::recording_sink();
    let ctx = WarningContext::new("C", WarningStyle::Mixin, sink.clone());
    let a = common::plain_props(&[("data", json!({}))]);
    let b = common::plain_props(&[("data", json!({}))]);
    let exempt = exemptions(&[("data", Exemption::SkipEquality)]);
    assert!(shallow_equal(Some(&a), Some(&b), &exempt, &ctx));
    assert_eq!(
        sink.messages(),
        vec!["WARN: component: C received non-immutable object: data".to_string()]
    );
}

/// Test that the marker string parses into the skip-equality exemption.
#[test]
fn test_marker_string_parses() {
    let parsed: Exemption = serde_json::from_value(json!(SKIP_EQUALITY_MARKER)).unwrap();
    assert_eq!(parsed, Exemption::SkipEquality);
    let parsed: Exemption = serde_json::from_value(json!(true)).unwrap();
    assert_eq!(parsed, Exemption::Full);
}

/// Test that every offending key is reported even after inequality is known.
#[test]
fn test_scan_reports_all_keys() {
    let sink = common::recording_sink();
    let ctx = WarningContext::new("C", WarningStyle::Mixin, sink.clone());
    let a = PropMap::new().with("n", 1i64);
    let b = common::plain_props(&[("n", json!(2)), ("x", json!([1])), ("y", json!({}))]);
    assert!(!shallow_equal(Some(&a), Some(&b), &ExemptionMap::new(), &ctx));
    assert_eq!(sink.count(), 2);
}

/// Test that an integer and an equal float are the same prop.
#[test]
fn test_numbers_compare_by_value() {
    let a = common::plain_props(&[("n", json!(1))]);
    let b = common::plain_props(&[("n", json!(1.0))]);
    let c = common::plain_props(&[("n", json!(1.5))]);
    let silent = WarningContext::silent();
    assert!(shallow_equal(Some(&a), Some(&b), &ExemptionMap::new(), &silent));
    assert!(!shallow_equal(Some(&a), Some(&c), &ExemptionMap::new(), &silent));
}
