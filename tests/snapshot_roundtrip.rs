//! Snapshot Round-Trip Tests
//!
//! restore(T, capture(r)) must be observably equal to r, for strict and
//! mixed records, including through a JSON transport.

use recordkit::{FieldDef, FieldType, Record, RecordErrorCode, RecordType, Snapshot, TypeRegistry};
use serde_json::json;
use std::sync::Arc;

fn sample_type() -> Arc<RecordType> {
    RecordType::builder("Sample")
        .field("a", FieldDef::string().with_default("42"))
        .field("b", FieldDef::int())
        .build()
        .unwrap()
}

fn sample_mixed() -> Arc<RecordType> {
    RecordType::builder("SampleMixed")
        .mixed()
        .field("a", FieldDef::string().with_default("42"))
        .field("b", FieldDef::int())
        .build()
        .unwrap()
}

#[test]
fn test_strict_round_trip() {
    let ty = sample_type();
    let s1 = Record::new(&ty, [("b", json!(41))]).unwrap();

    let s2 = Record::restore(&ty, &s1.capture()).unwrap();
    assert_eq!(s2.get("b"), Some(&json!(41)));
    assert_eq!(s2.get("a"), Some(&json!("42")));
    assert_eq!(s2.record_type().name(), "Sample");
    assert_eq!(s1, s2);
}

#[test]
fn test_mixed_round_trip_keeps_extras() {
    let ty = sample_mixed();
    let mut s1 = Record::new(&ty, [("b", json!(41)), ("tag", json!(["draft"]))]).unwrap();
    s1.set("color", json!({"hex": "#008080"})).unwrap();

    let s2 = Record::restore(&ty, &s1.capture()).unwrap();
    assert_eq!(s2.get("b"), Some(&json!(41)));
    assert_eq!(s2.get("a"), Some(&json!("42")));
    assert_eq!(s2.get("tag"), Some(&json!(["draft"])));
    assert_eq!(s2.get("color"), Some(&json!({"hex": "#008080"})));
    assert_eq!(s2.record_type().name(), "SampleMixed");
    assert_eq!(s1, s2);
}

#[test]
fn test_round_trip_through_json() {
    let mut registry = TypeRegistry::new();
    let ty = sample_mixed();
    registry.register(Arc::clone(&ty)).unwrap();

    let s1 = Record::new(&ty, [("b", json!(7)), ("note", json!("hi"))]).unwrap();
    let wire = s1.capture().to_json().unwrap();

    let snapshot = Snapshot::from_json(&wire).unwrap();
    let s2 = registry.restore(&snapshot).unwrap();
    assert_eq!(s1, s2);
}

#[test]
fn test_round_trip_with_null_and_unset_fields() {
    let ty = RecordType::builder("Sparse")
        .field("a", FieldDef::int().nullable())
        .field("b", FieldDef::string().optional())
        .field("c", FieldDef::array(FieldType::Int).zero_default())
        .build()
        .unwrap();
    let mut s1 = Record::new(&ty, [("c", json!([1, 2]))]).unwrap();
    s1.unset("c").unwrap();

    let s2 = s1.capture().restore(&ty).unwrap();
    assert_eq!(s2.get("a"), Some(&json!(null)));
    assert!(!s2.is_set("b"));
    assert!(!s2.is_set("c"));
    assert_eq!(s1, s2);
}

#[test]
fn test_round_trip_after_unset_attempt_on_required_field() {
    let ty = sample_type();
    let mut s1 = Record::new(&ty, [("b", json!(1))]).unwrap();

    let err = s1.unset("b").unwrap_err();
    assert_eq!(err.code(), RecordErrorCode::MissingRequiredField);

    let snapshot = s1.capture();
    assert_eq!(snapshot.values.get("b"), Some(&json!(1)));
    assert_eq!(Record::restore(&ty, &snapshot).unwrap(), s1);
}

#[test]
fn test_restore_into_same_named_type_is_a_distinct_record() {
    let first = sample_type();
    let second = sample_type();
    let s1 = Record::new(&first, [("b", json!(1))]).unwrap();

    let s2 = Record::restore(&second, &s1.capture()).unwrap();
    assert_eq!(s2.items().collect::<Vec<_>>(), s1.items().collect::<Vec<_>>());
    assert_ne!(s1, s2);
}

#[test]
fn test_restore_into_other_type_fails() {
    let strict = sample_type();
    let mixed = sample_mixed();
    let snapshot = Record::new(&strict, [("b", json!(1))]).unwrap().capture();

    let err = snapshot.restore(&mixed).unwrap_err();
    assert_eq!(err.code(), RecordErrorCode::SnapshotTypeMismatch);
}
