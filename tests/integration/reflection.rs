//! Schema-driven reading and JSON conversion.

use flatcheck::reflect::{buffer_to_json, from_json, json_to_buffer, read_field, FieldValue};
use flatcheck::testing::{basic_character_buffer, hero_buffer, hero_json, hero_schema};
use flatcheck::{character_schema, BuildError, Builder, ElementType, Schema, Value, Verifier};
use serde_json::json;

#[test]
fn test_character_json_matches_typed_accessors() {
    let buf = basic_character_buffer();
    let verified = Verifier::new(character_schema()).verify_buffer(&buf).unwrap();
    assert_eq!(
        buffer_to_json(&verified),
        json!({
            "mana": 300,
            "hp": 200,
            "name": "UnrealMonster_Basic",
            "inventory": [10, 20, 30, 40, 50],
            "chtype": "Player"
        })
    );
}

#[test]
fn test_hero_round_trip() {
    let schema = hero_schema();
    let verified_buf = hero_buffer();
    let verified = Verifier::new(&schema).verify_buffer(&verified_buf).unwrap();
    assert_eq!(buffer_to_json(&verified), hero_json());
}

#[test]
fn test_read_field_variants() {
    let schema = hero_schema();
    let buf = hero_buffer();
    let verified = Verifier::new(&schema).verify_buffer(&buf).unwrap();
    let root = verified.root();
    let hero = schema.root_table().unwrap();

    assert_eq!(read_field(root, &schema, hero, 0), FieldValue::Str("Aria"));
    assert_eq!(read_field(root, &schema, hero, 2), FieldValue::Scalar(Value::UByte(1)));
    assert_eq!(read_field(root, &schema, hero, 7), FieldValue::Absent, "deprecated");
    assert_eq!(read_field(root, &schema, hero, 42), FieldValue::Absent, "unknown");

    let FieldValue::Vector(tags) = read_field(root, &schema, hero, 5) else {
        panic!("tags should be a vector");
    };
    assert_eq!(tags.element_type(), ElementType::String);
    assert_eq!(tags.len(), 3);
    assert_eq!(tags.get(1), Some(FieldValue::Str("")));
    assert_eq!(tags.get(3), None);

    let FieldValue::Vector(items) = read_field(root, &schema, hero, 4) else {
        panic!("items should be a vector");
    };
    let Some(FieldValue::Table(item, item_id)) = items.get(0) else {
        panic!("items hold tables");
    };
    assert_eq!(read_field(item, &schema, item_id, 0), FieldValue::Str("staff"));
    assert_eq!(read_field(item, &schema, item_id, 1), FieldValue::Scalar(Value::Float(2.25)));
}

#[test]
fn test_absent_nested_table_is_absent() {
    let schema = hero_schema();
    let buf = json_to_buffer(&schema, &json!({"name": "Bare"})).unwrap();
    let verified = Verifier::new(&schema).verify_buffer(&buf).unwrap();
    let hero = schema.root_table().unwrap();
    assert_eq!(read_field(verified.root(), &schema, hero, 3), FieldValue::Absent);
    assert_eq!(
        buffer_to_json(&verified),
        json!({"name": "Bare", "level": 1, "class": "Warrior"})
    );
}

#[test]
fn test_from_json_errors_name_the_problem() {
    let schema = hero_schema();
    let hero = schema.root_table().unwrap();
    let mut builder = Builder::new();

    let err = from_json(&mut builder, &schema, hero, &json!({"nope": 1})).unwrap_err();
    assert!(matches!(err, BuildError::UnknownField { .. }));

    let err = from_json(&mut builder, &schema, hero, &json!({"old": 1})).unwrap_err();
    assert!(matches!(err, BuildError::DeprecatedField { .. }));

    let err = from_json(&mut builder, &schema, hero, &json!({"path": [1, -1]})).unwrap_err();
    assert!(matches!(err, BuildError::InvalidValue { .. }));

    let err = from_json(&mut builder, &schema, hero, &json!({"stats": 3})).unwrap_err();
    assert!(matches!(err, BuildError::InvalidValue { .. }));
}

#[test]
fn test_null_means_absent() {
    let schema = character_schema();
    let a = json_to_buffer(schema, &json!({"name": null, "hp": 3})).unwrap();
    let b = json_to_buffer(schema, &json!({"hp": 3})).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_empty_schema_has_no_root() {
    let err = json_to_buffer(&Schema::default(), &json!({})).unwrap_err();
    assert!(matches!(err, BuildError::UnknownTable(_)));
}
