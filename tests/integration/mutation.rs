//! In-place mutation through the verified mutable views.

use crate::common::build_character;
use flatcheck::character::{FIELD_CHTYPE, FIELD_HP, FIELD_INVENTORY, FIELD_MANA, FIELD_NAME};
use flatcheck::testing::{advanced_character_buffer, basic_character_buffer, hero_buffer, hero_schema};
use flatcheck::{
    root_as_character, root_as_character_mut, CharacterType, Value, Verifier,
};

#[test]
fn test_demo_inventory_patch() {
    let mut buf = basic_character_buffer();
    {
        let mut c = root_as_character_mut(&mut buf).unwrap();
        let mut inventory = c.mutable_inventory().unwrap();
        assert_eq!(inventory.len(), 5);
        assert!(inventory.mutate(1, 99));
        assert!(c.is_mutated());
    }
    let c = root_as_character(&buf).unwrap();
    assert_eq!(c.inventory().unwrap().bytes(), &[10, 99, 30, 40, 50]);
    assert_eq!(c.name(), Some("UnrealMonster_Basic"));
    assert_eq!((c.mana(), c.hp()), (300, 200));
}

#[test]
fn test_demo_hp_patch() {
    let mut buf = advanced_character_buffer();
    {
        let mut c = root_as_character_mut(&mut buf).unwrap();
        assert!(c.mutate_hp(1234));
        c.reverify().unwrap();
        assert!(!c.is_mutated(), "reverify resets the fingerprint");
    }
    let c = root_as_character(&buf).unwrap();
    assert_eq!(c.hp(), 1234);
    assert_eq!(c.mana(), 999);
    assert_eq!(c.chtype(), CharacterType::AI);
}

#[test]
fn test_mutation_touches_only_its_bytes() {
    let original = basic_character_buffer();
    let mut buf = original.clone();
    let pos = {
        let mut c = root_as_character_mut(&mut buf).unwrap();
        assert!(c.mutate_mana(-1));
        c.as_character().as_table().field_offset(flatcheck::character::VT_MANA).unwrap()
    };
    for (i, (a, b)) in original.iter().zip(&buf).enumerate() {
        if !(pos..pos + 4).contains(&i) {
            assert_eq!(a, b, "byte {} changed", i);
        }
    }
    assert_eq!(&buf[pos..pos + 4], &(-1i32).to_le_bytes());
}

#[test]
fn test_absent_fields_cannot_be_mutated() {
    let mut buf = build_character(150, 100, None, None, CharacterType::USE_DEFAULT);
    let before = buf.clone();
    {
        let mut c = root_as_character_mut(&mut buf).unwrap();
        assert!(!c.mutate_mana(5));
        assert!(!c.mutate_hp(5));
        assert!(!c.mutate_chtype(CharacterType::HIDDEN));
        assert!(c.mutable_inventory().is_none());
        assert!(!c.is_mutated());
    }
    assert_eq!(buf, before);
}

#[test]
fn test_schema_checked_mutation_by_field_id() {
    let mut buf = basic_character_buffer();
    let before = buf.clone();
    let mut c = root_as_character_mut(&mut buf).unwrap();
    assert!(!c.mutate_field(FIELD_MANA, Value::Long(1)), "wrong type");
    assert!(!c.mutate_field(FIELD_NAME, Value::Int(1)), "string field");
    assert!(!c.mutate_field(FIELD_INVENTORY, Value::UByte(1)), "vector field");
    assert!(!c.mutate_field(99, Value::Int(1)), "unknown field");
    assert!(!c.is_mutated());
    assert_eq!(c.bytes(), &before[..]);

    assert!(c.mutate_field(FIELD_HP, Value::Int(7)));
    assert!(c.mutate_field(FIELD_CHTYPE, Value::Byte(3)));
    assert_eq!(c.as_character().chtype(), CharacterType::HIDDEN);
}

#[test]
fn test_out_of_range_element_is_rejected() {
    let mut buf = basic_character_buffer();
    let mut c = root_as_character_mut(&mut buf).unwrap();
    let mut inventory = c.mutable_inventory().unwrap();
    assert!(!inventory.mutate(5, 1));
    assert_eq!(inventory.get(4), Some(50));
    assert_eq!(inventory.get(5), None);
}

#[test]
fn test_nested_mutation_through_generic_views() {
    let schema = hero_schema();
    let mut buf = hero_buffer();
    {
        let mut verified = Verifier::new(&schema).verify_buffer_mut(&mut buf).unwrap();
        let mut root = verified.root_mut();
        // level (field 1), stats.i (field 3 -> field 5), path[2] (field 6), spawn.x (field 9)
        assert!(root.mutate_field(1, Value::Short(13)));
        assert!(root.mutate_element(6, 2, Value::UShort(7)));
        assert!(root.mutate_struct_member(9, 0, Value::Float(-8.0)));
        assert!(!root.mutate_struct_member(9, 0, Value::Double(-8.0)));
        let mut stats = root.mutable_table(3).unwrap();
        assert!(stats.mutate_field(5, Value::Int(42)));
        assert!(!stats.mutate_field(5, Value::UInt(42)));
        verified.reverify().unwrap();
    }
    let verified = Verifier::new(&schema).verify_buffer(&buf).unwrap();
    let json = flatcheck::reflect::buffer_to_json(&verified);
    assert_eq!(json["level"], 13);
    assert_eq!(json["stats"]["i"], 42);
    assert_eq!(json["path"], serde_json::json!([1, 2, 7]));
    assert_eq!(json["spawn"], serde_json::json!({"x": -8.0, "y": -2.0, "z": 0.25}));
}
