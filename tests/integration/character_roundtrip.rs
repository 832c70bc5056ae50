//! Build, verify and read back the character message.

use crate::common::{build_character, pack};
use flatcheck::testing::{advanced_character, basic_character};
use flatcheck::{
    root_as_character, verify_character_buffer, Builder, CharacterArgs, CharacterT,
    CharacterType, Schema,
};

#[test]
fn test_basic_character_reads_back() {
    let buf = build_character(
        300,
        200,
        Some("UnrealMonster_Basic"),
        Some(&[10, 20, 30, 40, 50]),
        CharacterType::PLAYER,
    );
    assert!(verify_character_buffer(&buf));

    let c = root_as_character(&buf).unwrap();
    assert_eq!(c.mana(), 300);
    assert_eq!(c.hp(), 200);
    assert_eq!(c.name(), Some("UnrealMonster_Basic"));
    assert_eq!(c.inventory().unwrap().bytes(), &[10, 20, 30, 40, 50]);
    assert_eq!(c.chtype(), CharacterType::PLAYER);
}

#[test]
fn test_low_level_and_object_api_agree() {
    let low = build_character(
        999,
        888,
        Some("UnrealMonster_Advanced"),
        Some(&[100, 101, 102, 103]),
        CharacterType::AI,
    );
    let high = pack(&advanced_character());
    assert_eq!(low, high);
}

#[test]
fn test_unpack_returns_what_was_packed() {
    for original in [basic_character(), advanced_character(), CharacterT::default()] {
        let buf = pack(&original);
        assert_eq!(root_as_character(&buf).unwrap().unpack(), original);
    }
}

#[test]
fn test_empty_name_and_inventory_are_present_not_absent() {
    let buf = build_character(1, 2, Some(""), Some(&[]), CharacterType::HIDDEN);
    let c = root_as_character(&buf).unwrap();
    assert_eq!(c.name(), Some(""));
    assert!(c.inventory().unwrap().is_empty());
}

#[test]
fn test_absent_fields_report_defaults() {
    let mut builder = Builder::new();
    let root = flatcheck::create_character(&mut builder, &CharacterArgs::default()).unwrap();
    let buf = builder.finish(root).unwrap().into_vec();
    let c = root_as_character(&buf).unwrap();
    assert_eq!((c.mana(), c.hp()), (150, 100));
    assert_eq!(c.name(), None);
    assert!(c.inventory().is_none());
    assert_eq!(c.chtype(), CharacterType::USE_DEFAULT);
}

#[test]
fn test_defaults_are_not_stored() {
    let with_defaults = build_character(150, 100, None, None, CharacterType::USE_DEFAULT);
    let with_values = build_character(151, 101, None, None, CharacterType::AI);
    assert!(with_defaults.len() < with_values.len());
}

#[test]
fn test_unknown_enum_value_reads_back_raw() {
    let buf = build_character(1, 1, None, None, CharacterType(42));
    let c = root_as_character(&buf).unwrap();
    assert_eq!(c.chtype(), CharacterType(42));
    assert_eq!(c.chtype().variant_name(), None);
}

#[test]
fn test_wire_layout_matches_reference() {
    // {mana: 300, inventory: [7]}: root offset, 12-byte vtable, table, vector.
    let buf = build_character(300, 100, None, Some(&[7]), CharacterType::USE_DEFAULT);
    let root = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
    let soffset = i32::from_le_bytes(buf[root..root + 4].try_into().unwrap());
    let vtable = (root as i64 - soffset as i64) as usize;
    let vt = |i: usize| u16::from_le_bytes([buf[vtable + 2 * i], buf[vtable + 2 * i + 1]]);

    assert_eq!(vt(0), 12, "vtable covers slots up to inventory");
    assert_eq!(vt(1), 12, "soffset + mana + inventory offset");
    assert_eq!(vt(2), 4, "mana right after the soffset");
    assert_eq!(vt(3), 0, "hp is default");
    assert_eq!(vt(4), 0, "no name");
    assert_eq!(vt(5), 8, "inventory offset after mana");
    assert_eq!(
        i32::from_le_bytes(buf[root + 4..root + 8].try_into().unwrap()),
        300
    );
    let inv_holder = root + 8;
    let inv = inv_holder + u32::from_le_bytes(buf[inv_holder..inv_holder + 4].try_into().unwrap()) as usize;
    assert_eq!(&buf[inv..inv + 5], &[1, 0, 0, 0, 7]);
    assert_eq!(buf.len(), inv + 5, "no trailing padding");
}

#[test]
fn test_character_schema_matches_json_description() {
    let loaded = Schema::from_json(crate::common::CHARACTER_SCHEMA_JSON).unwrap();
    assert_eq!(&loaded, flatcheck::character_schema());
}

#[test]
fn test_fbs_export() {
    let fbs = flatcheck::character_schema().to_fbs();
    assert!(fbs.starts_with("namespace TestingFlatBuffers.FCheckFlatBuffer;"));
    assert!(fbs.contains("attribute \"priority\";"));
    assert!(fbs.contains("enum ECharacterType : byte { UseDefault = 0, Player = 1, AI = 2, Hidden = 3 }"));
    assert!(fbs.contains("  mana: int = 150;"));
    assert!(fbs.contains("  inventory: [ubyte];"));
    assert!(fbs.ends_with("root_type FCheckFlatBuffer;"));
}
