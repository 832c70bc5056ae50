//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides the canonical sample messages so tests, benches and fuzz
//! targets agree on what "a valid buffer" looks like.

#![doc(hidden)]

use serde_json::{json, Value as Json};

use crate::binary::{ScalarType, Value};
use crate::character::{CharacterT, CharacterType};
use crate::reflect::json_to_buffer;
use crate::schema::{ElementType, EnumDef, FieldDef, Schema, StructDef, TableDef};

/// The first demo character: 300 mana, 200 hp, a Player.
pub fn basic_character() -> CharacterT {
    CharacterT {
        mana: 300,
        hp: 200,
        name: Some("UnrealMonster_Basic".to_string()),
        inventory: Some(vec![10, 20, 30, 40, 50]),
        chtype: CharacterType::PLAYER,
    }
}

/// The second demo character: 999 mana, 888 hp, an AI.
pub fn advanced_character() -> CharacterT {
    CharacterT {
        mana: 999,
        hp: 888,
        name: Some("UnrealMonster_Advanced".to_string()),
        inventory: Some(vec![100, 101, 102, 103]),
        chtype: CharacterType::AI,
    }
}

pub fn basic_character_buffer() -> Vec<u8> {
    basic_character()
        .to_buffer()
        .unwrap_or_else(|e| panic!("sample character failed to build: {}", e))
}

pub fn advanced_character_buffer() -> Vec<u8> {
    advanced_character()
        .to_buffer()
        .unwrap_or_else(|e| panic!("sample character failed to build: {}", e))
}

/// A schema exercising every scalar type, enums, a struct, nested tables,
/// vectors of every element kind and a deprecated field.
///
/// ```text
/// enum Class : ubyte { Warrior = 0, Mage = 1, Rogue = 2 }
/// struct Vec3 { x: float; y: float; z: float; }
/// table Stats { flag: bool; b: byte; ub: ubyte; s: short; us: ushort;
///               i: int; ui: uint; l: long; ul: ulong; f: float; d: double; }
/// table Item { name: string; weight: float = 1; }
/// table Hero { name: string; level: short = 1; class: Class; stats: Stats;
///              items: [Item]; tags: [string]; path: [ushort];
///              old: int (deprecated); classes: [Class]; spawn: Vec3; }
/// root_type Hero;
/// ```
pub fn hero_schema() -> Schema {
    let stats = [
        ("flag", ScalarType::Bool),
        ("b", ScalarType::Byte),
        ("ub", ScalarType::UByte),
        ("s", ScalarType::Short),
        ("us", ScalarType::UShort),
        ("i", ScalarType::Int),
        ("ui", ScalarType::UInt),
        ("l", ScalarType::Long),
        ("ul", ScalarType::ULong),
        ("f", ScalarType::Float),
        ("d", ScalarType::Double),
    ]
    .into_iter()
    .fold(TableDef::new("Stats"), |t, (name, ty)| {
        t.with_field(FieldDef::scalar(name, ty))
    });

    Schema::new("Testing.Heroes")
        .with_enum(
            EnumDef::new("Class", ScalarType::UByte)
                .with_value("Warrior", 0)
                .with_value("Mage", 1)
                .with_value("Rogue", 2),
        )
        .with_struct(StructDef::vec3())
        .with_table(stats)
        .with_table(
            TableDef::new("Item")
                .with_field(FieldDef::string("name"))
                .with_field(FieldDef::scalar("weight", ScalarType::Float).with_default(Value::Float(1.0))),
        )
        .with_table(
            TableDef::new("Hero")
                .with_field(FieldDef::string("name"))
                .with_field(FieldDef::scalar("level", ScalarType::Short).with_default(Value::Short(1)))
                .with_field(FieldDef::enumeration("class", 0))
                .with_field(FieldDef::table("stats", 0))
                .with_field(FieldDef::vector("items", ElementType::Table(1)))
                .with_field(FieldDef::vector("tags", ElementType::String))
                .with_field(FieldDef::vector("path", ElementType::Scalar(ScalarType::UShort)))
                .with_field(FieldDef::scalar("old", ScalarType::Int).deprecated())
                .with_field(FieldDef::vector("classes", ElementType::Enum(0)))
                .with_field(FieldDef::structure("spawn", 0)),
        )
        .with_root(2)
}

/// A hero as JSON, exactly as `reflect::to_json` renders it back.
pub fn hero_json() -> Json {
    json!({
        "name": "Aria",
        "level": 12,
        "class": "Mage",
        "stats": {
            "flag": true,
            "b": -5,
            "ub": 200,
            "s": -300,
            "us": 60000,
            "i": -70000,
            "ui": 4_000_000_000u32,
            "l": -9_000_000_000i64,
            "ul": u64::MAX,
            "f": 0.5,
            "d": -1.25e10
        },
        "items": [
            { "name": "staff", "weight": 2.25 },
            { "name": "ring", "weight": 1.0 }
        ],
        "tags": ["caster", "", "elf"],
        "path": [1, 2, 65535],
        "classes": ["Warrior", "Rogue"],
        "spawn": { "x": 1.5, "y": -2.0, "z": 0.25 }
    })
}

pub fn hero_buffer() -> Vec<u8> {
    json_to_buffer(&hero_schema(), &hero_json())
        .unwrap_or_else(|e| panic!("sample hero failed to build: {}", e))
}
