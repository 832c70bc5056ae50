//! Shared test helpers.

#![allow(dead_code)]

use flatcheck::{
    create_character, finish_character_buffer, Builder, CharacterArgs, CharacterT, CharacterType,
};

/// Build a character buffer through the low-level API (not the object API).
pub fn build_character(
    mana: i32,
    hp: i32,
    name: Option<&str>,
    inventory: Option<&[u8]>,
    chtype: CharacterType,
) -> Vec<u8> {
    let mut builder = Builder::new();
    let name = name.map(|n| builder.create_string(n).unwrap());
    let inventory = inventory.map(|inv| builder.create_vector(inv).unwrap());
    let root = create_character(
        &mut builder,
        &CharacterArgs {
            mana,
            hp,
            name,
            inventory,
            chtype,
        },
    )
    .unwrap();
    finish_character_buffer(builder, root).unwrap().into_vec()
}

pub fn pack(character: &CharacterT) -> Vec<u8> {
    character.to_buffer().unwrap()
}

/// The character schema as a JSON description, for `--schema` tests.
pub const CHARACTER_SCHEMA_JSON: &str = r#"{
  "namespace": "TestingFlatBuffers.FCheckFlatBuffer",
  "attributes": ["priority"],
  "enums": [
    {
      "name": "ECharacterType",
      "underlying": "byte",
      "values": [
        { "name": "UseDefault" },
        { "name": "Player" },
        { "name": "AI" },
        { "name": "Hidden" }
      ]
    }
  ],
  "tables": [
    {
      "name": "FCheckFlatBuffer",
      "fields": [
        { "name": "mana", "type": "int", "default": 150 },
        { "name": "hp", "type": "int", "default": 100 },
        { "name": "name", "type": "string" },
        { "name": "inventory", "type": "[ubyte]" },
        { "name": "chtype", "type": "ECharacterType" }
      ]
    }
  ],
  "root_type": "FCheckFlatBuffer"
}"#;
