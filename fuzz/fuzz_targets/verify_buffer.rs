// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Verifier under adversarial input.
//!
//! Offsets that point backwards, vtables that overlap their own table,
//! strings without a terminator, vectors whose count runs off the end. The
//! verifier has to reject all of it without panicking, and anything it
//! accepts has to be readable in full.

#![no_main]

use flatcheck::reflect::buffer_to_json;
use flatcheck::testing::hero_schema;
use flatcheck::{character_schema, root_as_character, Verifier};
use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;

static HERO: OnceLock<flatcheck::Schema> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    // Typed path: an accepted buffer must read back without panics.
    if let Ok(character) = root_as_character(data) {
        let _ = character.mana();
        let _ = character.hp();
        let _ = character.chtype();
        if let Some(name) = character.name() {
            assert!(name.len() < data.len());
        }
        if let Some(inventory) = character.inventory() {
            assert!(inventory.len() < data.len());
            for item in inventory.iter() {
                let _ = item;
            }
        }
        let _ = character.unpack();
    }

    // Reflective path over both schemas, nested tables included.
    let hero = HERO.get_or_init(hero_schema);
    for schema in [character_schema(), hero] {
        if let Ok(buffer) = Verifier::new(schema).verify_buffer(data) {
            let _ = buffer_to_json(&buffer);
        }
    }

    // Same bytes, same verdict.
    assert_eq!(
        flatcheck::verify(data, character_schema()),
        flatcheck::verify_character_buffer(data)
    );
});
