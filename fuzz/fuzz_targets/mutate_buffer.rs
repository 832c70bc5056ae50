// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-place mutation of verified buffers.
//!
//! A mutation only ever overwrites fixed-width bytes that are already there,
//! so whatever sequence the fuzzer picks, the buffer must still verify and
//! its layout (name, inventory length) must not move.

#![no_main]

use arbitrary::Arbitrary;
use flatcheck::testing::{advanced_character_buffer, basic_character_buffer};
use flatcheck::{root_as_character_mut, CharacterType};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Mutation {
    Mana(i32),
    Hp(i32),
    Chtype(i8),
    Inventory { index: u8, value: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    advanced: bool,
    mutations: Vec<Mutation>,
}

fuzz_target!(|input: Input| {
    let mut bytes = if input.advanced {
        advanced_character_buffer()
    } else {
        basic_character_buffer()
    };
    let Ok(mut character) = root_as_character_mut(&mut bytes) else {
        panic!("fixture buffer failed verification");
    };
    let name = character.as_character().name().map(str::to_owned);
    let inventory_len = character.as_character().inventory().map(|v| v.len());

    for mutation in &input.mutations {
        match *mutation {
            Mutation::Mana(mana) => {
                character.mutate_mana(mana);
            }
            Mutation::Hp(hp) => {
                character.mutate_hp(hp);
            }
            Mutation::Chtype(raw) => {
                character.mutate_chtype(CharacterType(raw));
            }
            Mutation::Inventory { index, value } => {
                if let Some(mut inventory) = character.mutable_inventory() {
                    let accepted = inventory.mutate(index as usize, value);
                    assert_eq!(accepted, (index as usize) < inventory.len());
                }
            }
        }
    }

    assert!(character.reverify().is_ok());
    let view = character.as_character();
    assert_eq!(view.name().map(str::to_owned), name);
    assert_eq!(view.inventory().map(|v| v.len()), inventory_len);
});
