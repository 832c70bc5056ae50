//! Build/read properties.

use proptest::prelude::*;

use crate::common::pack;
use flatcheck::reflect::{buffer_to_json, json_to_buffer};
use flatcheck::{character_schema, root_as_character, CharacterT, CharacterType, Verifier};

pub fn character_strategy() -> impl Strategy<Value = CharacterT> {
    (
        any::<i32>(),
        any::<i32>(),
        prop::option::of(".{0,40}"),
        prop::option::of(prop::collection::vec(any::<u8>(), 0..64)),
        any::<i8>(),
    )
        .prop_map(|(mana, hp, name, inventory, chtype)| CharacterT {
            mana,
            hp,
            name,
            inventory,
            chtype: CharacterType(chtype),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: every field reads back exactly as it was written.
    #[test]
    fn prop_character_round_trip(original in character_strategy()) {
        let buf = pack(&original);
        let read = root_as_character(&buf).unwrap().unpack();
        prop_assert_eq!(read, original);
    }

    /// Property: the root offset and every table are 4-byte aligned.
    #[test]
    fn prop_root_is_aligned(original in character_strategy()) {
        let buf = pack(&original);
        let root = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        prop_assert_eq!(root % 4, 0);
        prop_assert!((root as usize) < buf.len());
    }

    /// Property: scalars equal to their default take no space.
    #[test]
    fn prop_defaults_are_omitted(mana in any::<i32>().prop_filter("not default", |m| *m != 150)) {
        let explicit = pack(&CharacterT { mana, ..CharacterT::default() });
        let default = pack(&CharacterT::default());
        prop_assert!(default.len() < explicit.len());
        prop_assert_eq!(root_as_character(&default).unwrap().mana(), 150);
    }

    /// Property: JSON in, buffer, JSON out gives the same character.
    #[test]
    fn prop_json_round_trip(original in character_strategy()) {
        let json = serde_json::to_value(&original).unwrap();
        let buf = json_to_buffer(character_schema(), &json).unwrap();
        prop_assert_eq!(root_as_character(&buf).unwrap().unpack(), original.clone());

        let verified = Verifier::new(character_schema()).verify_buffer(&buf).unwrap();
        let back = buffer_to_json(&verified);
        prop_assert_eq!(back["mana"].as_i64(), Some(i64::from(original.mana)));
        prop_assert_eq!(back["hp"].as_i64(), Some(i64::from(original.hp)));
    }
}
