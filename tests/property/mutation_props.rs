//! In-place mutation properties.

use proptest::prelude::*;

use super::codec_props::character_strategy;
use crate::common::pack;
use flatcheck::{root_as_character, root_as_character_mut, CharacterT};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Property: mutating a present field changes exactly that field.
    #[test]
    fn prop_hp_mutation_is_isolated(
        original in character_strategy().prop_filter("hp stored", |c| c.hp != 100),
        hp in any::<i32>(),
    ) {
        let mut buf = pack(&original);
        let len = buf.len();
        {
            let mut c = root_as_character_mut(&mut buf).unwrap();
            prop_assert!(c.mutate_hp(hp));
            prop_assert!(c.reverify().is_ok());
        }
        prop_assert_eq!(buf.len(), len);
        let read = root_as_character(&buf).unwrap().unpack();
        prop_assert_eq!(read, CharacterT { hp, ..original });
    }

    /// Property: element writes stay inside the vector; out-of-range ones fail.
    #[test]
    fn prop_inventory_mutation_bounds(
        inventory in prop::collection::vec(any::<u8>(), 1..32),
        index in 0usize..40,
        value in any::<u8>(),
    ) {
        let original = CharacterT { inventory: Some(inventory.clone()), ..CharacterT::default() };
        let mut buf = pack(&original);
        let before = buf.clone();
        let ok = {
            let mut c = root_as_character_mut(&mut buf).unwrap();
            let mut v = c.mutable_inventory().unwrap();
            v.mutate(index, value)
        };
        prop_assert_eq!(ok, index < inventory.len());
        if ok {
            let mut expected = inventory;
            expected[index] = value;
            let read = root_as_character(&buf).unwrap();
            prop_assert_eq!(read.inventory().unwrap().bytes(), &expected[..]);
        } else {
            prop_assert_eq!(buf, before);
        }
    }

    /// Property: absent (defaulted) fields can never be mutated.
    #[test]
    fn prop_defaulted_fields_reject_mutation(mana in any::<i32>()) {
        let mut buf = pack(&CharacterT::default());
        let before = buf.clone();
        {
            let mut c = root_as_character_mut(&mut buf).unwrap();
            prop_assert!(!c.mutate_mana(mana));
            prop_assert!(c.mutable_inventory().is_none());
        }
        prop_assert_eq!(buf, before);
    }
}
