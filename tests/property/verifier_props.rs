//! The verifier against truncated, corrupted and random bytes.

use proptest::prelude::*;

use super::codec_props::character_strategy;
use crate::common::pack;
use flatcheck::testing::{hero_buffer, hero_schema};
use flatcheck::{reflect, root_as_character, verify, verify_character_buffer, Verifier};

/// Read everything reachable; any panic here is a verifier hole.
fn read_all(buf: &[u8]) {
    if let Ok(c) = root_as_character(buf) {
        let _ = c.unpack();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Property: arbitrary bytes never panic the verifier or the accessors.
    #[test]
    fn prop_random_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = verify_character_buffer(&bytes);
        read_all(&bytes);
        let schema = hero_schema();
        if let Ok(v) = Verifier::new(&schema).verify_buffer(&bytes) {
            let _ = reflect::buffer_to_json(&v);
        }
    }

    /// Property: no proper prefix of a valid buffer verifies.
    #[test]
    fn prop_truncation_rejected(original in character_strategy(), cut in any::<prop::sample::Index>()) {
        let buf = pack(&original);
        let len = cut.index(buf.len());
        prop_assert!(!verify_character_buffer(&buf[..len]));
    }

    /// Property: flipping any byte either still verifies or is rejected;
    /// a verified result is always safe to read.
    #[test]
    fn prop_single_byte_corruption_is_safe(
        original in character_strategy(),
        at in any::<prop::sample::Index>(),
        xor in 1u8..=255,
    ) {
        let mut buf = pack(&original);
        let i = at.index(buf.len());
        buf[i] ^= xor;
        read_all(&buf);
    }

    /// Property: a root offset past the end is always rejected.
    #[test]
    fn prop_root_offset_past_end_rejected(original in character_strategy(), extra in 0u32..1_000_000) {
        let mut buf = pack(&original);
        let root = buf.len() as u32 + extra;
        buf[..4].copy_from_slice(&root.to_le_bytes());
        prop_assert!(!verify_character_buffer(&buf));
    }

    /// Property: corrupting the nested hero buffer is safe to read back as JSON.
    #[test]
    fn prop_nested_corruption_is_safe(at in any::<prop::sample::Index>(), xor in 1u8..=255) {
        let schema = hero_schema();
        let mut buf = hero_buffer();
        let i = at.index(buf.len());
        buf[i] ^= xor;
        if verify(&buf, &schema) {
            let v = Verifier::new(&schema).verify_buffer(&buf).unwrap();
            let _ = reflect::buffer_to_json(&v);
        }
    }
}
