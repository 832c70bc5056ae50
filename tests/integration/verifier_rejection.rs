//! Malformed buffers the verifier must turn away.

use flatcheck::testing::{basic_character_buffer, hero_buffer, hero_schema};
use flatcheck::{
    character_schema, root_as_character, verify, verify_character_buffer, Builder, CharacterT,
    Verifier, VerifierOptions, VerifyError,
};

const NAME: &[u8] = b"UnrealMonster_Basic";

fn find(buf: &[u8], needle: &[u8]) -> usize {
    buf.windows(needle.len())
        .position(|w| w == needle)
        .expect("needle present")
}

fn check(buf: &[u8]) -> Result<(), VerifyError> {
    Verifier::new(character_schema()).verify_root(buf).map(|_| ())
}

#[test]
fn test_every_truncation_is_rejected() {
    let buf = basic_character_buffer();
    assert!(verify_character_buffer(&buf));
    for len in 0..buf.len() {
        assert!(!verify_character_buffer(&buf[..len]), "prefix of {} bytes accepted", len);
    }
}

#[test]
fn test_every_hero_truncation_is_rejected() {
    let schema = hero_schema();
    let buf = hero_buffer();
    assert!(verify(&buf, &schema));
    for len in 0..buf.len() {
        assert!(!verify(&buf[..len], &schema), "prefix of {} bytes accepted", len);
    }
}

#[test]
fn test_short_buffers_report_size() {
    assert!(matches!(check(&[]), Err(VerifyError::BufferTooSmall { .. })));
    assert!(matches!(check(&[4, 0, 0]), Err(VerifyError::BufferTooSmall { .. })));
}

#[test]
fn test_corrupted_root_offset_is_rejected() {
    let good = basic_character_buffer();
    for root in [good.len() as u32, u32::MAX, 0x7fff_fff0, 2] {
        let mut buf = good.clone();
        buf[..4].copy_from_slice(&root.to_le_bytes());
        assert!(check(&buf).is_err(), "root offset {} accepted", root);
        assert!(root_as_character(&buf).is_err());
    }
}

#[test]
fn test_missing_string_terminator_is_rejected() {
    let mut buf = basic_character_buffer();
    let at = find(&buf, NAME);
    buf[at + NAME.len()] = b'!';
    assert!(matches!(check(&buf), Err(VerifyError::MissingTerminator { .. })));
}

#[test]
fn test_invalid_utf8_is_rejected() {
    let mut buf = basic_character_buffer();
    let at = find(&buf, NAME);
    buf[at] = 0xff;
    assert!(matches!(check(&buf), Err(VerifyError::InvalidUtf8 { .. })));
}

#[test]
fn test_overlong_string_length_is_rejected() {
    let mut buf = basic_character_buffer();
    let at = find(&buf, NAME) - 4;
    buf[at..at + 4].copy_from_slice(&1000u32.to_le_bytes());
    assert!(check(&buf).is_err());
}

#[test]
fn test_overlong_vector_length_is_rejected() {
    let mut buf = basic_character_buffer();
    let at = find(&buf, &[5, 0, 0, 0, 10, 20, 30, 40, 50]);
    buf[at..at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
    assert!(check(&buf).is_err());
}

#[test]
fn test_vtable_pointing_outside_buffer_is_rejected() {
    let mut buf = basic_character_buffer();
    let root = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
    buf[root..root + 4].copy_from_slice(&(-4000i32).to_le_bytes());
    assert!(check(&buf).is_err());
}

#[test]
fn test_field_outside_table_is_rejected() {
    let mut buf = basic_character_buffer();
    let root = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
    let soffset = i32::from_le_bytes(buf[root..root + 4].try_into().unwrap());
    let vtable = (root as i64 - i64::from(soffset)) as usize;
    // mana's voffset past the table's inline size
    buf[vtable + 4..vtable + 6].copy_from_slice(&200u16.to_le_bytes());
    assert!(matches!(check(&buf), Err(VerifyError::FieldOutOfTable { .. })));
}

#[test]
fn test_identifier_must_match_when_required() {
    let mut builder = Builder::new();
    let root = CharacterT::default().pack(&mut builder).unwrap();
    let buf = builder.finish_with_identifier(root, *b"FCHK").unwrap().into_vec();

    assert!(Verifier::new(character_schema())
        .with_identifier(*b"FCHK")
        .verify_root(&buf)
        .is_ok());
    assert!(matches!(
        Verifier::new(character_schema())
            .with_identifier(*b"NOPE")
            .verify_root(&buf),
        Err(VerifyError::IdentifierMismatch { .. })
    ));
    // Without an expectation the identifier is just ignored.
    assert!(verify_character_buffer(&buf));
}

#[test]
fn test_size_limit_is_enforced() {
    let buf = basic_character_buffer();
    let options = VerifierOptions {
        max_buffer_size: buf.len() - 1,
        ..VerifierOptions::default()
    };
    assert!(matches!(
        Verifier::new(character_schema()).with_options(options).verify_root(&buf),
        Err(VerifyError::BufferTooLarge { .. })
    ));
}

#[test]
fn test_depth_limit_applies_to_nested_tables() {
    let schema = hero_schema();
    let buf = hero_buffer();
    let shallow = VerifierOptions {
        max_depth: 1,
        ..VerifierOptions::default()
    };
    assert!(matches!(
        Verifier::new(&schema).with_options(shallow).verify_root(&buf),
        Err(VerifyError::DepthLimit { max: 1 })
    ));
    let enough = VerifierOptions {
        max_depth: 2,
        ..VerifierOptions::default()
    };
    assert!(Verifier::new(&schema).with_options(enough).verify_root(&buf).is_ok());
}

#[test]
fn test_errors_render_readably() {
    let err = check(&[]).unwrap_err();
    assert!(err.to_string().contains("shorter"));
}
