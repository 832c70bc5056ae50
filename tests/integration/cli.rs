//! End-to-end runs of the `flatcheck` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use flatcheck::testing::basic_character_buffer;
use flatcheck::{root_as_character, CharacterType};
use tempfile::TempDir;

use crate::common::CHARACTER_SCHEMA_JSON;

fn flatcheck(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flatcheck"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run flatcheck")
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

fn path_str(p: &Path) -> &str {
    p.to_str().expect("utf-8 temp path")
}

#[test]
fn test_build_then_verify_then_inspect() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("hero.json");
    let output = dir.path().join("hero.bin");
    fs::write(
        &input,
        r#"{"mana": 300, "hp": 200, "name": "UnrealMonster_Basic",
            "inventory": [10, 20, 30, 40, 50], "chtype": "Player"}"#,
    )
    .unwrap();

    let out = flatcheck(&["build", path_str(&input), "-o", path_str(&output)]);
    assert!(out.status.success(), "{}", stderr(&out));
    let built = fs::read(&output).unwrap();
    assert_eq!(
        root_as_character(&built).unwrap().unpack(),
        flatcheck::testing::basic_character()
    );

    let out = flatcheck(&["verify", path_str(&output)]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("valid"));

    let out = flatcheck(&["inspect", path_str(&output), "--json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["chtype"], "Player");
    assert_eq!(json["inventory"][4], 50);

    let out = flatcheck(&["inspect", path_str(&output), "--hex"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("FCheckFlatBuffer"));
    assert!(text.contains("UnrealMonster_Basic"));
}

#[test]
fn test_verify_rejects_corrupt_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("bad.bin");
    let mut bytes = basic_character_buffer();
    bytes.truncate(bytes.len() - 1);
    fs::write(&file, &bytes).unwrap();

    let out = flatcheck(&["verify", path_str(&file)]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("failed verification"));
}

#[test]
fn test_mutate_in_place() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("c.bin");
    fs::write(&file, basic_character_buffer()).unwrap();

    let out = flatcheck(&["mutate", path_str(&file), "hp=1234", "chtype=AI", "inventory[1]=99"]);
    assert!(out.status.success(), "{}", stderr(&out));

    let bytes = fs::read(&file).unwrap();
    let c = root_as_character(&bytes).unwrap();
    assert_eq!(c.hp(), 1234);
    assert_eq!(c.chtype(), CharacterType::AI);
    assert_eq!(c.inventory().unwrap().bytes(), &[10, 99, 30, 40, 50]);
}

#[test]
fn test_mutate_failure_leaves_file_alone() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("c.bin");
    let original = flatcheck::CharacterT::default().to_buffer().unwrap();
    fs::write(&file, &original).unwrap();

    // mana was omitted (default), so it has no bytes to overwrite.
    let out = flatcheck(&["mutate", path_str(&file), "mana=1"]);
    assert!(!out.status.success());
    assert_eq!(fs::read(&file).unwrap(), original);

    let out = flatcheck(&["mutate", path_str(&file), "name=x"]);
    assert!(!out.status.success());
}

#[test]
fn test_schema_from_json_file() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("schema.json");
    fs::write(&schema, CHARACTER_SCHEMA_JSON).unwrap();

    let out = flatcheck(&["schema", "--schema", path_str(&schema)]);
    assert!(out.status.success(), "{}", stderr(&out));
    let builtin = flatcheck(&["schema"]);
    assert_eq!(stdout(&out), stdout(&builtin));
    assert!(stdout(&out).contains("root_type FCheckFlatBuffer;"));
}

#[test]
fn test_identifier_flags() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("c.json");
    let output = dir.path().join("c.bin");
    fs::write(&input, r#"{"hp": 5}"#).unwrap();

    let out = flatcheck(&["build", path_str(&input), "-o", path_str(&output), "--identifier", "FCHK"]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(flatcheck(&["verify", path_str(&output), "--identifier", "FCHK"]).status.success());
    assert!(!flatcheck(&["verify", path_str(&output), "--identifier", "XXXX"]).status.success());
    assert!(!flatcheck(&["verify", path_str(&output), "--identifier", "TOOLONG"]).status.success());
}

#[test]
fn test_demo_writes_buffers() {
    let dir = TempDir::new().unwrap();
    let out = flatcheck(&["demo", "--out-dir", path_str(dir.path())]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("UnrealMonster_Advanced"));
    assert!(text.contains("1234"));

    let basic = fs::read(dir.path().join("basic.bin")).unwrap();
    let c = root_as_character(&basic).unwrap();
    assert_eq!(c.inventory().unwrap().get(1), Some(99));
    assert_eq!((c.mana(), c.hp()), (123, 456));
    assert_eq!(c.name(), Some("UnrealMonster_Basic"));
}

#[test]
fn test_struct_fields_build_and_mutate() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("actor.json");
    let input = dir.path().join("actor_in.json");
    let output = dir.path().join("actor.bin");
    fs::write(
        &schema,
        r#"{ "namespace": "World", "tables": [{ "name": "Actor", "fields": [
            { "name": "Name", "type": "string" },
            { "name": "Location", "type": "Vec3" }
        ] }] }"#,
    )
    .unwrap();
    fs::write(&input, r#"{"name": "crate", "location": {"x": 1, "y": 2, "z": 3}}"#).unwrap();
    let schema_arg = path_str(&schema);

    let out = flatcheck(&["schema", "--schema", schema_arg]);
    assert!(out.status.success(), "{}", stderr(&out));
    assert!(stdout(&out).contains("struct Vec3 {\n  x: float;"));

    let out = flatcheck(&["build", path_str(&input), "-o", path_str(&output), "--schema", schema_arg]);
    assert!(out.status.success(), "{}", stderr(&out));
    let out = flatcheck(&["mutate", path_str(&output), "location.y=-7.5", "--schema", schema_arg]);
    assert!(out.status.success(), "{}", stderr(&out));
    let out = flatcheck(&["mutate", path_str(&output), "location.w=1", "--schema", schema_arg]);
    assert!(!out.status.success());

    let out = flatcheck(&["inspect", path_str(&output), "--json", "--schema", schema_arg]);
    assert!(out.status.success(), "{}", stderr(&out));
    let json: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(json["location"], serde_json::json!({"x": 1.0, "y": -7.5, "z": 3.0}));
}
