// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use flatcheck::reflect::{self, buffer_to_json, parse_scalar};
use flatcheck::{
    character_schema, field_index_to_voffset, root_as_character, root_as_character_mut,
    vtable_position, BufferHeader, Builder, CharacterT, CharacterType, ElementType, FieldType,
    Schema, Verifier, VerifierOptions, FILE_IDENTIFIER_LENGTH,
};

mod cli;
use cli::display::{self, format_size, hex_line, kv, row, section_bot, section_mid, section_top};
use cli::{Cli, Commands, SchemaArgs, VerifyArgs};

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Build {
            input,
            output,
            identifier,
            force_defaults,
            schema,
        } => run_build(&input, &output, identifier.as_deref(), force_defaults, &schema),
        Commands::Inspect {
            file,
            json,
            hex,
            schema,
            verify,
        } => run_inspect(&file, json, hex, &schema, &verify),
        Commands::Verify {
            file,
            schema,
            verify,
        } => run_verify(&file, &schema, &verify),
        Commands::Mutate {
            file,
            assignments,
            output,
            schema,
            verify,
        } => run_mutate(&file, &assignments, output.as_deref(), &schema, &verify),
        Commands::Schema { schema } => {
            let schema = load_schema(&schema)?;
            println!("{}", schema.to_fbs());
            Ok(())
        }
        Commands::Demo { out_dir } => run_demo(out_dir.as_deref()),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SHARED SETUP
// ═══════════════════════════════════════════════════════════════════════════

fn load_schema(args: &SchemaArgs) -> Result<Cow<'static, Schema>> {
    match &args.schema {
        None => Ok(Cow::Borrowed(character_schema())),
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading schema {}", path.display()))?;
            let schema = Schema::from_json(&text)
                .with_context(|| format!("loading schema {}", path.display()))?;
            Ok(Cow::Owned(schema))
        }
    }
}

fn parse_identifier(text: &str) -> Result<[u8; FILE_IDENTIFIER_LENGTH]> {
    text.as_bytes().try_into().map_err(|_| {
        anyhow!(
            "file identifier must be exactly {} bytes, got {:?}",
            FILE_IDENTIFIER_LENGTH,
            text
        )
    })
}

fn make_verifier<'s>(schema: &'s Schema, args: &VerifyArgs) -> Result<Verifier<'s>> {
    let options = VerifierOptions {
        max_depth: args.max_depth,
        max_tables: args.max_tables,
        check_alignment: !args.no_align,
        ..VerifierOptions::default()
    };
    let mut verifier = Verifier::new(schema).with_options(options);
    if let Some(id) = &args.identifier {
        verifier = verifier.with_identifier(parse_identifier(id)?);
    }
    Ok(verifier)
}

fn read_buffer(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

// ═══════════════════════════════════════════════════════════════════════════
// COMMANDS
// ═══════════════════════════════════════════════════════════════════════════

fn run_build(
    input: &str,
    output: &Path,
    identifier: Option<&str>,
    force_defaults: bool,
    schema_args: &SchemaArgs,
) -> Result<()> {
    let schema = load_schema(schema_args)?;
    let text = if input == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("reading stdin")?;
        raw
    } else {
        fs::read_to_string(input).with_context(|| format!("reading {}", input))?
    };
    let json: serde_json::Value = serde_json::from_str(&text).context("parsing JSON input")?;
    let root_id = schema
        .root_table()
        .ok_or_else(|| anyhow!("schema has no tables"))?;

    let mut builder = Builder::new();
    builder.force_defaults(force_defaults);
    let root = reflect::from_json(&mut builder, &schema, root_id, &json)?;
    let finished = match identifier {
        Some(id) => builder.finish_with_identifier(root, parse_identifier(id)?)?,
        None => builder.finish(root)?,
    };
    fs::write(output, finished.data()).with_context(|| format!("writing {}", output.display()))?;
    println!(
        "✓ wrote {} ({})",
        output.display(),
        format_size(finished.len())
    );
    Ok(())
}

fn run_verify(file: &Path, schema_args: &SchemaArgs, verify_args: &VerifyArgs) -> Result<()> {
    let schema = load_schema(schema_args)?;
    let bytes = read_buffer(file)?;
    let verifier = make_verifier(&schema, verify_args)?;
    let root = verifier
        .verify_root(&bytes)
        .with_context(|| format!("{} failed verification", file.display()))?;
    let table = schema.table(root.table()).map_or("?", |t| t.name.as_str());
    println!(
        "{} {}: {} root, {}, crc32 {:08x}",
        display::verdict(true),
        file.display(),
        table,
        format_size(bytes.len()),
        crc32fast::hash(&bytes)
    );
    Ok(())
}

fn run_inspect(
    file: &Path,
    json: bool,
    hex: bool,
    schema_args: &SchemaArgs,
    verify_args: &VerifyArgs,
) -> Result<()> {
    let schema = load_schema(schema_args)?;
    let bytes = read_buffer(file)?;
    let verified = make_verifier(&schema, verify_args)?
        .verify_buffer(&bytes)
        .with_context(|| format!("{} failed verification", file.display()))?;

    let contents = buffer_to_json(&verified);
    if json {
        println!("{}", serde_json::to_string_pretty(&contents)?);
        return Ok(());
    }

    let handle = verified.root_handle();
    let root = verified.root();
    let def = schema
        .table(handle.table())
        .ok_or_else(|| anyhow!("root table missing from schema"))?;

    section_top("BUFFER");
    kv("file", &file.display().to_string());
    kv("size", &format_size(bytes.len()));
    kv("crc32", &format!("{:08x}", crc32fast::hash(&bytes)));
    if let Some(header) = BufferHeader::read(&bytes) {
        kv("root offset", &header.root_offset.to_string());
        if let Some(id) = header.identifier.filter(|id| id.iter().all(u8::is_ascii_graphic)) {
            kv("identifier?", &String::from_utf8_lossy(&id));
        }
    }
    kv("root table", &format!("{} @ {}", def.name, handle.position()));
    if let Some(vtable) = vtable_position(&bytes, handle.position()) {
        kv("vtable", &format!("@ {}", vtable));
    }

    section_mid(&format!("FIELDS ({})", def.name));
    for (id, field) in def.fields.iter().enumerate() {
        let slot = field_index_to_voffset(id) as u16;
        let type_name = display::type_badge(&schema.type_name(field.ty));
        let value = if field.deprecated {
            "deprecated".to_string()
        } else {
            contents
                .get(&field.name)
                .map_or_else(|| "absent".to_string(), |v| v.to_string())
        };
        let marker = if root.is_present(slot) || !field.ty.is_fixed_width() {
            String::new()
        } else {
            display::default_marker()
        };
        row(&format!(
            "{} {} {} {}",
            display::pad_right(&field.name, 14),
            display::pad_right(&type_name, 16),
            value,
            marker
        ));
    }

    if hex {
        section_mid("HEX");
        for (i, chunk) in bytes.chunks(display::HEX_ROW).enumerate() {
            row(&hex_line(i * display::HEX_ROW, chunk));
        }
    }
    section_bot();
    Ok(())
}

/// `field=value`, `field[index]=value` or `field.member=value`.
struct Assignment<'a> {
    field: &'a str,
    index: Option<usize>,
    member: Option<&'a str>,
    value: &'a str,
}

fn parse_assignment(text: &str) -> Result<Assignment<'_>> {
    let (lhs, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected FIELD=VALUE, got {:?}", text))?;
    let lhs = lhs.trim();
    let (lhs, member) = match lhs.split_once('.') {
        Some((field, member)) => (field, Some(member.trim())),
        None => (lhs, None),
    };
    let (field, index) = match lhs.split_once('[') {
        Some((field, rest)) => {
            let index = rest
                .strip_suffix(']')
                .and_then(|i| i.trim().parse().ok())
                .ok_or_else(|| anyhow!("bad index in {:?}", text))?;
            (field.trim(), Some(index))
        }
        None => (lhs, None),
    };
    Ok(Assignment {
        field,
        index,
        member,
        value: value.trim(),
    })
}

fn run_mutate(
    file: &Path,
    assignments: &[String],
    output: Option<&Path>,
    schema_args: &SchemaArgs,
    verify_args: &VerifyArgs,
) -> Result<()> {
    let schema = load_schema(schema_args)?;
    let mut bytes = read_buffer(file)?;
    let verifier = make_verifier(&schema, verify_args)?;
    let mut buf = verifier
        .verify_buffer_mut(&mut bytes)
        .with_context(|| format!("{} failed verification", file.display()))?;
    let table_id = buf.root_handle().table();
    let def = schema
        .table(table_id)
        .ok_or_else(|| anyhow!("root table missing from schema"))?;

    for text in assignments {
        let a = parse_assignment(text)?;
        let id = def
            .field_id(a.field)
            .ok_or_else(|| anyhow!("table '{}' has no field '{}'", def.name, a.field))?;
        let ty = def.fields[id].ty;
        let changed = match (a.index, a.member, ty) {
            (None, Some(member), FieldType::Struct(sid)) => {
                let layout = schema
                    .struct_def(sid)
                    .ok_or_else(|| anyhow!("struct of '{}' missing from schema", a.field))?;
                let member_id = layout
                    .field_id(member)
                    .ok_or_else(|| anyhow!("struct '{}' has no member '{}'", layout.name, member))?;
                let member_ty = FieldType::Scalar(layout.fields[member_id].ty);
                let value = parse_scalar(&schema, member_ty, a.value).ok_or_else(|| {
                    anyhow!("{:?} is not a valid {}", a.value, schema.type_name(member_ty))
                })?;
                buf.root_mut().mutate_struct_member(id, member_id, value)
            }
            (_, Some(_), _) => bail!("'{}' is not a struct", a.field),
            (None, None, _) => {
                let value = parse_scalar(&schema, ty, a.value)
                    .ok_or_else(|| anyhow!("{:?} is not a valid {}", a.value, schema.type_name(ty)))?;
                buf.root_mut().mutate_field(id, value)
            }
            (Some(index), None, FieldType::Vector(element)) => {
                let element_ty = match element {
                    ElementType::Scalar(s) => FieldType::Scalar(s),
                    ElementType::Enum(e) => FieldType::Enum(e),
                    _ => bail!("'{}' is not a scalar vector", a.field),
                };
                let value = parse_scalar(&schema, element_ty, a.value).ok_or_else(|| {
                    anyhow!("{:?} is not a valid {}", a.value, schema.element_type_name(element))
                })?;
                buf.root_mut().mutate_element(id, index, value)
            }
            (Some(_), None, _) => bail!("'{}' is not a vector", a.field),
        };
        if !changed {
            bail!("can't mutate {:?}: only fields present in the buffer can change", text);
        }
        println!("  ✓ {}", text);
    }

    buf.reverify()
        .context("buffer no longer verifies after mutation")?;
    let target: PathBuf = output.map_or_else(|| file.to_path_buf(), Path::to_path_buf);
    fs::write(&target, &bytes).with_context(|| format!("writing {}", target.display()))?;
    println!("✓ wrote {}", target.display());
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════
// DEMO
// ═══════════════════════════════════════════════════════════════════════════

fn show_character(label: &str, bytes: &[u8]) -> Result<()> {
    let c = root_as_character(bytes).context("reading character")?;
    section_mid(label);
    kv("name", c.name().unwrap_or("<none>"));
    kv("mana", &c.mana().to_string());
    kv("hp", &c.hp().to_string());
    kv("type", &c.chtype().to_string());
    let inventory: Vec<String> = c
        .inventory()
        .map(|v| v.iter().map(|b| b.to_string()).collect())
        .unwrap_or_default();
    kv("inventory", &format!("[{}]", inventory.join(", ")));
    Ok(())
}

fn run_demo(out_dir: Option<&Path>) -> Result<()> {
    section_top("FCheckFlatBuffer");

    // Basic: build, verify, read, then patch an inventory slot, mana and hp in place.
    let basic = CharacterT {
        mana: 300,
        hp: 200,
        name: Some("UnrealMonster_Basic".to_string()),
        inventory: Some(vec![10, 20, 30, 40, 50]),
        chtype: CharacterType::PLAYER,
    };
    let mut basic_bytes = basic.to_buffer()?;
    kv("built", &format_size(basic_bytes.len()));
    kv("verified", &display::verdict(flatcheck::verify_character_buffer(&basic_bytes)));
    show_character("BASIC", &basic_bytes)?;
    {
        let mut c = root_as_character_mut(&mut basic_bytes)?;
        let mut inventory = c
            .mutable_inventory()
            .ok_or_else(|| anyhow!("basic character has no inventory"))?;
        if !inventory.mutate(1, 99) {
            bail!("inventory[1] is out of range");
        }
        if !c.mutate_mana(123) {
            bail!("mana is not stored in the basic buffer");
        }
        if !c.mutate_hp(456) {
            bail!("hp is not stored in the basic buffer");
        }
        c.reverify()?;
    }
    show_character("BASIC after inventory[1] = 99, mana = 123, hp = 456", &basic_bytes)?;

    // Advanced: same flow, patching hp.
    let advanced = CharacterT {
        mana: 999,
        hp: 888,
        name: Some("UnrealMonster_Advanced".to_string()),
        inventory: Some(vec![100, 101, 102, 103]),
        chtype: CharacterType::AI,
    };
    let mut advanced_bytes = advanced.to_buffer()?;
    show_character("ADVANCED", &advanced_bytes)?;
    {
        let mut c = root_as_character_mut(&mut advanced_bytes)?;
        if !c.mutate_hp(1234) {
            bail!("hp is not stored in the advanced buffer");
        }
        c.reverify()?;
    }
    show_character("ADVANCED after hp = 1234", &advanced_bytes)?;
    section_bot();

    if let Some(dir) = out_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        for (name, bytes) in [("basic.bin", &basic_bytes), ("advanced.bin", &advanced_bytes)] {
            let path = dir.join(name);
            fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
        }
        println!("✓ wrote basic.bin and advanced.bin to {}", dir.display());
    }
    Ok(())
}
