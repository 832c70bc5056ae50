// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The `FCheckFlatBuffer` character message.
//!
//! Typed wrappers over the generic builder, verifier and accessors for one
//! concrete schema:
//!
//! ```text
//! namespace TestingFlatBuffers.FCheckFlatBuffer;
//!
//! attribute "priority";
//!
//! enum ECharacterType : byte { UseDefault = 0, Player = 1, AI = 2, Hidden = 3 }
//! table FCheckFlatBuffer {
//!   mana: int = 150;
//!   hp: int = 100;
//!   name: string;
//!   inventory: [ubyte];
//!   chtype: ECharacterType;
//! }
//! root_type FCheckFlatBuffer;
//! ```

use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::binary::{
    Allocator, BuildError, Builder, FinishedBuffer, MutableVector, Offset, ScalarType, Str, Table,
    TableArgs, TableRef, Value, Vector, VectorOf,
};
use crate::schema::{EnumDef, EnumId, FieldDef, FieldId, Schema, TableDef, TableId};
use crate::verify::{VerifiedBufferMut, Verifier, VerifyError};

// ============================================================================
// SCHEMA
// ============================================================================

pub const CHARACTER_TABLE: TableId = 0;
pub const CHARACTER_TYPE_ENUM: EnumId = 0;

pub const FIELD_MANA: FieldId = 0;
pub const FIELD_HP: FieldId = 1;
pub const FIELD_NAME: FieldId = 2;
pub const FIELD_INVENTORY: FieldId = 3;
pub const FIELD_CHTYPE: FieldId = 4;

pub const VT_MANA: u16 = 4;
pub const VT_HP: u16 = 6;
pub const VT_NAME: u16 = 8;
pub const VT_INVENTORY: u16 = 10;
pub const VT_CHTYPE: u16 = 12;

pub const DEFAULT_MANA: i32 = 150;
pub const DEFAULT_HP: i32 = 100;

static CHARACTER_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    let mut chtype = EnumDef::new("ECharacterType", ScalarType::Byte);
    for (name, value) in CharacterType::ENUM_VALUES {
        chtype = chtype.with_value(name, i64::from(value.0));
    }
    Schema::new("TestingFlatBuffers.FCheckFlatBuffer")
        .with_attribute("priority")
        .with_enum(chtype)
        .with_table(
            TableDef::new("FCheckFlatBuffer")
                .with_field(FieldDef::scalar("mana", ScalarType::Int).with_default(Value::Int(DEFAULT_MANA)))
                .with_field(FieldDef::scalar("hp", ScalarType::Int).with_default(Value::Int(DEFAULT_HP)))
                .with_field(FieldDef::string("name"))
                .with_field(FieldDef::vector(
                    "inventory",
                    crate::schema::ElementType::Scalar(ScalarType::UByte),
                ))
                .with_field(FieldDef::enumeration("chtype", CHARACTER_TYPE_ENUM)),
        )
        .with_root(CHARACTER_TABLE)
});

/// The character schema, shared by every character buffer.
pub fn character_schema() -> &'static Schema {
    &CHARACTER_SCHEMA
}

// ============================================================================
// ENUM
// ============================================================================

/// `ECharacterType`. Open: unknown values read back as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterType(pub i8);

impl CharacterType {
    pub const USE_DEFAULT: Self = Self(0);
    pub const PLAYER: Self = Self(1);
    pub const AI: Self = Self(2);
    pub const HIDDEN: Self = Self(3);

    pub const ENUM_VALUES: [(&'static str, Self); 4] = [
        ("UseDefault", Self::USE_DEFAULT),
        ("Player", Self::PLAYER),
        ("AI", Self::AI),
        ("Hidden", Self::HIDDEN),
    ];

    pub fn variant_name(self) -> Option<&'static str> {
        Self::ENUM_VALUES
            .iter()
            .find(|(_, v)| *v == self)
            .map(|(name, _)| *name)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = crate::schema::strip_scope_prefix(name);
        Self::ENUM_VALUES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }
}

impl fmt::Display for CharacterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "<unknown {}>", self.0),
        }
    }
}

// ============================================================================
// BUILDING
// ============================================================================

/// Arguments for [`create_character`]. Sub-objects must already be placed.
#[derive(Debug, Clone, Copy)]
pub struct CharacterArgs {
    pub mana: i32,
    pub hp: i32,
    pub name: Option<Offset<Str>>,
    pub inventory: Option<Offset<VectorOf<u8>>>,
    pub chtype: CharacterType,
}

impl Default for CharacterArgs {
    fn default() -> Self {
        Self {
            mana: DEFAULT_MANA,
            hp: DEFAULT_HP,
            name: None,
            inventory: None,
            chtype: CharacterType::USE_DEFAULT,
        }
    }
}

pub fn create_character<A: Allocator>(
    builder: &mut Builder<A>,
    args: &CharacterArgs,
) -> Result<Offset<TableRef>, BuildError> {
    let mut table = TableArgs::new(character_schema(), CHARACTER_TABLE)?;
    table.set_scalar(FIELD_MANA, Value::Int(args.mana))?;
    table.set_scalar(FIELD_HP, Value::Int(args.hp))?;
    if let Some(name) = args.name {
        table.set_offset(FIELD_NAME, name.into())?;
    }
    if let Some(inventory) = args.inventory {
        table.set_offset(FIELD_INVENTORY, inventory.into())?;
    }
    table.set_scalar(FIELD_CHTYPE, Value::Byte(args.chtype.0))?;
    builder.create_table(table)
}

pub fn finish_character_buffer<A: Allocator>(
    builder: Builder<A>,
    root: Offset<TableRef>,
) -> Result<FinishedBuffer<A>, BuildError> {
    builder.finish(root)
}

// ============================================================================
// VERIFYING AND READING
// ============================================================================

pub fn verify_character_buffer(buf: &[u8]) -> bool {
    crate::verify::verify(buf, character_schema())
}

/// Verify `buf` and view its root as a character.
pub fn root_as_character(buf: &[u8]) -> Result<Character<'_>, VerifyError> {
    let verified = Verifier::new(character_schema()).verify_buffer(buf)?;
    Ok(Character {
        table: verified.root(),
    })
}

/// Verify `buf` and view its root as a mutable character.
pub fn root_as_character_mut(buf: &mut [u8]) -> Result<CharacterMut<'_>, VerifyError> {
    let verified = Verifier::new(character_schema()).verify_buffer_mut(buf)?;
    Ok(CharacterMut { buf: verified })
}

/// Zero-copy view of a verified character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Character<'a> {
    table: Table<'a>,
}

impl<'a> Character<'a> {
    pub fn mana(&self) -> i32 {
        self.table.get_scalar(VT_MANA, DEFAULT_MANA)
    }

    pub fn hp(&self) -> i32 {
        self.table.get_scalar(VT_HP, DEFAULT_HP)
    }

    pub fn name(&self) -> Option<&'a str> {
        self.table.get_str(VT_NAME)
    }

    pub fn inventory(&self) -> Option<Vector<'a, u8>> {
        self.table.get_vector(VT_INVENTORY)
    }

    pub fn chtype(&self) -> CharacterType {
        CharacterType(self.table.get_scalar(VT_CHTYPE, 0))
    }

    pub fn as_table(&self) -> Table<'a> {
        self.table
    }

    /// Copy everything into an owned [`CharacterT`].
    pub fn unpack(&self) -> CharacterT {
        CharacterT {
            mana: self.mana(),
            hp: self.hp(),
            name: self.name().map(str::to_string),
            inventory: self.inventory().map(|v| v.bytes().to_vec()),
            chtype: self.chtype(),
        }
    }
}

/// A verified character whose fixed-width fields can be overwritten in place.
#[derive(Debug)]
pub struct CharacterMut<'a> {
    buf: VerifiedBufferMut<'a>,
}

impl CharacterMut<'_> {
    pub fn as_character(&self) -> Character<'_> {
        Character {
            table: self.buf.root(),
        }
    }

    /// `false` if mana was omitted at build time (it equalled the default).
    pub fn mutate_mana(&mut self, mana: i32) -> bool {
        self.buf.root_mut().mutate_scalar(VT_MANA, mana)
    }

    pub fn mutate_hp(&mut self, hp: i32) -> bool {
        self.buf.root_mut().mutate_scalar(VT_HP, hp)
    }

    pub fn mutate_chtype(&mut self, chtype: CharacterType) -> bool {
        self.buf.root_mut().mutate_scalar(VT_CHTYPE, chtype.0)
    }

    pub fn mutable_inventory(&mut self) -> Option<MutableVector<'_, u8>> {
        self.buf.root_mut().into_mutable_vector(FIELD_INVENTORY)
    }

    /// Schema-checked mutation by field id.
    pub fn mutate_field(&mut self, field: FieldId, value: Value) -> bool {
        self.buf.root_mut().mutate_field(field, value)
    }

    pub fn is_mutated(&self) -> bool {
        self.buf.is_mutated()
    }

    pub fn reverify(&mut self) -> Result<(), VerifyError> {
        self.buf.reverify()
    }

    pub fn bytes(&self) -> &[u8] {
        self.buf.bytes()
    }
}

// ============================================================================
// OBJECT API
// ============================================================================

/// Owned, serializable mirror of a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterT {
    pub mana: i32,
    pub hp: i32,
    pub name: Option<String>,
    pub inventory: Option<Vec<u8>>,
    pub chtype: CharacterType,
}

impl Default for CharacterT {
    fn default() -> Self {
        Self {
            mana: DEFAULT_MANA,
            hp: DEFAULT_HP,
            name: None,
            inventory: None,
            chtype: CharacterType::USE_DEFAULT,
        }
    }
}

impl CharacterT {
    /// Place the sub-objects and the table; returns the table offset.
    pub fn pack<A: Allocator>(&self, builder: &mut Builder<A>) -> Result<Offset<TableRef>, BuildError> {
        let name = self
            .name
            .as_deref()
            .map(|n| builder.create_string(n))
            .transpose()?;
        let inventory = self
            .inventory
            .as_deref()
            .map(|inv| builder.create_vector(inv))
            .transpose()?;
        create_character(
            builder,
            &CharacterArgs {
                mana: self.mana,
                hp: self.hp,
                name,
                inventory,
                chtype: self.chtype,
            },
        )
    }

    /// Build a complete buffer holding just this character.
    pub fn to_buffer(&self) -> Result<Vec<u8>, BuildError> {
        let mut builder = Builder::new();
        let root = self.pack(&mut builder)?;
        Ok(finish_character_buffer(builder, root)?.into_vec())
    }
}
