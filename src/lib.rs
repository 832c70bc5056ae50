//! Zero-copy FlatBuffers-compatible buffers with schema-driven verification.
//!
//! Build a buffer once, verify it once, then read fields straight out of the
//! bytes, or overwrite fixed-width fields in place without rebuilding.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐
//! │   schema    │────▶│   builder    │────▶│   verifier    │
//! │ (tables,    │     │ (back-to-    │     │ (bounds, UTF-8│
//! │  enums)     │     │  front)      │     │  depth limits)│
//! └─────────────┘     └──────────────┘     └───────────────┘
//!        │                                        │
//!        ▼                                        ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  VerifiedBuffer ──▶ Table / Vector        (read)        │
//! │  VerifiedBufferMut ──▶ MutableTable       (patch)       │
//! └─────────────────────────────────────────────────────────┘
//!        │
//!        ▼
//!   character (typed message)     reflect (schema-driven JSON)
//! ```
//!
//! # Modules
//!
//! | Module      | Role                                                  |
//! |-------------|-------------------------------------------------------|
//! | `binary`    | wire format, builder, zero-copy and mutable accessors |
//! | `schema`    | schema model, JSON description, `.fbs` export         |
//! | `verify`    | verifier and verified-buffer wrappers                 |
//! | `character` | the `FCheckFlatBuffer` message and its object API     |
//! | `reflect`   | field access and JSON conversion by schema lookup     |
//! | `contracts` | debug-build invariant checks                          |
//!
//! # Usage
//!
//! ```
//! use flatcheck::{create_character, root_as_character, Builder, CharacterArgs, CharacterType};
//!
//! let mut builder = Builder::new();
//! let name = builder.create_string("UnrealMonster_Basic")?;
//! let inventory = builder.create_vector(&[10u8, 20, 30, 40, 50])?;
//! let root = create_character(&mut builder, &CharacterArgs {
//!     mana: 300,
//!     hp: 200,
//!     name: Some(name),
//!     inventory: Some(inventory),
//!     chtype: CharacterType::PLAYER,
//! })?;
//! let bytes = builder.finish(root)?.into_vec();
//!
//! let character = root_as_character(&bytes)?;
//! assert_eq!(character.hp(), 200);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod binary;
pub mod character;
pub mod contracts;
pub mod reflect;
pub mod schema;
pub mod testing;
pub mod verify;

pub use binary::{
    buffer_has_identifier, field_index_to_voffset, vtable_position, AllocError, Allocator,
    BufferHeader, BuildError, Builder, DefaultAllocator, FinishedBuffer, MutableTable,
    MutableVector, Offset, PlacedOffset, Scalar, ScalarType, Str, Table, TableArgs, TableRef,
    Value, Vector, VectorOf, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TABLES, FILE_IDENTIFIER_LENGTH,
    MAX_BUFFER_SIZE,
};
pub use character::{
    character_schema, create_character, finish_character_buffer, root_as_character,
    root_as_character_mut, verify_character_buffer, Character, CharacterArgs, CharacterMut,
    CharacterT, CharacterType,
};
pub use reflect::{read_field, FieldValue, RawVector, StructView};
pub use schema::{
    ElementType, EnumDef, FieldDef, FieldId, FieldType, Schema, SchemaDef, SchemaError, StructDef,
    StructId, TableDef, TableId,
};
pub use verify::{
    verify, RootHandle, VerifiedBuffer, VerifiedBufferMut, Verifier, VerifierOptions, VerifyError,
};
