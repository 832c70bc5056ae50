// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary buffer format: building, reading, and mutating in place.
//!
//! The format is FlatBuffers-compatible. It is designed for one thing: reading
//! a field should cost a couple of offset hops and nothing else. No parse
//! step, no allocation, no copy. The price is that the bytes can't be trusted
//! until the verifier has walked them, and that their layout is frozen once
//! the builder finishes.
//!
//! # Security Considerations
//!
//! Buffers are meant to be received from untrusted sources:
//! - Nothing in this module hands out a [`Table`] for unverified bytes
//! - Every read is bounds-checked anyway and degrades to default/`None`
//! - All offsets are integers; no pointer arithmetic, no `unsafe`
//!
//! # Format Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ root: u32            uoffset to the root table             │
//! │ identifier: [u8; 4]  optional file identifier              │
//! │ padding                                                    │
//! ├────────────────────────────────────────────────────────────┤
//! │ VTABLE (root)                                              │
//! │   vtable_size: u16   bytes, including these two fields     │
//! │   table_size: u16    inline bytes of the table             │
//! │   slot[i]: u16       field i at table + slot[i], 0 = absent│
//! ├────────────────────────────────────────────────────────────┤
//! │ TABLE (root)                                               │
//! │   soffset: i32       vtable = table - soffset              │
//! │   fields             schema order, naturally aligned       │
//! ├────────────────────────────────────────────────────────────┤
//! │ SUB-OBJECTS          reverse creation order                │
//! │   string: u32 len, bytes, NUL                              │
//! │   vector: u32 count, packed elements (u32 uoffsets for     │
//! │           strings and tables)                              │
//! │   nested tables, each preceded by its vtable               │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! All multi-byte values are little-endian. Every uoffset points forward,
//! because the builder writes back to front.

mod allocator;
mod builder;
mod encoding;
mod header;
mod mutable;
mod table;
mod vector;

pub use allocator::{AllocError, Allocator, DefaultAllocator};
pub use builder::{
    BuildError, Builder, ElementKind, FinishedBuffer, Offset, OffsetKind, Placeable,
    PlacedOffset, Str, TableArgs, TableRef, VectorElement, VectorOf,
};
pub use encoding::{padding_bytes, read_scalar_at, write_scalar_at, Scalar, ScalarType, Value};
pub use header::{
    buffer_has_identifier, field_index_to_voffset, field_position, follow_uoffset,
    slot_position, voffset_to_field_index, vtable_position, BufferHeader, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_TABLES, FILE_IDENTIFIER_LENGTH, MAX_BUFFER_SIZE, MAX_FIELD_COUNT, SIZE_SOFFSET,
    SIZE_UOFFSET, SIZE_VOFFSET, VTABLE_HEADER_SIZE, VTABLE_METADATA_FIELDS,
};
pub use mutable::{MutableTable, MutableVector};
pub(crate) use table::Follow;
pub use table::Table;
pub use vector::{Vector, VectorIter};
