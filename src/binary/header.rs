// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Buffer header and layout constants.
//!
//! The header is tiny: a 4-byte little-endian offset to the root table,
//! optionally followed by a 4-byte file identifier. Everything else in the
//! buffer is reached by following offsets from there.
//!
//! The three offset flavours are the single source of truth for how positions
//! are computed. Every piece of code that follows an offset MUST go through the
//! helpers here, so the builder and the readers can't drift apart.
//!
//! ```text
//! uoffset (u32)  target = holder + value          (always forward)
//! soffset (i32)  vtable = table  - value          (table -> its vtable)
//! voffset (u16)  field  = table  + value, 0=absent (vtable slot -> field)
//! ```

use super::encoding::read_scalar_at;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Size of a forward offset (root offset, string/vector/table references).
pub const SIZE_UOFFSET: usize = 4;

/// Size of the table -> vtable offset.
pub const SIZE_SOFFSET: usize = 4;

/// Size of one vtable entry.
pub const SIZE_VOFFSET: usize = 2;

/// Length of the optional file identifier that follows the root offset.
pub const FILE_IDENTIFIER_LENGTH: usize = 4;

/// Vtable entries before the first field slot: vtable size, table size.
pub const VTABLE_METADATA_FIELDS: usize = 2;

/// Bytes of vtable header before the first field slot.
pub const VTABLE_HEADER_SIZE: usize = VTABLE_METADATA_FIELDS * SIZE_VOFFSET;

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum buffer size: offsets are signed 32-bit on the way to the vtable.
pub const MAX_BUFFER_SIZE: usize = i32::MAX as usize;

/// Maximum nesting of tables the verifier will follow.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Maximum number of tables the verifier will visit in one buffer.
pub const DEFAULT_MAX_TABLES: usize = 1_000_000;

/// Maximum number of fields in one table (vtable size must fit a u16).
pub const MAX_FIELD_COUNT: usize = (u16::MAX as usize - VTABLE_HEADER_SIZE) / SIZE_VOFFSET;

// ============================================================================
// SLOTS
// ============================================================================

/// Vtable byte offset of the slot for field `id` (field 0 lives at 4).
#[inline]
pub const fn field_index_to_voffset(id: usize) -> usize {
    VTABLE_HEADER_SIZE + id * SIZE_VOFFSET
}

/// Inverse of [`field_index_to_voffset`].
#[inline]
pub const fn voffset_to_field_index(voffset: usize) -> usize {
    (voffset - VTABLE_HEADER_SIZE) / SIZE_VOFFSET
}

// ============================================================================
// HEADER
// ============================================================================

/// The decoded buffer header. Nothing here is trusted until verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferHeader {
    /// Offset from position 0 to the root table.
    pub root_offset: u32,
    /// The four bytes after the root offset, if the buffer is long enough.
    /// Only meaningful when the buffer was finished with an identifier.
    pub identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
}

impl BufferHeader {
    pub fn read(bytes: &[u8]) -> Option<Self> {
        let root_offset = read_scalar_at::<u32>(bytes, 0)?;
        let identifier = bytes
            .get(SIZE_UOFFSET..SIZE_UOFFSET + FILE_IDENTIFIER_LENGTH)
            .map(|raw| {
                let mut id = [0u8; FILE_IDENTIFIER_LENGTH];
                id.copy_from_slice(raw);
                id
            });
        Some(Self {
            root_offset,
            identifier,
        })
    }

    /// Absolute position of the root table (not bounds-checked).
    pub fn root_position(&self) -> usize {
        self.root_offset as usize
    }
}

/// Does `bytes` carry `identifier` right after the root offset?
pub fn buffer_has_identifier(bytes: &[u8], identifier: &[u8; FILE_IDENTIFIER_LENGTH]) -> bool {
    BufferHeader::read(bytes)
        .and_then(|h| h.identifier)
        .is_some_and(|id| &id == identifier)
}

// ============================================================================
// OFFSET ARITHMETIC
// ============================================================================

/// Follow the uoffset stored at `holder`. `None` on overflow or a short read.
#[inline]
pub fn follow_uoffset(bytes: &[u8], holder: usize) -> Option<usize> {
    let value = read_scalar_at::<u32>(bytes, holder)?;
    holder.checked_add(value as usize)
}

/// Position of the vtable for the table at `table`.
#[inline]
pub fn vtable_position(bytes: &[u8], table: usize) -> Option<usize> {
    let soffset = read_scalar_at::<i32>(bytes, table)?;
    let vtable = table as i64 - i64::from(soffset);
    usize::try_from(vtable).ok()
}

/// Position of field `id` of the table at `table`, or `None` if absent.
#[inline]
pub fn field_position(bytes: &[u8], table: usize, id: usize) -> Option<usize> {
    slot_position(bytes, table, field_index_to_voffset(id))
}

/// Like [`field_position`], addressed by vtable slot (`4 + 2 * id`).
///
/// Slots beyond the vtable's declared size are absent too: that's how older
/// buffers without newer fields stay readable.
#[inline]
pub fn slot_position(bytes: &[u8], table: usize, slot: usize) -> Option<usize> {
    if slot < VTABLE_HEADER_SIZE {
        return None;
    }
    let vtable = vtable_position(bytes, table)?;
    let vtable_size = read_scalar_at::<u16>(bytes, vtable)? as usize;
    if slot + SIZE_VOFFSET > vtable_size {
        return None;
    }
    let voffset = read_scalar_at::<u16>(bytes, vtable.checked_add(slot)?)?;
    if voffset == 0 {
        return None;
    }
    table.checked_add(voffset as usize)
}
