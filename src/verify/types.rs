// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Verified-buffer wrappers and the verifier's error and option types.
//!
//! A [`VerifiedBuffer`] can only be built by the verifier, so holding one is
//! proof that the bytes passed every check for its schema. The accessors hang
//! off these wrappers: there is no public path from raw bytes to a
//! [`Table`] that skips verification.
//!
//! | Type                | What's Guaranteed                                     |
//! |---------------------|-------------------------------------------------------|
//! | `RootHandle`        | position of a table that passed verification          |
//! | `VerifiedBuffer`    | every reachable offset, string, vector is in bounds   |
//! | `VerifiedBufferMut` | same, at the time of verification; layout is frozen   |

use std::fmt;

use super::verifier::Verifier;
use crate::binary::{
    MutableTable, Table, DEFAULT_MAX_DEPTH, DEFAULT_MAX_TABLES, FILE_IDENTIFIER_LENGTH,
    MAX_BUFFER_SIZE,
};
use crate::schema::{Schema, TableId};

// ============================================================================
// ERRORS
// ============================================================================

/// Why a buffer failed verification. Positions are absolute byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// Too short to hold the root offset (and identifier, if expected).
    BufferTooSmall { len: usize, min: usize },
    /// Larger than `max_buffer_size`.
    BufferTooLarge { len: usize, max: usize },
    /// The identifier after the root offset isn't the expected one.
    IdentifierMismatch {
        expected: [u8; FILE_IDENTIFIER_LENGTH],
        found: [u8; FILE_IDENTIFIER_LENGTH],
    },
    /// The schema has no tables, so there is nothing to verify against.
    NoRootType,
    /// A value isn't aligned to its natural boundary.
    Unaligned {
        position: usize,
        alignment: usize,
        what: &'static str,
    },
    /// A read would run past the end of the buffer.
    OutOfBounds {
        position: usize,
        len: usize,
        buffer_len: usize,
        what: &'static str,
    },
    /// A uoffset of zero would point back at itself.
    ZeroOffset { position: usize },
    /// The vtable of the table at `table` is malformed.
    InvalidVtable { table: usize, reason: &'static str },
    /// A present field doesn't fit in its table's inline size.
    FieldOutOfTable {
        table: usize,
        field: String,
        voffset: u16,
        table_size: u16,
    },
    /// A string's NUL terminator is missing.
    MissingTerminator { position: usize },
    InvalidUtf8 { position: usize },
    /// A vector's element count can't possibly fit in a buffer.
    VectorTooLong { position: usize, len: u32 },
    /// Tables nest deeper than `max_depth` (often an offset cycle).
    DepthLimit { max: usize },
    /// More than `max_tables` tables visited.
    TableLimit { max: usize },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::BufferTooSmall { len, min } => {
                write!(f, "buffer of {} bytes is shorter than the {}-byte minimum", len, min)
            }
            VerifyError::BufferTooLarge { len, max } => {
                write!(f, "buffer of {} bytes exceeds the {}-byte limit", len, max)
            }
            VerifyError::IdentifierMismatch { expected, found } => write!(
                f,
                "file identifier {:?} does not match expected {:?}",
                String::from_utf8_lossy(found),
                String::from_utf8_lossy(expected)
            ),
            VerifyError::NoRootType => write!(f, "schema has no root table"),
            VerifyError::Unaligned {
                position,
                alignment,
                what,
            } => write!(f, "{} at {} is not {}-byte aligned", what, position, alignment),
            VerifyError::OutOfBounds {
                position,
                len,
                buffer_len,
                what,
            } => write!(
                f,
                "{} at {}..{} is outside the {}-byte buffer",
                what,
                position,
                position.saturating_add(*len),
                buffer_len
            ),
            VerifyError::ZeroOffset { position } => write!(f, "zero offset at {}", position),
            VerifyError::InvalidVtable { table, reason } => {
                write!(f, "table at {} has an invalid vtable: {}", table, reason)
            }
            VerifyError::FieldOutOfTable {
                table,
                field,
                voffset,
                table_size,
            } => write!(
                f,
                "field '{}' at voffset {} does not fit table at {} ({} bytes)",
                field, voffset, table, table_size
            ),
            VerifyError::MissingTerminator { position } => {
                write!(f, "string at {} is not NUL-terminated", position)
            }
            VerifyError::InvalidUtf8 { position } => {
                write!(f, "string at {} is not valid UTF-8", position)
            }
            VerifyError::VectorTooLong { position, len } => {
                write!(f, "vector at {} claims {} elements", position, len)
            }
            VerifyError::DepthLimit { max } => {
                write!(f, "tables nested deeper than {}", max)
            }
            VerifyError::TableLimit { max } => {
                write!(f, "more than {} tables in buffer", max)
            }
        }
    }
}

impl std::error::Error for VerifyError {}

// ============================================================================
// OPTIONS
// ============================================================================

/// Resource limits and strictness knobs for verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifierOptions {
    /// Maximum table nesting depth (the root is depth 1).
    pub max_depth: usize,
    /// Maximum number of tables visited in one buffer.
    pub max_tables: usize,
    /// Largest buffer accepted at all.
    pub max_buffer_size: usize,
    /// Reject scalars, offsets and tables not on their natural alignment.
    pub check_alignment: bool,
}

impl Default for VerifierOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tables: DEFAULT_MAX_TABLES,
            max_buffer_size: MAX_BUFFER_SIZE,
            check_alignment: true,
        }
    }
}

// ============================================================================
// VERIFIED WRAPPERS
// ============================================================================

/// Position of a verified root table. Only the verifier makes these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootHandle {
    position: usize,
    table: TableId,
}

impl RootHandle {
    pub(crate) fn new(position: usize, table: TableId) -> Self {
        Self { position, table }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Schema table the root was verified as.
    pub fn table(&self) -> TableId {
        self.table
    }
}

/// Bytes that passed verification, with the schema they were checked against.
#[derive(Debug, Clone, Copy)]
pub struct VerifiedBuffer<'a> {
    buf: &'a [u8],
    schema: &'a Schema,
    root: RootHandle,
}

impl<'a> VerifiedBuffer<'a> {
    pub(crate) fn new(buf: &'a [u8], schema: &'a Schema, root: RootHandle) -> Self {
        Self { buf, schema, root }
    }

    pub fn root(&self) -> Table<'a> {
        Table::new(self.buf, self.root.position)
    }

    pub fn root_handle(&self) -> RootHandle {
        self.root
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.buf
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }
}

/// Mutable bytes that passed verification.
///
/// Remembers a CRC32 of the bytes as verified, so callers can tell whether
/// anything changed since and decide whether to re-verify.
#[derive(Debug)]
pub struct VerifiedBufferMut<'a> {
    buf: &'a mut [u8],
    schema: &'a Schema,
    root: RootHandle,
    options: VerifierOptions,
    identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
    fingerprint: u32,
}

impl<'a> VerifiedBufferMut<'a> {
    pub(crate) fn new(
        buf: &'a mut [u8],
        schema: &'a Schema,
        root: RootHandle,
        options: VerifierOptions,
        identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
    ) -> Self {
        let fingerprint = crc32fast::hash(buf);
        Self {
            buf,
            schema,
            root,
            options,
            identifier,
            fingerprint,
        }
    }

    pub fn root(&self) -> Table<'_> {
        Table::new(self.buf, self.root.position)
    }

    pub fn root_mut(&mut self) -> MutableTable<'_> {
        MutableTable::new(self.buf, self.root.position, self.schema, self.root.table)
    }

    pub fn root_handle(&self) -> RootHandle {
        self.root
    }

    pub fn bytes(&self) -> &[u8] {
        self.buf
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// CRC32 of the bytes when they were (last) verified.
    pub fn fingerprint(&self) -> u32 {
        self.fingerprint
    }

    /// Do the bytes differ from what was verified?
    pub fn is_mutated(&self) -> bool {
        crc32fast::hash(self.buf) != self.fingerprint
    }

    /// Run the verifier again with the original settings. On success the
    /// fingerprint is reset to the current bytes.
    pub fn reverify(&mut self) -> Result<(), VerifyError> {
        let mut verifier = Verifier::new(self.schema)
            .with_options(self.options)
            .with_root_table(self.root.table);
        if let Some(id) = self.identifier {
            verifier = verifier.with_identifier(id);
        }
        self.root = verifier.verify_root(self.buf)?;
        self.fingerprint = crc32fast::hash(self.buf);
        Ok(())
    }

    /// Give up mutability and keep the verified view.
    pub fn into_verified(self) -> VerifiedBuffer<'a> {
        VerifiedBuffer::new(self.buf, self.schema, self.root)
    }
}
