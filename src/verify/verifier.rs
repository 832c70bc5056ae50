// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Schema-driven buffer verification.
//!
//! Walks every offset reachable from the root, following the schema, and
//! checks that each one lands inside the buffer before anything reads through
//! it. The walk is bounded: nesting depth and table count are capped, so a
//! buffer whose offsets form a cycle fails instead of looping.
//!
//! Runs in time linear in the reachable data (times the table cap for shared
//! sub-objects) and never panics, whatever the input bytes.

use super::types::{RootHandle, VerifiedBuffer, VerifiedBufferMut, VerifierOptions, VerifyError};
use crate::binary::{
    read_scalar_at, FILE_IDENTIFIER_LENGTH, SIZE_SOFFSET, SIZE_UOFFSET, SIZE_VOFFSET,
    VTABLE_HEADER_SIZE,
};
use crate::schema::{ElementType, FieldType, Schema, TableId};

/// Verifies buffers against one schema.
#[derive(Debug, Clone, Copy)]
pub struct Verifier<'s> {
    schema: &'s Schema,
    options: VerifierOptions,
    identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
    root_table: Option<TableId>,
}

impl<'s> Verifier<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            options: VerifierOptions::default(),
            identifier: None,
            root_table: None,
        }
    }

    pub fn with_options(mut self, options: VerifierOptions) -> Self {
        self.options = options;
        self
    }

    /// Require this file identifier right after the root offset.
    pub fn with_identifier(mut self, identifier: [u8; FILE_IDENTIFIER_LENGTH]) -> Self {
        self.identifier = Some(identifier);
        self
    }

    /// Verify the root as this table instead of the schema's root type.
    pub fn with_root_table(mut self, table: TableId) -> Self {
        self.root_table = Some(table);
        self
    }

    pub fn options(&self) -> &VerifierOptions {
        &self.options
    }

    /// Check `bytes` and return the position of the verified root table.
    pub fn verify_root(&self, bytes: &[u8]) -> Result<RootHandle, VerifyError> {
        let id_len = self.identifier.map_or(0, |_| FILE_IDENTIFIER_LENGTH);
        let min = SIZE_UOFFSET + id_len;
        if bytes.len() > self.options.max_buffer_size {
            return Err(VerifyError::BufferTooLarge {
                len: bytes.len(),
                max: self.options.max_buffer_size,
            });
        }
        if bytes.len() < min {
            return Err(VerifyError::BufferTooSmall {
                len: bytes.len(),
                min,
            });
        }
        if let Some(expected) = self.identifier {
            let mut found = [0u8; FILE_IDENTIFIER_LENGTH];
            found.copy_from_slice(&bytes[SIZE_UOFFSET..min]);
            if found != expected {
                return Err(VerifyError::IdentifierMismatch { expected, found });
            }
        }

        let table = self
            .root_table
            .or_else(|| self.schema.root_table())
            .filter(|&id| self.schema.table(id).is_some())
            .ok_or(VerifyError::NoRootType)?;

        let mut walk = Walk {
            buf: bytes,
            schema: self.schema,
            options: &self.options,
            tables: 0,
        };
        let root = walk.deref_uoffset(0)?;
        walk.table(root, table, 1)?;
        Ok(RootHandle::new(root, table))
    }

    /// Verify and wrap for reading.
    pub fn verify_buffer<'a>(&self, bytes: &'a [u8]) -> Result<VerifiedBuffer<'a>, VerifyError>
    where
        's: 'a,
    {
        let root = self.verify_root(bytes)?;
        Ok(VerifiedBuffer::new(bytes, self.schema, root))
    }

    /// Verify and wrap for in-place mutation.
    pub fn verify_buffer_mut<'a>(
        &self,
        bytes: &'a mut [u8],
    ) -> Result<VerifiedBufferMut<'a>, VerifyError>
    where
        's: 'a,
    {
        let root = self.verify_root(bytes)?;
        Ok(VerifiedBufferMut::new(
            bytes,
            self.schema,
            root,
            self.options,
            self.identifier,
        ))
    }
}

/// `true` if `buffer` is a well-formed buffer of `schema`'s root table.
pub fn verify(buffer: &[u8], schema: &Schema) -> bool {
    Verifier::new(schema).verify_root(buffer).is_ok()
}

// ============================================================================
// WALK
// ============================================================================

struct Walk<'b> {
    buf: &'b [u8],
    schema: &'b Schema,
    options: &'b VerifierOptions,
    tables: usize,
}

impl Walk<'_> {
    fn range(&self, position: usize, len: usize, what: &'static str) -> Result<(), VerifyError> {
        match position.checked_add(len) {
            Some(end) if end <= self.buf.len() => Ok(()),
            _ => Err(VerifyError::OutOfBounds {
                position,
                len,
                buffer_len: self.buf.len(),
                what,
            }),
        }
    }

    fn aligned(&self, position: usize, alignment: usize, what: &'static str) -> Result<(), VerifyError> {
        if self.options.check_alignment && position % alignment != 0 {
            return Err(VerifyError::Unaligned {
                position,
                alignment,
                what,
            });
        }
        Ok(())
    }

    fn u16_at(&self, position: usize, what: &'static str) -> Result<u16, VerifyError> {
        self.range(position, SIZE_VOFFSET, what)?;
        read_scalar_at(self.buf, position).ok_or(VerifyError::OutOfBounds {
            position,
            len: SIZE_VOFFSET,
            buffer_len: self.buf.len(),
            what,
        })
    }

    fn u32_at(&self, position: usize, what: &'static str) -> Result<u32, VerifyError> {
        self.range(position, SIZE_UOFFSET, what)?;
        read_scalar_at(self.buf, position).ok_or(VerifyError::OutOfBounds {
            position,
            len: SIZE_UOFFSET,
            buffer_len: self.buf.len(),
            what,
        })
    }

    /// Follow the uoffset at `holder`, checking it and its target.
    fn deref_uoffset(&self, holder: usize) -> Result<usize, VerifyError> {
        self.aligned(holder, SIZE_UOFFSET, "offset")?;
        let value = self.u32_at(holder, "offset")?;
        if value == 0 {
            return Err(VerifyError::ZeroOffset { position: holder });
        }
        let out_of_bounds = VerifyError::OutOfBounds {
            position: holder,
            len: value as usize,
            buffer_len: self.buf.len(),
            what: "offset target",
        };
        if value > i32::MAX as u32 {
            return Err(out_of_bounds);
        }
        match holder.checked_add(value as usize) {
            Some(target) if target < self.buf.len() => Ok(target),
            _ => Err(out_of_bounds),
        }
    }

    fn table(&mut self, position: usize, table: TableId, depth: usize) -> Result<(), VerifyError> {
        if depth > self.options.max_depth {
            return Err(VerifyError::DepthLimit {
                max: self.options.max_depth,
            });
        }
        self.tables += 1;
        if self.tables > self.options.max_tables {
            return Err(VerifyError::TableLimit {
                max: self.options.max_tables,
            });
        }

        self.aligned(position, SIZE_SOFFSET, "table")?;
        self.range(position, SIZE_SOFFSET, "table")?;
        let soffset = read_scalar_at::<i32>(self.buf, position).unwrap_or(0);
        let vtable = usize::try_from(position as i64 - i64::from(soffset)).map_err(|_| {
            VerifyError::InvalidVtable {
                table: position,
                reason: "soffset points before the buffer",
            }
        })?;
        self.aligned(vtable, SIZE_VOFFSET, "vtable")?;
        let vtable_size = self.u16_at(vtable, "vtable")? as usize;
        if vtable_size < VTABLE_HEADER_SIZE || vtable_size % SIZE_VOFFSET != 0 {
            return Err(VerifyError::InvalidVtable {
                table: position,
                reason: "vtable size must be even and at least 4",
            });
        }
        self.range(vtable, vtable_size, "vtable")?;
        let table_size = self.u16_at(vtable + SIZE_VOFFSET, "vtable")?;
        if (table_size as usize) < SIZE_SOFFSET {
            return Err(VerifyError::InvalidVtable {
                table: position,
                reason: "table size smaller than its soffset",
            });
        }
        self.range(position, table_size as usize, "table")?;

        let Some(def) = self.schema.table(table) else {
            return Err(VerifyError::NoRootType);
        };
        for (id, field) in def.fields.iter().enumerate() {
            let slot = VTABLE_HEADER_SIZE + id * SIZE_VOFFSET;
            if slot + SIZE_VOFFSET > vtable_size {
                break;
            }
            let voffset = self.u16_at(vtable + slot, "vtable")?;
            if voffset == 0 {
                continue;
            }
            let width = self.schema.inline_width(field.ty);
            if (voffset as usize) < SIZE_SOFFSET || voffset as usize + width > table_size as usize {
                return Err(VerifyError::FieldOutOfTable {
                    table: position,
                    field: field.name.clone(),
                    voffset,
                    table_size,
                });
            }
            let at = position + voffset as usize;
            self.aligned(at, self.schema.inline_alignment(field.ty), "field")?;

            match field.ty {
                FieldType::Scalar(_) | FieldType::Enum(_) | FieldType::Struct(_) => {}
                FieldType::String => {
                    let target = self.deref_uoffset(at)?;
                    self.string(target)?;
                }
                FieldType::Vector(element) => {
                    let target = self.deref_uoffset(at)?;
                    self.vector(target, element, depth)?;
                }
                FieldType::Table(nested) => {
                    let target = self.deref_uoffset(at)?;
                    self.table(target, nested, depth + 1)?;
                }
            }
        }
        Ok(())
    }

    fn string(&self, position: usize) -> Result<(), VerifyError> {
        self.aligned(position, SIZE_UOFFSET, "string")?;
        let len = self.u32_at(position, "string length")? as usize;
        let body = position + SIZE_UOFFSET;
        // The terminator is part of the required range.
        self.range(body, len.saturating_add(1), "string")?;
        if self.buf[body + len] != 0 {
            return Err(VerifyError::MissingTerminator { position });
        }
        if std::str::from_utf8(&self.buf[body..body + len]).is_err() {
            return Err(VerifyError::InvalidUtf8 { position });
        }
        Ok(())
    }

    fn vector(&mut self, position: usize, element: ElementType, depth: usize) -> Result<(), VerifyError> {
        self.aligned(position, SIZE_UOFFSET, "vector")?;
        let len = self.u32_at(position, "vector length")?;
        let elem_size = self.schema.element_width(element);
        if len as usize >= self.options.max_buffer_size / elem_size {
            return Err(VerifyError::VectorTooLong { position, len });
        }
        let body = position + SIZE_UOFFSET;
        self.range(body, len as usize * elem_size, "vector")?;
        if len > 0 {
            self.aligned(body, elem_size, "vector element")?;
        }

        match element {
            ElementType::Scalar(_) | ElementType::Enum(_) => {}
            ElementType::String => {
                for i in 0..len as usize {
                    let target = self.deref_uoffset(body + i * SIZE_UOFFSET)?;
                    self.string(target)?;
                }
            }
            ElementType::Table(nested) => {
                for i in 0..len as usize {
                    let target = self.deref_uoffset(body + i * SIZE_UOFFSET)?;
                    self.table(target, nested, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}
