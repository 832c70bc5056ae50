// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Zero-copy table access.
//!
//! A [`Table`] is a buffer slice plus the table's position. Reads go through
//! the vtable each time; nothing is decoded up front and nothing is copied.
//! Tables are only handed out for verified buffers, but every read is still
//! bounds-checked and falls back to the default (or `None`) instead of
//! panicking.

use super::builder::{Str, TableRef};
use super::encoding::{read_scalar_at, Scalar};
use super::header::{follow_uoffset, slot_position, SIZE_UOFFSET};
use super::vector::Vector;

/// Something that can be read out of a buffer at a known position.
///
/// Scalars are read in place; strings and tables are reached through the
/// uoffset stored at the position.
///
/// Not exported: outside the crate, tables are only reachable from a
/// verified buffer.
pub trait Follow<'a> {
    type Inner;

    /// Bytes one element occupies inside a vector.
    const INLINE_SIZE: usize;

    fn follow(buf: &'a [u8], loc: usize) -> Option<Self::Inner>;
}

macro_rules! impl_follow_scalar {
    ($($ty:ty),*) => {
        $(impl<'a> Follow<'a> for $ty {
            type Inner = $ty;
            const INLINE_SIZE: usize = <$ty as Scalar>::WIDTH;

            #[inline]
            fn follow(buf: &'a [u8], loc: usize) -> Option<$ty> {
                read_scalar_at(buf, loc)
            }
        })*
    };
}

impl_follow_scalar!(bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl<'a> Follow<'a> for Str {
    type Inner = &'a str;
    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: &'a [u8], loc: usize) -> Option<&'a str> {
        let start = follow_uoffset(buf, loc)?;
        let len = read_scalar_at::<u32>(buf, start)? as usize;
        let body = start.checked_add(SIZE_UOFFSET)?;
        let bytes = buf.get(body..body.checked_add(len)?)?;
        std::str::from_utf8(bytes).ok()
    }
}

impl<'a> Follow<'a> for TableRef {
    type Inner = Table<'a>;
    const INLINE_SIZE: usize = SIZE_UOFFSET;

    fn follow(buf: &'a [u8], loc: usize) -> Option<Table<'a>> {
        let target = follow_uoffset(buf, loc)?;
        (target < buf.len()).then(|| Table::new(buf, target))
    }
}

/// A table inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table<'a> {
    buf: &'a [u8],
    loc: usize,
}

impl<'a> Table<'a> {
    pub(crate) fn new(buf: &'a [u8], loc: usize) -> Self {
        Self { buf, loc }
    }

    /// The whole buffer this table lives in.
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Absolute position of the table (its soffset).
    pub fn position(&self) -> usize {
        self.loc
    }

    /// Absolute position of the field in vtable slot `slot`, if present.
    #[inline]
    pub fn field_offset(&self, slot: u16) -> Option<usize> {
        slot_position(self.buf, self.loc, slot as usize)
    }

    pub fn is_present(&self, slot: u16) -> bool {
        self.field_offset(slot).is_some()
    }

    /// Scalar field, or `default` when absent.
    #[inline]
    pub fn get_scalar<T: Scalar>(&self, slot: u16, default: T) -> T {
        self.get_optional_scalar(slot).unwrap_or(default)
    }

    /// Scalar field, or `None` when absent. Distinguishes "absent" from
    /// "present and equal to the default".
    #[inline]
    pub fn get_optional_scalar<T: Scalar>(&self, slot: u16) -> Option<T> {
        read_scalar_at(self.buf, self.field_offset(slot)?)
    }

    pub fn get_str(&self, slot: u16) -> Option<&'a str> {
        Str::follow(self.buf, self.field_offset(slot)?)
    }

    pub fn get_vector<T: Follow<'a>>(&self, slot: u16) -> Option<Vector<'a, T>> {
        let start = follow_uoffset(self.buf, self.field_offset(slot)?)?;
        Vector::at(self.buf, start)
    }

    pub fn get_table(&self, slot: u16) -> Option<Table<'a>> {
        TableRef::follow(self.buf, self.field_offset(slot)?)
    }
}
