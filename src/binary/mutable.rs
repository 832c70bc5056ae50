// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! In-place mutation of fixed-width fields.
//!
//! Only bytes that already exist can change. A field that was omitted at build
//! time has no bytes to overwrite, so mutating it fails; strings, vectors and
//! tables can't change shape. What *can* change:
//!
//! - present scalar and enum fields of a table,
//! - members of present struct fields,
//! - elements of scalar (and enum) vectors, by index.
//!
//! Every rejected mutation returns `false` and leaves the buffer untouched.
//! Nothing here reallocates, shifts offsets, or re-verifies.

use std::marker::PhantomData;

use super::encoding::{read_scalar_at, write_scalar_at, Scalar, ScalarType, Value};
use super::header::{
    field_index_to_voffset, follow_uoffset, slot_position, voffset_to_field_index, SIZE_UOFFSET,
    SIZE_VOFFSET, VTABLE_HEADER_SIZE,
};
use super::table::Table;
use crate::contracts::check_write_in_bounds;
use crate::schema::{FieldId, FieldType, Schema, TableId};

/// A table in a mutable buffer, typed by its schema definition.
#[derive(Debug)]
pub struct MutableTable<'a> {
    buf: &'a mut [u8],
    loc: usize,
    schema: &'a Schema,
    table: TableId,
}

impl<'a> MutableTable<'a> {
    pub(crate) fn new(buf: &'a mut [u8], loc: usize, schema: &'a Schema, table: TableId) -> Self {
        Self {
            buf,
            loc,
            schema,
            table,
        }
    }

    /// Read-only view of the same table.
    pub fn as_table(&self) -> Table<'_> {
        Table::new(self.buf, self.loc)
    }

    pub fn table_id(&self) -> TableId {
        self.table
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Overwrite a present scalar or enum field.
    ///
    /// Rejected (returns `false`): unknown or deprecated field, absent field,
    /// non-scalar field, or a value whose type differs from the field's.
    pub fn mutate_field(&mut self, field: FieldId, value: Value) -> bool {
        let Some(def) = self.schema.table(self.table).and_then(|t| t.field(field)) else {
            return false;
        };
        if def.deprecated || self.schema.scalar_type(def.ty) != Some(value.scalar_type()) {
            return false;
        }
        let Some(pos) = slot_position(self.buf, self.loc, field_index_to_voffset(field)) else {
            return false;
        };
        self.write_value(pos, value)
    }

    /// Overwrite a present scalar field addressed by vtable slot.
    ///
    /// Same checks as [`mutate_field`](Self::mutate_field): `T` must be the
    /// field's declared type.
    pub fn mutate_scalar<T: Scalar>(&mut self, slot: u16, value: T) -> bool {
        let slot = slot as usize;
        if slot < VTABLE_HEADER_SIZE || slot % SIZE_VOFFSET != 0 {
            return false;
        }
        self.mutate_field(voffset_to_field_index(slot), value.to_value())
    }

    /// Overwrite member `member` of a present struct field.
    ///
    /// Rejected like [`mutate_field`](Self::mutate_field), plus an unknown
    /// member or a value whose type differs from the member's.
    pub fn mutate_struct_member(&mut self, field: FieldId, member: usize, value: Value) -> bool {
        let Some(def) = self.schema.table(self.table).and_then(|t| t.field(field)) else {
            return false;
        };
        let FieldType::Struct(id) = def.ty else {
            return false;
        };
        let Some(layout) = self.schema.struct_def(id) else {
            return false;
        };
        if def.deprecated || layout.fields.get(member).map(|m| m.ty) != Some(value.scalar_type()) {
            return false;
        }
        let Some(offset) = layout.offsets().get(member).copied() else {
            return false;
        };
        let Some(pos) = slot_position(self.buf, self.loc, field_index_to_voffset(field)) else {
            return false;
        };
        self.write_value(pos + offset, value)
    }

    /// Mutable view of a scalar vector field whose elements are `T`.
    pub fn mutable_vector<T: Scalar>(&mut self, field: FieldId) -> Option<MutableVector<'_, T>> {
        let (ty, start, len) = self.vector_span(field)?;
        if ty != T::TYPE {
            return None;
        }
        Some(MutableVector {
            buf: &mut *self.buf,
            start,
            len,
            _marker: PhantomData,
        })
    }

    /// Like [`mutable_vector`](Self::mutable_vector), keeping the full borrow.
    pub fn into_mutable_vector<T: Scalar>(self, field: FieldId) -> Option<MutableVector<'a, T>> {
        let (ty, start, len) = self.vector_span(field)?;
        if ty != T::TYPE {
            return None;
        }
        Some(MutableVector {
            buf: self.buf,
            start,
            len,
            _marker: PhantomData,
        })
    }

    /// Overwrite element `index` of a scalar vector field.
    pub fn mutate_element(&mut self, field: FieldId, index: usize, value: Value) -> bool {
        let Some((ty, start, len)) = self.vector_span(field) else {
            return false;
        };
        if ty != value.scalar_type() || index >= len {
            return false;
        }
        self.write_value(start + index * ty.width(), value)
    }

    /// Mutable view of a nested table field.
    pub fn mutable_table(&mut self, field: FieldId) -> Option<MutableTable<'_>> {
        let def = self.schema.table(self.table)?.field(field)?;
        let FieldType::Table(nested) = def.ty else {
            return None;
        };
        let holder = slot_position(self.buf, self.loc, field_index_to_voffset(field))?;
        let target = follow_uoffset(self.buf, holder)?;
        if target >= self.buf.len() {
            return None;
        }
        Some(MutableTable::new(&mut *self.buf, target, self.schema, nested))
    }

    /// Element type, first element position and length of a scalar vector field.
    fn vector_span(&self, field: FieldId) -> Option<(ScalarType, usize, usize)> {
        let def = self.schema.table(self.table)?.field(field)?;
        if def.deprecated {
            return None;
        }
        let FieldType::Vector(element) = def.ty else {
            return None;
        };
        let ty = self.schema.element_scalar_type(element)?;
        let holder = slot_position(self.buf, self.loc, field_index_to_voffset(field))?;
        let loc = follow_uoffset(self.buf, holder)?;
        let len = read_scalar_at::<u32>(self.buf, loc)? as usize;
        let start = loc.checked_add(SIZE_UOFFSET)?;
        let end = len.checked_mul(ty.width())?.checked_add(start)?;
        (end <= self.buf.len()).then_some((ty, start, len))
    }

    fn write_value(&mut self, pos: usize, value: Value) -> bool {
        let width = value.width();
        match pos.checked_add(width) {
            Some(end) if end <= self.buf.len() => {
                check_write_in_bounds(pos, width, self.buf.len());
                value.write_le(&mut self.buf[pos..end]);
                true
            }
            _ => false,
        }
    }
}

/// A scalar vector whose elements can be overwritten in place.
#[derive(Debug)]
pub struct MutableVector<'a, T: Scalar> {
    buf: &'a mut [u8],
    start: usize,
    len: usize,
    _marker: PhantomData<T>,
}

impl<T: Scalar> MutableVector<'_, T> {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }
        read_scalar_at(self.buf, self.start + index * T::WIDTH)
    }

    /// Overwrite element `index`. `false` (and no write) if out of range.
    pub fn mutate(&mut self, index: usize, value: T) -> bool {
        if index >= self.len {
            return false;
        }
        let pos = self.start + index * T::WIDTH;
        check_write_in_bounds(pos, T::WIDTH, self.buf.len());
        write_scalar_at(self.buf, pos, value)
    }
}
