// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Back-to-front buffer construction.
//!
//! The builder fills its allocation from the end toward the start. Every
//! object is therefore written *before* anything that refers to it, and every
//! uoffset points forward. Positions are tracked as distances from the end of
//! the allocation ("rev" positions) because absolute positions keep moving as
//! the allocation grows.
//!
//! ```text
//!   allocation: [ free space ........ | root | vtable | table | "name" | [inv] ]
//!                                     ^head                               end^
//!   creation order:                      5       4        3       1       2
//! ```
//!
//! Build order is enforced by types: a table can only refer to an
//! [`Offset`] the same builder handed out earlier, and [`Builder::finish`]
//! consumes the builder so nothing can be appended once the root is set.

use std::fmt;
use std::marker::PhantomData;

use super::allocator::{AllocError, Allocator, DefaultAllocator};
use super::encoding::{padding_bytes, Scalar, ScalarType, Value};
use super::header::{
    FILE_IDENTIFIER_LENGTH, MAX_BUFFER_SIZE, MAX_FIELD_COUNT, SIZE_SOFFSET, SIZE_UOFFSET, SIZE_VOFFSET,
    VTABLE_HEADER_SIZE,
};
use crate::contracts::{check_offset_placed, check_vtable_well_formed};
use crate::schema::{ElementType, FieldId, FieldType, Schema, StructDef, TableId};

// ============================================================================
// TYPED OFFSETS
// ============================================================================

/// Marker: the offset refers to a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Str;

/// Marker: the offset refers to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRef;

/// Marker: the offset refers to a vector of `T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VectorOf<T>(PhantomData<T>);

/// What a vector element is, as far as the wire is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Scalar(ScalarType),
    String,
    Table,
}

/// What a placed object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OffsetKind {
    String,
    Vector(ElementKind),
    Table,
}

/// Types that can be a vector element.
pub trait VectorElement {
    const KIND: ElementKind;
}

macro_rules! impl_vector_element {
    ($($ty:ty),*) => {
        $(impl VectorElement for $ty {
            const KIND: ElementKind = ElementKind::Scalar(<$ty as Scalar>::TYPE);
        })*
    };
}

impl_vector_element!(bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64);

impl VectorElement for Str {
    const KIND: ElementKind = ElementKind::String;
}

impl VectorElement for TableRef {
    const KIND: ElementKind = ElementKind::Table;
}

/// Markers an [`Offset`] can carry.
pub trait Placeable {
    const KIND: OffsetKind;
}

impl Placeable for Str {
    const KIND: OffsetKind = OffsetKind::String;
}

impl Placeable for TableRef {
    const KIND: OffsetKind = OffsetKind::Table;
}

impl<T: VectorElement> Placeable for VectorOf<T> {
    const KIND: OffsetKind = OffsetKind::Vector(T::KIND);
}

/// Handle to an object already written by a [`Builder`].
///
/// Only the builder creates these, so holding one proves the object exists.
/// The inner value is the object's distance from the end of the buffer.
pub struct Offset<T> {
    rev: u32,
    _marker: PhantomData<T>,
}

impl<T> Offset<T> {
    fn new(rev: u32) -> Self {
        Self {
            rev,
            _marker: PhantomData,
        }
    }

    /// Distance from the end of the buffer to the object.
    pub fn value(&self) -> u32 {
        self.rev
    }
}

impl<T> Clone for Offset<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Offset<T> {}

impl<T> PartialEq for Offset<T> {
    fn eq(&self, other: &Self) -> bool {
        self.rev == other.rev
    }
}

impl<T> Eq for Offset<T> {}

impl<T> fmt::Debug for Offset<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset({})", self.rev)
    }
}

/// An [`Offset`] with its marker moved into a runtime tag.
///
/// Schema-driven code (reflection, the CLI) can't name marker types
/// statically, so it works with these instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedOffset {
    rev: u32,
    kind: OffsetKind,
}

impl PlacedOffset {
    pub fn kind(&self) -> OffsetKind {
        self.kind
    }

    pub fn value(&self) -> u32 {
        self.rev
    }
}

impl<T: Placeable> From<Offset<T>> for PlacedOffset {
    fn from(offset: Offset<T>) -> Self {
        Self {
            rev: offset.rev,
            kind: T::KIND,
        }
    }
}

// ============================================================================
// ERRORS
// ============================================================================

/// Builder misuse. None of these leave a half-written object behind that a
/// later `finish` could reach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The table id is not in the schema.
    UnknownTable(TableId),
    /// No field of that name (or id) in the table.
    UnknownField { table: String, field: String },
    /// Deprecated fields keep their slot but take no values.
    DeprecatedField { table: String, field: String },
    /// The value or offset doesn't match the field's declared type.
    FieldTypeMismatch {
        field: String,
        expected: String,
        found: String,
    },
    /// The offset was not produced by this builder.
    UnplacedOffset { offset: u32 },
    /// A value that can't be represented in the field (reflection input).
    InvalidValue { field: String, reason: String },
    /// A table's inline part doesn't fit the 16-bit vtable fields.
    TableTooLarge { table: String, size: usize },
    /// The vtable would need more slots than its 16-bit size can describe.
    TooManyFields { table: String, slots: usize },
    /// The buffer would exceed the signed 32-bit offset range.
    BufferTooLarge { requested: usize },
    AllocationFailed(AllocError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnknownTable(id) => write!(f, "no table with id {} in schema", id),
            BuildError::UnknownField { table, field } => {
                write!(f, "table '{}' has no field '{}'", table, field)
            }
            BuildError::DeprecatedField { table, field } => {
                write!(f, "field '{}.{}' is deprecated", table, field)
            }
            BuildError::FieldTypeMismatch {
                field,
                expected,
                found,
            } => write!(
                f,
                "field '{}' expects {}, got {}",
                field, expected, found
            ),
            BuildError::UnplacedOffset { offset } => write!(
                f,
                "offset {} was not created by this builder",
                offset
            ),
            BuildError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
            BuildError::TableTooLarge { table, size } => write!(
                f,
                "table '{}' is {} bytes inline (max {})",
                table,
                size,
                u16::MAX
            ),
            BuildError::TooManyFields { table, slots } => write!(
                f,
                "table '{}' needs {} vtable slots (max {})",
                table, slots, MAX_FIELD_COUNT
            ),
            BuildError::BufferTooLarge { requested } => write!(
                f,
                "buffer would grow to {} bytes (max {})",
                requested, MAX_BUFFER_SIZE
            ),
            BuildError::AllocationFailed(e) => write!(f, "allocation failed: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::AllocationFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AllocError> for BuildError {
    fn from(e: AllocError) -> Self {
        BuildError::AllocationFailed(e)
    }
}

// ============================================================================
// TABLE ARGUMENTS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Scalar(Value),
    Offset(PlacedOffset),
    /// Every member of a struct, in declaration order.
    Struct(Vec<Value>),
}

/// Field values for one [`Builder::create_table`] call.
///
/// Every `add_*` checks the value against the schema right away, so a
/// `TableArgs` that exists only holds well-typed values.
#[derive(Debug, Clone)]
pub struct TableArgs<'s> {
    schema: &'s Schema,
    table: TableId,
    slots: Vec<Option<Slot>>,
}

impl<'s> TableArgs<'s> {
    pub fn new(schema: &'s Schema, table: TableId) -> Result<Self, BuildError> {
        let def = schema.table(table).ok_or(BuildError::UnknownTable(table))?;
        Ok(Self {
            schema,
            table,
            slots: vec![None; def.fields.len()],
        })
    }

    pub fn table(&self) -> TableId {
        self.table
    }

    pub fn add_scalar(&mut self, field: &str, value: Value) -> Result<(), BuildError> {
        let id = self.lookup(field)?;
        self.set_scalar(id, value)
    }

    pub fn add_string(&mut self, field: &str, offset: Offset<Str>) -> Result<(), BuildError> {
        self.add_placed(field, offset.into())
    }

    pub fn add_vector<T: VectorElement>(
        &mut self,
        field: &str,
        offset: Offset<VectorOf<T>>,
    ) -> Result<(), BuildError> {
        self.add_placed(field, offset.into())
    }

    pub fn add_table(&mut self, field: &str, offset: Offset<TableRef>) -> Result<(), BuildError> {
        self.add_placed(field, offset.into())
    }

    /// Set a struct field. `members` lists every member in declaration order.
    pub fn add_struct(&mut self, field: &str, members: &[Value]) -> Result<(), BuildError> {
        let id = self.lookup(field)?;
        self.set_struct(id, members.to_vec())
    }

    pub(crate) fn add_placed(&mut self, field: &str, offset: PlacedOffset) -> Result<(), BuildError> {
        let id = self.lookup(field)?;
        self.set_offset(id, offset)
    }

    /// Set a scalar or enum field by id.
    pub(crate) fn set_scalar(&mut self, id: FieldId, value: Value) -> Result<(), BuildError> {
        let (name, ty) = self.writable(id)?;
        let expected = self.schema.scalar_type(ty);
        if expected != Some(value.scalar_type()) {
            return Err(BuildError::FieldTypeMismatch {
                field: name.to_string(),
                expected: self.schema.type_name(ty),
                found: value.scalar_type().fbs_name().to_string(),
            });
        }
        self.slots[id] = Some(Slot::Scalar(value));
        Ok(())
    }

    /// Set a struct field by id.
    pub(crate) fn set_struct(&mut self, id: FieldId, members: Vec<Value>) -> Result<(), BuildError> {
        let (name, ty) = self.writable(id)?;
        let def = match ty {
            FieldType::Struct(sid) => self.schema.struct_def(sid),
            _ => None,
        }
        .ok_or_else(|| BuildError::FieldTypeMismatch {
            field: name.to_string(),
            expected: self.schema.type_name(ty),
            found: "struct".to_string(),
        })?;
        if members.len() != def.fields.len() {
            return Err(BuildError::InvalidValue {
                field: name.to_string(),
                reason: format!(
                    "{} has {} members, got {}",
                    def.name,
                    def.fields.len(),
                    members.len()
                ),
            });
        }
        for (member, value) in def.fields.iter().zip(&members) {
            if member.ty != value.scalar_type() {
                return Err(BuildError::FieldTypeMismatch {
                    field: format!("{}.{}", name, member.name),
                    expected: member.ty.fbs_name().to_string(),
                    found: value.scalar_type().fbs_name().to_string(),
                });
            }
        }
        self.slots[id] = Some(Slot::Struct(members));
        Ok(())
    }

    /// Set a string, vector or table field by id.
    pub(crate) fn set_offset(&mut self, id: FieldId, offset: PlacedOffset) -> Result<(), BuildError> {
        let (name, ty) = self.writable(id)?;
        if !offset_matches(self.schema, ty, offset.kind) {
            return Err(BuildError::FieldTypeMismatch {
                field: name.to_string(),
                expected: self.schema.type_name(ty),
                found: describe_kind(offset.kind),
            });
        }
        self.slots[id] = Some(Slot::Offset(offset));
        Ok(())
    }

    fn lookup(&self, field: &str) -> Result<FieldId, BuildError> {
        let def = self.def_name();
        self.schema
            .table(self.table)
            .and_then(|t| t.field_id(field))
            .ok_or_else(|| BuildError::UnknownField {
                table: def,
                field: field.to_string(),
            })
    }

    fn writable(&self, id: FieldId) -> Result<(&'s str, FieldType), BuildError> {
        let table = self
            .schema
            .table(self.table)
            .ok_or(BuildError::UnknownTable(self.table))?;
        let field = table.field(id).ok_or_else(|| BuildError::UnknownField {
            table: table.name.clone(),
            field: format!("#{}", id),
        })?;
        if field.deprecated {
            return Err(BuildError::DeprecatedField {
                table: table.name.clone(),
                field: field.name.clone(),
            });
        }
        Ok((field.name.as_str(), field.ty))
    }

    fn def_name(&self) -> String {
        self.schema
            .table(self.table)
            .map(|t| t.name.clone())
            .unwrap_or_default()
    }
}

fn offset_matches(schema: &Schema, ty: FieldType, kind: OffsetKind) -> bool {
    match (ty, kind) {
        (FieldType::String, OffsetKind::String) => true,
        (FieldType::Table(_), OffsetKind::Table) => true,
        (FieldType::Vector(element), OffsetKind::Vector(found)) => match (element, found) {
            (ElementType::String, ElementKind::String) => true,
            (ElementType::Table(_), ElementKind::Table) => true,
            (ElementType::Scalar(_) | ElementType::Enum(_), ElementKind::Scalar(st)) => {
                schema.element_scalar_type(element) == Some(st)
            }
            _ => false,
        },
        _ => false,
    }
}

fn describe_kind(kind: OffsetKind) -> String {
    match kind {
        OffsetKind::String => "string".to_string(),
        OffsetKind::Table => "table".to_string(),
        OffsetKind::Vector(ElementKind::Scalar(st)) => format!("[{}]", st.fbs_name()),
        OffsetKind::Vector(ElementKind::String) => "[string]".to_string(),
        OffsetKind::Vector(ElementKind::Table) => "[table]".to_string(),
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Assembles one buffer. Consumed by [`Builder::finish`].
#[derive(Debug)]
pub struct Builder<A: Allocator = DefaultAllocator> {
    alloc: A,
    head: usize,
    min_align: usize,
    force_defaults: bool,
    /// Alignment padding written before any data. Trimmed at finish so the
    /// buffer ends on real bytes.
    trailing_pad: usize,
    /// Every object placed so far, in creation order (rev positions only grow).
    placed: Vec<PlacedOffset>,
}

impl Builder<DefaultAllocator> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::new_in(DefaultAllocator::with_capacity(capacity))
    }
}

impl Default for Builder<DefaultAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> Builder<A> {
    /// Build into host-provided memory.
    pub fn new_in(alloc: A) -> Self {
        let head = alloc.len();
        Self {
            alloc,
            head,
            min_align: 1,
            force_defaults: false,
            trailing_pad: 0,
            placed: Vec::new(),
        }
    }

    /// Write scalars even when they equal their schema default.
    pub fn force_defaults(&mut self, force: bool) {
        self.force_defaults = force;
    }

    /// Bytes written so far.
    pub fn used_space(&self) -> usize {
        self.alloc.len() - self.head
    }

    // ------------------------------------------------------------------------
    // Objects
    // ------------------------------------------------------------------------

    /// Place a length-prefixed, NUL-terminated string.
    pub fn create_string(&mut self, s: &str) -> Result<Offset<Str>, BuildError> {
        let bytes = s.as_bytes();
        self.align(bytes.len() + 1, SIZE_UOFFSET)?;
        let head = self.make_space(bytes.len() + 1)?;
        self.alloc[head..head + bytes.len()].copy_from_slice(bytes);
        self.alloc[head + bytes.len()] = 0;
        self.push_len(bytes.len())?;
        Ok(self.place(OffsetKind::String))
    }

    /// Place a vector of scalars.
    pub fn create_vector<T: Scalar + VectorElement>(
        &mut self,
        items: &[T],
    ) -> Result<Offset<VectorOf<T>>, BuildError> {
        let body = items
            .len()
            .checked_mul(T::WIDTH)
            .ok_or(BuildError::BufferTooLarge {
                requested: usize::MAX,
            })?;
        self.align(body, T::WIDTH.max(SIZE_UOFFSET))?;
        let head = self.make_space(body)?;
        for (i, item) in items.iter().enumerate() {
            let at = head + i * T::WIDTH;
            item.write_le(&mut self.alloc[at..at + T::WIDTH]);
        }
        self.push_len(items.len())?;
        Ok(self.place(OffsetKind::Vector(T::KIND)))
    }

    pub fn create_vector_of_strings(
        &mut self,
        items: &[Offset<Str>],
    ) -> Result<Offset<VectorOf<Str>>, BuildError> {
        let revs: Vec<PlacedOffset> = items.iter().map(|&o| o.into()).collect();
        self.create_offset_vector(&revs, ElementKind::String)
    }

    pub fn create_vector_of_tables(
        &mut self,
        items: &[Offset<TableRef>],
    ) -> Result<Offset<VectorOf<TableRef>>, BuildError> {
        let revs: Vec<PlacedOffset> = items.iter().map(|&o| o.into()).collect();
        self.create_offset_vector(&revs, ElementKind::Table)
    }

    /// Vector of strings or tables from type-erased offsets.
    pub(crate) fn create_offset_vector<T>(
        &mut self,
        items: &[PlacedOffset],
        element: ElementKind,
    ) -> Result<Offset<VectorOf<T>>, BuildError> {
        for item in items {
            self.check_placed(*item)?;
            if item.kind != element_offset_kind(element) {
                return Err(BuildError::FieldTypeMismatch {
                    field: "vector element".to_string(),
                    expected: describe_kind(element_offset_kind(element)),
                    found: describe_kind(item.kind),
                });
            }
        }
        self.align(items.len() * SIZE_UOFFSET, SIZE_UOFFSET)?;
        for item in items.iter().rev() {
            self.push_uoffset(item.rev)?;
        }
        self.push_len(items.len())?;
        Ok(self.place(OffsetKind::Vector(element)))
    }

    /// Vector of scalars whose element type is only known at runtime.
    pub(crate) fn create_value_vector(
        &mut self,
        ty: ScalarType,
        items: &[Value],
    ) -> Result<PlacedOffset, BuildError> {
        if let Some(bad) = items.iter().find(|v| v.scalar_type() != ty) {
            return Err(BuildError::FieldTypeMismatch {
                field: "vector element".to_string(),
                expected: ty.fbs_name().to_string(),
                found: bad.scalar_type().fbs_name().to_string(),
            });
        }
        let width = ty.width();
        self.align(items.len() * width, width.max(SIZE_UOFFSET))?;
        let head = self.make_space(items.len() * width)?;
        for (i, item) in items.iter().enumerate() {
            let at = head + i * width;
            item.write_le(&mut self.alloc[at..at + width]);
        }
        self.push_len(items.len())?;
        let offset: Offset<()> = self.place(OffsetKind::Vector(ElementKind::Scalar(ty)));
        Ok(PlacedOffset {
            rev: offset.rev,
            kind: OffsetKind::Vector(ElementKind::Scalar(ty)),
        })
    }

    /// Place a table: its inline fields, then its vtable right in front of it.
    ///
    /// Fields land in schema order at naturally aligned positions. Scalars
    /// equal to their default are left out unless `force_defaults` is on.
    pub fn create_table(&mut self, args: TableArgs<'_>) -> Result<Offset<TableRef>, BuildError> {
        let schema = args.schema;
        let def = schema
            .table(args.table)
            .ok_or(BuildError::UnknownTable(args.table))?;

        for slot in args.slots.iter().flatten() {
            if let Slot::Offset(offset) = slot {
                self.check_placed(*offset)?;
            }
        }

        let table_end = self.used_space();
        let mut fields: Vec<(FieldId, usize)> = Vec::with_capacity(args.slots.len());

        // Reverse schema order so that the first field ends up lowest.
        for (id, slot) in args.slots.iter().enumerate().rev() {
            match slot {
                Some(Slot::Scalar(value)) => {
                    let is_default = schema.field_default(args.table, id) == Some(*value);
                    if is_default && !self.force_defaults {
                        continue;
                    }
                    self.push_value(*value)?;
                }
                Some(Slot::Offset(offset)) => self.push_uoffset(offset.rev)?,
                Some(Slot::Struct(members)) => {
                    let layout = match def.field(id).map(|f| f.ty) {
                        Some(FieldType::Struct(sid)) => schema.struct_def(sid),
                        _ => None,
                    }
                    .ok_or_else(|| BuildError::UnknownField {
                        table: def.name.clone(),
                        field: format!("#{}", id),
                    })?;
                    self.push_struct(layout, members)?;
                }
                None => continue,
            }
            fields.push((id, self.used_space()));
        }

        self.align(SIZE_SOFFSET, SIZE_SOFFSET)?;
        self.make_space(SIZE_SOFFSET)?;
        let object_rev = self.used_space();
        let table_size = object_rev - table_end;
        if table_size > u16::MAX as usize {
            return Err(BuildError::TableTooLarge {
                table: def.name.clone(),
                size: table_size,
            });
        }

        let slot_count = fields.iter().map(|&(id, _)| id + 1).max().unwrap_or(0);
        let vtable_size = VTABLE_HEADER_SIZE + slot_count * SIZE_VOFFSET;
        if vtable_size > u16::MAX as usize {
            return Err(BuildError::TooManyFields {
                table: def.name.clone(),
                slots: slot_count,
            });
        }
        let mut vtable = vec![0u16; VTABLE_HEADER_SIZE / SIZE_VOFFSET + slot_count];
        vtable[0] = vtable_size as u16;
        vtable[1] = table_size as u16;
        for &(id, field_rev) in &fields {
            vtable[VTABLE_HEADER_SIZE / SIZE_VOFFSET + id] = (object_rev - field_rev) as u16;
        }
        check_vtable_well_formed(&vtable);

        self.align(vtable_size, SIZE_VOFFSET)?;
        let head = self.make_space(vtable_size)?;
        for (i, entry) in vtable.iter().enumerate() {
            let at = head + i * SIZE_VOFFSET;
            entry.write_le(&mut self.alloc[at..at + SIZE_VOFFSET]);
        }
        let vtable_rev = self.used_space();

        let object_at = self.alloc.len() - object_rev;
        let soffset = (vtable_rev - object_rev) as i32;
        soffset.write_le(&mut self.alloc[object_at..object_at + SIZE_SOFFSET]);

        // The table is referenced at its soffset, not at its vtable.
        let rev = object_rev as u32;
        self.placed.push(PlacedOffset {
            rev,
            kind: OffsetKind::Table,
        });
        Ok(Offset::new(rev))
    }

    // ------------------------------------------------------------------------
    // Finishing
    // ------------------------------------------------------------------------

    /// Write the root offset and hand back the finished bytes.
    pub fn finish(self, root: Offset<TableRef>) -> Result<FinishedBuffer<A>, BuildError> {
        self.finish_inner(root, None)
    }

    /// Like [`finish`](Self::finish), with a 4-byte file identifier after the root offset.
    pub fn finish_with_identifier(
        self,
        root: Offset<TableRef>,
        identifier: [u8; FILE_IDENTIFIER_LENGTH],
    ) -> Result<FinishedBuffer<A>, BuildError> {
        self.finish_inner(root, Some(identifier))
    }

    fn finish_inner(
        mut self,
        root: Offset<TableRef>,
        identifier: Option<[u8; FILE_IDENTIFIER_LENGTH]>,
    ) -> Result<FinishedBuffer<A>, BuildError> {
        self.check_placed(root.into())?;
        let id_len = identifier.map_or(0, |_| FILE_IDENTIFIER_LENGTH);
        let alignment = self.min_align.max(SIZE_UOFFSET);
        self.align(SIZE_UOFFSET + id_len, alignment)?;
        if let Some(id) = identifier {
            let head = self.make_space(FILE_IDENTIFIER_LENGTH)?;
            self.alloc[head..head + FILE_IDENTIFIER_LENGTH].copy_from_slice(&id);
        }
        self.push_uoffset(root.rev)?;

        let end = self.alloc.len() - self.trailing_pad;
        Ok(FinishedBuffer {
            head: self.head,
            end,
            alloc: self.alloc,
        })
    }

    // ------------------------------------------------------------------------
    // Low-level writes
    // ------------------------------------------------------------------------

    fn place<T>(&mut self, kind: OffsetKind) -> Offset<T> {
        let rev = self.used_space() as u32;
        self.placed.push(PlacedOffset { rev, kind });
        Offset::new(rev)
    }

    fn check_placed(&self, offset: PlacedOffset) -> Result<(), BuildError> {
        let found = self
            .placed
            .binary_search_by_key(&offset.rev, |p| p.rev)
            .ok()
            .and_then(|i| self.placed.get(i))
            .is_some_and(|p| p.kind == offset.kind);
        if found {
            Ok(())
        } else {
            Err(BuildError::UnplacedOffset { offset: offset.rev })
        }
    }

    fn push_value(&mut self, value: Value) -> Result<(), BuildError> {
        let width = value.width();
        self.align(width, width)?;
        let head = self.make_space(width)?;
        value.write_le(&mut self.alloc[head..head + width]);
        Ok(())
    }

    /// Write a struct inline, padding between members zeroed.
    fn push_struct(&mut self, def: &StructDef, members: &[Value]) -> Result<(), BuildError> {
        let size = def.size();
        self.align(size, def.alignment())?;
        let head = self.make_space(size)?;
        self.alloc[head..head + size].fill(0);
        for (value, offset) in members.iter().zip(def.offsets()) {
            let at = head + offset;
            value.write_le(&mut self.alloc[at..at + value.width()]);
        }
        Ok(())
    }

    fn push_len(&mut self, len: usize) -> Result<(), BuildError> {
        let len = u32::try_from(len).map_err(|_| BuildError::BufferTooLarge { requested: len })?;
        self.align(SIZE_UOFFSET, SIZE_UOFFSET)?;
        let head = self.make_space(SIZE_UOFFSET)?;
        len.write_le(&mut self.alloc[head..head + SIZE_UOFFSET]);
        Ok(())
    }

    /// Write a uoffset pointing at the object `target_rev` bytes from the end.
    fn push_uoffset(&mut self, target_rev: u32) -> Result<(), BuildError> {
        self.align(SIZE_UOFFSET, SIZE_UOFFSET)?;
        let head = self.make_space(SIZE_UOFFSET)?;
        check_offset_placed(target_rev, self.used_space());
        let value = (self.used_space() - target_rev as usize) as u32;
        value.write_le(&mut self.alloc[head..head + SIZE_UOFFSET]);
        Ok(())
    }

    /// Pad so that after writing `len` more bytes the write position is a
    /// multiple of `alignment`.
    fn align(&mut self, len: usize, alignment: usize) -> Result<(), BuildError> {
        self.min_align = self.min_align.max(alignment);
        let used = self.used_space();
        let pad = padding_bytes(used.wrapping_add(len), alignment);
        if pad == 0 {
            return Ok(());
        }
        let head = self.make_space(pad)?;
        self.alloc[head..head + pad].fill(0);
        if used == 0 {
            self.trailing_pad = pad;
        }
        Ok(())
    }

    /// Reserve `want` bytes in front of the head and return the new head.
    fn make_space(&mut self, want: usize) -> Result<usize, BuildError> {
        let requested = self
            .used_space()
            .checked_add(want)
            .filter(|&n| n <= MAX_BUFFER_SIZE)
            .ok_or(BuildError::BufferTooLarge {
                requested: self.used_space().saturating_add(want),
            })?;
        while self.head < want {
            let old_len = self.alloc.len();
            self.alloc.grow_downwards()?;
            self.head += self.alloc.len() - old_len;
        }
        debug_assert!(self.alloc.len() - self.head + want == requested);
        self.head -= want;
        Ok(self.head)
    }
}

fn element_offset_kind(element: ElementKind) -> OffsetKind {
    match element {
        ElementKind::Table => OffsetKind::Table,
        _ => OffsetKind::String,
    }
}

// ============================================================================
// FINISHED BUFFER
// ============================================================================

/// The output of [`Builder::finish`]: immutable layout, owned bytes.
#[derive(Debug)]
pub struct FinishedBuffer<A: Allocator = DefaultAllocator> {
    alloc: A,
    head: usize,
    end: usize,
}

impl<A: Allocator> FinishedBuffer<A> {
    pub fn data(&self) -> &[u8] {
        &self.alloc[self.head..self.end]
    }

    /// Mutable view for in-place edits. The length can't change.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.alloc[self.head..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.head
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The allocator and the `[head, end)` range holding the buffer.
    pub fn into_parts(self) -> (A, usize, usize) {
        (self.alloc, self.head, self.end)
    }
}

impl FinishedBuffer<DefaultAllocator> {
    pub fn into_vec(self) -> Vec<u8> {
        let mut bytes = self.alloc.into_inner();
        bytes.truncate(self.end);
        bytes.drain(..self.head);
        bytes
    }
}

impl<A: Allocator> AsRef<[u8]> for FinishedBuffer<A> {
    fn as_ref(&self) -> &[u8] {
        self.data()
    }
}
