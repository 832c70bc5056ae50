// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Schema-driven access for tables whose types are only known at runtime.
//!
//! The generated-style accessors in [`character`](crate::character) know
//! their slots at compile time. Everything here looks fields up in a
//! [`Schema`] instead, which is what the CLI and JSON conversion need.
//!
//! ```text
//!   JSON ──from_json──▶ Builder ──finish──▶ bytes ──verify──▶ Table ──to_json──▶ JSON
//! ```

use serde_json::{Map, Number, Value as Json};

use crate::binary::{
    field_index_to_voffset, follow_uoffset, read_scalar_at, slot_position, Allocator, BuildError,
    Builder, Follow, Offset, PlacedOffset, ScalarType, Str, Table, TableArgs, TableRef, Value,
    SIZE_UOFFSET,
};
use crate::schema::{ElementType, FieldDef, FieldId, FieldType, Schema, StructId, TableId};
use crate::verify::VerifiedBuffer;

// ============================================================================
// READING
// ============================================================================

/// One field's value, typed by the schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    /// Scalar or enum. Absent fields report their default.
    Scalar(Value),
    Str(&'a str),
    Vector(RawVector<'a>),
    Table(Table<'a>, TableId),
    Struct(StructView<'a>),
    /// Absent string, vector or table; unknown or deprecated field.
    Absent,
}

/// The inline bytes of a struct field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructView<'a> {
    bytes: &'a [u8],
    id: StructId,
}

impl<'a> StructView<'a> {
    pub fn struct_id(&self) -> StructId {
        self.id
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Member `member`, decoded with the layout `schema` gives the struct.
    pub fn get(&self, schema: &Schema, member: usize) -> Option<Value> {
        let def = schema.struct_def(self.id)?;
        let ty = def.fields.get(member)?.ty;
        let offset = *def.offsets().get(member)?;
        Value::read_at(ty, self.bytes, offset)
    }
}

/// A vector whose element type comes from the schema.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawVector<'a> {
    buf: &'a [u8],
    start: usize,
    len: usize,
    element: ElementType,
    scalar: Option<ScalarType>,
}

impl<'a> RawVector<'a> {
    fn at(schema: &Schema, buf: &'a [u8], loc: usize, element: ElementType) -> Option<Self> {
        let len = read_scalar_at::<u32>(buf, loc)? as usize;
        let start = loc.checked_add(SIZE_UOFFSET)?;
        let end = len
            .checked_mul(schema.element_width(element))?
            .checked_add(start)?;
        (end <= buf.len()).then_some(Self {
            buf,
            start,
            len,
            element,
            scalar: schema.element_scalar_type(element),
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn element_type(&self) -> ElementType {
        self.element
    }

    pub fn get(&self, index: usize) -> Option<FieldValue<'a>> {
        if index >= self.len {
            return None;
        }
        match (self.element, self.scalar) {
            (ElementType::String, _) => {
                Str::follow(self.buf, self.start + index * SIZE_UOFFSET).map(FieldValue::Str)
            }
            (ElementType::Table(id), _) => TableRef::follow(self.buf, self.start + index * SIZE_UOFFSET)
                .map(|t| FieldValue::Table(t, id)),
            (_, Some(ty)) => {
                Value::read_at(ty, self.buf, self.start + index * ty.width()).map(FieldValue::Scalar)
            }
            (_, None) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = FieldValue<'a>> + '_ {
        (0..self.len).map_while(|i| self.get(i))
    }
}

/// Read field `field` of `table`, which was verified as schema table `table_id`.
pub fn read_field<'a>(
    table: Table<'a>,
    schema: &Schema,
    table_id: TableId,
    field: FieldId,
) -> FieldValue<'a> {
    let Some(def) = schema.field(table_id, field) else {
        return FieldValue::Absent;
    };
    if def.deprecated {
        return FieldValue::Absent;
    }
    let buf = table.buffer();
    let pos = slot_position(buf, table.position(), field_index_to_voffset(field));
    match def.ty {
        FieldType::Scalar(_) | FieldType::Enum(_) => {
            let Some(ty) = schema.scalar_type(def.ty) else {
                return FieldValue::Absent;
            };
            pos.and_then(|p| Value::read_at(ty, buf, p))
                .or_else(|| schema.field_default(table_id, field))
                .map_or(FieldValue::Absent, FieldValue::Scalar)
        }
        FieldType::String => pos
            .and_then(|p| Str::follow(buf, p))
            .map_or(FieldValue::Absent, FieldValue::Str),
        FieldType::Vector(element) => pos
            .and_then(|p| follow_uoffset(buf, p))
            .and_then(|loc| RawVector::at(schema, buf, loc, element))
            .map_or(FieldValue::Absent, FieldValue::Vector),
        FieldType::Table(nested) => pos
            .and_then(|p| TableRef::follow(buf, p))
            .map_or(FieldValue::Absent, |t| FieldValue::Table(t, nested)),
        FieldType::Struct(id) => {
            let size = schema.inline_width(def.ty);
            pos.and_then(|p| buf.get(p..p.checked_add(size)?))
                .map_or(FieldValue::Absent, |bytes| {
                    FieldValue::Struct(StructView { bytes, id })
                })
        }
    }
}

// ============================================================================
// TO JSON
// ============================================================================

/// Render a table as a JSON object, fields in schema order.
///
/// Absent strings, vectors and tables are left out; absent scalars appear
/// with their default. Enum values render as names when the enum knows them.
pub fn to_json(table: Table<'_>, schema: &Schema, table_id: TableId) -> Json {
    let mut out = Map::new();
    let Some(def) = schema.table(table_id) else {
        return Json::Object(out);
    };
    for (id, field) in def.fields.iter().enumerate() {
        let value = read_field(table, schema, table_id, id);
        if value == FieldValue::Absent {
            continue;
        }
        out.insert(field.name.clone(), value_to_json(value, schema, enum_of(field)));
    }
    Json::Object(out)
}

/// Render the root table of a verified buffer.
pub fn buffer_to_json(buffer: &VerifiedBuffer<'_>) -> Json {
    let root = buffer.root_handle();
    to_json(buffer.root(), buffer.schema(), root.table())
}

fn enum_of(field: &FieldDef) -> Option<usize> {
    match field.ty {
        FieldType::Enum(id) | FieldType::Vector(ElementType::Enum(id)) => Some(id),
        _ => None,
    }
}

fn value_to_json(value: FieldValue<'_>, schema: &Schema, enum_id: Option<usize>) -> Json {
    match value {
        FieldValue::Scalar(v) => scalar_to_json(v, schema, enum_id),
        FieldValue::Str(s) => Json::String(s.to_string()),
        FieldValue::Vector(v) => Json::Array(
            v.iter()
                .map(|item| value_to_json(item, schema, enum_id))
                .collect(),
        ),
        FieldValue::Table(t, id) => to_json(t, schema, id),
        FieldValue::Struct(view) => struct_to_json(view, schema),
        FieldValue::Absent => Json::Null,
    }
}

fn struct_to_json(view: StructView<'_>, schema: &Schema) -> Json {
    let mut out = Map::new();
    if let Some(def) = schema.struct_def(view.id) {
        for (i, member) in def.fields.iter().enumerate() {
            if let Some(v) = view.get(schema, i) {
                out.insert(member.name.clone(), scalar_to_json(v, schema, None));
            }
        }
    }
    Json::Object(out)
}

fn scalar_to_json(value: Value, schema: &Schema, enum_id: Option<usize>) -> Json {
    if let Some(name) = enum_id
        .and_then(|id| schema.enum_def(id))
        .zip(value.as_i64())
        .and_then(|(def, v)| def.name_of(v))
    {
        return Json::String(name.to_string());
    }
    match value {
        Value::Bool(b) => Json::Bool(b),
        Value::Byte(v) => v.into(),
        Value::UByte(v) => v.into(),
        Value::Short(v) => v.into(),
        Value::UShort(v) => v.into(),
        Value::Int(v) => v.into(),
        Value::UInt(v) => v.into(),
        Value::Long(v) => v.into(),
        Value::ULong(v) => v.into(),
        Value::Float(v) => Number::from_f64(f64::from(v)).map_or(Json::Null, Json::Number),
        Value::Double(v) => Number::from_f64(v).map_or(Json::Null, Json::Number),
    }
}

// ============================================================================
// FROM JSON
// ============================================================================

/// Build a table of type `table_id` from a JSON object.
///
/// Strict: unknown keys, deprecated fields, out-of-range numbers and unknown
/// enum names are errors. `null` counts as absent.
pub fn from_json<A: Allocator>(
    builder: &mut Builder<A>,
    schema: &Schema,
    table_id: TableId,
    json: &Json,
) -> Result<Offset<TableRef>, BuildError> {
    let def = schema
        .table(table_id)
        .ok_or(BuildError::UnknownTable(table_id))?;
    let Json::Object(object) = json else {
        return Err(invalid(&def.name, "expected a JSON object"));
    };
    let mut args = TableArgs::new(schema, table_id)?;
    for (key, value) in object {
        let id = def.field_id(key).ok_or_else(|| BuildError::UnknownField {
            table: def.name.clone(),
            field: key.clone(),
        })?;
        if value.is_null() {
            continue;
        }
        let field = &def.fields[id];
        if field.deprecated {
            return Err(BuildError::DeprecatedField {
                table: def.name.clone(),
                field: field.name.clone(),
            });
        }
        match field.ty {
            FieldType::Scalar(_) | FieldType::Enum(_) => {
                let v = json_to_scalar(schema, field.ty, value).ok_or_else(|| {
                    let reason = format!("can't store {} as {}", value, schema.type_name(field.ty));
                    invalid(&field.name, &reason)
                })?;
                args.set_scalar(id, v)?;
            }
            FieldType::Struct(sid) => {
                args.set_struct(id, json_to_struct(schema, sid, field, value)?)?;
            }
            _ => {
                let offset = place_offset(builder, schema, field, value)?;
                args.set_offset(id, offset)?;
            }
        }
    }
    builder.create_table(args)
}

/// Build a complete buffer whose root is the schema's root table.
pub fn json_to_buffer(schema: &Schema, json: &Json) -> Result<Vec<u8>, BuildError> {
    let root_id = schema.root_table().ok_or(BuildError::UnknownTable(0))?;
    let mut builder = Builder::new();
    let root = from_json(&mut builder, schema, root_id, json)?;
    Ok(builder.finish(root)?.into_vec())
}

fn place_offset<A: Allocator>(
    builder: &mut Builder<A>,
    schema: &Schema,
    field: &FieldDef,
    json: &Json,
) -> Result<PlacedOffset, BuildError> {
    match field.ty {
        FieldType::String => {
            let s = json
                .as_str()
                .ok_or_else(|| invalid(&field.name, "expected a string"))?;
            Ok(builder.create_string(s)?.into())
        }
        FieldType::Table(nested) => Ok(from_json(builder, schema, nested, json)?.into()),
        FieldType::Vector(element) => {
            let items = json
                .as_array()
                .ok_or_else(|| invalid(&field.name, "expected an array"))?;
            match element {
                ElementType::String => {
                    let mut offsets = Vec::with_capacity(items.len());
                    for item in items {
                        let s = item
                            .as_str()
                            .ok_or_else(|| invalid(&field.name, "expected an array of strings"))?;
                        offsets.push(builder.create_string(s)?);
                    }
                    Ok(builder.create_vector_of_strings(&offsets)?.into())
                }
                ElementType::Table(nested) => {
                    let mut offsets = Vec::with_capacity(items.len());
                    for item in items {
                        offsets.push(from_json(builder, schema, nested, item)?);
                    }
                    Ok(builder.create_vector_of_tables(&offsets)?.into())
                }
                ElementType::Scalar(_) | ElementType::Enum(_) => {
                    let ty = schema
                        .element_scalar_type(element)
                        .ok_or(BuildError::InvalidValue {
                            field: field.name.clone(),
                            reason: "unresolved element type".to_string(),
                        })?;
                    let as_field = match element {
                        ElementType::Enum(id) => FieldType::Enum(id),
                        _ => FieldType::Scalar(ty),
                    };
                    let values = items
                        .iter()
                        .map(|item| {
                            json_to_scalar(schema, as_field, item).ok_or_else(|| {
                                invalid(&field.name, &format!("can't store element {} as {}", item, ty))
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()?;
                    builder.create_value_vector(ty, &values)
                }
            }
        }
        FieldType::Scalar(_) | FieldType::Enum(_) | FieldType::Struct(_) => {
            Err(invalid(&field.name, "inline field has no offset"))
        }
    }
}

/// Struct members from a JSON object. Every member is required.
fn json_to_struct(
    schema: &Schema,
    id: StructId,
    field: &FieldDef,
    json: &Json,
) -> Result<Vec<Value>, BuildError> {
    let def = schema
        .struct_def(id)
        .ok_or_else(|| invalid(&field.name, "unresolved struct type"))?;
    let Json::Object(object) = json else {
        return Err(invalid(&field.name, "expected a JSON object"));
    };
    if let Some(key) = object.keys().find(|k| def.field_id(k).is_none()) {
        return Err(BuildError::UnknownField {
            table: def.name.clone(),
            field: key.clone(),
        });
    }
    def.fields
        .iter()
        .map(|member| {
            let item = object.get(&member.name).ok_or_else(|| {
                invalid(&field.name, &format!("missing struct member '{}'", member.name))
            })?;
            json_to_scalar(schema, FieldType::Scalar(member.ty), item).ok_or_else(|| {
                let reason = format!("can't store {} as {}", item, member.ty.fbs_name());
                invalid(&field.name, &reason)
            })
        })
        .collect()
}

/// Parse command-line text for a scalar or enum field (`"42"`, `"true"`, `"AI"`).
pub fn parse_scalar(schema: &Schema, ty: FieldType, text: &str) -> Option<Value> {
    json_to_scalar(schema, ty, &Json::String(text.to_string()))
}

/// Convert a JSON scalar for a scalar or enum field. Enums accept names.
fn json_to_scalar(schema: &Schema, ty: FieldType, json: &Json) -> Option<Value> {
    let scalar = schema.scalar_type(ty)?;
    match json {
        Json::Bool(b) if scalar == ScalarType::Bool => Some(Value::Bool(*b)),
        Json::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::from_u64(scalar, u)
            } else if let Some(i) = n.as_i64() {
                Value::from_i64(scalar, i)
            } else {
                Value::from_f64(scalar, n.as_f64()?)
            }
        }
        Json::String(s) => match ty {
            FieldType::Enum(id) => match schema.enum_def(id)?.value_of(s) {
                Some(value) => Value::from_i64(scalar, value),
                None => Value::parse(scalar, s),
            },
            _ => Value::parse(scalar, s),
        },
        _ => None,
    }
}

fn invalid(field: &str, reason: &str) -> BuildError {
    BuildError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}
