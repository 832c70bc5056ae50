// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Schema building blocks: tables, structs, fields, enums, and their types.

use std::fmt;

use crate::binary::{padding_bytes, ScalarType, Value, SIZE_UOFFSET};

/// Index of a table within its [`Schema`](super::Schema).
pub type TableId = usize;

/// Index of an enum within its [`Schema`](super::Schema).
pub type EnumId = usize;

/// Index of a struct within its [`Schema`](super::Schema).
pub type StructId = usize;

/// Index of a field within its table. Also its vtable slot number.
pub type FieldId = usize;

// ============================================================================
// TYPES
// ============================================================================

/// What a field holds on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Fixed-width scalar stored inline.
    Scalar(ScalarType),
    /// Enum stored inline as its underlying integer.
    Enum(EnumId),
    /// uoffset to a length-prefixed, NUL-terminated UTF-8 string.
    String,
    /// uoffset to a length-prefixed vector.
    Vector(ElementType),
    /// uoffset to a nested table.
    Table(TableId),
    /// Fixed-size struct stored inline, all members present.
    Struct(StructId),
}

/// What a vector holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Scalar(ScalarType),
    Enum(EnumId),
    String,
    Table(TableId),
}

impl FieldType {
    /// Scalars and enums: one value, with a schema default when absent.
    pub fn is_fixed_width(&self) -> bool {
        matches!(self, FieldType::Scalar(_) | FieldType::Enum(_))
    }

    /// True for types whose bytes live inline in the table (and can be mutated).
    pub fn is_inline(&self) -> bool {
        self.is_fixed_width() || matches!(self, FieldType::Struct(_))
    }

    pub fn is_offset(&self) -> bool {
        !self.is_inline()
    }
}

impl ElementType {
    pub fn is_offset(&self) -> bool {
        matches!(self, ElementType::String | ElementType::Table(_))
    }
}

// ============================================================================
// DEFINITIONS
// ============================================================================

/// One named enumerator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumVal {
    pub name: String,
    pub value: i64,
}

/// An enum with an integer underlying type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    pub name: String,
    pub underlying: ScalarType,
    pub values: Vec<EnumVal>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, underlying: ScalarType) -> Self {
        Self {
            name: name.into(),
            underlying,
            values: Vec::new(),
        }
    }

    /// Append an enumerator. Scope prefixes (`ECharacterType::AI`) are stripped.
    pub fn with_value(mut self, name: &str, value: i64) -> Self {
        self.values.push(EnumVal {
            name: strip_scope_prefix(name).to_string(),
            value,
        });
        self
    }

    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.value == value)
            .map(|v| v.name.as_str())
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        let name = strip_scope_prefix(name);
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }
}

/// One struct member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: ScalarType,
}

/// A struct: scalar members laid out back to back at natural alignment,
/// padded to the widest member. Always written whole, never partly absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<StructField>,
}

impl StructDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// `struct Vec3 { x: float; y: float; z: float; }`
    pub fn vec3() -> Self {
        Self::new(VEC3_STRUCT)
            .with_field("x", ScalarType::Float)
            .with_field("y", ScalarType::Float)
            .with_field("z", ScalarType::Float)
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.fields.push(StructField {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn field_id(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Alignment of the whole struct: its widest member.
    pub fn alignment(&self) -> usize {
        self.fields.iter().map(|f| f.ty.width()).max().unwrap_or(1)
    }

    /// Byte offset of each member from the start of the struct.
    pub fn offsets(&self) -> Vec<usize> {
        let mut at = 0;
        self.fields
            .iter()
            .map(|f| {
                let width = f.ty.width();
                at += padding_bytes(at, width);
                let offset = at;
                at += width;
                offset
            })
            .collect()
    }

    /// Inline size, trailing padding included.
    pub fn size(&self) -> usize {
        let end = self
            .fields
            .iter()
            .zip(self.offsets())
            .map(|(f, offset)| offset + f.ty.width())
            .max()
            .unwrap_or(0);
        end + padding_bytes(end, self.alignment())
    }
}

/// Name of the built-in 3-float vector struct.
pub const VEC3_STRUCT: &str = "Vec3";

/// One table field. Its position in [`TableDef::fields`] is its id.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub ty: FieldType,
    /// Explicit default for scalar and enum fields. `None` means zero.
    pub default: Option<Value>,
    /// Deprecated fields keep their slot but can't be written or mutated.
    pub deprecated: bool,
    /// Extra attributes carried through to `.fbs` output (e.g. `priority: 1`).
    pub attributes: Vec<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            deprecated: false,
            attributes: Vec::new(),
        }
    }

    pub fn scalar(name: impl Into<String>, ty: ScalarType) -> Self {
        Self::new(name, FieldType::Scalar(ty))
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn vector(name: impl Into<String>, element: ElementType) -> Self {
        Self::new(name, FieldType::Vector(element))
    }

    pub fn enumeration(name: impl Into<String>, id: EnumId) -> Self {
        Self::new(name, FieldType::Enum(id))
    }

    pub fn table(name: impl Into<String>, id: TableId) -> Self {
        Self::new(name, FieldType::Table(id))
    }

    pub fn structure(name: impl Into<String>, id: StructId) -> Self {
        Self::new(name, FieldType::Struct(id))
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }
}

/// A table: an ordered list of fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, id: FieldId) -> Option<&FieldDef> {
        self.fields.get(id)
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// "ECharacterType::AI" -> "AI"; names without a scope pass through.
pub fn strip_scope_prefix(name: &str) -> &str {
    name.rsplit("::").next().unwrap_or(name)
}

/// Inline width of an offset-typed field.
pub(crate) const OFFSET_WIDTH: usize = SIZE_UOFFSET;

// ============================================================================
// ERRORS
// ============================================================================

/// Why a schema description was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The JSON description could not be parsed.
    Parse(String),
    /// Two tables, two enums, or two fields of one table share a name.
    DuplicateName { kind: &'static str, name: String },
    /// A field's type names nothing known.
    UnknownType { field: String, type_name: String },
    /// Enums need an integer underlying type.
    InvalidEnumUnderlying { name: String, underlying: String },
    /// An enumerator value doesn't fit the underlying type.
    InvalidEnumValue {
        enum_name: String,
        value_name: String,
        value: i64,
    },
    /// A default that doesn't parse for the field's type, or a default on an
    /// offset-typed field.
    InvalidDefault { field: String, default: String },
    /// `root_type` names no table.
    UnknownRootType { name: String },
    /// A field or root id is out of range.
    InvalidReference { what: &'static str, index: usize },
    /// More fields than a vtable can address.
    TooManyFields { table: String, count: usize },
    /// Structs need at least one member.
    EmptyStruct { name: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::Parse(msg) => write!(f, "invalid schema description: {}", msg),
            SchemaError::DuplicateName { kind, name } => {
                write!(f, "duplicate {} name '{}'", kind, name)
            }
            SchemaError::UnknownType { field, type_name } => {
                write!(f, "field '{}' has unknown type '{}'", field, type_name)
            }
            SchemaError::InvalidEnumUnderlying { name, underlying } => write!(
                f,
                "enum '{}' has non-integer underlying type '{}'",
                name, underlying
            ),
            SchemaError::InvalidEnumValue {
                enum_name,
                value_name,
                value,
            } => write!(
                f,
                "enum '{}' value {} = {} does not fit its underlying type",
                enum_name, value_name, value
            ),
            SchemaError::InvalidDefault { field, default } => {
                write!(f, "field '{}' has invalid default '{}'", field, default)
            }
            SchemaError::UnknownRootType { name } => {
                write!(f, "root_type '{}' is not a table", name)
            }
            SchemaError::InvalidReference { what, index } => {
                write!(f, "{} index {} is out of range", what, index)
            }
            SchemaError::TooManyFields { table, count } => {
                write!(f, "table '{}' has {} fields, more than a vtable can hold", table, count)
            }
            SchemaError::EmptyStruct { name } => write!(f, "struct '{}' has no members", name),
        }
    }
}

impl std::error::Error for SchemaError {}
