// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Schema model: the shared, immutable description of a message type.
//!
//! A [`Schema`] names its tables, structs and enums, gives every table field a type and
//! a default, and fixes each field's vtable slot (its index in the table).
//! Builders, the verifier, the mutable accessor and reflection all consult
//! the same `Schema`; none of them keep their own copy of field layout.
//!
//! Schemas come from Rust code (the builder-style `with_*` methods) or from a
//! JSON description ([`SchemaDef`]). Either way [`Schema::validate`] must pass
//! before the schema is used; [`Schema::from_def`] runs it for you.

mod def;
mod fbs;
mod types;

pub use def::{
    EnumDesc, EnumValueDesc, FieldDesc, SchemaDef, StructDesc, StructFieldDesc, TableDesc,
};
pub use types::{
    strip_scope_prefix, ElementType, EnumDef, EnumId, EnumVal, FieldDef, FieldId, FieldType,
    SchemaError, StructDef, StructField, StructId, TableDef, TableId, VEC3_STRUCT,
};

use std::collections::HashSet;

use crate::binary::{ScalarType, Value, MAX_FIELD_COUNT};
use types::OFFSET_WIDTH;

/// A complete schema: namespace, enums, structs, tables, and the root table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schema {
    pub namespace: String,
    /// File-level attribute declarations (`attribute "priority";`).
    pub attributes: Vec<String>,
    pub enums: Vec<EnumDef>,
    pub structs: Vec<StructDef>,
    pub tables: Vec<TableDef>,
    /// Root table. When unset, the last declared table is the root.
    pub root_type: Option<TableId>,
}

impl Schema {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    pub fn with_enum(mut self, def: EnumDef) -> Self {
        self.enums.push(def);
        self
    }

    pub fn with_struct(mut self, def: StructDef) -> Self {
        self.structs.push(def);
        self
    }

    pub fn with_table(mut self, def: TableDef) -> Self {
        self.tables.push(def);
        self
    }

    pub fn with_root(mut self, table: TableId) -> Self {
        self.root_type = Some(table);
        self
    }

    /// Parse and validate a JSON schema description.
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        let def: SchemaDef =
            serde_json::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::from_def(&def)
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn table(&self, id: TableId) -> Option<&TableDef> {
        self.tables.get(id)
    }

    pub fn enum_def(&self, id: EnumId) -> Option<&EnumDef> {
        self.enums.get(id)
    }

    pub fn struct_def(&self, id: StructId) -> Option<&StructDef> {
        self.structs.get(id)
    }

    pub fn struct_id(&self, name: &str) -> Option<StructId> {
        self.structs.iter().position(|s| s.name == name)
    }

    pub fn table_id(&self, name: &str) -> Option<TableId> {
        self.tables.iter().position(|t| t.name == name)
    }

    pub fn enum_id(&self, name: &str) -> Option<EnumId> {
        self.enums.iter().position(|e| e.name == name)
    }

    /// The root table: `root_type` if set, otherwise the last table.
    pub fn root_table(&self) -> Option<TableId> {
        self.root_type
            .or_else(|| self.tables.len().checked_sub(1))
            .filter(|&id| id < self.tables.len())
    }

    pub fn field(&self, table: TableId, field: FieldId) -> Option<&FieldDef> {
        self.table(table)?.field(field)
    }

    // ------------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------------

    /// Wire scalar type of a fixed-width field (enums resolve to their
    /// underlying type). `None` for strings, vectors and tables.
    pub fn scalar_type(&self, ty: FieldType) -> Option<ScalarType> {
        match ty {
            FieldType::Scalar(st) => Some(st),
            FieldType::Enum(id) => self.enum_def(id).map(|e| e.underlying),
            _ => None,
        }
    }

    /// Wire scalar type of a vector element. `None` for strings and tables.
    pub fn element_scalar_type(&self, element: ElementType) -> Option<ScalarType> {
        match element {
            ElementType::Scalar(st) => Some(st),
            ElementType::Enum(id) => self.enum_def(id).map(|e| e.underlying),
            _ => None,
        }
    }

    /// Bytes a field of this type takes inside its table.
    pub fn inline_width(&self, ty: FieldType) -> usize {
        if let FieldType::Struct(id) = ty {
            return self.struct_def(id).map_or(0, StructDef::size);
        }
        self.scalar_type(ty).map_or(OFFSET_WIDTH, ScalarType::width)
    }

    /// Alignment a field of this type needs inside its table.
    pub fn inline_alignment(&self, ty: FieldType) -> usize {
        if let FieldType::Struct(id) = ty {
            return self.struct_def(id).map_or(1, StructDef::alignment);
        }
        self.inline_width(ty)
    }

    /// Bytes one element of this type takes inside a vector.
    pub fn element_width(&self, element: ElementType) -> usize {
        self.element_scalar_type(element)
            .map_or(OFFSET_WIDTH, ScalarType::width)
    }

    /// Effective default of a fixed-width field: the declared default, or
    /// zero. `None` for non-scalar fields.
    pub fn field_default(&self, table: TableId, field: FieldId) -> Option<Value> {
        let def = self.field(table, field)?;
        let st = self.scalar_type(def.ty)?;
        Some(def.default.unwrap_or(st.zero()))
    }

    /// `.fbs` spelling of a field type.
    pub fn type_name(&self, ty: FieldType) -> String {
        match ty {
            FieldType::Scalar(st) => st.fbs_name().to_string(),
            FieldType::Enum(id) => self.enum_name(id),
            FieldType::String => "string".to_string(),
            FieldType::Vector(element) => format!("[{}]", self.element_type_name(element)),
            FieldType::Table(id) => self.table_name(id),
            FieldType::Struct(id) => self
                .struct_def(id)
                .map_or_else(|| format!("struct#{}", id), |s| s.name.clone()),
        }
    }

    pub fn element_type_name(&self, element: ElementType) -> String {
        match element {
            ElementType::Scalar(st) => st.fbs_name().to_string(),
            ElementType::Enum(id) => self.enum_name(id),
            ElementType::String => "string".to_string(),
            ElementType::Table(id) => self.table_name(id),
        }
    }

    fn enum_name(&self, id: EnumId) -> String {
        self.enum_def(id)
            .map_or_else(|| format!("enum#{}", id), |e| e.name.clone())
    }

    fn table_name(&self, id: TableId) -> String {
        self.table(id)
            .map_or_else(|| format!("table#{}", id), |t| t.name.clone())
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Check internal consistency: unique names, resolvable references,
    /// integer enums, defaults that fit their fields, addressable field counts.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut names = HashSet::new();
        for e in &self.enums {
            if !names.insert(e.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    kind: "enum",
                    name: e.name.clone(),
                });
            }
            self.validate_enum(e)?;
        }
        for st in &self.structs {
            if !names.insert(st.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    kind: "struct",
                    name: st.name.clone(),
                });
            }
            validate_struct(st)?;
        }
        for t in &self.tables {
            if !names.insert(t.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    kind: "table",
                    name: t.name.clone(),
                });
            }
            self.validate_table(t)?;
        }
        if let Some(root) = self.root_type {
            if root >= self.tables.len() {
                return Err(SchemaError::InvalidReference {
                    what: "root table",
                    index: root,
                });
            }
        }
        Ok(())
    }

    fn validate_enum(&self, e: &EnumDef) -> Result<(), SchemaError> {
        if !e.underlying.is_integer() {
            return Err(SchemaError::InvalidEnumUnderlying {
                name: e.name.clone(),
                underlying: e.underlying.fbs_name().to_string(),
            });
        }
        let mut seen = HashSet::new();
        for v in &e.values {
            if !seen.insert(v.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    kind: "enum value",
                    name: format!("{}.{}", e.name, v.name),
                });
            }
            if Value::from_i64(e.underlying, v.value).is_none() {
                return Err(SchemaError::InvalidEnumValue {
                    enum_name: e.name.clone(),
                    value_name: v.name.clone(),
                    value: v.value,
                });
            }
        }
        Ok(())
    }

    fn validate_table(&self, t: &TableDef) -> Result<(), SchemaError> {
        if t.fields.len() > MAX_FIELD_COUNT {
            return Err(SchemaError::TooManyFields {
                table: t.name.clone(),
                count: t.fields.len(),
            });
        }
        let mut seen = HashSet::new();
        for f in &t.fields {
            if !seen.insert(f.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    kind: "field",
                    name: format!("{}.{}", t.name, f.name),
                });
            }
            self.validate_references(f)?;
            if let Some(default) = f.default {
                if self.scalar_type(f.ty) != Some(default.scalar_type()) {
                    return Err(SchemaError::InvalidDefault {
                        field: format!("{}.{}", t.name, f.name),
                        default: default.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_references(&self, f: &FieldDef) -> Result<(), SchemaError> {
        let check_enum = |id: EnumId| {
            if id < self.enums.len() {
                Ok(())
            } else {
                Err(SchemaError::InvalidReference {
                    what: "enum",
                    index: id,
                })
            }
        };
        let check_struct = |id: StructId| {
            if id < self.structs.len() {
                Ok(())
            } else {
                Err(SchemaError::InvalidReference {
                    what: "struct",
                    index: id,
                })
            }
        };
        let check_table = |id: TableId| {
            if id < self.tables.len() {
                Ok(())
            } else {
                Err(SchemaError::InvalidReference {
                    what: "table",
                    index: id,
                })
            }
        };
        match f.ty {
            FieldType::Enum(id) | FieldType::Vector(ElementType::Enum(id)) => check_enum(id),
            FieldType::Table(id) | FieldType::Vector(ElementType::Table(id)) => check_table(id),
            FieldType::Struct(id) => check_struct(id),
            _ => Ok(()),
        }
    }
}

fn validate_struct(st: &StructDef) -> Result<(), SchemaError> {
    if st.fields.is_empty() {
        return Err(SchemaError::EmptyStruct {
            name: st.name.clone(),
        });
    }
    let mut seen = HashSet::new();
    for f in &st.fields {
        if !seen.insert(f.name.as_str()) {
            return Err(SchemaError::DuplicateName {
                kind: "struct member",
                name: format!("{}.{}", st.name, f.name),
            });
        }
    }
    Ok(())
}
