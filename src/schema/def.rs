// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! JSON schema descriptions.
//!
//! A [`SchemaDef`] names everything by string and is what hosts hand us. It
//! is resolved into a [`Schema`] (ids instead of names) by
//! [`Schema::from_def`], which also normalizes it the way `.fbs` generation
//! expects: field names lower-cased, enumerator scope prefixes stripped,
//! implicit enumerator values counted up from the previous one. A field of
//! type `Vec3` with no declaration of its own gets the built-in
//! `struct Vec3 { x: float; y: float; z: float; }`.
//!
//! ```json
//! {
//!   "namespace": "Game",
//!   "enums": [{ "name": "Kind", "underlying": "byte", "values": [{ "name": "A" }] }],
//!   "structs": [{ "name": "Span", "fields": [{ "name": "start", "type": "ushort" }] }],
//!   "tables": [{ "name": "Item", "fields": [{ "name": "Hp", "type": "int", "default": 100 }] }],
//!   "root_type": "Item"
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::types::{
    strip_scope_prefix, ElementType, EnumDef, FieldDef, FieldType, SchemaError, StructDef,
    TableDef, VEC3_STRUCT,
};
use super::Schema;
use crate::binary::{ScalarType, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDef {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub attributes: Vec<String>,
    #[serde(default)]
    pub enums: Vec<EnumDesc>,
    #[serde(default)]
    pub structs: Vec<StructDesc>,
    pub tables: Vec<TableDesc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumDesc {
    pub name: String,
    #[serde(default = "default_underlying")]
    pub underlying: String,
    pub values: Vec<EnumValueDesc>,
}

fn default_underlying() -> String {
    "byte".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumValueDesc {
    pub name: String,
    /// Omitted values continue from the previous enumerator (first is 0).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructDesc {
    pub name: String,
    pub fields: Vec<StructFieldDesc>,
}

/// Struct members are scalars and take no defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StructFieldDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDesc {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDesc {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Number, bool, or string (an enumerator name for enum fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub attributes: Vec<String>,
}

impl Schema {
    /// Resolve names and validate.
    pub fn from_def(def: &SchemaDef) -> Result<Self, SchemaError> {
        let mut schema = Schema::new(def.namespace.clone());
        schema.attributes = def.attributes.clone();

        for e in &def.enums {
            schema.enums.push(resolve_enum(e)?);
        }
        for st in &def.structs {
            schema.structs.push(resolve_struct(st)?);
        }
        if needs_builtin_vec3(def) {
            schema.structs.push(StructDef::vec3());
        }
        // Names first, so fields can refer to tables declared later.
        for t in &def.tables {
            schema.tables.push(TableDef::new(t.name.clone()));
        }
        for (id, t) in def.tables.iter().enumerate() {
            let fields = t
                .fields
                .iter()
                .map(|f| resolve_field(&schema, &t.name, f))
                .collect::<Result<Vec<_>, _>>()?;
            schema.tables[id].fields = fields;
        }

        if let Some(root) = &def.root_type {
            let id = schema
                .table_id(root)
                .ok_or_else(|| SchemaError::UnknownRootType { name: root.clone() })?;
            schema.root_type = Some(id);
        }

        schema.validate()?;
        Ok(schema)
    }
}

fn resolve_enum(desc: &EnumDesc) -> Result<EnumDef, SchemaError> {
    let underlying = ScalarType::from_name(&desc.underlying)
        .filter(|st| st.is_integer())
        .ok_or_else(|| SchemaError::InvalidEnumUnderlying {
            name: desc.name.clone(),
            underlying: desc.underlying.clone(),
        })?;
    let mut def = EnumDef::new(desc.name.clone(), underlying);
    let mut next = 0i64;
    for v in &desc.values {
        let value = v.value.unwrap_or(next);
        def = def.with_value(&v.name, value);
        next = value.saturating_add(1);
    }
    Ok(def)
}

fn resolve_struct(desc: &StructDesc) -> Result<StructDef, SchemaError> {
    desc.fields.iter().try_fold(StructDef::new(desc.name.clone()), |st, f| {
        let ty = ScalarType::from_name(&f.ty).ok_or_else(|| SchemaError::UnknownType {
            field: format!("{}.{}", desc.name, f.name),
            type_name: f.ty.clone(),
        })?;
        Ok(st.with_field(f.name.to_lowercase(), ty))
    })
}

/// Some field says `Vec3` and nothing else is called that.
fn needs_builtin_vec3(def: &SchemaDef) -> bool {
    let declared = def.structs.iter().any(|s| s.name == VEC3_STRUCT)
        || def.tables.iter().any(|t| t.name == VEC3_STRUCT)
        || def.enums.iter().any(|e| e.name == VEC3_STRUCT);
    !declared
        && def
            .tables
            .iter()
            .flat_map(|t| &t.fields)
            .any(|f| f.ty.trim() == VEC3_STRUCT)
}

fn resolve_field(schema: &Schema, table: &str, desc: &FieldDesc) -> Result<FieldDef, SchemaError> {
    let name = desc.name.to_lowercase();
    let qualified = format!("{}.{}", table, name);
    let ty = resolve_type(schema, &desc.ty).ok_or_else(|| SchemaError::UnknownType {
        field: qualified.clone(),
        type_name: desc.ty.clone(),
    })?;

    let mut field = FieldDef::new(name, ty);
    field.deprecated = desc.deprecated;
    field.attributes = desc.attributes.clone();
    if let Some(raw) = &desc.default {
        let invalid = || SchemaError::InvalidDefault {
            field: qualified.clone(),
            default: raw.to_string(),
        };
        field.default = Some(resolve_default(schema, ty, raw).ok_or_else(invalid)?);
    }
    Ok(field)
}

/// `int`, `MyEnum`, `MyTable`, `string`, `[ubyte]`, `[MyTable]`, ...
fn resolve_type(schema: &Schema, name: &str) -> Option<FieldType> {
    let name = name.trim();
    if let Some(inner) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
        let element = match resolve_type(schema, inner)? {
            FieldType::Scalar(st) => ElementType::Scalar(st),
            FieldType::Enum(id) => ElementType::Enum(id),
            FieldType::String => ElementType::String,
            FieldType::Table(id) => ElementType::Table(id),
            // Vectors of vectors (or of structs) aren't representable.
            FieldType::Vector(_) | FieldType::Struct(_) => return None,
        };
        return Some(FieldType::Vector(element));
    }
    if name == "string" {
        return Some(FieldType::String);
    }
    if let Some(id) = schema.enum_id(name) {
        return Some(FieldType::Enum(id));
    }
    if let Some(id) = schema.struct_id(name) {
        return Some(FieldType::Struct(id));
    }
    if let Some(id) = schema.table_id(name) {
        return Some(FieldType::Table(id));
    }
    ScalarType::from_name(name).map(FieldType::Scalar)
}

fn resolve_default(schema: &Schema, ty: FieldType, raw: &serde_json::Value) -> Option<Value> {
    let st = schema.scalar_type(ty)?;
    if let (FieldType::Enum(id), serde_json::Value::String(text)) = (ty, raw) {
        let e = schema.enum_def(id)?;
        if let Some(v) = e.value_of(strip_scope_prefix(text)) {
            return Value::from_i64(st, v);
        }
    }
    match raw {
        serde_json::Value::Bool(b) if st == ScalarType::Bool => Some(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(v) = n.as_i64() {
                Value::from_i64(st, v)
            } else if let Some(v) = n.as_u64() {
                Value::from_u64(st, v)
            } else {
                Value::from_f64(st, n.as_f64()?)
            }
        }
        serde_json::Value::String(text) => Value::parse(st, text),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHARACTER: &str = r#"{
        "namespace": "TestingFlatBuffers.FCheckFlatBuffer",
        "attributes": ["priority"],
        "enums": [{
            "name": "ECharacterType",
            "underlying": "uint8",
            "values": [
                { "name": "ECharacterType::UseDefault" },
                { "name": "ECharacterType::Player" },
                { "name": "AI" },
                { "name": "Hidden", "value": 3 }
            ]
        }],
        "tables": [{
            "name": "FCheckFlatBuffer",
            "fields": [
                { "name": "Mana", "type": "int", "default": 150 },
                { "name": "HP", "type": "int", "default": "100" },
                { "name": "Name", "type": "string" },
                { "name": "Inventory", "type": "[ubyte]" },
                { "name": "ChType", "type": "ECharacterType", "default": "Player" }
            ]
        }]
    }"#;

    #[test]
    fn test_resolves_character_description() {
        let schema = Schema::from_json(CHARACTER).unwrap();
        let e = &schema.enums[0];
        assert_eq!(e.underlying, ScalarType::UByte);
        assert_eq!(e.values[0].name, "UseDefault");
        assert_eq!(e.value_of("AI"), Some(2));
        let t = &schema.tables[0];
        assert_eq!(t.field_id("hp"), Some(1));
        assert_eq!(t.fields[3].ty, FieldType::Vector(ElementType::Scalar(ScalarType::UByte)));
        assert_eq!(schema.field_default(0, 1), Some(Value::Int(100)));
        assert_eq!(schema.field_default(0, 4), Some(Value::UByte(1)));
        assert_eq!(schema.root_table(), Some(0));
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{ "tables": [{ "name": "T", "fields": [{ "name": "x", "type": "Nope" }] }] }"#;
        assert!(matches!(
            Schema::from_json(json),
            Err(SchemaError::UnknownType { .. })
        ));
        let nested = r#"{ "tables": [{ "name": "T", "fields": [{ "name": "x", "type": "[[int]]" }] }] }"#;
        assert!(Schema::from_json(nested).is_err());
    }

    #[test]
    fn test_bad_default_and_root_rejected() {
        let json = r#"{ "tables": [{ "name": "T", "fields": [{ "name": "x", "type": "byte", "default": 999 }] }] }"#;
        assert!(matches!(
            Schema::from_json(json),
            Err(SchemaError::InvalidDefault { .. })
        ));
        let string_default =
            r#"{ "tables": [{ "name": "T", "fields": [{ "name": "x", "type": "string", "default": "a" }] }] }"#;
        assert!(Schema::from_json(string_default).is_err());
        let root = r#"{ "tables": [{ "name": "T" }], "root_type": "U" }"#;
        assert!(matches!(
            Schema::from_json(root),
            Err(SchemaError::UnknownRootType { .. })
        ));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        assert!(matches!(
            Schema::from_json("{ nope"),
            Err(SchemaError::Parse(_))
        ));
        assert!(matches!(
            Schema::from_json(r#"{ "tables": [], "extra": 1 }"#),
            Err(SchemaError::Parse(_))
        ));
    }

    #[test]
    fn test_structs_resolve() {
        let json = r#"{
            "structs": [{ "name": "Span", "fields": [
                { "name": "Start", "type": "ushort" },
                { "name": "len", "type": "uint32" }
            ] }],
            "tables": [{ "name": "T", "fields": [
                { "name": "span", "type": "Span" },
                { "name": "pos", "type": "Vec3" }
            ] }]
        }"#;
        let schema = Schema::from_json(json).unwrap();
        assert_eq!(schema.structs.len(), 2);
        assert_eq!(schema.structs[0].fields[0].name, "start");
        assert_eq!(schema.structs[0].fields[1].ty, ScalarType::UInt);
        assert_eq!(schema.structs[1], StructDef::vec3());
        assert_eq!(schema.tables[0].fields[0].ty, FieldType::Struct(0));
        assert_eq!(schema.tables[0].fields[1].ty, FieldType::Struct(1));
    }

    #[test]
    fn test_struct_misuse_rejected() {
        let nested = r#"{
            "structs": [{ "name": "S", "fields": [{ "name": "x", "type": "string" }] }],
            "tables": []
        }"#;
        assert!(matches!(
            Schema::from_json(nested),
            Err(SchemaError::UnknownType { .. })
        ));
        let vector = r#"{ "tables": [{ "name": "T", "fields": [{ "name": "x", "type": "[Vec3]" }] }] }"#;
        assert!(Schema::from_json(vector).is_err());
        let defaulted = r#"{ "tables": [{ "name": "T", "fields": [{ "name": "x", "type": "Vec3", "default": 1 }] }] }"#;
        assert!(matches!(
            Schema::from_json(defaulted),
            Err(SchemaError::InvalidDefault { .. })
        ));
    }

    #[test]
    fn test_tables_can_refer_forward() {
        let json = r#"{ "tables": [
            { "name": "A", "fields": [{ "name": "b", "type": "B" }] },
            { "name": "B", "fields": [] }
        ], "root_type": "A" }"#;
        let schema = Schema::from_json(json).unwrap();
        assert_eq!(schema.tables[0].fields[0].ty, FieldType::Table(1));
        assert_eq!(schema.root_table(), Some(0));
    }
}
