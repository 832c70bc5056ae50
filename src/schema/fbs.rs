// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! `.fbs` text output.
//!
//! Writes a schema the way `flatc` reads it, in a fixed order: namespace,
//! file attributes, enums (one line each), structs, tables, `root_type`.

use super::types::{EnumDef, FieldDef, FieldType, StructDef, TableDef};
use super::Schema;
use crate::binary::Value;

impl Schema {
    pub fn to_fbs(&self) -> String {
        let mut out = String::new();

        if !self.namespace.trim().is_empty() {
            out.push_str(&format!("namespace {};\n\n", self.namespace));
        }

        for attr in &self.attributes {
            out.push_str(&format!("attribute \"{}\";\n", attr));
        }
        if !self.attributes.is_empty() {
            out.push('\n');
        }

        let blocks = self
            .enums
            .iter()
            .map(render_enum)
            .chain(self.structs.iter().map(render_struct))
            .chain(self.tables.iter().map(|t| self.render_table(t)));
        for block in blocks {
            out.push_str(&block);
            out.push('\n');
        }

        if let Some(root) = self.root_table().and_then(|id| self.table(id)) {
            out.push_str(&format!("root_type {};\n", root.name));
        }

        out.trim_end().to_string()
    }

    fn render_table(&self, table: &TableDef) -> String {
        let body: String = table
            .fields
            .iter()
            .map(|field| format!("  {};\n", self.render_field(field)))
            .collect();
        format!("table {} {{\n{}}}", table.name, body)
    }

    /// `name: type = default (attributes)`, without the semicolon.
    fn render_field(&self, field: &FieldDef) -> String {
        let mut line = format!("{}: {}", field.name, self.type_name(field.ty));
        if let Some(default) = field.default {
            line.push_str(" = ");
            line.push_str(&self.render_default(field.ty, default));
        }
        let mut attrs: Vec<&str> = Vec::new();
        if field.deprecated {
            attrs.push("deprecated");
        }
        attrs.extend(field.attributes.iter().map(String::as_str));
        if !attrs.is_empty() {
            line.push_str(&format!(" ({})", attrs.join(", ")));
        }
        line
    }

    /// Enum defaults print as the enumerator name when there is one.
    fn render_default(&self, ty: FieldType, default: Value) -> String {
        if let FieldType::Enum(id) = ty {
            let name = self
                .enum_def(id)
                .zip(default.as_i64())
                .and_then(|(e, v)| e.name_of(v));
            if let Some(name) = name {
                return name.to_string();
            }
        }
        default.to_string()
    }
}

fn render_enum(e: &EnumDef) -> String {
    let values: Vec<String> = e
        .values
        .iter()
        .map(|v| format!("{} = {}", v.name, v.value))
        .collect();
    format!(
        "enum {} : {} {{ {} }}",
        e.name,
        e.underlying.fbs_name(),
        values.join(", ")
    )
}

fn render_struct(st: &StructDef) -> String {
    let body: String = st
        .fields
        .iter()
        .map(|f| format!("  {}: {};\n", f.name, f.ty.fbs_name()))
        .collect();
    format!("struct {} {{\n{}}}", st.name, body)
}
