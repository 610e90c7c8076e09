// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use crate::schema::{Entry, FieldType, SchemaItem, TypeDefinition};
use std::fmt::Write;
use typewalk::Cardinality;

const HEADER: &str = "// THIS FILE IS GENERATED BY typewalk-gen. DO NOT EDIT.\n";

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Rust struct name for a schema type name (`sensor_reading` -> `SensorReading`).
pub fn struct_name(type_name: &str) -> String {
    type_name
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// Struct names that cannot be emitted: keywords, names that do not start
/// with a letter, and the names the generated module imports.
pub fn is_reserved_struct_name(name: &str) -> bool {
    !name.starts_with(|c: char| c.is_ascii_alphabetic())
        || KEYWORDS.contains(&name)
        || matches!(name, "Described" | "FixedString")
}

fn field_ident(name: &str) -> (String, bool) {
    if KEYWORDS.contains(&name) {
        (format!("{}_", name), true)
    } else {
        (name.to_string(), false)
    }
}

fn scalar_type(ty: &FieldType) -> String {
    match ty {
        FieldType::Int32 => "i32".to_string(),
        FieldType::Float32 => "f32".to_string(),
        FieldType::String(len) => format!("FixedString<{}>", len + 1),
        FieldType::Named(name) => struct_name(name),
    }
}

fn emit_entry(out: &mut String, entry: &Entry) {
    let (ident, renamed) = field_ident(&entry.name);
    let scalar = scalar_type(&entry.ty);

    if !entry.doc.is_empty() {
        let _ = writeln!(out, "    ///{}", entry.doc);
    }
    if renamed {
        let _ = writeln!(out, "    #[typewalk(rename = \"{}\")]", entry.name);
    }
    match entry.cardinality {
        Cardinality::Single => {
            let _ = writeln!(out, "    pub {}: {},", ident, scalar);
        }
        Cardinality::FixedArray(len) => {
            let _ = writeln!(out, "    pub {}: [{}; {}],", ident, scalar, len);
        }
        Cardinality::DynamicArray { max_len } => {
            let _ = writeln!(out, "    #[typewalk(dynamic)]");
            let _ = writeln!(out, "    pub {}: [{}; {}],", ident, scalar, max_len);
            let _ = writeln!(out, "    #[typewalk(skip)]");
            let _ = writeln!(out, "    pub {}_len: u16,", entry.name);
        }
    }
}

fn emit_type(out: &mut String, def: &TypeDefinition) {
    for line in &def.doc {
        let _ = writeln!(out, "///{}", line);
    }
    out.push_str("#[derive(Debug, Clone, Copy, Described)]\n");
    out.push_str("#[repr(C)]\n");
    let _ = writeln!(out, "pub struct {} {{", struct_name(&def.name));
    for entry in &def.entries {
        emit_entry(out, entry);
    }
    out.push_str("}\n");
}

/// Emit a Rust module with one `#[derive(Described)]` struct per type.
pub fn emit_rust(items: &[SchemaItem]) -> String {
    let types: Vec<&TypeDefinition> = items
        .iter()
        .filter_map(|item| match item {
            SchemaItem::Type(def) => Some(def),
            _ => None,
        })
        .collect();
    let uses_strings = types
        .iter()
        .copied()
        .flat_map(|def| &def.entries)
        .any(|e| matches!(e.ty, FieldType::String(_)));

    let mut out = String::from(HEADER);
    out.push('\n');
    if !types.is_empty() {
        out.push_str(if uses_strings {
            "use typewalk::{Described, FixedString};\n"
        } else {
            "use typewalk::Described;\n"
        });
        out.push('\n');
    }

    for item in items {
        match item {
            SchemaItem::Comment(lines) => {
                for line in lines {
                    let _ = writeln!(out, "//{}", line);
                }
            }
            SchemaItem::Whitespace(count) => {
                for _ in 0..*count {
                    out.push('\n');
                }
            }
            SchemaItem::Type(def) => emit_type(&mut out, def),
        }
    }
    out
}
