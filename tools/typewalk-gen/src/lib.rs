// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typewalk-gen - `.type` schema compiler
//!
//! Parses `.type` schema files and emits `#[repr(C)]` Rust structs deriving
//! `typewalk::Described`, so the generated types can be printed and encoded
//! by the typewalk walker.

pub mod rust_backend;
pub mod schema;

pub use rust_backend::{emit_rust, struct_name};
pub use schema::{
    parse_schema, split_line, Entry, FieldType, SchemaError, SchemaItem, TypeDefinition,
};

/// Parse `source` and emit the Rust module for it.
pub fn generate(source: &str) -> Result<String, SchemaError> {
    let items = parse_schema(source)?;
    Ok(emit_rust(&items))
}
