// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! `.type` schema parser.
//!
//! ```text
//! # A 2D point        <- becomes the docstring of `point`
//! point:
//!     float32 x
//!     float32 y       # entry doc
//!
//! track:
//!     point points[<=16]
//!     string(20) label
//! ```
//!
//! Blank lines and free-standing comment blocks are returned as items so the
//! emitter can keep the file's layout.

use crate::rust_backend::{is_reserved_struct_name, struct_name};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use typewalk::Cardinality;

/// Schema errors. Line numbers are 1-based.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("line {line}: unknown expression `{text}`")]
    UnknownExpression { line: usize, text: String },

    #[error("line {line}: invalid string size in `{text}`")]
    InvalidStringSize { line: usize, text: String },

    #[error("line {line}: invalid array size in `{text}`")]
    InvalidArraySize { line: usize, text: String },

    #[error("line {line}: unknown type `{name}` (types must be defined before use)")]
    UnknownType { line: usize, name: String },

    #[error("line {line}: type `{name}` is already defined")]
    DuplicateType { line: usize, name: String },

    #[error("line {line}: entry `{name}` is already defined in this type")]
    DuplicateEntry { line: usize, name: String },

    #[error("line {line}: type `{name}` maps to the reserved Rust name `{rust_name}`")]
    ReservedTypeName {
        line: usize,
        name: String,
        rust_name: String,
    },

    #[error("line {line}: type `{name}` maps to `{rust_name}`, already used by `{other}`")]
    TypeNameCollision {
        line: usize,
        name: String,
        rust_name: String,
        other: String,
    },
}

/// Entry value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Int32,
    Float32,
    /// String of at most `N` bytes (terminator not included).
    String(usize),
    /// Another type defined earlier in the schema.
    Named(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub ty: FieldType,
    pub name: String,
    pub doc: String,
    pub cardinality: Cardinality,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub name: String,
    pub entries: Vec<Entry>,
    pub doc: Vec<String>,
    pub line: usize,
}

/// Top-level schema element, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaItem {
    Type(TypeDefinition),
    Comment(Vec<String>),
    Whitespace(usize),
}

/// Split a line into whitespace-separated tokens and the trailing comment.
///
/// The comment keeps its leading whitespace; trailing whitespace is removed.
pub fn split_line(line: &str) -> (Vec<&str>, &str) {
    let (expr, comment) = match line.split_once('#') {
        Some((expr, comment)) => (expr, comment.trim_end()),
        None => (line, ""),
    };
    (expr.split_whitespace().collect(), comment)
}

/// Parse a whole schema file.
pub fn parse_schema(source: &str) -> Result<Vec<SchemaItem>, SchemaError> {
    let mut items = Vec::new();
    let mut comments: Vec<String> = Vec::new();
    let mut blank = 0usize;
    let mut current: Option<TypeDefinition> = None;

    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        let (expr, comment) = split_line(raw);

        if let Some(mut def) = current.take() {
            match expr[..] {
                [ty, name] if !ty.contains(':') => {
                    def.entries.push(parse_entry(ty, name, comment, line)?);
                    current = Some(def);
                    continue;
                }
                _ => items.push(SchemaItem::Type(def)),
            }
        }

        if expr.is_empty() {
            if comment.is_empty() {
                if !comments.is_empty() {
                    items.push(SchemaItem::Comment(std::mem::take(&mut comments)));
                }
                blank += 1;
            } else {
                if blank > 0 {
                    items.push(SchemaItem::Whitespace(blank));
                    blank = 0;
                }
                comments.push(comment.to_string());
            }
            continue;
        }

        if blank > 0 {
            items.push(SchemaItem::Whitespace(blank));
            blank = 0;
        }

        let name = match expr[..] {
            [header] => header.strip_suffix(':').filter(|n| is_identifier(n)),
            _ => None,
        };
        let Some(name) = name else {
            return Err(SchemaError::UnknownExpression {
                line,
                text: expr.join(" "),
            });
        };
        if !comment.is_empty() {
            comments.push(comment.to_string());
        }
        current = Some(TypeDefinition {
            name: name.to_string(),
            entries: Vec::new(),
            doc: std::mem::take(&mut comments),
            line,
        });
    }

    if let Some(def) = current {
        items.push(SchemaItem::Type(def));
    }
    if blank > 0 {
        items.push(SchemaItem::Whitespace(blank));
    }
    if !comments.is_empty() {
        items.push(SchemaItem::Comment(comments));
    }

    check_definitions(&items)?;
    Ok(items)
}

fn parse_entry(ty: &str, name: &str, comment: &str, line: usize) -> Result<Entry, SchemaError> {
    let ty = match ty {
        "int32" => FieldType::Int32,
        "float32" => FieldType::Float32,
        t if t.starts_with("string(") => {
            let size = t
                .strip_prefix("string(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(|n| n.parse::<usize>().ok())
                // room for the NUL terminator
                .filter(|n| n.checked_add(1).is_some())
                .ok_or_else(|| SchemaError::InvalidStringSize {
                    line,
                    text: t.to_string(),
                })?;
            FieldType::String(size)
        }
        t if is_identifier(t) => FieldType::Named(t.to_string()),
        t => {
            return Err(SchemaError::UnknownExpression {
                line,
                text: format!("{} {}", t, name),
            })
        }
    };

    let (name, cardinality) = match name.split_once('[') {
        None => (name, Cardinality::Single),
        Some((base, suffix)) => (base, parse_array_suffix(suffix, line)?),
    };
    if !is_identifier(name) {
        return Err(SchemaError::UnknownExpression {
            line,
            text: name.to_string(),
        });
    }

    Ok(Entry {
        ty,
        name: name.to_string(),
        doc: comment.to_string(),
        cardinality,
        line,
    })
}

/// `N]` fixed, `<N]` at most N-1 elements, `<=N]` at most N elements.
fn parse_array_suffix(suffix: &str, line: usize) -> Result<Cardinality, SchemaError> {
    let invalid = || SchemaError::InvalidArraySize {
        line,
        text: format!("[{}", suffix),
    };
    let size = suffix.strip_suffix(']').ok_or_else(invalid)?;
    let parse = |n: &str| n.parse::<usize>().map_err(|_| invalid());

    if let Some(n) = size.strip_prefix("<=") {
        Ok(Cardinality::DynamicArray { max_len: parse(n)? })
    } else if let Some(n) = size.strip_prefix('<') {
        let max_len = parse(n)?.checked_sub(1).ok_or_else(invalid)?;
        Ok(Cardinality::DynamicArray { max_len })
    } else {
        Ok(Cardinality::FixedArray(parse(size)?))
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Types are unique, map to distinct usable Rust names and only reference
/// types defined above them.
fn check_definitions(items: &[SchemaItem]) -> Result<(), SchemaError> {
    let mut defined: HashSet<&str> = HashSet::new();
    let mut rust_names: HashMap<String, &str> = HashMap::new();
    for def in items.iter().filter_map(|item| match item {
        SchemaItem::Type(def) => Some(def),
        _ => None,
    }) {
        let mut names: HashSet<String> = HashSet::new();
        for entry in &def.entries {
            if let FieldType::Named(ty) = &entry.ty {
                if !defined.contains(ty.as_str()) {
                    return Err(SchemaError::UnknownType {
                        line: entry.line,
                        name: ty.clone(),
                    });
                }
            }
            let mut claim = |name: String| {
                if names.insert(name.clone()) {
                    Ok(())
                } else {
                    Err(SchemaError::DuplicateEntry {
                        line: entry.line,
                        name,
                    })
                }
            };
            claim(entry.name.clone())?;
            if matches!(entry.cardinality, Cardinality::DynamicArray { .. }) {
                claim(format!("{}_len", entry.name))?;
            }
        }
        if !defined.insert(def.name.as_str()) {
            return Err(SchemaError::DuplicateType {
                line: def.line,
                name: def.name.clone(),
            });
        }
        let rust_name = struct_name(&def.name);
        if is_reserved_struct_name(&rust_name) {
            return Err(SchemaError::ReservedTypeName {
                line: def.line,
                name: def.name.clone(),
                rust_name,
            });
        }
        if let Some(other) = rust_names.insert(rust_name.clone(), def.name.as_str()) {
            return Err(SchemaError::TypeNameCollision {
                line: def.line,
                name: def.name.clone(),
                rust_name,
                other: other.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(items: &[SchemaItem]) -> Vec<&TypeDefinition> {
        items
            .iter()
            .filter_map(|i| match i {
                SchemaItem::Type(t) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_line_split() {
        let (expr, comment) = split_line("hello world # comment    \n");
        assert_eq!(expr, ["hello", "world"]);
        assert_eq!(comment, " comment");
    }

    #[test]
    fn test_line_split_empty() {
        let (expr, comment) = split_line("\n");
        assert!(expr.is_empty());
        assert_eq!(comment, "");
    }

    #[test]
    fn test_simple_type() {
        let items = parse_schema("simple:\n    float32 x\n    int32 y\n    string(20) str\n")
            .expect("parse");
        assert_eq!(items.len(), 1);
        let t = types(&items)[0];
        assert_eq!(t.name, "simple");
        assert_eq!(t.line, 1);
        assert_eq!(t.entries.len(), 3);
        assert_eq!(t.entries[0].ty, FieldType::Float32);
        assert_eq!(t.entries[2].ty, FieldType::String(20));
        assert_eq!(t.entries[2].name, "str");
        assert_eq!(t.entries[2].line, 4);
    }

    #[test]
    fn test_docstrings() {
        let src = "# first\n# second\npoint: # header\n    float32 x # the x\n    float32 y\n";
        let items = parse_schema(src).expect("parse");
        let t = types(&items)[0];
        assert_eq!(t.doc, [" first", " second", " header"]);
        assert_eq!(t.entries[0].doc, " the x");
        assert_eq!(t.entries[1].doc, "");
    }

    #[test]
    fn test_layout_items() {
        let src = "# licence\n\n\na:\n    int32 v\n\n# trailer\n";
        let items = parse_schema(src).expect("parse");
        assert_eq!(items[0], SchemaItem::Comment(vec![" licence".into()]));
        assert_eq!(items[1], SchemaItem::Whitespace(2));
        assert!(matches!(items[2], SchemaItem::Type(_)));
        assert_eq!(items[3], SchemaItem::Whitespace(1));
        assert_eq!(items[4], SchemaItem::Comment(vec![" trailer".into()]));
    }

    #[test]
    fn test_array_suffixes() {
        let src = "a:\n    int32 fixed[4]\n    int32 below[<4]\n    int32 upto[<=4]\n";
        let items = parse_schema(src).expect("parse");
        let e = &types(&items)[0].entries;
        assert_eq!(e[0].name, "fixed");
        assert_eq!(e[0].cardinality, Cardinality::FixedArray(4));
        assert_eq!(e[1].cardinality, Cardinality::DynamicArray { max_len: 3 });
        assert_eq!(e[2].cardinality, Cardinality::DynamicArray { max_len: 4 });
    }

    #[test]
    fn test_nested_reference() {
        let src = "inner:\n    int32 v\nouter:\n    inner i\n";
        let items = parse_schema(src).expect("parse");
        let t = types(&items);
        assert_eq!(t.len(), 2);
        assert_eq!(t[1].entries[0].ty, FieldType::Named("inner".into()));
    }

    #[test]
    fn test_errors_name_the_line() {
        assert_eq!(
            parse_schema("a:\n    int32 v\nnot a type\n"),
            Err(SchemaError::UnknownExpression {
                line: 3,
                text: "not a type".into()
            })
        );
        assert!(matches!(
            parse_schema("a:\n    string(x) s\n"),
            Err(SchemaError::InvalidStringSize { line: 2, .. })
        ));
        assert!(matches!(
            parse_schema("a:\n    int32 v[<0]\n"),
            Err(SchemaError::InvalidArraySize { line: 2, .. })
        ));
        assert!(matches!(
            parse_schema("a:\n    int32 v[3\n"),
            Err(SchemaError::InvalidArraySize { line: 2, .. })
        ));
        assert_eq!(
            parse_schema("a:\n    b x\nb:\n    int32 v\n"),
            Err(SchemaError::UnknownType {
                line: 2,
                name: "b".into()
            })
        );
        assert!(matches!(
            parse_schema("a:\n    int32 v\na:\n    int32 w\n"),
            Err(SchemaError::DuplicateType { line: 3, .. })
        ));
        assert!(matches!(
            parse_schema("a:\n    int32 v[<=2]\n    int32 v_len\n"),
            Err(SchemaError::DuplicateEntry { line: 3, .. })
        ));
    }

    #[test]
    fn test_oversized_string_rejected() {
        let source = format!("a:\n    string({}) s\n", usize::MAX);
        assert!(matches!(
            parse_schema(&source),
            Err(SchemaError::InvalidStringSize { line: 2, .. })
        ));
        let source = format!("a:\n    string({}) s\n", usize::MAX - 1);
        assert!(parse_schema(&source).is_ok());
    }

    #[test]
    fn test_unusable_type_names() {
        assert_eq!(
            parse_schema("self:\n    int32 x\n"),
            Err(SchemaError::ReservedTypeName {
                line: 1,
                name: "self".into(),
                rust_name: "Self".into(),
            })
        );
        assert!(matches!(
            parse_schema("fixed_string:\n    int32 x\n"),
            Err(SchemaError::ReservedTypeName { .. })
        ));
        assert!(matches!(
            parse_schema("_1:\n    int32 x\n"),
            Err(SchemaError::ReservedTypeName { .. })
        ));
        assert_eq!(
            parse_schema("a_b:\n    int32 x\nAB:\n    int32 y\n"),
            Err(SchemaError::TypeNameCollision {
                line: 3,
                name: "AB".into(),
                rust_name: "AB".into(),
                other: "a_b".into(),
            })
        );
    }

    #[test]
    fn test_error_display() {
        let err = parse_schema("\n\n???\n").unwrap_err();
        assert_eq!(err.to_string(), "line 3: unknown expression `???`");
    }
}
