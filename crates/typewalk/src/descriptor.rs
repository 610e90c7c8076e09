// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptor for runtime field layout.
//!
//! A `TypeDescriptor` is an ordered table of `TypeEntry` values, each naming a
//! field, its byte offset inside the enclosing value and what lives there.
//! Tables are built once (usually as `static`/`const` items, or by
//! `#[derive(Described)]`) and shared read-only by every walk.

/// Scalar value category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// 32-bit signed integer.
    I32,
    /// 32-bit IEEE-754 float.
    F32,
    /// NUL-terminated string stored inline in `max_size` bytes.
    Str,
}

impl ScalarKind {
    /// Bytes occupied in the instance. Strings use the entry's `max_size`.
    pub const fn width(self, max_size: usize) -> usize {
        match self {
            Self::I32 | Self::F32 => 4,
            Self::Str => max_size,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::I32 => "int32",
            Self::F32 => "float32",
            Self::Str => "string",
        }
    }
}

/// What a field holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryKind {
    Scalar(ScalarKind),
    Composite(&'static TypeDescriptor),
}

/// How many values a field holds.
///
/// Array cardinalities can be declared so that metadata stays faithful to the
/// type, but the walker rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Single,
    FixedArray(usize),
    DynamicArray { max_len: usize },
}

impl Cardinality {
    pub const fn is_single(self) -> bool {
        matches!(self, Self::Single)
    }
}

/// Layout of a single field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeEntry {
    pub name: &'static str,
    pub offset: usize,
    pub kind: EntryKind,
    pub cardinality: Cardinality,
    /// Capacity in bytes of a string field, terminator included.
    pub max_size: usize,
}

impl TypeEntry {
    pub const fn scalar(name: &'static str, offset: usize, kind: ScalarKind) -> Self {
        Self {
            name,
            offset,
            kind: EntryKind::Scalar(kind),
            cardinality: Cardinality::Single,
            max_size: 0,
        }
    }

    pub const fn composite(
        name: &'static str,
        offset: usize,
        descriptor: &'static TypeDescriptor,
    ) -> Self {
        Self {
            name,
            offset,
            kind: EntryKind::Composite(descriptor),
            cardinality: Cardinality::Single,
            max_size: 0,
        }
    }

    #[must_use]
    pub const fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    #[must_use]
    pub const fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Bytes covered by one value of this entry.
    pub const fn width(&self) -> usize {
        match self.kind {
            EntryKind::Scalar(kind) => kind.width(self.max_size),
            EntryKind::Composite(desc) => desc.size,
        }
    }

    pub const fn is_composite(&self) -> bool {
        matches!(self.kind, EntryKind::Composite(_))
    }
}

/// Type descriptor: ordered field table plus the byte extent it describes.
#[derive(Debug, PartialEq)]
pub struct TypeDescriptor {
    pub name: &'static str,
    pub size: usize,
    pub entries: &'static [TypeEntry],
}

impl TypeDescriptor {
    pub const fn new(name: &'static str, size: usize, entries: &'static [TypeEntry]) -> Self {
        Self {
            name,
            size,
            entries,
        }
    }

    pub const fn field_count(&self) -> usize {
        self.entries.len()
    }

    /// Get entry by name.
    pub fn entry(&self, name: &str) -> Option<&'static TypeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static POINT: TypeDescriptor = TypeDescriptor {
        name: "Point",
        size: 8,
        entries: &[
            TypeEntry::scalar("x", 0, ScalarKind::F32),
            TypeEntry::scalar("y", 4, ScalarKind::F32),
        ],
    };

    static LABELLED: TypeDescriptor = TypeDescriptor {
        name: "Labelled",
        size: 24,
        entries: &[
            TypeEntry::composite("at", 0, &POINT),
            TypeEntry::scalar("label", 8, ScalarKind::Str).with_max_size(16),
        ],
    };

    #[test]
    fn test_scalar_width() {
        assert_eq!(ScalarKind::I32.width(0), 4);
        assert_eq!(ScalarKind::F32.width(99), 4);
        assert_eq!(ScalarKind::Str.width(21), 21);
    }

    #[test]
    fn test_entry_width_follows_kind() {
        assert_eq!(LABELLED.entries[0].width(), 8);
        assert_eq!(LABELLED.entries[1].width(), 16);
        assert!(LABELLED.entries[0].is_composite());
    }

    #[test]
    fn test_entry_lookup() {
        assert_eq!(LABELLED.field_count(), 2);
        assert_eq!(LABELLED.entry("label").map(|e| e.offset), Some(8));
        assert!(LABELLED.entry("missing").is_none());
    }

    #[test]
    fn test_cardinality_builder() {
        let entry = TypeEntry::scalar("samples", 0, ScalarKind::I32)
            .with_cardinality(Cardinality::FixedArray(4));
        assert!(!entry.cardinality.is_single());
        assert_eq!(Cardinality::default(), Cardinality::Single);
    }
}
