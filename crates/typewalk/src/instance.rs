// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded, read-only views over described values.
//!
//! An [`Instance`] is the walker's only way into a value's memory. Every read
//! goes through a bounds check against the view's extent, so a descriptor
//! that does not match its instance yields [`WalkError::FieldOutOfBounds`]
//! rather than an out-of-range read.

use crate::descriptor::{Cardinality, EntryKind, ScalarKind, TypeDescriptor, TypeEntry};
use crate::error::{WalkError, WalkResult};
use std::fmt;
use std::marker::PhantomData;

/// Types whose layout is described by a static [`TypeDescriptor`].
///
/// # Safety
///
/// Every entry of `DESCRIPTOR` must lie within `size_of::<Self>()` and cover
/// bytes that are always initialized (field bytes, never padding), and
/// `DESCRIPTOR.size` must equal `size_of::<Self>()`. `#[derive(Described)]`
/// upholds this by taking offsets from `core::mem::offset_of!`.
pub unsafe trait Described: Sized {
    const DESCRIPTOR: &'static TypeDescriptor;
}

/// Maps a Rust field type to the entry metadata the derive macro emits.
///
/// # Safety
///
/// The metadata decides how many bytes the walker reads at the field's
/// offset. [`field_width::<Self>()`](field_width) must equal
/// `size_of::<Self>()`, and every byte a scalar read covers must be
/// initialized. `#[derive(Described)]` also checks the width at compile time
/// for each field it describes.
pub unsafe trait Field {
    const KIND: EntryKind;
    const CARDINALITY: Cardinality = Cardinality::Single;
    const MAX_SIZE: usize = 0;
}

/// Bytes the metadata of `T` claims, all array elements included.
pub const fn field_width<T: Field>() -> usize {
    let element = match T::KIND {
        EntryKind::Scalar(kind) => kind.width(T::MAX_SIZE),
        EntryKind::Composite(desc) => desc.size,
    };
    let count = match T::CARDINALITY {
        Cardinality::Single => 1,
        Cardinality::FixedArray(n) => n,
        Cardinality::DynamicArray { max_len } => max_len,
    };
    element * count
}

// SAFETY: 4-byte scalars.
unsafe impl Field for i32 {
    const KIND: EntryKind = EntryKind::Scalar(ScalarKind::I32);
}

// SAFETY: 4-byte scalars.
unsafe impl Field for f32 {
    const KIND: EntryKind = EntryKind::Scalar(ScalarKind::F32);
}

// SAFETY: `repr(transparent)` over `[u8; N]`.
unsafe impl<const N: usize> Field for FixedString<N> {
    const KIND: EntryKind = EntryKind::Scalar(ScalarKind::Str);
    const MAX_SIZE: usize = N;
}

// SAFETY: arrays have no padding between elements, so N elements of `T`
// span exactly `N * size_of::<T>()` bytes.
unsafe impl<T: Field, const N: usize> Field for [T; N] {
    const KIND: EntryKind = T::KIND;
    const CARDINALITY: Cardinality = Cardinality::FixedArray(N);
    const MAX_SIZE: usize = T::MAX_SIZE;
}

/// Read-only view over the bytes of one described value.
#[derive(Clone, Copy)]
pub struct Instance<'a> {
    ptr: *const u8,
    len: usize,
    _marker: PhantomData<&'a [u8]>,
}

impl<'a> Instance<'a> {
    /// View a described value.
    pub fn of<T: Described>(value: &'a T) -> Self {
        Self {
            ptr: (value as *const T).cast::<u8>(),
            len: std::mem::size_of::<T>(),
            _marker: PhantomData,
        }
    }

    /// View a raw byte buffer, e.g. a payload received off a transport.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn bytes(&self, offset: usize, width: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(width)?;
        if end > self.len {
            return None;
        }
        // SAFETY: the range is inside the view. Only scalar reads get here;
        // views built with `of` rely on the `Described` and `Field` contracts
        // for initialization of a scalar's bytes, views built with
        // `from_bytes` are plain slices.
        Some(unsafe { std::slice::from_raw_parts(self.ptr.add(offset), width) })
    }

    /// Sub-view of `width` bytes starting at `offset`.
    ///
    /// No slice is formed here, so a composite view may span padding.
    pub fn sub(&self, offset: usize, width: usize) -> Option<Instance<'a>> {
        let end = offset.checked_add(width)?;
        if end > self.len {
            return None;
        }
        Some(Instance {
            // SAFETY: `offset <= end <= len`, so the pointer stays inside
            // (or one past) the viewed value.
            ptr: unsafe { self.ptr.add(offset) },
            len: width,
            _marker: PhantomData,
        })
    }

    /// Sub-view covering `entry`.
    pub fn field(&self, entry: &TypeEntry) -> WalkResult<Instance<'a>> {
        let width = entry.width();
        self.sub(entry.offset, width)
            .ok_or(WalkError::FieldOutOfBounds {
                field: entry.name,
                offset: entry.offset,
                width,
                len: self.len,
            })
    }

    /// Decode the scalar held by `entry`. Composite entries are rejected.
    pub fn read_scalar(&self, entry: &TypeEntry) -> WalkResult<ScalarValue<'a>> {
        let EntryKind::Scalar(kind) = entry.kind else {
            return Err(WalkError::unsupported(entry.name, "not a scalar field"));
        };
        let view = self.field(entry)?;
        let raw = view.bytes(0, view.len).unwrap_or_default();
        Ok(match kind {
            ScalarKind::I32 => ScalarValue::I32(i32::from_ne_bytes(word(raw))),
            ScalarKind::F32 => ScalarValue::F32(f32::from_ne_bytes(word(raw))),
            ScalarKind::Str => ScalarValue::Str(until_nul(raw)),
        })
    }
}

impl fmt::Debug for Instance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance").field("len", &self.len).finish()
    }
}

fn word(raw: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    out.copy_from_slice(&raw[..4]);
    out
}

fn until_nul(raw: &[u8]) -> &[u8] {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    &raw[..end]
}

/// A decoded scalar, borrowed from the instance for strings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue<'a> {
    I32(i32),
    F32(f32),
    /// String bytes up to (not including) the first NUL.
    Str(&'a [u8]),
}

impl ScalarValue<'_> {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::I32(_) => ScalarKind::I32,
            Self::F32(_) => ScalarKind::F32,
            Self::Str(_) => ScalarKind::Str,
        }
    }
}

/// Text rendering: plain decimal integers, six fractional digits for floats,
/// double-quoted strings.
impl fmt::Display for ScalarValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32(v) => write!(f, "{}", v),
            Self::F32(v) => write!(f, "{:.6}", f64::from(*v)),
            Self::Str(bytes) => write!(f, "\"{}\"", String::from_utf8_lossy(bytes)),
        }
    }
}

/// Inline NUL-padded string of `N` bytes, terminator included.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct FixedString<const N: usize>([u8; N]);

impl<const N: usize> FixedString<N> {
    pub const fn new() -> Self {
        Self([0u8; N])
    }

    /// Longest string that still leaves room for the terminator.
    pub const fn capacity() -> usize {
        N.saturating_sub(1)
    }

    /// Replace the contents, truncating at a char boundary if `s` is too long.
    pub fn set(&mut self, s: &str) {
        let mut end = s.len().min(Self::capacity());
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.0 = [0u8; N];
        self.0[..end].copy_from_slice(&s.as_bytes()[..end]);
    }

    pub fn as_bytes(&self) -> &[u8] {
        until_nul(&self.0)
    }

    pub fn to_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.as_bytes())
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> From<&str> for FixedString<N> {
    fn from(s: &str) -> Self {
        let mut out = Self::new();
        out.set(s);
        out
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_str_lossy(), f)
    }
}

impl<const N: usize> fmt::Display for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}
