// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! typewalk - descriptor-driven value inspection
//!
//! Walks a value field by field using a static type descriptor (names, byte
//! offsets, kinds) and hands every scalar to a pluggable sink.
//!
//! # Features
//!
//! - **TypeDescriptor**: static field table (`const`-constructible or derived)
//! - **Walker**: recursive, bounds-checked, depth-limited traversal
//! - **PrettyPrinter**: indented `name: value` text into any `fmt::Write`
//! - **MsgpackEncoder**: self-describing MessagePack map frames
//! - **decode_frame**: frame decoding for inspection and round-trip checks
//!
//! # Example
//!
//! ```rust
//! use typewalk::{Described, FixedString};
//!
//! #[derive(Described)]
//! #[repr(C)]
//! struct Simple {
//!     x: f32,
//!     y: i32,
//!     str: FixedString<21>,
//! }
//!
//! let value = Simple { x: 1.5, y: 42, str: "hello world!".into() };
//!
//! let mut text = String::new();
//! typewalk::print_value(&value, &mut text).unwrap();
//! assert_eq!(text, "x: 1.500000\ny: 42\nstr: \"hello world!\"\n");
//! ```

// Lets the derive macro's `::typewalk::` paths resolve inside this crate.
extern crate self as typewalk;

pub mod config;
pub mod descriptor;
pub mod error;
pub mod frame;
pub mod instance;
pub mod msgpack;
pub mod print;
pub mod walker;

pub use config::{ConfigError, WalkConfig};
pub use descriptor::{Cardinality, EntryKind, ScalarKind, TypeDescriptor, TypeEntry};
pub use error::{WalkError, WalkResult};
pub use frame::{decode_frame, decode_frame_with, print_frame, Frame, FrameError, FrameValue};
pub use instance::{field_width, Described, Field, FixedString, Instance, ScalarValue};
pub use msgpack::{
    encode_frame, encode_frame_into, encode_frame_with, EncoderConfig, EncoderState,
    MsgpackEncoder,
};
pub use print::{print_entry, print_type, print_type_indent, print_with, PrettyPrinter};
pub use walker::{traverse, Sink, Walker};

#[cfg(feature = "derive")]
pub use typewalk_codegen::Described;

/// Print a described value from the root level.
pub fn print_value<T: Described, W: std::fmt::Write>(value: &T, out: W) -> WalkResult<()> {
    print_type(T::DESCRIPTOR, Instance::of(value), out)
}

/// Encode a described value as a MessagePack frame.
pub fn encode_value<T: Described>(value: &T) -> WalkResult<Vec<u8>> {
    encode_frame(T::DESCRIPTOR, Instance::of(value))
}
