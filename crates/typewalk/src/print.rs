// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Indented text rendering of described values.
//!
//! Output is streamed fragment by fragment into any [`fmt::Write`]; the
//! printer buffers nothing itself. With the default 4-space indent:
//!
//! ```text
//! x: 42
//! simple:
//!     x: 1.000000
//!     y: 123
//!     str: "foo"
//! ```

use crate::config::WalkConfig;
use crate::descriptor::{TypeDescriptor, TypeEntry};
use crate::error::WalkResult;
use crate::instance::{Instance, ScalarValue};
use crate::walker::{Sink, Walker};
use std::fmt;

/// Text sink writing one line per scalar and a header line per composite.
pub struct PrettyPrinter<W> {
    out: W,
    indent_width: usize,
}

impl<W: fmt::Write> PrettyPrinter<W> {
    pub fn new(out: W) -> Self {
        Self::with_indent(out, crate::config::DEFAULT_INDENT_WIDTH)
    }

    pub fn with_indent(out: W, indent_width: usize) -> Self {
        Self { out, indent_width }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn indent(&mut self, level: usize) -> fmt::Result {
        for _ in 0..level * self.indent_width {
            self.out.write_char(' ')?;
        }
        Ok(())
    }
}

impl<W: fmt::Write> Sink for PrettyPrinter<W> {
    fn begin_composite(
        &mut self,
        entry: &TypeEntry,
        _nested: &TypeDescriptor,
        depth: usize,
    ) -> WalkResult<()> {
        // The header sits at the parent's level; its fields follow at `depth`.
        self.indent(depth.saturating_sub(1))?;
        writeln!(self.out, "{}:", entry.name)?;
        Ok(())
    }

    fn emit_scalar(
        &mut self,
        entry: &TypeEntry,
        value: ScalarValue<'_>,
        depth: usize,
    ) -> WalkResult<()> {
        self.indent(depth)?;
        writeln!(self.out, "{}: {}", entry.name, value)?;
        Ok(())
    }
}

/// Print `instance` from the root level.
pub fn print_type<W: fmt::Write>(
    descriptor: &TypeDescriptor,
    instance: Instance<'_>,
    out: W,
) -> WalkResult<()> {
    print_type_indent(descriptor, instance, out, 0)
}

/// Print `instance` with every line shifted by `indent` levels.
pub fn print_type_indent<W: fmt::Write>(
    descriptor: &TypeDescriptor,
    instance: Instance<'_>,
    out: W,
    indent: usize,
) -> WalkResult<()> {
    print_with(&WalkConfig::default(), descriptor, instance, out, indent)
}

/// Print using an explicit configuration.
pub fn print_with<W: fmt::Write>(
    config: &WalkConfig,
    descriptor: &TypeDescriptor,
    instance: Instance<'_>,
    out: W,
    indent: usize,
) -> WalkResult<()> {
    let mut printer = PrettyPrinter::with_indent(out, config.indent_width);
    Walker::new(*config).walk_at_depth(descriptor, instance, &mut printer, indent)
}

/// Print a single entry of `instance`.
pub fn print_entry<W: fmt::Write>(
    entry: &TypeEntry,
    instance: Instance<'_>,
    out: W,
    indent: usize,
) -> WalkResult<()> {
    let mut printer = PrettyPrinter::new(out);
    Walker::default().walk_entry(entry, instance, &mut printer, indent)
}
