// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Descriptor-driven traversal.
//!
//! The walker visits a descriptor's entries in declaration order against an
//! [`Instance`] and reports each field to a [`Sink`]:
//!
//! - every descriptor visit (root and nested) starts with
//!   `declare_field_count(entries, depth)`
//! - scalar entries go to `emit_scalar(entry, value, depth)`
//! - composite entries go to `begin_composite(entry, nested, depth + 1)`,
//!   followed by the nested walk at `depth + 1`
//!
//! The first error from the sink or from the walker's own checks (array
//! cardinality, depth, bounds) aborts the walk: the sink is told through
//! `abort` and the error is returned as-is.

use crate::config::WalkConfig;
use crate::descriptor::{EntryKind, TypeDescriptor, TypeEntry};
use crate::error::{WalkError, WalkResult};
use crate::instance::{Instance, ScalarValue};

/// Consumer of walk events.
pub trait Sink {
    /// A nested composite is about to be walked at `depth`.
    fn begin_composite(
        &mut self,
        entry: &TypeEntry,
        nested: &TypeDescriptor,
        depth: usize,
    ) -> WalkResult<()>;

    /// A scalar field was read.
    fn emit_scalar(
        &mut self,
        entry: &TypeEntry,
        value: ScalarValue<'_>,
        depth: usize,
    ) -> WalkResult<()>;

    /// A descriptor with `count` entries is about to be walked at `depth`.
    fn declare_field_count(&mut self, count: usize, depth: usize) -> WalkResult<()> {
        let _ = (count, depth);
        Ok(())
    }

    /// The walk stopped early with `error`; no further events follow.
    fn abort(&mut self, error: &WalkError) {
        let _ = error;
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn begin_composite(
        &mut self,
        entry: &TypeEntry,
        nested: &TypeDescriptor,
        depth: usize,
    ) -> WalkResult<()> {
        (**self).begin_composite(entry, nested, depth)
    }

    fn emit_scalar(
        &mut self,
        entry: &TypeEntry,
        value: ScalarValue<'_>,
        depth: usize,
    ) -> WalkResult<()> {
        (**self).emit_scalar(entry, value, depth)
    }

    fn declare_field_count(&mut self, count: usize, depth: usize) -> WalkResult<()> {
        (**self).declare_field_count(count, depth)
    }

    fn abort(&mut self, error: &WalkError) {
        (**self).abort(error)
    }
}

/// Stateless traversal engine; holds only its configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Walker {
    config: WalkConfig,
}

impl Walker {
    pub fn new(config: WalkConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalkConfig {
        &self.config
    }

    /// Walk `instance` from the root.
    pub fn walk<S: Sink + ?Sized>(
        &self,
        descriptor: &TypeDescriptor,
        instance: Instance<'_>,
        sink: &mut S,
    ) -> WalkResult<()> {
        self.walk_at_depth(descriptor, instance, sink, 0)
    }

    /// Walk `instance` as if it were nested `depth` levels deep.
    pub fn walk_at_depth<S: Sink + ?Sized>(
        &self,
        descriptor: &TypeDescriptor,
        instance: Instance<'_>,
        sink: &mut S,
        depth: usize,
    ) -> WalkResult<()> {
        self.visit(descriptor, instance, sink, depth)
            .inspect_err(|e| {
                log::debug!(
                    "[typewalk] walk of `{}` from depth {} aborted: {}",
                    descriptor.name,
                    depth,
                    e
                );
                sink.abort(e);
            })
    }

    /// Walk a single entry of `instance` at `depth`.
    pub fn walk_entry<S: Sink + ?Sized>(
        &self,
        entry: &TypeEntry,
        instance: Instance<'_>,
        sink: &mut S,
        depth: usize,
    ) -> WalkResult<()> {
        self.check_depth(depth)
            .and_then(|()| self.visit_entry(entry, instance, sink, depth))
            .inspect_err(|e| {
                log::debug!(
                    "[typewalk] entry `{}` at depth {} aborted: {}",
                    entry.name,
                    depth,
                    e
                );
                sink.abort(e);
            })
    }

    fn visit<S: Sink + ?Sized>(
        &self,
        descriptor: &TypeDescriptor,
        instance: Instance<'_>,
        sink: &mut S,
        depth: usize,
    ) -> WalkResult<()> {
        self.check_depth(depth)?;
        if descriptor.size > instance.len() {
            return Err(WalkError::FieldOutOfBounds {
                field: descriptor.name,
                offset: 0,
                width: descriptor.size,
                len: instance.len(),
            });
        }
        log::trace!(
            "[typewalk] visit `{}` ({} entries) at depth {}",
            descriptor.name,
            descriptor.field_count(),
            depth
        );

        sink.declare_field_count(descriptor.field_count(), depth)?;
        for entry in descriptor.entries {
            self.visit_entry(entry, instance, sink, depth)?;
        }
        Ok(())
    }

    fn check_depth(&self, depth: usize) -> WalkResult<()> {
        if depth > self.config.max_depth {
            return Err(WalkError::DepthExceeded {
                max_depth: self.config.max_depth,
            });
        }
        Ok(())
    }

    fn visit_entry<S: Sink + ?Sized>(
        &self,
        entry: &TypeEntry,
        instance: Instance<'_>,
        sink: &mut S,
        depth: usize,
    ) -> WalkResult<()> {
        if !entry.cardinality.is_single() {
            return Err(WalkError::unsupported(
                entry.name,
                "array fields are not supported",
            ));
        }
        match entry.kind {
            EntryKind::Scalar(_) => {
                let value = instance.read_scalar(entry)?;
                sink.emit_scalar(entry, value, depth)
            }
            EntryKind::Composite(nested) => {
                self.check_depth(depth + 1)?;
                let view = instance.field(entry)?;
                sink.begin_composite(entry, nested, depth + 1)?;
                self.visit(nested, view, sink, depth + 1)
            }
        }
    }
}

/// Walk with the default configuration starting at `depth`.
pub fn traverse<S: Sink + ?Sized>(
    descriptor: &TypeDescriptor,
    instance: Instance<'_>,
    sink: &mut S,
    depth: usize,
) -> WalkResult<()> {
    Walker::default().walk_at_depth(descriptor, instance, sink, depth)
}
