// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MessagePack frame encoding of described values.
//!
//! A frame is a map whose keys are field names (str) and whose values are the
//! field scalars, in declaration order. Integers use the smallest MessagePack
//! representation (non-negative values as fixint/uint*, negative values as
//! negative fixint/int*); floats are float32.
//!
//! String scalars are not encoded. Composite fields are only encoded (as
//! nested maps) when [`EncoderConfig::nested_maps`] is set. Both cases fail
//! before the field's key is written; entries already written stay in the
//! output, which is then an unusable partial frame.
//!
//! Encoder states: `Start -> MapHeaderWritten -> WritingEntry* -> Done`, with
//! any error moving to the terminal `Failed`. That includes errors raised by
//! the walker itself (array fields, depth, bounds), which reach the encoder
//! through [`Sink::abort`].

use crate::descriptor::{TypeDescriptor, TypeEntry};
use crate::error::{WalkError, WalkResult};
use crate::instance::{Instance, ScalarValue};
use crate::walker::{Sink, Walker};
use std::io::Write;

// MessagePack markers
pub(crate) const FIXMAP: u8 = 0x80;
pub(crate) const FIXSTR: u8 = 0xa0;
pub(crate) const NIL: u8 = 0xc0;
pub(crate) const FALSE: u8 = 0xc2;
pub(crate) const TRUE: u8 = 0xc3;
pub(crate) const FLOAT32: u8 = 0xca;
pub(crate) const FLOAT64: u8 = 0xcb;
pub(crate) const UINT8: u8 = 0xcc;
pub(crate) const UINT16: u8 = 0xcd;
pub(crate) const UINT32: u8 = 0xce;
pub(crate) const UINT64: u8 = 0xcf;
pub(crate) const INT8: u8 = 0xd0;
pub(crate) const INT16: u8 = 0xd1;
pub(crate) const INT32: u8 = 0xd2;
pub(crate) const INT64: u8 = 0xd3;
pub(crate) const STR8: u8 = 0xd9;
pub(crate) const STR16: u8 = 0xda;
pub(crate) const STR32: u8 = 0xdb;
pub(crate) const MAP16: u8 = 0xde;
pub(crate) const MAP32: u8 = 0xdf;

/// Encoder progress through a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    Start,
    MapHeaderWritten,
    WritingEntry,
    Done,
    Failed,
}

impl EncoderState {
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::MapHeaderWritten => "map-header-written",
            Self::WritingEntry => "writing-entry",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

/// Encoder options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncoderConfig {
    /// Encode composite fields as nested maps instead of rejecting them.
    pub nested_maps: bool,
}

/// Binary sink producing one MessagePack frame per walk.
pub struct MsgpackEncoder<W> {
    out: W,
    config: EncoderConfig,
    state: EncoderState,
    /// Entries still expected by each open map, innermost last.
    open_maps: Vec<usize>,
    /// A composite key was written and its map header is due next.
    nested_pending: bool,
}

impl<W: Write> MsgpackEncoder<W> {
    pub fn new(out: W) -> Self {
        Self::with_config(out, EncoderConfig::default())
    }

    pub fn with_config(out: W, config: EncoderConfig) -> Self {
        Self {
            out,
            config,
            state: EncoderState::Start,
            open_maps: Vec::new(),
            nested_pending: false,
        }
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    /// Return the writer once the frame is complete.
    pub fn finish(self) -> WalkResult<W> {
        match self.state {
            EncoderState::Done => Ok(self.out),
            EncoderState::Failed => Err(WalkError::EncoderFailed),
            state => Err(WalkError::IncompleteFrame { state: state.name() }),
        }
    }

    /// Run `op`, moving to `Failed` if it errors.
    fn guarded(&mut self, op: impl FnOnce(&mut Self) -> WalkResult<()>) -> WalkResult<()> {
        if self.state == EncoderState::Failed {
            return Err(WalkError::EncoderFailed);
        }
        let result = op(self);
        if result.is_err() {
            self.state = EncoderState::Failed;
        }
        result
    }

    /// Account for one finished entry, closing every map it completes.
    fn complete_entry(&mut self) {
        while let Some(remaining) = self.open_maps.last_mut() {
            *remaining = remaining.saturating_sub(1);
            if *remaining > 0 {
                return;
            }
            self.open_maps.pop();
        }
        self.state = EncoderState::Done;
    }

    fn start_entry(&mut self, key: &str) -> WalkResult<()> {
        self.state = EncoderState::WritingEntry;
        self.write_str(key)
    }

    fn write_map_header(&mut self, count: usize) -> WalkResult<()> {
        if count < 16 {
            self.out.write_all(&[FIXMAP | count as u8])?;
        } else if let Ok(n) = u16::try_from(count) {
            self.out.write_all(&[MAP16])?;
            self.out.write_all(&n.to_be_bytes())?;
        } else {
            let n = u32::try_from(count)
                .map_err(|_| WalkError::SinkWrite(format!("map of {} entries", count)))?;
            self.out.write_all(&[MAP32])?;
            self.out.write_all(&n.to_be_bytes())?;
        }
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> WalkResult<()> {
        let len = s.len();
        if len < 32 {
            self.out.write_all(&[FIXSTR | len as u8])?;
        } else if let Ok(n) = u8::try_from(len) {
            self.out.write_all(&[STR8, n])?;
        } else if let Ok(n) = u16::try_from(len) {
            self.out.write_all(&[STR16])?;
            self.out.write_all(&n.to_be_bytes())?;
        } else {
            let n = u32::try_from(len)
                .map_err(|_| WalkError::SinkWrite(format!("string of {} bytes", len)))?;
            self.out.write_all(&[STR32])?;
            self.out.write_all(&n.to_be_bytes())?;
        }
        self.out.write_all(s.as_bytes())?;
        Ok(())
    }

    fn write_int(&mut self, v: i32) -> WalkResult<()> {
        if v >= 0 {
            let u = v as u32;
            if u <= 0x7f {
                self.out.write_all(&[u as u8])?;
            } else if let Ok(b) = u8::try_from(u) {
                self.out.write_all(&[UINT8, b])?;
            } else if let Ok(h) = u16::try_from(u) {
                self.out.write_all(&[UINT16])?;
                self.out.write_all(&h.to_be_bytes())?;
            } else {
                self.out.write_all(&[UINT32])?;
                self.out.write_all(&u.to_be_bytes())?;
            }
        } else if v >= -32 {
            self.out.write_all(&[v as i8 as u8])?;
        } else if let Ok(b) = i8::try_from(v) {
            self.out.write_all(&[INT8, b as u8])?;
        } else if let Ok(h) = i16::try_from(v) {
            self.out.write_all(&[INT16])?;
            self.out.write_all(&h.to_be_bytes())?;
        } else {
            self.out.write_all(&[INT32])?;
            self.out.write_all(&v.to_be_bytes())?;
        }
        Ok(())
    }

    fn write_f32(&mut self, v: f32) -> WalkResult<()> {
        self.out.write_all(&[FLOAT32])?;
        self.out.write_all(&v.to_be_bytes())?;
        Ok(())
    }
}

impl<W: Write> Sink for MsgpackEncoder<W> {
    fn declare_field_count(&mut self, count: usize, _depth: usize) -> WalkResult<()> {
        self.guarded(|enc| {
            let expected = if enc.open_maps.is_empty() {
                enc.state == EncoderState::Start
            } else {
                enc.nested_pending
            };
            if !expected {
                return Err(WalkError::SinkWrite(format!(
                    "unexpected map header (encoder state: {})",
                    enc.state.name()
                )));
            }
            enc.nested_pending = false;
            enc.write_map_header(count)?;
            if enc.state == EncoderState::Start {
                enc.state = EncoderState::MapHeaderWritten;
            }
            if count == 0 {
                enc.complete_entry();
            } else {
                enc.open_maps.push(count);
            }
            Ok(())
        })
    }

    fn begin_composite(
        &mut self,
        entry: &TypeEntry,
        _nested: &TypeDescriptor,
        _depth: usize,
    ) -> WalkResult<()> {
        self.guarded(|enc| {
            if !enc.config.nested_maps {
                return Err(WalkError::unsupported(
                    entry.name,
                    "composite fields are not encoded",
                ));
            }
            // The nested map header follows via `declare_field_count`.
            enc.start_entry(entry.name)?;
            enc.nested_pending = true;
            Ok(())
        })
    }

    fn emit_scalar(
        &mut self,
        entry: &TypeEntry,
        value: ScalarValue<'_>,
        _depth: usize,
    ) -> WalkResult<()> {
        self.guarded(|enc| {
            match value {
                ScalarValue::I32(v) => {
                    enc.start_entry(entry.name)?;
                    enc.write_int(v)?;
                }
                ScalarValue::F32(v) => {
                    enc.start_entry(entry.name)?;
                    enc.write_f32(v)?;
                }
                ScalarValue::Str(_) => {
                    return Err(WalkError::unsupported(
                        entry.name,
                        "string fields are not encoded",
                    ));
                }
            }
            enc.complete_entry();
            Ok(())
        })
    }

    fn abort(&mut self, _error: &WalkError) {
        self.state = EncoderState::Failed;
        self.open_maps.clear();
        self.nested_pending = false;
    }
}

/// Encode `instance` into a new buffer.
pub fn encode_frame(descriptor: &TypeDescriptor, instance: Instance<'_>) -> WalkResult<Vec<u8>> {
    encode_frame_with(&Walker::default(), EncoderConfig::default(), descriptor, instance)
}

/// Encode with an explicit walker and encoder configuration.
pub fn encode_frame_with(
    walker: &Walker,
    config: EncoderConfig,
    descriptor: &TypeDescriptor,
    instance: Instance<'_>,
) -> WalkResult<Vec<u8>> {
    let mut encoder = MsgpackEncoder::with_config(Vec::new(), config);
    walker.walk(descriptor, instance, &mut encoder)?;
    encoder.finish()
}

/// Encode into a caller-provided buffer, returning the frame length.
///
/// A buffer that is too small yields [`WalkError::SinkWrite`].
pub fn encode_frame_into(
    descriptor: &TypeDescriptor,
    instance: Instance<'_>,
    buf: &mut [u8],
) -> WalkResult<usize> {
    let capacity = buf.len();
    let mut encoder = MsgpackEncoder::new(&mut *buf);
    Walker::default().walk(descriptor, instance, &mut encoder)?;
    let rest = encoder.finish()?;
    Ok(capacity - rest.len())
}
