// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! MessagePack frame decoding.
//!
//! Decodes the map-of-field frames produced by [`crate::msgpack`] back into
//! ordered `(name, value)` pairs. Besides the markers the encoder emits, the
//! decoder accepts the remaining scalar markers (64-bit integers, float64,
//! bool, nil) so frames from other producers can be inspected too.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::msgpack::*;
use std::fmt;
use thiserror::Error;

/// Frame decoding errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame truncated at offset {offset}")]
    Truncated { offset: usize },

    #[error("unexpected marker 0x{marker:02x} at offset {offset}")]
    UnexpectedMarker { marker: u8, offset: usize },

    #[error("map key at offset {offset} is not a string")]
    NonStringKey { offset: usize },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("{offset} bytes decoded but frame has trailing data")]
    TrailingBytes { offset: usize },

    #[error("map at offset {offset} nests deeper than {max_depth} levels")]
    TooDeep { offset: usize, max_depth: usize },
}

/// Decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameValue {
    Int(i64),
    Float(f32),
    Double(f64),
    Str(String),
    Bool(bool),
    Nil,
    Map(Frame),
}

/// Ordered field map.
pub type Frame = Vec<(String, FrameValue)>;

/// Look up a field of a decoded frame.
pub fn get<'a>(frame: &'a Frame, name: &str) -> Option<&'a FrameValue> {
    frame.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

/// Decode a complete frame; the outermost value must be a map.
///
/// Maps may nest at most [`DEFAULT_MAX_DEPTH`] levels below the root.
pub fn decode_frame(bytes: &[u8]) -> Result<Frame, FrameError> {
    decode_frame_with(bytes, DEFAULT_MAX_DEPTH)
}

/// Decode a complete frame, allowing maps to nest `max_depth` levels below
/// the root map.
pub fn decode_frame_with(bytes: &[u8], max_depth: usize) -> Result<Frame, FrameError> {
    let mut reader = FrameReader::new(bytes, max_depth);
    let result = reader.read_map().and_then(|frame| {
        if reader.offset != bytes.len() {
            return Err(FrameError::TrailingBytes {
                offset: reader.offset,
            });
        }
        Ok(frame)
    });
    match &result {
        Ok(frame) => log::trace!(
            "[typewalk] decoded {}-byte frame with {} top-level fields",
            bytes.len(),
            frame.len()
        ),
        Err(e) => log::debug!("[typewalk] frame of {} bytes rejected: {}", bytes.len(), e),
    }
    result
}

/// Bounds-checked big-endian cursor.
struct FrameReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    max_depth: usize,
}

impl<'a> FrameReader<'a> {
    fn new(buffer: &'a [u8], max_depth: usize) -> Self {
        Self {
            buffer,
            offset: 0,
            max_depth,
        }
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FrameError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|&end| end <= self.buffer.len())
            .ok_or(FrameError::Truncated {
                offset: self.offset,
            })?;
        let bytes = &self.buffer[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], FrameError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_u8(&mut self) -> Result<u8, FrameError> {
        Ok(self.read_array::<1>()?[0])
    }

    fn read_u16(&mut self) -> Result<u16, FrameError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    fn read_u32(&mut self) -> Result<u32, FrameError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    fn read_map(&mut self) -> Result<Frame, FrameError> {
        let at = self.offset;
        let marker = self.read_u8()?;
        let count = match marker {
            m if m & 0xf0 == FIXMAP => (m & 0x0f) as usize,
            MAP16 => self.read_u16()? as usize,
            MAP32 => self.read_u32()? as usize,
            m => return Err(FrameError::UnexpectedMarker { marker: m, offset: at }),
        };
        self.read_entries(count, 0)
    }

    fn read_nested(&mut self, at: usize, count: usize, depth: usize) -> Result<Frame, FrameError> {
        let depth = depth + 1;
        if depth > self.max_depth {
            return Err(FrameError::TooDeep {
                offset: at,
                max_depth: self.max_depth,
            });
        }
        self.read_entries(count, depth)
    }

    /// Entries of a map nested `depth` levels below the root.
    fn read_entries(&mut self, count: usize, depth: usize) -> Result<Frame, FrameError> {
        // Cap the preallocation by what the buffer could possibly hold.
        let mut frame = Vec::with_capacity(count.min(self.buffer.len() - self.offset));
        for _ in 0..count {
            let key_at = self.offset;
            let key = match self.read_value(depth)? {
                FrameValue::Str(s) => s,
                _ => return Err(FrameError::NonStringKey { offset: key_at }),
            };
            let value = self.read_value(depth)?;
            frame.push((key, value));
        }
        Ok(frame)
    }

    fn read_str(&mut self, len: usize) -> Result<String, FrameError> {
        let at = self.offset;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| FrameError::InvalidUtf8 { offset: at })
    }

    fn read_value(&mut self, depth: usize) -> Result<FrameValue, FrameError> {
        let at = self.offset;
        let marker = self.read_u8()?;
        let value = match marker {
            0x00..=0x7f => FrameValue::Int(i64::from(marker)),
            0xe0..=0xff => FrameValue::Int(i64::from(marker as i8)),
            m if m & 0xf0 == FIXMAP => {
                FrameValue::Map(self.read_nested(at, (m & 0x0f) as usize, depth)?)
            }
            m if m & 0xe0 == FIXSTR => FrameValue::Str(self.read_str((m & 0x1f) as usize)?),
            NIL => FrameValue::Nil,
            FALSE => FrameValue::Bool(false),
            TRUE => FrameValue::Bool(true),
            FLOAT32 => FrameValue::Float(f32::from_be_bytes(self.read_array()?)),
            FLOAT64 => FrameValue::Double(f64::from_be_bytes(self.read_array()?)),
            UINT8 => FrameValue::Int(i64::from(self.read_u8()?)),
            UINT16 => FrameValue::Int(i64::from(self.read_u16()?)),
            UINT32 => FrameValue::Int(i64::from(self.read_u32()?)),
            UINT64 => {
                let v = u64::from_be_bytes(self.read_array()?);
                let v = i64::try_from(v)
                    .map_err(|_| FrameError::UnexpectedMarker { marker, offset: at })?;
                FrameValue::Int(v)
            }
            INT8 => FrameValue::Int(i64::from(i8::from_be_bytes(self.read_array()?))),
            INT16 => FrameValue::Int(i64::from(i16::from_be_bytes(self.read_array()?))),
            INT32 => FrameValue::Int(i64::from(i32::from_be_bytes(self.read_array()?))),
            INT64 => FrameValue::Int(i64::from_be_bytes(self.read_array()?)),
            STR8 => {
                let len = self.read_u8()? as usize;
                FrameValue::Str(self.read_str(len)?)
            }
            STR16 => {
                let len = self.read_u16()? as usize;
                FrameValue::Str(self.read_str(len)?)
            }
            STR32 => {
                let len = self.read_u32()? as usize;
                FrameValue::Str(self.read_str(len)?)
            }
            MAP16 => {
                let count = self.read_u16()? as usize;
                FrameValue::Map(self.read_nested(at, count, depth)?)
            }
            MAP32 => {
                let count = self.read_u32()? as usize;
                FrameValue::Map(self.read_nested(at, count, depth)?)
            }
            m => return Err(FrameError::UnexpectedMarker { marker: m, offset: at }),
        };
        Ok(value)
    }
}

impl fmt::Display for FrameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{}", v),
            Self::Float(v) => write!(f, "{:.6}", f64::from(*v)),
            Self::Double(v) => write!(f, "{:.6}", v),
            Self::Str(s) => write!(f, "\"{}\"", s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Nil => f.write_str("nil"),
            Self::Map(_) => f.write_str("{...}"),
        }
    }
}

/// Render a decoded frame in the pretty printer's layout.
pub fn print_frame<W: fmt::Write>(frame: &Frame, out: &mut W, indent_width: usize) -> fmt::Result {
    print_level(frame, out, indent_width, 0)
}

fn print_level<W: fmt::Write>(
    frame: &Frame,
    out: &mut W,
    indent_width: usize,
    level: usize,
) -> fmt::Result {
    let pad = level * indent_width;
    for (name, value) in frame {
        match value {
            FrameValue::Map(inner) => {
                writeln!(out, "{:pad$}{}:", "", name, pad = pad)?;
                print_level(inner, out, indent_width, level + 1)?;
            }
            scalar => writeln!(out, "{:pad$}{}: {}", "", name, scalar, pad = pad)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_flat() {
        let bytes = [0x82, 0xa1, b'x', FLOAT32, 0x3f, 0xc0, 0, 0, 0xa1, b'y', 0x2a];
        let frame = decode_frame(&bytes).expect("decode");
        assert_eq!(
            frame,
            vec![
                ("x".to_string(), FrameValue::Float(1.5)),
                ("y".to_string(), FrameValue::Int(42)),
            ]
        );
        assert_eq!(get(&frame, "y"), Some(&FrameValue::Int(42)));
    }

    #[test]
    fn test_decode_foreign_scalars() {
        let mut bytes = vec![0x84];
        bytes.extend_from_slice(&[0xa1, b'a', TRUE]);
        bytes.extend_from_slice(&[0xa1, b'b', NIL]);
        bytes.extend_from_slice(&[0xa1, b'c', INT64]);
        bytes.extend_from_slice(&(-5_000_000_000i64).to_be_bytes());
        bytes.extend_from_slice(&[0xa1, b'd', FLOAT64]);
        bytes.extend_from_slice(&0.25f64.to_be_bytes());
        let frame = decode_frame(&bytes).expect("decode");
        assert_eq!(frame[0].1, FrameValue::Bool(true));
        assert_eq!(frame[1].1, FrameValue::Nil);
        assert_eq!(frame[2].1, FrameValue::Int(-5_000_000_000));
        assert_eq!(frame[3].1, FrameValue::Double(0.25));
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!(
            decode_frame(&[0x81, 0xa1, b'x']),
            Err(FrameError::Truncated { offset: 3 })
        );
        assert_eq!(
            decode_frame(&[0x2a]),
            Err(FrameError::UnexpectedMarker {
                marker: 0x2a,
                offset: 0
            })
        );
        assert_eq!(
            decode_frame(&[0x81, 0x01, 0x02]),
            Err(FrameError::NonStringKey { offset: 1 })
        );
        assert_eq!(
            decode_frame(&[0x81, 0xa1, 0xff, 0x00]),
            Err(FrameError::InvalidUtf8 { offset: 2 })
        );
        assert_eq!(
            decode_frame(&[0x80, 0x00]),
            Err(FrameError::TrailingBytes { offset: 1 })
        );
        assert!(matches!(
            decode_frame(&[0x81, 0xa1, b'k', 0xc1]),
            Err(FrameError::UnexpectedMarker { marker: 0xc1, .. })
        ));
    }

    #[test]
    fn test_huge_declared_count_does_not_preallocate() {
        let bytes = [MAP32, 0xff, 0xff, 0xff, 0xff];
        assert_eq!(
            decode_frame(&bytes),
            Err(FrameError::Truncated { offset: 5 })
        );
    }

    fn nested_frame(levels: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(levels * 3 + 3);
        for _ in 0..levels {
            bytes.extend_from_slice(&[0x81, 0xa1, b'a']);
        }
        bytes.extend_from_slice(&[0x81, 0xa1, b'v', 0x01]);
        bytes
    }

    #[test]
    fn test_nesting_limit() {
        // root map plus two nested levels
        let frame = decode_frame_with(&nested_frame(2), 2).expect("decode");
        let FrameValue::Map(inner) = &frame[0].1 else {
            panic!("expected a nested map");
        };
        assert!(matches!(inner[0].1, FrameValue::Map(_)));

        assert_eq!(
            decode_frame_with(&nested_frame(3), 2),
            Err(FrameError::TooDeep {
                offset: 9,
                max_depth: 2
            })
        );
    }

    #[test]
    fn test_hostile_nesting_is_rejected() {
        let bytes = nested_frame(200_000);
        assert!(matches!(
            decode_frame(&bytes),
            Err(FrameError::TooDeep {
                max_depth: DEFAULT_MAX_DEPTH,
                ..
            })
        ));
    }

    #[test]
    fn test_print_nested_frame() {
        let frame = vec![
            ("x".to_string(), FrameValue::Int(42)),
            (
                "simple".to_string(),
                FrameValue::Map(vec![
                    ("x".to_string(), FrameValue::Float(1.0)),
                    ("y".to_string(), FrameValue::Int(123)),
                ]),
            ),
        ];
        let mut out = String::new();
        print_frame(&frame, &mut out, 4).expect("print");
        assert_eq!(out, "x: 42\nsimple:\n    x: 1.000000\n    y: 123\n");
    }
}
