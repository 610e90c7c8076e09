// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Walk and sink errors.

use thiserror::Error;

/// Errors reported by a walk or by the sink it drives.
///
/// A walk stops at the first error. Whatever the sink already produced is left
/// in place; nothing is rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalkError {
    #[error("unsupported shape for field `{field}`: {reason}")]
    UnsupportedShape {
        field: &'static str,
        reason: &'static str,
    },

    #[error("sink write failed: {0}")]
    SinkWrite(String),

    #[error("nesting depth exceeds configured maximum of {max_depth}")]
    DepthExceeded { max_depth: usize },

    #[error("field `{field}` at offset {offset} (width {width}) lies outside a {len}-byte instance")]
    FieldOutOfBounds {
        field: &'static str,
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("encoder already failed; frame is unusable")]
    EncoderFailed,

    #[error("frame incomplete (encoder state: {state})")]
    IncompleteFrame { state: &'static str },
}

impl WalkError {
    pub(crate) fn unsupported(field: &'static str, reason: &'static str) -> Self {
        Self::UnsupportedShape { field, reason }
    }
}

impl From<std::fmt::Error> for WalkError {
    fn from(_: std::fmt::Error) -> Self {
        Self::SinkWrite("formatter rejected fragment".into())
    }
}

impl From<std::io::Error> for WalkError {
    fn from(e: std::io::Error) -> Self {
        Self::SinkWrite(e.to_string())
    }
}

pub type WalkResult<T> = Result<T, WalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WalkError::FieldOutOfBounds {
            field: "y",
            offset: 8,
            width: 4,
            len: 10,
        };
        assert_eq!(
            err.to_string(),
            "field `y` at offset 8 (width 4) lies outside a 10-byte instance"
        );
        assert_eq!(
            WalkError::unsupported("s", "strings are not encoded").to_string(),
            "unsupported shape for field `s`: strings are not encoded"
        );
    }

    #[test]
    fn test_io_error_maps_to_sink_write() {
        let io = std::io::Error::new(std::io::ErrorKind::WriteZero, "buffer full");
        assert_eq!(
            WalkError::from(io),
            WalkError::SinkWrite("buffer full".into())
        );
    }
}
