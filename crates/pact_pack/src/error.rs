use thiserror::Error;

use crate::Format;

// -----------------------------------------------------------------------------
// PackError

/// Failure while writing MessagePack primitives.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackError {
    #[error("failed to write to the underlying stream: {0}")]
    Io(#[from] std::io::Error),

    #[error("{what} of length {len} exceeds the MessagePack 32-bit limit")]
    TooLong { what: &'static str, len: usize },
}

// -----------------------------------------------------------------------------
// UnpackError

/// Failure while reading MessagePack primitives.
///
/// Every variant records the byte offset at which the offending value starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UnpackError {
    #[error("unexpected end of input at offset {offset}: needed {needed} more byte(s)")]
    Truncated { offset: usize, needed: usize },

    #[error("expected {expected} at offset {offset}, found {found} (marker 0x{marker:02x})")]
    UnexpectedFormat {
        expected: &'static str,
        found: Format,
        marker: u8,
        offset: usize,
    },

    #[error("integer at offset {offset} does not fit in {target}")]
    OutOfRange { target: &'static str, offset: usize },

    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("reserved marker 0xc1 at offset {offset}")]
    Reserved { offset: usize },
}

impl UnpackError {
    /// Returns the byte offset associated with the error.
    pub const fn offset(&self) -> usize {
        match self {
            Self::Truncated { offset, .. }
            | Self::UnexpectedFormat { offset, .. }
            | Self::OutOfRange { offset, .. }
            | Self::InvalidUtf8 { offset }
            | Self::Reserved { offset } => *offset,
        }
    }
}
