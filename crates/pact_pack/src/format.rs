use core::fmt;

use crate::marker::*;

// -----------------------------------------------------------------------------
// Format

/// The family of a MessagePack value, derived from its leading marker byte.
///
/// Width variants of the same family (e.g. `uint 8` and `uint 32`) are folded
/// together; readers accept every width of the family they expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Nil,
    Bool,
    /// Positive fixint and `uint 8/16/32/64`.
    UInt,
    /// Negative fixint and `int 8/16/32/64`.
    Int,
    Float32,
    Float64,
    Str,
    Bin,
    Array,
    Map,
    Ext,
    /// The `0xc1` marker, never valid on the wire.
    Reserved,
}

impl Format {
    /// Classifies a marker byte.
    ///
    /// ```
    /// use pact_pack::Format;
    ///
    /// assert_eq!(Format::of(0x05), Format::UInt);
    /// assert_eq!(Format::of(0xff), Format::Int);
    /// assert_eq!(Format::of(0x93), Format::Array);
    /// ```
    pub const fn of(marker: u8) -> Self {
        match marker {
            0x00..=POS_FIXINT_MAX => Self::UInt,
            0x80..=0x8f => Self::Map,
            0x90..=0x9f => Self::Array,
            0xa0..=0xbf => Self::Str,
            NIL => Self::Nil,
            NEVER_USED => Self::Reserved,
            FALSE | TRUE => Self::Bool,
            BIN_8 | BIN_16 | BIN_32 => Self::Bin,
            EXT_8 | EXT_16 | EXT_32 => Self::Ext,
            FLOAT_32 => Self::Float32,
            FLOAT_64 => Self::Float64,
            UINT_8 | UINT_16 | UINT_32 | UINT_64 => Self::UInt,
            INT_8 | INT_16 | INT_32 | INT_64 => Self::Int,
            FIXEXT_1 | FIXEXT_2 | FIXEXT_4 | FIXEXT_8 | FIXEXT_16 => Self::Ext,
            STR_8 | STR_16 | STR_32 => Self::Str,
            ARRAY_16 | ARRAY_32 => Self::Array,
            MAP_16 | MAP_32 => Self::Map,
            0xe0..=0xff => Self::Int,
        }
    }

    /// Returns `true` for both signed and unsigned integer families.
    #[inline]
    pub const fn is_integer(self) -> bool {
        matches!(self, Self::UInt | Self::Int)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => f.pad("nil"),
            Self::Bool => f.pad("bool"),
            Self::UInt => f.pad("uint"),
            Self::Int => f.pad("int"),
            Self::Float32 => f.pad("float32"),
            Self::Float64 => f.pad("float64"),
            Self::Str => f.pad("str"),
            Self::Bin => f.pad("bin"),
            Self::Array => f.pad("array"),
            Self::Map => f.pad("map"),
            Self::Ext => f.pad("ext"),
            Self::Reserved => f.pad("reserved"),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Format;

    #[test]
    fn every_marker_is_classified() {
        let mut seen_reserved = 0;
        for marker in 0..=u8::MAX {
            if Format::of(marker) == Format::Reserved {
                seen_reserved += 1;
            }
        }
        assert_eq!(seen_reserved, 1);
    }

    #[test]
    fn fixed_families() {
        assert_eq!(Format::of(0x00), Format::UInt);
        assert_eq!(Format::of(0x7f), Format::UInt);
        assert_eq!(Format::of(0x80), Format::Map);
        assert_eq!(Format::of(0x9f), Format::Array);
        assert_eq!(Format::of(0xa0), Format::Str);
        assert_eq!(Format::of(0xe0), Format::Int);
        assert!(Format::of(0xd3).is_integer());
        assert!(!Format::of(0xca).is_integer());
    }
}
