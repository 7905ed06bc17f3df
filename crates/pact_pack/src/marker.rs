//! MessagePack marker bytes.
//!
//! Fixed-width families (`POS_FIXINT`, `FIXMAP`, `FIXARRAY`, `FIXSTR`, `NEG_FIXINT`)
//! carry their payload in the low bits of the marker itself.

pub const POS_FIXINT_MAX: u8 = 0x7f;
pub const FIXMAP: u8 = 0x80;
pub const FIXMAP_MAX_LEN: usize = 0x0f;
pub const FIXARRAY: u8 = 0x90;
pub const FIXARRAY_MAX_LEN: usize = 0x0f;
pub const FIXSTR: u8 = 0xa0;
pub const FIXSTR_MAX_LEN: usize = 0x1f;
pub const NIL: u8 = 0xc0;
pub const NEVER_USED: u8 = 0xc1;
pub const FALSE: u8 = 0xc2;
pub const TRUE: u8 = 0xc3;
pub const BIN_8: u8 = 0xc4;
pub const BIN_16: u8 = 0xc5;
pub const BIN_32: u8 = 0xc6;
pub const EXT_8: u8 = 0xc7;
pub const EXT_16: u8 = 0xc8;
pub const EXT_32: u8 = 0xc9;
pub const FLOAT_32: u8 = 0xca;
pub const FLOAT_64: u8 = 0xcb;
pub const UINT_8: u8 = 0xcc;
pub const UINT_16: u8 = 0xcd;
pub const UINT_32: u8 = 0xce;
pub const UINT_64: u8 = 0xcf;
pub const INT_8: u8 = 0xd0;
pub const INT_16: u8 = 0xd1;
pub const INT_32: u8 = 0xd2;
pub const INT_64: u8 = 0xd3;
pub const FIXEXT_1: u8 = 0xd4;
pub const FIXEXT_2: u8 = 0xd5;
pub const FIXEXT_4: u8 = 0xd6;
pub const FIXEXT_8: u8 = 0xd7;
pub const FIXEXT_16: u8 = 0xd8;
pub const STR_8: u8 = 0xd9;
pub const STR_16: u8 = 0xda;
pub const STR_32: u8 = 0xdb;
pub const ARRAY_16: u8 = 0xdc;
pub const ARRAY_32: u8 = 0xdd;
pub const MAP_16: u8 = 0xde;
pub const MAP_32: u8 = 0xdf;
/// Smallest negative fixint, `-32`.
pub const NEG_FIXINT_MIN: i8 = -32;
