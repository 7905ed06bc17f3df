use crate::marker::*;
use crate::{Format, UnpackError};

/// A decoded integer before range checks.
#[derive(Clone, Copy)]
enum Int {
    Unsigned(u64),
    Signed(i64),
}

// -----------------------------------------------------------------------------
// Unpacker

/// Reads MessagePack primitives from a borrowed byte slice.
///
/// Every read is bounds-checked and reports the offset of the value it failed
/// on. The unpacker never outlives the slice it borrows.
///
/// Integer readers accept every integer width and report
/// [`UnpackError::OutOfRange`] when the value does not fit the requested type.
#[derive(Debug, Clone)]
pub struct Unpacker<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Unpacker<'a> {
    /// Creates an unpacker positioned at the start of `data`.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current byte offset.
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` if every byte has been consumed.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline]
    fn take(&mut self, n: usize) -> Result<&'a [u8], UnpackError> {
        let end = self.pos.checked_add(n).filter(|end| *end <= self.data.len());
        match end {
            Some(end) => {
                let bytes = &self.data[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            None => Err(UnpackError::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            }),
        }
    }

    #[inline]
    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], UnpackError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline]
    fn next_marker(&mut self) -> Result<u8, UnpackError> {
        Ok(self.take(1)?[0])
    }

    #[cold]
    fn mismatch(expected: &'static str, marker: u8, offset: usize) -> UnpackError {
        match Format::of(marker) {
            Format::Reserved => UnpackError::Reserved { offset },
            found => UnpackError::UnexpectedFormat {
                expected,
                found,
                marker,
                offset,
            },
        }
    }

    /// Returns the next marker byte without consuming it.
    pub fn peek_marker(&self) -> Result<u8, UnpackError> {
        self.data
            .get(self.pos)
            .copied()
            .ok_or(UnpackError::Truncated {
                offset: self.pos,
                needed: 1,
            })
    }

    /// Returns the format family of the next value without consuming it.
    #[inline]
    pub fn peek_format(&self) -> Result<Format, UnpackError> {
        self.peek_marker().map(Format::of)
    }

    /// Consumes the next byte only if it is the nil marker.
    ///
    /// Returns `false`, consuming nothing, for any other byte and at the end of input.
    #[inline]
    pub fn try_read_nil(&mut self) -> bool {
        if self.data.get(self.pos) == Some(&NIL) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn read_nil(&mut self) -> Result<(), UnpackError> {
        let offset = self.pos;
        match self.next_marker()? {
            NIL => Ok(()),
            marker => Err(Self::mismatch("nil", marker, offset)),
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, UnpackError> {
        let offset = self.pos;
        match self.next_marker()? {
            TRUE => Ok(true),
            FALSE => Ok(false),
            marker => Err(Self::mismatch("bool", marker, offset)),
        }
    }

    fn read_int(&mut self, expected: &'static str) -> Result<Int, UnpackError> {
        let offset = self.pos;
        let marker = self.next_marker()?;
        let value = match marker {
            0x00..=POS_FIXINT_MAX => Int::Unsigned(marker as u64),
            0xe0..=0xff => Int::Signed(marker as i8 as i64),
            UINT_8 => Int::Unsigned(u8::from_be_bytes(self.take_array()?) as u64),
            UINT_16 => Int::Unsigned(u16::from_be_bytes(self.take_array()?) as u64),
            UINT_32 => Int::Unsigned(u32::from_be_bytes(self.take_array()?) as u64),
            UINT_64 => Int::Unsigned(u64::from_be_bytes(self.take_array()?)),
            INT_8 => Int::Signed(i8::from_be_bytes(self.take_array()?) as i64),
            INT_16 => Int::Signed(i16::from_be_bytes(self.take_array()?) as i64),
            INT_32 => Int::Signed(i32::from_be_bytes(self.take_array()?) as i64),
            INT_64 => Int::Signed(i64::from_be_bytes(self.take_array()?)),
            _ => return Err(Self::mismatch(expected, marker, offset)),
        };
        Ok(value)
    }

    /// Reads any integer that fits in a `u64`.
    pub fn read_u64(&mut self) -> Result<u64, UnpackError> {
        let offset = self.pos;
        match self.read_int("unsigned integer")? {
            Int::Unsigned(v) => Ok(v),
            Int::Signed(v) => u64::try_from(v).map_err(|_| UnpackError::OutOfRange {
                target: "u64",
                offset,
            }),
        }
    }

    /// Reads any integer that fits in an `i64`.
    pub fn read_i64(&mut self) -> Result<i64, UnpackError> {
        let offset = self.pos;
        match self.read_int("integer")? {
            Int::Signed(v) => Ok(v),
            Int::Unsigned(v) => i64::try_from(v).map_err(|_| UnpackError::OutOfRange {
                target: "i64",
                offset,
            }),
        }
    }

    /// Reads a float, widening `float32` and integers.
    pub fn read_f64(&mut self) -> Result<f64, UnpackError> {
        let offset = self.pos;
        match self.peek_marker()? {
            FLOAT_64 => {
                self.pos += 1;
                Ok(f64::from_be_bytes(self.take_array()?))
            }
            FLOAT_32 => {
                self.pos += 1;
                Ok(f32::from_be_bytes(self.take_array()?) as f64)
            }
            marker if Format::of(marker).is_integer() => match self.read_int("float")? {
                Int::Unsigned(v) => Ok(v as f64),
                Int::Signed(v) => Ok(v as f64),
            },
            marker => Err(Self::mismatch("float", marker, offset)),
        }
    }

    /// Reads a `float32` or an integer; `float64` is rejected as narrowing.
    pub fn read_f32(&mut self) -> Result<f32, UnpackError> {
        let offset = self.pos;
        match self.peek_marker()? {
            FLOAT_32 => {
                self.pos += 1;
                Ok(f32::from_be_bytes(self.take_array()?))
            }
            marker if Format::of(marker).is_integer() => match self.read_int("float32")? {
                Int::Unsigned(v) => Ok(v as f32),
                Int::Signed(v) => Ok(v as f32),
            },
            marker => Err(Self::mismatch("float32", marker, offset)),
        }
    }

    fn read_len(
        &mut self,
        expected: &'static str,
        fix: Option<(u8, u8)>,
        wide: (Option<u8>, u8, u8),
    ) -> Result<usize, UnpackError> {
        let offset = self.pos;
        let marker = self.next_marker()?;
        if let Some((low, high)) = fix
            && (low..=high).contains(&marker)
        {
            return Ok((marker - low) as usize);
        }
        let (m8, m16, m32) = wide;
        if Some(marker) == m8 {
            Ok(u8::from_be_bytes(self.take_array()?) as usize)
        } else if marker == m16 {
            Ok(u16::from_be_bytes(self.take_array()?) as usize)
        } else if marker == m32 {
            Ok(u32::from_be_bytes(self.take_array()?) as usize)
        } else {
            Err(Self::mismatch(expected, marker, offset))
        }
    }

    /// Reads a UTF-8 string, borrowing from the input.
    pub fn read_str(&mut self) -> Result<&'a str, UnpackError> {
        let offset = self.pos;
        let len = self.read_len("str", Some((FIXSTR, 0xbf)), (Some(STR_8), STR_16, STR_32))?;
        let bytes = self.take(len)?;
        core::str::from_utf8(bytes).map_err(|_| UnpackError::InvalidUtf8 { offset })
    }

    /// Reads a binary blob, borrowing from the input.
    pub fn read_bin(&mut self) -> Result<&'a [u8], UnpackError> {
        let len = self.read_len("bin", None, (Some(BIN_8), BIN_16, BIN_32))?;
        self.take(len)
    }

    /// Reads an array header and returns its element count.
    pub fn read_array_header(&mut self) -> Result<usize, UnpackError> {
        self.read_len("array", Some((FIXARRAY, 0x9f)), (None, ARRAY_16, ARRAY_32))
    }

    /// Reads a map header and returns its entry count.
    pub fn read_map_header(&mut self) -> Result<usize, UnpackError> {
        self.read_len("map", Some((FIXMAP, 0x8f)), (None, MAP_16, MAP_32))
    }

    /// Skips one complete value, however deeply nested.
    ///
    /// Iterative, so hostile nesting depth cannot overflow the stack.
    pub fn skip_value(&mut self) -> Result<(), UnpackError> {
        let mut pending: u64 = 1;
        while pending > 0 {
            pending -= 1;
            let offset = self.pos;
            let marker = self.next_marker()?;
            let skip = match marker {
                0x00..=POS_FIXINT_MAX | 0xe0..=0xff | NIL | FALSE | TRUE => 0,
                0x80..=0x8f => {
                    pending += 2 * (marker - FIXMAP) as u64;
                    0
                }
                0x90..=0x9f => {
                    pending += (marker - FIXARRAY) as u64;
                    0
                }
                0xa0..=0xbf => (marker - FIXSTR) as usize,
                UINT_8 | INT_8 => 1,
                UINT_16 | INT_16 => 2,
                UINT_32 | INT_32 | FLOAT_32 => 4,
                UINT_64 | INT_64 | FLOAT_64 => 8,
                BIN_8 | STR_8 => u8::from_be_bytes(self.take_array()?) as usize,
                BIN_16 | STR_16 => u16::from_be_bytes(self.take_array()?) as usize,
                BIN_32 | STR_32 => u32::from_be_bytes(self.take_array()?) as usize,
                ARRAY_16 => {
                    pending += u16::from_be_bytes(self.take_array()?) as u64;
                    0
                }
                ARRAY_32 => {
                    pending += u32::from_be_bytes(self.take_array()?) as u64;
                    0
                }
                MAP_16 => {
                    pending += 2 * u16::from_be_bytes(self.take_array()?) as u64;
                    0
                }
                MAP_32 => {
                    pending += 2 * u32::from_be_bytes(self.take_array()?) as u64;
                    0
                }
                FIXEXT_1 => 2,
                FIXEXT_2 => 3,
                FIXEXT_4 => 5,
                FIXEXT_8 => 9,
                FIXEXT_16 => 17,
                EXT_8 => 1 + u8::from_be_bytes(self.take_array()?) as usize,
                EXT_16 => 1 + u16::from_be_bytes(self.take_array()?) as usize,
                EXT_32 => 1 + u32::from_be_bytes(self.take_array()?) as usize,
                _ => return Err(UnpackError::Reserved { offset }),
            };
            self.take(skip)?;
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Unpacker;
    use crate::{BufferPacker, Format, Packer, UnpackError};

    #[test]
    fn integer_widths_and_ranges() {
        let mut packer = BufferPacker::new();
        packer.pack_u64(300).unwrap();
        packer.pack_i64(-3).unwrap();
        packer.pack_u64(u64::MAX).unwrap();
        let bytes = packer.into_inner();

        let mut unpacker = Unpacker::new(&bytes);
        assert_eq!(unpacker.read_i64().unwrap(), 300);
        assert_eq!(unpacker.read_i64().unwrap(), -3);
        assert!(matches!(
            unpacker.read_i64(),
            Err(UnpackError::OutOfRange { target: "i64", offset: 4 })
        ));
    }

    #[test]
    fn negative_into_unsigned_fails() {
        let mut unpacker = Unpacker::new(&[0xff]);
        assert!(matches!(
            unpacker.read_u64(),
            Err(UnpackError::OutOfRange { .. })
        ));
    }

    #[test]
    fn floats_widen_but_never_narrow() {
        let mut packer = BufferPacker::new();
        packer.pack_f32(2.5).unwrap();
        packer.pack_u64(7).unwrap();
        packer.pack_f64(1.25).unwrap();
        let bytes = packer.into_inner();

        let mut unpacker = Unpacker::new(&bytes);
        assert_eq!(unpacker.read_f64().unwrap(), 2.5);
        assert_eq!(unpacker.read_f32().unwrap(), 7.0);
        let err = unpacker.read_f32().unwrap_err();
        assert!(matches!(
            err,
            UnpackError::UnexpectedFormat { found: Format::Float64, .. }
        ));
    }

    #[test]
    fn try_read_nil_consumes_only_nil() {
        let mut unpacker = Unpacker::new(&[0xc0, 0x01]);
        assert!(unpacker.try_read_nil());
        assert!(!unpacker.try_read_nil());
        assert_eq!(unpacker.position(), 1);
        assert_eq!(unpacker.read_u64().unwrap(), 1);
        assert!(!unpacker.try_read_nil());
    }

    #[test]
    fn skip_nested_values() {
        let mut packer = BufferPacker::new();
        packer.pack_map_header(2).unwrap();
        packer.pack_str("a").unwrap();
        packer.pack_array_header(3).unwrap();
        packer.pack_i64(-1000).unwrap();
        packer.pack_bin(&[1, 2, 3, 4]).unwrap();
        packer.pack_map_header(1).unwrap();
        packer.pack_str("deep").unwrap();
        packer.pack_f64(0.5).unwrap();
        packer.pack_str("b").unwrap();
        packer.pack_nil().unwrap();
        packer.pack_bool(true).unwrap();
        let bytes = packer.into_inner();

        let mut unpacker = Unpacker::new(&bytes);
        unpacker.skip_value().unwrap();
        assert!(unpacker.read_bool().unwrap());
        assert!(unpacker.is_empty());
    }

    #[test]
    fn truncated_input_reports_offset() {
        let mut unpacker = Unpacker::new(&[0xa5, b'a', b'b']);
        assert_eq!(
            unpacker.read_str(),
            Err(UnpackError::Truncated { offset: 1, needed: 3 })
        );
    }

    #[test]
    fn invalid_utf8() {
        let mut unpacker = Unpacker::new(&[0xa2, 0xff, 0xfe]);
        assert_eq!(
            unpacker.read_str(),
            Err(UnpackError::InvalidUtf8 { offset: 0 })
        );
    }
}
