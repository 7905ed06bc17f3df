use alloc::vec::Vec;
use std::io::{BufWriter, Write};

use crate::PackError;
use crate::marker::*;

// -----------------------------------------------------------------------------
// Head

/// A marker byte plus its big-endian length or payload, at most 9 bytes.
struct Head {
    buf: [u8; 9],
    len: usize,
}

impl Head {
    #[inline]
    const fn marker(marker: u8) -> Self {
        let mut buf = [0; 9];
        buf[0] = marker;
        Self { buf, len: 1 }
    }

    #[inline]
    fn with<const N: usize>(marker: u8, payload: [u8; N]) -> Self {
        let mut head = Self::marker(marker);
        head.buf[1..=N].copy_from_slice(&payload);
        head.len = 1 + N;
        head
    }

    #[inline]
    fn as_slice(&self) -> &[u8] {
        &self.buf[..self.len]
    }
}

fn uint_head(v: u64) -> Head {
    if v <= POS_FIXINT_MAX as u64 {
        Head::marker(v as u8)
    } else if let Ok(v) = u8::try_from(v) {
        Head::with(UINT_8, [v])
    } else if let Ok(v) = u16::try_from(v) {
        Head::with(UINT_16, v.to_be_bytes())
    } else if let Ok(v) = u32::try_from(v) {
        Head::with(UINT_32, v.to_be_bytes())
    } else {
        Head::with(UINT_64, v.to_be_bytes())
    }
}

fn int_head(v: i64) -> Head {
    if v >= 0 {
        return uint_head(v as u64);
    }
    if v >= NEG_FIXINT_MIN as i64 {
        Head::marker(v as i8 as u8)
    } else if let Ok(v) = i8::try_from(v) {
        Head::with(INT_8, v.to_be_bytes())
    } else if let Ok(v) = i16::try_from(v) {
        Head::with(INT_16, v.to_be_bytes())
    } else if let Ok(v) = i32::try_from(v) {
        Head::with(INT_32, v.to_be_bytes())
    } else {
        Head::with(INT_64, v.to_be_bytes())
    }
}

/// Header for a length-prefixed family: `(fix marker, fix max, 8-bit, 16-bit, 32-bit)`.
fn len_head(
    what: &'static str,
    len: usize,
    fix: Option<(u8, usize)>,
    wide: (Option<u8>, u8, u8),
) -> Result<Head, PackError> {
    if let Some((marker, max)) = fix
        && len <= max
    {
        return Ok(Head::marker(marker | len as u8));
    }
    let (m8, m16, m32) = wide;
    if let Some(m8) = m8
        && let Ok(len) = u8::try_from(len)
    {
        Ok(Head::with(m8, [len]))
    } else if let Ok(len) = u16::try_from(len) {
        Ok(Head::with(m16, len.to_be_bytes()))
    } else if let Ok(len) = u32::try_from(len) {
        Ok(Head::with(m32, len.to_be_bytes()))
    } else {
        Err(PackError::TooLong { what, len })
    }
}

// -----------------------------------------------------------------------------
// Packer

/// Writes MessagePack primitives.
///
/// Implementors only provide the byte sink ([`write_raw`](Packer::write_raw)) and,
/// optionally, a capacity hint ([`reserve`](Packer::reserve)). All format
/// selection lives in the provided methods, so every implementation emits the
/// same bytes for the same calls.
///
/// Integers always use the smallest format able to hold the value, and
/// non-negative signed integers use the unsigned formats.
pub trait Packer {
    /// Appends raw bytes to the output.
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), PackError>;

    /// Announces that the next primitive needs at most `additional` bytes.
    #[inline]
    fn reserve(&mut self, additional: usize) {
        let _ = additional;
    }

    fn pack_nil(&mut self) -> Result<(), PackError> {
        self.reserve(1);
        self.write_raw(&[NIL])
    }

    fn pack_bool(&mut self, value: bool) -> Result<(), PackError> {
        self.reserve(1);
        self.write_raw(&[if value { TRUE } else { FALSE }])
    }

    fn pack_u64(&mut self, value: u64) -> Result<(), PackError> {
        self.reserve(9);
        self.write_raw(uint_head(value).as_slice())
    }

    fn pack_i64(&mut self, value: i64) -> Result<(), PackError> {
        self.reserve(9);
        self.write_raw(int_head(value).as_slice())
    }

    fn pack_f32(&mut self, value: f32) -> Result<(), PackError> {
        self.reserve(5);
        self.write_raw(Head::with(FLOAT_32, value.to_be_bytes()).as_slice())
    }

    fn pack_f64(&mut self, value: f64) -> Result<(), PackError> {
        self.reserve(9);
        self.write_raw(Head::with(FLOAT_64, value.to_be_bytes()).as_slice())
    }

    fn pack_str(&mut self, value: &str) -> Result<(), PackError> {
        let head = len_head(
            "string",
            value.len(),
            Some((FIXSTR, FIXSTR_MAX_LEN)),
            (Some(STR_8), STR_16, STR_32),
        )?;
        self.reserve(head.len + value.len());
        self.write_raw(head.as_slice())?;
        self.write_raw(value.as_bytes())
    }

    fn pack_bin(&mut self, value: &[u8]) -> Result<(), PackError> {
        let head = len_head("binary", value.len(), None, (Some(BIN_8), BIN_16, BIN_32))?;
        self.reserve(head.len + value.len());
        self.write_raw(head.as_slice())?;
        self.write_raw(value)
    }

    fn pack_array_header(&mut self, len: usize) -> Result<(), PackError> {
        let head = len_head(
            "array",
            len,
            Some((FIXARRAY, FIXARRAY_MAX_LEN)),
            (None, ARRAY_16, ARRAY_32),
        )?;
        self.reserve(head.len);
        self.write_raw(head.as_slice())
    }

    fn pack_map_header(&mut self, len: usize) -> Result<(), PackError> {
        let head = len_head(
            "map",
            len,
            Some((FIXMAP, FIXMAP_MAX_LEN)),
            (None, MAP_16, MAP_32),
        )?;
        self.reserve(head.len);
        self.write_raw(head.as_slice())
    }
}

// -----------------------------------------------------------------------------
// BufferPacker

/// The fast packer: appends to an owned buffer.
///
/// Each primitive reserves its maximum encoded size up front, so the writes
/// that follow never reallocate. Debug builds assert that no primitive writes
/// past the size it reserved.
#[derive(Debug, Default)]
pub struct BufferPacker {
    buf: Vec<u8>,
    limit: usize,
}

impl BufferPacker {
    /// Creates an empty packer.
    #[inline]
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            limit: 0,
        }
    }

    /// Creates an empty packer with the given initial capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            limit: 0,
        }
    }

    /// Returns the bytes written so far.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Clears the output, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
        self.limit = 0;
    }

    /// Consumes the packer and returns the written bytes.
    #[inline]
    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Packer for BufferPacker {
    #[inline]
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), PackError> {
        debug_assert!(
            self.buf.len() + bytes.len() <= self.limit,
            "primitive wrote past its reserved size"
        );
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    #[inline]
    fn reserve(&mut self, additional: usize) {
        self.buf.reserve(additional);
        self.limit = self.buf.len() + additional;
    }
}

// -----------------------------------------------------------------------------
// StreamPacker

/// The safe packer: writes through a [`BufWriter`] over any [`Write`] sink.
///
/// Call [`flush`](Self::flush) or [`into_inner`](Self::into_inner) to make sure
/// buffered bytes reach the sink.
pub struct StreamPacker<W: Write> {
    out: BufWriter<W>,
}

impl<W: Write> StreamPacker<W> {
    /// Wraps `sink` in a buffered packer.
    #[inline]
    pub fn new(sink: W) -> Self {
        Self {
            out: BufWriter::new(sink),
        }
    }

    /// Flushes buffered bytes to the sink.
    pub fn flush(&mut self) -> Result<(), PackError> {
        self.out.flush().map_err(PackError::from)
    }

    /// Flushes and returns the sink.
    pub fn into_inner(self) -> Result<W, PackError> {
        self.out
            .into_inner()
            .map_err(|err| PackError::Io(err.into_error()))
    }
}

impl<W: Write> Packer for StreamPacker<W> {
    #[inline]
    fn write_raw(&mut self, bytes: &[u8]) -> Result<(), PackError> {
        self.out.write_all(bytes).map_err(PackError::from)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use super::{BufferPacker, Packer, StreamPacker};
    use crate::PackError;

    fn write_sample(packer: &mut dyn Packer) -> Result<(), PackError> {
        packer.pack_map_header(3)?;
        packer.pack_str("small")?;
        packer.pack_i64(-5)?;
        packer.pack_str("wide")?;
        packer.pack_u64(u64::MAX)?;
        packer.pack_str("list")?;
        packer.pack_array_header(4)?;
        packer.pack_nil()?;
        packer.pack_bool(true)?;
        packer.pack_f64(1.5)?;
        packer.pack_bin(&[1, 2, 3])
    }

    #[test]
    fn both_variants_emit_identical_bytes() {
        let mut fast = BufferPacker::new();
        write_sample(&mut fast).unwrap();

        let mut safe = StreamPacker::new(Vec::new());
        write_sample(&mut safe).unwrap();
        let safe = safe.into_inner().unwrap();

        assert_eq!(fast.as_bytes(), safe.as_slice());
    }

    #[test]
    fn integers_use_smallest_format() {
        let cases: &[(i64, &[u8])] = &[
            (0, &[0x00]),
            (127, &[0x7f]),
            (128, &[0xcc, 0x80]),
            (256, &[0xcd, 0x01, 0x00]),
            (-1, &[0xff]),
            (-32, &[0xe0]),
            (-33, &[0xd0, 0xdf]),
            (-129, &[0xd1, 0xff, 0x7f]),
            (70_000, &[0xce, 0x00, 0x01, 0x11, 0x70]),
            (i64::MIN, &[0xd3, 0x80, 0, 0, 0, 0, 0, 0, 0]),
        ];
        for (value, expected) in cases {
            let mut packer = BufferPacker::new();
            packer.pack_i64(*value).unwrap();
            assert_eq!(packer.as_bytes(), *expected, "value {value}");
        }
    }

    #[test]
    fn string_and_container_headers() {
        let mut packer = BufferPacker::new();
        packer.pack_str("abc").unwrap();
        assert_eq!(packer.as_bytes(), &[0xa3, b'a', b'b', b'c']);

        let long: String = core::iter::repeat_n('x', 40).collect();
        packer.clear();
        packer.pack_str(&long).unwrap();
        assert_eq!(&packer.as_bytes()[..2], &[0xd9, 40]);

        packer.clear();
        packer.pack_array_header(16).unwrap();
        assert_eq!(packer.as_bytes(), &[0xdc, 0x00, 0x10]);

        packer.clear();
        packer.pack_map_header(15).unwrap();
        assert_eq!(packer.as_bytes(), &[0x8f]);

        packer.clear();
        packer.pack_bin(&[]).unwrap();
        assert_eq!(packer.as_bytes(), &[0xc4, 0x00]);
    }
}
