//! Defines the `CodedReader`, a cursor for reading values from a protobuf encoded byte slice.

use core::convert::TryFrom;
use core::fmt::{self, Display, Formatter};
use core::result;
use crate::io::{WireType, MAX_VARINT_LEN, WIRE_TYPE_MASK, FIELD_NUMBER_SHIFT};
use crate::raw::Value;

#[cfg(feature = "std")]
use std::error;

/// The error type for [`CodedReader`](struct.CodedReader.html)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The input ended before the value being read was complete
    Truncated,
    /// The input contained a malformed variable length integer
    MalformedVarint,
    /// The input contained a group wire type, which is not supported
    UnsupportedWireType(u8),
    /// The input contained a wire type outside of the valid range
    UnknownWireType(u8),
    /// A descriptor field type was not one of the known packable types
    UnknownFieldType(i32),
}

impl Display for Error {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match self {
            Error::Truncated => write!(fmt, "the input ended before the value was complete"),
            Error::MalformedVarint => write!(fmt, "the input contained an invalid variable length integer"),
            Error::UnsupportedWireType(wt) => write!(fmt, "encountered group wire type: {}. Groups not supported", wt),
            Error::UnknownWireType(wt) => write!(fmt, "unknown wire type: {}", wt),
            Error::UnknownFieldType(ty) => write!(fmt, "unknown field type: {}", ty),
        }
    }
}

#[cfg(feature = "std")]
impl error::Error for Error { }

/// A result for a [`CodedReader`](struct.CodedReader.html) read operation
pub type Result<T> = result::Result<T, Error>;

/// A coded input reader that reads directly from a borrowed slice.
///
/// The reader never copies or allocates: length delimited values are
/// returned as sub-slices of the input with the input's lifetime.
///
/// After any read returns an error the position of the reader is
/// unspecified (but never past the end of the input) and no more reads should be made.
#[derive(Clone, Debug)]
pub struct CodedReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> CodedReader<'a> {
    /// Creates a new [`CodedReader`] over the borrowed [`slice`], starting at the first byte.
    ///
    /// [`CodedReader`]: struct.CodedReader.html
    /// [`slice`]: https://doc.rust-lang.org/nightly/std/primitive.slice.html
    #[inline]
    pub const fn with_slice(buf: &'a [u8]) -> Self {
        CodedReader { buf, pos: 0 }
    }

    /// Replaces the input of this reader and moves back to the first byte
    #[inline]
    pub fn reset(&mut self, buf: &'a [u8]) {
        self.buf = buf;
        self.pos = 0;
    }

    /// Returns the number of bytes read so far
    #[inline]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes left to read
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns whether every byte in the input has been read
    #[inline]
    pub const fn is_exhausted(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Returns the unread part of the input
    #[inline]
    pub fn as_remaining_slice(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    fn read_byte(&mut self) -> Result<u8> {
        match self.buf.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                Ok(b)
            },
            None => Err(Error::Truncated),
        }
    }

    #[inline]
    fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::Truncated);
        }
        let start = self.pos;
        self.pos += len;
        Ok(&self.buf[start..self.pos])
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_slice(N)?);
        Ok(array)
    }

    /// Reads a field tag from the input, returning the field number and raw wire type.
    ///
    /// The wire type isn't checked here; [`decode_value`](../../raw/fn.decode_value.html) rejects invalid ones.
    ///
    /// The field number isn't checked either. A tag whose field number doesn't fit in an `i32`
    /// keeps only its low 32 bits, so the returned number may be zero or negative.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoscan::io::CodedReader;
    ///
    /// let mut reader = CodedReader::with_slice(&[0x12]);
    /// assert_eq!(reader.read_tag(), Ok((2, 2)));
    /// ```
    #[inline]
    pub fn read_tag(&mut self) -> Result<(i32, u8)> {
        let tag = self.read_varint()?;
        // field numbers past i32 are not valid protobuf; the high bits are dropped
        Ok(((tag >> FIELD_NUMBER_SHIFT) as i32, (tag & WIRE_TYPE_MASK) as u8))
    }

    /// Reads a 64-bit varint value.
    ///
    /// # Errors
    ///
    /// Returns `Truncated` if the input ends before the last byte of the varint and
    /// `MalformedVarint` if the varint is longer than 10 bytes or doesn't fit in 64 bits.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoscan::io::CodedReader;
    ///
    /// let mut reader = CodedReader::with_slice(&[0xAC, 0x02]);
    /// assert_eq!(reader.read_varint(), Ok(300));
    /// assert!(reader.is_exhausted());
    /// ```
    pub fn read_varint(&mut self) -> Result<u64> {
        let mut result = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let b = self.read_byte()?;
            if i == MAX_VARINT_LEN - 1 && b > 1 {
                // only one bit of the tenth byte fits in a u64
                return Err(Error::MalformedVarint);
            }
            result |= u64::from(b & 0x7F) << (7 * i);
            if b & 0x80 == 0 {
                return Ok(result);
            }
        }
        Err(Error::MalformedVarint)
    }

    /// Reads a 4-byte little endian value
    #[inline]
    pub fn read_fixed32(&mut self) -> Result<u64> {
        self.read_array::<4>().map(|b| u64::from(u32::from_le_bytes(b)))
    }

    /// Reads a 8-byte little endian value
    #[inline]
    pub fn read_fixed64(&mut self) -> Result<u64> {
        self.read_array::<8>().map(u64::from_le_bytes)
    }

    /// Reads a length delimited string of bytes, borrowing it from the input.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoscan::io::CodedReader;
    ///
    /// let data = [0x02, b'h', b'i', 0x08];
    /// let mut reader = CodedReader::with_slice(&data);
    /// assert_eq!(reader.read_length_delimited(), Ok(&b"hi"[..]));
    /// assert_eq!(reader.remaining(), 1);
    /// ```
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8]> {
        let len = self.read_varint()?;
        // a length that can't be addressed can't be in the input either
        let len = usize::try_from(len).map_err(|_| Error::Truncated)?;
        self.read_slice(len)
    }

    /// Reads a value with the specified wire type.
    ///
    /// # Errors
    ///
    /// Group wire types return `UnsupportedWireType`.
    pub fn read_value(&mut self, wire_type: WireType) -> Result<Value<'a>> {
        match wire_type {
            WireType::Varint => self.read_varint().map(Value::Varint),
            WireType::Fixed64 => self.read_fixed64().map(Value::Fixed64),
            WireType::LengthDelimited => self.read_length_delimited().map(Value::LengthDelimited),
            WireType::Fixed32 => self.read_fixed32().map(Value::Fixed32),
            WireType::StartGroup | WireType::EndGroup => Err(Error::UnsupportedWireType(wire_type as u8)),
        }
    }
}
