//! Contains the decoded field value type, the descriptor field types used to
//! resolve packed repeated fields, and the wire type dispatch between them.

use core::convert::TryFrom;
use core::fmt::{self, Display, Formatter};
use core::str;
use crate::io::{WireType, CodedReader, read::{Error, Result}};
use either::{Either, Left, Right};

/// A single field value as it appears on the wire.
///
/// Numeric variants hold the raw bits of the value; they're never sign extended,
/// zigzag decoded, or converted to floats unless requested through one of the `as_*` views.
/// The length delimited variant borrows from the input the value was read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Value<'a> {
    /// A variable length integer
    Varint(u64),
    /// A 64-bit little endian value
    Fixed64(u64),
    /// A length delimited run of bytes. This may be a string, bytes,
    /// an embedded message, or a packed repeated field.
    LengthDelimited(&'a [u8]),
    /// A 32-bit little endian value, zero extended
    Fixed32(u64),
}

impl<'a> Value<'a> {
    /// Gets the wire type this value was read with
    pub const fn wire_type(&self) -> WireType {
        match self {
            Value::Varint(_) => WireType::Varint,
            Value::Fixed64(_) => WireType::Fixed64,
            Value::LengthDelimited(_) => WireType::LengthDelimited,
            Value::Fixed32(_) => WireType::Fixed32,
        }
    }

    /// Returns the raw number of a varint or fixed value
    pub const fn number(&self) -> Option<u64> {
        match *self {
            Value::Varint(n) | Value::Fixed64(n) | Value::Fixed32(n) => Some(n),
            Value::LengthDelimited(_) => None,
        }
    }

    /// Returns the bytes of a length delimited value
    pub const fn bytes(&self) -> Option<&'a [u8]> {
        match *self {
            Value::LengthDelimited(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the payload of the value, either a raw number or a borrowed byte slice
    ///
    /// # Examples
    ///
    /// ```
    /// use protoscan::raw::Value;
    /// use either::{Left, Right};
    ///
    /// assert_eq!(Value::Varint(150).payload(), Left(150));
    /// assert_eq!(Value::LengthDelimited(&b"hi"[..]).payload(), Right(&b"hi"[..]));
    /// ```
    pub fn payload(&self) -> Either<u64, &'a [u8]> {
        match *self {
            Value::Varint(n) | Value::Fixed64(n) | Value::Fixed32(n) => Left(n),
            Value::LengthDelimited(b) => Right(b),
        }
    }

    #[inline]
    fn varint(&self) -> Option<u64> {
        match *self {
            Value::Varint(n) => Some(n),
            _ => None,
        }
    }

    #[inline]
    fn fixed32(&self) -> Option<u32> {
        match *self {
            Value::Fixed32(n) => Some(n as u32),
            _ => None,
        }
    }

    #[inline]
    fn fixed64(&self) -> Option<u64> {
        match *self {
            Value::Fixed64(n) => Some(n),
            _ => None,
        }
    }

    /// Reads the value as an `int32`. Negative values are truncated from their 10-byte encoding.
    pub fn as_int32(&self) -> Option<i32> {
        self.varint().map(|n| n as i32)
    }
    /// Reads the value as an `int64`
    pub fn as_int64(&self) -> Option<i64> {
        self.varint().map(|n| n as i64)
    }
    /// Reads the value as a `uint32`, discarding the top 32 bits
    pub fn as_uint32(&self) -> Option<u32> {
        self.varint().map(|n| n as u32)
    }
    /// Reads the value as a `uint64`
    pub fn as_uint64(&self) -> Option<u64> {
        self.varint()
    }
    /// Reads the value as a zigzag encoded `sint32`
    ///
    /// # Examples
    ///
    /// ```
    /// use protoscan::raw::Value;
    ///
    /// assert_eq!(Value::Varint(0).as_sint32(), Some(0));
    /// assert_eq!(Value::Varint(1).as_sint32(), Some(-1));
    /// assert_eq!(Value::Varint(4).as_sint32(), Some(2));
    /// assert_eq!(Value::Fixed32(1).as_sint32(), None);
    /// ```
    pub fn as_sint32(&self) -> Option<i32> {
        self.varint().map(|n| {
            let n = n as u32;
            ((n >> 1) as i32) ^ -((n & 1) as i32)
        })
    }
    /// Reads the value as a zigzag encoded `sint64`
    pub fn as_sint64(&self) -> Option<i64> {
        self.varint().map(|n| ((n >> 1) as i64) ^ -((n & 1) as i64))
    }
    /// Reads the value as a `bool`. Any non-zero value is true.
    pub fn as_bool(&self) -> Option<bool> {
        self.varint().map(|n| n != 0)
    }
    /// Reads the value as a `fixed32`
    pub fn as_fixed32(&self) -> Option<u32> {
        self.fixed32()
    }
    /// Reads the value as a `sfixed32`
    pub fn as_sfixed32(&self) -> Option<i32> {
        self.fixed32().map(|n| n as i32)
    }
    /// Reads the value as a `float`
    pub fn as_float(&self) -> Option<f32> {
        self.fixed32().map(f32::from_bits)
    }
    /// Reads the value as a `fixed64`
    pub fn as_fixed64(&self) -> Option<u64> {
        self.fixed64()
    }
    /// Reads the value as a `sfixed64`
    pub fn as_sfixed64(&self) -> Option<i64> {
        self.fixed64().map(|n| n as i64)
    }
    /// Reads the value as a `double`
    pub fn as_double(&self) -> Option<f64> {
        self.fixed64().map(f64::from_bits)
    }
    /// Reads the value as `bytes`
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        self.bytes()
    }
    /// Reads the value as a `string`. Returns `None` if the bytes aren't valid UTF-8.
    pub fn as_str(&self) -> Option<&'a str> {
        self.bytes().and_then(|b| str::from_utf8(b).ok())
    }
}

/// The type of a field as declared in a `FieldDescriptorProto`.
///
/// Each type's discriminant matches its number in `descriptor.proto`.
/// `TYPE_GROUP` (10) is deliberately absent.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FieldType {
    /// `double`
    Double = 1,
    /// `float`
    Float = 2,
    /// `int64`
    Int64 = 3,
    /// `uint64`
    Uint64 = 4,
    /// `int32`
    Int32 = 5,
    /// `fixed64`
    Fixed64 = 6,
    /// `fixed32`
    Fixed32 = 7,
    /// `bool`
    Bool = 8,
    /// `string`
    String = 9,
    /// an embedded message
    Message = 11,
    /// `bytes`
    Bytes = 12,
    /// `uint32`
    Uint32 = 13,
    /// an enum value
    Enum = 14,
    /// `sfixed32`
    Sfixed32 = 15,
    /// `sfixed64`
    Sfixed64 = 16,
    /// `sint32`
    Sint32 = 17,
    /// `sint64`
    Sint64 = 18,
}

impl FieldType {
    /// Every field type, in descriptor order
    pub const ALL: [FieldType; 17] = [
        FieldType::Double, FieldType::Float, FieldType::Int64, FieldType::Uint64,
        FieldType::Int32, FieldType::Fixed64, FieldType::Fixed32, FieldType::Bool,
        FieldType::String, FieldType::Message, FieldType::Bytes, FieldType::Uint32,
        FieldType::Enum, FieldType::Sfixed32, FieldType::Sfixed64, FieldType::Sint32,
        FieldType::Sint64,
    ];

    /// Gets the wire type each element of a packed field of this type is encoded with.
    ///
    /// Strings, messages, and bytes can't be packed, but map to `LengthDelimited`
    /// so a run of them can still be walked.
    pub const fn wire_type(self) -> WireType {
        match self {
            FieldType::Int32 | FieldType::Int64 |
            FieldType::Uint32 | FieldType::Uint64 |
            FieldType::Sint32 | FieldType::Sint64 |
            FieldType::Bool | FieldType::Enum => WireType::Varint,
            FieldType::Fixed64 | FieldType::Sfixed64 | FieldType::Double => WireType::Fixed64,
            FieldType::Fixed32 | FieldType::Sfixed32 | FieldType::Float => WireType::Fixed32,
            FieldType::String | FieldType::Message | FieldType::Bytes => WireType::LengthDelimited,
        }
    }

    /// Gets whether a repeated field of this type can use packed encoding
    pub const fn is_packable(self) -> bool {
        self.wire_type().is_packable()
    }
}

impl TryFrom<i32> for FieldType {
    type Error = Error;

    /// Converts a descriptor type number, failing with `UnknownFieldType` for groups and unknown numbers.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoscan::{io::Error, raw::FieldType};
    /// # use std::convert::TryFrom;
    ///
    /// assert_eq!(FieldType::try_from(5), Ok(FieldType::Int32));
    /// assert_eq!(FieldType::try_from(10), Err(Error::UnknownFieldType(10)));
    /// ```
    fn try_from(value: i32) -> Result<FieldType> {
        FieldType::ALL.iter()
            .copied()
            .find(|&ty| ty as i32 == value)
            .ok_or(Error::UnknownFieldType(value))
    }
}

impl From<FieldType> for i32 {
    fn from(x: FieldType) -> i32 {
        x as i32
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            FieldType::Double => "double",
            FieldType::Float => "float",
            FieldType::Int64 => "int64",
            FieldType::Uint64 => "uint64",
            FieldType::Int32 => "int32",
            FieldType::Fixed64 => "fixed64",
            FieldType::Fixed32 => "fixed32",
            FieldType::Bool => "bool",
            FieldType::String => "string",
            FieldType::Message => "message",
            FieldType::Bytes => "bytes",
            FieldType::Uint32 => "uint32",
            FieldType::Enum => "enum",
            FieldType::Sfixed32 => "sfixed32",
            FieldType::Sfixed64 => "sfixed64",
            FieldType::Sint32 => "sint32",
            FieldType::Sint64 => "sint64",
        };
        f.write_str(name)
    }
}

/// Reads a value of the specified raw wire type from the reader.
///
/// # Errors
///
/// Group wire types (3 and 4) return `UnsupportedWireType`, and any value
/// past 5 returns `UnknownWireType`. Otherwise this returns the error of the underlying read.
///
/// # Examples
///
/// ```
/// use protoscan::{io::{CodedReader, Error}, raw::{self, Value}};
///
/// let mut reader = CodedReader::with_slice(&[0x96, 0x01]);
/// assert_eq!(raw::decode_value(0, &mut reader), Ok(Value::Varint(150)));
/// assert_eq!(raw::decode_value(3, &mut reader), Err(Error::UnsupportedWireType(3)));
/// assert_eq!(raw::decode_value(6, &mut reader), Err(Error::UnknownWireType(6)));
/// ```
pub fn decode_value<'a>(wire_type: u8, reader: &mut CodedReader<'a>) -> Result<Value<'a>> {
    let wire_type = WireType::try_from(wire_type).map_err(|e| Error::UnknownWireType(e.0))?;
    reader.read_value(wire_type)
}
