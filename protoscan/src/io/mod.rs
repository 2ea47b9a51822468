//! Contains types for reading protobuf coded data.

pub mod read;

pub use read::{CodedReader, Error, Result};

use core::convert::TryFrom;
use core::fmt::{self, Display, Formatter};

/// The maximum number of bytes a variable length integer can take up on the wire
pub const MAX_VARINT_LEN: usize = 10;

/// The mask over a tag value that selects its wire type
pub const WIRE_TYPE_MASK: u64 = 0b111;

/// The number of bits the field number is shifted by in a tag
pub const FIELD_NUMBER_SHIFT: u32 = 3;

/// The wire type of a protobuf value.
///
/// A wire type is paired with a field number to create a tag,
/// a unique identifier for a field on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum WireType {
    /// A value read as a variable length integer.
    ///
    /// See the protobuf docs for more information on this encoding: https://developers.google.com/protocol-buffers/docs/encoding#varints
    Varint = 0,
    /// A 64-bit value encoded as 8 little endian bytes
    Fixed64 = 1,
    /// A length delimited value. The length is encoded as a varint
    LengthDelimited = 2,
    /// A start group tag, deprecated in proto3. Never decoded.
    StartGroup = 3,
    /// An end group tag, deprecated in proto3. Never decoded.
    EndGroup = 4,
    /// A 32-bit value encoded as 4 little endian bytes
    Fixed32 = 5,
}

/// The error struct used when trying to convert from an byte to a wire type
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidWireType(pub u8);

impl Display for InvalidWireType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "invalid wire type: {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidWireType { }

impl WireType {
    /// Gets whether a wire type is eligible for repeated field packing.
    /// The valid packable wire types are Fixed32, Fixed64, and Varint.
    pub const fn is_packable(self) -> bool {
        (self as u8 == WireType::Varint as u8) ||
        (self as u8 == WireType::Fixed64 as u8) ||
        (self as u8 == WireType::Fixed32 as u8)
    }

    /// Gets whether this is one of the deprecated group wire types
    pub const fn is_group(self) -> bool {
        (self as u8 == WireType::StartGroup as u8) ||
        (self as u8 == WireType::EndGroup as u8)
    }
}

impl TryFrom<u8> for WireType {
    type Error = InvalidWireType;

    /// Converts a raw wire type. Only the discriminants 0 through 5 are accepted.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoscan::io::{WireType, InvalidWireType};
    /// # use std::convert::TryFrom;
    ///
    /// assert_eq!(WireType::try_from(2), Ok(WireType::LengthDelimited));
    /// assert_eq!(WireType::try_from(6), Err(InvalidWireType(6)));
    /// ```
    fn try_from(value: u8) -> core::result::Result<WireType, InvalidWireType> {
        match value {
            0 => Ok(WireType::Varint),
            1 => Ok(WireType::Fixed64),
            2 => Ok(WireType::LengthDelimited),
            3 => Ok(WireType::StartGroup),
            4 => Ok(WireType::EndGroup),
            5 => Ok(WireType::Fixed32),
            _ => Err(InvalidWireType(value)),
        }
    }
}

impl From<WireType> for u8 {
    fn from(x: WireType) -> u8 {
        x as u8
    }
}

impl Display for WireType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            WireType::Varint => "varint",
            WireType::Fixed64 => "fixed64",
            WireType::LengthDelimited => "length delimited",
            WireType::StartGroup => "start group",
            WireType::EndGroup => "end group",
            WireType::Fixed32 => "fixed32",
        };
        f.write_str(name)
    }
}
