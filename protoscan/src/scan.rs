//! Walks the fields of an encoded message or the elements of a packed repeated field
//! without decoding them into a message type.
//!
//! Both walks are available as a visitor function ([`iterate`], [`iterate_packed`])
//! and as an iterator ([`CodedReader::fields`], [`CodedReader::packed`]).
//! A walk ends when the input is exhausted, when the visitor returns `false`
//! (or the iterator is dropped), or at the first error. It can't be resumed after it ends.
//!
//! [`iterate`]: fn.iterate.html
//! [`iterate_packed`]: fn.iterate_packed.html
//! [`CodedReader::fields`]: ../io/struct.CodedReader.html#method.fields
//! [`CodedReader::packed`]: ../io/struct.CodedReader.html#method.packed

use core::convert::TryFrom;
use core::fmt::{self, Display, Formatter};
use core::iter::FusedIterator;
use core::result;
use crate::io::{WireType, CodedReader, read::Error};
use crate::raw::{self, Value, FieldType};

#[cfg(feature = "std")]
use std::error;

/// The step of a walk that failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Resolving the wire type of a packed field from its field type
    FieldType,
    /// Reading a field tag
    Tag,
    /// Reading a field or element value
    Value,
}

impl Display for Phase {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Phase::FieldType => f.write_str("field type"),
            Phase::Tag => f.write_str("tag"),
            Phase::Value => f.write_str("value"),
        }
    }
}

/// The error returned when a walk stops on malformed input
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScanError {
    phase: Phase,
    error: Error,
}

impl ScanError {
    /// Creates a new error for the specified step
    pub const fn new(phase: Phase, error: Error) -> Self {
        ScanError { phase, error }
    }
    /// Gets the step that failed
    pub const fn phase(&self) -> Phase {
        self.phase
    }
    /// Gets the underlying read error
    pub const fn error(&self) -> Error {
        self.error
    }

    fn field_type(error: Error) -> Self {
        Self::new(Phase::FieldType, error)
    }
    fn tag(error: Error) -> Self {
        Self::new(Phase::Tag, error)
    }
    fn value(error: Error) -> Self {
        Self::new(Phase::Value, error)
    }
}

impl Display for ScanError {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        write!(fmt, "error reading {}: {}", self.phase, self.error)
    }
}

#[cfg(feature = "std")]
impl error::Error for ScanError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<ScanError> for Error {
    fn from(value: ScanError) -> Error {
        value.error
    }
}

/// A result for a walk over a message or packed field
pub type Result<T> = result::Result<T, ScanError>;

/// An iterator over the top-level fields of a message.
///
/// Returned by [`CodedReader::fields`](../io/struct.CodedReader.html#method.fields).
/// Each item is a field number and its value. After the first error, no more items are returned.
#[derive(Debug)]
pub struct Fields<'r, 'a> {
    reader: &'r mut CodedReader<'a>,
    done: bool,
}

impl<'r, 'a> Fields<'r, 'a> {
    fn read_field(&mut self) -> Result<(i32, Value<'a>)> {
        let (number, wire_type) = self.reader.read_tag().map_err(ScanError::tag)?;
        let value = raw::decode_value(wire_type, self.reader).map_err(ScanError::value)?;
        Ok((number, value))
    }
}

impl<'r, 'a> Iterator for Fields<'r, 'a> {
    type Item = Result<(i32, Value<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.reader.is_exhausted() {
            tracing::trace!(offset = self.reader.position(), "message scan reached end of input");
            self.done = true;
            return None;
        }

        let result = self.read_field();
        if let Err(e) = &result {
            tracing::debug!(phase = %e.phase(), error = %e.error(), offset = self.reader.position(), "message scan failed");
            self.done = true;
        }
        Some(result)
    }
}

impl FusedIterator for Fields<'_, '_> { }

/// An iterator over the elements of a packed repeated field.
///
/// Returned by [`CodedReader::packed`](../io/struct.CodedReader.html#method.packed).
/// After the first error, no more items are returned.
#[derive(Debug)]
pub struct PackedValues<'r, 'a> {
    reader: &'r mut CodedReader<'a>,
    wire_type: WireType,
    done: bool,
}

impl<'r, 'a> PackedValues<'r, 'a> {
    /// Gets the wire type every element is read with
    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }
}

impl<'r, 'a> Iterator for PackedValues<'r, 'a> {
    type Item = Result<Value<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.reader.is_exhausted() {
            tracing::trace!(offset = self.reader.position(), "packed scan reached end of input");
            self.done = true;
            return None;
        }

        let result = self.reader.read_value(self.wire_type).map_err(ScanError::value);
        if let Err(e) = &result {
            tracing::debug!(phase = %e.phase(), error = %e.error(), offset = self.reader.position(), "packed scan failed");
            self.done = true;
        }
        Some(result)
    }
}

impl FusedIterator for PackedValues<'_, '_> { }

impl<'a> CodedReader<'a> {
    /// Returns an iterator over the remaining top-level fields in the input.
    ///
    /// Embedded messages are returned as length delimited values; walk them with a new reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use protoscan::{io::CodedReader, raw::Value};
    ///
    /// let data = [0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i'];
    /// let mut reader = CodedReader::with_slice(&data);
    /// let mut fields = reader.fields();
    ///
    /// assert_eq!(fields.next(), Some(Ok((1, Value::Varint(150)))));
    /// assert_eq!(fields.next(), Some(Ok((2, Value::LengthDelimited(&b"hi"[..])))));
    /// assert_eq!(fields.next(), None);
    /// ```
    pub fn fields<'r>(&'r mut self) -> Fields<'r, 'a> {
        Fields { reader: self, done: false }
    }

    /// Returns an iterator over the elements of a packed repeated field of the specified type.
    ///
    /// The input must be exactly the contents of the packed field,
    /// i.e. the bytes of the length delimited value the field was read as.
    pub fn packed<'r>(&'r mut self, field_type: FieldType) -> PackedValues<'r, 'a> {
        PackedValues { reader: self, wire_type: field_type.wire_type(), done: false }
    }
}

/// Calls the visitor with the field number and value of every top-level field in the reader's input.
///
/// The walk stops without error when the input is exhausted at a field boundary
/// or when the visitor returns `false`. Once stopped, no more input is read.
///
/// # Errors
///
/// If a tag or value is malformed, the walk stops and returns the error with the step
/// it occurred in. Fields passed to the visitor before the error aren't affected.
///
/// # Examples
///
/// ```
/// use protoscan::{scan, io::CodedReader};
///
/// let data = [0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i'];
/// let mut name = None;
///
/// scan::iterate(&mut CodedReader::with_slice(&data), |number, value| {
///     if number == 2 {
///         name = value.as_str();
///         return false;
///     }
///     true
/// }).unwrap();
///
/// assert_eq!(name, Some("hi"));
/// ```
pub fn iterate<'a, F>(reader: &mut CodedReader<'a>, mut visitor: F) -> Result<()>
    where F: FnMut(i32, Value<'a>) -> bool
{
    for field in reader.fields() {
        let (number, value) = field?;
        if !visitor(number, value) {
            tracing::trace!(field = number, "visitor stopped message scan");
            return Ok(());
        }
    }
    Ok(())
}

/// Calls the visitor with every element of a packed repeated field.
///
/// The reader's input must be exactly the contents of the packed field. Elements are read
/// with the wire type the field type is packed with. Stopping and errors
/// work the same as [`iterate`](fn.iterate.html).
///
/// # Examples
///
/// ```
/// use protoscan::{scan, io::CodedReader, raw::FieldType};
///
/// let data = [0x96, 0x01, 0xA0, 0x9C, 0x01];
/// let mut values = Vec::new();
///
/// scan::iterate_packed(&mut CodedReader::with_slice(&data), FieldType::Int32, |value| {
///     values.extend(value.as_int32());
///     true
/// }).unwrap();
///
/// assert_eq!(values, [150, 20000]);
/// ```
pub fn iterate_packed<'a, F>(reader: &mut CodedReader<'a>, field_type: FieldType, mut visitor: F) -> Result<()>
    where F: FnMut(Value<'a>) -> bool
{
    for value in reader.packed(field_type) {
        if !visitor(value?) {
            tracing::trace!(%field_type, "visitor stopped packed scan");
            return Ok(());
        }
    }
    Ok(())
}

/// Calls the visitor with every element of a packed repeated field, using the field type number
/// from a field descriptor.
///
/// # Errors
///
/// If the number isn't a known field type this returns `UnknownFieldType`
/// before any input is read. Otherwise this is the same as [`iterate_packed`](fn.iterate_packed.html).
pub fn iterate_packed_raw<'a, F>(reader: &mut CodedReader<'a>, field_type: i32, visitor: F) -> Result<()>
    where F: FnMut(Value<'a>) -> bool
{
    let field_type = FieldType::try_from(field_type).map_err(ScanError::field_type)?;
    iterate_packed(reader, field_type, visitor)
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;
    use crate::io::{CodedReader, WireType, read::Error};
    use crate::raw::{Value, FieldType};
    use crate::scan::{self, Phase, ScanError};

    fn collect_fields(data: &[u8]) -> (Vec<(i32, Value<'_>)>, scan::Result<()>) {
        let mut fields = Vec::new();
        let result = scan::iterate(&mut CodedReader::with_slice(data), |n, v| {
            fields.push((n, v));
            true
        });
        (fields, result)
    }

    #[test]
    fn empty_message() {
        let mut calls = 0;
        let result = scan::iterate(&mut CodedReader::with_slice(&[]), |_, _| {
            calls += 1;
            true
        });

        assert_eq!(result, Ok(()));
        assert_eq!(calls, 0);
    }
    #[test]
    fn message_fields_in_order() {
        let data = [0x08, 0x96, 0x01, 0x12, 0x02, 0x68, 0x69];
        let (fields, result) = collect_fields(&data);

        assert_eq!(result, Ok(()));
        assert_eq!(fields, [
            (1, Value::Varint(150)),
            (2, Value::LengthDelimited(&[0x68, 0x69])),
        ]);
        assert_eq!(fields[1].1.wire_type(), WireType::LengthDelimited);
    }
    #[test]
    fn every_wire_type() {
        let data = [
            0x08, 0x01, // 1: varint
            0x11, 0x02, 0, 0, 0, 0, 0, 0, 0, // 2: fixed64
            0x1A, 0x00, // 3: empty bytes
            0x25, 0x03, 0, 0, 0, // 4: fixed32
        ];
        let (fields, result) = collect_fields(&data);

        assert_eq!(result, Ok(()));
        assert_eq!(fields, [
            (1, Value::Varint(1)),
            (2, Value::Fixed64(2)),
            (3, Value::LengthDelimited(&[])),
            (4, Value::Fixed32(3)),
        ]);
    }
    #[test]
    fn visitor_stops_early() {
        // the second field is garbage and must never be read
        let data = [0x08, 0x01, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = CodedReader::with_slice(&data);
        let mut calls = 0;

        let result = scan::iterate(&mut reader, |n, v| {
            calls += 1;
            assert_eq!((n, v), (1, Value::Varint(1)));
            false
        });

        assert_eq!(result, Ok(()));
        assert_eq!(calls, 1);
        assert_eq!(reader.position(), 2);
    }
    #[test]
    fn malformed_varint_tag() {
        let data = [0x80; 11];
        let (fields, result) = collect_fields(&data);

        assert!(fields.is_empty());
        assert_matches!(result, Err(e) if e.error() == Error::MalformedVarint && e.phase() == Phase::Tag);
    }
    #[test]
    fn malformed_varint_value() {
        let mut data = vec![0x08];
        data.extend_from_slice(&[0x80; 11]);
        let (_, result) = collect_fields(&data);

        assert_eq!(result, Err(ScanError::new(Phase::Value, Error::MalformedVarint)));
    }
    #[test]
    fn truncated_length_delimited() {
        let data = [0x08, 0x01, 0x12, 0x0A, 1, 2, 3];
        let (fields, result) = collect_fields(&data);

        assert_eq!(fields, [(1, Value::Varint(1))]);
        assert_matches!(result, Err(e) if e.error() == Error::Truncated && e.phase() == Phase::Value);
    }
    #[test]
    fn truncated_fixed_value() {
        let (_, result) = collect_fields(&[0x0D, 1, 2]);
        assert_eq!(result, Err(ScanError::new(Phase::Value, Error::Truncated)));
    }
    #[test]
    fn truncated_tag() {
        let (fields, result) = collect_fields(&[0x08, 0x01, 0x80]);

        assert_eq!(fields.len(), 1);
        assert_eq!(result, Err(ScanError::new(Phase::Tag, Error::Truncated)));
    }
    #[test]
    fn group_rejected() {
        // field 1 = 1, then a start group tag for field 2
        let data = [0x08, 0x01, 0x13, 0x08, 0x01, 0x14];
        let (fields, result) = collect_fields(&data);

        assert_eq!(fields, [(1, Value::Varint(1))]);
        assert_matches!(result, Err(e) if e.error() == Error::UnsupportedWireType(3));

        let (fields, result) = collect_fields(&[0x14]);
        assert!(fields.is_empty());
        assert_matches!(result, Err(e) if e.error() == Error::UnsupportedWireType(4));
    }
    #[test]
    fn unknown_wire_type() {
        let (_, result) = collect_fields(&[0x0E, 0x00]);
        assert_eq!(result, Err(ScanError::new(Phase::Value, Error::UnknownWireType(6))));

        let (_, result) = collect_fields(&[0x0F, 0x00]);
        assert_eq!(result, Err(ScanError::new(Phase::Value, Error::UnknownWireType(7))));
    }
    #[test]
    fn nested_message_walk() {
        // field 3 is a message holding field 1 = 150
        let data = [0x1A, 0x03, 0x08, 0x96, 0x01, 0x20, 0x05];
        let mut inner = Vec::new();

        scan::iterate(&mut CodedReader::with_slice(&data), |n, v| {
            if let (3, Some(bytes)) = (n, v.bytes()) {
                scan::iterate(&mut CodedReader::with_slice(bytes), |n, v| {
                    inner.push((n, v));
                    true
                }).unwrap();
            }
            true
        }).unwrap();

        assert_eq!(inner, [(1, Value::Varint(150))]);
    }
    #[test]
    fn fields_iterator_is_fused() {
        let data = [0x08, 0x01, 0x0E];
        let mut reader = CodedReader::with_slice(&data);
        let mut fields = reader.fields();

        assert_eq!(fields.next(), Some(Ok((1, Value::Varint(1)))));
        assert_matches!(fields.next(), Some(Err(_)));
        assert_eq!(fields.next(), None);
        assert_eq!(fields.next(), None);
    }
    #[test]
    fn packed_varints() {
        let data = [0x96, 0x01, 0xA0, 0x9C, 0x01];
        let mut values = Vec::new();

        let result = scan::iterate_packed(&mut CodedReader::with_slice(&data), FieldType::Int32, |v| {
            values.push(v);
            true
        });

        assert_eq!(result, Ok(()));
        assert_eq!(values, [Value::Varint(150), Value::Varint(20000)]);
    }
    #[test]
    fn packed_fixed() {
        let data = [0x00, 0x00, 0x80, 0x3F, 0x00, 0x00, 0x00, 0x40];
        let mut reader = CodedReader::with_slice(&data);

        let floats: Vec<f32> = reader.packed(FieldType::Float)
            .map(|v| v.unwrap().as_float().unwrap())
            .collect();
        assert_eq!(floats, [1.0, 2.0]);

        let mut reader = CodedReader::with_slice(&data);
        let packed = reader.packed(FieldType::Sfixed64);
        assert_eq!(packed.wire_type(), WireType::Fixed64);
        assert_eq!(packed.count(), 1);
    }
    #[test]
    fn packed_length_delimited() {
        let data = [0x01, b'a', 0x02, b'b', b'c'];
        let mut strings = Vec::new();

        scan::iterate_packed(&mut CodedReader::with_slice(&data), FieldType::String, |v| {
            strings.extend(v.as_str());
            true
        }).unwrap();

        assert_eq!(strings, ["a", "bc"]);
    }
    #[test]
    fn packed_field_from_message() {
        // field 4 is a packed sint32 of [-1, 2]
        let data = [0x22, 0x02, 0x01, 0x04];
        let mut values = Vec::new();

        scan::iterate(&mut CodedReader::with_slice(&data), |n, v| {
            if let (4, Some(bytes)) = (n, v.bytes()) {
                scan::iterate_packed(&mut CodedReader::with_slice(bytes), FieldType::Sint32, |v| {
                    values.extend(v.as_sint32());
                    true
                }).unwrap();
            }
            true
        }).unwrap();

        assert_eq!(values, [-1, 2]);
    }
    #[test]
    fn packed_visitor_stops_early() {
        let data = [0x01, 0x02, 0x80];
        let mut reader = CodedReader::with_slice(&data);
        let mut calls = 0;

        let result = scan::iterate_packed(&mut reader, FieldType::Uint64, |_| {
            calls += 1;
            calls < 2
        });

        assert_eq!(result, Ok(()));
        assert_eq!(calls, 2);
        assert_eq!(reader.position(), 2);
    }
    #[test]
    fn packed_truncated_element() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x02, 0x00];
        let mut values = Vec::new();

        let result = scan::iterate_packed(&mut CodedReader::with_slice(&data), FieldType::Fixed32, |v| {
            values.push(v);
            true
        });

        assert_eq!(values, [Value::Fixed32(1)]);
        assert_eq!(result, Err(ScanError::new(Phase::Value, Error::Truncated)));
    }
    #[test]
    fn packed_empty() {
        let result = scan::iterate_packed(&mut CodedReader::with_slice(&[]), FieldType::Double, |_| {
            panic!("no elements expected")
        });
        assert_eq!(result, Ok(()));
    }
    #[test]
    fn packed_raw_field_type() {
        let data = [0x01, 0x00];
        let mut values = Vec::new();

        scan::iterate_packed_raw(&mut CodedReader::with_slice(&data), 8, |v| {
            values.extend(v.as_bool());
            true
        }).unwrap();
        assert_eq!(values, [true, false]);
    }
    #[test]
    fn packed_unknown_field_type() {
        let data = [0x01];
        let mut reader = CodedReader::with_slice(&data);

        let result = scan::iterate_packed_raw(&mut reader, 10, |_| true);
        assert_eq!(result, Err(ScanError::new(Phase::FieldType, Error::UnknownFieldType(10))));
        assert_eq!(reader.position(), 0);

        let result = scan::iterate_packed_raw(&mut reader, 42, |_| true);
        assert_matches!(result, Err(e) if e.error() == Error::UnknownFieldType(42));
        assert_eq!(reader.position(), 0);
    }
    #[test]
    fn error_display() {
        let e = ScanError::new(Phase::Tag, Error::MalformedVarint);
        assert_eq!(e.to_string(), "error reading tag: the input contained an invalid variable length integer");
        assert_eq!(Error::from(e), Error::MalformedVarint);

        let e = ScanError::new(Phase::Value, Error::UnsupportedWireType(3));
        assert_eq!(e.to_string(), "error reading value: encountered group wire type: 3. Groups not supported");
    }
}
