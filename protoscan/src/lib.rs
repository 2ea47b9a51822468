//! A zero-allocation scanner for protobuf encoded data.
//!
//! Instead of decoding a message into a generated type, `protoscan` walks
//! the fields of an encoded message in order and hands each field number and raw value
//! to a visitor. Length delimited values (strings, bytes, embedded messages, and
//! packed repeated fields) are borrowed from the input, never copied.
//!
//! ```
//! use protoscan::{scan, io::CodedReader, raw::FieldType};
//!
//! // field 1 = 150, field 2 = "hi", field 3 = packed [1, 2, 3]
//! let data = [0x08, 0x96, 0x01, 0x12, 0x02, b'h', b'i', 0x1A, 0x03, 0x01, 0x02, 0x03];
//! let mut sum = 0;
//!
//! scan::iterate(&mut CodedReader::with_slice(&data), |number, value| {
//!     if let (3, Some(packed)) = (number, value.bytes()) {
//!         let mut reader = CodedReader::with_slice(packed);
//!         scan::iterate_packed(&mut reader, FieldType::Uint32, |v| {
//!             sum += v.as_uint32().unwrap_or(0);
//!             true
//!         }).unwrap();
//!     }
//!     true
//! }).unwrap();
//!
//! assert_eq!(sum, 6);
//! ```

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs)]

pub mod io;
pub mod raw;
pub mod scan;

pub use io::{CodedReader, WireType};
pub use raw::{Value, FieldType};
pub use scan::{iterate, iterate_packed, iterate_packed_raw, ScanError};
