//! SSH wire-format primitives (RFC 4251 Section 5).
//!
//! Every authentication message is composed from the same handful of field
//! types: bytes, booleans, big-endian `uint32`, length-prefixed strings and
//! comma-separated name-lists. All of them are encoded and decoded here so
//! the framing logic exists exactly once; the message structs and methods
//! build on top.
//!
//! Payloads at this layer are length-less: the transport has already
//! stripped the outer packet framing, so a [`WireReader`] is just a
//! bounds-checked cursor over the decrypted payload.
//!
//! # Example
//!
//! ```rust
//! use skiff_proto::ssh::wire::{WireReader, WireWriter};
//!
//! let mut w = WireWriter::new();
//! w.put_bool(false);
//! w.put_utf8("hunter2");
//! let bytes = w.into_bytes();
//!
//! let mut r = WireReader::new(&bytes);
//! assert!(!r.read_bool().unwrap());
//! assert_eq!(r.read_utf8().unwrap(), "hunter2");
//! ```

use bytes::{BufMut, BytesMut};
use skiff_platform::SkiffError;
use std::fmt;

/// Decoding failure inside a payload buffer.
///
/// Converted into [`SkiffError::Protocol`] when it crosses the driver
/// boundary: a peer that sends a payload we cannot decode has violated the
/// protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer ended before the field did.
    Truncated,
    /// A text field did not hold valid UTF-8.
    BadUtf8,
    /// A length prefix exceeds the remaining input.
    LengthOverflow,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated => write!(f, "payload truncated"),
            DecodeError::BadUtf8 => write!(f, "string field is not valid UTF-8"),
            DecodeError::LengthOverflow => {
                write!(f, "length prefix exceeds remaining payload")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl From<DecodeError> for SkiffError {
    fn from(err: DecodeError) -> Self {
        SkiffError::Protocol(err.to_string())
    }
}

/// Builder for a length-less SSH payload.
///
/// Encoding is infallible; the writer grows as needed.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Appends a single byte.
    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    /// Appends a boolean as a single byte (RFC 4251: 0 = false, 1 = true).
    pub fn put_bool(&mut self, value: bool) {
        self.buf.put_u8(u8::from(value));
    }

    /// Appends a big-endian `uint32`.
    pub fn put_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    /// Appends an SSH `string`: 4-byte big-endian length, then the raw bytes.
    ///
    /// Used for opaque byte fields (key blobs, signatures) as well as text;
    /// see [`put_utf8`](Self::put_utf8) for the text convenience.
    pub fn put_string(&mut self, bytes: &[u8]) {
        self.buf.put_u32(bytes.len() as u32);
        self.buf.put_slice(bytes);
    }

    /// Appends a UTF-8 text field as an SSH `string`.
    pub fn put_utf8(&mut self, text: &str) {
        self.put_string(text.as_bytes());
    }

    /// Appends an `mpint`: an unsigned big-endian integer as a string,
    /// with leading zero bytes trimmed and a `0x00` prefix added when the
    /// high bit of the first byte is set (RFC 4251 Section 5).
    pub fn put_mpint(&mut self, magnitude: &[u8]) {
        let trimmed = match magnitude.iter().position(|&b| b != 0) {
            Some(start) => &magnitude[start..],
            None => &[],
        };
        if trimmed.first().is_some_and(|&b| b & 0x80 != 0) {
            self.buf.put_u32(trimmed.len() as u32 + 1);
            self.buf.put_u8(0);
            self.buf.put_slice(trimmed);
        } else {
            self.put_string(trimmed);
        }
    }

    /// Appends a `name-list`: a single string whose content is the
    /// comma-separated names. An empty list encodes as an empty string.
    pub fn put_name_list<S: AsRef<str>>(&mut self, names: &[S]) {
        let joined = names
            .iter()
            .map(|n| n.as_ref())
            .collect::<Vec<_>>()
            .join(",");
        self.put_utf8(&joined);
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consumes the writer and returns the encoded payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Bounds-checked cursor over a received payload.
#[derive(Debug)]
pub struct WireReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    /// Creates a reader over `data`, positioned at the start.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let byte = *self
            .data
            .get(self.offset)
            .ok_or(DecodeError::Truncated)?;
        self.offset += 1;
        Ok(byte)
    }

    /// Reads a boolean. Any non-zero byte is `true` (RFC 4251 Section 5).
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads a big-endian `uint32`.
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        if self.remaining() < 4 {
            return Err(DecodeError::Truncated);
        }
        let bytes = [
            self.data[self.offset],
            self.data[self.offset + 1],
            self.data[self.offset + 2],
            self.data[self.offset + 3],
        ];
        self.offset += 4;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Reads an SSH `string` and borrows its bytes from the payload.
    pub fn read_string(&mut self) -> Result<&'a [u8], DecodeError> {
        let length = self.read_u32()? as usize;
        if length > self.remaining() {
            return Err(DecodeError::LengthOverflow);
        }
        let bytes = &self.data[self.offset..self.offset + length];
        self.offset += length;
        Ok(bytes)
    }

    /// Reads an SSH `string` that must hold UTF-8 text.
    pub fn read_utf8(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_string()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::BadUtf8)
    }

    /// Reads an `mpint`, returning the unsigned magnitude with any
    /// sign-padding byte stripped.
    pub fn read_mpint(&mut self) -> Result<Vec<u8>, DecodeError> {
        let bytes = self.read_string()?;
        match bytes.split_first() {
            Some((0, rest)) => Ok(rest.to_vec()),
            _ => Ok(bytes.to_vec()),
        }
    }

    /// Reads a `name-list` into its individual names.
    ///
    /// An empty string decodes as an empty list.
    pub fn read_name_list(&mut self) -> Result<Vec<String>, DecodeError> {
        let joined = self.read_utf8()?;
        if joined.is_empty() {
            return Ok(Vec::new());
        }
        Ok(joined.split(',').map(String::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_round_trip() {
        let mut w = WireWriter::new();
        w.put_u8(50);
        w.put_bool(true);
        w.put_bool(false);
        w.put_u32(0xDEAD_BEEF);
        let bytes = w.into_bytes();
        assert_eq!(bytes, [50, 1, 0, 0xDE, 0xAD, 0xBE, 0xEF]);

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_u8().unwrap(), 50);
        assert!(r.read_bool().unwrap());
        assert!(!r.read_bool().unwrap());
        assert_eq!(r.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_string_layout() {
        let mut w = WireWriter::new();
        w.put_utf8("abcd");
        assert_eq!(w.into_bytes(), [0, 0, 0, 4, 97, 98, 99, 100]);
    }

    #[test]
    fn test_empty_string() {
        let mut w = WireWriter::new();
        w.put_string(b"");
        let bytes = w.into_bytes();
        assert_eq!(bytes, [0, 0, 0, 0]);

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), b"");
    }

    #[test]
    fn test_name_list_round_trip() {
        let mut w = WireWriter::new();
        w.put_name_list(&["publickey", "password"]);
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        assert_eq!(
            r.read_name_list().unwrap(),
            vec!["publickey".to_string(), "password".to_string()]
        );
    }

    #[test]
    fn test_empty_name_list() {
        let mut w = WireWriter::new();
        w.put_name_list::<&str>(&[]);
        assert_eq!(w.into_bytes(), [0, 0, 0, 0]);

        let mut r = WireReader::new(&[0, 0, 0, 0]);
        assert!(r.read_name_list().unwrap().is_empty());
    }

    #[test]
    fn test_mpint_high_bit_padding() {
        let mut w = WireWriter::new();
        w.put_mpint(&[0x80, 0x01]);
        let bytes = w.into_bytes();
        assert_eq!(bytes, [0, 0, 0, 3, 0x00, 0x80, 0x01]);

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_mpint().unwrap(), [0x80, 0x01]);
    }

    #[test]
    fn test_mpint_trims_leading_zeros() {
        let mut w = WireWriter::new();
        w.put_mpint(&[0x00, 0x00, 0x7F]);
        assert_eq!(w.into_bytes(), [0, 0, 0, 1, 0x7F]);
    }

    #[test]
    fn test_mpint_zero() {
        let mut w = WireWriter::new();
        w.put_mpint(&[0x00, 0x00]);
        assert_eq!(w.into_bytes(), [0, 0, 0, 0]);
    }

    #[test]
    fn test_truncated_u32() {
        let mut r = WireReader::new(&[0, 0, 1]);
        assert_eq!(r.read_u32(), Err(DecodeError::Truncated));
    }

    #[test]
    fn test_length_overflow() {
        // Claims 16 bytes of content but carries only 2.
        let mut r = WireReader::new(&[0, 0, 0, 16, 1, 2]);
        assert_eq!(r.read_string(), Err(DecodeError::LengthOverflow));
    }

    #[test]
    fn test_bad_utf8() {
        let mut w = WireWriter::new();
        w.put_string(&[0xFF, 0xFE]);
        let bytes = w.into_bytes();

        let mut r = WireReader::new(&bytes);
        assert_eq!(r.read_utf8(), Err(DecodeError::BadUtf8));
    }

    #[test]
    fn test_empty_reader() {
        let mut r = WireReader::new(&[]);
        assert_eq!(r.read_u8(), Err(DecodeError::Truncated));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_decode_error_to_skiff_error() {
        let err: SkiffError = DecodeError::Truncated.into();
        assert!(matches!(err, SkiffError::Protocol(_)));
    }
}
