//! Data output traits and implementations.

use crate::error::Result;
use bytes::{BufMut, BytesMut};

/// Trait for writing primitive values in the grid's binary format.
///
/// All multi-byte values are written in big-endian byte order.
pub trait DataOutput {
    /// Writes a single byte (i8).
    fn write_byte(&mut self, v: i8) -> Result<()>;

    /// Writes a boolean as a single byte (0 for false, 1 for true).
    fn write_bool(&mut self, v: bool) -> Result<()>;

    /// Writes a 32-bit signed integer in big-endian order.
    fn write_int(&mut self, v: i32) -> Result<()>;

    /// Writes a 64-bit signed integer in big-endian order.
    fn write_long(&mut self, v: i64) -> Result<()>;

    /// Writes a 64-bit floating point in big-endian order.
    fn write_double(&mut self, v: f64) -> Result<()>;

    /// Writes raw bytes without length prefix.
    fn write_bytes(&mut self, v: &[u8]) -> Result<()>;

    /// Writes a string with its length prefix.
    fn write_string(&mut self, v: &str) -> Result<()>;
}

/// A buffer-based implementation of `DataOutput`.
#[derive(Debug, Default)]
pub struct ObjectDataOutput {
    buffer: BytesMut,
}

impl ObjectDataOutput {
    /// Creates a new `ObjectDataOutput` with default capacity.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(256),
        }
    }

    /// Returns the written bytes as a slice.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the output and returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer.to_vec()
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl DataOutput for ObjectDataOutput {
    fn write_byte(&mut self, v: i8) -> Result<()> {
        self.buffer.put_i8(v);
        Ok(())
    }

    fn write_bool(&mut self, v: bool) -> Result<()> {
        self.buffer.put_u8(v as u8);
        Ok(())
    }

    fn write_int(&mut self, v: i32) -> Result<()> {
        self.buffer.put_i32(v);
        Ok(())
    }

    fn write_long(&mut self, v: i64) -> Result<()> {
        self.buffer.put_i64(v);
        Ok(())
    }

    fn write_double(&mut self, v: f64) -> Result<()> {
        self.buffer.put_f64(v);
        Ok(())
    }

    fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.buffer.put_slice(v);
        Ok(())
    }

    fn write_string(&mut self, v: &str) -> Result<()> {
        self.write_int(v.len() as i32)?;
        self.write_bytes(v.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_int_big_endian() {
        let mut out = ObjectDataOutput::new();
        out.write_int(0x01020304).unwrap();
        assert_eq!(out.as_bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_write_string_prefixed() {
        let mut out = ObjectDataOutput::new();
        out.write_string("hi").unwrap();
        assert_eq!(out.as_bytes(), &[0, 0, 0, 2, b'h', b'i']);
    }

    #[test]
    fn test_write_bool() {
        let mut out = ObjectDataOutput::new();
        out.write_bool(true).unwrap();
        out.write_bool(false).unwrap();
        assert_eq!(out.as_bytes(), &[1, 0]);
    }

    #[test]
    fn test_into_bytes() {
        let mut out = ObjectDataOutput::new();
        out.write_long(-1).unwrap();
        let bytes = out.into_bytes();
        assert_eq!(bytes.len(), 8);
        assert!(bytes.iter().all(|&b| b == 0xFF));
    }
}
