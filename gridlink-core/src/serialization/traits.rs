//! Serialization traits and implementations for common types.

use super::{DataInput, DataOutput};
use crate::error::{GridError, Result};

/// Trait for types that can be serialized to the grid's binary format.
pub trait Serializable {
    /// Serializes this value to the given output.
    fn serialize<W: DataOutput>(&self, output: &mut W) -> Result<()>;

    /// Convenience method: serializes this value to a byte vector.
    fn to_bytes(&self) -> Result<Vec<u8>>
    where
        Self: Sized,
    {
        let mut output = super::ObjectDataOutput::new();
        self.serialize(&mut output)?;
        Ok(output.into_bytes())
    }
}

/// Trait for types that can be deserialized from the grid's binary format.
pub trait Deserializable: Sized {
    /// Deserializes a value from the given input.
    fn deserialize<R: DataInput>(input: &mut R) -> Result<Self>;

    /// Convenience method: deserializes a value from a byte slice.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut input = super::ObjectDataInput::new(data);
        Self::deserialize(&mut input)
    }
}

impl Serializable for bool {
    fn serialize<W: DataOutput>(&self, output: &mut W) -> Result<()> {
        output.write_bool(*self)
    }
}

impl Deserializable for bool {
    fn deserialize<R: DataInput>(input: &mut R) -> Result<Self> {
        input.read_bool()
    }
}

impl Serializable for i32 {
    fn serialize<W: DataOutput>(&self, output: &mut W) -> Result<()> {
        output.write_int(*self)
    }
}

impl Deserializable for i32 {
    fn deserialize<R: DataInput>(input: &mut R) -> Result<Self> {
        input.read_int()
    }
}

impl Serializable for i64 {
    fn serialize<W: DataOutput>(&self, output: &mut W) -> Result<()> {
        output.write_long(*self)
    }
}

impl Deserializable for i64 {
    fn deserialize<R: DataInput>(input: &mut R) -> Result<Self> {
        input.read_long()
    }
}

impl Serializable for f64 {
    fn serialize<W: DataOutput>(&self, output: &mut W) -> Result<()> {
        output.write_double(*self)
    }
}

impl Deserializable for f64 {
    fn deserialize<R: DataInput>(input: &mut R) -> Result<Self> {
        input.read_double()
    }
}

impl Serializable for String {
    fn serialize<W: DataOutput>(&self, output: &mut W) -> Result<()> {
        output.write_string(self)
    }
}

impl Deserializable for String {
    fn deserialize<R: DataInput>(input: &mut R) -> Result<Self> {
        input.read_string()
    }
}

impl Serializable for &str {
    fn serialize<W: DataOutput>(&self, output: &mut W) -> Result<()> {
        output.write_string(self)
    }
}

impl Serializable for Vec<u8> {
    fn serialize<W: DataOutput>(&self, output: &mut W) -> Result<()> {
        output.write_int(self.len() as i32)?;
        output.write_bytes(self)
    }
}

impl Deserializable for Vec<u8> {
    fn deserialize<R: DataInput>(input: &mut R) -> Result<Self> {
        let len = input.read_int()?;
        if len < 0 {
            return Err(GridError::Serialization(format!(
                "invalid byte array length: {}",
                len
            )));
        }
        input.read_bytes(len as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrip() {
        let original = "grid-value".to_string();
        let bytes = original.to_bytes().unwrap();
        assert_eq!(String::from_bytes(&bytes).unwrap(), original);
    }

    #[test]
    fn test_i64_roundtrip() {
        let bytes = (-42i64).to_bytes().unwrap();
        assert_eq!(i64::from_bytes(&bytes).unwrap(), -42);
    }

    #[test]
    fn test_identical_values_serialize_identically() {
        let a = "same-key".to_string().to_bytes().unwrap();
        let b = "same-key".to_string().to_bytes().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_byte_vec_roundtrip() {
        let original = vec![0u8, 1, 2, 255];
        let bytes = original.to_bytes().unwrap();
        assert_eq!(Vec::<u8>::from_bytes(&bytes).unwrap(), original);
    }

    #[test]
    fn test_negative_byte_vec_length_fails() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        assert!(matches!(
            Vec::<u8>::from_bytes(&data),
            Err(GridError::Serialization(_))
        ));
    }
}
