//! Serialized keys carrying the partition hash used for routing.

use crate::error::Result;
use crate::protocol::compute_partition_hash;

use super::Serializable;

/// An opaque serialized key with an embedded partition hash.
///
/// Identical logical keys always produce identical bytes and therefore the
/// identical hash, so every client and the cluster agree on ownership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutableKey {
    data: Vec<u8>,
    partition_hash: i32,
}

impl RoutableKey {
    /// Serializes a user value into a routable key.
    pub fn from_value<T: Serializable>(value: &T) -> Result<Self> {
        let data = value.to_bytes()?;
        Ok(Self::from_bytes(data))
    }

    /// Wraps already-serialized key bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let partition_hash = compute_partition_hash(&data);
        Self {
            data,
            partition_hash,
        }
    }

    /// Returns the serialized key bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the non-negative hash used to pick the key's partition.
    pub fn partition_hash(&self) -> i32 {
        self.partition_hash
    }

    /// Returns true if the serialized representation is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
