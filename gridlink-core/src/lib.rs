//! Core types and wire protocol for the gridlink data-grid client.

#![warn(missing_docs)]

pub mod error;
pub mod protocol;
pub mod serialization;

pub use error::{GridError, Result};
pub use protocol::{compute_partition_hash, ClientMessage, ClientMessageCodec, Frame};
pub use serialization::{
    DataInput, DataOutput, Deserializable, ObjectDataInput, ObjectDataOutput, RoutableKey,
    Serializable,
};
