//! Multi-frame binary protocol used between the client and cluster members.

mod client_message;
mod codec;
pub mod constants;
mod frame;

pub use client_message::{compute_partition_hash, next_correlation_id, ClientMessage};
pub use codec::ClientMessageCodec;
pub use frame::Frame;
