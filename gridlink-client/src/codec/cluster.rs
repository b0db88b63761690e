//! Codec for cluster-metadata operations.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::{BufMut, BytesMut};
use gridlink_core::protocol::constants::CLUSTER_GET_PARTITIONS;
use gridlink_core::{ClientMessage, Frame, GridError, Result};

use super::{frame_at, read_string, string_frame};

/// Encodes a "get partitions" request.
pub fn encode_get_partitions() -> ClientMessage {
    ClientMessage::new_request(CLUSTER_GET_PARTITIONS)
}

/// Encodes a "get partitions" response: per member, the address and the
/// list of partition IDs it owns.
pub fn encode_get_partitions_response(
    correlation_id: i64,
    owners: &HashMap<SocketAddr, Vec<i32>>,
) -> ClientMessage {
    let mut message = ClientMessage::create_response(CLUSTER_GET_PARTITIONS, correlation_id);
    for (address, partitions) in owners {
        message.add_frame(string_frame(&address.to_string()));

        let mut buf = BytesMut::with_capacity(partitions.len() * 4);
        for &partition_id in partitions {
            buf.put_i32_le(partition_id);
        }
        message.add_frame(Frame::with_content(buf));
    }
    message
}

/// Decodes a "get partitions" response into an owner-address-keyed mapping.
pub fn decode_get_partitions_response(
    response: &ClientMessage,
) -> Result<HashMap<SocketAddr, Vec<i32>>> {
    let payload = &response.frames()[1.min(response.frame_count())..];
    if payload.len() % 2 != 0 {
        return Err(GridError::Protocol(
            "partition table payload must be address/partition-list pairs".to_string(),
        ));
    }

    let mut owners = HashMap::new();
    for pair in payload.chunks_exact(2) {
        let address: SocketAddr = read_string(&pair[0])?.parse().map_err(|e| {
            GridError::Protocol(format!("malformed member address in partition table: {}", e))
        })?;

        let ids_frame = &pair[1];
        if ids_frame.content.len() % 4 != 0 {
            return Err(GridError::Protocol(
                "malformed partition ID list".to_string(),
            ));
        }
        let partitions = ids_frame
            .content
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        owners.insert(address, partitions);
    }
    Ok(owners)
}
