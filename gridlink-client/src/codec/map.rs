//! Codec for distributed-map operations and entry-event push messages.

use gridlink_core::protocol::constants::*;
use gridlink_core::{ClientMessage, Result, RoutableKey};
use uuid::Uuid;

use super::{
    bool_frame, data_frame, frame_at, int_frame, long_frame, nullable_bytes, nullable_data_frame,
    read_bool, read_i32, read_uuid, string_frame, uuid_frame,
};

/// TTL sentinel meaning "no expiry".
pub const TTL_UNSET: i64 = -1;

/// Encodes a `containsKey` request routed to the key's partition.
pub fn encode_contains_key(name: &str, key: &RoutableKey, partition_id: i32) -> ClientMessage {
    let mut message = ClientMessage::create_for_encode(MAP_CONTAINS_KEY, partition_id);
    message.add_frame(string_frame(name));
    message.add_frame(data_frame(key.data()));
    message
}

/// Encodes a `get` request routed to the key's partition.
pub fn encode_get(name: &str, key: &RoutableKey, partition_id: i32) -> ClientMessage {
    let mut message = ClientMessage::create_for_encode(MAP_GET, partition_id);
    message.add_frame(string_frame(name));
    message.add_frame(data_frame(key.data()));
    message
}

/// Encodes a `put` request routed to the key's partition.
pub fn encode_put(
    name: &str,
    key: &RoutableKey,
    value: &[u8],
    ttl_millis: i64,
    partition_id: i32,
) -> ClientMessage {
    let mut message = ClientMessage::create_for_encode(MAP_PUT, partition_id);
    message.add_frame(string_frame(name));
    message.add_frame(data_frame(key.data()));
    message.add_frame(data_frame(value));
    message.add_frame(long_frame(ttl_millis));
    message
}

/// Encodes a `remove` request routed to the key's partition.
pub fn encode_remove(name: &str, key: &RoutableKey, partition_id: i32) -> ClientMessage {
    let mut message = ClientMessage::create_for_encode(MAP_REMOVE, partition_id);
    message.add_frame(string_frame(name));
    message.add_frame(data_frame(key.data()));
    message
}

/// Encodes a `size` request (not key-routed).
pub fn encode_size(name: &str) -> ClientMessage {
    let mut message = ClientMessage::new_request(MAP_SIZE);
    message.add_frame(string_frame(name));
    message
}

/// Encodes an entry-listener registration request.
pub fn encode_add_entry_listener(name: &str, include_value: bool, flags: i32) -> ClientMessage {
    let mut message = ClientMessage::new_request(MAP_ADD_ENTRY_LISTENER);
    message.add_frame(string_frame(name));
    message.add_frame(bool_frame(include_value));
    message.add_frame(int_frame(flags));
    message.add_frame(bool_frame(false)); // local only
    message
}

/// Encodes an entry-listener removal request.
pub fn encode_remove_entry_listener(name: &str, registration_id: Uuid) -> ClientMessage {
    let mut message = ClientMessage::new_request(MAP_REMOVE_ENTRY_LISTENER);
    message.add_frame(string_frame(name));
    message.add_frame(uuid_frame(registration_id));
    message
}

/// Decodes a response whose payload is a nullable serialized value.
pub fn decode_value_response(response: &ClientMessage) -> Result<Option<Vec<u8>>> {
    Ok(nullable_bytes(frame_at(response, 1)?))
}

/// Decodes a boolean response.
pub fn decode_bool_response(response: &ClientMessage) -> Result<bool> {
    read_bool(frame_at(response, 1)?)
}

/// Decodes an integer response.
pub fn decode_int_response(response: &ClientMessage) -> Result<i32> {
    read_i32(frame_at(response, 1)?)
}

/// Decodes a listener-registration response into the registration ID.
pub fn decode_registration_response(response: &ClientMessage) -> Result<Uuid> {
    read_uuid(frame_at(response, 1)?)
}

/// Encodes a response carrying a nullable serialized value.
pub fn encode_value_response(
    message_type: i32,
    correlation_id: i64,
    value: Option<&[u8]>,
) -> ClientMessage {
    let mut message = ClientMessage::create_response(message_type, correlation_id);
    message.add_frame(nullable_data_frame(value));
    message
}

/// Encodes a boolean response.
pub fn encode_bool_response(message_type: i32, correlation_id: i64, value: bool) -> ClientMessage {
    let mut message = ClientMessage::create_response(message_type, correlation_id);
    message.add_frame(bool_frame(value));
    message
}

/// Encodes an integer response.
pub fn encode_int_response(message_type: i32, correlation_id: i64, value: i32) -> ClientMessage {
    let mut message = ClientMessage::create_response(message_type, correlation_id);
    message.add_frame(int_frame(value));
    message
}

/// Encodes a listener-registration response.
pub fn encode_registration_response(correlation_id: i64, registration_id: Uuid) -> ClientMessage {
    let mut message = ClientMessage::create_response(MAP_ADD_ENTRY_LISTENER, correlation_id);
    message.add_frame(uuid_frame(registration_id));
    message
}

/// A decoded entry-event push message, values still in serialized form.
#[derive(Debug, Clone)]
pub struct RawEntryEvent {
    /// The registration this event is tagged with.
    pub registration_id: Uuid,
    /// The event kind's bit flag.
    pub kind_flag: i32,
    /// Identity of the member that originated the event.
    pub member: Uuid,
    /// Number of entries affected, for bulk events.
    pub affected_entries: i32,
    /// Serialized key, absent for bulk events.
    pub key: Option<Vec<u8>>,
    /// Serialized new value.
    pub value: Option<Vec<u8>>,
    /// Serialized old value.
    pub old_value: Option<Vec<u8>>,
    /// Serialized merging value, set only for merge events.
    pub merging_value: Option<Vec<u8>>,
}

/// Encodes an entry-event push message.
#[allow(clippy::too_many_arguments)]
pub fn encode_entry_event(
    registration_id: Uuid,
    kind_flag: i32,
    member: Uuid,
    affected_entries: i32,
    key: Option<&[u8]>,
    value: Option<&[u8]>,
    old_value: Option<&[u8]>,
    merging_value: Option<&[u8]>,
) -> ClientMessage {
    let mut message = ClientMessage::create_event(MAP_ENTRY_EVENT);
    message.add_frame(uuid_frame(registration_id));
    message.add_frame(int_frame(kind_flag));
    message.add_frame(uuid_frame(member));
    message.add_frame(int_frame(affected_entries));
    message.add_frame(nullable_data_frame(key));
    message.add_frame(nullable_data_frame(value));
    message.add_frame(nullable_data_frame(old_value));
    message.add_frame(nullable_data_frame(merging_value));
    message
}

/// Reads only the registration ID off an entry-event message.
pub fn event_registration_id(message: &ClientMessage) -> Result<Uuid> {
    read_uuid(frame_at(message, 1)?)
}

/// Decodes an entry-event push message.
pub fn decode_entry_event(message: &ClientMessage) -> Result<RawEntryEvent> {
    Ok(RawEntryEvent {
        registration_id: read_uuid(frame_at(message, 1)?)?,
        kind_flag: read_i32(frame_at(message, 2)?)?,
        member: read_uuid(frame_at(message, 3)?)?,
        affected_entries: read_i32(frame_at(message, 4)?)?,
        key: nullable_bytes(frame_at(message, 5)?),
        value: nullable_bytes(frame_at(message, 6)?),
        old_value: nullable_bytes(frame_at(message, 7)?),
        merging_value: nullable_bytes(frame_at(message, 8)?),
    })
}
