//! Protocol constants for the gridlink binary protocol.

/// Size of the frame length field in bytes.
pub const SIZE_OF_FRAME_LENGTH_FIELD: usize = 4;

/// Size of the frame flags field in bytes.
pub const SIZE_OF_FRAME_FLAGS_FIELD: usize = 2;

/// Total frame header size (length + flags).
pub const FRAME_HEADER_SIZE: usize = SIZE_OF_FRAME_LENGTH_FIELD + SIZE_OF_FRAME_FLAGS_FIELD;

/// Begin frame flag - marks the start of a client message.
pub const BEGIN_FLAG: u16 = 1 << 15;

/// End frame flag - marks the end of a client message.
pub const END_FLAG: u16 = 1 << 14;

/// Event flag - indicates an unsolicited server-pushed event message.
pub const IS_EVENT_FLAG: u16 = 1 << 12;

/// Null frame flag - indicates a null value.
pub const IS_NULL_FLAG: u16 = 1 << 10;

/// Default frame flags (no special flags set).
pub const DEFAULT_FLAGS: u16 = 0;

/// Offset of message type in initial frame content.
pub const TYPE_FIELD_OFFSET: usize = 0;

/// Offset of correlation ID in initial frame content.
pub const CORRELATION_ID_OFFSET: usize = TYPE_FIELD_OFFSET + 4;

/// Offset of partition ID in request initial frame.
pub const PARTITION_ID_OFFSET: usize = CORRELATION_ID_OFFSET + 8;

/// Size of the request initial frame header.
pub const REQUEST_HEADER_SIZE: usize = PARTITION_ID_OFFSET + 4;

/// Size of the response initial frame header (type + correlation ID).
pub const RESPONSE_HEADER_SIZE: usize = CORRELATION_ID_OFFSET + 8;

/// Partition ID indicating no specific partition (-1).
pub const PARTITION_ID_ANY: i32 = -1;

// Message type constants.

/// Cluster "get partitions" request.
pub const CLUSTER_GET_PARTITIONS: i32 = 0x000800;

/// Map put request.
pub const MAP_PUT: i32 = 0x010100;

/// Map get request.
pub const MAP_GET: i32 = 0x010200;

/// Map remove request.
pub const MAP_REMOVE: i32 = 0x010300;

/// Map size request.
pub const MAP_SIZE: i32 = 0x010500;

/// Map contains key request.
pub const MAP_CONTAINS_KEY: i32 = 0x010900;

/// Map add entry listener request.
pub const MAP_ADD_ENTRY_LISTENER: i32 = 0x011900;

/// Map remove entry listener request.
pub const MAP_REMOVE_ENTRY_LISTENER: i32 = 0x011A00;

/// Map entry event push message.
pub const MAP_ENTRY_EVENT: i32 = 0x011B00;
