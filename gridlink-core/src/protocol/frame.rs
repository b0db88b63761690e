//! Frame type for the gridlink binary protocol.

use bytes::{Buf, BufMut, BytesMut};

use super::constants::*;

/// A single frame in the gridlink protocol.
///
/// Each frame consists of:
/// - A 4-byte length field (little-endian), counting flags + content
/// - A 2-byte flags field (little-endian)
/// - Variable-length content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame content (payload after flags).
    pub content: BytesMut,
    /// Frame flags indicating frame type and properties.
    pub flags: u16,
}

impl Frame {
    /// Creates a new frame with the given content and flags.
    pub fn new(content: BytesMut, flags: u16) -> Self {
        Self { content, flags }
    }

    /// Creates a new frame with content and default flags.
    pub fn with_content(content: BytesMut) -> Self {
        Self::new(content, DEFAULT_FLAGS)
    }

    /// Creates a new empty frame with the given flags.
    pub fn with_flags(flags: u16) -> Self {
        Self::new(BytesMut::new(), flags)
    }

    /// Creates a new frame with the given capacity and flags.
    pub fn with_capacity(capacity: usize, flags: u16) -> Self {
        Self::new(BytesMut::with_capacity(capacity), flags)
    }

    /// Creates a frame carrying the given data bytes with default flags.
    pub fn new_data_frame(data: &[u8]) -> Self {
        Self::with_content(BytesMut::from(data))
    }

    /// Creates a null frame (represents a null value).
    pub fn new_null_frame() -> Self {
        Self::with_flags(IS_NULL_FLAG)
    }

    /// Returns true if this frame has the BEGIN flag set.
    pub fn is_begin_frame(&self) -> bool {
        self.flags & BEGIN_FLAG != 0
    }

    /// Returns true if this frame has the END flag set.
    pub fn is_end_frame(&self) -> bool {
        self.flags & END_FLAG != 0
    }

    /// Returns true if this frame has the NULL flag set.
    pub fn is_null_frame(&self) -> bool {
        self.flags & IS_NULL_FLAG != 0
    }

    /// Returns true if this frame has the EVENT flag set.
    pub fn is_event_frame(&self) -> bool {
        self.flags & IS_EVENT_FLAG != 0
    }

    /// Returns the size of this frame on the wire, header included.
    pub fn wire_size(&self) -> usize {
        FRAME_HEADER_SIZE + self.content.len()
    }

    /// Returns the value written in the length field (flags + content length).
    pub fn frame_length(&self) -> usize {
        SIZE_OF_FRAME_FLAGS_FIELD + self.content.len()
    }

    /// Writes this frame to the given buffer.
    pub fn write_to(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_size());
        dst.put_u32_le(self.frame_length() as u32);
        dst.put_u16_le(self.flags);
        dst.put_slice(&self.content);
    }

    /// Reads a frame from the given buffer.
    ///
    /// Returns `None` if there isn't enough data for a complete frame.
    pub fn read_from(src: &mut BytesMut) -> Option<Self> {
        if src.len() < SIZE_OF_FRAME_LENGTH_FIELD {
            return None;
        }

        let frame_length = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
        if frame_length < SIZE_OF_FRAME_FLAGS_FIELD
            || src.len() < SIZE_OF_FRAME_LENGTH_FIELD + frame_length
        {
            return None;
        }

        src.advance(SIZE_OF_FRAME_LENGTH_FIELD);
        let flags = src.get_u16_le();
        let content = src.split_to(frame_length - SIZE_OF_FRAME_FLAGS_FIELD);

        Some(Self::new(content, flags))
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::with_flags(DEFAULT_FLAGS)
    }
}
