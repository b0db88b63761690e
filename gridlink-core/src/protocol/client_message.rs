//! ClientMessage type for multi-frame protocol messages.

use bytes::{BufMut, BytesMut};
use std::sync::atomic::{AtomicI64, Ordering};

use super::constants::*;
use super::frame::Frame;

/// Global correlation ID counter.
static CORRELATION_ID_COUNTER: AtomicI64 = AtomicI64::new(1);

/// Generates a unique correlation ID for a request.
pub fn next_correlation_id() -> i64 {
    CORRELATION_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A client message composed of one or more frames.
///
/// The first frame is the "initial frame" containing the message header
/// (type, correlation ID, partition ID for requests). Additional frames
/// carry the message payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientMessage {
    frames: Vec<Frame>,
}

impl ClientMessage {
    /// Creates a new empty client message.
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Creates a request message with the given type and partition ID.
    pub fn create_for_encode(message_type: i32, partition_id: i32) -> Self {
        let mut initial_frame = Frame::with_capacity(REQUEST_HEADER_SIZE, BEGIN_FLAG);
        initial_frame.content.put_i32_le(message_type);
        initial_frame.content.put_i64_le(next_correlation_id());
        initial_frame.content.put_i32_le(partition_id);

        Self {
            frames: vec![initial_frame],
        }
    }

    /// Creates a request message targeting any partition.
    pub fn new_request(message_type: i32) -> Self {
        Self::create_for_encode(message_type, PARTITION_ID_ANY)
    }

    /// Creates a response message correlated with the given request.
    pub fn create_response(message_type: i32, correlation_id: i64) -> Self {
        let mut initial_frame = Frame::with_capacity(RESPONSE_HEADER_SIZE, BEGIN_FLAG);
        initial_frame.content.put_i32_le(message_type);
        initial_frame.content.put_i64_le(correlation_id);

        Self {
            frames: vec![initial_frame],
        }
    }

    /// Creates an event message with the given type, flagged as a server push.
    pub fn create_event(message_type: i32) -> Self {
        let mut initial_frame =
            Frame::with_capacity(RESPONSE_HEADER_SIZE, BEGIN_FLAG | IS_EVENT_FLAG);
        initial_frame.content.put_i32_le(message_type);
        initial_frame.content.put_i64_le(0);

        Self {
            frames: vec![initial_frame],
        }
    }

    /// Creates a client message from received frames.
    pub fn from_frames(frames: Vec<Frame>) -> Self {
        Self { frames }
    }

    /// Returns the message type from the initial frame.
    pub fn message_type(&self) -> Option<i32> {
        self.read_i32_at(TYPE_FIELD_OFFSET)
    }

    /// Returns the correlation ID from the initial frame.
    pub fn correlation_id(&self) -> Option<i64> {
        self.frames.first().and_then(|f| {
            if f.content.len() >= CORRELATION_ID_OFFSET + 8 {
                let bytes: [u8; 8] = f.content[CORRELATION_ID_OFFSET..CORRELATION_ID_OFFSET + 8]
                    .try_into()
                    .ok()?;
                Some(i64::from_le_bytes(bytes))
            } else {
                None
            }
        })
    }

    /// Sets the correlation ID in the initial frame.
    pub fn set_correlation_id(&mut self, correlation_id: i64) {
        if let Some(frame) = self.frames.first_mut() {
            if frame.content.len() >= CORRELATION_ID_OFFSET + 8 {
                frame.content[CORRELATION_ID_OFFSET..CORRELATION_ID_OFFSET + 8]
                    .copy_from_slice(&correlation_id.to_le_bytes());
            }
        }
    }

    /// Returns the partition ID from the initial frame (for requests).
    pub fn partition_id(&self) -> Option<i32> {
        self.read_i32_at(PARTITION_ID_OFFSET)
    }

    fn read_i32_at(&self, offset: usize) -> Option<i32> {
        self.frames.first().and_then(|f| {
            if f.content.len() >= offset + 4 {
                let bytes: [u8; 4] = f.content[offset..offset + 4].try_into().ok()?;
                Some(i32::from_le_bytes(bytes))
            } else {
                None
            }
        })
    }

    /// Adds a frame to the message.
    pub fn add_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Adds a frame containing the given data bytes.
    pub fn add_frame_with_data(&mut self, data: &[u8]) {
        self.frames.push(Frame::new_data_frame(data));
    }

    /// Returns a reference to the initial (first) frame, if present.
    pub fn initial_frame(&self) -> Option<&Frame> {
        self.frames.first()
    }

    /// Returns a reference to all frames.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Returns the number of frames in the message.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the message has no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Writes all frames to the destination buffer.
    ///
    /// Sets the END flag on the last frame before writing.
    pub fn write_to(&mut self, dst: &mut BytesMut) {
        if let Some(last) = self.frames.last_mut() {
            last.flags |= END_FLAG;
        }
        for frame in &self.frames {
            frame.write_to(dst);
        }
    }

    /// Returns true if this message is flagged as a server-pushed event.
    pub fn is_event(&self) -> bool {
        self.frames
            .first()
            .map(|f| f.is_event_frame())
            .unwrap_or(false)
    }
}

impl Default for ClientMessage {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes the partition hash for the given key data.
///
/// Uses MurmurHash3 x86 32-bit so that every client process derives the
/// identical hash for identical key bytes. The result is non-negative.
pub fn compute_partition_hash(key: &[u8]) -> i32 {
    let hash = murmur_hash3_x86_32(key, 0x01000193);
    if hash == i32::MIN {
        0
    } else {
        hash.abs()
    }
}

fn murmur_hash3_x86_32(data: &[u8], seed: u32) -> i32 {
    const C1: u32 = 0xcc9e2d51;
    const C2: u32 = 0x1b873593;

    let len = data.len();
    let mut h1 = seed;
    let nblocks = len / 4;

    for i in 0..nblocks {
        let offset = i * 4;
        let k1 = u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ]);

        let k1 = k1.wrapping_mul(C1);
        let k1 = k1.rotate_left(15);
        let k1 = k1.wrapping_mul(C2);

        h1 ^= k1;
        h1 = h1.rotate_left(13);
        h1 = h1.wrapping_mul(5).wrapping_add(0xe6546b64);
    }

    let tail = &data[nblocks * 4..];
    let mut k1: u32 = 0;

    if tail.len() >= 3 {
        k1 ^= (tail[2] as u32) << 16;
    }
    if tail.len() >= 2 {
        k1 ^= (tail[1] as u32) << 8;
    }
    if !tail.is_empty() {
        k1 ^= tail[0] as u32;
        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(15);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= len as u32;
    h1 ^= h1 >> 16;
    h1 = h1.wrapping_mul(0x85ebca6b);
    h1 ^= h1 >> 13;
    h1 = h1.wrapping_mul(0xc2b2ae35);
    h1 ^= h1 >> 16;

    h1 as i32
}
