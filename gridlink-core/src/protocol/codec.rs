//! Framed encoder/decoder for client messages.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use super::constants::*;
use super::frame::Frame;
use super::ClientMessage;
use crate::error::{GridError, Result};

/// Codec for encoding and decoding client messages on a byte stream.
///
/// Implements `tokio_util::codec::{Encoder, Decoder}` for use with framed I/O.
#[derive(Debug, Default)]
pub struct ClientMessageCodec {
    /// Frames accumulated while decoding a multi-frame message.
    pending_frames: Vec<Frame>,
    in_message: bool,
}

impl ClientMessageCodec {
    /// Creates a new codec instance.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Encoder<ClientMessage> for ClientMessageCodec {
    type Error = GridError;

    fn encode(&mut self, mut item: ClientMessage, dst: &mut BytesMut) -> Result<()> {
        if item.is_empty() {
            return Err(GridError::Protocol(
                "cannot encode empty message".to_string(),
            ));
        }

        item.write_to(dst);
        Ok(())
    }
}

impl Decoder for ClientMessageCodec {
    type Item = ClientMessage;
    type Error = GridError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        loop {
            if src.len() < SIZE_OF_FRAME_LENGTH_FIELD {
                return Ok(None);
            }

            let frame_length = u32::from_le_bytes([src[0], src[1], src[2], src[3]]) as usize;
            if src.len() < SIZE_OF_FRAME_LENGTH_FIELD + frame_length {
                return Ok(None);
            }

            let frame = Frame::read_from(src)
                .ok_or_else(|| GridError::Protocol("failed to read frame".to_string()))?;

            let is_end = frame.is_end_frame();

            if frame.is_begin_frame() {
                self.pending_frames.clear();
                self.in_message = true;
            }

            if self.in_message {
                self.pending_frames.push(frame);
            }

            if is_end {
                self.in_message = false;
                let frames = std::mem::take(&mut self.pending_frames);
                return Ok(Some(ClientMessage::from_frames(frames)));
            }
        }
    }
}
