//! Per-operation request/response codecs.
//!
//! Each operation owns an `encode_*` for the request, a `decode_*` for the
//! response, and — where the member side is exercised in tests — the matching
//! response encoder. Routing code never touches frames directly.

pub mod cluster;
pub mod map;

use bytes::{BufMut, BytesMut};
use gridlink_core::{ClientMessage, Frame, GridError, Result};
use uuid::Uuid;

pub(crate) fn string_frame(s: &str) -> Frame {
    Frame::new_data_frame(s.as_bytes())
}

pub(crate) fn data_frame(data: &[u8]) -> Frame {
    Frame::new_data_frame(data)
}

pub(crate) fn nullable_data_frame(data: Option<&[u8]>) -> Frame {
    match data {
        Some(data) => Frame::new_data_frame(data),
        None => Frame::new_null_frame(),
    }
}

pub(crate) fn bool_frame(value: bool) -> Frame {
    Frame::new_data_frame(&[value as u8])
}

pub(crate) fn int_frame(value: i32) -> Frame {
    let mut buf = BytesMut::with_capacity(4);
    buf.put_i32_le(value);
    Frame::with_content(buf)
}

pub(crate) fn long_frame(value: i64) -> Frame {
    let mut buf = BytesMut::with_capacity(8);
    buf.put_i64_le(value);
    Frame::with_content(buf)
}

pub(crate) fn uuid_frame(uuid: Uuid) -> Frame {
    Frame::new_data_frame(uuid.as_bytes())
}

pub(crate) fn frame_at<'a>(message: &'a ClientMessage, index: usize) -> Result<&'a Frame> {
    message.frames().get(index).ok_or_else(|| {
        GridError::Protocol(format!(
            "message has {} frames, expected at least {}",
            message.frame_count(),
            index + 1
        ))
    })
}

pub(crate) fn read_bool(frame: &Frame) -> Result<bool> {
    frame
        .content
        .first()
        .map(|&b| b != 0)
        .ok_or_else(|| GridError::Protocol("empty boolean frame".to_string()))
}

pub(crate) fn read_i32(frame: &Frame) -> Result<i32> {
    let bytes: [u8; 4] = frame.content[..]
        .try_into()
        .map_err(|_| GridError::Protocol("malformed int frame".to_string()))?;
    Ok(i32::from_le_bytes(bytes))
}

pub(crate) fn read_uuid(frame: &Frame) -> Result<Uuid> {
    let bytes: [u8; 16] = frame.content[..]
        .try_into()
        .map_err(|_| GridError::Protocol("malformed UUID frame".to_string()))?;
    Ok(Uuid::from_bytes(bytes))
}

pub(crate) fn read_string(frame: &Frame) -> Result<String> {
    std::str::from_utf8(&frame.content)
        .map(str::to_owned)
        .map_err(|e| GridError::Protocol(format!("malformed string frame: {}", e)))
}

pub(crate) fn nullable_bytes(frame: &Frame) -> Option<Vec<u8>> {
    if frame.is_null_frame() {
        None
    } else {
        Some(frame.content.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_frame_roundtrip() {
        assert!(read_bool(&bool_frame(true)).unwrap());
        assert!(!read_bool(&bool_frame(false)).unwrap());
    }

    #[test]
    fn test_int_frame_roundtrip() {
        assert_eq!(read_i32(&int_frame(-7)).unwrap(), -7);
    }

    #[test]
    fn test_uuid_frame_roundtrip() {
        let id = Uuid::new_v4();
        assert_eq!(read_uuid(&uuid_frame(id)).unwrap(), id);
    }

    #[test]
    fn test_nullable_frames() {
        assert_eq!(nullable_bytes(&nullable_data_frame(None)), None);
        assert_eq!(
            nullable_bytes(&nullable_data_frame(Some(b"x"))),
            Some(b"x".to_vec())
        );
    }

    #[test]
    fn test_read_i32_rejects_short_frame() {
        let frame = Frame::new_data_frame(&[1, 2]);
        assert!(read_i32(&frame).is_err());
    }
}
