//! # Admin Packet Codec
//!
//! Tokio codec that frames admin packets over a TCP byte stream.
//!
//! Decoding works against the accumulating read buffer owned by `FramedRead`:
//! each call extracts at most one packet from the head of the buffer and leaves
//! partial packets untouched, so a single socket read may yield zero, one or many
//! packets. A length header below [`HEADER_SIZE`] can never advance the buffer and
//! is reported as [`ProtocolError::UndersizedPacket`], which ends the connection.

use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::core::packet::{RawPacket, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::error::{ProtocolError, Result};

const LENGTH_SIZE: usize = 2;

#[derive(Debug, Default, Clone, Copy)]
pub struct AdminCodec;

impl Decoder for AdminCodec {
    type Item = RawPacket;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if src.len() < LENGTH_SIZE {
            return Ok(None);
        }

        let total_len = u16::from_le_bytes([src[0], src[1]]);
        if (total_len as usize) < HEADER_SIZE {
            return Err(ProtocolError::UndersizedPacket(total_len));
        }

        let total_len = total_len as usize;
        if src.len() < total_len {
            src.reserve(total_len - src.len());
            return Ok(None);
        }

        let mut frame = src.split_to(total_len);
        frame.advance(LENGTH_SIZE);
        let kind = frame.get_u8();
        trace!(kind, len = total_len, "framed packet");

        Ok(Some(RawPacket {
            kind,
            payload: frame.freeze(),
        }))
    }
}

impl Encoder<RawPacket> for AdminCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: RawPacket, dst: &mut BytesMut) -> Result<()> {
        if item.payload.len() > MAX_PAYLOAD_SIZE {
            return Err(ProtocolError::OversizedPacket(item.payload.len()));
        }

        dst.reserve(item.wire_len());
        dst.put_u16_le(item.wire_len() as u16);
        dst.put_u8(item.kind);
        dst.extend_from_slice(&item.payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_partial_header_waits() {
        let mut codec = AdminCodec;
        let mut buf = BytesMut::from(&[7u8][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_partial_body_waits() {
        let mut codec = AdminCodec;
        let mut buf = BytesMut::from(&[7u8, 0, 107, 1, 2][..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        assert_eq!(buf.len(), 5);

        buf.extend_from_slice(&[3, 4]);
        let packet = codec.decode(&mut buf).unwrap().expect("complete packet");
        assert_eq!(packet.kind, 107);
        assert_eq!(&packet.payload[..], &[1, 2, 3, 4]);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_header_only_packet() {
        let mut codec = AdminCodec;
        let mut buf = BytesMut::from(&[3u8, 0, 106][..]);
        let packet = codec.decode(&mut buf).unwrap().expect("complete packet");
        assert_eq!(packet.kind, 106);
        assert!(packet.payload.is_empty());
    }

    #[test]
    fn test_undersized_lengths_are_fatal() {
        for len in 0u16..3 {
            let mut codec = AdminCodec;
            let mut buf = BytesMut::new();
            buf.put_u16_le(len);
            buf.extend_from_slice(&[104, 0, 0, 0]);
            match codec.decode(&mut buf) {
                Err(ProtocolError::UndersizedPacket(l)) => assert_eq!(l, len),
                other => panic!("expected undersized error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_encode_prefixes_length() {
        let mut codec = AdminCodec;
        let mut buf = BytesMut::new();
        codec
            .encode(RawPacket::new(2, vec![0, 0, 2, 0]), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], &[7, 0, 2, 0, 0, 2, 0]);
    }

    #[test]
    fn test_encode_rejects_oversized_payload() {
        let mut codec = AdminCodec;
        let mut buf = BytesMut::new();
        let result = codec.encode(RawPacket::new(5, vec![b'a'; MAX_PAYLOAD_SIZE + 1]), &mut buf);
        assert!(matches!(result, Err(ProtocolError::OversizedPacket(_))));
        assert!(buf.is_empty());
    }
}
