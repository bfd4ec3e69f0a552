//! Integration tests for admin packet framing
//!
//! These tests feed the codec the way a socket would: whole streams, arbitrary
//! fragments, and several packets per read.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use ttd_admin::core::codec::AdminCodec;
use ttd_admin::core::packet::RawPacket;
use ttd_admin::error::ProtocolError;

fn stream_of(packets: &[RawPacket]) -> Vec<u8> {
    packets.iter().flat_map(|p| p.to_bytes()).collect()
}

fn sample_packets() -> Vec<RawPacket> {
    vec![
        RawPacket::new(103, vec![3, 1, 0, 0, 0x0B, 0, 0]),
        RawPacket::new(104, b"srv\0ver\0\x01map\0\x01\x02\x03\x04\x00\0\0\0\0\x00\x01\x00\x01".to_vec()),
        RawPacket::new(106, Vec::new()),
        RawPacket::new(107, vec![84, 252, 10, 0]),
        RawPacket::new(125, b"pause\0".to_vec()),
    ]
}

/// Feed `chunks` one at a time, draining every complete packet after each.
fn decode_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Vec<RawPacket> {
    let mut codec = AdminCodec;
    let mut buffer = BytesMut::new();
    let mut out = Vec::new();
    for chunk in chunks {
        buffer.extend_from_slice(chunk);
        while let Some(packet) = codec.decode(&mut buffer).expect("Failed to decode") {
            out.push(packet);
        }
    }
    assert!(buffer.is_empty(), "bytes left over: {buffer:?}");
    out
}

#[test]
fn test_whole_stream_in_one_read() {
    let packets = sample_packets();
    let bytes = stream_of(&packets);
    assert_eq!(decode_chunks([&bytes[..]]), packets);
}

#[test]
fn test_byte_at_a_time() {
    let packets = sample_packets();
    let bytes = stream_of(&packets);
    assert_eq!(decode_chunks(bytes.chunks(1)), packets);
}

#[test]
fn test_every_two_way_split() {
    let packets = sample_packets();
    let bytes = stream_of(&packets);
    for split in 0..=bytes.len() {
        let (a, b) = bytes.split_at(split);
        assert_eq!(decode_chunks([a, b]), packets, "split at {split}");
    }
}

#[test]
fn test_partial_packet_preserves_buffer() {
    let mut codec = AdminCodec;
    let bytes = RawPacket::new(120, b"\x01\x00hello\0".to_vec()).to_bytes();

    let mut buffer = BytesMut::from(&bytes[..bytes.len() - 1]);
    assert!(codec.decode(&mut buffer).expect("Decode should not error").is_none());
    assert_eq!(buffer.len(), bytes.len() - 1);

    buffer.extend_from_slice(&bytes[bytes.len() - 1..]);
    let packet = codec
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(packet.kind, 120);
    assert_eq!(buffer.len(), 0);
}

#[test]
fn test_undersized_header_after_valid_packet() {
    let mut codec = AdminCodec;
    let mut buffer = BytesMut::new();
    buffer.extend_from_slice(&RawPacket::new(107, vec![0, 0, 0, 0]).to_bytes());
    buffer.extend_from_slice(&[1, 0, 0xFF, 0xFF]);

    let first = codec.decode(&mut buffer).expect("first packet is valid");
    assert!(first.is_some());

    // the second header can never advance the buffer
    for _ in 0..3 {
        assert!(matches!(
            codec.decode(&mut buffer),
            Err(ProtocolError::UndersizedPacket(1))
        ));
    }
}

#[test]
fn test_zero_length_header_is_fault() {
    let mut codec = AdminCodec;
    let mut buffer = BytesMut::from(&[0u8, 0][..]);
    let err = codec.decode(&mut buffer).unwrap_err();
    assert!(err.is_connection_fault());
}

#[test]
fn test_encode_then_frame_many() {
    let mut codec = AdminCodec;
    let mut buffer = BytesMut::with_capacity(256);

    for i in 0..10u8 {
        codec
            .encode(RawPacket::new(5, vec![b'a' + i, 0]), &mut buffer)
            .expect("Failed to encode");
    }
    assert_eq!(buffer.len(), 10 * 5);

    let mut count = 0u8;
    while let Some(packet) = codec.decode(&mut buffer).expect("Failed to decode") {
        assert_eq!(packet.kind, 5);
        assert_eq!(packet.payload[0], b'a' + count);
        count += 1;
    }
    assert_eq!(count, 10);
}

#[test]
fn test_largest_packet_frames() {
    let mut codec = AdminCodec;
    let mut buffer = BytesMut::new();
    let payload = vec![0xAB; ttd_admin::core::packet::MAX_PAYLOAD_SIZE];
    codec
        .encode(RawPacket::new(121, payload), &mut buffer)
        .expect("Failed to encode");
    assert_eq!(&buffer[..2], &[0xFF, 0xFF]);

    let packet = codec
        .decode(&mut buffer)
        .expect("Failed to decode")
        .expect("Should have packet");
    assert_eq!(packet.payload.len(), ttd_admin::core::packet::MAX_PAYLOAD_SIZE);
}
