use std::io::{self, Write};

use proptest::prelude::*;

use super::*;
use crate::utils::PacketError;

fn encode(packet: &mut ControlPacket) -> Vec<u8> {
    let mut out = Vec::new();
    packet.write_to(&mut out).unwrap();
    out
}

fn decode(bytes: &[u8]) -> Result<ControlPacket> {
    let mut reader = bytes;
    read_packet(&mut reader)
}

fn round_trip(packet: impl Into<ControlPacket>) -> (ControlPacket, ControlPacket) {
    let mut packet = packet.into();
    let bytes = encode(&mut packet);
    let decoded = decode(&bytes).unwrap();
    (packet, decoded)
}

#[test]
fn disconnect_is_two_header_bytes() {
    let mut packet = ControlPacket::from(DisconnectPacket::new());
    assert_eq!(encode(&mut packet), vec![0xE0, 0x00]);
    let (sent, decoded) = round_trip(DisconnectPacket::new());
    assert_eq!(sent, decoded);
}

#[test]
fn connack_round_trips_exhaustively() {
    for session_present in [false, true] {
        for return_code in 0..=u8::MAX {
            let (sent, decoded) = round_trip(ConnackPacket::new(session_present, return_code));
            assert_eq!(sent, decoded);
            assert_eq!(decoded.fixed_header().remaining_length, 2);
        }
    }
}

#[test]
fn connack_wire_format() {
    let mut packet = ControlPacket::from(ConnackPacket::new(true, 0));
    assert_eq!(encode(&mut packet), vec![0x20, 0x02, 0x01, 0x00]);
}

#[test]
fn pubrec_round_trips_exhaustively() {
    for message_id in 0..=u16::MAX {
        let (sent, decoded) = round_trip(PubrecPacket::new(message_id));
        assert_eq!(sent, decoded);
    }
}

#[test]
fn pubrec_wire_format() {
    let mut packet = ControlPacket::from(PubrecPacket::new(0x0102));
    assert_eq!(encode(&mut packet), vec![0x50, 0x02, 0x01, 0x02]);
}

#[test]
fn publish_wire_format() {
    let mut packet =
        ControlPacket::from(PublishPacket::new("a/b", QoS::AtLeastOnce, "hi").with_message_id(10));
    assert_eq!(
        encode(&mut packet),
        vec![
            0x32, 0x09, 0x00, 0x03, b'a', b'/', b'b', 0x00, 0x0A, b'h', b'i'
        ]
    );
}

#[test]
fn publish_qos0_omits_message_id() {
    let mut packet = ControlPacket::from(PublishPacket::new("t", QoS::AtMostOnce, "x"));
    assert_eq!(encode(&mut packet), vec![0x30, 0x04, 0x00, 0x01, b't', b'x']);
}

#[test]
fn publish_flags_pack_into_low_nibble() {
    let mut publish = PublishPacket::new("t", QoS::ExactlyOnce, Vec::<u8>::new()).with_message_id(1);
    publish.header.dup = true;
    publish.header.retain = true;
    let bytes = encode(&mut publish.into());
    assert_eq!(bytes[0], 0x3D);
}

#[test]
fn publish_underflow_is_an_error() {
    // qos 1, remaining length 6 but topic alone takes 5 and the id needs 2
    let bytes = [0x32, 0x06, 0x00, 0x03, b'a', b'/', b'b', b'x'];
    let err = decode(&bytes).unwrap_err();
    assert!(matches!(
        err,
        PacketError::PayloadUnderflow {
            remaining_length: 6,
            header_len: 7
        }
    ));
}

#[test]
fn publish_topic_longer_than_body_is_an_error() {
    let bytes = [0x30, 0x03, 0x00, 0x05, b'a'];
    assert!(matches!(
        decode(&bytes).unwrap_err(),
        PacketError::StringLengthMismatch { .. }
    ));
}

#[test]
fn truncated_body_is_an_error() {
    let bytes = [0x32, 0x09, 0x00, 0x03, b'a'];
    assert!(matches!(decode(&bytes).unwrap_err(), PacketError::Truncated));
}

#[test]
fn empty_stream_is_truncated() {
    assert!(matches!(decode(&[]).unwrap_err(), PacketError::Truncated));
}

#[test]
fn invalid_qos_bits_are_rejected() {
    let bytes = [0x36, 0x03, 0x00, 0x01, b't'];
    assert!(matches!(decode(&bytes).unwrap_err(), PacketError::InvalidQos(3)));
}

#[test]
fn unknown_and_unsupported_types_are_rejected() {
    assert!(matches!(
        decode(&[0x00, 0x00]).unwrap_err(),
        PacketError::UnknownPacketType(0)
    ));
    assert!(matches!(
        decode(&[0xF0, 0x00]).unwrap_err(),
        PacketError::UnknownPacketType(15)
    ));
    assert!(matches!(
        decode(&[0xC0, 0x00]).unwrap_err(),
        PacketError::UnsupportedPacketType(PacketType::Pingreq)
    ));
}

#[test]
fn factory_builds_each_supported_kind() {
    for packet_type in [
        PacketType::Connack,
        PacketType::Disconnect,
        PacketType::Publish,
        PacketType::Pubrec,
        PacketType::Suback,
        PacketType::Subscribe,
        PacketType::Unsubscribe,
    ] {
        let packet = ControlPacket::new(packet_type).unwrap();
        assert_eq!(packet.packet_type(), packet_type);
    }
    assert!(ControlPacket::new(PacketType::Puback).is_err());
}

#[test]
fn subscribe_header_carries_reserved_nibble() {
    let mut packet = ControlPacket::from(SubscribePacket::new(
        1,
        vec![("a".to_string(), QoS::AtLeastOnce)],
    ));
    assert_eq!(
        encode(&mut packet),
        vec![0x82, 0x06, 0x00, 0x01, 0x00, 0x01, b'a', 0x01]
    );
}

#[test]
fn subscribe_rejects_invalid_requested_qos() {
    let bytes = [0x82, 0x06, 0x00, 0x01, 0x00, 0x01, b'a', 0x03];
    assert!(matches!(decode(&bytes).unwrap_err(), PacketError::InvalidQos(3)));
}

#[test]
fn subscribe_stops_at_the_declared_length() {
    // remaining length covers a single filter; the trailing bytes belong to
    // the next frame (a DISCONNECT) and must be left on the stream.
    let bytes = [
        0x82, 0x06, 0x00, 0x07, 0x00, 0x01, b'a', 0x00, 0xE0, 0x00,
    ];
    let mut reader = &bytes[..];
    let first = read_packet(&mut reader).unwrap();
    match first {
        ControlPacket::Subscribe(s) => {
            assert_eq!(s.message_id, 7);
            assert_eq!(s.subscriptions, vec![("a".to_string(), QoS::AtMostOnce)]);
        }
        other => panic!("expected SUBSCRIBE, got {other}"),
    }
    let second = read_packet(&mut reader).unwrap();
    assert_eq!(second.packet_type(), PacketType::Disconnect);
}

#[test]
fn unsubscribe_keeps_trailing_empty_topic() {
    let bytes = [0xA2, 0x07, 0x00, 0x05, 0x00, 0x01, b'a', 0x00, 0x00];
    match decode(&bytes).unwrap() {
        ControlPacket::Unsubscribe(u) => {
            assert_eq!(u.message_id, 5);
            assert_eq!(u.topics, vec!["a".to_string(), String::new()]);
        }
        other => panic!("expected UNSUBSCRIBE, got {other}"),
    }
}

#[test]
fn suback_return_codes_fill_the_body() {
    let (sent, decoded) = round_trip(SubackPacket::new(
        3,
        vec![0x00, 0x01, 0x02, SUBACK_FAILURE],
    ));
    assert_eq!(sent, decoded);
    assert_eq!(decoded.fixed_header().remaining_length, 6);
}

#[test]
fn details_report_qos_and_message_id() {
    let publish = ControlPacket::from(
        PublishPacket::new("t", QoS::ExactlyOnce, "p").with_message_id(42),
    );
    assert_eq!(
        publish.details(),
        Details {
            qos: QoS::ExactlyOnce,
            message_id: 42
        }
    );

    let subscribe = ControlPacket::from(SubscribePacket::new(9, Vec::new()));
    assert_eq!(subscribe.details().qos, QoS::AtLeastOnce);
    assert_eq!(subscribe.details().message_id, 9);

    let suback = ControlPacket::from(SubackPacket::new(9, vec![0]));
    assert_eq!(suback.details().qos, QoS::AtMostOnce);

    assert_eq!(
        ControlPacket::from(ConnackPacket::new(true, 5)).details(),
        Details::default()
    );
    assert_eq!(
        ControlPacket::from(DisconnectPacket::new()).details(),
        Details::default()
    );
}

#[test]
fn clones_share_no_storage() {
    let original = PublishPacket::new("a/b", QoS::AtLeastOnce, vec![1u8, 2, 3]);
    let mut copy = original.clone();
    copy.payload[0] = 9;
    copy.topic_name.push_str("/c");
    assert_eq!(original.payload, vec![1, 2, 3]);
    assert_eq!(original.topic_name, "a/b");

    let original = ControlPacket::from(UnsubscribePacket::new(1, vec!["x".to_string()]));
    let mut copy = original.clone();
    if let ControlPacket::Unsubscribe(u) = &mut copy {
        u.topics.push("y".to_string());
    }
    assert_ne!(original, copy);
}

#[test]
fn display_renders_header_and_fields() {
    let mut packet =
        ControlPacket::from(PublishPacket::new("a/b", QoS::AtLeastOnce, "hi").with_message_id(7));
    encode(&mut packet);
    assert_eq!(
        packet.to_string(),
        "PUBLISH: dup: false qos: 1 retain: false rLength: 9 topicName: a/b MessageID: 7 payload: hi"
    );
    assert_eq!(
        ControlPacket::from(DisconnectPacket::new()).to_string(),
        "DISCONNECT: dup: false qos: 0 retain: false rLength: 0"
    );
}

struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn write_errors_propagate() {
    let mut packet = ControlPacket::from(PubrecPacket::new(1));
    let err = write_packet(&mut packet, &mut BrokenPipe).unwrap_err();
    assert!(matches!(err, PacketError::Io(e) if e.kind() == io::ErrorKind::BrokenPipe));
}

#[test]
fn oversized_topic_fails_to_encode() {
    let topic = "t".repeat(usize::from(u16::MAX) + 1);
    let mut packet = ControlPacket::from(PublishPacket::new(topic, QoS::AtMostOnce, Vec::<u8>::new()));
    let mut out = Vec::new();
    assert!(matches!(
        packet.write_to(&mut out).unwrap_err(),
        PacketError::StringTooLong(_)
    ));
    assert!(out.is_empty());
}

fn qos_strategy() -> impl Strategy<Value = QoS> {
    prop_oneof![
        Just(QoS::AtMostOnce),
        Just(QoS::AtLeastOnce),
        Just(QoS::ExactlyOnce),
    ]
}

fn topic_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9/_+#$-]{0,40}"
}

proptest! {
    #[test]
    fn publish_round_trips(
        topic in topic_strategy(),
        qos in qos_strategy(),
        message_id in any::<u16>(),
        dup in any::<bool>(),
        retain in any::<bool>(),
        payload in proptest::collection::vec(any::<u8>(), 0..512),
    ) {
        let message_id = if qos == QoS::AtMostOnce { 0 } else { message_id };
        let mut publish = PublishPacket::new(topic, qos, payload).with_message_id(message_id);
        publish.header.dup = dup;
        publish.header.retain = retain;
        let (sent, decoded) = round_trip(publish);
        prop_assert_eq!(sent, decoded);
    }

    #[test]
    fn subscribe_round_trips(
        message_id in any::<u16>(),
        subscriptions in proptest::collection::vec((topic_strategy(), qos_strategy()), 0..8),
    ) {
        let (sent, decoded) = round_trip(SubscribePacket::new(message_id, subscriptions));
        prop_assert_eq!(sent, decoded);
    }

    #[test]
    fn suback_round_trips(
        message_id in any::<u16>(),
        return_codes in proptest::collection::vec(any::<u8>(), 0..16),
    ) {
        let (sent, decoded) = round_trip(SubackPacket::new(message_id, return_codes));
        prop_assert_eq!(sent, decoded);
    }

    #[test]
    fn unsubscribe_round_trips(
        message_id in any::<u16>(),
        topics in proptest::collection::vec(topic_strategy(), 0..8),
    ) {
        let (sent, decoded) = round_trip(UnsubscribePacket::new(message_id, topics));
        prop_assert_eq!(sent, decoded);
    }
}
