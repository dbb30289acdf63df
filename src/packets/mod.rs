//! The `packets` module is the wire codec for the MQTT control packets the
//! dispatch path exchanges with a broker.
//!
//! Every frame is a [`FixedHeader`] followed by exactly `remaining_length`
//! body bytes. [`read_packet`] reads the header, pulls the whole body off
//! the transport and hands it to the matching variant, so a malformed body
//! can never consume bytes that belong to the next frame.
//!
//! [`ControlPacket`] is a closed enum over the seven supported kinds. Adding
//! a kind means adding a variant and every `match` below stops compiling
//! until it is handled.

pub mod codec;
pub mod connack;
pub mod disconnect;
pub mod fixed_header;
pub mod publish;
pub mod pubrec;
pub mod suback;
pub mod subscribe;
pub mod unsubscribe;

use std::fmt;
use std::io::{Read, Write};

use bytes::Bytes;

pub use connack::ConnackPacket;
pub use disconnect::DisconnectPacket;
pub use fixed_header::{FixedHeader, PacketType, QoS};
pub use publish::PublishPacket;
pub use pubrec::PubrecPacket;
pub use suback::{SUBACK_FAILURE, SubackPacket};
pub use subscribe::SubscribePacket;
pub use unsubscribe::UnsubscribePacket;

use crate::packets::codec::eof_as_truncated;
use crate::utils::{PacketError, Result};

/// Read-only summary of a packet used by acknowledgment logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Details {
    pub qos: QoS,
    pub message_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlPacket {
    Connack(ConnackPacket),
    Disconnect(DisconnectPacket),
    Publish(PublishPacket),
    Pubrec(PubrecPacket),
    Suback(SubackPacket),
    Subscribe(SubscribePacket),
    Unsubscribe(UnsubscribePacket),
}

impl ControlPacket {
    /// Builds an empty packet of the given kind with its default header.
    pub fn new(packet_type: PacketType) -> Result<Self> {
        Self::with_header(FixedHeader::new(packet_type))
    }

    /// Builds an empty packet around an already decoded header.
    pub fn with_header(header: FixedHeader) -> Result<Self> {
        let packet = match header.packet_type {
            PacketType::Connack => ControlPacket::Connack(ConnackPacket::with_header(header)),
            PacketType::Disconnect => {
                ControlPacket::Disconnect(DisconnectPacket::with_header(header))
            }
            PacketType::Publish => ControlPacket::Publish(PublishPacket::with_header(header)),
            PacketType::Pubrec => ControlPacket::Pubrec(PubrecPacket::with_header(header)),
            PacketType::Suback => ControlPacket::Suback(SubackPacket::with_header(header)),
            PacketType::Subscribe => {
                ControlPacket::Subscribe(SubscribePacket::with_header(header))
            }
            PacketType::Unsubscribe => {
                ControlPacket::Unsubscribe(UnsubscribePacket::with_header(header))
            }
            other => return Err(PacketError::UnsupportedPacketType(other)),
        };
        Ok(packet)
    }

    pub fn fixed_header(&self) -> &FixedHeader {
        match self {
            ControlPacket::Connack(p) => &p.header,
            ControlPacket::Disconnect(p) => &p.header,
            ControlPacket::Publish(p) => &p.header,
            ControlPacket::Pubrec(p) => &p.header,
            ControlPacket::Suback(p) => &p.header,
            ControlPacket::Subscribe(p) => &p.header,
            ControlPacket::Unsubscribe(p) => &p.header,
        }
    }

    pub fn packet_type(&self) -> PacketType {
        self.fixed_header().packet_type
    }

    pub fn details(&self) -> Details {
        match self {
            ControlPacket::Connack(p) => p.details(),
            ControlPacket::Disconnect(p) => p.details(),
            ControlPacket::Publish(p) => p.details(),
            ControlPacket::Pubrec(p) => p.details(),
            ControlPacket::Suback(p) => p.details(),
            ControlPacket::Subscribe(p) => p.details(),
            ControlPacket::Unsubscribe(p) => p.details(),
        }
    }

    /// Encodes the packet onto `writer`, updating the header's remaining
    /// length to the size of the body actually written.
    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        match self {
            ControlPacket::Connack(p) => p.write_to(writer),
            ControlPacket::Disconnect(p) => p.write_to(writer),
            ControlPacket::Publish(p) => p.write_to(writer),
            ControlPacket::Pubrec(p) => p.write_to(writer),
            ControlPacket::Suback(p) => p.write_to(writer),
            ControlPacket::Subscribe(p) => p.write_to(writer),
            ControlPacket::Unsubscribe(p) => p.write_to(writer),
        }
    }

    fn unpack(&mut self, body: &mut Bytes) -> Result<()> {
        match self {
            ControlPacket::Connack(p) => p.unpack(body),
            ControlPacket::Disconnect(p) => p.unpack(body),
            ControlPacket::Publish(p) => p.unpack(body),
            ControlPacket::Pubrec(p) => p.unpack(body),
            ControlPacket::Suback(p) => p.unpack(body),
            ControlPacket::Subscribe(p) => p.unpack(body),
            ControlPacket::Unsubscribe(p) => p.unpack(body),
        }
    }
}

impl fmt::Display for ControlPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlPacket::Connack(p) => fmt::Display::fmt(p, f),
            ControlPacket::Disconnect(p) => fmt::Display::fmt(p, f),
            ControlPacket::Publish(p) => fmt::Display::fmt(p, f),
            ControlPacket::Pubrec(p) => fmt::Display::fmt(p, f),
            ControlPacket::Suback(p) => fmt::Display::fmt(p, f),
            ControlPacket::Subscribe(p) => fmt::Display::fmt(p, f),
            ControlPacket::Unsubscribe(p) => fmt::Display::fmt(p, f),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident => $packet:ty),* $(,)?) => {
        $(
            impl From<$packet> for ControlPacket {
                fn from(packet: $packet) -> Self {
                    ControlPacket::$variant(packet)
                }
            }
        )*
    };
}

impl_from_variant! {
    Connack => ConnackPacket,
    Disconnect => DisconnectPacket,
    Publish => PublishPacket,
    Pubrec => PubrecPacket,
    Suback => SubackPacket,
    Subscribe => SubscribePacket,
    Unsubscribe => UnsubscribePacket,
}

/// Decodes one control packet from the transport.
pub fn read_packet<R: Read + ?Sized>(reader: &mut R) -> Result<ControlPacket> {
    let header = FixedHeader::decode(reader)?;
    let mut packet = ControlPacket::with_header(header)?;

    let mut body = Vec::new();
    reader
        .take(header.remaining_length as u64)
        .read_to_end(&mut body)
        .map_err(eof_as_truncated)?;
    if body.len() < header.remaining_length {
        return Err(PacketError::Truncated);
    }

    packet.unpack(&mut Bytes::from(body))?;
    Ok(packet)
}

/// Encodes one control packet onto the transport.
pub fn write_packet<W: Write + ?Sized>(packet: &mut ControlPacket, writer: &mut W) -> Result<()> {
    packet.write_to(writer)
}

/// Writes header and body as a single frame, fixing up the remaining length.
pub(crate) fn write_frame<W: Write + ?Sized>(
    header: &mut FixedHeader,
    body: &[u8],
    writer: &mut W,
) -> Result<()> {
    header.remaining_length = body.len();
    let mut frame = header.pack()?;
    frame.extend_from_slice(body);
    writer.write_all(&frame)?;
    Ok(())
}

#[cfg(test)]
mod tests;
