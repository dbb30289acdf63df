//! The fixed header leads every control packet: one type-and-flags byte
//! followed by the variable length encoded remaining length.

use std::fmt;
use std::io::Read;

use bytes::{BufMut, BytesMut};

use crate::packets::codec::{decode_remaining_length, encode_remaining_length, read_byte};
use crate::utils::{PacketError, Result};

/// MQTT control packet type codes (high nibble of the first header byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PacketType {
    Connect = 1,
    Connack = 2,
    Publish = 3,
    Puback = 4,
    Pubrec = 5,
    Pubrel = 6,
    Pubcomp = 7,
    Subscribe = 8,
    Suback = 9,
    Unsubscribe = 10,
    Unsuback = 11,
    Pingreq = 12,
    Pingresp = 13,
    Disconnect = 14,
}

impl PacketType {
    pub fn name(self) -> &'static str {
        match self {
            PacketType::Connect => "CONNECT",
            PacketType::Connack => "CONNACK",
            PacketType::Publish => "PUBLISH",
            PacketType::Puback => "PUBACK",
            PacketType::Pubrec => "PUBREC",
            PacketType::Pubrel => "PUBREL",
            PacketType::Pubcomp => "PUBCOMP",
            PacketType::Subscribe => "SUBSCRIBE",
            PacketType::Suback => "SUBACK",
            PacketType::Unsubscribe => "UNSUBSCRIBE",
            PacketType::Unsuback => "UNSUBACK",
            PacketType::Pingreq => "PINGREQ",
            PacketType::Pingresp => "PINGRESP",
            PacketType::Disconnect => "DISCONNECT",
        }
    }

    /// Flag nibble for packet kinds whose flags are reserved.
    fn reserved_flags(self) -> u8 {
        match self {
            PacketType::Pubrel | PacketType::Subscribe | PacketType::Unsubscribe => 0b0010,
            _ => 0b0000,
        }
    }
}

impl TryFrom<u8> for PacketType {
    type Error = PacketError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(PacketType::Connect),
            2 => Ok(PacketType::Connack),
            3 => Ok(PacketType::Publish),
            4 => Ok(PacketType::Puback),
            5 => Ok(PacketType::Pubrec),
            6 => Ok(PacketType::Pubrel),
            7 => Ok(PacketType::Pubcomp),
            8 => Ok(PacketType::Subscribe),
            9 => Ok(PacketType::Suback),
            10 => Ok(PacketType::Unsubscribe),
            11 => Ok(PacketType::Unsuback),
            12 => Ok(PacketType::Pingreq),
            13 => Ok(PacketType::Pingresp),
            14 => Ok(PacketType::Disconnect),
            _ => Err(PacketError::UnknownPacketType(value)),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Delivery guarantee carried in PUBLISH flags and SUBSCRIBE requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
#[allow(clippy::enum_variant_names)]
pub enum QoS {
    #[default]
    AtMostOnce = 0,
    AtLeastOnce = 1,
    ExactlyOnce = 2,
}

impl TryFrom<u8> for QoS {
    type Error = PacketError;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            _ => Err(PacketError::InvalidQos(value)),
        }
    }
}

impl fmt::Display for QoS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedHeader {
    pub packet_type: PacketType,
    pub dup: bool,
    pub qos: QoS,
    pub retain: bool,
    /// Exact size of the body that follows. Set by the packet on write.
    pub remaining_length: usize,
}

impl FixedHeader {
    /// Header with the defaults a freshly built packet of this kind carries.
    pub fn new(packet_type: PacketType) -> Self {
        let qos = if packet_type.reserved_flags() & 0b0010 != 0 {
            QoS::AtLeastOnce
        } else {
            QoS::AtMostOnce
        };
        Self {
            packet_type,
            dup: false,
            qos,
            retain: false,
            remaining_length: 0,
        }
    }

    /// The low nibble of the first header byte.
    pub fn flags(&self) -> u8 {
        match self.packet_type {
            PacketType::Publish => {
                (u8::from(self.dup) << 3) | ((self.qos as u8) << 1) | u8::from(self.retain)
            }
            other => other.reserved_flags(),
        }
    }

    pub fn pack(&self) -> Result<BytesMut> {
        let mut buf = BytesMut::with_capacity(5);
        buf.put_u8(((self.packet_type as u8) << 4) | self.flags());
        encode_remaining_length(self.remaining_length, &mut buf)?;
        Ok(buf)
    }

    /// Reads the type byte and remaining length. The caller owns reading the
    /// `remaining_length` body bytes that follow.
    pub fn decode<R: Read + ?Sized>(reader: &mut R) -> Result<Self> {
        let type_and_flags = read_byte(reader)?;
        let mut header = Self::from_type_and_flags(type_and_flags)?;
        header.remaining_length = decode_remaining_length(reader)?;
        Ok(header)
    }

    pub(crate) fn from_type_and_flags(byte: u8) -> Result<Self> {
        let packet_type = PacketType::try_from(byte >> 4)?;
        Ok(Self {
            packet_type,
            dup: byte & 0b1000 != 0,
            qos: QoS::try_from((byte >> 1) & 0b11)?,
            retain: byte & 0b0001 != 0,
            remaining_length: 0,
        })
    }
}

impl fmt::Display for FixedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: dup: {} qos: {} retain: {} rLength: {}",
            self.packet_type, self.dup, self.qos, self.retain, self.remaining_length
        )
    }
}
