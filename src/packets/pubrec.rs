use std::fmt;
use std::io::Write;

use bytes::{Bytes, BytesMut};

use crate::packets::codec::{decode_u16, encode_u16};
use crate::packets::{Details, FixedHeader, PacketType, write_frame};
use crate::utils::Result;

/// PUBREC is the acknowledgment the dispatcher emits for QoS 2 deliveries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PubrecPacket {
    pub header: FixedHeader,
    pub message_id: u16,
}

impl PubrecPacket {
    pub fn new(message_id: u16) -> Self {
        Self {
            header: FixedHeader::new(PacketType::Pubrec),
            message_id,
        }
    }

    pub(crate) fn with_header(header: FixedHeader) -> Self {
        Self {
            header,
            message_id: 0,
        }
    }

    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        let mut body = BytesMut::with_capacity(2);
        encode_u16(self.message_id, &mut body);
        write_frame(&mut self.header, &body, writer)
    }

    pub(crate) fn unpack(&mut self, body: &mut Bytes) -> Result<()> {
        self.message_id = decode_u16(body)?;
        Ok(())
    }

    pub fn details(&self) -> Details {
        Details {
            qos: self.header.qos,
            message_id: self.message_id,
        }
    }
}

impl fmt::Display for PubrecPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MessageID: {}", self.header, self.message_id)
    }
}
