use std::fmt;
use std::io::Write;

use bytes::{Buf, Bytes, BytesMut};

use crate::packets::codec::{decode_string, decode_u16, encode_string, encode_u16};
use crate::packets::{Details, FixedHeader, PacketType, QoS, write_frame};
use crate::utils::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsubscribePacket {
    pub header: FixedHeader,
    pub message_id: u16,
    pub topics: Vec<String>,
}

impl UnsubscribePacket {
    pub fn new(message_id: u16, topics: Vec<String>) -> Self {
        Self {
            header: FixedHeader::new(PacketType::Unsubscribe),
            message_id,
            topics,
        }
    }

    pub(crate) fn with_header(header: FixedHeader) -> Self {
        Self {
            header,
            message_id: 0,
            topics: Vec::new(),
        }
    }

    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        let mut body = BytesMut::new();
        encode_u16(self.message_id, &mut body);
        for topic in &self.topics {
            encode_string(topic, &mut body)?;
        }
        write_frame(&mut self.header, &body, writer)
    }

    /// Byte-count driven like SUBSCRIBE: a zero-length filter is kept rather
    /// than ending the list.
    pub(crate) fn unpack(&mut self, body: &mut Bytes) -> Result<()> {
        self.message_id = decode_u16(body)?;
        self.topics.clear();
        while body.has_remaining() {
            self.topics.push(decode_string(body)?);
        }
        Ok(())
    }

    pub fn details(&self) -> Details {
        Details {
            qos: QoS::AtLeastOnce,
            message_id: self.message_id,
        }
    }
}

impl fmt::Display for UnsubscribePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} MessageID: {} topics: {:?}",
            self.header, self.message_id, self.topics
        )
    }
}
