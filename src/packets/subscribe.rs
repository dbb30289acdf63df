use std::fmt;
use std::io::Write;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::packets::codec::{decode_byte, decode_string, decode_u16, encode_string, encode_u16};
use crate::packets::{Details, FixedHeader, PacketType, QoS, write_frame};
use crate::utils::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscribePacket {
    pub header: FixedHeader,
    pub message_id: u16,
    /// Requested (filter, qos) pairs in wire order.
    pub subscriptions: Vec<(String, QoS)>,
}

impl SubscribePacket {
    pub fn new(message_id: u16, subscriptions: Vec<(String, QoS)>) -> Self {
        Self {
            header: FixedHeader::new(PacketType::Subscribe),
            message_id,
            subscriptions,
        }
    }

    pub(crate) fn with_header(header: FixedHeader) -> Self {
        Self {
            header,
            message_id: 0,
            subscriptions: Vec::new(),
        }
    }

    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        let mut body = BytesMut::new();
        encode_u16(self.message_id, &mut body);
        for (filter, qos) in &self.subscriptions {
            encode_string(filter, &mut body)?;
            body.put_u8(*qos as u8);
        }
        write_frame(&mut self.header, &body, writer)
    }

    /// Reads (filter, qos) pairs until the body bytes declared by the
    /// remaining length are used up.
    pub(crate) fn unpack(&mut self, body: &mut Bytes) -> Result<()> {
        self.message_id = decode_u16(body)?;
        self.subscriptions.clear();
        while body.has_remaining() {
            let filter = decode_string(body)?;
            let qos = QoS::try_from(decode_byte(body)?)?;
            self.subscriptions.push((filter, qos));
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

impl fmt::Display for SubscribePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics: Vec<&str> = self.subscriptions.iter().map(|(t, _)| t.as_str()).collect();
        write!(
            f,
            "{} MessageID: {} topics: {:?}",
            self.header, self.message_id, topics
        )
    }
}
