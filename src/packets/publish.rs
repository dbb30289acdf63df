use std::fmt;
use std::io::Write;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::packets::codec::{
    decode_string, decode_u16, encode_string, encode_u16, encoded_string_len,
};
use crate::packets::{Details, FixedHeader, PacketType, QoS, write_frame};
use crate::utils::{PacketError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPacket {
    pub header: FixedHeader,
    pub topic_name: String,
    /// Only carried on the wire when qos > 0.
    pub message_id: u16,
    pub payload: Vec<u8>,
}

impl PublishPacket {
    pub fn new(topic_name: impl Into<String>, qos: QoS, payload: impl Into<Vec<u8>>) -> Self {
        let mut header = FixedHeader::new(PacketType::Publish);
        header.qos = qos;
        Self {
            header,
            topic_name: topic_name.into(),
            message_id: 0,
            payload: payload.into(),
        }
    }

    pub fn with_message_id(mut self, message_id: u16) -> Self {
        self.message_id = message_id;
        self
    }

    pub(crate) fn with_header(header: FixedHeader) -> Self {
        Self {
            header,
            topic_name: String::new(),
            message_id: 0,
            payload: Vec::new(),
        }
    }

    pub fn qos(&self) -> QoS {
        self.header.qos
    }

    /// Size of the topic name and optional message id ahead of the payload.
    fn variable_header_len(&self) -> usize {
        let id_len = if self.header.qos > QoS::AtMostOnce { 2 } else { 0 };
        encoded_string_len(&self.topic_name) + id_len
    }

    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        let mut body = BytesMut::with_capacity(self.variable_header_len() + self.payload.len());
        encode_string(&self.topic_name, &mut body)?;
        if self.header.qos > QoS::AtMostOnce {
            encode_u16(self.message_id, &mut body);
        }
        body.put_slice(&self.payload);
        write_frame(&mut self.header, &body, writer)
    }

    pub(crate) fn unpack(&mut self, body: &mut Bytes) -> Result<()> {
        let remaining_length = self.header.remaining_length;
        self.topic_name = decode_string(body)?;

        let header_len = self.variable_header_len();
        let payload_len = remaining_length.checked_sub(header_len).ok_or(
            PacketError::PayloadUnderflow {
                remaining_length,
                header_len,
            },
        )?;

        if self.header.qos > QoS::AtMostOnce {
            self.message_id = decode_u16(body)?;
        }
        if body.remaining() < payload_len {
            return Err(PacketError::Truncated);
        }
        self.payload = body.copy_to_bytes(payload_len).to_vec();
        Ok(())
    }

    pub fn details(&self) -> Details {
        Details {
            qos: self.header.qos,
            message_id: self.message_id,
        }
    }
}

impl fmt::Display for PublishPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} topicName: {} MessageID: {} payload: {}",
            self.header,
            self.topic_name,
            self.message_id,
            String::from_utf8_lossy(&self.payload)
        )
    }
}
