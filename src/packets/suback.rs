use std::fmt;
use std::io::Write;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::packets::codec::{decode_u16, encode_u16};
use crate::packets::{Details, FixedHeader, PacketType, write_frame};
use crate::utils::Result;

/// Return code a broker uses to reject one subscription in a SUBACK.
pub const SUBACK_FAILURE: u8 = 0x80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubackPacket {
    pub header: FixedHeader,
    pub message_id: u16,
    /// One granted qos (or `SUBACK_FAILURE`) per requested filter.
    pub return_codes: Vec<u8>,
}

impl SubackPacket {
    pub fn new(message_id: u16, return_codes: Vec<u8>) -> Self {
        Self {
            header: FixedHeader::new(PacketType::Suback),
            message_id,
            return_codes,
        }
    }

    pub(crate) fn with_header(header: FixedHeader) -> Self {
        Self {
            header,
            message_id: 0,
            return_codes: Vec::new(),
        }
    }

    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        let mut body = BytesMut::with_capacity(2 + self.return_codes.len());
        encode_u16(self.message_id, &mut body);
        body.put_slice(&self.return_codes);
        write_frame(&mut self.header, &body, writer)
    }

    pub(crate) fn unpack(&mut self, body: &mut Bytes) -> Result<()> {
        self.message_id = decode_u16(body)?;
        self.return_codes = body.copy_to_bytes(body.remaining()).to_vec();
        Ok(())
    }

    pub fn details(&self) -> Details {
        Details {
            message_id: self.message_id,
            ..Details::default()
        }
    }
}

impl fmt::Display for SubackPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} MessageID: {} returncodes: {:?}",
            self.header, self.message_id, self.return_codes
        )
    }
}
