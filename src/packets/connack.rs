use std::fmt;
use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};

use crate::packets::codec::decode_byte;
use crate::packets::{Details, FixedHeader, PacketType, write_frame};
use crate::utils::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnackPacket {
    pub header: FixedHeader,
    pub session_present: bool,
    pub return_code: u8,
}

impl ConnackPacket {
    pub fn new(session_present: bool, return_code: u8) -> Self {
        Self {
            header: FixedHeader::new(PacketType::Connack),
            session_present,
            return_code,
        }
    }

    pub(crate) fn with_header(header: FixedHeader) -> Self {
        Self {
            header,
            session_present: false,
            return_code: 0,
        }
    }

    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        let mut body = BytesMut::with_capacity(2);
        body.put_u8(u8::from(self.session_present));
        body.put_u8(self.return_code);
        write_frame(&mut self.header, &body, writer)
    }

    pub(crate) fn unpack(&mut self, body: &mut Bytes) -> Result<()> {
        let flags = decode_byte(body)?;
        self.session_present = flags & 0x01 != 0;
        self.return_code = decode_byte(body)?;
        Ok(())
    }

    pub fn details(&self) -> Details {
        Details::default()
    }
}

impl fmt::Display for ConnackPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sessionpresent: {} returncode: {}",
            self.header, self.session_present, self.return_code
        )
    }
}
