use std::fmt;
use std::io::Write;

use bytes::Bytes;

use crate::packets::{Details, FixedHeader, PacketType, write_frame};
use crate::utils::Result;

/// DISCONNECT has no body; the frame is the two header bytes `0xE0 0x00`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisconnectPacket {
    pub header: FixedHeader,
}

impl DisconnectPacket {
    pub fn new() -> Self {
        Self::with_header(FixedHeader::new(PacketType::Disconnect))
    }

    pub(crate) fn with_header(header: FixedHeader) -> Self {
        Self { header }
    }

    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        write_frame(&mut self.header, &[], writer)
    }

    pub(crate) fn unpack(&mut self, _body: &mut Bytes) -> Result<()> {
        Ok(())
    }

    pub fn details(&self) -> Details {
        Details::default()
    }
}

impl Default for DisconnectPacket {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DisconnectPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.header, f)
    }
}
