//! Primitive field codecs shared by every control packet.
//!
//! - unsigned 16-bit integers are big-endian, two bytes
//! - strings carry a two byte big-endian length prefix followed by UTF-8
//! - the remaining length is a base-128 variable byte integer of 1 to 4
//!   bytes, 7 data bits per byte with the high bit flagging continuation
//!
//! Body fields are decoded from a `Buf` that holds exactly the packet body,
//! so a field can never read past the declared remaining length.

use std::io::{self, Read};

use bytes::{Buf, BufMut, BytesMut};

use crate::utils::{PacketError, Result};

/// Largest value the remaining length field can carry.
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// A remaining length never spans more than this many bytes.
const MAX_LENGTH_BYTES: usize = 4;

pub fn encode_u16(value: u16, buf: &mut BytesMut) {
    buf.put_u16(value);
}

pub fn decode_u16(buf: &mut impl Buf) -> Result<u16> {
    if buf.remaining() < 2 {
        return Err(PacketError::Truncated);
    }
    Ok(buf.get_u16())
}

pub fn decode_byte(buf: &mut impl Buf) -> Result<u8> {
    if !buf.has_remaining() {
        return Err(PacketError::Truncated);
    }
    Ok(buf.get_u8())
}

pub fn encode_string(value: &str, buf: &mut BytesMut) -> Result<()> {
    let len = u16::try_from(value.len()).map_err(|_| PacketError::StringTooLong(value.len()))?;
    buf.put_u16(len);
    buf.put_slice(value.as_bytes());
    Ok(())
}

pub fn decode_string(buf: &mut impl Buf) -> Result<String> {
    let declared = decode_u16(buf)? as usize;
    let available = buf.remaining();
    if available < declared {
        return Err(PacketError::StringLengthMismatch {
            declared,
            available,
        });
    }
    let raw = buf.copy_to_bytes(declared);
    String::from_utf8(raw.to_vec()).map_err(|_| PacketError::InvalidUtf8)
}

/// Bytes a string occupies on the wire, prefix included.
pub fn encoded_string_len(value: &str) -> usize {
    2 + value.len()
}

pub fn encode_remaining_length(mut value: usize, buf: &mut BytesMut) -> Result<()> {
    if value > MAX_REMAINING_LENGTH {
        return Err(PacketError::RemainingLengthTooLarge(value));
    }
    loop {
        let mut byte = (value % 128) as u8;
        value /= 128;
        if value > 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            return Ok(());
        }
    }
}

/// Reads a remaining length straight off the transport.
///
/// Fails with `MalformedRemainingLength` once a fourth byte still has its
/// continuation bit set, and with `Truncated` if the stream ends first.
pub fn decode_remaining_length<R: Read + ?Sized>(reader: &mut R) -> Result<usize> {
    let mut value = 0usize;
    let mut shift = 0;
    for _ in 0..MAX_LENGTH_BYTES {
        let byte = read_byte(reader)?;
        value |= ((byte & 0x7F) as usize) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
        shift += 7;
    }
    Err(PacketError::MalformedRemainingLength)
}

pub(crate) fn read_byte<R: Read + ?Sized>(reader: &mut R) -> Result<u8> {
    let mut byte = [0u8; 1];
    reader.read_exact(&mut byte).map_err(eof_as_truncated)?;
    Ok(byte[0])
}

pub(crate) fn eof_as_truncated(err: io::Error) -> PacketError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        PacketError::Truncated
    } else {
        PacketError::Io(err)
    }
}
