//! The `error` module defines the error type shared by every packet codec.
//!
//! All malformed-stream conditions are reported synchronously from decode;
//! the codec never retries. Whether a bad frame closes the connection is up
//! to the session layer.

use std::io;

use thiserror::Error;

use crate::packets::PacketType;

#[derive(Error, Debug)]
pub enum PacketError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("stream ended in the middle of a field")]
    Truncated,

    #[error("malformed remaining length: more than 4 length bytes")]
    MalformedRemainingLength,

    #[error("remaining length {0} exceeds the 268435455 byte maximum")]
    RemainingLengthTooLarge(usize),

    #[error("string declares {declared} bytes but only {available} remain")]
    StringLengthMismatch { declared: usize, available: usize },

    #[error("string of {0} bytes does not fit a 16-bit length prefix")]
    StringTooLong(usize),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown packet type: {0}")]
    UnknownPacketType(u8),

    #[error("packet type {0} is not handled by this codec")]
    UnsupportedPacketType(PacketType),

    #[error("invalid QoS level: {0}")]
    InvalidQos(u8),

    #[error(
        "publish payload length < 0: remaining length {remaining_length} is shorter than the {header_len} byte variable header"
    )]
    PayloadUnderflow {
        remaining_length: usize,
        header_len: usize,
    },
}

pub type Result<T> = std::result::Result<T, PacketError>;
