use tracing::Level;

use super::PacketError;
use super::logging;
use crate::config::Settings;
use crate::packets::PacketType;

#[test]
fn logging_init_accepts_levels() {
    // repeated initialisation must not panic
    logging::init("info");
    logging::init("debug");
    logging::init_from(&Settings::default().logging);
}

#[test]
fn level_names_parse_with_fallback() {
    assert_eq!(logging::parse_level("ERROR"), Level::ERROR);
    assert_eq!(logging::parse_level("warning"), Level::WARN);
    assert_eq!(logging::parse_level(" trace "), Level::TRACE);
    assert_eq!(logging::parse_level("nonsense"), Level::INFO);
}

#[test]
fn error_messages_name_the_fault() {
    let err = PacketError::StringLengthMismatch {
        declared: 10,
        available: 3,
    };
    assert_eq!(
        err.to_string(),
        "string declares 10 bytes but only 3 remain"
    );

    let err = PacketError::UnsupportedPacketType(PacketType::Pingreq);
    assert_eq!(
        err.to_string(),
        "packet type PINGREQ is not handled by this codec"
    );
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
    let err: PacketError = io.into();
    assert!(matches!(err, PacketError::Io(_)));
}
