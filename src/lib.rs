//! # mqtt-dispatch
//!
//! `mqtt_dispatch` is the message-layer core of an MQTT client: a bit-exact
//! codec for the control packets on the delivery path, and a dispatcher
//! that routes incoming PUBLISH packets to subscriber handlers and emits
//! the acknowledgments the session layer sends back to the broker.
//!
//! ## Core Modules
//!
//! - `packets`: fixed header, primitive field codecs and the seven control
//!   packet kinds (CONNACK, DISCONNECT, PUBLISH, PUBREC, SUBACK, SUBSCRIBE,
//!   UNSUBSCRIBE).
//! - `router`: topic matching, the shared route table and the ordered and
//!   concurrent dispatch engine.
//! - `config`: settings an embedding application loads and hands over.
//! - `utils`: the codec error type and logging setup.
//!
//! Connection handling, persistence and the caller-facing tokens live in
//! the session layer and only meet this crate at `read_packet`,
//! `write_packet`, the route table and the acknowledgment stream.

pub mod config;
pub mod packets;
pub mod router;
pub mod utils;

pub use packets::{ControlPacket, read_packet, write_packet};
pub use router::{Dispatch, Message, PacketAndToken, RouteTable, Router};
pub use utils::PacketError;
