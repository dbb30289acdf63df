//! Dispatch-time message view and acknowledgment plumbing
//!
//! A `Message` is an immutable snapshot of a PUBLISH packet bound to a
//! one-shot acknowledgment. Clones share the acknowledgment, so whichever
//! handler acks first emits the `PacketAndToken` and every later `ack()`
//! is a no-op.
//!
//! Acknowledgment packets:
//! - qos 2: a PUBREC carrying the message id
//! - qos 1: no packet; the token tells the session layer to send PUBACK
//! - qos 0: no packet; the token only records completion

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use crate::packets::{ControlPacket, Details, PublishPacket, PubrecPacket, QoS};

/// What the acknowledgment pipeline needs to continue the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckToken {
    pub topic: String,
    pub details: Details,
}

/// An acknowledgment packet (if the qos needs one) and its token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PacketAndToken {
    pub packet: Option<ControlPacket>,
    pub token: AckToken,
}

impl PacketAndToken {
    pub fn acknowledging(topic: impl Into<String>, details: Details) -> Self {
        let packet = match details.qos {
            QoS::ExactlyOnce => Some(PubrecPacket::new(details.message_id).into()),
            QoS::AtLeastOnce | QoS::AtMostOnce => None,
        };
        Self {
            packet,
            token: AckToken {
                topic: topic.into(),
                details,
            },
        }
    }
}

/// Closable sender for acknowledgments.
///
/// Closing drops the underlying sender exactly once. Sending after close
/// means the shutdown handshake was violated and panics.
#[derive(Clone)]
pub(crate) struct AckSink {
    tx: Arc<Mutex<Option<UnboundedSender<PacketAndToken>>>>,
}

impl AckSink {
    pub(crate) fn new(tx: UnboundedSender<PacketAndToken>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub(crate) fn send(&self, ack: PacketAndToken) {
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(tx) = tx.as_ref() else {
            panic!("acknowledgment sent after the acknowledgment channel was closed");
        };
        if let Err(err) = tx.send(ack) {
            warn!(
                message_id = err.0.token.details.message_id,
                "acknowledgment consumer has gone away; acknowledgment dropped"
            );
        }
    }

    pub(crate) fn close(&self) {
        self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
    }
}

struct Acknowledgment {
    acked: AtomicBool,
    sink: AckSink,
}

#[derive(Clone)]
pub struct Message {
    topic: String,
    qos: QoS,
    message_id: u16,
    payload: Bytes,
    duplicate: bool,
    retained: bool,
    received_at: i64,
    ack: Arc<Acknowledgment>,
}

impl Message {
    pub(crate) fn from_publish(publish: PublishPacket, sink: AckSink) -> Self {
        Self {
            qos: publish.header.qos,
            message_id: publish.message_id,
            duplicate: publish.header.dup,
            retained: publish.header.retain,
            topic: publish.topic_name,
            payload: Bytes::from(publish.payload),
            received_at: chrono::Utc::now().timestamp_millis(),
            ack: Arc::new(Acknowledgment {
                acked: AtomicBool::new(false),
                sink,
            }),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn qos(&self) -> QoS {
        self.qos
    }

    pub fn message_id(&self) -> u16 {
        self.message_id
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn duplicate(&self) -> bool {
        self.duplicate
    }

    pub fn retained(&self) -> bool {
        self.retained
    }

    /// Milliseconds since the UNIX epoch at which dispatch picked it up.
    pub fn received_at(&self) -> i64 {
        self.received_at
    }

    pub fn details(&self) -> Details {
        Details {
            qos: self.qos,
            message_id: self.message_id,
        }
    }

    /// Emits the acknowledgment. Only the first call has any effect.
    pub fn ack(&self) {
        if self.ack.acked.swap(true, Ordering::AcqRel) {
            return;
        }
        self.ack
            .sink
            .send(PacketAndToken::acknowledging(self.topic.clone(), self.details()));
    }

    pub fn is_acked(&self) -> bool {
        self.ack.acked.load(Ordering::Acquire)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("topic", &self.topic)
            .field("qos", &self.qos)
            .field("message_id", &self.message_id)
            .field("payload_len", &self.payload.len())
            .field("duplicate", &self.duplicate)
            .field("retained", &self.retained)
            .field("acked", &self.is_acked())
            .finish()
    }
}
