//! The `router` module routes decoded PUBLISH packets to subscriber
//! handlers and produces the acknowledgments the session layer sends back.
//!
//! - `topic`: MQTT wildcard and shared-subscription matching
//! - `routes`: the lock-guarded route table shared with the session layer
//! - `message`: the handler-facing message view and acknowledgment tokens
//! - `dispatch`: the ordered and concurrent dispatch engine
//! - `wait_group`: task accounting used by the engine's shutdown

pub mod dispatch;
pub mod message;
pub mod routes;
pub mod topic;
pub mod wait_group;

pub use dispatch::{Dispatch, Router};
pub use message::{AckToken, Message, PacketAndToken};
pub use routes::{Handler, MessageHandler, Route, RouteTable};
pub use wait_group::{WaitGroup, WaitGuard};
