//! The `utils` module provides the pieces shared by the codec and the
//! dispatch engine: the error type returned by every decode and encode path,
//! and a helper that wires `tracing` output for embedding applications.

pub mod error;
pub mod logging;

pub use error::{PacketError, Result};

#[cfg(test)]
mod tests;
