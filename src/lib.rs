//! A minimal Redis client speaking the RESP protocol.
//!
//! A [`client::Client`] owns exactly one TCP connection and runs one
//! command at a time: every executor takes `&mut self`, so issuing two
//! commands concurrently on the same client is a compile error rather than
//! a framing corruption. There is no pooling, pipelining, reconnection or
//! timeout handling in this crate; callers needing deadlines should set
//! them on the socket below this layer.

pub mod client;
pub mod cmd;
pub mod connection;
pub mod frame;

use thiserror::Error as ThisError;

/// Everything that can go wrong during a single request/response cycle.
///
/// A failure is scoped to the in-flight call. Except for [`Error::Io`],
/// the client and its connection remain usable for subsequent calls.
#[derive(Debug, ThisError)]
pub enum Error {
    /// Transport read/write failure or premature stream closure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed or unrecognized frame; the peer is not speaking RESP.
    #[error("protocol error; {0}")]
    Protocol(String),
    /// The server answered with a null bulk string (`$-1`): the requested
    /// key or value does not exist. Distinct from an empty value.
    #[error("key not found")]
    NotFound,
    /// The server answered with an error frame; the message is verbatim.
    #[error("{0}")]
    Server(String),
    /// The reply decoded fine but its shape does not fit the requested
    /// projection (e.g. an array where a scalar was expected).
    #[error("unexpected reply; expected {expected}, got {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: String,
    },
    /// The reply payload could not be parsed into the requested type.
    #[error("failed to parse reply payload: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
