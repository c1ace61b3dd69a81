//! Error type shared by every stage of a query.
//!
//! Each variant is scoped to a single pending query; nothing here is fatal to
//! the client that produced it.

use std::io;

/// Boxed source for transport failures, which come from whatever HTTP stack
/// backs the [`Transport`](crate::api::Transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connectivity, protocol or TLS failure reported by the transport.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    /// The client's cancellation flag was observed at a progress checkpoint.
    #[error("request aborted: the client was cancelled")]
    Cancelled,

    #[error("failed to decompress response body: {0}")]
    Decompression(#[source] io::Error),

    #[error("response body is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// Non-success status; `message` is the server's own error text.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("failed to decode '{kind}' item: {reason}")]
    Decode { kind: String, reason: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The transport session is not running, or shut down before answering.
    #[error("transport session is stopped")]
    SessionStopped,
}

impl Error {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }

    /// Whether this failure came from the cancellation flag rather than the network.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
