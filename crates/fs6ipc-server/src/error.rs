use std::time::Duration;

use tokio_util::codec::LinesCodecError;

/// A request line that cannot be turned into an executor request.
///
/// Display strings are sent to the client verbatim.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("hex length must be even")]
    OddHexLength,

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Errors that end one client connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Socket read or write failed.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A reply could not be serialised.
    #[error("failed to encode reply: {0}")]
    Encode(#[from] serde_json::Error),

    /// No complete line arrived within the idle timeout.
    #[error("connection idle for {0:?}")]
    IdleTimeout(Duration),
}

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding failed for a reason other than the address being in use.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    /// Shutdown was requested before the listener could bind.
    #[error("shutdown requested before bind completed")]
    Cancelled,

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors returned by [`IpcClient`](crate::IpcClient).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("client I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line framing error: {0}")]
    Lines(#[from] LinesCodecError),

    #[error("invalid reply: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid reply hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The server answered with a failure reply.
    #[error("server error: {0}")]
    Server(String),

    #[error("connection closed by server")]
    Closed,
}
