//! TCP transport for the FS6IPC executor.
//!
//! One JSON object per line in each direction:
//!
//! ```text
//! -> {"cmd":"ipc","dwData":7,"cbData":20,"hex":"0100000000030000..."}
//! <- {"ok":true,"replyHex":"0100000000030000...","replyDwData":7}
//! <- {"ok":false,"error":"hex length must be even"}
//! ```
//!
//! Each accepted connection runs in its own task and never touches the
//! address space; requests go through the executor queue and the task waits
//! for the reply with a timeout.

pub mod client;
pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod server;
pub mod wire;

pub use client::IpcClient;
pub use codec::{Line, RequestLineCodec};
pub use config::{ConnectionSettings, ServerConfig, DEFAULT_HOST, DEFAULT_PORT};
pub use connection::serve_connection;
pub use error::{ClientError, ConnectionError, ServerError, WireError};
pub use server::TransportServer;
pub use wire::{decode_request, WireReply, WireRequest};
