//! The FS6IPC block protocol.
//!
//! A request payload is a contiguous run of blocks, each starting with a
//! little-endian 4-byte code:
//! - `0` terminates the request
//! - `1` reads `length` bytes at `offset` into the reply region that follows
//!   its 16-byte header
//! - `2` carries `length` bytes to write at `offset` after a 12-byte header
//!
//! The server executes blocks in place ([`serve_blocks`]); the reply is the
//! request buffer with every read region filled in. Clients build requests
//! with [`BlockBuilder`].

pub mod block;
pub mod builder;
pub mod error;

pub use block::{
    decode_block, serve_blocks, Block, ScanSummary, StopReason, CODE_SIZE, READ_HEADER_SIZE,
    READ_STATE_DATA, TERMINATE, WRITE_HEADER_SIZE, WRITE_STATE_DATA,
};
pub use builder::{BlockBuilder, ReadSlot};
pub use error::{BlockKind, ProtocolError, Result};
