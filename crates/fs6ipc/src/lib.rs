//! FSUIPC-compatible FS6IPC offset server.
//!
//! Legacy flight-simulator add-ons talk to FSUIPC by exchanging block
//! requests against a 64 KiB offset space. fs6ipc serves that protocol over
//! TCP with one JSON object per line, filling the offsets from simulator
//! telemetry on every request.
//!
//! # Crate Structure
//!
//! - [`memory`]: the flat little-endian offset space
//! - [`telemetry`]: simulator values encoded into the legacy offsets
//! - [`block`]: the READ/WRITE block request codec
//! - [`executor`]: single-owner request queue driven by a host tick
//! - [`server`]: line-delimited JSON transport (behind `server` feature)

/// Re-export address space types.
pub mod memory {
    pub use fs6ipc_memory::*;
}

/// Re-export telemetry types.
pub mod telemetry {
    pub use fs6ipc_telemetry::*;
}

/// Re-export block protocol types.
pub mod block {
    pub use fs6ipc_block::*;
}

/// Re-export executor types.
pub mod executor {
    pub use fs6ipc_executor::*;
}

/// Re-export transport types (requires `server` feature).
#[cfg(feature = "server")]
pub mod server {
    pub use fs6ipc_server::*;
}
