use fs6ipc_memory::MemoryError;

/// Errors that can occur while refreshing telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A catalogue entry addressed memory outside the address space.
    #[error("catalogue field {field} at 0x{offset:04X}: {source}")]
    Field {
        field: &'static str,
        offset: usize,
        source: MemoryError,
    },

    /// A snapshot document could not be parsed.
    #[error("invalid telemetry snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A snapshot file could not be read.
    #[error("failed to read telemetry snapshot: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
