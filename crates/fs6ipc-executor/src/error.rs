use fs6ipc_block::ProtocolError;
use fs6ipc_telemetry::TelemetryError;

/// Errors produced while serving a request or running the executor.
///
/// Request-scoped variants are sent to the client as the failure message, so
/// their display strings are part of the wire protocol.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    /// The block payload was malformed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Telemetry could not be written before serving.
    #[error("telemetry refresh failed: {0}")]
    Telemetry(#[from] TelemetryError),

    /// The command kind is not `ipc`.
    #[error("unknown cmd: {0}")]
    UnknownCommand(String),

    /// The executor is gone or dropped the request.
    #[error("executor unavailable")]
    Unavailable,

    /// The executor thread could not be started.
    #[error("failed to spawn executor thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The executor thread panicked.
    #[error("executor thread panicked")]
    Panicked,
}

pub type Result<T> = std::result::Result<T, ExecutorError>;
