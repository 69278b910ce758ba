use std::fmt;
use std::io;

use fs6ipc_executor::ExecutorError;
use fs6ipc_server::{ClientError, ServerError};
use fs6ipc_telemetry::TelemetryError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::AddrInUse
        | io::ErrorKind::AddrNotAvailable => TRANSPORT_ERROR,
        io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => USAGE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn server_error(context: &str, err: ServerError) -> CliError {
    match err {
        ServerError::Bind { source, .. } | ServerError::Io(source) => io_error(context, source),
        ServerError::Cancelled => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn client_error(context: &str, err: ClientError) -> CliError {
    match err {
        ClientError::Io(source) => io_error(context, source),
        ClientError::Server(message) if message == "timeout" => {
            CliError::new(TIMEOUT, format!("{context}: server timed out"))
        }
        ClientError::Server(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        ClientError::Closed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn executor_error(context: &str, err: ExecutorError) -> CliError {
    match err {
        ExecutorError::Spawn(source) => io_error(context, source),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn telemetry_error(context: &str, err: TelemetryError) -> CliError {
    match err {
        TelemetryError::Io(source) => io_error(context, source),
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}
