use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{io_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod read;
pub mod serve;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the executor and TCP server until interrupted.
    Serve(ServeArgs),
    /// Read offset regions from a running server.
    Read(ReadArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Serve(args) => serve::run(args),
        Command::Read(args) => read::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind.
    #[arg(long, env = "FS6IPC_HOST", default_value = fs6ipc_server::DEFAULT_HOST)]
    pub host: String,
    /// Port to bind.
    #[arg(long, env = "FS6IPC_PORT", default_value_t = fs6ipc_server::DEFAULT_PORT)]
    pub port: u16,
    /// JSON file mapping telemetry names to values. Default: all values unset.
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,
    /// FSUIPC version advertised at 0x3304 (e.g. 7.505 or 0x7505).
    #[arg(long, env = "FS6IPC_FSUIPC_VERSION", default_value = "7.505")]
    pub fsuipc_version: String,
    /// Build letter advertised at 0x3304 (a..z or 0..26).
    #[arg(long, env = "FS6IPC_FSUIPC_BUILD", default_value = "0")]
    pub fsuipc_build: String,
    /// Simulator code advertised at 0x3308.
    #[arg(long, env = "FS6IPC_FS_VERSION", default_value = "14")]
    pub fs_version: String,
    /// Requests served per executor tick.
    #[arg(long, env = "FS6IPC_MAX_PER_TICK", default_value_t = fs6ipc_executor::DEFAULT_MAX_PER_TICK)]
    pub max_per_tick: usize,
    /// Executor tick interval (e.g. 10ms).
    #[arg(long, env = "FS6IPC_CADENCE", default_value = "10ms")]
    pub cadence: String,
    /// How long a connection waits for the executor (e.g. 5s).
    #[arg(long, env = "FS6IPC_REPLY_TIMEOUT", default_value = "5s")]
    pub reply_timeout: String,
    /// Close connections idle for this long (e.g. 60s).
    #[arg(long, env = "FS6IPC_IDLE_TIMEOUT", default_value = "60s")]
    pub idle_timeout: String,
    /// Time given to open connections on shutdown (e.g. 1s).
    #[arg(long, default_value = "1s")]
    pub grace_period: String,
    /// Longest accepted request line in bytes.
    #[arg(long, default_value_t = fs6ipc_server::config::DEFAULT_MAX_LINE_LENGTH)]
    pub max_line_length: usize,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Regions to read as OFFSET:LEN, offset in hex (e.g. 3304:4 or 0x0570:8).
    #[arg(required = true, value_name = "OFFSET:LEN")]
    pub regions: Vec<String>,
    /// Server host.
    #[arg(long, env = "FS6IPC_HOST", default_value = fs6ipc_server::DEFAULT_HOST)]
    pub host: String,
    /// Server port.
    #[arg(long, env = "FS6IPC_PORT", default_value_t = fs6ipc_server::DEFAULT_PORT)]
    pub port: u16,
    /// Correlation value sent as dwData.
    #[arg(long, default_value_t = 0)]
    pub dw_data: u32,
    /// Maximum time for connect and reply (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

pub(crate) fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| io_error("runtime setup failed", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert_eq!(parse_duration("").unwrap_err().code, USAGE);
    }
}
