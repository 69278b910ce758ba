mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "fs6ipc", version, about = "FSUIPC-compatible offset server over TCP")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_with_defaults() {
        let cli = Cli::try_parse_from(["fs6ipc", "serve"]).expect("serve args should parse");
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, 9000);
        assert_eq!(args.fsuipc_version, "7.505");
        assert_eq!(args.max_per_tick, 100);
        assert!(args.snapshot.is_none());
    }

    #[test]
    fn parses_read_regions() {
        let cli = Cli::try_parse_from([
            "fs6ipc", "--format", "json", "read", "3304:4", "0x3308:2", "--port", "9100",
        ])
        .expect("read args should parse");
        let Command::Read(args) = cli.command else {
            panic!("expected read");
        };
        assert_eq!(args.regions, vec!["3304:4", "0x3308:2"]);
        assert_eq!(args.port, 9100);
    }

    #[test]
    fn read_requires_a_region() {
        let err = Cli::try_parse_from(["fs6ipc", "read"]).expect_err("missing region should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
