use fs6ipc_executor::{request_channel, Executor, ExecutorConfig, FixedCadence};
use fs6ipc_server::{ServerConfig, ServerError, TransportServer};
use fs6ipc_telemetry::{HandshakeIdentity, StaticSource, TelemetryEncoder};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cmd::{parse_duration, runtime, ServeArgs};
use crate::exit::{
    executor_error, server_error, telemetry_error, CliError, CliResult, INTERNAL, SUCCESS,
};

pub fn run(args: ServeArgs) -> CliResult<i32> {
    let source = match &args.snapshot {
        Some(path) => StaticSource::from_file(path)
            .map_err(|err| telemetry_error("snapshot load failed", err))?,
        None => StaticSource::new(),
    };
    let identity =
        HandshakeIdentity::from_strings(&args.fsuipc_version, &args.fsuipc_build, &args.fs_version);

    let executor_config = ExecutorConfig {
        max_per_tick: args.max_per_tick.max(1),
        cadence: parse_duration(&args.cadence)?,
    };
    let server_config = ServerConfig {
        host: args.host,
        port: args.port,
        reply_timeout: parse_duration(&args.reply_timeout)?,
        idle_timeout: parse_duration(&args.idle_timeout)?,
        grace_period: parse_duration(&args.grace_period)?,
        max_line_length: args.max_line_length,
    };

    info!(
        fsuipc = %identity.version_label(),
        build = identity.build_letter,
        fs_version = identity.fs_version,
        snapshot_values = source.len(),
        "starting fs6ipc"
    );

    runtime()?.block_on(serve(source, identity, executor_config, server_config))
}

async fn serve(
    source: StaticSource,
    identity: HandshakeIdentity,
    executor_config: ExecutorConfig,
    server_config: ServerConfig,
) -> CliResult<i32> {
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("interrupt received, shutting down");
                signal.cancel();
            }
            Err(err) => warn!(error = %err, "interrupt handler unavailable"),
        }
    });

    let (submitter, inbox) = request_channel();
    let encoder = TelemetryEncoder::new(source, identity);
    let executor = Executor::new(encoder, inbox, executor_config);
    let runner = FixedCadence::spawn(executor, shutdown.clone())
        .map_err(|err| executor_error("executor start failed", err))?;

    let served = async {
        let server = TransportServer::bind(server_config, submitter, &shutdown).await?;
        server.serve(shutdown.clone()).await
    }
    .await;

    shutdown.cancel();
    let joined = tokio::task::spawn_blocking(move || runner.join())
        .await
        .map_err(|err| CliError::new(INTERNAL, format!("executor join failed: {err}")))?;
    joined.map_err(|err| executor_error("executor stopped abnormally", err))?;

    match served {
        Ok(()) | Err(ServerError::Cancelled) => Ok(SUCCESS),
        Err(err) => Err(server_error("server failed", err)),
    }
}
