use fs6ipc_telemetry::HandshakeIdentity;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("fs6ipc {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let identity = HandshakeIdentity::default();
    println!("name: fs6ipc");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "target: {}",
        option_env!("FS6IPC_BUILD_TARGET").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!(
        "default_identity: fsuipc={} fs_version={}",
        identity.version_label(),
        identity.fs_version
    );
    println!(
        "default_endpoint: {}:{}",
        fs6ipc_server::DEFAULT_HOST,
        fs6ipc_server::DEFAULT_PORT
    );

    Ok(SUCCESS)
}
