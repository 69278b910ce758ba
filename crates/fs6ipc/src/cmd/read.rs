use fs6ipc_block::{BlockBuilder, ReadSlot};
use fs6ipc_server::IpcClient;

use crate::cmd::{parse_duration, runtime, ReadArgs};
use crate::exit::{client_error, CliError, CliResult, DATA_INVALID, SUCCESS, TIMEOUT, USAGE};
use crate::output::{print_regions, OutputFormat, RegionOutput};

/// Largest region a single read may request.
const MAX_REGION_LENGTH: u32 = 0x1_0000;

pub fn run(args: ReadArgs, format: OutputFormat) -> CliResult<i32> {
    let regions = args
        .regions
        .iter()
        .map(|raw| parse_region(raw))
        .collect::<CliResult<Vec<_>>>()?;
    let timeout = parse_duration(&args.timeout)?;
    let server = format!("{}:{}", args.host, args.port);

    let mut builder = BlockBuilder::new();
    let slots: Vec<ReadSlot> = regions
        .iter()
        .map(|&(offset, length)| builder.read(offset, length))
        .collect();
    let payload = builder.finish();

    let reply = runtime()?.block_on(async {
        let exchange = async {
            let mut client = IpcClient::connect(server.as_str())
                .await
                .map_err(|err| client_error("connect failed", err))?;
            client
                .call(args.dw_data, &payload)
                .await
                .map_err(|err| client_error("read failed", err))
        };
        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| CliError::new(TIMEOUT, format!("no reply from {server} within {timeout:?}")))?
    })?;

    let outputs = slots
        .iter()
        .map(|slot| {
            slot.extract(&reply.payload)
                .map(|data| RegionOutput::new(slot.offset, data))
                .ok_or_else(|| CliError::new(DATA_INVALID, "reply shorter than request"))
        })
        .collect::<CliResult<Vec<_>>>()?;

    print_regions(&server, reply.correlation_id, &outputs, format);
    Ok(SUCCESS)
}

/// Parse `OFFSET:LEN` with a hex offset (optional `0x`) and decimal length.
fn parse_region(raw: &str) -> CliResult<(u32, u32)> {
    let usage = || CliError::new(USAGE, format!("invalid region {raw:?}, expected OFFSET:LEN"));
    let (offset, length) = raw.trim().split_once(':').ok_or_else(usage)?;
    let offset = offset.trim();
    let offset = offset
        .strip_prefix("0x")
        .or_else(|| offset.strip_prefix("0X"))
        .unwrap_or(offset);
    let offset = u32::from_str_radix(offset, 16).map_err(|_| usage())?;
    let length: u32 = length.trim().parse().map_err(|_| usage())?;
    if length == 0 || length > MAX_REGION_LENGTH {
        return Err(CliError::new(
            USAGE,
            format!("region length must be 1..={MAX_REGION_LENGTH}, got {length}"),
        ));
    }
    Ok((offset, length))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_offsets_with_and_without_prefix() {
        assert_eq!(parse_region("3304:4").unwrap(), (0x3304, 4));
        assert_eq!(parse_region("0x0570:8").unwrap(), (0x0570, 8));
        assert_eq!(parse_region(" 0X0BC8 : 2 ").unwrap(), (0x0BC8, 2));
    }

    #[test]
    fn rejects_malformed_regions() {
        assert_eq!(parse_region("3304").unwrap_err().code, USAGE);
        assert_eq!(parse_region("zz:4").unwrap_err().code, USAGE);
        assert_eq!(parse_region("3304:0").unwrap_err().code, USAGE);
        assert_eq!(parse_region("3304:-1").unwrap_err().code, USAGE);
    }
}
