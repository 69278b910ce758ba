use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One region returned by `read`.
#[derive(Debug, Serialize)]
pub struct RegionOutput {
    pub offset: String,
    pub length: u32,
    pub hex: String,
    /// Little-endian unsigned value for 1, 2, 4 and 8 byte regions.
    pub value: Option<u64>,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl RegionOutput {
    pub fn new(offset: u32, data: &[u8]) -> Self {
        Self {
            offset: format!("0x{offset:04X}"),
            length: data.len() as u32,
            hex: hex::encode_upper(data),
            value: little_endian_value(data),
            bytes: data.to_vec(),
        }
    }
}

#[derive(Serialize)]
struct ReadOutput<'a> {
    server: &'a str,
    dw_data: u32,
    regions: &'a [RegionOutput],
}

pub fn print_regions(
    server: &str,
    dw_data: u32,
    regions: &[RegionOutput],
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let out = ReadOutput {
                server,
                dw_data,
                regions,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["OFFSET", "LEN", "HEX", "VALUE"]);
            for region in regions {
                table.add_row(vec![
                    region.offset.clone(),
                    region.length.to_string(),
                    region.hex.clone(),
                    region.value.map(|v| v.to_string()).unwrap_or_default(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for region in regions {
                match region.value {
                    Some(value) => println!(
                        "{} [{}] {} = {}",
                        region.offset, region.length, region.hex, value
                    ),
                    None => println!("{} [{}] {}", region.offset, region.length, region.hex),
                }
            }
        }
        OutputFormat::Raw => {
            for region in regions {
                print_raw(&region.bytes);
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn little_endian_value(data: &[u8]) -> Option<u64> {
    if !matches!(data.len(), 1 | 2 | 4 | 8) {
        return None;
    }
    let mut bytes = [0u8; 8];
    bytes[..data.len()].copy_from_slice(data);
    Some(u64::from_le_bytes(bytes))
}
