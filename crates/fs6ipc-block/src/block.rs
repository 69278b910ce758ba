use bytes::Buf;
use fs6ipc_memory::AddressSpace;
use tracing::{debug, trace};

use crate::error::{BlockKind, ProtocolError, Result};

/// Block code: end of request.
pub const TERMINATE: u32 = 0;
/// Block code: read state data (`FS6IPC_READSTATEDATA_ID`).
pub const READ_STATE_DATA: u32 = 1;
/// Block code: write state data (`FS6IPC_WRITESTATEDATA_ID`).
pub const WRITE_STATE_DATA: u32 = 2;

/// Size of the leading block code.
pub const CODE_SIZE: usize = 4;
/// Read header: code (4) + offset (4) + length (4) + reserved (4).
pub const READ_HEADER_SIZE: usize = 16;
/// Write header: code (4) + offset (4) + length (4).
pub const WRITE_HEADER_SIZE: usize = 12;

/// One decoded block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Terminate,
    Read { offset: u32, length: u32 },
    Write { offset: u32, length: u32 },
    Unknown { code: u32 },
}

impl Block {
    /// Header plus data size of this block, 0 for blocks that end scanning.
    pub fn wire_size(&self) -> usize {
        match self {
            Block::Read { length, .. } => READ_HEADER_SIZE + *length as usize,
            Block::Write { length, .. } => WRITE_HEADER_SIZE + *length as usize,
            Block::Terminate | Block::Unknown { .. } => 0,
        }
    }
}

/// Why scanning stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// A terminator block was found.
    Terminated,
    /// An unrecognised code was found; the rest is left untouched.
    Unknown(u32),
    /// Fewer than [`CODE_SIZE`] bytes remained.
    #[default]
    Exhausted,
}

/// Outcome of [`serve_blocks`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub reads: usize,
    pub writes: usize,
    /// Bytes processed before scanning stopped.
    pub consumed: usize,
    pub stop: StopReason,
}

/// Decode the block starting at `cursor`.
///
/// Returns `Ok(None)` when fewer than [`CODE_SIZE`] bytes remain. Read and
/// write blocks are validated against the buffer: both the header and the
/// data region must fit.
pub fn decode_block(buf: &[u8], cursor: usize) -> Result<Option<Block>> {
    let remaining = buf.len().saturating_sub(cursor);
    if remaining < CODE_SIZE {
        return Ok(None);
    }

    let mut src = &buf[cursor..];
    let code = src.get_u32_le();
    let (kind, header) = match code {
        TERMINATE => return Ok(Some(Block::Terminate)),
        READ_STATE_DATA => (BlockKind::Read, READ_HEADER_SIZE),
        WRITE_STATE_DATA => (BlockKind::Write, WRITE_HEADER_SIZE),
        code => return Ok(Some(Block::Unknown { code })),
    };

    if remaining < header {
        return Err(ProtocolError::TruncatedHeader { kind, at: cursor });
    }
    let offset = src.get_u32_le();
    let length = src.get_u32_le();

    let fits = header
        .checked_add(length as usize)
        .is_some_and(|size| size <= remaining);
    if !fits {
        return Err(ProtocolError::TruncatedPayload { kind, at: cursor });
    }

    Ok(Some(match kind {
        BlockKind::Read => Block::Read { offset, length },
        BlockKind::Write => Block::Write { offset, length },
    }))
}

/// Execute every block of `buf` against `memory`, in place.
///
/// Read blocks get `memory[offset..offset + length]` copied into their reply
/// region; bytes past the end of `memory` read as zero. Write blocks are
/// validated and skipped without touching `memory`. The buffer never changes
/// length, and bytes after the point where scanning stopped are left as they
/// were.
///
/// On error, blocks before the failing one have already been executed.
pub fn serve_blocks(buf: &mut [u8], memory: &AddressSpace) -> Result<ScanSummary> {
    let mut summary = ScanSummary::default();
    let mut cursor = 0;
    debug!(size = buf.len(), "serving block request");

    while let Some(block) = decode_block(buf, cursor)? {
        trace!(pos = cursor, ?block, "block");
        match block {
            Block::Terminate => {
                summary.stop = StopReason::Terminated;
                break;
            }
            Block::Read { offset, length } => {
                let start = cursor + READ_HEADER_SIZE;
                let region = &mut buf[start..start + length as usize];
                let copied = memory.copy_clipped(offset as usize, region);
                region[copied..].fill(0);
                summary.reads += 1;
            }
            Block::Write { offset, length } => {
                // Accepted but not applied to simulator state.
                debug!(offset = format_args!("0x{offset:04X}"), length, "write block skipped");
                summary.writes += 1;
            }
            Block::Unknown { code } => {
                debug!(code = format_args!("0x{code:04X}"), pos = cursor, "unknown block, ignoring remainder");
                summary.stop = StopReason::Unknown(code);
                break;
            }
        }
        cursor += block.wire_size();
    }

    summary.consumed = cursor;
    Ok(summary)
}
