use bytes::{BufMut, Bytes, BytesMut};

use crate::block::{READ_HEADER_SIZE, READ_STATE_DATA, TERMINATE, WRITE_STATE_DATA};

/// Where a read block's data lands in the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadSlot {
    pub offset: u32,
    pub length: u32,
    position: usize,
}

impl ReadSlot {
    /// The bytes this read returned, or `None` if `reply` is too short.
    pub fn extract<'a>(&self, reply: &'a [u8]) -> Option<&'a [u8]> {
        reply.get(self.position..self.position + self.length as usize)
    }
}

/// Builds a block request.
///
/// ```
/// use fs6ipc_block::BlockBuilder;
///
/// let mut builder = BlockBuilder::new();
/// let altitude = builder.read(0x0570, 8);
/// let payload = builder.finish();
/// assert_eq!(payload.len(), 16 + 8 + 4);
/// assert_eq!(altitude.extract(&payload), Some(&[0u8; 8][..]));
/// ```
#[derive(Debug, Default)]
pub struct BlockBuilder {
    buf: BytesMut,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a read block; the returned slot locates its data in the reply.
    pub fn read(&mut self, offset: u32, length: u32) -> ReadSlot {
        self.buf.reserve(READ_HEADER_SIZE + length as usize);
        self.buf.put_u32_le(READ_STATE_DATA);
        self.buf.put_u32_le(offset);
        self.buf.put_u32_le(length);
        self.buf.put_u32_le(0);
        let position = self.buf.len();
        self.buf.put_bytes(0, length as usize);
        ReadSlot {
            offset,
            length,
            position,
        }
    }

    /// Append a write block carrying `data`.
    pub fn write(&mut self, offset: u32, data: &[u8]) -> &mut Self {
        self.buf.put_u32_le(WRITE_STATE_DATA);
        self.buf.put_u32_le(offset);
        self.buf.put_u32_le(data.len() as u32);
        self.buf.put_slice(data);
        self
    }

    /// Bytes appended so far, without terminator.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Append the terminator and return the request payload.
    pub fn finish(mut self) -> Bytes {
        self.buf.put_u32_le(TERMINATE);
        self.buf.freeze()
    }
}
