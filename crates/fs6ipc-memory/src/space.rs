use crate::error::{MemoryError, Result};

/// Size of the legacy IPC memory block: 32 KiB.
pub const DEFAULT_CAPACITY: usize = 0x8000;

/// Fixed-size, zero-initialised byte buffer addressed by legacy offsets.
///
/// All multi-byte values are little-endian. Every write lies fully within
/// bounds or is rejected with [`MemoryError::OutOfRange`]; nothing is ever
/// partially written.
///
/// There is no internal locking. A single owner (the executor) mutates it.
#[derive(Clone)]
pub struct AddressSpace {
    bytes: Box<[u8]>,
}

impl AddressSpace {
    /// Create a zeroed address space of [`DEFAULT_CAPACITY`] bytes.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a zeroed address space of `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: vec![0u8; capacity].into_boxed_slice(),
        }
    }

    /// Total size in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Copy `data` into the buffer at `offset`.
    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        let end = self.checked_end(offset, data.len())?;
        self.bytes[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Write an integer of `width` bytes, clamping to the representable range.
    ///
    /// Out-of-range values are saturated to the min/max of the target width
    /// instead of failing; legacy clients expect bounded values rather than
    /// protocol errors.
    pub fn write_int(&mut self, offset: usize, value: i128, width: usize, signed: bool) -> Result<()> {
        if !matches!(width, 1 | 2 | 4 | 8) {
            return Err(MemoryError::UnsupportedWidth(width));
        }
        let bits = (width * 8) as u32;
        let (min, max) = if signed {
            (-(1i128 << (bits - 1)), (1i128 << (bits - 1)) - 1)
        } else {
            (0, (1i128 << bits) - 1)
        };
        let clamped = value.clamp(min, max);
        let le = clamped.to_le_bytes();
        self.write(offset, &le[..width])
    }

    pub fn write_u8(&mut self, offset: usize, value: u8) -> Result<()> {
        self.write(offset, &[value])
    }

    pub fn write_u16(&mut self, offset: usize, value: u16) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    pub fn write_s16(&mut self, offset: usize, value: i16) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    pub fn write_s32(&mut self, offset: usize, value: i32) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    pub fn write_s64(&mut self, offset: usize, value: i64) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    /// Write an 8-byte IEEE-754 double.
    pub fn write_f64(&mut self, offset: usize, value: f64) -> Result<()> {
        self.write(offset, &value.to_le_bytes())
    }

    /// Return a copy of `length` bytes starting at `offset`.
    pub fn read(&self, offset: usize, length: usize) -> Result<Vec<u8>> {
        let end = self.checked_end(offset, length)?;
        Ok(self.bytes[offset..end].to_vec())
    }

    /// Copy the in-bounds part of `[offset, offset + dst.len())` into `dst`.
    ///
    /// Returns the number of bytes copied; the rest of `dst` is left untouched.
    pub fn copy_clipped(&self, offset: usize, dst: &mut [u8]) -> usize {
        if offset >= self.bytes.len() {
            return 0;
        }
        let available = self.bytes.len() - offset;
        let n = available.min(dst.len());
        dst[..n].copy_from_slice(&self.bytes[offset..offset + n]);
        n
    }

    /// Borrow the full buffer.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn checked_end(&self, offset: usize, len: usize) -> Result<usize> {
        match offset.checked_add(len) {
            Some(end) if end <= self.bytes.len() => Ok(end),
            _ => Err(MemoryError::OutOfRange {
                offset,
                len,
                capacity: self.bytes.len(),
            }),
        }
    }
}

impl Default for AddressSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AddressSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressSpace")
            .field("capacity", &self.bytes.len())
            .finish()
    }
}
