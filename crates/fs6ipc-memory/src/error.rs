/// Errors raised by address space accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// An access would touch bytes outside the address space.
    #[error("memory access out of range: 0x{offset:04X}+{len} (capacity 0x{capacity:04X})")]
    OutOfRange {
        offset: usize,
        len: usize,
        capacity: usize,
    },

    /// Integer width other than 1, 2, 4 or 8 bytes.
    #[error("unsupported integer width: {0} bytes")]
    UnsupportedWidth(usize),
}

pub type Result<T> = std::result::Result<T, MemoryError>;
