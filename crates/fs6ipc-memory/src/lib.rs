//! Emulated FS6IPC address space.
//!
//! This is the lowest layer of fs6ipc. The legacy protocol exposes simulator
//! state as one flat block of memory; clients address it by fixed offsets.
//! Everything else builds on top of the [`AddressSpace`] type provided here.

pub mod error;
pub mod space;

pub use error::{MemoryError, Result};
pub use space::{AddressSpace, DEFAULT_CAPACITY};
