//! Single-owner execution of FS6IPC requests.
//!
//! Connection tasks never touch the address space. They [`submit`] requests
//! into an unbounded FIFO and await a one-shot completion; the [`Executor`]
//! owns the [`AddressSpace`] and telemetry encoder and drains a bounded batch
//! of requests per host tick. [`FixedCadence`] drives ticks from a dedicated
//! thread when there is no simulator loop to hook into.
//!
//! [`submit`]: Submitter::submit
//! [`AddressSpace`]: fs6ipc_memory::AddressSpace

pub mod cadence;
pub mod error;
pub mod executor;
pub mod queue;
pub mod request;

pub use cadence::FixedCadence;
pub use error::{ExecutorError, Result};
pub use executor::{Executor, ExecutorConfig, TickReport, DEFAULT_CADENCE, DEFAULT_MAX_PER_TICK};
pub use queue::{request_channel, Inbox, Pending, Submitter};
pub use request::{CommandKind, IpcReply, IpcRequest, Reply};
