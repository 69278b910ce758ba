use std::time::Duration;

use fs6ipc_block::serve_blocks;
use fs6ipc_memory::AddressSpace;
use fs6ipc_telemetry::{SimDataSource, TelemetryEncoder};
use tracing::{debug, warn};

use crate::error::ExecutorError;
use crate::queue::Inbox;
use crate::request::{CommandKind, IpcReply, IpcRequest, Reply};

/// Requests served per tick before yielding back to the host.
pub const DEFAULT_MAX_PER_TICK: usize = 100;

/// Host step interval used by [`FixedCadence`](crate::FixedCadence).
pub const DEFAULT_CADENCE: Duration = Duration::from_millis(10);

/// Executor tuning.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum requests served per tick. Default: 100.
    pub max_per_tick: usize,
    /// Interval between ticks when driven by [`FixedCadence`](crate::FixedCadence).
    pub cadence: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_per_tick: DEFAULT_MAX_PER_TICK,
            cadence: DEFAULT_CADENCE,
        }
    }
}

/// What one [`Executor::tick`] did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Requests answered with a success reply.
    pub served: usize,
    /// Requests answered with a failure reply.
    pub failed: usize,
    /// Requests still queued afterwards (approximate).
    pub backlog_hint: usize,
}

impl TickReport {
    pub fn handled(&self) -> usize {
        self.served + self.failed
    }
}

/// Sole owner of the address space and telemetry encoder.
///
/// Not shared: it is moved onto the host thread and everything else talks to
/// it through the request queue.
pub struct Executor<S> {
    memory: AddressSpace,
    encoder: TelemetryEncoder<S>,
    inbox: Inbox,
    config: ExecutorConfig,
}

impl<S: SimDataSource> Executor<S> {
    pub fn new(encoder: TelemetryEncoder<S>, inbox: Inbox, config: ExecutorConfig) -> Self {
        Self::with_memory(AddressSpace::new(), encoder, inbox, config)
    }

    /// Use a pre-built address space, e.g. one of non-default capacity.
    pub fn with_memory(
        memory: AddressSpace,
        encoder: TelemetryEncoder<S>,
        inbox: Inbox,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            memory,
            encoder,
            inbox,
            config,
        }
    }

    /// Drain and serve up to `max_per_tick` queued requests.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        while report.handled() < self.config.max_per_tick {
            let Some(pending) = self.inbox.try_next() else {
                break;
            };
            let (request, done) = pending.into_parts();
            let correlation_id = request.correlation_id;
            let reply = self.handle(request);
            match &reply {
                Ok(_) => report.served += 1,
                Err(err) => {
                    warn!(correlation_id, error = %err, "request failed");
                    report.failed += 1;
                }
            }
            if done.send(reply).is_err() {
                debug!(correlation_id, "reply dropped, waiter gone");
            }
        }

        report.backlog_hint = self.inbox.backlog();
        if report.handled() > 0 {
            debug!(
                served = report.served,
                failed = report.failed,
                backlog = report.backlog_hint,
                "tick"
            );
        }
        report
    }

    /// Serve one request: refresh telemetry once, then execute its blocks.
    pub fn handle(&mut self, request: IpcRequest) -> Reply {
        debug!(kind = ?request.kind, correlation_id = request.correlation_id, "dispatch");
        if let CommandKind::Other(cmd) = &request.kind {
            return Err(ExecutorError::UnknownCommand(cmd.clone()));
        }

        if request.length_mismatch() {
            warn!(
                declared = request.declared_length,
                actual = request.payload.len(),
                "cbData mismatch, using payload length"
            );
        }

        self.encoder.refresh(&mut self.memory)?;
        let mut payload = request.payload;
        serve_blocks(&mut payload, &self.memory)?;

        Ok(IpcReply {
            payload,
            correlation_id: request.correlation_id,
        })
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn memory(&self) -> &AddressSpace {
        &self.memory
    }

    pub fn encoder(&self) -> &TelemetryEncoder<S> {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut TelemetryEncoder<S> {
        &mut self.encoder
    }
}

impl<S> std::fmt::Debug for Executor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("memory", &self.memory)
            .field("config", &self.config)
            .field("backlog", &self.inbox.backlog())
            .finish_non_exhaustive()
    }
}
