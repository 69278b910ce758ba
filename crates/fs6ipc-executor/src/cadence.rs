use std::thread::{self, JoinHandle};
use std::time::Instant;

use fs6ipc_telemetry::SimDataSource;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{ExecutorError, Result};
use crate::executor::Executor;

/// Drives [`Executor::tick`] from a dedicated thread at the configured cadence.
///
/// Stands in for a simulator flight-loop callback. Ticks run back to back
/// when a tick takes longer than the cadence.
#[derive(Debug)]
pub struct FixedCadence<S> {
    handle: JoinHandle<Executor<S>>,
}

impl<S> FixedCadence<S>
where
    S: SimDataSource + Send + 'static,
{
    /// Move `executor` onto a new thread and tick it until `cancel` fires.
    pub fn spawn(mut executor: Executor<S>, cancel: CancellationToken) -> Result<Self> {
        let cadence = executor.config().cadence;
        let handle = thread::Builder::new()
            .name("fs6ipc-executor".into())
            .spawn(move || {
                info!(?cadence, "executor started");
                let mut ticks: u64 = 0;
                while !cancel.is_cancelled() {
                    let started = Instant::now();
                    executor.tick();
                    ticks += 1;
                    if let Some(rest) = cadence.checked_sub(started.elapsed()) {
                        thread::sleep(rest);
                    }
                }
                debug!(ticks, "executor stopped");
                executor
            })?;
        Ok(Self { handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the thread to stop and take the executor back.
    pub fn join(self) -> Result<Executor<S>> {
        self.handle.join().map_err(|_| ExecutorError::Panicked)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use fs6ipc_telemetry::{HandshakeIdentity, StaticSource, TelemetryEncoder};

    use super::*;
    use crate::executor::ExecutorConfig;
    use crate::queue::request_channel;
    use crate::request::IpcRequest;

    #[tokio::test]
    async fn serves_queued_requests_until_cancelled() {
        let (submitter, inbox) = request_channel();
        let encoder = TelemetryEncoder::new(StaticSource::new(), HandshakeIdentity::default());
        let config = ExecutorConfig {
            cadence: Duration::from_millis(1),
            ..ExecutorConfig::default()
        };
        let cancel = CancellationToken::new();
        let runner = FixedCadence::spawn(Executor::new(encoder, inbox, config), cancel.clone())
            .expect("executor thread should spawn");

        let waiter = submitter
            .submit(IpcRequest::ipc(5, vec![0; 4]))
            .expect("submit should succeed");
        let reply = tokio::time::timeout(Duration::from_secs(2), waiter)
            .await
            .expect("reply should arrive in time")
            .expect("executor should complete the request")
            .expect("request should succeed");
        assert_eq!(reply.correlation_id, 5);

        cancel.cancel();
        let executor = tokio::task::spawn_blocking(move || runner.join())
            .await
            .expect("join task should not panic")
            .expect("executor thread should exit cleanly");
        assert_eq!(executor.memory().read(0x330A, 2).unwrap(), vec![0xDE, 0xFA]);
    }
}
