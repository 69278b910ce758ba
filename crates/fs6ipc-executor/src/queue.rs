use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::error::{ExecutorError, Result};
use crate::request::{IpcRequest, Reply};

/// A queued request and its single-use completion.
#[derive(Debug)]
pub struct Pending {
    pub request: IpcRequest,
    done: oneshot::Sender<Reply>,
}

impl Pending {
    /// Split into the request and its completion. Sending on the completion
    /// fails once the waiter has given up; that is not an error.
    pub fn into_parts(self) -> (IpcRequest, oneshot::Sender<Reply>) {
        (self.request, self.done)
    }
}

/// Create the request queue shared by connection tasks and the executor.
pub fn request_channel() -> (Submitter, Inbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    let depth = Arc::new(AtomicUsize::new(0));
    (
        Submitter {
            tx,
            depth: Arc::clone(&depth),
        },
        Inbox { rx, depth },
    )
}

/// Sending half, cloned into every connection task.
#[derive(Debug, Clone)]
pub struct Submitter {
    tx: mpsc::UnboundedSender<Pending>,
    depth: Arc<AtomicUsize>,
}

impl Submitter {
    /// Enqueue `request`, returning the receiver its reply will arrive on.
    pub fn submit(&self, request: IpcRequest) -> Result<oneshot::Receiver<Reply>> {
        let (done, waiter) = oneshot::channel();
        self.depth.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(Pending { request, done }).is_err() {
            self.depth.fetch_sub(1, Ordering::Relaxed);
            return Err(ExecutorError::Unavailable);
        }
        Ok(waiter)
    }

    /// Whether the executor side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half, owned by the executor.
#[derive(Debug)]
pub struct Inbox {
    rx: mpsc::UnboundedReceiver<Pending>,
    depth: Arc<AtomicUsize>,
}

impl Inbox {
    /// Take the next request without blocking.
    pub fn try_next(&mut self) -> Option<Pending> {
        let pending = self.rx.try_recv().ok()?;
        self.depth.fetch_sub(1, Ordering::Relaxed);
        Some(pending)
    }

    /// Approximate number of queued requests.
    pub fn backlog(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_fifo() {
        let (submitter, mut inbox) = request_channel();
        let _a = submitter.submit(IpcRequest::ipc(1, vec![])).unwrap();
        let _b = submitter.submit(IpcRequest::ipc(2, vec![])).unwrap();
        assert_eq!(inbox.backlog(), 2);

        assert_eq!(inbox.try_next().unwrap().request.correlation_id, 1);
        assert_eq!(inbox.try_next().unwrap().request.correlation_id, 2);
        assert!(inbox.try_next().is_none());
        assert_eq!(inbox.backlog(), 0);
    }

    #[test]
    fn submit_after_inbox_dropped_is_unavailable() {
        let (submitter, inbox) = request_channel();
        drop(inbox);
        assert!(submitter.is_closed());
        let err = submitter.submit(IpcRequest::ipc(1, vec![])).unwrap_err();
        assert_eq!(err.to_string(), "executor unavailable");
    }

    #[test]
    fn completing_for_a_gone_waiter_is_harmless() {
        let (submitter, mut inbox) = request_channel();
        let waiter = submitter.submit(IpcRequest::ipc(9, vec![])).unwrap();
        drop(waiter);
        let (request, done) = inbox.try_next().unwrap().into_parts();
        assert_eq!(request.correlation_id, 9);
        assert!(done.send(Err(ExecutorError::Unavailable)).is_err());
    }
}
