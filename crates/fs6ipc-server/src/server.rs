use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;

use fs6ipc_executor::Submitter;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::connection::serve_connection;
use crate::error::{ConnectionError, ServerError};

const BIND_BACKOFF_START: Duration = Duration::from_millis(100);
const BIND_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Accepts clients and runs one connection task per client.
#[derive(Debug)]
pub struct TransportServer {
    listener: TcpListener,
    submitter: Submitter,
    config: ServerConfig,
}

impl TransportServer {
    /// Bind the configured address.
    ///
    /// While the address is in use the bind is retried with exponential
    /// backoff (100 ms doubling to 1 s) until it succeeds or `shutdown` fires.
    /// Any other bind error is returned.
    pub async fn bind(
        config: ServerConfig,
        submitter: Submitter,
        shutdown: &CancellationToken,
    ) -> Result<Self, ServerError> {
        let addr = config.bind_address();
        let mut backoff = BIND_BACKOFF_START;

        let listener = loop {
            match TcpListener::bind(&addr).await {
                Ok(listener) => break listener,
                Err(err) if err.kind() == ErrorKind::AddrInUse => {
                    warn!(%addr, retry_in = ?backoff, "address in use, retrying bind");
                    tokio::select! {
                        _ = shutdown.cancelled() => return Err(ServerError::Cancelled),
                        _ = tokio::time::sleep(backoff) => {}
                    }
                    backoff = (backoff * 2).min(BIND_BACKOFF_MAX);
                }
                Err(source) => return Err(ServerError::Bind { addr, source }),
            }
        };

        info!("fs6ipc server listening on {}", listener.local_addr()?);
        Ok(Self {
            listener,
            submitter,
            config,
        })
    }

    /// The bound address; useful when binding port 0.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accept connections until `shutdown` fires.
    ///
    /// The listener is closed first; open connections then get the grace
    /// period to finish before they are aborted.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<(), ServerError> {
        let Self {
            listener,
            submitter,
            config,
        } = self;
        let settings = config.connection_settings();
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                accepted = listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            warn!(error = %err, "accept failed");
                            continue;
                        }
                    };
                    if let Err(err) = stream.set_nodelay(true) {
                        debug!(%peer, error = %err, "set_nodelay failed");
                    }
                    info!(%peer, "client connected");

                    let submitter = submitter.clone();
                    let shutdown = shutdown.clone();
                    connections.spawn(async move {
                        match serve_connection(stream, peer, submitter, settings, shutdown).await {
                            Ok(()) => info!(%peer, "client disconnected"),
                            Err(ConnectionError::IdleTimeout(idle)) => {
                                info!(%peer, ?idle, "client disconnected (idle)");
                            }
                            Err(err) => warn!(%peer, error = %err, "connection failed"),
                        }
                    });
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        drop(listener);
        let open = connections.len();
        if open > 0 {
            debug!(open, grace = ?config.grace_period, "draining connections");
            let drained = tokio::time::timeout(config.grace_period, async {
                while connections.join_next().await.is_some() {}
            })
            .await;
            if drained.is_err() {
                warn!(remaining = connections.len(), "aborting connections after grace period");
                connections.abort_all();
                while connections.join_next().await.is_some() {}
            }
        }

        info!("fs6ipc server stopped");
        Ok(())
    }
}
