use std::net::SocketAddr;

use fs6ipc_executor::Submitter;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::codec::{Line, RequestLineCodec};
use crate::config::ConnectionSettings;
use crate::error::ConnectionError;
use crate::wire::{decode_request, WireReply};

/// Serve request lines on one connection until EOF, idle timeout or shutdown.
///
/// Every complete line gets exactly one reply line, in order. Malformed lines
/// and executor failures are answered with a failure reply and the connection
/// stays open.
pub async fn serve_connection<T>(
    stream: T,
    peer: SocketAddr,
    submitter: Submitter,
    settings: ConnectionSettings,
    shutdown: CancellationToken,
) -> Result<(), ConnectionError>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let mut lines = Framed::new(stream, RequestLineCodec::new(settings.max_line_length));

    loop {
        let next = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                debug!(%peer, "closing connection for shutdown");
                return Ok(());
            }
            next = timeout(settings.idle_timeout, lines.next()) => next,
        };

        let line = match next {
            Err(_) => return Err(ConnectionError::IdleTimeout(settings.idle_timeout)),
            Ok(None) => return Ok(()),
            Ok(Some(line)) => line?,
        };

        let reply = match line {
            Line::Text(text) => process_line(&text, &submitter, &settings).await,
            Line::TooLong => {
                warn!(%peer, limit = settings.max_line_length, "request line too long");
                WireReply::failure("line too long")
            }
        };

        lines.send(serde_json::to_string(&reply)?).await?;
    }
}

async fn process_line(
    line: &str,
    submitter: &Submitter,
    settings: &ConnectionSettings,
) -> WireReply {
    let request = match decode_request(line) {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "rejected request line");
            return WireReply::failure(err.to_string());
        }
    };

    let correlation_id = request.correlation_id;
    if request.length_mismatch() {
        debug!(
            correlation_id,
            declared = request.declared_length,
            actual = request.payload.len(),
            "cbData does not match hex payload"
        );
    }

    let waiter = match submitter.submit(request) {
        Ok(waiter) => waiter,
        Err(err) => return WireReply::failure(err.to_string()),
    };

    match timeout(settings.reply_timeout, waiter).await {
        Err(_) => {
            warn!(correlation_id, timeout = ?settings.reply_timeout, "no reply from executor");
            WireReply::failure("timeout")
        }
        Ok(Err(_)) => WireReply::failure("executor unavailable"),
        Ok(Ok(Err(err))) => WireReply::failure(err.to_string()),
        Ok(Ok(Ok(reply))) => WireReply::success(&reply),
    }
}
