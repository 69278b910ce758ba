use fs6ipc_executor::IpcReply;
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::{Framed, LinesCodec};

use crate::error::ClientError;
use crate::wire::{WireReply, WireRequest};

/// Async client for the line protocol. One request in flight at a time.
#[derive(Debug)]
pub struct IpcClient {
    lines: Framed<TcpStream, LinesCodec>,
}

impl IpcClient {
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self {
            lines: Framed::new(stream, LinesCodec::new()),
        })
    }

    /// Send an `ipc` request and return the executed block buffer.
    ///
    /// A failure reply becomes [`ClientError::Server`].
    pub async fn call(&mut self, dw_data: u32, payload: &[u8]) -> Result<IpcReply, ClientError> {
        let request = WireRequest {
            cmd: "ipc".to_string(),
            dw_data,
            cb_data: payload.len() as i64,
            hex: hex::encode_upper(payload),
        };
        match self.send_raw(&serde_json::to_string(&request)?).await? {
            WireReply::Success {
                reply_hex,
                reply_dw_data,
                ..
            } => Ok(IpcReply {
                payload: hex::decode(reply_hex)?,
                correlation_id: reply_dw_data,
            }),
            WireReply::Failure { error, .. } => Err(ClientError::Server(error)),
        }
    }

    /// Send one raw line and read one reply line.
    pub async fn send_raw(&mut self, line: &str) -> Result<WireReply, ClientError> {
        self.lines.send(line).await?;
        let reply = self.lines.next().await.ok_or(ClientError::Closed)??;
        Ok(serde_json::from_str(&reply)?)
    }
}
