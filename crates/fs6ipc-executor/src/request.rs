use crate::error::ExecutorError;

/// Command kind of a request, matched case-insensitively after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Ipc,
    /// Anything else, normalised.
    Other(String),
}

impl CommandKind {
    pub fn parse(raw: &str) -> Self {
        let cmd = raw.trim().to_lowercase();
        if cmd == "ipc" {
            CommandKind::Ipc
        } else {
            CommandKind::Other(cmd)
        }
    }
}

/// One queued request. Consumed exactly once by the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcRequest {
    pub kind: CommandKind,
    /// Echoed back as `replyDwData`.
    pub correlation_id: u32,
    /// Length the client claimed; the actual payload length wins.
    pub declared_length: i64,
    pub payload: Vec<u8>,
}

impl IpcRequest {
    /// An `ipc` request whose declared length matches its payload.
    pub fn ipc(correlation_id: u32, payload: impl Into<Vec<u8>>) -> Self {
        let payload = payload.into();
        Self {
            kind: CommandKind::Ipc,
            correlation_id,
            declared_length: payload.len() as i64,
            payload,
        }
    }

    /// Whether a non-zero declared length disagrees with the payload.
    pub fn length_mismatch(&self) -> bool {
        self.declared_length != 0 && self.declared_length != self.payload.len() as i64
    }
}

/// A served request: the block buffer after execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcReply {
    pub payload: Vec<u8>,
    pub correlation_id: u32,
}

/// Completion value delivered to the waiting connection.
pub type Reply = std::result::Result<IpcReply, ExecutorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_kind_is_normalised() {
        assert_eq!(CommandKind::parse("ipc"), CommandKind::Ipc);
        assert_eq!(CommandKind::parse("  IPC\t"), CommandKind::Ipc);
        assert_eq!(
            CommandKind::parse(" Ping "),
            CommandKind::Other("ping".to_string())
        );
        assert_eq!(CommandKind::parse(""), CommandKind::Other(String::new()));
    }

    #[test]
    fn declared_length_zero_is_not_a_mismatch() {
        let mut request = IpcRequest::ipc(1, vec![0u8; 4]);
        assert!(!request.length_mismatch());
        request.declared_length = 0;
        assert!(!request.length_mismatch());
        request.declared_length = 8;
        assert!(request.length_mismatch());
    }
}
