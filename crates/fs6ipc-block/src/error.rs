use std::fmt;

/// Which block a truncation was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Read,
    Write,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockKind::Read => f.write_str("READ"),
            BlockKind::Write => f.write_str("WRITE"),
        }
    }
}

/// Errors that abort serving one request.
///
/// The display strings are part of the wire protocol and are sent to the
/// client verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Fewer header bytes remain than the block requires.
    #[error("{kind} header truncated")]
    TruncatedHeader { kind: BlockKind, at: usize },

    /// The block's data region runs past the end of the request.
    #[error("{kind} payload truncated")]
    TruncatedPayload { kind: BlockKind, at: usize },
}

impl ProtocolError {
    /// Byte position of the offending block.
    pub fn position(&self) -> usize {
        match self {
            ProtocolError::TruncatedHeader { at, .. } | ProtocolError::TruncatedPayload { at, .. } => *at,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
