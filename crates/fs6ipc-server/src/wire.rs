use fs6ipc_executor::{CommandKind, IpcReply, IpcRequest};
use serde::{Deserialize, Serialize};

use crate::error::WireError;

/// A request line as sent by clients. Missing fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WireRequest {
    pub cmd: String,
    pub dw_data: u32,
    /// Declared payload length. Informational only.
    pub cb_data: i64,
    pub hex: String,
}

/// A reply line. Serialises to exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireReply {
    Success {
        ok: bool,
        #[serde(rename = "replyHex")]
        reply_hex: String,
        #[serde(rename = "replyDwData")]
        reply_dw_data: u32,
    },
    Failure {
        ok: bool,
        error: String,
    },
}

impl WireReply {
    pub fn success(reply: &IpcReply) -> Self {
        WireReply::Success {
            ok: true,
            reply_hex: hex::encode_upper(&reply.payload),
            reply_dw_data: reply.correlation_id,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        WireReply::Failure {
            ok: false,
            error: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, WireReply::Success { .. })
    }
}

/// Parse one request line into an executor request.
///
/// Only `ipc` requests have their hex decoded; other commands are passed on
/// with an empty payload and rejected by the executor.
pub fn decode_request(line: &str) -> Result<IpcRequest, WireError> {
    let wire: WireRequest = serde_json::from_str(line)?;
    let kind = CommandKind::parse(&wire.cmd);

    let payload = match kind {
        CommandKind::Ipc => {
            let hex = wire.hex.trim();
            if hex.len() % 2 != 0 {
                return Err(WireError::OddHexLength);
            }
            hex::decode(hex)?
        }
        CommandKind::Other(_) => Vec::new(),
    };

    Ok(IpcRequest {
        kind,
        correlation_id: wire.dw_data,
        declared_length: wire.cb_data,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_request() {
        let request =
            decode_request(r#"{"cmd":"ipc","dwData":7,"cbData":4,"hex":"00000000"}"#).unwrap();
        assert_eq!(request.kind, CommandKind::Ipc);
        assert_eq!(request.correlation_id, 7);
        assert_eq!(request.declared_length, 4);
        assert_eq!(request.payload, vec![0; 4]);
    }

    #[test]
    fn missing_fields_default() {
        let request = decode_request("{}").unwrap();
        assert_eq!(request.kind, CommandKind::Other(String::new()));
        assert_eq!(request.correlation_id, 0);
        assert_eq!(request.declared_length, 0);
        assert!(request.payload.is_empty());
    }

    #[test]
    fn hex_is_trimmed_and_case_insensitive() {
        let request = decode_request(r#"{"cmd":" IPC ","hex":"  deADbeef \n"}"#).unwrap();
        assert_eq!(request.kind, CommandKind::Ipc);
        assert_eq!(request.payload, vec![0xDE, 0xAD, 0xBE, 0xEF]);
    }

    #[test]
    fn odd_hex_is_rejected() {
        let err = decode_request(r#"{"cmd":"ipc","hex":"ABC"}"#).unwrap_err();
        assert!(matches!(err, WireError::OddHexLength));
        assert_eq!(err.to_string(), "hex length must be even");
    }

    #[test]
    fn non_hex_digits_are_rejected() {
        let err = decode_request(r#"{"cmd":"ipc","hex":"ZZ"}"#).unwrap_err();
        assert!(matches!(err, WireError::InvalidHex(_)));
        assert!(err.to_string().starts_with("invalid hex: "));
    }

    #[test]
    fn invalid_json_is_rejected() {
        let err = decode_request("{not json").unwrap_err();
        assert!(err.to_string().starts_with("invalid json: "));
    }

    #[test]
    fn hex_of_other_commands_is_ignored() {
        let request = decode_request(r#"{"cmd":"ping","hex":"ABC"}"#).unwrap();
        assert_eq!(request.kind, CommandKind::Other("ping".to_string()));
        assert!(request.payload.is_empty());
    }

    #[test]
    fn success_reply_is_compact_upper_hex() {
        let reply = WireReply::success(&IpcReply {
            payload: vec![0xAB, 0x01],
            correlation_id: 7,
        });
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"ok":true,"replyHex":"AB01","replyDwData":7}"#
        );
    }

    #[test]
    fn failure_reply_shape() {
        let reply = WireReply::failure("timeout");
        assert_eq!(
            serde_json::to_string(&reply).unwrap(),
            r#"{"ok":false,"error":"timeout"}"#
        );
        assert!(!reply.is_ok());
    }

    #[test]
    fn replies_parse_back_into_the_right_shape() {
        let ok: WireReply =
            serde_json::from_str(r#"{"ok":true,"replyHex":"00","replyDwData":1}"#).unwrap();
        assert!(ok.is_ok());
        let failed: WireReply = serde_json::from_str(r#"{"ok":false,"error":"x"}"#).unwrap();
        assert_eq!(failed, WireReply::failure("x"));
    }
}
