//! Shared error type across rpcgate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed message.
    BadRequest,
    /// Frame exceeds the configured limit.
    PayloadTooLarge,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in logs and metric labels.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::PayloadTooLarge => "PAYLOAD_TOO_LARGE",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RpcError>;

/// Unified error type used by the codec, config loader, and transports.
///
/// Dispatch outcomes (permission, resolution, invocation) are not errors at
/// this level: they are carried inside a `ResponseEnvelope`.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("payload too large: {size} bytes exceeds {max} byte limit")]
    PayloadTooLarge { size: usize, max: usize },
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl RpcError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RpcError::BadRequest(_) => ClientCode::BadRequest,
            RpcError::PayloadTooLarge { .. } => ClientCode::PayloadTooLarge,
            RpcError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            RpcError::Internal(_) => ClientCode::Internal,
        }
    }
}
