//! JSON codec for envelopes.
//!
//! Pure functions called at the transport boundary. The size guard runs before
//! any parsing so oversized frames are never handed to `serde_json`.

use bytes::Bytes;

use crate::error::{Result, RpcError};
use crate::protocol::envelope::{RequestEnvelope, ResponseEnvelope};

/// Decode one request frame. Trailing whitespace (e.g. the line terminator)
/// is ignored.
pub fn decode_request(frame: &[u8], max_frame_bytes: usize) -> Result<RequestEnvelope> {
    if frame.len() > max_frame_bytes {
        return Err(RpcError::PayloadTooLarge {
            size: frame.len(),
            max: max_frame_bytes,
        });
    }
    serde_json::from_slice(frame.trim_ascii_end())
        .map_err(|e| RpcError::BadRequest(format!("invalid request json: {e}")))
}

/// Encode a response as compact JSON.
pub fn encode_response(resp: &ResponseEnvelope) -> Result<Bytes> {
    serde_json::to_vec(resp)
        .map(Bytes::from)
        .map_err(|e| RpcError::Internal(format!("encode response failed: {e}")))
}

/// Encode a request; used by clients and tests.
pub fn encode_request(req: &RequestEnvelope) -> Result<Bytes> {
    serde_json::to_vec(req)
        .map(Bytes::from)
        .map_err(|e| RpcError::Internal(format!("encode request failed: {e}")))
}

/// Decode a response; used by clients and tests.
pub fn decode_response(frame: &[u8]) -> Result<ResponseEnvelope> {
    serde_json::from_slice(frame.trim_ascii_end())
        .map_err(|e| RpcError::BadRequest(format!("invalid response json: {e}")))
}
