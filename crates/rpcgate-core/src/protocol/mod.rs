//! Envelope types and their JSON codec.
//!
//! - `envelope`: request/response descriptors exchanged with the dispatcher.
//! - `codec`: bytes <-> envelope conversion used at the transport boundary.
//!
//! Decoding is panic-free: malformed input is reported as `RpcError` instead
//! of panicking, so transports can always answer with a response.

pub mod codec;
pub mod envelope;
