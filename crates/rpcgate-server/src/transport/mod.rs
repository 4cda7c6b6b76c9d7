//! Transports (TCP lines, HTTP).
//!
//! Both decode a frame once into a `RequestEnvelope`, hand it to the shared
//! dispatcher, and encode exactly one response back.

pub mod codec;
pub mod http;
pub mod tcp;
