//! rpcgate core: transport-agnostic envelope types, codec, and error surface.
//!
//! This crate defines the wire-level contracts shared by the server, its
//! transports, and client tooling. It carries no runtime dependencies so it
//! can be reused by anything that speaks the envelope format.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `RpcError`/`Result` so a malformed
//! frame can never take a server process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{Result, RpcError};
pub use protocol::envelope::{Caller, RequestEnvelope, ResponseEnvelope, Role, UserIdentity};
