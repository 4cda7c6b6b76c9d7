//! rpcgate server library entry.
//!
//! Wires the authorization gate, service resolver, dispatcher, built-in
//! services, and transports into one server. Consumed by the binary
//! (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod services;
pub mod transport;
