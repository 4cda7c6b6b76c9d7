//! Top-level facade crate for rpcgate.
//!
//! Re-exports the wire types and the server library so users can depend on a single crate.

pub mod core {
    pub use rpcgate_core::*;
}

pub mod server {
    pub use rpcgate_server::*;
}
