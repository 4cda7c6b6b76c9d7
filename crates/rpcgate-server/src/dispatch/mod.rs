//! Dispatcher module exports.
//!
//! Re-exports the dispatcher, resolver, service contract, and outcome
//! taxonomy so downstream consumers can depend on this module directly.

pub mod dispatcher;
pub mod error;
pub mod resolver;
pub mod service;

pub use dispatcher::{Dispatcher, Stage};
pub use error::{AuthError, DispatchError, Fault, ResolutionError};
pub use resolver::Resolver;
pub use service::{BoundOperation, Handler, OperationTable, Service};
