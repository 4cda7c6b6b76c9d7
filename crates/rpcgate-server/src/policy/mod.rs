//! Authorization layer (protected operations, role and token checks).
//!
//! Compiles the policy section of the config into a lookup table once at
//! startup; the gate consults it for every request.

pub mod gate;
pub mod rules;

pub use gate::{AuthorizationGate, TokenValidator};
pub use rules::{AuthorizationPolicy, ProtectedOperation};
