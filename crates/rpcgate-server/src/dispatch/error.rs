//! Dispatch outcome taxonomy.
//!
//! Every failure a request can hit inside the dispatcher is one of three
//! kinds. `DispatchError`'s `Display` is exactly the text placed in
//! `ResponseEnvelope::error`.

use thiserror::Error;

/// Authorization gate failures, checked in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Missing metadata for authorization.")]
    MissingMetadata,
    #[error("You are not authorized to perform this operation.")]
    InsufficientRole,
    #[error("Invalid or expired token.")]
    InvalidToken,
}

/// Resolver failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Method '{name}' not found in available services.")]
    MethodNotFound { name: String },
}

/// Fault raised by a bound operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    /// Wrong number of positional arguments.
    #[error("{op}() takes {expected} argument(s) but {got} were given")]
    Arity { op: &'static str, expected: String, got: usize },

    /// Argument present but not of the expected shape.
    #[error("{op}() argument {index} is invalid: {reason}")]
    BadArgument { op: &'static str, index: usize, reason: String },

    /// Operation refused the request (duplicate user, unknown id, ...).
    #[error("{0}")]
    Domain(String),

    /// Anything else that went wrong inside the service.
    #[error("internal fault: {0}")]
    Internal(String),
}

impl Fault {
    pub fn domain(msg: impl Into<String>) -> Self {
        Fault::Domain(msg.into())
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Fault::Arity { .. } => "arity",
            Fault::BadArgument { .. } => "bad_argument",
            Fault::Domain(_) => "domain",
            Fault::Internal(_) => "internal",
        }
    }
}

/// Anything that turns a request into an error response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Permission denied: {0}")]
    PermissionDenied(#[from] AuthError),
    #[error("Invalid method: {0}")]
    InvalidMethod(#[from] ResolutionError),
    #[error("Unexpected error occurred: {0}")]
    Unexpected(#[from] Fault),
}

impl DispatchError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::PermissionDenied(_) => "permission_denied",
            DispatchError::InvalidMethod(_) => "invalid_method",
            DispatchError::Unexpected(_) => "unexpected",
        }
    }
}
