//! Protected-operation table compilation and lookup.

use std::collections::HashMap;

use rpcgate_core::error::{Result, RpcError};
use rpcgate_core::Role;

use crate::config::schema::ProtectedRule;

/// Requirement attached to one protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectedOperation {
    pub required_role: Role,
    pub require_token: bool,
}

/// Operation name -> requirement. Names absent from the map are public.
#[derive(Debug, Clone, Default)]
pub struct AuthorizationPolicy {
    rules: HashMap<String, ProtectedOperation>,
}

impl AuthorizationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by tests and embedders.
    pub fn protect(mut self, operation: impl Into<String>, required_role: Role, require_token: bool) -> Self {
        self.rules.insert(
            operation.into(),
            ProtectedOperation { required_role, require_token },
        );
        self
    }

    pub fn rule(&self, operation: &str) -> Option<ProtectedOperation> {
        self.rules.get(operation).copied()
    }

    pub fn is_protected(&self, operation: &str) -> bool {
        self.rules.contains_key(operation)
    }

    pub fn protected_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

pub fn compile_policy(raw: &[ProtectedRule]) -> Result<AuthorizationPolicy> {
    let mut policy = AuthorizationPolicy::new();
    for r in raw {
        let op = r.operation.trim();
        if op.is_empty() {
            return Err(RpcError::BadRequest("policy.protected entry has empty operation".into()));
        }
        if policy.is_protected(op) {
            return Err(RpcError::BadRequest(format!(
                "policy.protected lists operation twice: {op}"
            )));
        }
        policy = policy.protect(op, r.role, r.require_token);
    }
    Ok(policy)
}
