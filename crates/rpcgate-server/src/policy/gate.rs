use std::sync::Arc;

use rpcgate_core::Caller;

use super::rules::AuthorizationPolicy;
use crate::dispatch::error::AuthError;

/// Token check delegated to the authentication collaborator.
pub trait TokenValidator: Send + Sync {
    fn validate_token(&self, caller: &Caller) -> bool;
}

/// Decides whether caller metadata satisfies the policy for an operation.
///
/// Holds no mutable state; the validator owns whatever it needs.
pub struct AuthorizationGate {
    policy: AuthorizationPolicy,
    tokens: Arc<dyn TokenValidator>,
}

impl AuthorizationGate {
    pub fn new(policy: AuthorizationPolicy, tokens: Arc<dyn TokenValidator>) -> Self {
        Self { policy, tokens }
    }

    pub fn policy(&self) -> &AuthorizationPolicy {
        &self.policy
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.policy.is_protected(name)
    }

    /// Metadata presence, then role, then token. First failure wins.
    pub fn authorize(&self, name: &str, metadata: Option<&Caller>) -> Result<(), AuthError> {
        let Some(rule) = self.policy.rule(name) else {
            return Ok(());
        };

        let caller = metadata.ok_or(AuthError::MissingMetadata)?;

        if caller.user.role != rule.required_role {
            return Err(AuthError::InsufficientRole);
        }

        if rule.require_token && !self.tokens.validate_token(caller) {
            return Err(AuthError::InvalidToken);
        }

        Ok(())
    }
}
