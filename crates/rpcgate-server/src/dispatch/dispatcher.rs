use serde_json::Value;

use rpcgate_core::{RequestEnvelope, ResponseEnvelope};

use super::error::DispatchError;
use super::resolver::Resolver;
use crate::policy::AuthorizationGate;

/// Where a request is in its single pass through the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Authorizing,
    Resolving,
    Invoking,
    Responded,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::Authorizing => "authorizing",
            Stage::Resolving => "resolving",
            Stage::Invoking => "invoking",
            Stage::Responded => "responded",
        }
    }
}

/// authorize -> resolve -> invoke -> respond.
///
/// Stateless apart from the gate and resolver, both read-only after
/// construction, so one instance is shared by every connection.
pub struct Dispatcher {
    gate: AuthorizationGate,
    resolver: Resolver,
}

impl Dispatcher {
    pub fn new(gate: AuthorizationGate, resolver: Resolver) -> Self {
        Self { gate, resolver }
    }

    pub fn gate(&self) -> &AuthorizationGate {
        &self.gate
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Exactly one response per request; never fails.
    pub fn dispatch(&self, req: &RequestEnvelope) -> ResponseEnvelope {
        self.respond(req).1
    }

    /// Like `dispatch`, also returning the outcome label: `"ok"` or the
    /// `DispatchError::kind` of the failure.
    pub fn respond(&self, req: &RequestEnvelope) -> (&'static str, ResponseEnvelope) {
        let (outcome, resp) = match self.execute(req) {
            Ok(value) => ("ok", ResponseEnvelope::success(value)),
            Err(e) => (e.kind(), ResponseEnvelope::failure(e.to_string())),
        };
        tracing::debug!(op = req.name(), stage = Stage::Responded.as_str(), outcome, "response ready");
        (outcome, resp)
    }

    /// The pipeline without the response wrapping.
    pub fn execute(&self, req: &RequestEnvelope) -> Result<Value, DispatchError> {
        let op = req.name();
        tracing::debug!(op, stage = Stage::Received.as_str(), args = req.args().len(), "request received");

        if self.gate.is_protected(op) {
            tracing::debug!(op, stage = Stage::Authorizing.as_str(), "checking caller");
            if let Err(e) = self.gate.authorize(op, req.metadata()) {
                let user = req.metadata().map(|c| c.user.id.as_str()).unwrap_or("-");
                tracing::warn!(op, user, reason = %e, "permission denied");
                return Err(e.into());
            }
        }

        let bound = match self.resolver.resolve(op) {
            Ok(b) => b,
            Err(e) => {
                tracing::error!(op, stage = Stage::Resolving.as_str(), reason = %e, "invalid method");
                return Err(e.into());
            }
        };
        tracing::debug!(op, svc = bound.service(), stage = Stage::Invoking.as_str(), "method found");

        match bound.invoke(req.args()) {
            Ok(value) => {
                tracing::info!(op, svc = bound.service(), "method executed");
                Ok(value)
            }
            Err(fault) => {
                tracing::error!(
                    op,
                    svc = bound.service(),
                    kind = fault.kind(),
                    args = ?req.args(),
                    fault = ?fault,
                    "operation fault"
                );
                Err(fault.into())
            }
        }
    }
}
