//! Request/response envelopes (JSON).
//!
//! Envelopes are immutable once built: fields are private and only readable
//! through accessors. `RequestEnvelope` guarantees a non-empty operation name;
//! `ResponseEnvelope` guarantees that `result` and `error` are never both set.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, RpcError};

/// Caller role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

/// Identity a caller claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserIdentity {
    pub id: String,
    pub role: Role,
}

/// Caller metadata attached to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Caller {
    pub user: UserIdentity,
    pub token: String,
}

/// One RPC call: operation name, positional arguments, optional caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRequest")]
pub struct RequestEnvelope {
    name: String,
    args: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Caller>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRequest {
    name: String,
    #[serde(default)]
    args: Vec<Value>,
    #[serde(default)]
    metadata: Option<Caller>,
}

impl TryFrom<RawRequest> for RequestEnvelope {
    type Error = RpcError;

    fn try_from(raw: RawRequest) -> Result<Self> {
        RequestEnvelope::new(raw.name, raw.args, raw.metadata)
    }
}

impl RequestEnvelope {
    /// Build a request. Fails if `name` is empty or only whitespace.
    pub fn new(name: impl Into<String>, args: Vec<Value>, metadata: Option<Caller>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RpcError::BadRequest("request name must not be empty".into()));
        }
        Ok(Self { name, args, metadata })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn metadata(&self) -> Option<&Caller> {
        self.metadata.as_ref()
    }
}

/// Outcome of one RPC call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    result: Option<Value>,
    error: Option<String>,
}

impl ResponseEnvelope {
    /// Successful call returning `value`.
    pub fn success(value: Value) -> Self {
        Self {
            result: Some(value),
            error: None,
        }
    }

    /// Failed call; `result` is always `None`.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(message.into()),
        }
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Consume into the std `Result` shape.
    pub fn into_result(self) -> std::result::Result<Value, String> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}
