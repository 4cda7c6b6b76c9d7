//! Token issuing and validation on top of the user directory.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use rpcgate_core::{Caller, UserIdentity};

use super::users::{Credentials, UserDirectory};
use crate::dispatch::service::{arg, check_arity, opt_arg, to_value, Handler, OperationTable};
use crate::dispatch::Fault;
use crate::policy::TokenValidator;

/// Longest lifetime a token can be issued with, whoever asks.
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 3600;

/// Token handed out by `authenticate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
    pub user: UserIdentity,
    /// Unix seconds; the token is valid strictly before this instant.
    pub expires_at: u64,
}

pub struct AuthService {
    users: Arc<UserDirectory>,
    tokens: DashMap<String, Token>,
    default_ttl: Duration,
}

impl AuthService {
    pub fn new(users: Arc<UserDirectory>, default_ttl: Duration) -> Self {
        Self {
            users,
            tokens: DashMap::new(),
            default_ttl,
        }
    }

    pub fn authenticate(&self, credentials: &Credentials, ttl: Option<Duration>) -> Result<Token, Fault> {
        if !self.users.check_password(credentials) {
            tracing::debug!(id = %credentials.id, "authentication refused");
            return Err(Fault::domain("Invalid credentials"));
        }
        let user = self.users.get_user(&credentials.id)?;
        let ttl = ttl
            .unwrap_or(self.default_ttl)
            .min(Duration::from_secs(MAX_TOKEN_TTL_SECS));

        let now = now_unix();
        self.sweep_expired(now);
        let token = Token {
            token: uuid::Uuid::new_v4().to_string(),
            user: user.identity(),
            expires_at: now.saturating_add(ttl.as_secs()),
        };
        self.tokens.insert(token.token.clone(), token.clone());
        tracing::debug!(user = %token.user.id, expires_at = token.expires_at, "token issued");
        Ok(token)
    }

    /// Known, unexpired, and issued to exactly the identity the caller claims.
    /// Expired tokens are dropped on sight.
    pub fn validate(&self, caller: &Caller) -> bool {
        let now = now_unix();
        let verdict = match self.tokens.get(&caller.token) {
            None => return false,
            Some(t) if t.expires_at <= now => None,
            Some(t) => Some(t.user == caller.user),
        };
        match verdict {
            Some(ok) => ok,
            None => {
                self.tokens.remove(&caller.token);
                false
            }
        }
    }

    fn sweep_expired(&self, now: u64) {
        let before = self.tokens.len();
        self.tokens.retain(|_, t| t.expires_at > now);
        let swept = before.saturating_sub(self.tokens.len());
        if swept > 0 {
            tracing::debug!(swept, "expired tokens dropped");
        }
    }

    pub fn active_tokens(&self) -> usize {
        self.tokens.len()
    }

    fn op_authenticate(&self, args: &[Value]) -> Result<Value, Fault> {
        check_arity("authenticate", args, 1, 2)?;
        let credentials: Credentials = arg("authenticate", args, 0)?;
        let ttl = opt_arg::<u64>("authenticate", args, 1)?.map(Duration::from_secs);
        to_value(self.authenticate(&credentials, ttl)?)
    }

    fn op_validate_token(&self, args: &[Value]) -> Result<Value, Fault> {
        check_arity("validate_token", args, 1, 1)?;
        let caller: Caller = arg("validate_token", args, 0)?;
        Ok(Value::Bool(self.validate(&caller)))
    }
}

impl TokenValidator for AuthService {
    fn validate_token(&self, caller: &Caller) -> bool {
        self.validate(caller)
    }
}

impl OperationTable for AuthService {
    const SERVICE: &'static str = "AuthService";
    const OPERATIONS: &'static [(&'static str, Handler<Self>)] = &[
        ("authenticate", Self::op_authenticate),
        ("validate_token", Self::op_validate_token),
    ];
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
