use std::collections::HashSet;

use serde::Deserialize;
use rpcgate_core::error::{Result, RpcError};
use rpcgate_core::Role;

use crate::services::{User, MAX_TOKEN_TTL_SECS};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub policy: PolicySection,

    #[serde(default)]
    pub auth: AuthSection,

    /// Accounts loaded into the user directory at startup.
    #[serde(default)]
    pub users: Vec<User>,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(RpcError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.policy.validate()?;
        self.auth.validate()?;

        let mut seen = HashSet::new();
        for u in &self.users {
            if !seen.insert(u.username.as_str()) {
                return Err(RpcError::BadRequest(format!(
                    "users: duplicate username {}",
                    u.username
                )));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// TCP listener for line-delimited JSON requests.
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Optional HTTP ingress (`POST /v1/rpc`) plus ops routes.
    #[serde(default)]
    pub http_listen: Option<String>,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            http_listen: None,
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        if !(256..=16 * 1024 * 1024).contains(&self.max_frame_bytes) {
            return Err(RpcError::BadRequest(
                "server.max_frame_bytes must be between 256 and 16777216".into(),
            ));
        }
        if self.http_listen.as_deref() == Some(self.listen.as_str()) {
            return Err(RpcError::BadRequest(
                "server.http_listen must differ from server.listen".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "127.0.0.1:5000".into()
}
fn default_max_frame_bytes() -> usize {
    64 * 1024
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicySection {
    #[serde(default = "default_protected")]
    pub protected: Vec<ProtectedRule>,
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            protected: default_protected(),
        }
    }
}

impl PolicySection {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for r in &self.protected {
            let op = r.operation.trim();
            if op.is_empty() {
                return Err(RpcError::BadRequest(
                    "policy.protected[].operation must not be empty".into(),
                ));
            }
            if !seen.insert(op) {
                return Err(RpcError::BadRequest(format!(
                    "policy.protected lists operation twice: {op}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProtectedRule {
    pub operation: String,
    pub role: Role,
    #[serde(default = "default_true")]
    pub require_token: bool,
}

fn default_protected() -> Vec<ProtectedRule> {
    vec![ProtectedRule {
        operation: "get_user".into(),
        role: Role::Admin,
        require_token: true,
    }]
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthSection {
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

impl AuthSection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.token_ttl_secs) {
            return Err(RpcError::BadRequest(format!(
                "auth.token_ttl_secs must be between 1 and {MAX_TOKEN_TTL_SECS}"
            )));
        }
        Ok(())
    }
}

fn default_token_ttl_secs() -> u64 {
    24 * 3600
}
