//! In-memory user directory.
//!
//! A user is addressable by its username or by any of its emails. Passwords
//! are kept only as SHA-256 digests and never leave the directory.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use rpcgate_core::{Role, UserIdentity};

use crate::dispatch::service::{arg, check_arity, to_value, Handler, OperationTable};
use crate::dispatch::Fault;

/// User record as exchanged with callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub emails: BTreeSet<String>,
    pub full_name: String,
    pub role: Role,
    /// Only set on input (`add_user`); always `None` on output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl User {
    /// Every id the user can be looked up by.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.username.as_str()).chain(self.emails.iter().map(String::as_str))
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.username.clone(),
            role: self.role,
        }
    }
}

/// Login pair; `id` is a username or an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    pub id: String,
    pub password: String,
}

struct StoredUser {
    user: User,
    password_digest: Option<String>,
}

#[derive(Default)]
struct Directory {
    users: HashMap<String, StoredUser>,
    // email -> username
    by_email: HashMap<String, String>,
}

impl Directory {
    fn find(&self, id: &str) -> Option<&StoredUser> {
        self.users
            .get(id)
            .or_else(|| self.by_email.get(id).and_then(|u| self.users.get(u)))
    }
}

#[derive(Default)]
pub struct UserDirectory {
    inner: RwLock<Directory>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, mut user: User) -> Result<(), Fault> {
        if user.username.trim().is_empty() {
            return Err(Fault::domain("username must not be empty"));
        }

        let mut dir = self
            .inner
            .write()
            .map_err(|_| Fault::Internal("user directory lock poisoned".into()))?;

        if let Some(taken) = user.ids().find(|id| dir.find(id).is_some()) {
            return Err(Fault::domain(format!("User with ID {taken} already exists")));
        }

        let password_digest = user
            .password
            .take()
            .map(|p| digest_password(&user.username, &p));

        for email in &user.emails {
            dir.by_email.insert(email.clone(), user.username.clone());
        }
        tracing::debug!(username = %user.username, role = user.role.as_str(), "user added");
        dir.users.insert(
            user.username.clone(),
            StoredUser {
                user,
                password_digest,
            },
        );
        Ok(())
    }

    /// Look up by username or email. The returned record carries no password.
    pub fn get_user(&self, id: &str) -> Result<User, Fault> {
        let dir = self
            .inner
            .read()
            .map_err(|_| Fault::Internal("user directory lock poisoned".into()))?;
        dir.find(id)
            .map(|s| s.user.clone())
            .ok_or_else(|| Fault::domain(format!("User with ID {id} not found")))
    }

    pub fn check_password(&self, credentials: &Credentials) -> bool {
        let Ok(dir) = self.inner.read() else {
            return false;
        };
        match dir.find(&credentials.id) {
            Some(StoredUser {
                user,
                password_digest: Some(d),
            }) => *d == digest_password(&user.username, &credentials.password),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|d| d.users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn op_add_user(&self, args: &[Value]) -> Result<Value, Fault> {
        check_arity("add_user", args, 1, 1)?;
        self.add_user(arg("add_user", args, 0)?)?;
        Ok(Value::Null)
    }

    fn op_get_user(&self, args: &[Value]) -> Result<Value, Fault> {
        check_arity("get_user", args, 1, 1)?;
        let id: String = arg("get_user", args, 0)?;
        to_value(self.get_user(&id)?)
    }

    fn op_check_password(&self, args: &[Value]) -> Result<Value, Fault> {
        check_arity("check_password", args, 1, 1)?;
        let credentials: Credentials = arg("check_password", args, 0)?;
        Ok(Value::Bool(self.check_password(&credentials)))
    }
}

impl OperationTable for UserDirectory {
    const SERVICE: &'static str = "UserDirectory";
    const OPERATIONS: &'static [(&'static str, Handler<Self>)] = &[
        ("add_user", Self::op_add_user),
        ("get_user", Self::op_get_user),
        ("check_password", Self::op_check_password),
    ];
}

// Salted with the username so equal passwords do not share a digest.
fn digest_password(username: &str, password: &str) -> String {
    let mut h = Sha256::new();
    h.update(username.as_bytes());
    h.update(b":");
    h.update(password.as_bytes());
    hex::encode(h.finalize())
}
