//! Shared application state for the rpcgate server.
//!
//! Built once from config: seeds the user directory, compiles the
//! authorization policy, and fixes the service resolution order. Transports
//! clone `AppState` freely; everything inside is behind `Arc`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;

use rpcgate_core::error::{Result, RpcError};
use rpcgate_core::protocol::codec;
use rpcgate_core::{RequestEnvelope, ResponseEnvelope};

use crate::config::ServerConfig;
use crate::dispatch::{Dispatcher, Resolver, Service};
use crate::obs::ServerMetrics;
use crate::policy::{rules::compile_policy, AuthorizationGate};
use crate::services::{AuthService, UserDirectory};

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<ServerMetrics>,
}

struct AppStateInner {
    cfg: ServerConfig,
    users: Arc<UserDirectory>,
    auth: Arc<AuthService>,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can report a bad config instead of panicking.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        // 1) Backing services
        let users = Arc::new(UserDirectory::new());
        for u in &cfg.users {
            users.add_user(u.clone()).map_err(|e| {
                RpcError::BadRequest(format!("seeding user {} failed: {e}", u.username))
            })?;
        }
        let auth = Arc::new(AuthService::new(
            Arc::clone(&users),
            Duration::from_secs(cfg.auth.token_ttl_secs),
        ));

        // 2) Authorization gate, token checks delegated to the auth service
        let policy = compile_policy(&cfg.policy.protected)?;
        let gate = AuthorizationGate::new(policy, auth.clone());

        // 3) Resolution order: user directory, then authentication
        let services: Vec<Arc<dyn Service>> = vec![
            users.clone() as Arc<dyn Service>,
            auth.clone() as Arc<dyn Service>,
        ];
        let resolver = Resolver::new(services);

        // policy <-> resolver sanity check
        for (op, owner) in resolver.shadowed() {
            tracing::warn!(op, owner, "operation exposed by several services; first in order wins");
        }
        for op in gate.policy().protected_names() {
            if resolver.resolve(op).is_err() {
                tracing::warn!(op, "protected operation is not exposed by any service");
            }
        }

        tracing::info!(
            services = ?resolver.service_names(),
            protected = ?gate.policy().protected_names(),
            users = users.len(),
            "dispatcher ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, users, auth }),
            dispatcher: Arc::new(Dispatcher::new(gate, resolver)),
            metrics: Arc::new(ServerMetrics::default()),
        })
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn users(&self) -> Arc<UserDirectory> {
        Arc::clone(&self.inner.users)
    }

    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.inner.auth)
    }

    pub fn metrics(&self) -> Arc<ServerMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn is_draining(&self) -> bool {
        self.metrics.is_draining()
    }

    /// Point-in-time gauges that live outside the metrics registry.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("rpcgate_users", self.inner.users.len() as u64),
            ("rpcgate_active_tokens", self.inner.auth.active_tokens() as u64),
        ]
    }

    /// Dispatch one decoded request, recording outcome and latency.
    pub fn handle(&self, req: &RequestEnvelope) -> ResponseEnvelope {
        let started = Instant::now();
        let (outcome, resp) = self.dispatcher.respond(req);
        // labelled by outcome, not op: op names come from the caller
        self.metrics
            .dispatch_duration
            .observe(&[("outcome", outcome)], started.elapsed());
        self.metrics.requests.inc(&[("outcome", outcome)]);
        resp
    }

    /// Transport entry: raw frame in, encoded response out. Undecodable
    /// frames still get a response.
    pub fn handle_frame(&self, frame: &[u8], transport: &str) -> Result<Bytes> {
        let resp = match codec::decode_request(frame, self.cfg().server.max_frame_bytes) {
            Ok(req) => self.handle(&req),
            Err(e) => self.reject(&e, transport),
        };
        codec::encode_response(&resp)
    }

    /// Response for a frame that never became a request.
    pub fn reject(&self, err: &RpcError, transport: &str) -> ResponseEnvelope {
        tracing::warn!(transport, code = err.client_code().as_str(), error = %err, "undecodable request");
        self.metrics.decode_errors.inc(&[("transport", transport)]);
        self.metrics.requests.inc(&[("outcome", "bad_request")]);
        let detail = match err {
            RpcError::BadRequest(d) => d.clone(),
            other => other.to_string(),
        };
        ResponseEnvelope::failure(format!("Bad request: {detail}"))
    }
}
