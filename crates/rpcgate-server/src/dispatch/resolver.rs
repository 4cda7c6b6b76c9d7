use std::sync::Arc;

use super::error::ResolutionError;
use super::service::{BoundOperation, Service};

/// Ordered list of backing services. The first service exposing a name wins.
///
/// The order is fixed at construction; there is no runtime registration.
pub struct Resolver {
    services: Vec<Arc<dyn Service>>,
}

impl Resolver {
    pub fn new(services: Vec<Arc<dyn Service>>) -> Self {
        Self { services }
    }

    pub fn resolve(&self, name: &str) -> Result<BoundOperation<'_>, ResolutionError> {
        self.services
            .iter()
            .find_map(|svc| svc.bind(name))
            .ok_or_else(|| ResolutionError::MethodNotFound { name: name.to_string() })
    }

    /// Service names in search order.
    pub fn service_names(&self) -> Vec<&'static str> {
        self.services.iter().map(|s| s.name()).collect()
    }

    /// Operation names exposed by more than one service, with the service that
    /// shadows the others.
    pub fn shadowed(&self) -> Vec<(&'static str, &'static str)> {
        let mut seen: Vec<(&'static str, &'static str)> = Vec::new();
        let mut out = Vec::new();
        for svc in &self.services {
            for op in svc.operation_names() {
                match seen.iter().find(|(name, _)| *name == op) {
                    Some(&(_, owner)) => out.push((op, owner)),
                    None => seen.push((op, svc.name())),
                }
            }
        }
        out
    }
}
