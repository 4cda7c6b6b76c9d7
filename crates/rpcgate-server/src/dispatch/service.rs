//! Backing-service contract.
//!
//! A service declares a static table from operation name to handler. Handlers
//! take positional JSON arguments and return `Result<Value, Fault>`; they must
//! not panic. The blanket `Service` impl turns any table into something the
//! resolver can search and bind.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::Fault;

/// Handler signature for one operation of service `S`.
pub type Handler<S> = fn(&S, &[Value]) -> Result<Value, Fault>;

/// Static operation table of a backing service.
pub trait OperationTable: Send + Sync + Sized + 'static {
    /// Service name used in logs.
    const SERVICE: &'static str;
    /// Exposed operations. Names must be unique within one table.
    const OPERATIONS: &'static [(&'static str, Handler<Self>)];
}

/// Object-safe view the resolver works with.
pub trait Service: Send + Sync {
    fn name(&self) -> &'static str;
    fn operation_names(&self) -> Vec<&'static str>;
    fn bind(&self, op: &str) -> Option<BoundOperation<'_>>;
}

impl<T: OperationTable> Service for T {
    fn name(&self) -> &'static str {
        T::SERVICE
    }

    fn operation_names(&self) -> Vec<&'static str> {
        T::OPERATIONS.iter().map(|(name, _)| *name).collect()
    }

    fn bind(&self, op: &str) -> Option<BoundOperation<'_>> {
        T::OPERATIONS
            .iter()
            .find(|(name, _)| *name == op)
            .map(|&(name, handler)| BoundOperation {
                service: T::SERVICE,
                name,
                target: Box::new(move |args: &[Value]| handler(self, args)),
            })
    }
}

/// A resolved operation on a specific service instance.
pub struct BoundOperation<'a> {
    service: &'static str,
    name: &'static str,
    target: Box<dyn Fn(&[Value]) -> Result<Value, Fault> + Send + Sync + 'a>,
}

impl BoundOperation<'_> {
    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value, Fault> {
        (self.target)(args)
    }
}

impl std::fmt::Debug for BoundOperation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundOperation")
            .field("service", &self.service)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// --------------------
// Argument helpers for handlers
// --------------------

/// Require `min..=max` positional arguments.
pub fn check_arity(op: &'static str, args: &[Value], min: usize, max: usize) -> Result<(), Fault> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else {
        format!("{min} to {max}")
    };
    Err(Fault::Arity { op, expected, got: args.len() })
}

/// Deserialize the argument at `index`.
pub fn arg<T: DeserializeOwned>(op: &'static str, args: &[Value], index: usize) -> Result<T, Fault> {
    let raw = args.get(index).ok_or_else(|| Fault::BadArgument {
        op,
        index,
        reason: "missing".into(),
    })?;
    T::deserialize(raw).map_err(|e| Fault::BadArgument {
        op,
        index,
        reason: e.to_string(),
    })
}

/// Deserialize the argument at `index` if present and not null.
pub fn opt_arg<T: DeserializeOwned>(
    op: &'static str,
    args: &[Value],
    index: usize,
) -> Result<Option<T>, Fault> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => arg(op, args, index).map(Some),
    }
}

/// Serialize a handler's return value.
pub fn to_value<T: Serialize>(value: T) -> Result<Value, Fault> {
    serde_json::to_value(value).map_err(|e| Fault::Internal(format!("serialize result: {e}")))
}
