//! Capture-mode client
//!
//! A [`Db`] stands in for a real data client. Calling an operation on one of
//! its models records `(model, operation, args)` and returns the [`Captured`]
//! sentinel instead of running anything, so a query can be written with the
//! usual call syntax:
//!
//! ```rust,ignore
//! let call = Db::capture(|db| {
//!     db.model("user").find_many(json!({ "where": { "active": true } }))
//! })?;
//! assert_eq!(call.operation, QueryOperation::FindMany);
//! ```

use std::cell::RefCell;

use serde_json::Value as JsonValue;

use crate::ast::QueryOperation;
use crate::error::CaptureError;

/// Placeholder returned by every captured operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Captured;

/// Arguments passed to a captured operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(pub Option<JsonValue>);

impl From<()> for Args {
    fn from(_: ()) -> Self {
        Args(None)
    }
}

impl From<JsonValue> for Args {
    fn from(value: JsonValue) -> Self {
        Args(Some(value))
    }
}

impl From<Option<JsonValue>> for Args {
    fn from(value: Option<JsonValue>) -> Self {
        Args(value)
    }
}

/// A single recorded model operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedCall {
    pub model: String,
    pub operation: QueryOperation,
    pub args: Option<JsonValue>,
}

#[derive(Debug)]
enum Recorded {
    Call(CapturedCall),
    Unknown { model: String, operation: String },
}

/// Proxy client that records calls instead of executing them.
#[derive(Debug, Default)]
pub struct Db {
    calls: RefCell<Vec<Recorded>>,
}

impl Db {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `query_fn` against a fresh client and return the one call it made.
    pub fn capture<F, R>(query_fn: F) -> Result<CapturedCall, CaptureError>
    where
        F: FnOnce(&Db) -> R,
    {
        let db = Db::new();
        let _ = query_fn(&db);
        db.into_call()
    }

    /// Access a model by name.
    pub fn model(&self, name: impl Into<String>) -> ModelDelegate<'_> {
        ModelDelegate {
            db: self,
            model: name.into(),
        }
    }

    /// Number of operations recorded so far
    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    fn record(&self, recorded: Recorded) -> Captured {
        self.calls.borrow_mut().push(recorded);
        Captured
    }

    /// Consume the client, requiring exactly one recognized call.
    pub fn into_call(self) -> Result<CapturedCall, CaptureError> {
        let mut calls = self.calls.into_inner();
        match calls.len() {
            0 => Err(CaptureError::NoOperation),
            1 => match calls.remove(0) {
                Recorded::Call(call) => Ok(call),
                Recorded::Unknown { model, operation } => {
                    Err(CaptureError::UnknownOperation { model, operation })
                }
            },
            n => Err(CaptureError::MultipleOperations(n)),
        }
    }
}

/// Operations available on one model of a [`Db`].
#[derive(Debug, Clone)]
pub struct ModelDelegate<'db> {
    db: &'db Db,
    model: String,
}

impl ModelDelegate<'_> {
    pub fn find_many(&self, args: impl Into<Args>) -> Captured {
        self.call(QueryOperation::FindMany, args)
    }

    pub fn find_unique(&self, args: impl Into<Args>) -> Captured {
        self.call(QueryOperation::FindUnique, args)
    }

    pub fn find_first(&self, args: impl Into<Args>) -> Captured {
        self.call(QueryOperation::FindFirst, args)
    }

    pub fn find_unique_or_throw(&self, args: impl Into<Args>) -> Captured {
        self.call(QueryOperation::FindUniqueOrThrow, args)
    }

    pub fn find_first_or_throw(&self, args: impl Into<Args>) -> Captured {
        self.call(QueryOperation::FindFirstOrThrow, args)
    }

    /// Call an operation by its camelCase name, resolved at run time.
    ///
    /// Names outside the supported read operations are recorded and
    /// reported when the capture is consumed.
    pub fn operation(&self, name: &str, args: impl Into<Args>) -> Captured {
        match name.parse::<QueryOperation>() {
            Ok(operation) => self.call(operation, args),
            Err(_) => self.db.record(Recorded::Unknown {
                model: self.model.clone(),
                operation: name.to_string(),
            }),
        }
    }

    pub fn call(&self, operation: QueryOperation, args: impl Into<Args>) -> Captured {
        self.db.record(Recorded::Call(CapturedCall {
            model: self.model.clone(),
            operation,
            args: args.into().0,
        }))
    }
}
