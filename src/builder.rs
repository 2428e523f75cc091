//! Query builder
//!
//! Entry point that ties the parser and emitter together, either from an
//! explicit `(model, operation, args)` triple or from a capture function
//! written against a [`Db`].
//!
//! ```rust,ignore
//! let builder = QueryBuilder::new(BuilderOptions { force_live_queries: true });
//!
//! let compiled = builder.build_from_function(
//!     |db| db.model("post").find_many(json!({ "where": { "published": true } })),
//!     BuildOptions::default(),
//! )?;
//! // compiled.query    => "query findManyPost($var0: Boolean) @live { ... }"
//! // compiled.variables => { "var0": true }
//! ```

use serde_json::Value as JsonValue;
use tracing::{debug, trace, warn};

use crate::ast::QueryOperation;
use crate::capture::{CapturedCall, Db};
use crate::emitter::{CompiledQuery, emit};
use crate::error::Result;
use crate::parser::parse_query;

/// Construction-time builder settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuilderOptions {
    /// Default every query to live unless the call says otherwise
    pub force_live_queries: bool,
}

/// Per-call settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildOptions {
    /// `None` defers to the builder's `force_live_queries`
    pub is_live: Option<bool>,
}

impl BuildOptions {
    pub fn live(is_live: bool) -> Self {
        Self {
            is_live: Some(is_live),
        }
    }
}

/// Compiles queries into GraphQL documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    options: BuilderOptions,
}

impl QueryBuilder {
    pub fn new(options: BuilderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> BuilderOptions {
        self.options
    }

    /// The call-site flag always beats the instance default.
    fn resolve_live(&self, options: BuildOptions) -> bool {
        options.is_live.unwrap_or(self.options.force_live_queries)
    }

    /// Compile an explicit model operation.
    pub fn build(
        &self,
        model: &str,
        operation: QueryOperation,
        args: Option<&JsonValue>,
        options: BuildOptions,
    ) -> Result<CompiledQuery> {
        let is_live = self.resolve_live(options);
        let ast = parse_query(model, operation, args)?.with_live(is_live);
        let compiled = emit(&ast);

        debug!(
            model = model,
            operation = %operation,
            variables = compiled.variables.len(),
            is_live = is_live,
            "Compiled GraphQL query"
        );
        trace!(query = %compiled.query, "Generated query text");

        Ok(compiled)
    }

    /// Compile the single operation `query_fn` invokes on the capture client.
    pub fn build_from_function<F, R>(
        &self,
        query_fn: F,
        options: BuildOptions,
    ) -> Result<CompiledQuery>
    where
        F: FnOnce(&Db) -> R,
    {
        let call = Db::capture(query_fn).inspect_err(|e| {
            warn!(error = %e, "Query function violated the capture contract");
        })?;
        self.build_call(&call, options)
    }

    /// Compile a call recorded earlier by a [`Db`].
    pub fn build_call(&self, call: &CapturedCall, options: BuildOptions) -> Result<CompiledQuery> {
        self.build(&call.model, call.operation, call.args.as_ref(), options)
    }
}

/// Compile with a default builder.
pub fn build_query(
    model: &str,
    operation: QueryOperation,
    args: Option<&JsonValue>,
    options: BuildOptions,
) -> Result<CompiledQuery> {
    QueryBuilder::default().build(model, operation, args, options)
}

/// Compile a capture function with a default builder.
pub fn build_query_from_function<F, R>(query_fn: F, options: BuildOptions) -> Result<CompiledQuery>
where
    F: FnOnce(&Db) -> R,
{
    QueryBuilder::default().build_from_function(query_fn, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CaptureError, Error};
    use serde_json::json;

    #[test]
    fn test_live_toggle() {
        let build = |options| build_query("user", QueryOperation::FindMany, None, options).unwrap();

        let live = build(BuildOptions::live(true));
        assert!(live.query.contains("@live"));

        let off = build(BuildOptions::live(false));
        assert!(!off.query.contains("@live"));

        let omitted = build(BuildOptions::default());
        assert!(!omitted.query.contains("@live"));
    }

    #[test]
    fn test_force_live_queries_precedence() {
        let builder = QueryBuilder::new(BuilderOptions {
            force_live_queries: true,
        });

        let defaulted = builder
            .build("user", QueryOperation::FindMany, None, BuildOptions::default())
            .unwrap();
        assert!(defaulted.query.contains("@live"));

        let overridden = builder
            .build("user", QueryOperation::FindMany, None, BuildOptions::live(false))
            .unwrap();
        assert!(!overridden.query.contains("@live"));
    }

    #[test]
    fn test_direct_and_capture_forms_agree() {
        let args = json!({ "where": { "email": { "contains": "@" } }, "select": { "id": true } });

        let direct =
            build_query("user", QueryOperation::FindFirst, Some(&args), BuildOptions::default())
                .unwrap();
        let captured = build_query_from_function(
            |db| db.model("user").find_first(args.clone()),
            BuildOptions::default(),
        )
        .unwrap();

        assert_eq!(direct, captured);
    }

    #[test]
    fn test_capture_without_call_fails() {
        let err = build_query_from_function(|_db| (), BuildOptions::default()).unwrap_err();
        assert_eq!(err, Error::Capture(CaptureError::NoOperation));
    }

    #[test]
    fn test_parse_errors_propagate() {
        let err = build_query(
            "user",
            QueryOperation::FindMany,
            Some(&json!({ "orderBy": { "name": "sideways" } })),
            BuildOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }
}
