//! Live query consumer
//!
//! Compiles a capture function as a live query, checks that the text parses
//! as a GraphQL document and remembers the root field so the matching value
//! can be pulled out of a response. Any failure while building is reported
//! as `Failed to build GraphQL query: ...` so callers can attribute it.

use async_graphql::parser::parse_query;
use async_graphql::parser::types::{
    DocumentOperations, ExecutableDocument, OperationDefinition, Selection,
};
use serde_json::{Value as JsonValue, json};

use crate::builder::{BuildOptions, QueryBuilder};
use crate::capture::Db;
use crate::emitter::Variables;
use crate::error::{Error, LiveQueryError};
use crate::inflector::operation_name;

/// Directive marking a query as live
pub const LIVE_DIRECTIVE: &str = "live";

/// A compiled and parsed live query.
#[derive(Debug, Clone)]
pub struct LiveQuery {
    query: String,
    variables: Variables,
    document: ExecutableDocument,
    operation_name: String,
    root_field: String,
}

impl LiveQuery {
    /// Compile `query_fn` with a default builder.
    pub fn from_fn<F, R>(query_fn: F) -> Result<Self, LiveQueryError>
    where
        F: FnOnce(&Db) -> R,
    {
        Self::with_builder(&QueryBuilder::default(), query_fn)
    }

    /// Compile `query_fn` with `builder`, always as a live query.
    pub fn with_builder<F, R>(builder: &QueryBuilder, query_fn: F) -> Result<Self, LiveQueryError>
    where
        F: FnOnce(&Db) -> R,
    {
        let call = Db::capture(query_fn).map_err(Error::from)?;
        let compiled = builder.build_call(&call, BuildOptions::live(true))?;

        let document = parse_query(&compiled.query)
            .map_err(|e| LiveQueryError::Document(e.to_string()))?;
        let operation = single_operation(&document)
            .ok_or_else(|| LiveQueryError::Document("expected exactly one operation".to_string()))?;
        let root_field = root_field(operation)
            .ok_or_else(|| LiveQueryError::Document("operation has no root field".to_string()))?;

        Ok(Self {
            query: compiled.query,
            variables: compiled.variables,
            operation_name: operation_name(call.operation, &call.model),
            root_field,
            document,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn document(&self) -> &ExecutableDocument {
        &self.document
    }

    pub fn operation_name(&self) -> &str {
        &self.operation_name
    }

    pub fn root_field(&self) -> &str {
        &self.root_field
    }

    /// Whether the parsed operation carries `@live`
    pub fn is_live(&self) -> bool {
        single_operation(&self.document).is_some_and(|op| {
            op.directives
                .iter()
                .any(|d| d.node.name.node.as_str() == LIVE_DIRECTIVE)
        })
    }

    /// Standard GraphQL-over-HTTP request body.
    pub fn request_body(&self) -> JsonValue {
        json!({
            "query": self.query,
            "operationName": self.operation_name,
            "variables": self.variables,
        })
    }

    /// Value of the root field in a response `data` object.
    pub fn extract<'a>(&self, data: &'a JsonValue) -> Option<&'a JsonValue> {
        data.get(&self.root_field)
    }
}

fn single_operation(document: &ExecutableDocument) -> Option<&OperationDefinition> {
    match &document.operations {
        DocumentOperations::Single(op) => Some(&op.node),
        DocumentOperations::Multiple(ops) if ops.len() == 1 => {
            ops.values().next().map(|op| &op.node)
        }
        DocumentOperations::Multiple(_) => None,
    }
}

fn root_field(operation: &OperationDefinition) -> Option<String> {
    operation
        .selection_set
        .node
        .items
        .iter()
        .find_map(|selection| match &selection.node {
            Selection::Field(field) => Some(field.node.name.node.as_str().to_string()),
            _ => None,
        })
}
