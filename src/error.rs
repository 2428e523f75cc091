//! Error types for query compilation
//!
//! Parse failures and capture failures are kept apart so callers can tell
//! bad query input from a misused capture function.

use thiserror::Error;

/// Structurally invalid query input rejected by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Query parse error: {message}")]
pub struct QueryParseError {
    pub message: String,
}

impl QueryParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn invalid_sort_direction(field: &str, direction: &serde_json::Value) -> Self {
        Self::new(format!(
            "Invalid sort direction {direction} for field '{field}', expected \"asc\" or \"desc\""
        ))
    }

    pub fn malformed_logical(operator: &str, expected: &str) -> Self {
        Self::new(format!("Logical operator '{operator}' expects {expected}"))
    }

    pub fn invalid_field_name(name: &str) -> Self {
        Self::new(format!("Invalid field name '{name}', expected a GraphQL name"))
    }

    pub fn invalid_model_name(name: &str) -> Self {
        Self::new(format!("Invalid model name '{name}', expected a GraphQL name"))
    }

    pub fn invalid_argument(argument: &str, expected: &str) -> Self {
        Self::new(format!("Argument '{argument}' expects {expected}"))
    }
}

/// The capture function did not invoke exactly one recognized operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Query function did not call any model operation")]
    NoOperation,

    #[error("Query function called {0} model operations, expected exactly one")]
    MultipleOperations(usize),

    #[error("Unknown operation '{operation}' on model '{model}'")]
    UnknownOperation { model: String, operation: String },
}

/// Any failure of a single compile call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] QueryParseError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by [`crate::live::LiveQuery`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiveQueryError {
    #[error("Failed to build GraphQL query: {0}")]
    Build(String),

    #[error("Generated query is not a valid GraphQL document: {0}")]
    Document(String),
}

impl From<Error> for LiveQueryError {
    fn from(e: Error) -> Self {
        Self::Build(e.to_string())
    }
}
