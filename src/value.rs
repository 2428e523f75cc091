//! Literal values inside query arguments
//!
//! Plain JSON covers strings, numbers, booleans, null and lists. Values JSON
//! cannot tell apart from strings (timestamps, big integers, decimals, bytes)
//! use the tagged form `{"$type": "DateTime", "value": "..."}`. A tagged
//! object is always a scalar literal, never a nested filter.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value as JsonValue;

pub const TYPE_KEY: &str = "$type";
pub const VALUE_KEY: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaggedScalar {
    DateTime,
    BigInt,
    Decimal,
    Bytes,
    Json,
}

impl TaggedScalar {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "DateTime" => Some(TaggedScalar::DateTime),
            "BigInt" => Some(TaggedScalar::BigInt),
            "Decimal" => Some(TaggedScalar::Decimal),
            "Bytes" => Some(TaggedScalar::Bytes),
            "Json" => Some(TaggedScalar::Json),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            TaggedScalar::DateTime => "DateTime",
            TaggedScalar::BigInt => "BigInt",
            TaggedScalar::Decimal => "Decimal",
            TaggedScalar::Bytes => "Bytes",
            TaggedScalar::Json => "Json",
        }
    }

    /// GraphQL scalar name used in variable declarations
    pub fn graphql_type(&self) -> &'static str {
        match self {
            TaggedScalar::Json => "JSON",
            other => other.tag(),
        }
    }
}

/// Build a tagged literal.
pub fn tagged(kind: TaggedScalar, value: impl Into<JsonValue>) -> JsonValue {
    let mut obj = serde_json::Map::new();
    obj.insert(TYPE_KEY.to_string(), JsonValue::String(kind.tag().to_string()));
    obj.insert(VALUE_KEY.to_string(), value.into());
    JsonValue::Object(obj)
}

/// Timestamp literal, rendered with millisecond precision and a `Z` suffix.
pub fn date_time(dt: DateTime<Utc>) -> JsonValue {
    tagged(
        TaggedScalar::DateTime,
        dt.to_rfc3339_opts(SecondsFormat::Millis, true),
    )
}

/// Split a tagged literal into its kind and inner value.
pub fn as_tagged(value: &JsonValue) -> Option<(TaggedScalar, &JsonValue)> {
    let obj = value.as_object()?;
    if obj.len() != 2 {
        return None;
    }
    let kind = obj.get(TYPE_KEY)?.as_str().and_then(TaggedScalar::from_tag)?;
    let inner = obj.get(VALUE_KEY)?;
    Some((kind, inner))
}

/// Whether a value under a field key is a literal rather than a filter object
pub fn is_scalar_literal(value: &JsonValue) -> bool {
    !value.is_object() || as_tagged(value).is_some()
}

/// The value sent in the variables map, with tags stripped.
pub fn variable_value(value: &JsonValue) -> JsonValue {
    if let Some((_, inner)) = as_tagged(value) {
        return inner.clone();
    }
    match value {
        JsonValue::Array(items) => JsonValue::Array(items.iter().map(variable_value).collect()),
        other => other.clone(),
    }
}

/// Infer the GraphQL type for a variable declaration.
pub fn graphql_type(value: &JsonValue) -> String {
    if let Some((kind, _)) = as_tagged(value) {
        return kind.graphql_type().to_string();
    }
    match value {
        JsonValue::String(_) => "String".to_string(),
        JsonValue::Bool(_) => "Boolean".to_string(),
        // GraphQL `Int` is 32-bit; wider integers travel as `Float`
        JsonValue::Number(n) if n.as_i64().is_some_and(|i| i32::try_from(i).is_ok()) => {
            "Int".to_string()
        }
        JsonValue::Number(_) => "Float".to_string(),
        JsonValue::Array(items) => {
            let inner = items
                .iter()
                .find(|v| !v.is_null())
                .map(graphql_type)
                .unwrap_or_else(|| "String".to_string());
            format!("[{inner}]")
        }
        JsonValue::Object(_) | JsonValue::Null => "JSON".to_string(),
    }
}
