//! Query parser
//!
//! Turns a `(model, operation, args)` triple into a [`Query`] tree. The args
//! object mirrors what a Prisma-style client accepts:
//!
//! ```rust,ignore
//! let ast = parse_query("user", QueryOperation::FindMany, Some(&json!({
//!     "where": {
//!         "email": { "endsWith": "@example.com" },
//!         "posts": { "some": { "published": true } },
//!     },
//!     "select": { "id": true, "email": true },
//!     "orderBy": [{ "createdAt": "desc" }],
//!     "take": 10,
//! })))?;
//! ```
//!
//! Unknown keys under a field filter are read as a nested relation filter
//! rather than rejected, so arbitrary relation shapes (`some`, `every`, `is`,
//! deeper models) pass through without a schema. Only names, sort
//! directions, logical operator values and the overall shape of each
//! argument are validated. Every key that ends up in the document text must
//! be a GraphQL name.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use tracing::trace;

use crate::ast::{
    ComparisonOperator, FieldCondition, FieldSelection, Include, LogicalCondition, LogicalOperator,
    OrderBy, OrderByField, Query, QueryArgs, QueryOperation, RelationCondition, RelationInclusion,
    Select, SortDirection, Where, WhereCondition,
};
use crate::error::QueryParseError;
use crate::value::is_scalar_literal;

type ParseResult<T> = Result<T, QueryParseError>;

/// Keys that mark a nested select/include value as a full argument object
const ARGUMENT_KEYS: &[&str] = &["where", "select", "include", "orderBy", "take", "skip"];

/// GraphQL `Name` production
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[_A-Za-z][_0-9A-Za-z]*$").unwrap());

/// Largest value a GraphQL `Int` can carry
const MAX_COUNT: u64 = i32::MAX as u64;

/// Parse a query call into its AST.
pub fn parse_query(
    model: &str,
    operation: QueryOperation,
    args: Option<&JsonValue>,
) -> ParseResult<Query> {
    if !NAME_PATTERN.is_match(model) {
        return Err(QueryParseError::invalid_model_name(model));
    }

    let args = match args {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Object(obj)) => Some(parse_args(obj)?),
        Some(_) => return Err(QueryParseError::invalid_argument("args", "an object")),
    };

    Ok(Query {
        model: model.to_string(),
        operation,
        args,
        is_live: false,
    })
}

fn check_name(name: &str) -> ParseResult<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(QueryParseError::invalid_field_name(name))
    }
}

fn parse_args(obj: &Map<String, JsonValue>) -> ParseResult<QueryArgs> {
    let mut args = QueryArgs::default();

    for (key, value) in obj {
        if value.is_null() {
            continue;
        }
        match key.as_str() {
            "where" => args.where_ = Some(parse_where(value)?),
            "select" => args.select = Some(parse_select(value)?),
            "include" => args.include = Some(parse_include(value)?),
            "orderBy" => args.order_by = Some(parse_order_by(value)?),
            "take" => args.take = Some(parse_count("take", value)?),
            "skip" => args.skip = Some(parse_count("skip", value)?),
            other => trace!(argument = other, "Ignoring unsupported query argument"),
        }
    }

    Ok(args)
}

fn parse_where(value: &JsonValue) -> ParseResult<Where> {
    match value {
        JsonValue::Object(obj) => parse_where_object(obj),
        _ => Err(QueryParseError::invalid_argument("where", "an object")),
    }
}

fn parse_where_object(obj: &Map<String, JsonValue>) -> ParseResult<Where> {
    let mut conditions = Vec::new();

    for (key, value) in obj {
        match LogicalOperator::from_key(key) {
            Some(operator) => conditions.push(parse_logical(operator, value)?),
            None => parse_field_filter(key, value, &mut conditions)?,
        }
    }

    Ok(Where { conditions })
}

fn parse_logical(operator: LogicalOperator, value: &JsonValue) -> ParseResult<WhereCondition> {
    let conditions = match (operator, value) {
        (_, JsonValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                JsonValue::Object(obj) => parse_where_object(obj),
                _ => Err(QueryParseError::malformed_logical(
                    operator.as_str(),
                    "every element to be a filter object",
                )),
            })
            .collect::<ParseResult<Vec<_>>>()?,
        (LogicalOperator::Not, JsonValue::Object(obj)) => vec![parse_where_object(obj)?],
        (LogicalOperator::Not, _) => {
            return Err(QueryParseError::malformed_logical(
                "NOT",
                "a filter object or an array of filter objects",
            ));
        }
        (_, _) => {
            return Err(QueryParseError::malformed_logical(
                operator.as_str(),
                "an array of filter objects",
            ));
        }
    };

    Ok(WhereCondition::Logical(LogicalCondition {
        operator,
        conditions,
    }))
}

fn parse_field_filter(
    field: &str,
    value: &JsonValue,
    conditions: &mut Vec<WhereCondition>,
) -> ParseResult<()> {
    check_name(field)?;

    // `field: null` filters rows where the field is null
    if value.is_null() {
        conditions.push(field_condition(field, ComparisonOperator::IsNull, JsonValue::Bool(true)));
        return Ok(());
    }

    let obj = match value {
        JsonValue::Object(obj) if !is_scalar_literal(value) => obj,
        _ => {
            conditions.push(field_condition(field, ComparisonOperator::Equals, value.clone()));
            return Ok(());
        }
    };

    let mut nested = Map::new();
    for (key, operand) in obj {
        match ComparisonOperator::from_key(key) {
            Some(operator) => conditions.push(field_condition(field, operator, operand.clone())),
            None => {
                nested.insert(key.clone(), operand.clone());
            }
        }
    }

    if !nested.is_empty() || obj.is_empty() {
        conditions.push(WhereCondition::Relation(RelationCondition {
            relation: field.to_string(),
            condition: parse_where_object(&nested)?,
        }));
    }

    Ok(())
}

fn field_condition(field: &str, operator: ComparisonOperator, value: JsonValue) -> WhereCondition {
    WhereCondition::Field(FieldCondition {
        field: field.to_string(),
        operator,
        value,
    })
}

fn parse_select(value: &JsonValue) -> ParseResult<Select> {
    let JsonValue::Object(obj) = value else {
        return Err(QueryParseError::invalid_argument("select", "an object"));
    };

    let mut fields = Vec::with_capacity(obj.len());
    for (field, entry) in obj {
        check_name(field)?;
        let (selected, args) = parse_selection_entry("select", field, entry)?;
        fields.push(FieldSelection {
            field: field.clone(),
            selected,
            args,
        });
    }

    Ok(Select { fields })
}

fn parse_include(value: &JsonValue) -> ParseResult<Include> {
    let JsonValue::Object(obj) = value else {
        return Err(QueryParseError::invalid_argument("include", "an object"));
    };

    let mut relations = Vec::with_capacity(obj.len());
    for (relation, entry) in obj {
        check_name(relation)?;
        let (included, args) = parse_selection_entry("include", relation, entry)?;
        relations.push(RelationInclusion {
            relation: relation.clone(),
            included,
            args,
        });
    }

    Ok(Include { relations })
}

/// A select/include entry is either a flag or a nested relation.
fn parse_selection_entry(
    argument: &str,
    field: &str,
    entry: &JsonValue,
) -> ParseResult<(bool, Option<QueryArgs>)> {
    match entry {
        JsonValue::Bool(flag) => Ok((*flag, None)),
        JsonValue::Object(obj) if obj.keys().any(|k| ARGUMENT_KEYS.contains(&k.as_str())) => {
            Ok((true, Some(parse_args(obj)?)))
        }
        // Shorthand: `posts: { title: true }` selects fields of the relation
        JsonValue::Object(_) => Ok((
            true,
            Some(QueryArgs {
                select: Some(parse_select(entry)?),
                ..Default::default()
            }),
        )),
        _ => Err(QueryParseError::invalid_argument(
            &format!("{argument}.{field}"),
            "a boolean or a nested selection object",
        )),
    }
}

fn parse_order_by(value: &JsonValue) -> ParseResult<OrderBy> {
    let mut fields = Vec::new();

    match value {
        JsonValue::Object(obj) => push_order_entries(obj, &mut fields)?,
        JsonValue::Array(items) => {
            for item in items {
                let JsonValue::Object(obj) = item else {
                    return Err(QueryParseError::invalid_argument(
                        "orderBy",
                        "an object or an array of objects",
                    ));
                };
                push_order_entries(obj, &mut fields)?;
            }
        }
        _ => {
            return Err(QueryParseError::invalid_argument(
                "orderBy",
                "an object or an array of objects",
            ));
        }
    }

    Ok(OrderBy { fields })
}

fn push_order_entries(
    obj: &Map<String, JsonValue>,
    fields: &mut Vec<OrderByField>,
) -> ParseResult<()> {
    for (field, direction) in obj {
        check_name(field)?;
        let direction = direction
            .as_str()
            .and_then(SortDirection::from_str_exact)
            .ok_or_else(|| QueryParseError::invalid_sort_direction(field, direction))?;
        fields.push(OrderByField {
            field: field.clone(),
            direction,
        });
    }
    Ok(())
}

fn parse_count(argument: &str, value: &JsonValue) -> ParseResult<u64> {
    value
        .as_u64()
        .filter(|n| *n <= MAX_COUNT)
        .ok_or_else(|| {
            QueryParseError::invalid_argument(argument, "a non-negative 32-bit integer")
        })
}
