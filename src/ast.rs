//! Intermediate representation of a parsed query
//!
//! Every node serializes with a `type` discriminator so a dumped tree reads
//! the same way regardless of where it came from. Nodes are plain data: the
//! parser builds them, the emitter reads them, nothing mutates them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::error::QueryParseError;

/// Read operations a query can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum QueryOperation {
    FindMany,
    FindUnique,
    FindFirst,
    FindUniqueOrThrow,
    FindFirstOrThrow,
}

impl QueryOperation {
    pub const ALL: [QueryOperation; 5] = [
        QueryOperation::FindMany,
        QueryOperation::FindUnique,
        QueryOperation::FindFirst,
        QueryOperation::FindUniqueOrThrow,
        QueryOperation::FindFirstOrThrow,
    ];

    /// The camelCase verb used in client call syntax and operation names
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperation::FindMany => "findMany",
            QueryOperation::FindUnique => "findUnique",
            QueryOperation::FindFirst => "findFirst",
            QueryOperation::FindUniqueOrThrow => "findUniqueOrThrow",
            QueryOperation::FindFirstOrThrow => "findFirstOrThrow",
        }
    }

    /// Whether the operation returns a list of rows
    pub fn returns_many(&self) -> bool {
        matches!(self, QueryOperation::FindMany)
    }
}

impl fmt::Display for QueryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryOperation {
    type Err = QueryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryParseError::new(format!("Unknown query operation '{s}'")))
    }
}

/// Root of a compiled query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Query", rename_all = "camelCase")]
pub struct Query {
    pub model: String,
    pub operation: QueryOperation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<QueryArgs>,
    pub is_live: bool,
}

impl Query {
    /// Same query with the live flag set.
    pub fn with_live(self, is_live: bool) -> Self {
        Self { is_live, ..self }
    }
}

/// Arguments accepted by every read operation and by nested relations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "QueryArgs", rename_all = "camelCase")]
pub struct QueryArgs {
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_: Option<Where>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Include>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip: Option<u64>,
}

impl QueryArgs {
    /// Whether the root field would carry any GraphQL arguments
    pub fn has_field_arguments(&self) -> bool {
        self.where_.as_ref().is_some_and(|w| !w.conditions.is_empty())
            || self.order_by.as_ref().is_some_and(|o| !o.fields.is_empty())
            || self.take.is_some()
            || self.skip.is_some()
    }
}

/// Implicit AND of its conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Where")]
pub struct Where {
    pub conditions: Vec<WhereCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum WhereCondition {
    #[serde(rename = "FieldCondition")]
    Field(FieldCondition),
    #[serde(rename = "LogicalCondition")]
    Logical(LogicalCondition),
    #[serde(rename = "RelationCondition")]
    Relation(RelationCondition),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldCondition {
    pub field: String,
    pub operator: ComparisonOperator,
    pub value: JsonValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicalCondition {
    pub operator: LogicalOperator,
    pub conditions: Vec<Where>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationCondition {
    pub relation: String,
    pub condition: Where,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LogicalOperator {
    #[serde(rename = "AND")]
    And,
    #[serde(rename = "OR")]
    Or,
    #[serde(rename = "NOT")]
    Not,
}

impl LogicalOperator {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "AND" => Some(LogicalOperator::And),
            "OR" => Some(LogicalOperator::Or),
            "NOT" => Some(LogicalOperator::Not),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOperator::And => "AND",
            LogicalOperator::Or => "OR",
            LogicalOperator::Not => "NOT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonOperator {
    Equals,
    Not,
    In,
    NotIn,
    Lt,
    Lte,
    Gt,
    Gte,
    Contains,
    StartsWith,
    EndsWith,
    IsNull,
    IsNotNull,
}

impl ComparisonOperator {
    pub const ALL: [ComparisonOperator; 13] = [
        ComparisonOperator::Equals,
        ComparisonOperator::Not,
        ComparisonOperator::In,
        ComparisonOperator::NotIn,
        ComparisonOperator::Lt,
        ComparisonOperator::Lte,
        ComparisonOperator::Gt,
        ComparisonOperator::Gte,
        ComparisonOperator::Contains,
        ComparisonOperator::StartsWith,
        ComparisonOperator::EndsWith,
        ComparisonOperator::IsNull,
        ComparisonOperator::IsNotNull,
    ];

    /// Resolve an operator from its key in a field filter object
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == key)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::Equals => "equals",
            ComparisonOperator::Not => "not",
            ComparisonOperator::In => "in",
            ComparisonOperator::NotIn => "notIn",
            ComparisonOperator::Lt => "lt",
            ComparisonOperator::Lte => "lte",
            ComparisonOperator::Gt => "gt",
            ComparisonOperator::Gte => "gte",
            ComparisonOperator::Contains => "contains",
            ComparisonOperator::StartsWith => "startsWith",
            ComparisonOperator::EndsWith => "endsWith",
            ComparisonOperator::IsNull => "isNull",
            ComparisonOperator::IsNotNull => "isNotNull",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Select")]
pub struct Select {
    pub fields: Vec<FieldSelection>,
}

impl Select {
    pub fn get(&self, field: &str) -> Option<&FieldSelection> {
        self.fields.iter().find(|f| f.field == field)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FieldSelection")]
pub struct FieldSelection {
    pub field: String,
    pub selected: bool,
    /// Present when the field is a relation with its own arguments or selection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<QueryArgs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Include")]
pub struct Include {
    pub relations: Vec<RelationInclusion>,
}

impl Include {
    pub fn get(&self, relation: &str) -> Option<&RelationInclusion> {
        self.relations.iter().find(|r| r.relation == relation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "RelationInclusion")]
pub struct RelationInclusion {
    pub relation: String,
    pub included: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<QueryArgs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "OrderBy")]
pub struct OrderBy {
    pub fields: Vec<OrderByField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderByField {
    pub field: String,
    pub direction: SortDirection,
}

/// Sort direction, spelled exactly `asc` or `desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_str_exact(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}
