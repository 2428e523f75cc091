//! Integration tests for query compilation
//!
//! These tests exercise the public API end to end:
//! - Variable numbering and ordering
//! - Root field naming and pluralization
//! - Live directive handling and builder defaults
//! - Selection fidelity
//! - Parse errors and determinism

use assert_matches::assert_matches;
use chrono::{TimeZone, Utc};
use gqlorm::{
    BuildOptions, BuilderOptions, CompiledQuery, Error, QueryBuilder, QueryOperation, build_query,
    date_time, parse_query,
};
use pretty_assertions::assert_eq;
use regex::Regex;
use serde_json::{Value as JsonValue, json};

fn compile(model: &str, operation: QueryOperation, args: JsonValue) -> CompiledQuery {
    build_query(model, operation, Some(&args), BuildOptions::default()).unwrap()
}

fn assert_valid_graphql(query: &str) {
    if let Err(e) = async_graphql::parser::parse_query(query) {
        panic!("invalid GraphQL: {e}\n{query}");
    }
}

// ============================================================================
// Variable Ordering
// ============================================================================

mod variables {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_variables_follow_traversal_order() {
        let epoch = Utc.timestamp_opt(0, 0).unwrap();
        let compiled = compile(
            "post",
            QueryOperation::FindFirst,
            json!({
                "where": {
                    "AND": [{ "published": true }, { "createdAt": { "gt": date_time(epoch) } }]
                }
            }),
        );

        let expected = json!({ "var0": true, "var1": "1970-01-01T00:00:00.000Z" });
        assert_eq!(JsonValue::Object(compiled.variables.clone()), expected);

        let keys: Vec<&str> = compiled.variables.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["var0", "var1"]);
        assert!(compiled.query.contains("$var0: Boolean, $var1: DateTime"));
        assert_valid_graphql(&compiled.query);
    }

    #[test]
    fn test_nested_relation_where_continues_numbering() {
        let compiled = compile(
            "user",
            QueryOperation::FindMany,
            json!({
                "where": {
                    "role": "ADMIN",
                    "OR": [{ "name": { "startsWith": "A" } }, { "age": { "lt": 30 } }]
                },
                "include": {
                    "posts": {
                        "where": { "title": { "contains": "graphql" } },
                        "include": { "comments": { "where": { "approved": true } } }
                    }
                }
            }),
        );

        let values: Vec<&JsonValue> = compiled.variables.values().collect();
        assert_eq!(
            values,
            vec![&json!("ADMIN"), &json!("A"), &json!(30), &json!("graphql"), &json!(true)]
        );
        let keys: Vec<&str> = compiled.variables.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["var0", "var1", "var2", "var3", "var4"]);
        assert!(compiled.query.contains("comments(where: { approved: { equals: $var4 } })"));
        assert_valid_graphql(&compiled.query);
    }

    #[test]
    fn test_every_where_literal_is_a_variable() {
        let compiled = compile(
            "user",
            QueryOperation::FindMany,
            json!({ "where": { "email": "a@example.com", "age": { "gte": 21 } }, "take": 5 }),
        );
        assert!(!compiled.query.contains("a@example.com"));
        assert!(!compiled.query.contains("21"));
        assert!(compiled.query.contains("take: 5"));
        assert_eq!(compiled.variables.len(), 2);
    }
}

// ============================================================================
// Naming
// ============================================================================

mod naming {
    use super::*;

    #[test]
    fn test_find_many_uses_plural_root_field() {
        let compiled =
            build_query("user", QueryOperation::FindMany, None, BuildOptions::default()).unwrap();
        assert!(compiled.query.starts_with("query findManyUser"));
        assert!(compiled.query.contains("\n  users {"));
        assert_valid_graphql(&compiled.query);
    }

    #[test]
    fn test_single_row_operations_use_singular_root_field() {
        for operation in [
            QueryOperation::FindUnique,
            QueryOperation::FindFirst,
            QueryOperation::FindUniqueOrThrow,
            QueryOperation::FindFirstOrThrow,
        ] {
            let compiled = build_query("user", operation, None, BuildOptions::default()).unwrap();
            assert!(compiled.query.contains("\n  user {"), "{operation}: {}", compiled.query);
            assert!(!compiled.query.contains("users"));
            assert!(compiled.query.starts_with(&format!("query {operation}User")));
        }
    }

    #[test]
    fn test_model_name_is_kept_as_written() {
        let compiled =
            build_query("user2fa", QueryOperation::FindMany, None, BuildOptions::default())
                .unwrap();
        assert!(compiled.query.starts_with("query findManyUser2fa {"));
        assert!(compiled.query.contains("\n  user2fas {"));

        let compiled =
            build_query("apiKey", QueryOperation::FindUnique, None, BuildOptions::default())
                .unwrap();
        assert!(compiled.query.starts_with("query findUniqueApiKey {"));
        assert!(compiled.query.contains("\n  apiKey {"));
        assert_valid_graphql(&compiled.query);
    }
}

// ============================================================================
// Live Directive
// ============================================================================

mod live {
    use super::*;

    #[test]
    fn test_live_toggle() {
        let build = |options| build_query("user", QueryOperation::FindMany, None, options).unwrap();

        let live = build(BuildOptions::live(true));
        assert!(live.query.contains("@live"));
        assert_valid_graphql(&live.query);

        let not_live = build(BuildOptions::live(false));
        assert!(!not_live.query.contains("@live"));

        let omitted = build(BuildOptions::default());
        assert!(!omitted.query.contains("@live"));
    }

    #[test]
    fn test_call_site_overrides_forced_live() {
        let builder = QueryBuilder::new(BuilderOptions {
            force_live_queries: true,
        });

        let forced = builder
            .build("user", QueryOperation::FindMany, None, BuildOptions::default())
            .unwrap();
        assert!(forced.query.contains("@live"));

        let opted_out = builder
            .build("user", QueryOperation::FindMany, None, BuildOptions::live(false))
            .unwrap();
        assert!(!opted_out.query.contains("@live"));
    }
}

// ============================================================================
// Selection
// ============================================================================

mod selection {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_selected_fields_only() {
        let compiled = compile(
            "user",
            QueryOperation::FindMany,
            json!({ "select": { "id": true, "email": true } }),
        );
        assert!(Regex::new(r"\bid\b").unwrap().is_match(&compiled.query));
        assert!(Regex::new(r"\bemail\b").unwrap().is_match(&compiled.query));

        let compiled = compile(
            "user",
            QueryOperation::FindMany,
            json!({ "select": { "id": true, "name": true } }),
        );
        assert!(!compiled.query.contains("createdAt"));
        assert!(!compiled.query.contains("email"));
    }

    #[test]
    fn test_explicit_exclusion_wins() {
        let compiled = compile(
            "user",
            QueryOperation::FindMany,
            json!({
                "select": { "id": true, "posts": false },
                "include": { "posts": { "where": { "published": true } } }
            }),
        );
        assert!(!compiled.query.contains("posts"));
        assert!(compiled.variables.is_empty());
    }

    #[test]
    fn test_wide_integers_are_declared_as_float() {
        let compiled = compile(
            "user",
            QueryOperation::FindMany,
            json!({ "where": { "age": 30, "bytesUsed": { "gt": 3_000_000_000u64 } } }),
        );
        assert!(compiled.query.starts_with("query findManyUser($var0: Int, $var1: Float)"));
        assert_eq!(compiled.variables["var1"], json!(3_000_000_000u64));
        assert_valid_graphql(&compiled.query);
    }

    #[test]
    fn test_full_document_shape() {
        let compiled = compile(
            "user",
            QueryOperation::FindMany,
            json!({
                "where": { "email": { "endsWith": "@example.com" } },
                "select": { "id": true, "email": true, "profile": { "select": { "bio": true } } },
                "orderBy": [{ "createdAt": "desc" }, { "id": "asc" }],
                "take": 20,
                "skip": 40
            }),
        );

        let expected = "query findManyUser($var0: String) {\n  \
            users(where: { email: { endsWith: $var0 } }, orderBy: [{ createdAt: desc }, { id: asc }], take: 20, skip: 40) {\n    \
            id\n    \
            email\n    \
            profile {\n      \
            bio\n    \
            }\n  \
            }\n\
            }";
        assert_eq!(compiled.query, expected);
        assert_valid_graphql(&compiled.query);
    }
}

// ============================================================================
// Errors & Determinism
// ============================================================================

mod errors {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bad_sort_direction_is_parse_error() {
        let result = parse_query(
            "user",
            QueryOperation::FindMany,
            Some(&json!({ "orderBy": { "createdAt": "up" } })),
        );
        assert_matches!(result, Err(e) if e.message.contains("createdAt"));
    }

    #[test]
    fn test_names_outside_graphql_grammar_are_rejected() {
        for args in [
            json!({ "where": { "first name": "x" } }),
            json!({ "select": { "full-name": true } }),
            json!({ "include": { "posts": { "where": { "title.raw": "x" } } } }),
            json!({ "orderBy": { "created at": "asc" } }),
        ] {
            let result =
                build_query("user", QueryOperation::FindMany, Some(&args), BuildOptions::default());
            assert_matches!(
                result,
                Err(Error::Parse(e)) if e.message.contains("Invalid field name")
            );
        }
    }

    #[test]
    fn test_out_of_range_take_is_parse_error() {
        let result = parse_query(
            "user",
            QueryOperation::FindMany,
            Some(&json!({ "take": 3_000_000_000u64 })),
        );
        assert_matches!(result, Err(e) if e.message.contains("take"));
    }

    #[test]
    fn test_malformed_logical_is_parse_error() {
        let result = build_query(
            "user",
            QueryOperation::FindMany,
            Some(&json!({ "where": { "AND": { "id": 1 } } })),
            BuildOptions::default(),
        );
        assert_matches!(result, Err(Error::Parse(_)));
    }

    #[test]
    fn test_compilation_is_deterministic() {
        let args = json!({
            "where": { "OR": [{ "a": 1 }, { "b": { "in": ["x", "y"] } }], "c": { "not": 3 } },
            "select": { "id": true, "posts": { "where": { "d": false } } },
            "orderBy": { "id": "asc" }
        });

        let build = || {
            build_query("item", QueryOperation::FindMany, Some(&args), BuildOptions::live(true))
                .unwrap()
        };

        let first = build();
        let second = build();
        assert_eq!(first, second);
        assert_valid_graphql(&first.query);
    }
}
