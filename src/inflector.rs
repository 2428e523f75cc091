//! Naming rules for generated GraphQL operations
//!
//! Pluralization is rule based: irregular words first, then suffix rules in
//! order of specificity, falling back to appending `s`.

use convert_case::{Case, Casing};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::QueryOperation;

/// Words that are the same in singular and plural
const UNCOUNTABLE: &[&str] = &[
    "data",
    "equipment",
    "information",
    "media",
    "metadata",
    "news",
    "series",
    "species",
    "feedback",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
    ("goose", "geese"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("ox", "oxen"),
];

static PLURAL_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)(quiz)$", "${1}zes"),
        (r"(?i)(matr|vert|ind)(?:ix|ex)$", "${1}ices"),
        (r"(?i)(x|ch|ss|sh|zz)$", "${1}es"),
        (r"(?i)([^aeiouy]|qu)y$", "${1}ies"),
        (r"(?i)(wi|kni|li)fe$", "${1}ves"),
        (r"(?i)(shel|wol|hal|cal|el|sel|thie|lea|loa|shea)f$", "${1}ves"),
        (r"(?i)sis$", "ses"),
        (r"(?i)(bus|alias|status|campus)$", "${1}es"),
        (r"(?i)(octop)us$", "${1}i"),
        (r"(?i)(buffal|tomat|potat|her)o$", "${1}oes"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).unwrap(), replacement))
    .collect()
});

/// Pluralize the last word of a camelCase identifier.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    // Only the trailing word of a compound name inflects (`blogPost` -> `blogPosts`)
    let split = word
        .char_indices()
        .filter(|(_, c)| c.is_uppercase())
        .map(|(i, _)| i)
        .last()
        .unwrap_or(0);
    let (head, tail) = word.split_at(split);
    let lower = tail.to_lowercase();

    if UNCOUNTABLE.contains(&lower.as_str()) {
        return word.to_string();
    }

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
        return format!("{head}{}", match_initial_case(tail, plural));
    }

    for (pattern, replacement) in PLURAL_RULES.iter() {
        if pattern.is_match(tail) {
            return format!("{head}{}", pattern.replace(tail, *replacement));
        }
    }

    format!("{word}s")
}

fn match_initial_case(original: &str, replacement: &str) -> String {
    if original.starts_with(|c: char| c.is_uppercase()) {
        replacement.to_case(Case::Pascal)
    } else {
        replacement.to_string()
    }
}

/// GraphQL operation name: verb followed by the model with its first letter
/// raised (`findManyUser`).
pub fn operation_name(operation: QueryOperation, model: &str) -> String {
    format!("{}{}", operation.as_str(), with_initial(&camelize(model), char::to_uppercase))
}

/// Root selection field: the model with its first letter lowered, pluralized
/// for list operations.
pub fn root_field_name(operation: QueryOperation, model: &str) -> String {
    let singular = with_initial(&camelize(model), char::to_lowercase);
    if operation.returns_many() {
        pluralize(&singular)
    } else {
        singular
    }
}

/// Join `snake_case` segments (`blog_post` -> `blogPost`). Anything else is
/// kept as written so digits and acronyms survive.
fn camelize(model: &str) -> String {
    let mut out = String::with_capacity(model.len());
    let mut raise_next = false;

    for c in model.chars() {
        if c == '_' && !out.is_empty() {
            raise_next = true;
        } else if raise_next {
            out.extend(c.to_uppercase());
            raise_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

fn with_initial<F, I>(word: &str, convert: F) -> String
where
    F: Fn(char) -> I,
    I: Iterator<Item = char>,
{
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => convert(first).chain(chars).collect(),
        None => String::new(),
    }
}
