//! GraphQL text generation
//!
//! Walks a [`Query`] and produces the document text plus the variables map.
//! Every `where` literal becomes a variable named `var0`, `var1`, ... in the
//! order the tree is walked: root arguments first, then each selected
//! relation in order, a relation's own arguments before its children. The
//! counter is shared across nesting levels.
//!
//! `take`, `skip` and `orderBy` are inlined. A selection set that would be
//! empty falls back to `__typename` so the document stays valid without
//! fetching fields nobody asked for.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::ast::{OrderBy, Query, QueryArgs, Where, WhereCondition};
use crate::inflector::{operation_name, root_field_name};
use crate::value::{graphql_type, variable_value};

/// Ordered variables map (`var0`, `var1`, ...)
pub type Variables = Map<String, JsonValue>;

/// Fallback selection when nothing was requested
const TYPENAME_FIELD: &str = "__typename";

const INDENT: &str = "  ";

/// A GraphQL document ready to hand to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub query: String,
    pub variables: Variables,
}

/// Render a query AST as GraphQL text and variables.
pub fn emit(query: &Query) -> CompiledQuery {
    let mut emitter = Emitter::default();

    let mut body = String::new();
    emitter.write_field(
        &mut body,
        &root_field_name(query.operation, &query.model),
        query.args.as_ref(),
        true,
        1,
    );

    let mut text = format!("query {}", operation_name(query.operation, &query.model));
    if !emitter.declarations.is_empty() {
        text.push('(');
        text.push_str(&emitter.declarations.join(", "));
        text.push(')');
    }
    if query.is_live {
        text.push_str(" @live");
    }
    text.push_str(" {\n");
    text.push_str(&body);
    text.push('}');

    CompiledQuery {
        query: text,
        variables: emitter.variables,
    }
}

#[derive(Default)]
struct Emitter {
    variables: Variables,
    declarations: Vec<String>,
}

/// One key of a rendered input object.
enum Entry {
    /// `key: { ... }`, mergeable with later parts for the same key
    Object { key: String, parts: Vec<String> },
    Raw(String),
}

impl Entry {
    fn render(self) -> String {
        match self {
            Entry::Object { key, parts } => format!("{key}: {}", braces(&parts)),
            Entry::Raw(text) => text,
        }
    }
}

fn braces(parts: &[String]) -> String {
    if parts.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", parts.join(", "))
    }
}

impl Emitter {
    /// Extract a literal into the next variable and return its reference.
    fn bind(&mut self, value: &JsonValue) -> String {
        let name = format!("var{}", self.variables.len());
        self.declarations.push(format!("${name}: {}", graphql_type(value)));
        self.variables.insert(name.clone(), variable_value(value));
        format!("${name}")
    }

    fn write_field(
        &mut self,
        out: &mut String,
        name: &str,
        args: Option<&QueryArgs>,
        is_relation: bool,
        depth: usize,
    ) {
        let indent = INDENT.repeat(depth);
        out.push_str(&indent);
        out.push_str(name);

        if !is_relation {
            out.push('\n');
            return;
        }

        if let Some(args) = args.filter(|a| a.has_field_arguments()) {
            out.push('(');
            out.push_str(&self.arguments(args));
            out.push(')');
        }

        out.push_str(" {\n");
        self.write_selection(out, args, depth + 1);
        out.push_str(&indent);
        out.push_str("}\n");
    }

    fn arguments(&mut self, args: &QueryArgs) -> String {
        let mut parts = Vec::new();

        if let Some(where_) = args.where_.as_ref().filter(|w| !w.conditions.is_empty()) {
            parts.push(format!("where: {}", self.where_object(where_)));
        }
        if let Some(order_by) = args.order_by.as_ref().filter(|o| !o.fields.is_empty()) {
            parts.push(format!("orderBy: {}", order_by_value(order_by)));
        }
        if let Some(take) = args.take {
            parts.push(format!("take: {take}"));
        }
        if let Some(skip) = args.skip {
            parts.push(format!("skip: {skip}"));
        }

        parts.join(", ")
    }

    fn where_object(&mut self, where_: &Where) -> String {
        braces(&self.where_entries(where_))
    }

    fn where_entries(&mut self, where_: &Where) -> Vec<String> {
        let mut entries: Vec<Entry> = Vec::new();

        for condition in &where_.conditions {
            match condition {
                WhereCondition::Field(c) => {
                    let part = format!("{}: {}", c.operator.as_str(), self.bind(&c.value));
                    push_part(&mut entries, &c.field, vec![part]);
                }
                WhereCondition::Relation(c) => {
                    let parts = self.where_entries(&c.condition);
                    push_part(&mut entries, &c.relation, parts);
                }
                WhereCondition::Logical(c) => {
                    let groups: Vec<String> =
                        c.conditions.iter().map(|w| self.where_object(w)).collect();
                    entries.push(Entry::Raw(format!(
                        "{}: [{}]",
                        c.operator.as_str(),
                        groups.join(", ")
                    )));
                }
            }
        }

        entries.into_iter().map(Entry::render).collect()
    }

    fn write_selection(&mut self, out: &mut String, args: Option<&QueryArgs>, depth: usize) {
        let select = args.and_then(|a| a.select.as_ref());
        let include = args.and_then(|a| a.include.as_ref());

        // Explicit exclusion in either map wins over any inclusion
        let excluded = |name: &str| {
            select.and_then(|s| s.get(name)).is_some_and(|f| !f.selected)
                || include.and_then(|i| i.get(name)).is_some_and(|r| !r.included)
        };

        let mut items: Vec<(&str, Option<&QueryArgs>, bool)> = Vec::new();

        if let Some(select) = select {
            for field in select.fields.iter().filter(|f| f.selected) {
                if !excluded(&field.field) {
                    items.push((field.field.as_str(), field.args.as_ref(), field.args.is_some()));
                }
            }
        }

        if let Some(include) = include {
            for relation in include.relations.iter().filter(|r| r.included) {
                if excluded(&relation.relation) {
                    continue;
                }
                match items.iter_mut().find(|(name, _, _)| *name == relation.relation) {
                    Some(item) => {
                        if item.1.is_none() {
                            item.1 = relation.args.as_ref();
                        }
                        item.2 = true;
                    }
                    None => items.push((relation.relation.as_str(), relation.args.as_ref(), true)),
                }
            }
        }

        if items.is_empty() {
            out.push_str(&INDENT.repeat(depth));
            out.push_str(TYPENAME_FIELD);
            out.push('\n');
            return;
        }

        for (name, nested, is_relation) in items {
            self.write_field(out, name, nested, is_relation, depth);
        }
    }
}

/// Append parts under `key`, merging with the previous entry for the same key.
fn push_part(entries: &mut Vec<Entry>, key: &str, new_parts: Vec<String>) {
    if let Some(Entry::Object { key: last, parts }) = entries.last_mut() {
        if last == key {
            parts.extend(new_parts);
            return;
        }
    }
    entries.push(Entry::Object {
        key: key.to_string(),
        parts: new_parts,
    });
}

fn order_by_value(order_by: &OrderBy) -> String {
    let items: Vec<String> = order_by
        .fields
        .iter()
        .map(|f| format!("{{ {}: {} }}", f.field, f.direction.as_str()))
        .collect();

    match items.as_slice() {
        [single] => single.clone(),
        _ => format!("[{}]", items.join(", ")),
    }
}
