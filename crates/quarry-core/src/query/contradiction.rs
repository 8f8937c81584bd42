//! Satisfiability pre-pass.
//!
//! Detects selectors that can never match so the caller can skip the round
//! trip to the server. Only the empty-membership pattern is recognized:
//! `{field: {"$in": []}}` outside of any negation. Conflicting equality
//! conditions on the same field (`{"$and": [{"a": 1}, {"a": 2}]}`) are not
//! detected.

use crate::value::{Document, Value, is_operator};

/// Whether `selector` is provably unsatisfiable.
#[must_use]
pub fn is_contradicted(selector: &Document) -> bool {
    contradicted(selector, false)
}

fn contradicted(selector: &Document, negated: bool) -> bool {
    selector.iter().any(|(key, value)| match key {
        "$and" => operands(value).any(|sub| contradicted(sub, negated)),
        "$or" => operands(value).all(|sub| contradicted(sub, negated)),
        "$nor" => operands(value).all(|sub| contradicted(sub, !negated)),
        "$not" => value
            .as_document()
            .is_some_and(|sub| contradicted(sub, !negated)),
        key if is_operator(key) => false,
        _ => field_contradicted(value, negated),
    })
}

fn field_contradicted(value: &Value, negated: bool) -> bool {
    let Value::Document(expr) = value else {
        return false;
    };

    let empty_in = matches!(expr.get("$in"), Some(Value::List(items)) if items.is_empty());
    if empty_in && !negated {
        return true;
    }

    expr.get("$not")
        .is_some_and(|inner| field_contradicted(inner, !negated))
}

// Non-document operands never contribute a contradiction.
fn operands(value: &Value) -> impl Iterator<Item = &Document> {
    value
        .as_list()
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_document)
}
