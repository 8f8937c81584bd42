//! Set-combination rules for values that land on the same selector field.
//!
//! Three shapes take part: scalars, lists and documents. Scalars are lifted
//! to one-element lists before combining. Documents combine key by key, so
//! `{"$in": [1, 2]}` against `{"$in": [2, 3]}` combines the two `$in` lists
//! and rewraps the result under `$in`. A single-key document against a
//! scalar or list combines the wrapped value with the lifted other side and
//! rewraps it under the same key, so `1` unioned with `{"$in": [2]}` is
//! `{"$in": [1, 2]}`. A missing existing value always yields the incoming
//! value unchanged.
//!
//! Intersection is set-valued: the result keeps existing order and holds
//! each common element once.

use crate::{
    error::QueryError,
    value::{Document, Value},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Combine {
    Add,
    Union,
    Intersect,
}

impl Combine {
    const fn label(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Union => "union",
            Self::Intersect => "intersect",
        }
    }

    fn lists(self, existing: Vec<Value>, incoming: Vec<Value>) -> Vec<Value> {
        match self {
            // existing duplicates are kept; only incoming values are checked
            Self::Add => {
                let mut out = existing;
                for item in incoming {
                    if !out.contains(&item) {
                        out.push(item);
                    }
                }
                out
            }
            Self::Union => {
                let mut all = existing;
                all.extend(incoming);
                Value::dedup_list(all)
            }
            Self::Intersect => Value::dedup_list(
                existing
                    .into_iter()
                    .filter(|item| incoming.contains(item))
                    .collect(),
            ),
        }
    }
}

/// Accumulate `incoming` onto `existing` without de-duplicating `existing`.
pub fn add(existing: Option<Value>, incoming: Value) -> Result<Value, QueryError> {
    combine(existing, incoming, Combine::Add)
}

/// De-duplicated concatenation, existing elements first.
pub fn union(existing: Option<Value>, incoming: Value) -> Result<Value, QueryError> {
    combine(existing, incoming, Combine::Union)
}

/// Elements present on both sides, in existing order, each kept once.
pub fn intersect(existing: Option<Value>, incoming: Value) -> Result<Value, QueryError> {
    combine(existing, incoming, Combine::Intersect)
}

fn combine(existing: Option<Value>, incoming: Value, op: Combine) -> Result<Value, QueryError> {
    let Some(existing) = existing else {
        return Ok(incoming);
    };

    match (existing, incoming) {
        (Value::Document(left), Value::Document(right)) => {
            combine_documents(left, right, op).map(Value::Document)
        }
        (Value::Document(left), right) => {
            let (key, inner) = single_entry(&left, &right, op)?;
            let combined = combine(Some(inner), Value::List(right.into_array_form()), op)?;

            Ok(Value::wrap(key, combined))
        }
        (left, Value::Document(right)) => {
            let (key, inner) = single_entry(&right, &left, op)?;
            let combined = combine(Some(Value::List(left.into_array_form())), inner, op)?;

            Ok(Value::wrap(key, combined))
        }
        (left, right) if op == Combine::Add && left == right => Ok(left),
        (left, right) => Ok(Value::List(
            op.lists(left.into_array_form(), right.into_array_form()),
        )),
    }
}

fn combine_documents(
    mut existing: Document,
    incoming: Document,
    op: Combine,
) -> Result<Document, QueryError> {
    for (key, value) in incoming {
        let current = existing.get(&key).cloned();
        let merged = combine(current, value, op)?;
        existing.insert(key, merged);
    }

    Ok(existing)
}

// Only a one-key document can be rewrapped around a non-document value.
fn single_entry(
    document: &Document,
    other: &Value,
    op: Combine,
) -> Result<(String, Value), QueryError> {
    match document.first() {
        Some((key, inner)) if document.len() == 1 => Ok((key.to_string(), inner.clone())),
        _ => Err(QueryError::unsupported_combination(format!(
            "cannot {} {document:?} with {other:?}: only a single-key document combines with a non-document value",
            op.label()
        ))),
    }
}
