//! The filter document being built.
//!
//! Every write resolves the field name and evolves the value through the
//! field's normalizer. Values stored under `$and`, `$or` and `$nor` are
//! always lists of documents; each operand is re-normalized on its own and
//! the list is de-duplicated.

use crate::{
    error::QueryError,
    query::{
        contradiction,
        resolver::{Fields, Normalizer},
        smash::Smash,
    },
    value::{Document, Value},
};
use derive_more::Deref;
use serde::Serialize;
use std::sync::Arc;

/// Logical operators whose value is a list of sub-selectors.
pub const LOGICAL_OPERATORS: [&str; 3] = ["$and", "$or", "$nor"];

/// Operators whose values are never passed through a normalizer.
const RAW_VALUE_OPERATORS: [&str; 3] = ["$exists", "$type", "$size"];

#[must_use]
pub fn is_multi_selection(key: &str) -> bool {
    LOGICAL_OPERATORS.contains(&key)
}

///
/// Selector
///

#[derive(Clone, Debug, Default, Deref, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Selector(Smash);

impl Selector {
    #[must_use]
    pub fn new(fields: Fields) -> Self {
        Self(Smash::new(fields))
    }

    /// Store a value under `key`, replacing any existing value.
    ///
    /// Logical operators require a list of documents; anything else is
    /// resolved and evolved before being written.
    pub fn store(&mut self, key: &str, value: impl Into<Value>) -> Result<(), QueryError> {
        let value = value.into();

        if is_multi_selection(key) {
            let operands = self.evolve_multi(key, value)?;
            self.0.put(key, Value::List(operands));
        } else {
            let (name, normalizer) = self.storage_pair(key);
            let evolved = evolve(normalizer.as_ref(), value);
            self.0.put(name, evolved);
        }

        Ok(())
    }

    /// Merge another document in.
    ///
    /// When both sides hold a document under the same key they are merged
    /// with a rule table: `$in` intersects, `$nin` unions, anything else
    /// overwrites. Logical operator lists are concatenated.
    pub fn merge(&mut self, other: Document) -> Result<(), QueryError> {
        for (key, value) in other {
            let merged = match (self.lookup(&key), value) {
                (Some(Value::List(existing)), Value::List(incoming)) if is_multi_selection(&key) => {
                    let mut operands = existing.clone();
                    operands.extend(incoming);
                    Value::List(operands)
                }
                (Some(Value::Document(existing)), Value::Document(incoming))
                    if !is_multi_selection(&key) =>
                {
                    Value::Document(merge_operator_maps(existing.clone(), incoming))
                }
                (_, value) => value,
            };
            self.store(&key, merged)?;
        }

        Ok(())
    }

    /// Remove a field or operator entry.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.take(key)
    }

    /// Replace the whole selector, keeping the resolution context.
    pub(crate) fn replace(&mut self, entries: Document) -> Document {
        self.0.replace_entries(entries)
    }

    /// `[{"$match": selector}]`, or nothing when the selector is empty.
    #[must_use]
    pub fn to_pipeline(&self) -> Vec<Value> {
        if self.is_empty() {
            return Vec::new();
        }

        vec![Value::wrap("$match", self.as_document().clone())]
    }

    /// Whether this selector can provably never match a document.
    #[must_use]
    pub fn is_contradicted(&self) -> bool {
        contradiction::is_contradicted(self.as_document())
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        self.0.into_document()
    }

    fn evolve_multi(&self, operator: &str, value: Value) -> Result<Vec<Value>, QueryError> {
        let Value::List(operands) = value else {
            return Err(QueryError::invalid_expression(format!(
                "value of '{operator}' must be a list of documents, got {value:?}"
            )));
        };

        let mut out = Vec::with_capacity(operands.len());
        for operand in operands {
            let Value::Document(document) = operand else {
                return Err(QueryError::invalid_expression(format!(
                    "operand of '{operator}' must be a document, got {operand:?}"
                )));
            };

            let mut evolved = Document::new();
            for (key, value) in document {
                let value = if is_multi_selection(&key) {
                    Value::List(self.evolve_multi(&key, value)?)
                } else {
                    value
                };
                let (name, normalizer) = self.storage_pair(&key);
                evolved.insert(name, evolve(normalizer.as_ref(), value));
            }
            out.push(Value::Document(evolved));
        }

        Ok(Value::dedup_list(out))
    }
}

/// Evolve a value through a field normalizer.
///
/// Lists are evolved item by item and operator documents value by value,
/// except under `$exists`, `$type` and `$size`.
pub(crate) fn evolve(normalizer: Option<&Arc<dyn Normalizer>>, value: Value) -> Value {
    let Some(normalizer) = normalizer else {
        return value;
    };

    match value {
        Value::Document(document) => Value::Document(
            document
                .into_iter()
                .map(|(key, value)| {
                    if RAW_VALUE_OPERATORS.contains(&key.as_str()) {
                        (key, value)
                    } else {
                        (key, evolve(Some(normalizer), value))
                    }
                })
                .collect(),
        ),
        Value::List(items) => Value::List(
            items
                .into_iter()
                .map(|item| evolve(Some(normalizer), item))
                .collect(),
        ),
        other => normalizer.evolve(other),
    }
}

fn merge_operator_maps(mut existing: Document, incoming: Document) -> Document {
    for (op, value) in incoming {
        let merged = match (op.as_str(), existing.get(&op)) {
            ("$in", Some(Value::List(current))) => match value {
                Value::List(next) => Value::List(Value::dedup_list(
                    current
                        .iter()
                        .filter(|item| next.contains(item))
                        .cloned()
                        .collect(),
                )),
                other => other,
            },
            ("$nin", Some(Value::List(current))) => match value {
                Value::List(next) => {
                    let mut all = current.clone();
                    all.extend(next);
                    Value::List(Value::dedup_list(all))
                }
                other => other,
            },
            _ => value,
        };
        existing.insert(op, merged);
    }

    existing
}
