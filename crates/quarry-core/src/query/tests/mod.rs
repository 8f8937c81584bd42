mod aggregation;
mod contradiction;
mod options;

use crate::{
    query::{FieldCatalog, Fields, Normalizer, Query},
    value::{Document, Value},
};
use std::sync::Arc;

/// Snapshot of a query's selector as a plain document.
fn selector_of(query: &Query) -> Document {
    query.selector().as_document().clone()
}

fn ints(items: &[i64]) -> Value {
    Value::from_list(items.to_vec())
}

fn catalog_query(catalog: FieldCatalog) -> Query {
    Query::with_fields(Fields::new(Arc::new(catalog)))
}

///
/// Upper
/// Test normalizer: upper-cases text, leaves everything else alone.
///

#[derive(Debug)]
struct Upper;

impl Normalizer for Upper {
    fn evolve(&self, value: Value) -> Value {
        match value {
            Value::Text(text) => Value::Text(text.to_uppercase()),
            other => other,
        }
    }
}

///
/// Localized
///

#[derive(Debug)]
struct Localized;

impl Normalizer for Localized {
    fn evolve(&self, value: Value) -> Value {
        value
    }

    fn is_localized(&self) -> bool {
        true
    }
}
