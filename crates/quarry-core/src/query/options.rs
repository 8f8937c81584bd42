use crate::{
    query::{resolver::Fields, smash::Smash},
    value::{Document, Value},
};
use derive_more::Deref;
use serde::Serialize;

/// Option keys whose document values are keyed by field name.
const FIELD_KEYED: [&str; 3] = ["sort", "fields", "hint"];

///
/// Options
///
/// Plain query options (`limit`, `skip`, `sort`, projection, ...).
/// Field-keyed option documents are stored with resolved, localized names.
///

#[derive(Clone, Debug, Default, Deref, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Options(Smash);

impl Options {
    #[must_use]
    pub fn new(fields: Fields) -> Self {
        Self(Smash::new(fields))
    }

    pub fn store(&mut self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let value = match value {
            Value::Document(document) if FIELD_KEYED.contains(&key) => {
                Value::Document(self.resolve_keys(document))
            }
            other => other,
        };

        self.0.put(key, value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.take(key)
    }

    #[must_use]
    pub fn limit(&self) -> Option<i64> {
        self.get("limit").and_then(Value::as_i64)
    }

    #[must_use]
    pub fn skip(&self) -> Option<i64> {
        self.get("skip").and_then(Value::as_i64)
    }

    #[must_use]
    pub fn sort(&self) -> Option<&Document> {
        self.get("sort").and_then(Value::as_document)
    }

    #[must_use]
    pub fn projection(&self) -> Option<&Document> {
        self.get("fields").and_then(Value::as_document)
    }

    /// `$skip`, `$limit` and `$sort` stages for the options that are set.
    #[must_use]
    pub fn to_pipeline(&self) -> Vec<Value> {
        let mut stages = Vec::new();
        if let Some(skip) = self.get("skip") {
            stages.push(Value::wrap("$skip", skip.clone()));
        }
        if let Some(limit) = self.get("limit") {
            stages.push(Value::wrap("$limit", limit.clone()));
        }
        if let Some(sort) = self.get("sort") {
            stages.push(Value::wrap("$sort", sort.clone()));
        }

        stages
    }

    fn resolve_keys(&self, document: Document) -> Document {
        document
            .into_iter()
            .map(|(key, value)| (self.fields().database_name(&key), value))
            .collect()
    }
}
