use crate::{
    error::QueryError,
    query::{resolver::Fields, selector::Selector},
    value::{Document, Value},
};
use serde::{Serialize, Serializer};

///
/// Pipeline
///
/// Ordered aggregation stages. Stage documents are evolved through a
/// `Selector` so field names resolve the same way they do in filters.
///

#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    stages: Vec<Value>,
    fields: Fields,
}

impl Pipeline {
    #[must_use]
    pub fn new(fields: Fields) -> Self {
        Self {
            stages: Vec::new(),
            fields,
        }
    }

    /// Append `{"$group": entry}`.
    pub fn group(&mut self, entry: Document) -> Result<(), QueryError> {
        let stage = self.evolve(entry)?;
        self.push(Value::wrap("$group", stage));

        Ok(())
    }

    /// Append `{"$project": entry}`.
    pub fn project(&mut self, entry: Document) -> Result<(), QueryError> {
        let stage = self.evolve(entry)?;
        self.push(Value::wrap("$project", stage));

        Ok(())
    }

    /// Append `{"$unwind": ...}`.
    ///
    /// A field name becomes the `"$<canonical name>"` path expression; a
    /// `$`-prefixed path or a document is passed through unchanged.
    pub fn unwind(&mut self, field_or_doc: Value) -> Result<(), QueryError> {
        let stage = match field_or_doc {
            Value::Text(path) if path.starts_with('$') => Value::Text(path),
            Value::Text(field) => {
                let name = self.fields.storage_pair(&field).name;
                Value::Text(format!("${name}"))
            }
            document @ Value::Document(_) => document,
            other => {
                return Err(QueryError::invalid_expression(format!(
                    "'unwind' expects a field name or a document, got {other:?}"
                )));
            }
        };
        self.push(Value::wrap("$unwind", stage));

        Ok(())
    }

    pub fn push(&mut self, stage: Value) {
        self.stages.push(stage);
    }

    pub fn extend(&mut self, stages: impl IntoIterator<Item = Value>) {
        self.stages.extend(stages);
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.stages.iter()
    }

    #[must_use]
    pub fn stages(&self) -> &[Value] {
        &self.stages
    }

    fn evolve(&self, entry: Document) -> Result<Document, QueryError> {
        let mut aggregate = Selector::new(self.fields.clone());
        aggregate.merge(entry)?;

        Ok(aggregate.into_document())
    }
}

impl PartialEq for Pipeline {
    fn eq(&self, other: &Self) -> bool {
        self.stages == other.stages
    }
}

impl Serialize for Pipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.stages.serialize(serializer)
    }
}
