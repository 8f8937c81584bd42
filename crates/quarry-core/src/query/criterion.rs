//! Builder argument shapes and their lowering to field-keyed documents.
//!
//! Every builder method accepts `impl Into<Criterion>`. Before any merge
//! rule runs, the criterion is lowered to a plain `Document` whose keys are
//! either field names or operators.

use crate::{
    error::QueryError,
    query::{Query, key::Key},
    value::{Document, Value, is_operator},
};

///
/// CriterionKey
///

#[derive(Clone, Debug, PartialEq)]
pub enum CriterionKey {
    Field(String),
    Key(Key),
}

impl CriterionKey {
    /// The bare field (or operator) name this key writes under.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field(name) => name,
            Self::Key(key) => key.name(),
        }
    }
}

impl From<&str> for CriterionKey {
    fn from(value: &str) -> Self {
        Self::Field(value.to_string())
    }
}

impl From<String> for CriterionKey {
    fn from(value: String) -> Self {
        Self::Field(value)
    }
}

impl From<Key> for CriterionKey {
    fn from(value: Key) -> Self {
        Self::Key(value)
    }
}

///
/// FieldMap
///
/// Ordered `(key, value)` pairs. Unlike `Document`, the same field may
/// appear more than once and keys may be compiled operator `Key`s.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(CriterionKey, Value)>,
}

impl FieldMap {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a plain field condition.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries
            .push((CriterionKey::Field(name.into()), value.into()));
        self
    }

    /// Append a condition keyed by a compiled operator key.
    #[must_use]
    pub fn key(mut self, key: Key, value: impl Into<Value>) -> Self {
        self.entries.push((CriterionKey::Key(key), value.into()));
        self
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(CriterionKey, Value)> {
        self.entries.iter()
    }

    /// Rewrite every value in place.
    #[must_use]
    pub fn map_values(self, f: impl Fn(Value) -> Value) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .map(|(key, value)| (key, f(value)))
                .collect(),
        }
    }

    /// Expand keys into a document.
    ///
    /// Plain fields are wrapped in `$ne` (or `$not` for regexes) when
    /// negating; compiled keys apply their own template. When the same
    /// field appears twice, disjoint operator maps are merged and anything
    /// else is appended under `$and`.
    pub fn expand(self, negating: bool) -> Result<Document, QueryError> {
        let mut result = Document::new();

        for (key, value) in self.entries {
            let (name, expr) = match key {
                CriterionKey::Field(name) => {
                    let expr = if negating && !is_operator(&name) {
                        let op = if value.is_regex() { "$not" } else { "$ne" };
                        Value::wrap(op, value)
                    } else {
                        value
                    };
                    (name, expr)
                }
                CriterionKey::Key(key) => {
                    let expr = key.apply_to(value, negating)?;
                    (key.name().to_string(), expr)
                }
            };
            merge_expanded(&mut result, name, expr);
        }

        Ok(result)
    }
}

impl IntoIterator for FieldMap {
    type Item = (CriterionKey, Value);
    type IntoIter = std::vec::IntoIter<(CriterionKey, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<Document> for FieldMap {
    fn from(document: Document) -> Self {
        Self {
            entries: document
                .into_iter()
                .map(|(key, value)| (CriterionKey::Field(key), value))
                .collect(),
        }
    }
}

fn merge_expanded(result: &mut Document, name: String, expr: Value) {
    let Some(existing) = result.get_mut(&name) else {
        result.insert(name, expr);
        return;
    };

    if let (Value::Document(current), Value::Document(incoming)) = (&mut *existing, &expr)
        && current.is_operator_map()
        && incoming.is_operator_map()
        && incoming.keys().all(|op| !current.contains_key(op))
    {
        current.merge(incoming.clone());
        return;
    }

    let conjunct = Value::wrap(name, expr);
    match result.get_mut("$and") {
        Some(Value::List(operands)) => operands.push(conjunct),
        _ => {
            result.insert("$and", Value::List(vec![conjunct]));
        }
    }
}

///
/// Criterion
///
/// Closed set of argument shapes accepted by builder methods.
///
/// Literal      → a bare value; text is a `$where` script for `where_`,
///                null means "no argument".
/// FieldMap     → field/key → value pairs.
/// NestedQuery  → the selector of another query snapshot.
/// Sequence     → several criteria, flattened before use.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Criterion {
    Literal(Value),
    FieldMap(FieldMap),
    NestedQuery(Document),
    Sequence(Vec<Self>),
}

impl Criterion {
    /// Whether this criterion stands for a missing argument.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Literal(Value::Null))
    }

    /// Flatten nested sequences into a list of non-sequence criteria.
    #[must_use]
    pub fn flatten(self) -> Vec<Self> {
        match self {
            Self::Sequence(items) => items.into_iter().flat_map(Self::flatten).collect(),
            other => vec![other],
        }
    }

    /// Lower to an ordered field map. Sequences are concatenated.
    pub fn into_field_map(self, method: &'static str) -> Result<FieldMap, QueryError> {
        match self {
            Self::Literal(Value::Null) => Err(QueryError::missing_argument(method)),
            Self::Literal(other) => Err(QueryError::invalid_expression(format!(
                "'{method}' expects a field map, got {other:?}"
            ))),
            Self::FieldMap(map) => Ok(map),
            Self::NestedQuery(selector) => Ok(FieldMap::from(selector)),
            Self::Sequence(items) => {
                let mut out = FieldMap::new();
                for item in items {
                    out.entries.extend(item.into_field_map(method)?.entries);
                }
                Ok(out)
            }
        }
    }

    /// Lower to a single expanded document.
    pub fn into_expression(
        self,
        method: &'static str,
        negating: bool,
    ) -> Result<Document, QueryError> {
        self.into_field_map(method)?.expand(negating)
    }
}

impl From<FieldMap> for Criterion {
    fn from(value: FieldMap) -> Self {
        Self::FieldMap(value)
    }
}

impl From<&Query> for Criterion {
    fn from(value: &Query) -> Self {
        Self::NestedQuery(value.selector().as_document().clone())
    }
}

impl From<Query> for Criterion {
    fn from(value: Query) -> Self {
        Self::NestedQuery(value.selector.into_document())
    }
}

impl From<Document> for Criterion {
    fn from(value: Document) -> Self {
        Self::FieldMap(FieldMap::from(value))
    }
}

impl From<&str> for Criterion {
    fn from(value: &str) -> Self {
        Self::Literal(Value::from(value))
    }
}

impl From<String> for Criterion {
    fn from(value: String) -> Self {
        Self::Literal(Value::Text(value))
    }
}

impl From<Value> for Criterion {
    fn from(value: Value) -> Self {
        match value {
            Value::Document(document) => Self::from(document),
            Value::List(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            other => Self::Literal(other),
        }
    }
}

impl<C: Into<Self>> From<Vec<C>> for Criterion {
    fn from(value: Vec<C>) -> Self {
        Self::Sequence(value.into_iter().map(Into::into).collect())
    }
}

impl<C: Into<Self>> From<Option<C>> for Criterion {
    fn from(value: Option<C>) -> Self {
        value.map_or(Self::Literal(Value::Null), Into::into)
    }
}

impl<V: Into<Value>> From<(&str, V)> for Criterion {
    fn from((name, value): (&str, V)) -> Self {
        Self::FieldMap(FieldMap::new().field(name, value))
    }
}

impl<V: Into<Value>> From<(String, V)> for Criterion {
    fn from((name, value): (String, V)) -> Self {
        Self::FieldMap(FieldMap::new().field(name, value))
    }
}

impl<V: Into<Value>> From<(Key, V)> for Criterion {
    fn from((key, value): (Key, V)) -> Self {
        Self::FieldMap(FieldMap::new().key(key, value))
    }
}
