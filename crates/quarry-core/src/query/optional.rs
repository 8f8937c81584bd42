use crate::{
    error::QueryError,
    query::{
        Query,
        key::{Key, SortDirection},
    },
    value::{Document, Value},
};

///
/// SortSpec
///
/// One `order_by` argument.
///
/// Key       → a sort key, e.g. `FieldRef::new("age").desc()`.
/// Pair      → `(field, direction)`; direction is `1`/`-1` or a word.
/// Text      → `"field dir"`, or a bare field name for ascending.
/// Document  → `{field: direction, ...}`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum SortSpec {
    Key(Key),
    Pair(String, Value),
    Text(String),
    Document(Document),
}

impl SortSpec {
    fn into_pairs(self) -> Result<Vec<(String, SortDirection)>, QueryError> {
        match self {
            Self::Key(key) => match key.sort_pair() {
                Some((name, direction)) => Ok(vec![(name.to_string(), direction)]),
                None => Err(QueryError::invalid_expression(format!(
                    "key on '{}' is a filter operator, not a sort key",
                    key.name()
                ))),
            },
            Self::Pair(field, direction) => {
                Ok(vec![(field, SortDirection::from_value(&direction)?)])
            }
            Self::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| match part.split_once(char::is_whitespace) {
                    Some((field, direction)) => SortDirection::from_text(direction.trim())
                        .map(|direction| (field.to_string(), direction)),
                    None => Ok((part.to_string(), SortDirection::Asc)),
                })
                .collect(),
            Self::Document(document) => document
                .into_iter()
                .map(|(field, direction)| {
                    SortDirection::from_value(&direction).map(|direction| (field, direction))
                })
                .collect(),
        }
    }
}

impl From<Key> for SortSpec {
    fn from(value: Key) -> Self {
        Self::Key(value)
    }
}

impl From<&str> for SortSpec {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SortSpec {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Document> for SortSpec {
    fn from(value: Document) -> Self {
        Self::Document(value)
    }
}

impl<V: Into<Value>> From<(&str, V)> for SortSpec {
    fn from((field, direction): (&str, V)) -> Self {
        Self::Pair(field.to_string(), direction.into())
    }
}

impl Query {
    ///
    /// WINDOW
    ///

    #[must_use]
    pub fn limit(&self, value: i64) -> Self {
        self.with_option("limit", value)
    }

    #[must_use]
    pub fn skip(&self, value: i64) -> Self {
        self.with_option("skip", value)
    }

    /// Alias for `skip`.
    #[must_use]
    pub fn offset(&self, value: i64) -> Self {
        self.skip(value)
    }

    #[must_use]
    pub fn batch_size(&self, value: i64) -> Self {
        self.with_option("batch_size", value)
    }

    #[must_use]
    pub fn max_time_ms(&self, value: i64) -> Self {
        self.with_option("max_time_ms", value)
    }

    ///
    /// DIAGNOSTICS AND PLANNING
    ///

    #[must_use]
    pub fn comment(&self, comment: impl Into<String>) -> Self {
        self.with_option("comment", comment.into())
    }

    /// Index hint, keyed by field name.
    #[must_use]
    pub fn hint(&self, hint: Document) -> Self {
        self.with_option("hint", hint)
    }

    #[must_use]
    pub fn collation(&self, collation: Document) -> Self {
        self.with_option("collation", collation)
    }

    ///
    /// PROJECTION
    ///

    /// Include only the given fields.
    #[must_use]
    pub fn only(&self, fields: &[&str]) -> Self {
        self.project_fields(fields, 1)
    }

    /// Exclude the given fields.
    #[must_use]
    pub fn without(&self, fields: &[&str]) -> Self {
        self.project_fields(fields, 0)
    }

    ///
    /// SORTING
    ///

    #[must_use]
    pub fn ascending(&self, fields: &[&str]) -> Self {
        self.sort_with_list(fields, SortDirection::Asc)
    }

    #[must_use]
    pub fn descending(&self, fields: &[&str]) -> Self {
        self.sort_with_list(fields, SortDirection::Desc)
    }

    /// Append sort specifications; later entries for the same field win.
    pub fn order_by<I, S>(&self, specs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SortSpec>,
    {
        let specs: Vec<SortSpec> = specs.into_iter().map(Into::into).collect();

        self.with_change(|query| {
            for spec in specs {
                for (field, direction) in spec.into_pairs()? {
                    query.add_sort_option(&field, direction);
                }
                query.push_sort_stage();
            }
            Ok(())
        })
    }

    /// Drop any existing sort, then `order_by`.
    pub fn reorder<I, S>(&self, specs: I) -> Result<Self, QueryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<SortSpec>,
    {
        let mut cleared = self.clone();
        cleared.options.remove("sort");
        cleared.order_by(specs)
    }

    fn with_option(&self, key: &str, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.options.store(key, value);
        next
    }

    fn project_fields(&self, fields: &[&str], flag: i64) -> Self {
        if fields.is_empty() {
            return self.clone();
        }

        let mut projection = self.options.projection().cloned().unwrap_or_default();
        for field in fields {
            projection.insert(*field, flag);
        }
        self.with_option("fields", projection)
    }

    fn sort_with_list(&self, fields: &[&str], direction: SortDirection) -> Self {
        let mut next = self.clone();
        for field in fields {
            next.add_sort_option(field, direction);
        }
        if !fields.is_empty() {
            next.push_sort_stage();
        }
        next
    }

    fn add_sort_option(&mut self, field: &str, direction: SortDirection) {
        let mut sorting = self.options.sort().cloned().unwrap_or_default();
        sorting.insert(field, direction.as_i64());
        self.options.store("sort", sorting);
    }

    // While aggregating, every sort call also lands in the pipeline.
    fn push_sort_stage(&mut self) {
        if !self.aggregating {
            return;
        }
        if let Some(sort) = self.options.sort() {
            let stage = Value::wrap("$sort", sort.clone());
            self.pipeline.push(stage);
        }
    }
}
