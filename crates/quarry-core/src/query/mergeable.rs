//! Strategy dispatch and negation.
//!
//! `intersect()`, `union()` and `override_()` set a strategy for exactly
//! the next builder call. The strategy decides how a freshly prepared
//! `{operator: value}` fragment combines with what the field already holds.

use crate::{
    error::QueryError,
    query::{
        Query,
        criterion::FieldMap,
        key::Strategy,
        selector::{self, is_multi_selection},
    },
    value::{self as algebra, Document, Value, is_operator},
};

/// Operators whose values skip the field normalizer.
const NON_VALUE_OPERATORS: [&str; 3] = ["$exists", "$type", "$size"];

impl Query {
    /// Intersect the next condition with the existing one.
    #[must_use]
    pub fn intersect(&self) -> Self {
        self.using(Strategy::Intersect)
    }

    /// Union the next condition with the existing one.
    #[must_use]
    pub fn union(&self) -> Self {
        self.using(Strategy::Union)
    }

    /// Let the next condition override the existing one.
    #[must_use]
    pub fn override_(&self) -> Self {
        self.using(Strategy::Override)
    }

    /// Set an arbitrary strategy, including `Strategy::Add`, for the next call.
    #[must_use]
    pub fn using(&self, strategy: Strategy) -> Self {
        let mut next = self.clone();
        next.strategy = Some(strategy);
        next
    }

    /// Build `{operator: value}` for a field.
    ///
    /// The value goes through the field normalizer unless the operator is
    /// `$exists`, `$type` or `$size`. Wrapped in `$not` when negating.
    pub(crate) fn prepare(&self, field: &str, operator: &str, value: Value) -> Value {
        let value = if NON_VALUE_OPERATORS.contains(&operator) {
            value
        } else {
            let (_, normalizer) = self.selector.storage_pair(field);
            selector::evolve(normalizer.as_ref(), value)
        };

        let expression = Value::wrap(operator, value);
        if self.negating {
            Value::wrap("$not", expression)
        } else {
            expression
        }
    }

    /// Combine each prepared fragment with the field's existing value.
    pub(crate) fn with_strategy(
        &mut self,
        strategy: Strategy,
        criterion: FieldMap,
        operator: &str,
    ) -> Result<(), QueryError> {
        for (key, value) in criterion {
            let field = key.name().to_string();
            let expression = self.prepare(&field, operator, value);
            let existing = self.selector.lookup(&field).cloned();

            let combined = match strategy {
                Strategy::Override => override_value(existing, expression),
                Strategy::Union => algebra::union(existing, expression)?,
                Strategy::Intersect => algebra::intersect(existing, expression)?,
                Strategy::Add => algebra::add(existing, expression)?,
            };
            self.selector.store(&field, combined)?;
        }

        Ok(())
    }

    /// Prepare each fragment and merge it into the field, replacing the
    /// same operator if present. Never escalates to `$and`.
    pub(crate) fn override_fields(
        &mut self,
        criterion: FieldMap,
        operator: &str,
    ) -> Result<(), QueryError> {
        self.with_strategy(Strategy::Override, criterion, operator)
    }

    /// Add each fragment as a further condition through `and`.
    pub(crate) fn and_with_operator(
        &mut self,
        criterion: FieldMap,
        operator: &str,
    ) -> Result<(), QueryError> {
        for (key, value) in criterion {
            let field = key.name().to_string();
            let expression = self.prepare(&field, operator, value);
            self.and_pair(&field, expression)?;
        }

        Ok(())
    }

    /// `override_fields` or `and_with_operator`, depending on
    /// `overwrite_chained_operators`.
    pub(crate) fn and_or_override(
        &mut self,
        criterion: FieldMap,
        operator: &str,
    ) -> Result<(), QueryError> {
        if self.config.overwrite_chained_operators {
            self.override_fields(criterion, operator)
        } else {
            self.and_with_operator(criterion, operator)
        }
    }

    /// Transform values, then `and_or_override`.
    pub(crate) fn typed_override(
        &mut self,
        criterion: FieldMap,
        operator: &str,
        transform: fn(Value) -> Value,
    ) -> Result<(), QueryError> {
        self.and_or_override(criterion.map_values(transform), operator)
    }

    /// Membership builders: `$in`, `$nin` and `$all`.
    ///
    /// A pending strategy always applies. Otherwise `default` applies when
    /// the field is empty or already holds operators, and the condition is
    /// written as a field expression (escalating on collision) when the
    /// field holds a literal.
    pub(crate) fn membership(
        &mut self,
        criterion: FieldMap,
        operator: &str,
        default: Strategy,
    ) -> Result<(), QueryError> {
        let criterion = criterion.map_values(|value| Value::List(value.into_array_form()));

        if let Some(strategy) = self.strategy {
            return self.with_strategy(strategy, criterion, operator);
        }

        for (key, value) in criterion {
            let field = key.name().to_string();
            let combinable = match self.selector.lookup(&field) {
                None => true,
                Some(Value::Document(existing)) => existing.is_operator_map(),
                Some(_) => false,
            };

            if combinable {
                self.with_strategy(default, FieldMap::new().field(field, value), operator)?;
            } else {
                let mut expression = Value::wrap(operator, value);
                if self.negating {
                    expression = Value::wrap("$not", expression);
                }
                self.add_field_expression(&field, expression)?;
            }
        }

        Ok(())
    }

    /// Merge an already-expanded pair with `and` semantics.
    ///
    /// Untouched fields are stored; disjoint operator maps merge; equal
    /// values are a no-op; anything else escalates to `$and`. With
    /// `broken_and` a colliding condition overwrites instead.
    pub(crate) fn and_pair(&mut self, key: &str, value: Value) -> Result<(), QueryError> {
        if is_operator(key) {
            return self.and_operator(key, value);
        }

        let Some(existing) = self.selector.lookup(key) else {
            return self.selector.store(key, value);
        };

        if *existing == value {
            return Ok(());
        }

        if self.config.broken_and {
            return self.selector.store(key, value);
        }

        let merged = match (existing, &value) {
            (Value::Document(current), Value::Document(incoming))
                if current.is_operator_map()
                    && incoming.is_operator_map()
                    && incoming.keys().all(|op| !current.contains_key(op)) =>
            {
                let mut merged = current.clone();
                merged.merge(incoming.clone());
                Some(merged)
            }
            _ => None,
        };

        match merged {
            Some(merged) => self.selector.store(key, merged),
            None => self.escalate_field(key, value),
        }
    }

    /// Merge an already-expanded document with `and` semantics.
    pub(crate) fn and_document(&mut self, expression: Document) -> Result<(), QueryError> {
        for (key, value) in expression {
            self.and_pair(&key, value)?;
        }

        Ok(())
    }

    // Operator keys under `and`: `$and` operands append; any other operator
    // that is already present is nested under `$and`.
    fn and_operator(&mut self, operator: &str, value: Value) -> Result<(), QueryError> {
        if operator == "$and" {
            return self.add_operator_expression(operator, value);
        }

        if self.selector.contains_key(operator) {
            let nested = Value::wrap(operator, value);
            return self.add_logical_operator_expression("$and", vec![nested]);
        }

        if is_multi_selection(operator) && !matches!(value, Value::List(_)) {
            return Err(QueryError::invalid_expression(format!(
                "value of '{operator}' must be a list of documents, got {value:?}"
            )));
        }

        self.selector.store(operator, value)
    }
}

// Override merges into an existing operator map, otherwise replaces.
fn override_value(existing: Option<Value>, expression: Value) -> Value {
    match (existing, expression) {
        (Some(Value::Document(mut current)), Value::Document(incoming))
            if current.is_operator_map() =>
        {
            current.merge(incoming);
            Value::Document(current)
        }
        (_, expression) => expression,
    }
}
