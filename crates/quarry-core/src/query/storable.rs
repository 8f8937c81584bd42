//! Non-negating selector writes.
//!
//! These never look at the negation flag; callers resolve negation before
//! calling in. A collision on a field or operator escalates to `$and`.

use crate::{
    error::QueryError,
    obs::{self, QueryEvent},
    query::{Query, selector::is_multi_selection},
    value::{Document, Value, is_operator},
};

impl Query {
    /// Write a field-level condition.
    ///
    /// Disjoint operator maps on the same field are merged; an identical
    /// value is a no-op; anything else moves both conditions under `$and`.
    pub(crate) fn add_field_expression(
        &mut self,
        field: &str,
        value: Value,
    ) -> Result<(), QueryError> {
        if is_operator(field) {
            return Err(QueryError::invalid_field_name(field));
        }

        match self.selector.lookup(field) {
            None => self.selector.store(field, value),
            Some(existing) if *existing == value => Ok(()),
            Some(Value::Document(existing)) if can_merge_operators(existing, &value) => {
                let mut merged = existing.clone();
                if let Value::Document(incoming) = value {
                    merged.merge(incoming);
                }
                self.selector.store(field, merged)
            }
            Some(_) => self.escalate_field(field, value),
        }
    }

    /// Write `$and`, `$or` or `$nor` operands.
    ///
    /// A selector holding only the same operator has the operands appended.
    /// `$and` (or any operator on an empty selector) composes at the top
    /// level. `$or`/`$nor` next to unrelated conditions are stored directly,
    /// or nested under `$and` when that operator is already present.
    pub(crate) fn add_logical_operator_expression(
        &mut self,
        operator: &str,
        operands: Vec<Value>,
    ) -> Result<(), QueryError> {
        if !is_multi_selection(operator) {
            return Err(QueryError::invalid_expression(format!(
                "'{operator}' is not a logical operator"
            )));
        }

        if self.selector.is_only(operator) || operator == "$and" || self.selector.is_empty() {
            let mut combined = match self.selector.get(operator) {
                Some(Value::List(current)) => current.clone(),
                _ => Vec::new(),
            };
            combined.extend(operands);
            return self.selector.store(operator, Value::List(combined));
        }

        if self.selector.contains_key(operator) {
            let nested = Value::wrap(operator, Value::List(operands));
            self.add_logical_operator_expression("$and", vec![nested])
        } else {
            self.selector.store(operator, Value::List(operands))
        }
    }

    /// Write a top-level operator such as `$where` or `$text`.
    ///
    /// Logical operators delegate to `add_logical_operator_expression`; a
    /// repeated operator is added under `$and`.
    pub(crate) fn add_operator_expression(
        &mut self,
        operator: &str,
        value: Value,
    ) -> Result<(), QueryError> {
        if !is_operator(operator) {
            return Err(QueryError::invalid_expression(format!(
                "'{operator}' is not an operator"
            )));
        }

        if is_multi_selection(operator) {
            let Value::List(operands) = value else {
                return Err(QueryError::invalid_expression(format!(
                    "value of '{operator}' must be a list of documents, got {value:?}"
                )));
            };
            return self.add_logical_operator_expression(operator, operands);
        }

        if self.selector.contains_key(operator) {
            self.add_logical_operator_expression("$and", vec![Value::wrap(operator, value)])
        } else {
            self.selector.store(operator, value)
        }
    }

    /// Route a single expanded pair to the field or operator writer.
    pub(crate) fn add_one_expression(&mut self, key: &str, value: Value) -> Result<(), QueryError> {
        if is_operator(key) {
            self.add_operator_expression(key, value)
        } else {
            self.add_field_expression(key, value)
        }
    }

    /// Route every pair of an expanded document.
    pub(crate) fn add_expressions(&mut self, expression: Document) -> Result<(), QueryError> {
        for (key, value) in expression {
            self.add_one_expression(&key, value)?;
        }

        Ok(())
    }

    /// Move the existing condition on `field` and the incoming one under
    /// `$and`.
    pub(crate) fn escalate_field(&mut self, field: &str, value: Value) -> Result<(), QueryError> {
        obs::sink::record(&QueryEvent::AndEscalation {
            field: field.to_string(),
        });

        let mut operands = Vec::with_capacity(2);
        if let Some(existing) = self.selector.remove(field) {
            operands.push(Value::wrap(field, existing));
        }
        operands.push(Value::wrap(field, value));

        self.add_logical_operator_expression("$and", operands)
    }
}

// Both sides are operator maps and no incoming operator is already set.
fn can_merge_operators(existing: &Document, incoming: &Value) -> bool {
    let Value::Document(incoming) = incoming else {
        return false;
    };

    existing.is_operator_map()
        && incoming.is_operator_map()
        && incoming.keys().all(|op| !existing.contains_key(op))
}
