//! Public filter builders.
//!
//! Each builder validates its argument, clones the snapshot, writes into
//! the clone and resets the pending strategy and negation flag. Operator
//! builders go through the static key registry so the same template serves
//! `gt(...)` and a `FieldRef::new("age").gt()` key inside `where_`.

use crate::{
    error::QueryError,
    obs::{self, QueryEvent},
    query::{
        Query,
        criterion::{Criterion, FieldMap},
        key::{self, KeyTemplate},
    },
    value::{Document, Value, is_operator},
};

impl Query {
    ///
    /// GENERAL
    ///

    /// Add conditions.
    ///
    /// A text literal becomes a `$where` script (under `$nor` when
    /// negating). Field maps are expanded and routed key by key: operators
    /// to `add_operator_expression`, fields to `add_field_expression`.
    pub fn where_(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        let criterion = required("where", criterion)?;

        self.with_change(|query| {
            for item in criterion.flatten() {
                match item {
                    Criterion::Literal(Value::Text(script)) => query.js_query(script)?,
                    other => {
                        let expression = other.into_expression("where", query.negating)?;
                        query.add_expressions(expression)?;
                    }
                }
            }
            query.reset_strategies();
            Ok(())
        })
    }

    /// AND the conditions with the existing selector.
    pub fn and(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        let criterion = required("and", criterion)?;

        self.with_change(|query| {
            for item in criterion.flatten() {
                let expression = item.into_expression("and", query.negating)?;
                query.and_document(expression)?;
            }
            query.reset_strategies();
            Ok(())
        })
    }

    /// Alias for `and`.
    pub fn all_of(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.and(criterion)
    }

    /// Add the operands as one `$or` expression.
    pub fn or(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.top_level_operation("or", "$or", criterion)
    }

    /// Add the operands as one `$nor` expression.
    pub fn nor(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.top_level_operation("nor", "$nor", criterion)
    }

    /// AND a disjunction of the operands onto the receiver.
    ///
    /// A single operand behaves like `and`. Unlike `or`, an existing `$or`
    /// is never extended; the new one is nested under `$and` instead.
    pub fn any_of(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        let criterion = required("any_of", criterion)?;

        self.with_change(|query| {
            let mut operands = query.expand_operands("any_of", criterion)?;
            match operands.len() {
                0 => {}
                1 => {
                    if let Some(Value::Document(expression)) = operands.pop() {
                        query.and_document(expression)?;
                    }
                }
                _ => query.and_pair("$or", Value::List(operands))?,
            }
            query.reset_strategies();
            Ok(())
        })
    }

    /// AND a `$nor` of the operands onto the receiver.
    pub fn none_of(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        let criterion = required("none_of", criterion)?;

        self.with_change(|query| {
            let operands = query.expand_operands("none_of", criterion)?;
            if !operands.is_empty() {
                query.and_pair("$nor", Value::List(operands))?;
            }
            query.reset_strategies();
            Ok(())
        })
    }

    /// Negate the next field-level condition.
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(&self) -> Self {
        let mut next = self.clone();
        next.negating = !self.negating;
        next
    }

    /// Negate each field condition.
    ///
    /// An untouched field with a scalar gets `$ne` (`$not` for a regex).
    /// Anything else is ANDed in as `$nor: [{field: value}]` so an existing
    /// compound condition is never partially negated. Null items are
    /// skipped.
    pub fn not_with(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        let criterion = criterion.into();

        self.with_change(|query| {
            query.negating = false;

            for item in criterion.flatten() {
                if item.is_nil() {
                    continue;
                }

                for (field, value) in item.into_expression("not", false)? {
                    let touched = query.selector.lookup(&field).is_some();
                    if touched || is_operator(&field) || value.is_document() {
                        let nor = Value::wrap("$nor", vec![Value::wrap(field, value)]);
                        query.add_logical_operator_expression("$and", vec![nor])?;
                    } else {
                        let operator = if value.is_regex() { "$not" } else { "$ne" };
                        query.override_fields(FieldMap::new().field(field, value), operator)?;
                    }
                }
            }
            query.reset_strategies();
            Ok(())
        })
    }

    ///
    /// COMPARISON
    ///

    pub fn eq(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::EQ, criterion)
    }

    pub fn ne(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::NE, criterion)
    }

    /// Alias for `ne`.
    pub fn excludes(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.ne(criterion)
    }

    pub fn gt(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::GT, criterion)
    }

    pub fn gte(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::GTE, criterion)
    }

    pub fn lt(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::LT, criterion)
    }

    pub fn lte(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::LTE, criterion)
    }

    /// `{field: {"$mod": [divisor, remainder]}}`.
    pub fn mod_(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::MOD, criterion)
    }

    /// `{field: {"$gte": min, "$lte": max}}`, replacing any condition on
    /// the field.
    pub fn between(
        &self,
        field: &str,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Result<Self, QueryError> {
        if is_operator(field) {
            return Err(QueryError::invalid_field_name(field));
        }
        let (min, max) = (min.into(), max.into());

        self.with_change(|query| {
            let mut range = Document::new();
            range.insert("$gte", min);
            range.insert("$lte", max);
            query.selector.store(field, range)?;
            query.reset_strategies();
            Ok(())
        })
    }

    ///
    /// ELEMENT AND ARRAY
    ///

    /// `$exists`; truthy strings and 0/1 are coerced to booleans.
    pub fn exists(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::EXISTS, criterion)
    }

    /// `$size`; numeric strings are coerced to integers.
    pub fn with_size(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::WITH_SIZE, criterion)
    }

    /// `$type`; numeric strings are coerced to integers.
    pub fn with_type(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::WITH_TYPE, criterion)
    }

    pub fn elem_match(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::ELEM_MATCH, criterion)
    }

    /// `$in`. Repeated calls on a field intersect their lists.
    pub fn in_(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.membership_condition(&key::IN, criterion)
    }

    /// Alias for `in_`.
    pub fn any_in(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.in_(criterion)
    }

    /// `$nin`. Repeated calls on a field union their lists.
    pub fn nin(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.membership_condition(&key::NIN, criterion)
    }

    /// Alias for `nin`.
    pub fn not_in(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.nin(criterion)
    }

    /// `$all`. Repeated calls on a field union their lists.
    pub fn all(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.membership_condition(&key::ALL, criterion)
    }

    ///
    /// GEO AND TEXT
    ///

    pub fn near(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::NEAR, criterion)
    }

    pub fn near_sphere(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        self.operator_condition(&key::NEAR_SPHERE, criterion)
    }

    /// Merge geo keys such as `FieldRef::new("loc").intersects_point()`
    /// into the selector.
    pub fn geo_spatial(&self, criterion: impl Into<Criterion>) -> Result<Self, QueryError> {
        let criterion = required("geo_spatial", criterion)?;

        self.with_change(|query| {
            let expression = criterion.into_expression("geo_spatial", query.negating)?;
            query.selector.merge(expression)?;
            query.reset_strategies();
            Ok(())
        })
    }

    /// `{"$text": {"$search": terms, ..options}}`.
    ///
    /// The server allows one `$text` per query. A second call wraps the
    /// prior selector under `$and` next to the new `$text` and records a
    /// `MultipleTextClauses` event; the server rejects the result.
    pub fn text_search(
        &self,
        terms: impl Into<Value>,
        options: Option<Document>,
    ) -> Result<Self, QueryError> {
        let terms = terms.into();
        if terms.is_null() {
            return Err(QueryError::missing_argument("text_search"));
        }

        self.with_change(|query| {
            let mut text = Document::new();
            text.insert("$search", terms);
            if let Some(options) = options {
                text.merge(options);
            }

            if query.selector.contains_key("$text") {
                if query.config.warn_on_multiple_text {
                    obs::sink::record(&QueryEvent::MultipleTextClauses);
                }
                let prior = query.selector.replace(Document::new());
                let mut next = Document::new();
                next.insert("$and", vec![prior]);
                next.insert("$text", text);
                query.selector.replace(next);
            } else {
                query.selector.store("$text", text)?;
            }
            query.reset_strategies();
            Ok(())
        })
    }

    ///
    /// INTERNAL
    ///

    fn operator_condition(
        &self,
        template: &'static KeyTemplate,
        criterion: impl Into<Criterion>,
    ) -> Result<Self, QueryError> {
        let criterion = required(template.symbol, criterion)?;
        let operator = filter_operator(template)?;

        self.with_change(|query| {
            let map = criterion.into_field_map(template.symbol)?;
            match template.transform {
                Some(transform) => query.typed_override(map, operator, transform)?,
                None => query.and_or_override(map, operator)?,
            }
            query.reset_strategies();
            Ok(())
        })
    }

    fn membership_condition(
        &self,
        template: &'static KeyTemplate,
        criterion: impl Into<Criterion>,
    ) -> Result<Self, QueryError> {
        let criterion = required(template.symbol, criterion)?;
        let operator = filter_operator(template)?;

        self.with_change(|query| {
            let map = criterion.into_field_map(template.symbol)?;
            query.membership(map, operator, template.strategy)?;
            query.reset_strategies();
            Ok(())
        })
    }

    fn top_level_operation(
        &self,
        method: &'static str,
        operator: &str,
        criterion: impl Into<Criterion>,
    ) -> Result<Self, QueryError> {
        let criterion = required(method, criterion)?;

        self.with_change(|query| {
            let operands = query.expand_operands(method, criterion)?;
            if !operands.is_empty() {
                query.add_logical_operator_expression(operator, operands)?;
            }
            query.reset_strategies();
            Ok(())
        })
    }

    // One expanded document per flattened criterion; empty ones are dropped.
    fn expand_operands(
        &self,
        method: &'static str,
        criterion: Criterion,
    ) -> Result<Vec<Value>, QueryError> {
        let mut operands = Vec::new();
        for item in criterion.flatten() {
            let expression = item.into_expression(method, self.negating)?;
            if !expression.is_empty() {
                operands.push(Value::Document(expression));
            }
        }

        Ok(operands)
    }

    fn js_query(&mut self, script: String) -> Result<(), QueryError> {
        if self.negating {
            let nor = Value::wrap("$nor", vec![Value::wrap("$where", script)]);
            self.add_operator_expression("$and", Value::List(vec![nor]))
        } else {
            self.add_operator_expression("$where", Value::Text(script))
        }
    }
}

fn required(
    method: &'static str,
    criterion: impl Into<Criterion>,
) -> Result<Criterion, QueryError> {
    let criterion = criterion.into();
    if criterion.is_nil() {
        return Err(QueryError::missing_argument(method));
    }

    Ok(criterion)
}

fn filter_operator(template: &KeyTemplate) -> Result<&'static str, QueryError> {
    template.expr_operator().ok_or_else(|| {
        QueryError::invalid_expression(format!(
            "'{}' is a sort key, not a filter operator",
            template.symbol
        ))
    })
}
