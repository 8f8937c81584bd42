use crate::{
    error::QueryError,
    value::{Document, Value},
};
use std::hash::{Hash, Hasher};

///
/// Strategy
///
/// How a new value combines with one already stored on the same field.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Strategy {
    Override,
    Union,
    Intersect,
    Add,
}

///
/// SortDirection
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_i64(self) -> i64 {
        match self {
            Self::Asc => 1,
            Self::Desc => -1,
        }
    }

    /// Parse `1`/`-1`, `asc`/`desc` or `ascending`/`descending`.
    pub fn from_value(value: &Value) -> Result<Self, QueryError> {
        match value {
            Value::Int(1) => Ok(Self::Asc),
            Value::Int(-1) => Ok(Self::Desc),
            Value::Text(text) => Self::from_text(text),
            other => Err(QueryError::invalid_expression(format!(
                "invalid sort direction: {other:?}"
            ))),
        }
    }

    pub fn from_text(text: &str) -> Result<Self, QueryError> {
        match text.to_ascii_lowercase().as_str() {
            "1" | "asc" | "ascending" => Ok(Self::Asc),
            "-1" | "desc" | "descending" => Ok(Self::Desc),
            _ => Err(QueryError::invalid_expression(format!(
                "invalid sort direction: '{text}'"
            ))),
        }
    }
}

///
/// KeyOperator
///
/// A filter operator such as `$gt`, or a sort direction when the key is
/// used as a sort specification.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum KeyOperator {
    Expr(&'static str),
    Direction(SortDirection),
}

///
/// KeyTemplate
///
/// Compile-time operator registration. One template exists per symbolic
/// operator name and is shared by every `Key` built from it.
///

#[derive(Clone, Copy, Debug)]
pub struct KeyTemplate {
    pub symbol: &'static str,
    pub strategy: Strategy,
    pub operator: KeyOperator,
    pub expanded: Option<&'static str>,
    pub transform: Option<fn(Value) -> Value>,
}

impl KeyTemplate {
    const fn expr(symbol: &'static str, strategy: Strategy, operator: &'static str) -> Self {
        Self {
            symbol,
            strategy,
            operator: KeyOperator::Expr(operator),
            expanded: None,
            transform: None,
        }
    }

    const fn transformed(mut self, transform: fn(Value) -> Value) -> Self {
        self.transform = Some(transform);
        self
    }

    const fn expanded(mut self, expanded: &'static str) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// The filter operator, or `None` for sort keys.
    #[must_use]
    pub const fn expr_operator(&self) -> Option<&'static str> {
        match self.operator {
            KeyOperator::Expr(op) => Some(op),
            KeyOperator::Direction(_) => None,
        }
    }
}

// ----------------------------------------------------------------------
// Registry
// ----------------------------------------------------------------------

pub(crate) const ALL: KeyTemplate = KeyTemplate::expr("all", Strategy::Union, "$all");
pub(crate) const ELEM_MATCH: KeyTemplate =
    KeyTemplate::expr("elem_match", Strategy::Override, "$elemMatch");
pub(crate) const EQ: KeyTemplate = KeyTemplate::expr("eq", Strategy::Override, "$eq");
pub(crate) const EXISTS: KeyTemplate =
    KeyTemplate::expr("exists", Strategy::Override, "$exists").transformed(evolve_boolean);
pub(crate) const GT: KeyTemplate = KeyTemplate::expr("gt", Strategy::Override, "$gt");
pub(crate) const GTE: KeyTemplate = KeyTemplate::expr("gte", Strategy::Override, "$gte");
pub(crate) const IN: KeyTemplate = KeyTemplate::expr("in", Strategy::Intersect, "$in");
pub(crate) const LT: KeyTemplate = KeyTemplate::expr("lt", Strategy::Override, "$lt");
pub(crate) const LTE: KeyTemplate = KeyTemplate::expr("lte", Strategy::Override, "$lte");
pub(crate) const MOD: KeyTemplate = KeyTemplate::expr("mod", Strategy::Override, "$mod");
pub(crate) const NE: KeyTemplate = KeyTemplate::expr("ne", Strategy::Override, "$ne");
pub(crate) const NEAR: KeyTemplate = KeyTemplate::expr("near", Strategy::Override, "$near");
pub(crate) const NEAR_SPHERE: KeyTemplate =
    KeyTemplate::expr("near_sphere", Strategy::Override, "$nearSphere");
pub(crate) const NIN: KeyTemplate = KeyTemplate::expr("nin", Strategy::Union, "$nin");
pub(crate) const NOT: KeyTemplate = KeyTemplate::expr("not", Strategy::Override, "$not");
pub(crate) const WITH_SIZE: KeyTemplate =
    KeyTemplate::expr("with_size", Strategy::Override, "$size").transformed(evolve_integer);
pub(crate) const WITH_TYPE: KeyTemplate =
    KeyTemplate::expr("with_type", Strategy::Override, "$type").transformed(evolve_integer);
pub(crate) const INTERSECTS_LINE: KeyTemplate =
    KeyTemplate::expr("intersects_line", Strategy::Override, "$geoIntersects")
        .expanded("$geometry")
        .transformed(line_string);
pub(crate) const INTERSECTS_POINT: KeyTemplate =
    KeyTemplate::expr("intersects_point", Strategy::Override, "$geoIntersects")
        .expanded("$geometry")
        .transformed(point);
pub(crate) const INTERSECTS_POLYGON: KeyTemplate =
    KeyTemplate::expr("intersects_polygon", Strategy::Override, "$geoIntersects")
        .expanded("$geometry")
        .transformed(polygon);
pub(crate) const WITHIN_POLYGON: KeyTemplate =
    KeyTemplate::expr("within_polygon", Strategy::Override, "$geoWithin")
        .expanded("$geometry")
        .transformed(polygon);
pub(crate) const WITHIN_BOX: KeyTemplate =
    KeyTemplate::expr("within_box", Strategy::Override, "$geoWithin").expanded("$box");
pub(crate) const ASC: KeyTemplate = KeyTemplate {
    symbol: "asc",
    strategy: Strategy::Override,
    operator: KeyOperator::Direction(SortDirection::Asc),
    expanded: None,
    transform: None,
};
pub(crate) const DESC: KeyTemplate = KeyTemplate {
    symbol: "desc",
    strategy: Strategy::Override,
    operator: KeyOperator::Direction(SortDirection::Desc),
    expanded: None,
    transform: None,
};

static KEY_TEMPLATES: [KeyTemplate; 24] = [
    ALL,
    ELEM_MATCH,
    EQ,
    EXISTS,
    GT,
    GTE,
    IN,
    LT,
    LTE,
    MOD,
    NE,
    NEAR,
    NEAR_SPHERE,
    NIN,
    NOT,
    WITH_SIZE,
    WITH_TYPE,
    INTERSECTS_LINE,
    INTERSECTS_POINT,
    INTERSECTS_POLYGON,
    WITHIN_POLYGON,
    WITHIN_BOX,
    ASC,
    DESC,
];

/// Look up a registered operator template by its symbolic name.
#[must_use]
pub fn key_template(symbol: &str) -> Option<&'static KeyTemplate> {
    KEY_TEMPLATES.iter().find(|template| template.symbol == symbol)
}

/// Every registered template, in registration order.
#[must_use]
pub fn key_templates() -> &'static [KeyTemplate] {
    &KEY_TEMPLATES
}

///
/// Key
///
/// An operator template bound to a field name. Two keys are equal when
/// their field name, operator and expanded operator match.
///

#[derive(Clone, Debug)]
pub struct Key {
    name: String,
    template: KeyTemplate,
}

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>, template: &KeyTemplate) -> Self {
        Self {
            name: name.into(),
            template: *template,
        }
    }

    /// Bind a registered template by symbol, e.g. `Key::lookup("age", "gt")`.
    #[must_use]
    pub fn lookup(name: impl Into<String>, symbol: &str) -> Option<Self> {
        key_template(symbol).map(|template| Self::new(name, template))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.template.strategy
    }

    #[must_use]
    pub const fn operator(&self) -> KeyOperator {
        self.template.operator
    }

    #[must_use]
    pub const fn expanded(&self) -> Option<&'static str> {
        self.template.expanded
    }

    /// Turn a raw value into this key's operator expression.
    ///
    /// transform → wrap under the expanded operator → wrap under the
    /// operator → wrap under `$not` when negating (unless already `$not`).
    pub fn apply_to(&self, value: Value, negating: bool) -> Result<Value, QueryError> {
        let KeyOperator::Expr(operator) = self.template.operator else {
            return Err(QueryError::invalid_expression(format!(
                "sort key '{}' cannot be used as a filter condition",
                self.name
            )));
        };

        let mut expr = match self.template.transform {
            Some(transform) => transform(value),
            None => value,
        };
        if let Some(expanded) = self.template.expanded {
            expr = Value::wrap(expanded, expr);
        }
        expr = Value::wrap(operator, expr);
        if negating && operator != "$not" {
            expr = Value::wrap("$not", expr);
        }

        Ok(expr)
    }

    /// `{name: apply_to(value)}`.
    pub fn expr_part(&self, value: Value, negating: bool) -> Result<Document, QueryError> {
        let mut part = Document::new();
        part.insert(self.name.clone(), self.apply_to(value, negating)?);

        Ok(part)
    }

    /// `(name, direction)` when this key carries a sort direction.
    #[must_use]
    pub fn sort_pair(&self) -> Option<(&str, SortDirection)> {
        match self.template.operator {
            KeyOperator::Direction(direction) => Some((self.name.as_str(), direction)),
            KeyOperator::Expr(_) => None,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.template.operator == other.template.operator
            && self.template.expanded == other.template.expanded
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.template.operator.hash(state);
        self.template.expanded.hash(state);
    }
}

// ----------------------------------------------------------------------
// Transforms
// ----------------------------------------------------------------------

/// Coerce truthy/falsy literals to booleans; other values pass through.
pub(crate) fn evolve_boolean(value: Value) -> Value {
    match value {
        Value::Int(1) => Value::Bool(true),
        Value::Int(0) => Value::Bool(false),
        Value::Text(text) => match text.to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" | "1.0" => Value::Bool(true),
            "false" | "f" | "no" | "n" | "0" | "0.0" => Value::Bool(false),
            _ => Value::Text(text),
        },
        Value::List(items) => Value::List(items.into_iter().map(evolve_boolean).collect()),
        other => other,
    }
}

/// Coerce numeric strings and floats to integers; other values pass through.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn evolve_integer(value: Value) -> Value {
    match value {
        Value::Float(f) if f.is_finite() => Value::Int(f.trunc() as i64),
        Value::Text(text) => match text.trim().parse::<i64>() {
            Ok(n) => Value::Int(n),
            Err(_) => Value::Text(text),
        },
        Value::List(items) => Value::List(items.into_iter().map(evolve_integer).collect()),
        other => other,
    }
}

fn geo_shape(kind: &'static str, coordinates: Value) -> Value {
    let mut shape = Document::new();
    shape.insert("type", kind);
    shape.insert("coordinates", coordinates);

    Value::Document(shape)
}

fn line_string(value: Value) -> Value {
    geo_shape("LineString", value)
}

fn point(value: Value) -> Value {
    geo_shape("Point", value)
}

fn polygon(value: Value) -> Value {
    geo_shape("Polygon", value)
}
