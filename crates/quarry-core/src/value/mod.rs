mod algebra;
mod document;

#[cfg(test)]
mod tests;

use serde::{Serialize, Serializer, ser::SerializeMap};
use std::fmt;

// re-exports
pub use algebra::{add, intersect, union};
pub use document::{Document, is_operator};

///
/// Regex
///
/// Pattern literal carried through to the wire unchanged.
/// The engine never compiles or evaluates it; it only needs to tell a
/// regex apart from other scalars when choosing `$not` over `$ne`.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Regex {
    pub pattern: String,
    pub options: String,
}

impl Regex {
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            options: String::new(),
        }
    }

    #[must_use]
    pub fn with_options(pattern: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            options: options.into(),
        }
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.options)
    }
}

///
/// Value
///
/// Closed set of shapes a selector, option or pipeline entry can hold.
///
/// Null      → explicit null; `in` treats it as a one-element list.
/// List      → ordered; order is preserved by every combination rule.
/// Document  → nested map, either an embedded document or an operator
///             expression such as `{"$gt": 5}`.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Regex(Regex),
    List(Vec<Self>),
    Document(Document),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a single-entry document value: `{key: value}`.
    pub fn wrap(key: impl Into<String>, value: impl Into<Self>) -> Self {
        let mut document = Document::new();
        document.insert(key, value);

        Self::Document(document)
    }

    ///
    /// SHAPE
    ///

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_regex(&self) -> bool {
        matches!(self, Self::Regex(_))
    }

    #[must_use]
    pub const fn is_document(&self) -> bool {
        matches!(self, Self::Document(_))
    }

    /// Anything that is neither a list nor a document.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Document(_))
    }

    #[must_use]
    pub const fn as_document(&self) -> Option<&Document> {
        match self {
            Self::Document(document) => Some(document),
            _ => None,
        }
    }

    pub const fn as_document_mut(&mut self) -> Option<&mut Document> {
        match self {
            Self::Document(document) => Some(document),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_document(self) -> Option<Document> {
        match self {
            Self::Document(document) => Some(document),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Lower to a list: lists stay as they are, anything else becomes a
    /// one-element list.
    #[must_use]
    pub fn into_array_form(self) -> Vec<Self> {
        match self {
            Self::List(items) => items,
            other => vec![other],
        }
    }

    /// Remove duplicates, keeping the first occurrence of each value.
    #[must_use]
    pub fn dedup_list(items: Vec<Self>) -> Vec<Self> {
        let mut out: Vec<Self> = Vec::with_capacity(items.len());
        for item in items {
            if !out.contains(&item) {
                out.push(item);
            }
        }

        out
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Regex(regex) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("$regex", &regex.pattern)?;
                map.serialize_entry("$options", &regex.options)?;
                map.end()
            }
            Self::List(items) => items.serialize(serializer),
            Self::Document(document) => document.serialize(serializer),
        }
    }
}

///
/// CONVERSIONS
///

macro_rules! impl_from_int {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Regex> for Value {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

impl From<Document> for Value {
    fn from(value: Document) -> Self {
        Self::Document(value)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::from_list(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
