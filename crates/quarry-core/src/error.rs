use std::fmt;
use thiserror::Error as ThisError;

///
/// QueryError
///
/// Local, synchronous failure raised at the offending builder call.
/// Nothing inside the engine retries or recovers; callers either validate
/// up front or surface the error as a query-construction failure.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum QueryError {
    #[error("'{method}' requires an argument, none was given")]
    MissingArgument { method: &'static str },

    #[error("invalid query expression: {message}")]
    InvalidExpression { message: String },

    #[error("unsupported value combination: {message}")]
    UnsupportedCombination { message: String },

    #[error("field name cannot be an operator (begin with '$'): '{field}'")]
    InvalidFieldName { field: String },
}

impl QueryError {
    pub(crate) const fn missing_argument(method: &'static str) -> Self {
        Self::MissingArgument { method }
    }

    pub(crate) fn invalid_expression(message: impl Into<String>) -> Self {
        Self::InvalidExpression {
            message: message.into(),
        }
    }

    pub(crate) fn unsupported_combination(message: impl Into<String>) -> Self {
        Self::UnsupportedCombination {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_field_name(field: impl Into<String>) -> Self {
        Self::InvalidFieldName {
            field: field.into(),
        }
    }

    /// Classify the failure: bad input vs. a bug in the calling layer.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::MissingArgument { .. }
            | Self::InvalidExpression { .. }
            | Self::InvalidFieldName { .. } => ErrorClass::Usage,
            Self::UnsupportedCombination { .. } => ErrorClass::InvariantViolation,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}: {self}", self.class())
    }
}

///
/// ErrorClass
/// Error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Usage,
    InvariantViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Usage => "usage",
            Self::InvariantViolation => "invariant_violation",
        };
        write!(f, "{label}")
    }
}
