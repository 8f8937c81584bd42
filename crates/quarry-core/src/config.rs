use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// QueryConfig
///
/// Behavior switches carried by value on every query snapshot.
/// Missing keys fall back to the defaults below when loaded from TOML.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// `eq`/`gt`/... replace an existing condition on the field instead of
    /// adding the new operator alongside it.
    pub overwrite_chained_operators: bool,

    /// `and` overwrites a colliding field condition instead of escalating
    /// both conditions into `$and`.
    pub broken_and: bool,

    /// Emit a warning event when a second `$text` clause is merged in.
    pub warn_on_multiple_text: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            overwrite_chained_operators: false,
            broken_and: false,
            warn_on_multiple_text: true,
        }
    }
}

impl QueryConfig {
    /// Parse a configuration table, e.g. the `[query]` section of a service
    /// config file.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|err| ConfigError::Parse {
            message: err.to_string(),
        })
    }

    #[must_use]
    pub const fn with_overwrite_chained_operators(mut self, enabled: bool) -> Self {
        self.overwrite_chained_operators = enabled;
        self
    }

    #[must_use]
    pub const fn with_broken_and(mut self, enabled: bool) -> Self {
        self.broken_and = enabled;
        self
    }

    #[must_use]
    pub const fn with_warn_on_multiple_text(mut self, enabled: bool) -> Self {
        self.warn_on_multiple_text = enabled;
        self
    }
}

///
/// ConfigError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConfigError {
    #[error("invalid query config: {message}")]
    Parse { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_uses_defaults() {
        let config = QueryConfig::from_toml_str("").expect("empty config parses");

        assert_eq!(config, QueryConfig::default());
        assert!(config.warn_on_multiple_text);
    }

    #[test]
    fn partial_table_overrides_named_keys_only() {
        let config = QueryConfig::from_toml_str("overwrite_chained_operators = true\n")
            .expect("config parses");

        assert!(config.overwrite_chained_operators);
        assert!(!config.broken_and);
        assert!(config.warn_on_multiple_text);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = QueryConfig::from_toml_str("legacy_or = true\n").expect_err("unknown key");

        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err =
            QueryConfig::from_toml_str("broken_and = \"yes\"\n").expect_err("string for bool");

        assert!(err.to_string().starts_with("invalid query config"));
    }
}
