//! ## Crate layout
//! - `core`: value model, selector construction and merge rules, options,
//!   aggregation pipelines, configuration and observability.
//!
//! The `prelude` module mirrors the builder surface used by query-execution
//! layers; resolver implementations and event sinks stay under `core`.

pub use quarry_core as core;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//
// Macros
//

pub use quarry_core::doc;

///
/// Prelude
///

pub mod prelude {
    pub use crate::core::{
        config::QueryConfig,
        doc,
        error::QueryError,
        query::{Criterion, FieldMap, FieldRef, Query, SortSpec, key::Strategy},
        value::{Document, Regex, Value},
    };
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn prelude_builds_a_wire_ready_selector() -> Result<(), QueryError> {
        let age = FieldRef::new("age");
        let query = Query::new()
            .where_(doc! { "status" => "active" })?
            .gt((age.as_str(), 18))?
            .in_(("tags", vec!["a", "b"]))?
            .descending(&["age"])
            .limit(20);

        let encoded = serde_json::to_value(query.selector()).expect("selector serializes");
        assert_eq!(
            encoded,
            serde_json::json!({
                "status": "active",
                "age": { "$gt": 18 },
                "tags": { "$in": ["a", "b"] },
            })
        );
        assert_eq!(query.options().limit(), Some(20));
        Ok(())
    }

    #[test]
    fn version_is_exported() {
        assert!(!super::VERSION.is_empty());
    }
}
