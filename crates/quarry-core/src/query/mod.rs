//! Query construction.
//!
//! `Query` is an immutable snapshot. Every builder call clones the
//! snapshot, mutates the clone and returns it, so sibling chains derived
//! from the same snapshot never observe each other's changes.
//!
//! The builder surface is split by layer:
//! - `storable`   low-level selector writes with `$and` collision handling
//! - `mergeable`  strategy dispatch and negation
//! - `selectable` the public filter builders
//! - `optional`   plain query options
//! - `aggregable` aggregation pipeline stages

mod aggregable;
pub mod contradiction;
pub mod criterion;
pub mod field;
pub mod key;
mod mergeable;
mod optional;
pub mod options;
pub mod pipeline;
pub mod resolver;
mod selectable;
pub mod selector;
pub mod smash;
mod storable;

#[cfg(test)]
mod tests;

use crate::{
    config::QueryConfig,
    error::QueryError,
    obs::{self, QueryEvent},
    query::key::Strategy,
};

// re-exports
pub use criterion::{Criterion, CriterionKey, FieldMap};
pub use field::FieldRef;
pub use key::{Key, KeyOperator, KeyTemplate, SortDirection, key_template, key_templates};
pub use optional::SortSpec;
pub use options::Options;
pub use pipeline::Pipeline;
pub use resolver::{
    FieldCatalog, FieldResolver, Fields, FixedLocale, LocaleProvider, Normalizer, Passthrough,
    ResolvedField,
};
pub use selector::Selector;
pub use smash::Smash;

///
/// Query
///
/// Selector, options and pipeline plus the two pieces of pending builder
/// state: the negation flag and the strategy for the next call. Both are
/// consumed by the next field-level call.
///

#[derive(Clone, Debug, Default)]
pub struct Query {
    selector: Selector,
    options: Options,
    pipeline: Pipeline,
    aggregating: bool,
    negating: bool,
    strategy: Option<Strategy>,
    config: QueryConfig,
}

impl Query {
    /// Empty query with identity field resolution and default config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty query resolving field names through `fields`.
    #[must_use]
    pub fn with_fields(fields: Fields) -> Self {
        Self {
            selector: Selector::new(fields.clone()),
            options: Options::new(fields.clone()),
            pipeline: Pipeline::new(fields),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    #[must_use]
    pub const fn options(&self) -> &Options {
        &self.options
    }

    #[must_use]
    pub const fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[must_use]
    pub const fn config(&self) -> &QueryConfig {
        &self.config
    }

    #[must_use]
    pub fn fields(&self) -> &Fields {
        self.selector.fields()
    }

    #[must_use]
    pub const fn is_negating(&self) -> bool {
        self.negating
    }

    #[must_use]
    pub const fn is_aggregating(&self) -> bool {
        self.aggregating
    }

    /// Strategy pending for the next call, if any.
    #[must_use]
    pub const fn strategy(&self) -> Option<Strategy> {
        self.strategy
    }

    /// Whether the selector can never match; records a
    /// `ContradictionDetected` event when it cannot.
    #[must_use]
    pub fn is_contradicted(&self) -> bool {
        let contradicted = self.selector.is_contradicted();
        if contradicted {
            obs::sink::record(&QueryEvent::ContradictionDetected);
        }

        contradicted
    }

    ///
    /// SNAPSHOTS
    ///

    /// Clone the snapshot, apply `change` to the clone and return it.
    /// The receiver is never modified, even when `change` fails.
    pub fn with_change(
        &self,
        change: impl FnOnce(&mut Self) -> Result<(), QueryError>,
    ) -> Result<Self, QueryError> {
        let mut next = self.clone();
        change(&mut next)?;

        Ok(next)
    }

    /// Clear the pending strategy and negation flag.
    pub(crate) const fn reset_strategies(&mut self) {
        self.strategy = None;
        self.negating = false;
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.selector == other.selector
            && self.options == other.options
            && self.pipeline == other.pipeline
    }
}
