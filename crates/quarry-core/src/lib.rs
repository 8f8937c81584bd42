//! Core runtime for quarry: query selector construction, merge rules,
//! options and aggregation pipelines, plus the ergonomics exported via the
//! `prelude`.
#![warn(unreachable_pub)]

#[macro_use]
mod macros;

// public exports are one module level down
pub mod config;
pub mod error;
pub mod obs;
pub mod query;
pub mod value;

///
/// Prelude
///
/// Prelude contains only builder vocabulary.
/// No sinks, counters or resolver implementations are re-exported here.
///

pub mod prelude {
    pub use crate::{
        config::QueryConfig,
        doc,
        error::QueryError,
        query::{Criterion, FieldMap, FieldRef, Query, SortSpec},
        value::{Document, Regex, Value},
    };
}
