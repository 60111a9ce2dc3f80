//! Search request construction: field resolution, clauses, composition,
//! aggregations and sorting.

pub mod aggregations;
pub mod clause;
pub mod compose;
pub mod dsl;
pub mod facet_filter;
pub mod fields;
pub mod sort;

pub use aggregations::build_aggregations;
pub use clause::{ClauseBuilder, PreparedTerms, QueryKind};
pub use compose::QueryComposer;
pub use dsl::{BoolQuery, Clause};
pub use fields::resolve_fields;
pub use sort::build_sort;
