//! Sort clause construction.

use common::search_query::SortSpec;
use tracing::warn;

use crate::config::{SearchConfig, co_occurrence};
use crate::error::ConfigError;
use crate::query::dsl::{Clause, NestedSort, SortClause};

/// Resolves a logical sort key to a keyword-field sort.
///
/// Fields with a `match_field` sort inside their nested records, restricted to
/// the record whose `match_field` equals `match_term`; when the term is missing
/// no sort is applied. `None` leaves results in relevance order.
pub fn build_sort(config: &SearchConfig, sort: Option<&SortSpec>) -> Option<SortClause> {
    let sort = sort?;
    let Some(field) = config.search_sort_fields.get(&sort.field) else {
        warn!("ignoring sort: {}", ConfigError::UnknownSortField(sort.field.clone()));
        return None;
    };
    let keyword_field = format!("{}.keyword", field.path);

    let match_field = field.match_field.as_deref().filter(|f| !f.is_empty());
    if match_field.is_none() {
        return Some(SortClause { field: keyword_field, order: sort.order, nested: None });
    }

    let (match_field, match_term) = co_occurrence(match_field, field.match_term.as_deref())?;
    let path = field.nested_path()?;
    Some(SortClause {
        field: keyword_field,
        order: sort.order,
        nested: Some(NestedSort {
            path: path.to_string(),
            filter: Clause::Term { field: format!("{match_field}.keyword"), value: match_term.to_string() },
        }),
    })
}
