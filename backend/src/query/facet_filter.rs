//! Turning selected facet values into filter clauses.

use std::collections::BTreeSet;

use common::search_query::FacetSelection;
use tracing::warn;

use crate::config::{FacetFilterMode, SearchConfig};
use crate::error::ConfigError;
use crate::query::dsl::Clause;

/// Visited once for every facet that has selected values.
pub trait FacetFilterStrategy: Send + Sync {
    fn visit_facet(&self, index_field: &str, values: &BTreeSet<String>, filters: &mut Vec<Clause>);
}

/// Each selected value is a separate filter, so records must carry every one.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllValues;

impl FacetFilterStrategy for AllValues {
    fn visit_facet(&self, index_field: &str, values: &BTreeSet<String>, filters: &mut Vec<Clause>) {
        filters.extend(values.iter().map(|value| Clause::phrase(index_field, value)));
    }
}

/// One filter per facet; any of its selected values satisfies it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyValueWithinFacet;

impl FacetFilterStrategy for AnyValueWithinFacet {
    fn visit_facet(&self, index_field: &str, values: &BTreeSet<String>, filters: &mut Vec<Clause>) {
        let mut alternatives: Vec<Clause> = values.iter().map(|value| Clause::phrase(index_field, value)).collect();
        match alternatives.len() {
            0 => {}
            1 => filters.append(&mut alternatives),
            _ => filters.push(Clause::should(alternatives)),
        }
    }
}

pub fn strategy_for(mode: FacetFilterMode) -> &'static dyn FacetFilterStrategy {
    match mode {
        FacetFilterMode::AllValues => &AllValues,
        FacetFilterMode::AnyValueWithinFacet => &AnyValueWithinFacet,
    }
}

/// Filters for every selected facet known to the configuration. Unknown facets
/// are logged and skipped.
pub fn facet_filters(config: &SearchConfig, selection: &FacetSelection, strategy: &dyn FacetFilterStrategy) -> Vec<Clause> {
    let mut filters = Vec::new();
    for (facet, values) in selection.iter() {
        match config.facets.get(facet) {
            Some(index_field) => strategy.visit_facet(index_field, values, &mut filters),
            None => warn!("skipping facet filter: {}", ConfigError::UnknownFacet(facet.clone())),
        }
    }
    filters
}


#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SearchConfig {
        let mut config = SearchConfig::new("repo");
        config.facets.insert("Type".into(), "type".into());
        config.facets.insert("Creator".into(), "creator".into());
        config
    }

    fn selection() -> FacetSelection {
        FacetSelection::new()
            .with("Type", "image")
            .with("Type", "text")
            .with("Creator", "Smith")
    }

    #[test]
    fn all_values_emits_one_filter_per_value() {
        let filters = facet_filters(&config(), &selection(), &AllValues);
        assert_eq!(
            filters,
            vec![
                Clause::phrase("creator", "Smith"),
                Clause::phrase("type", "image"),
                Clause::phrase("type", "text"),
            ]
        );
    }

    #[test]
    fn any_value_within_facet_groups_values_of_one_facet() {
        let filters = facet_filters(&config(), &selection(), &AnyValueWithinFacet);
        assert_eq!(
            filters,
            vec![
                Clause::phrase("creator", "Smith"),
                Clause::should(vec![Clause::phrase("type", "image"), Clause::phrase("type", "text")]),
            ]
        );
    }

    #[test]
    fn unknown_facets_are_skipped() {
        let selection = FacetSelection::new().with("Shoe", "blue").with("Type", "image");
        let filters = facet_filters(&config(), &selection, strategy_for(FacetFilterMode::AllValues));
        assert_eq!(filters, vec![Clause::phrase("type", "image")]);
    }
}
