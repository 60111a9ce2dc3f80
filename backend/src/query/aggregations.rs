//! Facet count aggregations.

use std::collections::BTreeMap;

use crate::config::SearchConfig;
use crate::query::dsl::{Aggregation, TermsAggregation};

/// One terms aggregation per configured facet, over the field's keyword sub-field.
pub fn build_aggregations(config: &SearchConfig) -> BTreeMap<String, Aggregation> {
    config
        .facets
        .iter()
        .map(|(facet, field)| {
            let terms = TermsAggregation { field: format!("{field}.keyword"), size: config.facet_limit };
            (facet.clone(), Aggregation { terms })
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terms_aggregation_per_facet() {
        let mut config = SearchConfig::new("repo");
        config.facet_limit = 25;
        config.facets.insert("Type".into(), "type".into());
        config.facets.insert("Collection".into(), "is_member_of_collection".into());
        assert_eq!(
            serde_json::to_value(build_aggregations(&config)).unwrap(),
            json!({
                "Collection": { "terms": { "field": "is_member_of_collection.keyword", "size": 25 } },
                "Type": { "terms": { "field": "type.keyword", "size": 25 } }
            })
        );
    }

    #[test]
    fn no_facets_means_no_aggregations() {
        assert!(build_aggregations(&SearchConfig::new("repo")).is_empty());
    }
}
