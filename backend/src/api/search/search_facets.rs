//! Facet bucket cleanup for the facet panel.

use std::collections::{BTreeMap, HashSet};

use common::{search_query::FacetSelection, search_result::FacetBucket};

use crate::db_utils::elasticsearch_utils::RawSearchResultAggregation;
use crate::error::NormalizationError;

/// Reshapes the aggregation buckets into selectable facet values.
///
/// Values already selected for a facet are not offered again, empty and
/// repeated keys are dropped, and a facet left with no values is removed.
/// Bucket order from the engine is kept.
pub fn clean_facets(
    aggregations: BTreeMap<String, RawSearchResultAggregation>,
    selected: &FacetSelection,
) -> Result<BTreeMap<String, Vec<FacetBucket>>, NormalizationError> {
    let mut facets = BTreeMap::new();
    for (facet, aggregation) in aggregations {
        let mut present_values = HashSet::new();
        let mut buckets = Vec::new();
        for bucket in aggregation.buckets {
            let key = match &bucket.key {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => return Err(NormalizationError::InvalidFacetKey { facet, key: bucket.key.clone() }),
            };
            if key.is_empty() || selected.contains(&facet, &key) || !present_values.insert(key.clone()) {
                continue;
            }
            buckets.push(FacetBucket { key, doc_count: bucket.doc_count });
        }
        if !buckets.is_empty() {
            facets.insert(facet, buckets);
        }
    }
    Ok(facets)
}
