//! Normalized search results handed back to callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    pub results: Vec<ResultRecord>,
    /// Facet name to selectable values. Values already selected and facets
    /// without any remaining values are not present.
    pub facets: BTreeMap<String, Vec<FacetBucket>>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub title: String,
    pub thumbnail_uri: String,
    pub pid: String,
    pub object_type: String,
    pub collection: Option<String>,
    pub display_record: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetBucket {
    pub key: String,
    pub doc_count: u64,
}
