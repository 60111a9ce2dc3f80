//! Mapping raw engine hits to result records.

use common::{
    search_query::FacetSelection,
    search_result::{ResultRecord, SearchResponse},
};
use serde_json::{Map, Value};

use crate::api::search::search_facets::clean_facets;
use crate::config::SearchConfig;
use crate::db_utils::elasticsearch_utils::{RawSearchResult, RawSearchResultHit};
use crate::error::NormalizationError;

/// Thumbnail datastream URI for an object pid, `codu_123` -> `{root}/datastream/codu:123/tn`.
pub fn thumbnail_uri(config: &SearchConfig, pid: &str) -> String {
    let pid = pid.replacen('_', &config.pid_separator.to_string(), 1);
    format!("{}/datastream/{}/tn", config.root_url, pid)
}

/// Shapes a raw engine response. Any failure discards the whole response.
pub fn normalize_response(
    config: &SearchConfig,
    response: RawSearchResult,
    selected: &FacetSelection,
) -> Result<SearchResponse, NormalizationError> {
    let count = response.hits.total.value();
    let facets = clean_facets(response.aggregations.unwrap_or_default(), selected)?;
    let results = response
        .hits
        .hits
        .iter()
        .enumerate()
        .map(|(index, hit)| result_record(config, index, hit))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SearchResponse { results, facets, count })
}

fn result_record(config: &SearchConfig, index: usize, hit: &RawSearchResultHit) -> Result<ResultRecord, NormalizationError> {
    let Value::Object(source) = &hit._source else {
        return Err(NormalizationError::UnexpectedShape { index, field: "_source", value: hit._source.clone() });
    };

    let pid = match source.get("pid") {
        Some(Value::String(pid)) if !pid.is_empty() => pid.clone(),
        None | Some(Value::Null) => return Err(NormalizationError::MissingField { index, field: "pid" }),
        Some(other) => return Err(NormalizationError::UnexpectedShape { index, field: "pid", value: other.clone() }),
    };

    let title = first_string(source, index, "title")?
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| config.no_title_placeholder.clone());

    let display_record = match source.get(&config.display_record_field) {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(record) => record.clone(),
    };

    Ok(ResultRecord {
        title,
        thumbnail_uri: thumbnail_uri(config, &pid),
        object_type: first_string(source, index, "object_type")?.unwrap_or_default(),
        collection: first_string(source, index, "is_member_of_collection")?,
        pid,
        display_record,
    })
}

/// A string field, or the first entry of a string array field.
fn first_string(source: &Map<String, Value>, index: usize, field: &'static str) -> Result<Option<String>, NormalizationError> {
    match source.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Array(values)) => match values.first() {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(NormalizationError::UnexpectedShape { index, field, value: Value::Array(values.clone()) }),
        },
        Some(other) => Err(NormalizationError::UnexpectedShape { index, field, value: other.clone() }),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> SearchConfig {
        let mut config = SearchConfig::new("repo");
        config.root_url = "https://library.example.edu/collections".into();
        config
    }

    fn raw(value: Value) -> RawSearchResult {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn thumbnail_replaces_first_underscore_only() {
        assert_eq!(
            thumbnail_uri(&config(), "codu_123_4"),
            "https://library.example.edu/collections/datastream/codu:123_4/tn"
        );
    }

    #[test]
    fn maps_hits_to_records() {
        let response = normalize_response(
            &config(),
            raw(json!({
                "hits": { "total": 2, "hits": [
                    { "_source": {
                        "pid": "codu_1",
                        "title": "Jazz Age",
                        "object_type": "object",
                        "is_member_of_collection": "codu:root",
                        "display_record": { "creator": "Smith" }
                    } },
                    { "_source": { "pid": "codu_2", "title": ["", "ignored"], "object_type": "object" } }
                ] }
            })),
            &FacetSelection::new(),
        )
        .unwrap();

        assert_eq!(response.count, 2);
        assert_eq!(
            response.results[0],
            ResultRecord {
                title: "Jazz Age".into(),
                thumbnail_uri: "https://library.example.edu/collections/datastream/codu:1/tn".into(),
                pid: "codu_1".into(),
                object_type: "object".into(),
                collection: Some("codu:root".into()),
                display_record: json!({ "creator": "Smith" }),
            }
        );
        assert_eq!(response.results[1].title, "No Title");
        assert_eq!(response.results[1].collection, None);
        assert_eq!(response.results[1].display_record, json!({}));
    }

    #[test]
    fn zero_hits_still_has_results_and_count() {
        let response = normalize_response(
            &config(),
            raw(json!({ "hits": { "total": { "value": 0, "relation": "eq" }, "hits": [] } })),
            &FacetSelection::new(),
        )
        .unwrap();
        assert_eq!(response.count, 0);
        assert!(response.results.is_empty());
        assert!(response.facets.is_empty());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["results"], json!([]));
        assert_eq!(value["count"], json!(0));
    }

    #[test]
    fn custom_display_record_field() {
        let mut config = config();
        config.display_record_field = "display".into();
        let response = normalize_response(
            &config,
            raw(json!({ "hits": { "total": 1, "hits": [
                { "_source": { "pid": "codu_1", "display": { "a": 1 }, "display_record": { "b": 2 } } }
            ] } })),
            &FacetSelection::new(),
        )
        .unwrap();
        assert_eq!(response.results[0].display_record, json!({ "a": 1 }));
    }

    #[test]
    fn missing_pid_fails_the_whole_response() {
        let err = normalize_response(
            &config(),
            raw(json!({ "hits": { "total": 2, "hits": [
                { "_source": { "pid": "codu_1" } },
                { "_source": { "title": "no pid" } }
            ] } })),
            &FacetSelection::new(),
        )
        .unwrap_err();
        assert!(matches!(err, NormalizationError::MissingField { index: 1, field: "pid" }));
    }

    #[test]
    fn unexpected_source_shape_is_an_error() {
        let err = normalize_response(
            &config(),
            raw(json!({ "hits": { "total": 1, "hits": [ { "_source": ["not", "an", "object"] } ] } })),
            &FacetSelection::new(),
        )
        .unwrap_err();
        assert!(matches!(err, NormalizationError::UnexpectedShape { index: 0, field: "_source", .. }));

        let err = normalize_response(
            &config(),
            raw(json!({ "hits": { "total": 1, "hits": [ { "_source": { "pid": "codu_1", "title": 42 } } ] } })),
            &FacetSelection::new(),
        )
        .unwrap_err();
        assert!(matches!(err, NormalizationError::UnexpectedShape { field: "title", .. }));
    }
}
