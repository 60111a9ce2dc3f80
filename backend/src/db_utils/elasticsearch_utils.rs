//! Elasticsearch response types and HTTP client.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::config::SearchConfig;
use crate::db_utils::{EngineRequest, SearchBackend};
use crate::error::SearchError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchResult {
    pub hits: RawSearchResultHits,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub aggregations: Option<BTreeMap<String, RawSearchResultAggregation>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchResultHits {
    pub total: RawHitsTotal,
    #[serde(default)]
    pub hits: Vec<RawSearchResultHit>,
}

/// Engines before 7.0 report a bare count, later ones a `{value, relation}` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawHitsTotal {
    Count(u64),
    Tracked {
        value: u64,
        #[serde(default)]
        relation: String,
    },
}

impl RawHitsTotal {
    pub fn value(&self) -> u64 {
        match self {
            RawHitsTotal::Count(count) => *count,
            RawHitsTotal::Tracked { value, .. } => *value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSearchResultHit {
    #[serde(default)]
    pub _id: Option<String>,
    #[serde(default)]
    pub _score: Option<f64>,
    /// Left untyped; its shape is checked during normalization.
    #[serde(default)]
    pub _source: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct RawSearchResultAggregation {
    #[serde(default)]
    pub buckets: Vec<RawSearchResultAggregationBucket>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RawSearchResultAggregationBucket {
    pub key: serde_json::Value,
    pub doc_count: u64,
}

/// Parses an engine response body, telling an absent response apart from a malformed one.
pub fn parse_raw_response(body: &str) -> Result<RawSearchResult, SearchError> {
    if body.trim().is_empty() {
        return Err(SearchError::UndefinedResponse);
    }
    let value: serde_json::Value = serde_json::from_str(body).map_err(SearchError::MalformedResponse)?;
    if value.is_null() {
        return Err(SearchError::UndefinedResponse);
    }
    serde_json::from_value(value).map_err(SearchError::MalformedResponse)
}

#[derive(Debug, Clone)]
pub struct ElasticsearchClient {
    client: reqwest::Client,
    base_url: String,
}

impl ElasticsearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self { client, base_url: config.elasticsearch_url.trim_end_matches('/').to_string() })
    }

    pub fn search_url(&self, request: &EngineRequest) -> String {
        match request.document_type.as_deref().filter(|t| !t.is_empty()) {
            Some(document_type) => format!("{}/{}/{}/_search", self.base_url, request.index, document_type),
            None => format!("{}/{}/_search", self.base_url, request.index),
        }
    }
}

#[async_trait]
impl SearchBackend for ElasticsearchClient {
    async fn search(&self, request: &EngineRequest) -> Result<RawSearchResult, SearchError> {
        let url = self.search_url(request);
        if tracing::enabled!(tracing::Level::DEBUG) {
            debug!("SEARCH REQUEST: {} {}", url, serde_json::to_string(request).unwrap_or_default());
        }
        let t0 = std::time::Instant::now();

        let response = self.client.post(&url).json(request).send().await?;
        let status = response.status();
        let response_txt = response.text().await?;
        if status.is_client_error() || status.is_server_error() {
            error!("search engine returned {}: {}", status, response_txt);
            return Err(SearchError::Status { status: status.as_u16(), body: response_txt });
        }

        let dt_ms = t0.elapsed().as_millis();
        info!("SEARCH RESPONSE: len = {} (searched in {}ms)", response_txt.len(), dt_ms);
        parse_raw_response(&response_txt)
    }
}
