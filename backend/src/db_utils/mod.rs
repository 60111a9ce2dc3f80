//! Search engine access.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::SearchError;
use crate::query::dsl::{Aggregation, Clause, SortClause};

pub mod elasticsearch_utils;

pub use elasticsearch_utils::{ElasticsearchClient, RawSearchResult};

/// Everything sent to the engine for one search. Only the body fields are serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineRequest {
    #[serde(skip)]
    pub index: String,
    #[serde(skip)]
    pub document_type: Option<String>,
    pub from: u64,
    pub size: u64,
    pub query: Clause,
    pub sort: Vec<SortClause>,
    pub aggregations: BTreeMap<String, Aggregation>,
}

/// A search engine that executes one composed request per call.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(&self, request: &EngineRequest) -> Result<RawSearchResult, SearchError>;
}

#[async_trait]
impl<T: SearchBackend + ?Sized> SearchBackend for Arc<T> {
    async fn search(&self, request: &EngineRequest) -> Result<RawSearchResult, SearchError> {
        self.as_ref().search(request).await
    }
}
