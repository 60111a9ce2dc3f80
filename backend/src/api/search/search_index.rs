//! The search entry point: compose, execute, normalize.

use std::sync::Arc;

use common::{search_query::SearchQuery, search_result::SearchResponse};
use tracing::{debug, error, instrument};

use crate::api::search::search_for_results::normalize_response;
use crate::config::SearchConfig;
use crate::db_utils::{ElasticsearchClient, EngineRequest, SearchBackend};
use crate::query::{QueryComposer, build_aggregations, build_sort};
use crate::Result;

pub struct SearchService<B = ElasticsearchClient> {
    config: Arc<SearchConfig>,
    backend: B,
}

impl SearchService<ElasticsearchClient> {
    pub fn from_config(config: Arc<SearchConfig>) -> Result<Self> {
        let backend = ElasticsearchClient::new(&config)?;
        Ok(Self::new(config, backend))
    }
}

impl<B: SearchBackend> SearchService<B> {
    pub fn new(config: Arc<SearchConfig>, backend: B) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The engine request for a query, without executing it.
    pub fn build_request(&self, query: &SearchQuery) -> EngineRequest {
        let config = self.config.as_ref();
        EngineRequest {
            index: config.public_index.clone(),
            document_type: config.index_type.clone(),
            from: query.pagination.offset(),
            size: query.pagination.size(),
            query: QueryComposer::new(config).compose(query),
            sort: build_sort(config, query.sort.as_ref()).into_iter().collect(),
            aggregations: build_aggregations(config),
        }
    }

    #[instrument(skip_all, fields(page = query.pagination.page.get(), page_size = query.pagination.page_size.get()))]
    pub async fn search_index(&self, query: &SearchQuery) -> Result<SearchResponse> {
        let request = self.build_request(query);
        debug!("composed query: {}", serde_json::to_string(&request.query).unwrap_or_default());

        let response = self.backend.search(&request).await.map_err(|e| {
            error!("search_index: request failed: {}", e);
            e
        })?;

        let response = normalize_response(&self.config, response, &query.facets).map_err(|e| {
            error!("search_index: could not normalize response: {}", e);
            e
        })?;
        Ok(response)
    }

    /// Runs the search and hands the outcome to `callback`.
    pub async fn search_index_then<F, R>(&self, query: &SearchQuery, callback: F) -> R
    where
        F: FnOnce(Result<SearchResponse>) -> R,
    {
        callback(self.search_index(query).await)
    }
}
