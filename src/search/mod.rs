pub mod bing;
pub mod duckduckgo;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use bing::BingSearch;
use duckduckgo::DuckDuckGoSearch;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error: {0}")]
    Api(String),
    #[error("Parse Error: {0}")]
    Parse(String),
    #[error("Missing API key")]
    MissingKey,
    #[error("Unknown search provider: {0}")]
    UnknownProvider(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        SearchError::Network(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub summary: String,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn run_query(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// Trims `query` and forwards it to `provider`. Blank queries never reach the provider.
pub async fn search(provider: &dyn SearchProvider, query: &str) -> Result<Vec<SearchResult>, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    info!("Running {} search for: {}", provider.name(), query);
    provider.run_query(query).await
}

pub struct SearchProviderFactory;

impl SearchProviderFactory {
    pub fn create_default(config: &AppConfig) -> Result<Arc<dyn SearchProvider>, SearchError> {
        let search = &config.search;

        match search.provider.as_str() {
            "bing" => Ok(Arc::new(BingSearch::new(
                search.bing.api_key.clone(),
                search.bing.api_base.clone(),
                search.max_results,
            )?)),
            "duckduckgo" => Ok(Arc::new(DuckDuckGoSearch::new(search.max_results)?)),
            other => Err(SearchError::UnknownProvider(other.to_string())),
        }
    }
}
