use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::search::{SearchError, SearchProvider, SearchResult};

pub struct BingSearch {
    client: Client,
    api_key: String,
    base_url: String,
    count: usize,
}

#[derive(Debug, Deserialize)]
struct BingResponse {
    #[serde(rename = "webPages")]
    web_pages: Option<WebPages>,
}

#[derive(Debug, Deserialize)]
struct WebPages {
    #[serde(default)]
    value: Vec<WebPage>,
}

#[derive(Debug, Deserialize)]
struct WebPage {
    name: String,
    url: String,
    #[serde(default)]
    snippet: String,
}

/// Maps a Bing Web Search v7 response body to results. A body without
/// `webPages` means nothing matched.
pub fn parse_response(body: &str) -> Result<Vec<SearchResult>, SearchError> {
    let response: BingResponse = serde_json::from_str(body).map_err(|e| SearchError::Parse(e.to_string()))?;

    Ok(response
        .web_pages
        .map(|pages| pages.value)
        .unwrap_or_default()
        .into_iter()
        .map(|page| SearchResult {
            title: page.name,
            link: page.url,
            summary: page.snippet,
        })
        .collect())
}

impl BingSearch {
    pub fn new(api_key: String, base_url: String, count: usize) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder().build()?,
            api_key,
            base_url,
            count,
        })
    }
}

#[async_trait]
impl SearchProvider for BingSearch {
    fn name(&self) -> &str {
        "bing"
    }

    async fn run_query(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::MissingKey);
        }

        let count = self.count.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url.trim_end_matches('/')))
            .header("Ocp-Apim-Subscription-Key", self.api_key.as_str())
            .query(&[
                ("q", query),
                ("count", count.as_str()),
                ("textDecorations", "true"),
                ("textFormat", "HTML"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Api(format!("Bing Error {}: {}", status, text)));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}
