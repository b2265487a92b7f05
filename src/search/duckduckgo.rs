use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::search::{SearchError, SearchProvider, SearchResult};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

pub struct DuckDuckGoSearch {
    client: Client,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(max_results: usize) -> Result<Self, SearchError> {
        Ok(Self {
            client: Client::builder().user_agent(USER_AGENT).build()?,
            max_results,
        })
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(e.to_string()))
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<Vec<_>>().join("").trim().to_string()
}

/// DuckDuckGo often links through redirects like `/l/?uddg=URL`.
fn unwrap_redirect(href: &str) -> Option<String> {
    match href.find("uddg=") {
        Some(pos) => {
            let encoded_url = &href[pos + 5..];
            let encoded_url = encoded_url.split('&').next().unwrap_or(encoded_url);
            urlencoding::decode(encoded_url).ok().map(|url| url.into_owned())
        }
        None => Some(href.to_string()),
    }
}

/// Extracts up to `max_results` results from a DuckDuckGo HTML results page.
pub fn parse_results(html: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
    let document = Html::parse_document(html);
    let result_selector = selector(".result")?;
    let link_selector = selector(".result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    Ok(document
        .select(&result_selector)
        .filter_map(|result| {
            let anchor = result.select(&link_selector).next()?;
            let link = unwrap_redirect(anchor.value().attr("href")?)?;

            if link.contains("duckduckgo.com") || link.starts_with('/') {
                return None;
            }

            let summary = result
                .select(&snippet_selector)
                .next()
                .map(element_text)
                .unwrap_or_default();

            Some(SearchResult {
                title: element_text(anchor),
                link,
                summary,
            })
        })
        .take(max_results)
        .collect())
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn run_query(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let url = format!("https://html.duckduckgo.com/html/?q={}", urlencoding::encode(query));
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(SearchError::Api(format!("DuckDuckGo Error {}", response.status())));
        }

        let html = response.text().await?;
        parse_results(&html, self.max_results)
    }
}
