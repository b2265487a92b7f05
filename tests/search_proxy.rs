#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use rango::config::AppConfig;
    use rango::search::{search, SearchError, SearchProvider, SearchProviderFactory, SearchResult};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSearch {
        calls: AtomicUsize,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SearchProvider for RecordingSearch {
        fn name(&self) -> &str {
            "recording"
        }

        async fn run_query(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.to_string());
            Ok(vec![SearchResult {
                title: format!("About {}", query),
                link: "http://example.com".to_string(),
                summary: String::new(),
            }])
        }
    }

    #[tokio::test]
    async fn test_blank_queries_never_reach_provider() {
        let provider = RecordingSearch::default();

        for query in ["", "   ", "\t\n"] {
            let results = search(&provider, query).await.unwrap();
            assert!(results.is_empty());
        }

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_query_is_trimmed_before_forwarding() {
        let provider = RecordingSearch::default();

        let results = search(&provider, "  tango with django ").await.unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.queries.lock().unwrap().as_slice(), ["tango with django"]);
        assert_eq!(results[0].title, "About tango with django");
    }

    #[test]
    fn test_factory_selects_provider_from_config() {
        let mut config = AppConfig::default();

        config.search.provider = "bing".to_string();
        assert_eq!(SearchProviderFactory::create_default(&config).unwrap().name(), "bing");

        config.search.provider = "duckduckgo".to_string();
        assert_eq!(SearchProviderFactory::create_default(&config).unwrap().name(), "duckduckgo");

        config.search.provider = "altavista".to_string();
        assert!(matches!(
            SearchProviderFactory::create_default(&config),
            Err(SearchError::UnknownProvider(_))
        ));
    }
}
