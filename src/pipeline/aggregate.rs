// src/pipeline/aggregate.rs

//! Aggregation orchestrator.
//!
//! Fans a query out to every enabled provider, then filters, deduplicates
//! and groups the combined results into the sink. Sources are fetched
//! concurrently but consumed in the configured fixed order, so the first
//! occurrence of a link in that total order always wins.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::departments::DepartmentCatalog;
use crate::error::Result;
use crate::models::{Config, Department, RunStats};
use crate::pipeline::sink::{CourseResult, ResultSink};
use crate::providers::{self, ProviderClient};
use crate::utils::http;

/// One search request from the host.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    /// Free-text query; empty returns everything
    pub query: String,

    /// Selected department id; empty disables the filter
    pub department: String,
}

/// Orchestrates one query execution across the provider set.
pub struct Aggregator {
    config: Arc<Config>,
    catalog: DepartmentCatalog,
    clients: Vec<Arc<dyn ProviderClient>>,
    cancelled: Arc<AtomicBool>,
}

impl Aggregator {
    /// Build an aggregator over the full provider set.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = http::create_async_client(&config.http)?;
        let clients = providers::all_providers(&config, &client);
        Ok(Self::with_clients(config, clients))
    }

    /// Build an aggregator over an explicit client list (fixed order).
    pub fn with_clients(config: Arc<Config>, clients: Vec<Arc<dyn ProviderClient>>) -> Self {
        Self {
            config,
            catalog: DepartmentCatalog::new(),
            clients,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The department taxonomy snapshot used by this aggregator.
    pub fn catalog(&self) -> &DepartmentCatalog {
        &self.catalog
    }

    /// The full client list in aggregation order, enabled or not.
    pub fn clients(&self) -> &[Arc<dyn ProviderClient>] {
        &self.clients
    }

    /// Cancel the run: flags every client and stops the emit loop at the
    /// next source boundary. Callable from any thread; not an error.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        for client in &self.clients {
            client.cancel();
        }
    }

    fn enabled_clients(&self) -> Vec<Arc<dyn ProviderClient>> {
        self.clients
            .iter()
            .filter(|c| self.config.providers.is_enabled(&c.name().to_lowercase()))
            .cloned()
            .collect()
    }

    /// Execute one query, streaming grouped results into `sink`.
    ///
    /// Per-source failures were already softened inside the clients; an
    /// error here means the whole run failed.
    pub async fn run(&self, request: &SearchRequest, sink: &mut dyn ResultSink) -> Result<RunStats> {
        let mut stats = RunStats::new(Utc::now());

        let children: Vec<&Department> = self.catalog.top_level().collect();
        sink.register_departments(self.catalog.root(), &children);

        let enabled = self.enabled_clients();
        log::info!(
            "Aggregating {} of {} sources for query {:?}",
            enabled.len(),
            self.clients.len(),
            request.query
        );

        // buffered (not buffer_unordered): fetches overlap, but sources
        // are consumed in configured order, which is what keeps dedup
        // deterministic.
        let concurrency = self.config.http.max_concurrent.max(1);
        let mut responses = stream::iter(enabled)
            .map(|client| {
                let query = request.query.clone();
                async move {
                    let outcome = client.courses(&query).await;
                    (client, outcome)
                }
            })
            .buffered(concurrency);

        let mut seen: HashSet<String> = HashSet::new();

        'sources: while let Some((client, outcome)) = responses.next().await {
            if self.cancelled.load(Ordering::SeqCst) {
                log::debug!("Run cancelled, skipping remaining sources");
                stats.stopped = true;
                break;
            }

            let name = client.name().to_string();
            let courses = match outcome {
                Ok(list) => list,
                Err(e) => {
                    log::error!("{name}: aborting run: {e}");
                    return Err(e);
                }
            };

            stats.sources += 1;
            sink.register_source(&name.to_lowercase(), &name, &self.config.display.template);

            for course in courses {
                if !self.catalog.is_match(&course, &request.department) {
                    stats.filtered += 1;
                    continue;
                }

                if !seen.insert(course.link.clone()) {
                    log::debug!("Duplicate result: {}", course.link);
                    stats.duplicates += 1;
                    continue;
                }

                if !sink.push(CourseResult::from_record(&course, &name)) {
                    log::debug!("Sink stopped accepting results");
                    stats.stopped = true;
                    break 'sources;
                }
                stats.emitted += 1;
            }

            log::debug!("Finished source {name}");
        }

        stats.finished_at = Utc::now();
        log::info!(
            "Run complete: {} results from {} sources ({} duplicates, {} filtered)",
            stats.emitted,
            stats.sources,
            stats.duplicates,
            stats.filtered
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;
    use crate::models::CourseRecord;
    use crate::pipeline::sink::VecSink;
    use crate::providers::Fetcher;

    struct StubClient {
        name: &'static str,
        records: Vec<CourseRecord>,
        fail: bool,
        config: Arc<Config>,
        fetcher: Fetcher,
    }

    impl StubClient {
        fn new(name: &'static str, records: Vec<CourseRecord>) -> Arc<dyn ProviderClient> {
            Arc::new(Self {
                name,
                records,
                fail: false,
                config: Arc::new(Config::default()),
                fetcher: Fetcher::new(reqwest::Client::new(), false),
            })
        }

        fn failing(name: &'static str) -> Arc<dyn ProviderClient> {
            Arc::new(Self {
                name,
                records: Vec::new(),
                fail: true,
                config: Arc::new(Config::default()),
                fetcher: Fetcher::new(reqwest::Client::new(), false),
            })
        }
    }

    #[async_trait]
    impl ProviderClient for StubClient {
        fn name(&self) -> &str {
            self.name
        }

        fn base_api_url(&self) -> &str {
            "https://stub.invalid"
        }

        fn config(&self) -> &Arc<Config> {
            &self.config
        }

        fn fetcher(&self) -> &Fetcher {
            &self.fetcher
        }

        async fn fetch_feed(&self) -> Result<Vec<CourseRecord>> {
            if self.fail {
                return Err(AppError::fatal("stub blew up"));
            }
            Ok(self.records.clone())
        }
    }

    fn course(link: &str, title: &str, tags: &[&str]) -> CourseRecord {
        CourseRecord {
            link: link.to_string(),
            title: title.to_string(),
            departments: tags.iter().map(|t| t.to_string()).collect(),
            ..CourseRecord::default()
        }
    }

    /// Sink that refuses results after a fixed number of pushes.
    struct StopSink {
        limit: usize,
        results: Vec<CourseResult>,
    }

    impl ResultSink for StopSink {
        fn register_departments(&mut self, _root: &Department, _children: &[&Department]) {}
        fn register_source(&mut self, _key: &str, _title: &str, _template: &str) {}

        fn push(&mut self, result: CourseResult) -> bool {
            self.results.push(result);
            self.results.len() < self.limit
        }
    }

    #[tokio::test]
    async fn dedup_keeps_first_occurrence_in_source_order() {
        let config = Arc::new(Config::default());
        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![
                StubClient::new(
                    "Coursera",
                    vec![
                        course("https://example.com/x", "X from Coursera", &[]),
                        course("https://example.com/a", "A", &[]),
                    ],
                ),
                StubClient::new(
                    "Udemy",
                    vec![
                        course("https://example.com/b", "B", &[]),
                        course("https://example.com/x", "X from Udemy", &[]),
                    ],
                ),
            ],
        );

        let mut sink = VecSink::new();
        let stats = aggregator
            .run(&SearchRequest::default(), &mut sink)
            .await
            .unwrap();

        assert_eq!(stats.emitted, 3);
        assert_eq!(stats.duplicates, 1);
        let titles: Vec<&str> = sink.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["X from Coursera", "A", "B"]);
        assert_eq!(sink.results[0].source, "Coursera");
    }

    #[tokio::test]
    async fn duplicate_links_within_one_feed_collapse_in_feed_order() {
        let config = Arc::new(Config::default());
        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![StubClient::new(
                "edX",
                vec![
                    course("https://example.com/1", "Item 1", &[]),
                    course("https://example.com/2", "Item 2", &[]),
                    course("https://example.com/1", "Item 3", &[]),
                ],
            )],
        );

        let mut sink = VecSink::new();
        let stats = aggregator
            .run(&SearchRequest::default(), &mut sink)
            .await
            .unwrap();

        assert_eq!(stats.emitted, 2);
        let titles: Vec<&str> = sink.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Item 1", "Item 2"]);
    }

    #[tokio::test]
    async fn department_filter_skips_non_matching_courses() {
        let config = Arc::new(Config::default());
        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![StubClient::new(
                "Coursera",
                vec![
                    course("https://example.com/ml", "ML", &["Machine Learning"]),
                    course("https://example.com/law", "Law", &["Law"]),
                ],
            )],
        );

        let request = SearchRequest {
            query: String::new(),
            department: "cs".to_string(),
        };
        let mut sink = VecSink::new();
        let stats = aggregator.run(&request, &mut sink).await.unwrap();

        // "Machine Learning" classifies under cs via the data subtree
        assert_eq!(stats.emitted, 1);
        assert_eq!(stats.filtered, 1);
        assert_eq!(sink.results[0].title, "ML");
    }

    #[tokio::test]
    async fn disabling_all_providers_yields_empty_run() {
        let mut config = Config::default();
        config.providers = crate::models::ProvidersConfig {
            coursera: false,
            udemy: false,
            edx: false,
            udacity: false,
            iversity: false,
            open_learning: false,
        };
        let config = Arc::new(config);

        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![StubClient::new(
                "Coursera",
                vec![course("https://example.com/a", "A", &[])],
            )],
        );

        let mut sink = VecSink::new();
        let stats = aggregator
            .run(&SearchRequest::default(), &mut sink)
            .await
            .unwrap();

        assert_eq!(stats.sources, 0);
        assert!(sink.results.is_empty());
        // taxonomy is still registered before any fetching
        assert!(!sink.departments.is_empty());
    }

    #[tokio::test]
    async fn sink_stop_ends_the_run_early() {
        let config = Arc::new(Config::default());
        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![
                StubClient::new(
                    "Coursera",
                    vec![
                        course("https://example.com/a", "A", &[]),
                        course("https://example.com/b", "B", &[]),
                    ],
                ),
                StubClient::new(
                    "Udemy",
                    vec![course("https://example.com/c", "C", &[])],
                ),
            ],
        );

        let mut sink = StopSink {
            limit: 1,
            results: Vec::new(),
        };
        let stats = aggregator
            .run(&SearchRequest::default(), &mut sink)
            .await
            .unwrap();

        assert!(stats.stopped);
        assert_eq!(sink.results.len(), 1);
    }

    #[tokio::test]
    async fn fatal_client_error_aborts_the_run() {
        let config = Arc::new(Config::default());
        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![
                StubClient::failing("Coursera"),
                StubClient::new(
                    "Udemy",
                    vec![course("https://example.com/c", "C", &[])],
                ),
            ],
        );

        let mut sink = VecSink::new();
        let err = aggregator
            .run(&SearchRequest::default(), &mut sink)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Fatal(_)));
        assert!(sink.results.is_empty());
    }

    #[tokio::test]
    async fn cancelled_run_emits_nothing_and_is_not_an_error() {
        let config = Arc::new(Config::default());
        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![StubClient::new(
                "Coursera",
                vec![course("https://example.com/a", "A", &[])],
            )],
        );

        aggregator.cancel();
        let mut sink = VecSink::new();
        let stats = aggregator
            .run(&SearchRequest::default(), &mut sink)
            .await
            .unwrap();

        assert!(stats.stopped);
        assert_eq!(stats.emitted, 0);
        assert!(sink.results.is_empty());
    }

    #[tokio::test]
    async fn end_to_end_edx_feed_dedups_by_link() {
        let server = wiremock::MockServer::start().await;
        let feed = r#"<rss><channel>
          <item><title>Item 1</title><link>https://www.edx.org/c/1</link></item>
          <item><title>Item 2</title><link>https://www.edx.org/c/2</link></item>
          <item><title>Item 3</title><link>https://www.edx.org/c/1</link></item>
        </channel></rss>"#;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(feed))
            .mount(&server)
            .await;

        let config = Arc::new(Config::default());
        let edx = crate::providers::EdxClient::new(Arc::clone(&config), reqwest::Client::new())
            .with_base_url(server.uri());
        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![Arc::new(edx) as Arc<dyn ProviderClient>],
        );

        let mut sink = VecSink::new();
        let stats = aggregator
            .run(&SearchRequest::default(), &mut sink)
            .await
            .unwrap();

        assert_eq!(stats.emitted, 2);
        assert_eq!(stats.duplicates, 1);
        let titles: Vec<&str> = sink.results.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Item 1", "Item 2"]);
        assert_eq!(sink.results[0].source, "edX");
    }

    #[tokio::test]
    async fn sources_are_grouped_in_configured_order() {
        let config = Arc::new(Config::default());
        let aggregator = Aggregator::with_clients(
            Arc::clone(&config),
            vec![
                StubClient::new(
                    "Udemy",
                    vec![course("https://example.com/u", "U", &[])],
                ),
                StubClient::new(
                    "edX",
                    vec![course("https://example.com/e", "E", &[])],
                ),
            ],
        );

        let mut sink = VecSink::new();
        aggregator
            .run(&SearchRequest::default(), &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.sources, ["udemy", "edx"]);
    }
}
