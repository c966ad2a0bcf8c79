// src/providers/mod.rs

//! Provider clients: one implementation per external course catalog.
//!
//! Every client converts its provider's feed into `CourseRecord`s behind
//! the shared `ProviderClient` contract. Fetch and parse failures are
//! contained here: a broken source yields an empty list and a warning,
//! never a run-level error.

mod coursera;
mod edx;
pub mod fetch;
mod iversity;
mod openlearning;
mod udacity;
mod udemy;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{Config, CourseRecord};
use crate::search::SearchMatcher;

pub use coursera::CourseraClient;
pub use edx::EdxClient;
pub use fetch::Fetcher;
pub use iversity::IversityClient;
pub use openlearning::OpenLearningClient;
pub use udacity::UdacityClient;
pub use udemy::UdemyClient;

/// Contract implemented once per external course catalog.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Stable display name; lower-cased it doubles as the grouping key.
    fn name(&self) -> &str;

    /// Fixed feed endpoint for this provider.
    fn base_api_url(&self) -> &str;

    /// Extra request headers (e.g. API auth). Empty for most providers.
    fn custom_headers(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    /// Shared configuration handle.
    fn config(&self) -> &Arc<Config>;

    /// The client's cancellable fetch primitive.
    fn fetcher(&self) -> &Fetcher;

    /// Fetch and parse the provider's current feed.
    async fn fetch_feed(&self) -> Result<Vec<CourseRecord>>;

    /// Fetch the feed and filter it by `query`.
    ///
    /// Soft failures (network, malformed feed, cancellation) are logged
    /// and yield an empty list; only unexpected errors propagate. Records
    /// without a link are dropped here, before anything downstream sees
    /// them.
    async fn courses(&self, query: &str) -> Result<Vec<CourseRecord>> {
        self.fetcher().reset();

        let parsed = match self.fetch_feed().await {
            Ok(records) => records,
            Err(AppError::Cancelled) => {
                log::debug!("{}: fetch cancelled", self.name());
                Vec::new()
            }
            Err(e) if e.is_soft() => {
                log::warn!("{}: feed unavailable: {}", self.name(), e);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let matcher = SearchMatcher::new(query);
        Ok(parsed
            .into_iter()
            .filter(|course| !course.link.is_empty())
            .filter(|course| matcher.is_match(course))
            .collect())
    }

    /// Cancel any in-flight fetch. Idempotent; callable from any thread.
    fn cancel(&self) {
        self.fetcher().cancel();
    }
}

/// Build the full provider set in the fixed aggregation order.
///
/// This order is the dedup total order: the earliest source to emit a
/// link owns it.
pub fn all_providers(
    config: &Arc<Config>,
    client: &reqwest::Client,
) -> Vec<Arc<dyn ProviderClient>> {
    vec![
        Arc::new(CourseraClient::new(Arc::clone(config), client.clone())),
        Arc::new(UdemyClient::new(Arc::clone(config), client.clone())),
        Arc::new(EdxClient::new(Arc::clone(config), client.clone())),
        Arc::new(UdacityClient::new(Arc::clone(config), client.clone())),
        Arc::new(IversityClient::new(Arc::clone(config), client.clone())),
        Arc::new(OpenLearningClient::new(Arc::clone(config), client.clone())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_order_is_fixed() {
        let config = Arc::new(Config::default());
        let providers = all_providers(&config, &reqwest::Client::new());

        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            ["Coursera", "Udemy", "edX", "Udacity", "iversity", "OpenLearning"]
        );
    }

    #[test]
    fn grouping_keys_match_config_flags() {
        let config = Arc::new(Config::default());
        let providers = all_providers(&config, &reqwest::Client::new());

        for provider in providers {
            let key = provider.name().to_lowercase();
            assert!(
                config.providers.is_enabled(&key),
                "no enable flag wired for {key}"
            );
        }
    }
}
