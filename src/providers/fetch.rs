// src/providers/fetch.rs

//! Cancellable network retrieval shared by the provider clients.
//!
//! Wraps a GET against a provider endpoint with a cooperative cancel flag
//! that is consulted before the request and again on every received body
//! chunk, and an optional per-client response cache keyed by the request
//! path and parameters.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use crate::error::{AppError, Result};

/// Cancellable fetch primitive owned by one provider client.
pub struct Fetcher {
    client: reqwest::Client,
    cancelled: AtomicBool,
    /// Response cache, present only for clients that opted in. Lives as
    /// long as the owning client; no TTL, never shared across clients.
    cache: Option<Mutex<HashMap<String, Vec<u8>>>>,
}

impl Fetcher {
    /// Create a fetcher around a shared HTTP client.
    pub fn new(client: reqwest::Client, cache_enabled: bool) -> Self {
        Self {
            client,
            cancelled: AtomicBool::new(false),
            cache: cache_enabled.then(|| Mutex::new(HashMap::new())),
        }
    }

    /// Request cancellation of any in-flight fetch. Safe to call from any
    /// thread at any time; a no-op when nothing is in flight.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Clear the cancel flag so the next fetch starts fresh. Cancellation
    /// only applies to the call it interrupted.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Progress checkpoint: aborts the transfer once the flag is set.
    fn progress(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        Ok(())
    }

    /// Fetch raw bytes for `path` + `params` below `base_url`.
    ///
    /// Fails with a soft error on transport failures and non-2xx statuses;
    /// the owning client converts those into an empty result.
    pub async fn get(
        &self,
        base_url: &str,
        path: &[&str],
        params: &[(&str, &str)],
        headers: &[(String, String)],
    ) -> Result<Vec<u8>> {
        self.progress()?;

        let url = build_url(base_url, path, params)?;
        let key = url.to_string();

        if let Some(cache) = &self.cache {
            let cache = cache.lock().expect("response cache poisoned");
            if let Some(hit) = cache.get(&key) {
                log::debug!("Cache hit for {key}");
                return Ok(hit.clone());
            }
        }

        let mut request = self.client.get(url.clone());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let mut response = request.send().await?;
        self.progress()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(key, format!("HTTP {status}")));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            self.progress()?;
            body.extend_from_slice(&chunk);
        }

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().expect("response cache poisoned");
            cache.insert(key, body.clone());
        }

        Ok(body)
    }
}

/// Join base URL, extra path segments and query parameters.
fn build_url(base_url: &str, path: &[&str], params: &[(&str, &str)]) -> Result<Url> {
    let mut url = Url::parse(base_url)?;

    if !path.is_empty() {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| AppError::fetch(base_url, "URL cannot be a base"))?;
        for segment in path {
            segments.push(segment);
        }
    }

    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in params {
            pairs.append_pair(name, value);
        }
    }

    Ok(url)
}
