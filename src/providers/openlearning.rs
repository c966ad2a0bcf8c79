// src/providers/openlearning.rs

//! OpenLearning catalog client.
//!
//! The feed is a JSON object map keyed by course id rather than an array.
//! Course pages embed their promo player as a markup snippet; the video
//! URL is dug out of that snippet.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Config, CourseRecord};
use crate::providers::fetch::Fetcher;
use crate::providers::ProviderClient;
use crate::utils::join_extra;

const BASE_API_URL: &str = "https://www.openlearning.com/api/courses/list";

pub struct OpenLearningClient {
    config: Arc<Config>,
    fetcher: Fetcher,
    base_url: String,
}

impl OpenLearningClient {
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self {
            config,
            fetcher: Fetcher::new(client, true),
            base_url: BASE_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ProviderClient for OpenLearningClient {
    fn name(&self) -> &str {
        "OpenLearning"
    }

    fn base_api_url(&self) -> &str {
        &self.base_url
    }

    fn config(&self) -> &Arc<Config> {
        &self.config
    }

    fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    async fn fetch_feed(&self) -> Result<Vec<CourseRecord>> {
        let data = self
            .fetcher
            .get(&self.base_url, &[], &[], &self.custom_headers())
            .await?;
        parse_feed(&data)
    }
}

#[derive(Debug, Default, Deserialize)]
struct Feed {
    /// Courses keyed by provider-local id; key order is feed order.
    #[serde(default)]
    courses: BTreeMap<String, FeedCourse>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedCourse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    promo: String,
    #[serde(default)]
    duration: String,
}

impl FeedCourse {
    fn into_record(self, id: String) -> CourseRecord {
        let video = grab_video(&self.promo);

        CourseRecord {
            id,
            title: self.name,
            headline: self.headline,
            description: self.summary,
            art: self.image,
            link: self.url,
            video,
            extra: join_extra(&[("duration - ", self.duration.as_str())]),
            ..CourseRecord::default()
        }
    }
}

fn parse_feed(data: &[u8]) -> Result<Vec<CourseRecord>> {
    let feed: Feed = serde_json::from_slice(data)?;
    Ok(feed
        .courses
        .into_iter()
        .map(|(id, course)| course.into_record(id))
        .collect())
}

/// Extract a watchable video URL from the promo markup snippet.
///
/// Prefers an embedded player's iframe src; falls back to scanning the
/// snippet text for a YouTube link. Returns empty when nothing usable is
/// found.
fn grab_video(promo: &str) -> String {
    if promo.is_empty() {
        return String::new();
    }

    let fragment = Html::parse_fragment(promo);
    if let Ok(selector) = Selector::parse("iframe[src]") {
        if let Some(element) = fragment.select(&selector).next() {
            if let Some(src) = element.value().attr("src") {
                return normalize_embed(src);
            }
        }
    }

    youtube_watch_url(promo).unwrap_or_default()
}

/// Turn an embed src into a canonical watch URL where possible.
fn normalize_embed(src: &str) -> String {
    let src = match src.strip_prefix("//") {
        Some(rest) => format!("https://{rest}"),
        None => src.to_string(),
    };
    youtube_watch_url(&src).unwrap_or(src)
}

/// Find a YouTube video reference and canonicalize it to a watch URL.
fn youtube_watch_url(text: &str) -> Option<String> {
    let pattern =
        Regex::new(r"(?:youtube\.com/(?:embed/|watch\?v=)|youtu\.be/)([A-Za-z0-9_-]{6,})").ok()?;
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|id| format!("https://www.youtube.com/watch?v={}", id.as_str()))
}
