// src/providers/udemy.rs

//! Udemy catalog client.
//!
//! Parses the api-2.0 course listing. Udemy requires API credentials on
//! every request, sent as custom headers; course URLs in the feed are
//! site-relative and resolved against the storefront base.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Config, CourseRecord, Instructor};
use crate::providers::fetch::Fetcher;
use crate::providers::ProviderClient;
use crate::utils::{join_extra, resolve};

const BASE_API_URL: &str = "https://www.udemy.com/api-2.0/courses";
const SITE_URL: &str = "https://www.udemy.com";

const CLIENT_ID: &str = "coursefeed-catalog";
const CLIENT_SECRET: &str = "5d41f39c72a0e4e2b8a1c7d90f3b62aa";

const PAGE_SIZE: &str = "100";

pub struct UdemyClient {
    config: Arc<Config>,
    fetcher: Fetcher,
    base_url: String,
}

impl UdemyClient {
    pub fn new(config: Arc<Config>, client: reqwest::Client) -> Self {
        Self {
            config,
            fetcher: Fetcher::new(client, false),
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
impl ProviderClient for UdemyClient {
    fn name(&self) -> &str {
        "Udemy"
    }

    fn base_api_url(&self) -> &str {
        &self.base_url
    }

    fn custom_headers(&self) -> Vec<(String, String)> {
        vec![
            ("X-Udemy-Client-Id".to_string(), CLIENT_ID.to_string()),
            ("X-Udemy-Client-Secret".to_string(), CLIENT_SECRET.to_string()),
        ]
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
            .get(
                &self.base_url,
                &[],
                &[("page_size", PAGE_SIZE)],
                &self.custom_headers(),
            )
            .await?;
        parse_feed(&data)
    }
}

#[derive(Debug, Default, Deserialize)]
struct Feed {
    #[serde(default)]
    results: Vec<FeedCourse>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedCourse {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    headline: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image_480x270: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content_info: String,
    #[serde(default)]
    visible_instructors: Vec<FeedInstructor>,
    #[serde(default)]
    primary_category: Category,
    #[serde(default)]
    primary_subcategory: Category,
}

#[derive(Debug, Default, Deserialize)]
struct Category {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct FeedInstructor {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    job_title: String,
    #[serde(default)]
    image_100x100: String,
}

impl FeedCourse {
    fn into_record(self) -> CourseRecord {
        let link = if self.url.is_empty() {
            String::new()
        } else {
            resolve(SITE_URL, &self.url).unwrap_or_default()
        };

        let mut departments = Vec::new();
        for category in [self.primary_category, self.primary_subcategory] {
            if !category.title.is_empty() {
                departments.push(category.title);
            }
        }

        CourseRecord {
            id: if self.id == 0 {
                String::new()
            } else {
                self.id.to_string()
            },
            title: self.title,
            headline: self.headline,
            description: self.description,
            art: self.image_480x270,
            link,
            extra: join_extra(&[("duration - ", self.content_info.as_str())]),
            instructors: self
                .visible_instructors
                .into_iter()
                .map(|i| Instructor {
                    name: i.display_name,
                    bio: i.job_title,
                    image: i.image_100x100,
                })
                .collect(),
            departments,
            ..CourseRecord::default()
        }
    }
}

fn parse_feed(data: &[u8]) -> Result<Vec<CourseRecord>> {
    let feed: Feed = serde_json::from_slice(data)?;
    Ok(feed.results.into_iter().map(FeedCourse::into_record).collect())
}
