// src/providers/coursera.rs

//! Coursera catalog client.
//!
//! Parses the courses.v1 JSON listing. The feed carries no instructor
//! blocks, so those stay empty; domain tags become raw department tags.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Config, CourseRecord};
use crate::providers::fetch::Fetcher;
use crate::providers::ProviderClient;

const BASE_API_URL: &str = "https://api.coursera.org/api/courses.v1";

/// Extra fields requested on top of the default id/name/slug set.
const FIELDS: &str = "description,photoUrl,domainTypes";

pub struct CourseraClient {
    config: Arc<Config>,
    fetcher: Fetcher,
    base_url: String,
}

impl CourseraClient {
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
impl ProviderClient for CourseraClient {
    fn name(&self) -> &str {
        "Coursera"
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
            .get(
                &self.base_url,
                &[],
                &[("fields", FIELDS)],
                &self.custom_headers(),
            )
            .await?;
        parse_feed(&data)
    }
}

#[derive(Debug, Default, Deserialize)]
struct Feed {
    #[serde(default)]
    elements: Vec<FeedCourse>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedCourse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "photoUrl")]
    photo_url: String,
    #[serde(default, rename = "domainTypes")]
    domain_types: Vec<DomainType>,
}

#[derive(Debug, Default, Deserialize)]
struct DomainType {
    #[serde(default, rename = "domainId")]
    domain_id: String,
}

impl FeedCourse {
    fn into_record(self) -> CourseRecord {
        let link = if self.slug.is_empty() {
            String::new()
        } else {
            format!("https://www.coursera.org/learn/{}", self.slug)
        };

        CourseRecord {
            id: self.id,
            title: self.name,
            description: self.description,
            art: self.photo_url,
            link,
            departments: self
                .domain_types
                .into_iter()
                .map(|d| d.domain_id)
                .filter(|id| !id.is_empty())
                .collect(),
            ..CourseRecord::default()
        }
    }
}

fn parse_feed(data: &[u8]) -> Result<Vec<CourseRecord>> {
    let feed: Feed = serde_json::from_slice(data)?;
    Ok(feed.elements.into_iter().map(FeedCourse::into_record).collect())
}
