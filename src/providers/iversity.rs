// src/providers/iversity.rs

//! iversity catalog client.
//!
//! Parses the v1 JSON course listing; each course carries a single
//! `discipline` string that becomes its raw department tag.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Config, CourseRecord, Instructor};
use crate::providers::fetch::Fetcher;
use crate::providers::ProviderClient;
use crate::utils::join_extra;

const BASE_API_URL: &str = "https://iversity.org/api/v1/courses";

pub struct IversityClient {
    config: Arc<Config>,
    fetcher: Fetcher,
    base_url: String,
}

impl IversityClient {
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
impl ProviderClient for IversityClient {
    fn name(&self) -> &str {
        "iversity"
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
    #[serde(default)]
    courses: Vec<FeedCourse>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedCourse {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    trailer_video: String,
    #[serde(default)]
    duration: String,
    #[serde(default)]
    discipline: String,
    #[serde(default)]
    instructors: Vec<FeedInstructor>,
}

#[derive(Debug, Default, Deserialize)]
struct FeedInstructor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    biography: String,
    #[serde(default)]
    image: String,
}

impl FeedCourse {
    fn into_record(self) -> CourseRecord {
        let departments = if self.discipline.is_empty() {
            Vec::new()
        } else {
            vec![self.discipline]
        };

        CourseRecord {
            id: if self.id == 0 {
                String::new()
            } else {
                self.id.to_string()
            },
            title: self.title,
            headline: self.subtitle,
            description: self.description,
            art: self.image,
            link: self.url,
            video: self.trailer_video,
            extra: join_extra(&[("duration - ", self.duration.as_str())]),
            instructors: self
                .instructors
                .into_iter()
                .map(|i| Instructor {
                    name: i.name,
                    bio: i.biography,
                    image: i.image,
                })
                .collect(),
            departments,
        }
    }
}

fn parse_feed(data: &[u8]) -> Result<Vec<CourseRecord>> {
    let feed: Feed = serde_json::from_slice(data)?;
    Ok(feed.courses.into_iter().map(FeedCourse::into_record).collect())
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const SAMPLE_FEED: &str = r#"{
        "courses": [
            {
                "id": 42,
                "title": "The Future of Storytelling",
                "subtitle": "Storytelling across media",
                "description": "Explore how stories are told in the digital age.",
                "image": "https://img.example.com/fos.jpg",
                "url": "https://iversity.org/courses/the-future-of-storytelling",
                "trailer_video": "https://youtu.be/fos",
                "duration": "8 weeks",
                "discipline": "Design",
                "instructors": [
                    {"name": "Christina Maria Schollerer", "biography": "Creative director and lecturer.", "image": "https://img.example.com/cms.jpg"}
                ]
            },
            {
                "title": "Untitled Draft",
                "url": ""
            }
        ]
    }"#;

    #[test]
    fn parses_courses_with_discipline_tag() {
        let courses = parse_feed(SAMPLE_FEED.as_bytes()).unwrap();
        assert_eq!(courses.len(), 2);

        let first = &courses[0];
        assert_eq!(first.id, "42");
        assert_eq!(first.headline, "Storytelling across media");
        assert_eq!(first.extra, "duration - 8 weeks");
        assert_eq!(first.departments, ["Design"]);
        assert_eq!(first.instructors[0].bio, "Creative director and lecturer.");

        // drafts without a URL stay in the parse output; the client
        // boundary drops them before emission
        assert!(courses[1].link.is_empty());
        assert!(courses[1].departments.is_empty());
    }

    #[tokio::test]
    async fn query_only_narrows_the_feed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_FEED))
            .mount(&server)
            .await;

        let config = Arc::new(Config::default());
        let client =
            IversityClient::new(config, reqwest::Client::new()).with_base_url(server.uri());

        let all = client.courses("").await.unwrap();
        let matched = client.courses("storytelling").await.unwrap();

        assert_eq!(all.len(), 1);
        assert_eq!(matched.len(), 1);
        assert!(matched.iter().all(|c| all.contains(c)));
    }
}
