// src/providers/udacity.rs

//! Udacity catalog client.
//!
//! Parses the public JSON catalog: a `courses` array with instructor
//! blocks, track tags and a teaser video.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;
use crate::models::{Config, CourseRecord, Instructor};
use crate::providers::fetch::Fetcher;
use crate::providers::ProviderClient;
use crate::utils::join_extra;

const BASE_API_URL: &str = "https://www.udacity.com/public-api/v0/courses";

pub struct UdacityClient {
    config: Arc<Config>,
    fetcher: Fetcher,
    base_url: String,
}

impl UdacityClient {
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
impl ProviderClient for UdacityClient {
    fn name(&self) -> &str {
        "Udacity"
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
    key: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    homepage: String,
    #[serde(default)]
    teaser_video: TeaserVideo,
    #[serde(default)]
    instructors: Vec<FeedInstructor>,
    #[serde(default)]
    tracks: Vec<String>,
    #[serde(default)]
    expected_duration: u32,
    #[serde(default)]
    expected_duration_unit: String,
}

#[derive(Debug, Default, Deserialize)]
struct TeaserVideo {
    #[serde(default)]
    youtube_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct FeedInstructor {
    #[serde(default)]
    name: String,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    image: String,
}

impl FeedCourse {
    fn into_record(self) -> CourseRecord {
        let duration = if self.expected_duration == 0 {
            String::new()
        } else {
            format!("{} {}", self.expected_duration, self.expected_duration_unit)
        };

        CourseRecord {
            id: self.key,
            title: self.title,
            headline: self.subtitle,
            description: self.summary,
            art: self.image,
            link: self.homepage,
            video: self.teaser_video.youtube_url,
            extra: join_extra(&[("duration - ", duration.as_str())]),
            instructors: self
                .instructors
                .into_iter()
                .map(|i| Instructor {
                    name: i.name,
                    bio: i.bio,
                    image: i.image,
                })
                .collect(),
            departments: self.tracks,
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
                "key": "cs101",
                "title": "Intro to Computer Science",
                "subtitle": "Build a Search Engine",
                "summary": "Learn key computer science concepts.",
                "image": "https://img.example.com/cs101.jpg",
                "homepage": "https://www.udacity.com/course/cs101",
                "teaser_video": {"youtube_url": "https://youtu.be/cs101"},
                "instructors": [
                    {"name": "Dave Evans", "bio": "Professor at the University of Virginia.", "image": "https://img.example.com/evans.jpg"},
                    {"bio": "Bio without a name."}
                ],
                "tracks": ["Web Development", "Data Science"],
                "expected_duration": 7,
                "expected_duration_unit": "weeks"
            },
            {
                "key": "st095",
                "title": "Statistics",
                "homepage": "https://www.udacity.com/course/st095"
            }
        ]
    }"#;

    #[test]
    fn parses_courses_with_instructors_and_tracks() {
        let courses = parse_feed(SAMPLE_FEED.as_bytes()).unwrap();
        assert_eq!(courses.len(), 2);

        let first = &courses[0];
        assert_eq!(first.id, "cs101");
        assert_eq!(first.headline, "Build a Search Engine");
        assert_eq!(first.video, "https://youtu.be/cs101");
        assert_eq!(first.extra, "duration - 7 weeks");
        assert_eq!(first.departments, ["Web Development", "Data Science"]);

        // a nameless instructor block is kept, not skipped
        assert_eq!(first.instructors.len(), 2);
        assert!(first.instructors[1].name.is_empty());
        assert_eq!(first.instructors[1].bio, "Bio without a name.");

        let second = &courses[1];
        assert!(second.extra.is_empty());
        assert!(second.video.is_empty());
    }

    #[tokio::test]
    async fn repeat_queries_are_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_FEED))
            .expect(1)
            .mount(&server)
            .await;

        let config = Arc::new(Config::default());
        let client =
            UdacityClient::new(config, reqwest::Client::new()).with_base_url(server.uri());

        let first = client.courses("").await.unwrap();
        let second = client.courses("statistics").await.unwrap();

        assert_eq!(first.len(), 2);
        // second call hit the cache (mock expects exactly one request) and
        // still applies the narrower query
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].title, "Statistics");
    }
}
