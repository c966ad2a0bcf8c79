// src/providers/edx.rs

//! edX catalog client.
//!
//! Parses the edX RSS course feed: an `<item>` list with namespaced child
//! elements for subtitle, artwork, video, staff and subject tags.

use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::Result;
use crate::models::{Config, CourseRecord, Instructor};
use crate::providers::fetch::Fetcher;
use crate::providers::ProviderClient;
use crate::utils::join_extra;

const BASE_API_URL: &str = "https://www.edx.org/api/v2/report/course-feed/rss";

pub struct EdxClient {
    config: Arc<Config>,
    fetcher: Fetcher,
    base_url: String,
}

impl EdxClient {
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
impl ProviderClient for EdxClient {
    fn name(&self) -> &str {
        "edX"
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

/// Parse the RSS item list into course records.
fn parse_feed(data: &[u8]) -> Result<Vec<CourseRecord>> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut courses = Vec::new();
    let mut course: Option<CourseRecord> = None;
    let mut staff: Option<Instructor> = None;
    let mut effort = String::new();
    let mut length = String::new();
    let mut tag = String::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => {
                    course = Some(CourseRecord::default());
                    effort.clear();
                    length.clear();
                }
                b"course:staff" => {
                    if course.is_some() {
                        staff = Some(Instructor::default());
                    }
                }
                other => tag = String::from_utf8_lossy(other).into_owned(),
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"item" => {
                    if let Some(mut finished) = course.take() {
                        finished.extra = join_extra(&[
                            ("workload - ", effort.as_str()),
                            ("duration - ", length.as_str()),
                        ]);
                        courses.push(finished);
                    }
                }
                b"course:staff" => {
                    if let (Some(current), Some(instructor)) = (course.as_mut(), staff.take()) {
                        current.instructors.push(instructor);
                    }
                }
                _ => tag.clear(),
            },
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().into_owned();
                store_text(&mut course, &mut staff, &tag, &mut effort, &mut length, text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                store_text(&mut course, &mut staff, &tag, &mut effort, &mut length, text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(e.into()),
            _ => {}
        }
        buf.clear();
    }

    Ok(courses)
}

/// Route element text into the record being built.
fn store_text(
    course: &mut Option<CourseRecord>,
    staff: &mut Option<Instructor>,
    tag: &str,
    effort: &mut String,
    length: &mut String,
    text: String,
) {
    // Staff children shadow item children while a staff block is open.
    if let Some(instructor) = staff.as_mut() {
        match tag {
            "staff:name" => instructor.name = text,
            "staff:bio" => instructor.bio = text,
            "staff:image" => instructor.image = text,
            _ => {}
        }
        return;
    }

    // Ignore channel-level title/description/link outside any item.
    let Some(current) = course.as_mut() else {
        return;
    };
    match tag {
        "guid" => current.id = text,
        "title" => current.title = text,
        "description" => current.description = text,
        "course:subtitle" => current.headline = text,
        "course:image-thumbnail" => current.art = text,
        "link" => current.link = text,
        "course:video-youtube" => current.video = text,
        "course:subject" => current.departments.push(text),
        "course:effort" => *effort = text,
        "course:length" => *length = text,
        _ => {}
    }
}
