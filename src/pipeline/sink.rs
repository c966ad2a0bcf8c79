// src/pipeline/sink.rs

//! Output contract between the orchestrator and its host.
//!
//! The host (CLI, search shell, test harness) receives the department
//! taxonomy up front, then per-source groups of flattened course results.

use serde::Serialize;

use crate::models::{CourseRecord, Department};

/// One course flattened for the host, tagged with its source.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CourseResult {
    /// Canonical course URI (the record's identity link)
    pub uri: String,
    pub title: String,
    pub art: String,
    pub headline: String,
    pub description: String,

    /// Display name of the source that produced this result
    pub source: String,

    /// Free-form summary text
    pub extra: String,

    /// Promo video URI, if the feed had one
    pub video_url: Option<String>,

    /// Semicolon-joined raw department tags
    pub departments: String,

    /// Parallel instructor sequences, in source order. Bios are
    /// untruncated; display truncation belongs to the sink.
    pub instructor_images: Vec<String>,
    pub instructor_names: Vec<String>,
    pub instructor_bios: Vec<String>,
}

impl CourseResult {
    /// Flatten a record for emission, tagging it with its source name.
    pub fn from_record(course: &CourseRecord, source: &str) -> Self {
        let mut instructor_images = Vec::with_capacity(course.instructors.len());
        let mut instructor_names = Vec::with_capacity(course.instructors.len());
        let mut instructor_bios = Vec::with_capacity(course.instructors.len());
        for instructor in &course.instructors {
            instructor_images.push(instructor.image.clone());
            instructor_names.push(instructor.name.clone());
            instructor_bios.push(instructor.bio.clone());
        }

        Self {
            uri: course.link.clone(),
            title: course.title.clone(),
            art: course.art.clone(),
            headline: course.headline.clone(),
            description: course.description.clone(),
            source: source.to_string(),
            extra: course.extra.clone(),
            video_url: (!course.video.is_empty()).then(|| course.video.clone()),
            departments: course.departments.join(";"),
            instructor_images,
            instructor_names,
            instructor_bios,
        }
    }
}

/// Receives the output stream of an aggregation run.
pub trait ResultSink {
    /// Called once, before any results, with the selectable taxonomy:
    /// the root node plus its direct children.
    fn register_departments(&mut self, root: &Department, children: &[&Department]);

    /// Called once per processed source, before that source's results.
    /// `key` is the lower-cased grouping key, `template` the opaque
    /// display-template selector from configuration.
    fn register_source(&mut self, key: &str, title: &str, template: &str);

    /// Push one result. Returning `false` tells the orchestrator to stop
    /// the run immediately (e.g. the consumer disconnected).
    fn push(&mut self, result: CourseResult) -> bool;
}

/// Sink that buffers everything in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub departments: Vec<Department>,
    pub sources: Vec<String>,
    pub results: Vec<CourseResult>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for VecSink {
    fn register_departments(&mut self, root: &Department, children: &[&Department]) {
        self.departments.push(root.clone());
        self.departments.extend(children.iter().map(|d| (*d).clone()));
    }

    fn register_source(&mut self, key: &str, _title: &str, _template: &str) {
        self.sources.push(key.to_string());
    }

    fn push(&mut self, result: CourseResult) -> bool {
        self.results.push(result);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Instructor;

    #[test]
    fn from_record_flattens_instructors_in_order() {
        let course = CourseRecord {
            link: "https://example.com/c".to_string(),
            title: "Course".to_string(),
            video: "https://youtu.be/x".to_string(),
            departments: vec!["Math".to_string(), "Science".to_string()],
            instructors: vec![
                Instructor {
                    name: "A".to_string(),
                    bio: "Bio A".to_string(),
                    image: "img-a".to_string(),
                },
                Instructor {
                    name: "B".to_string(),
                    ..Instructor::default()
                },
            ],
            ..CourseRecord::default()
        };

        let result = CourseResult::from_record(&course, "edX");
        assert_eq!(result.uri, "https://example.com/c");
        assert_eq!(result.source, "edX");
        assert_eq!(result.video_url.as_deref(), Some("https://youtu.be/x"));
        assert_eq!(result.departments, "Math;Science");
        assert_eq!(result.instructor_names, ["A", "B"]);
        assert_eq!(result.instructor_bios, ["Bio A", ""]);
        assert_eq!(result.instructor_images, ["img-a", ""]);
    }

    #[test]
    fn empty_video_maps_to_none() {
        let course = CourseRecord {
            link: "https://example.com/c".to_string(),
            ..CourseRecord::default()
        };
        let result = CourseResult::from_record(&course, "Coursera");
        assert!(result.video_url.is_none());
        assert!(result.departments.is_empty());
    }
}
