//! Normalized course data structures.
//!
//! Every provider feed, whatever its wire format, converges on these types.

use serde::{Deserialize, Serialize};

/// A single course listing, normalized from one provider feed.
///
/// `link` is the identity key: two records with the same link are the same
/// course, and a record without a link is unusable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CourseRecord {
    /// Provider-local identifier (may be empty)
    #[serde(default)]
    pub id: String,

    /// Course title
    #[serde(default)]
    pub title: String,

    /// Long description
    #[serde(default)]
    pub description: String,

    /// Short subtitle
    #[serde(default)]
    pub headline: String,

    /// Image URI
    #[serde(default)]
    pub art: String,

    /// Canonical course URI (identity key)
    #[serde(default)]
    pub link: String,

    /// Promo/teaser video URI (empty if none)
    #[serde(default)]
    pub video: String,

    /// Free-form summary text, e.g. "workload - 4h, duration - 6 weeks"
    #[serde(default)]
    pub extra: String,

    /// Instructors in source order
    #[serde(default)]
    pub instructors: Vec<Instructor>,

    /// Raw department tags as emitted by the source (not yet classified)
    #[serde(default)]
    pub departments: Vec<String>,
}

impl CourseRecord {
    /// Concatenation of the fields the free-text matcher searches over.
    pub fn searchable_text(&self) -> String {
        let mut text = String::new();
        for part in [&self.title, &self.description, &self.headline, &self.extra] {
            text.push_str(part);
            text.push(' ');
        }
        for instructor in &self.instructors {
            text.push_str(&instructor.name);
            text.push(' ');
        }
        text
    }
}

/// A course instructor.
///
/// Feeds routinely omit fields; a missing name, bio or image leaves that
/// field empty rather than dropping the instructor.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Instructor {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Biography (untruncated; display truncation is the sink's concern)
    #[serde(default)]
    pub bio: String,

    /// Portrait image URI
    #[serde(default)]
    pub image: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn searchable_text_covers_instructors() {
        let course = CourseRecord {
            title: "Intro to Rust".to_string(),
            description: "Systems programming".to_string(),
            headline: "Learn fast".to_string(),
            extra: "duration - 6 weeks".to_string(),
            instructors: vec![Instructor {
                name: "Ada Lovelace".to_string(),
                ..Instructor::default()
            }],
            ..CourseRecord::default()
        };

        let text = course.searchable_text();
        assert!(text.contains("Intro to Rust"));
        assert!(text.contains("Systems programming"));
        assert!(text.contains("Learn fast"));
        assert!(text.contains("6 weeks"));
        assert!(text.contains("Ada Lovelace"));
    }
}
