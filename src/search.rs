// src/search.rs

//! Free-text search matching over course records.
//!
//! Matching is boolean: every whitespace-delimited query token must occur
//! as a case-insensitive substring of the record's searchable text. No
//! ranking or scoring is produced.

use crate::models::CourseRecord;

/// A compiled search query.
pub struct SearchMatcher {
    tokens: Vec<String>,
}

impl SearchMatcher {
    /// Tokenize and lowercase the query once, up front.
    pub fn new(query: &str) -> Self {
        Self {
            tokens: query
                .to_lowercase()
                .split_whitespace()
                .map(String::from)
                .collect(),
        }
    }

    /// Whether the matcher has no tokens (empty or whitespace-only query).
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True iff every query token occurs somewhere in the course's
    /// searchable text. An empty query matches everything.
    pub fn is_match(&self, course: &CourseRecord) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let haystack = course.searchable_text().to_lowercase();
        self.tokens.iter().all(|token| haystack.contains(token.as_str()))
    }
}
