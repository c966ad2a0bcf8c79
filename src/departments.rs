// src/departments.rs

//! Department taxonomy and course classification.
//!
//! The catalog is built once from fixed tables and read-only afterwards.
//! Provider feeds emit free-form department tags; a provider-agnostic
//! mapping table resolves those tags to catalog ids. A tag with no mapping
//! is a classification miss, not an error.

use std::collections::HashMap;

use crate::models::{CourseRecord, Department};

/// Taxonomy entries: (id, label, parent id). Order is display order.
///
/// One nested level exists (`data` under `cs`); the exported taxonomy is
/// root plus its direct children, deeper nodes are reachable via parents.
const DEPARTMENTS: &[(&str, &str, &str)] = &[
    ("art", "Art & Design", ""),
    ("business", "Business & Management", ""),
    ("cs", "Computer Science", ""),
    ("data", "Data Analysis & Statistics", "cs"),
    ("economics", "Economics & Finance", ""),
    ("education", "Education & Teaching", ""),
    ("engineering", "Engineering", ""),
    ("health", "Health & Medicine", ""),
    ("humanities", "Humanities", ""),
    ("languages", "Language", ""),
    ("law", "Law", ""),
    ("math", "Math", ""),
    ("science", "Science", ""),
    ("social", "Social Sciences", ""),
];

/// Raw feed tag (lower-cased) to catalog id. Sources disagree on spelling;
/// this table absorbs the variants seen across the provider feeds.
const TAG_MAPPINGS: &[(&str, &str)] = &[
    ("art & culture", "art"),
    ("design", "art"),
    ("music", "art"),
    ("business", "business"),
    ("business & management", "business"),
    ("entrepreneurship", "business"),
    ("marketing", "business"),
    ("computer science", "cs"),
    ("computer-science", "cs"),
    ("programming", "cs"),
    ("software engineering", "cs"),
    ("web development", "cs"),
    ("mobile development", "cs"),
    ("android", "cs"),
    ("ios", "cs"),
    ("data analysis & statistics", "data"),
    ("data science", "data"),
    ("data-science", "data"),
    ("machine learning", "data"),
    ("economics & finance", "economics"),
    ("economics", "economics"),
    ("finance", "economics"),
    ("education & teacher training", "education"),
    ("teacher professional development", "education"),
    ("education", "education"),
    ("engineering", "engineering"),
    ("electronics", "engineering"),
    ("health & society", "health"),
    ("health & medicine", "health"),
    ("medicine", "health"),
    ("history", "humanities"),
    ("humanities", "humanities"),
    ("literature", "humanities"),
    ("philosophy & ethics", "humanities"),
    ("philosophy", "humanities"),
    ("language", "languages"),
    ("english", "languages"),
    ("law", "law"),
    ("math", "math"),
    ("mathematics", "math"),
    ("biology & life sciences", "science"),
    ("chemistry", "science"),
    ("physics", "science"),
    ("science", "science"),
    ("communication", "social"),
    ("psychology", "social"),
    ("social sciences", "social"),
];

/// Read-only department taxonomy with a raw-tag classifier.
pub struct DepartmentCatalog {
    departments: Vec<Department>,
    index: HashMap<String, usize>,
    tags: HashMap<String, String>,
}

impl DepartmentCatalog {
    /// Build the catalog from the fixed tables.
    pub fn new() -> Self {
        let mut departments = vec![Department::root("All")];
        departments.extend(
            DEPARTMENTS
                .iter()
                .map(|(id, label, parent)| Department::new(*id, *label, *parent)),
        );

        let index = departments
            .iter()
            .enumerate()
            .map(|(i, d)| (d.id.clone(), i))
            .collect();

        let tags = TAG_MAPPINGS
            .iter()
            .map(|(tag, id)| (tag.to_string(), id.to_string()))
            .collect();

        Self {
            departments,
            index,
            tags,
        }
    }

    /// All catalog entries, root first, in display order.
    pub fn all(&self) -> &[Department] {
        &self.departments
    }

    /// The synthetic "All" root node.
    pub fn root(&self) -> &Department {
        &self.departments[0]
    }

    /// Direct children of the root, in display order.
    pub fn top_level(&self) -> impl Iterator<Item = &Department> {
        self.departments
            .iter()
            .filter(|d| d.parent.as_deref() == Some(""))
    }

    /// Look up a department by id.
    pub fn get(&self, id: &str) -> Option<&Department> {
        self.index.get(id).map(|&i| &self.departments[i])
    }

    /// Resolve a raw feed tag to a catalog id, if the tag is known.
    pub fn classify(&self, raw_tag: &str) -> Option<&str> {
        self.tags
            .get(raw_tag.trim().to_lowercase().as_str())
            .map(String::as_str)
    }

    /// True iff `selected` is empty (no filter) or some raw tag on the
    /// course classifies to `selected` or to one of its descendants.
    pub fn is_match(&self, course: &CourseRecord, selected: &str) -> bool {
        if selected.is_empty() {
            return true;
        }
        course.departments.iter().any(|tag| {
            self.classify(tag)
                .is_some_and(|id| id == selected || self.is_descendant(id, selected))
        })
    }

    /// Walk parent links from `id` looking for `ancestor`.
    fn is_descendant(&self, id: &str, ancestor: &str) -> bool {
        let mut current = self.get(id).and_then(|d| d.parent.as_deref());
        while let Some(parent_id) = current {
            if parent_id == ancestor {
                return true;
            }
            current = self.get(parent_id).and_then(|d| d.parent.as_deref());
        }
        false
    }
}

impl Default for DepartmentCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course_with_tags(tags: &[&str]) -> CourseRecord {
        CourseRecord {
            link: "https://example.com/course".to_string(),
            departments: tags.iter().map(|t| t.to_string()).collect(),
            ..CourseRecord::default()
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let catalog = DepartmentCatalog::new();
        assert_eq!(catalog.index.len(), catalog.departments.len());
    }

    #[test]
    fn root_plus_top_level() {
        let catalog = DepartmentCatalog::new();
        assert_eq!(catalog.root().label, "All");
        assert!(catalog.top_level().any(|d| d.id == "cs"));
        // nested node is not top-level
        assert!(!catalog.top_level().any(|d| d.id == "data"));
    }

    #[test]
    fn classify_is_case_insensitive() {
        let catalog = DepartmentCatalog::new();
        assert_eq!(catalog.classify("Computer Science"), Some("cs"));
        assert_eq!(catalog.classify("MACHINE LEARNING"), Some("data"));
        assert_eq!(catalog.classify("Underwater Basket Weaving"), None);
    }

    #[test]
    fn empty_filter_always_matches() {
        let catalog = DepartmentCatalog::new();
        assert!(catalog.is_match(&course_with_tags(&[]), ""));
        assert!(catalog.is_match(&course_with_tags(&["Physics"]), ""));
    }

    #[test]
    fn disjoint_subtree_does_not_match() {
        let catalog = DepartmentCatalog::new();
        let course = course_with_tags(&["Physics", "Chemistry"]);
        assert!(catalog.is_match(&course, "science"));
        assert!(!catalog.is_match(&course, "business"));
    }

    #[test]
    fn descendant_tags_match_ancestor_filter() {
        let catalog = DepartmentCatalog::new();
        // "Data Science" classifies to `data`, a child of `cs`
        let course = course_with_tags(&["Data Science"]);
        assert!(catalog.is_match(&course, "data"));
        assert!(catalog.is_match(&course, "cs"));
        assert!(!catalog.is_match(&course, "math"));
    }

    #[test]
    fn unknown_tags_are_misses() {
        let catalog = DepartmentCatalog::new();
        let course = course_with_tags(&["Quantum Basket Weaving"]);
        assert!(!catalog.is_match(&course, "science"));
        assert!(catalog.is_match(&course, ""));
    }
}
