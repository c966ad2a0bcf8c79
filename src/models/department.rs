//! Department taxonomy node.

use serde::{Deserialize, Serialize};

/// A classification bucket in the fixed department taxonomy.
///
/// Nodes form a tree rooted at the synthetic "All" node; parents are
/// referenced by id so snapshots stay cheap to share.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Department {
    /// Stable short code, unique within the catalog ("" for the root)
    pub id: String,

    /// Display name
    pub label: String,

    /// Parent id, `None` only for the root
    #[serde(default)]
    pub parent: Option<String>,
}

impl Department {
    /// Construct a node with a parent.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent: Some(parent.into()),
        }
    }

    /// Construct the root node.
    pub fn root(label: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            label: label.into(),
            parent: None,
        }
    }
}
