//! Ordering modes for material listings.

use serde::{Deserialize, Serialize};

/// Primary sort key applied to a listing before the folder-first partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterialOrder {
    /// Most recently created first.
    NewestFirst,
    /// Oldest first.
    OldestFirst,
    /// By name, ascending.
    Alphabetical,
    /// Insertion order as stored.
    #[default]
    Unordered,
}

impl MaterialOrder {
    /// Map the `order` query value. Unknown or missing values fall back to
    /// insertion order.
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("newest") => Self::NewestFirst,
            Some("oldest") => Self::OldestFirst,
            Some("alphabetical") => Self::Alphabetical,
            _ => Self::Unordered,
        }
    }

    /// Return the query string form of this order.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewestFirst => "newest",
            Self::OldestFirst => "oldest",
            Self::Alphabetical => "alphabetical",
            Self::Unordered => "unordered",
        }
    }
}
