//! File extension filter for material listings.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A set of allowed file extensions, compared case-insensitively.
///
/// An empty filter lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// A filter that accepts every file.
    pub fn any() -> Self {
        Self::default()
    }

    /// Build a filter from individual extensions (`"pdf"`, `".PDF"`).
    pub fn from_extensions<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .filter_map(|ext| normalize(ext.as_ref()))
            .collect();
        Self { extensions }
    }

    /// Parse the comma-separated `FileExtension` query value.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(raw) => Self::from_extensions(raw.split(',')),
            None => Self::any(),
        }
    }

    /// Whether this filter lets everything through.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Check a file name against the filter.
    pub fn allows(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        extension_of(file_name)
            .map(|ext| self.extensions.contains(&ext))
            .unwrap_or(false)
    }
}

/// Lowercase extension of a file name, without the dot.
pub fn extension_of(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

fn normalize(ext: &str) -> Option<String> {
    let ext = ext.trim().trim_start_matches('.');
    (!ext.is_empty()).then(|| ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_allows_everything() {
        let filter = ExtensionFilter::from_query(Some(""));
        assert!(filter.is_empty());
        assert!(filter.allows("notes"));
        assert!(filter.allows("a.pdf"));
    }

    #[test]
    fn test_case_insensitive_with_optional_dot() {
        let filter = ExtensionFilter::from_query(Some(".PDF, docx"));
        assert!(filter.allows("Lecture.pdf"));
        assert!(filter.allows("essay.DOCX"));
        assert!(!filter.allows("image.png"));
        assert!(!filter.allows("README"));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("a.tar.GZ"), Some("gz".to_string()));
        assert_eq!(extension_of(".hidden"), None);
        assert_eq!(extension_of("trailing."), None);
        assert_eq!(extension_of("plain"), None);
    }
}
